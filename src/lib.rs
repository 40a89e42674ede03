pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod providers;
pub mod provision;
pub mod router;
pub mod service;
pub mod telemetry;

pub use config::Config;
pub use error::{ApiError, PortalError};
