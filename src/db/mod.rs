//! Database module: models, schema and the SQLite-backed store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring stored documents
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: queries over a `sqlx` SQLite pool

pub mod models;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::PortalError;

pub use models::{Certificate, DbUser, Identity, NewCertificate, Role, UpsertOutcome};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, SqliteStore, connect};

/// Read access to certificates, scoped by owner.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// All certificates owned by `user_id`, newest issuance first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Certificate>, PortalError>;
}
