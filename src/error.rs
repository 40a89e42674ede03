use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum PortalError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Missing required setting `{0}`")]
    MissingSetting(&'static str),

    #[error("Media host responded {status}: {message}")]
    MediaHost { status: StatusCode, message: String },

    #[error("Stored timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}

impl From<figment::Error> for PortalError {
    fn from(e: figment::Error) -> Self {
        PortalError::Config(Box::new(e))
    }
}

/// Error returned across the HTTP boundary.
///
/// Only the message is ever sent to the caller; the underlying
/// [`PortalError`] is logged and dropped.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Internal {
        message: &'static str,
        source: PortalError,
    },
}

impl ApiError {
    pub fn internal(message: &'static str) -> impl FnOnce(PortalError) -> ApiError {
        move |source| ApiError::Internal { message, source }
    }
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::Internal { message, source } => {
                error!(error = %source, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(ApiErrorBody { error: message })).into_response()
    }
}
