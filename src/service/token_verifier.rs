use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::db::{Identity, SqliteStore};
use crate::error::PortalError;

/// Resolves an opaque credential to the caller it was issued to.
///
/// `Ok(None)` means the token is unknown or expired; `Err` is reserved for
/// failures of the verification backend itself.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Option<Identity>, PortalError>;
}

/// Verifies tokens against the `sessions` collection written by the auth layer.
#[derive(Clone)]
pub struct SessionVerifier {
    store: SqliteStore,
}

impl SessionVerifier {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TokenVerifier for SessionVerifier {
    async fn verify(&self, token: &str) -> Result<Option<Identity>, PortalError> {
        let identity = self.store.find_session_identity(token, Utc::now()).await?;
        if identity.is_none() {
            debug!("session token rejected");
        }
        Ok(identity)
    }
}
