use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::db::{CertificateStore, SqliteStore};
use crate::handlers::certificates::my_certificates;
use crate::service::token_verifier::{SessionVerifier, TokenVerifier};

#[derive(Clone)]
pub struct PortalState {
    pub certificates: Arc<dyn CertificateStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub session_cookie: Arc<str>,
}

impl PortalState {
    pub fn new(
        certificates: Arc<dyn CertificateStore>,
        verifier: Arc<dyn TokenVerifier>,
        session_cookie: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            certificates,
            verifier,
            session_cookie: session_cookie.into(),
        }
    }

    /// State backed entirely by one SQLite store.
    pub fn from_store(store: SqliteStore, session_cookie: impl Into<Arc<str>>) -> Self {
        let verifier = SessionVerifier::new(store.clone());
        Self::new(Arc::new(store), Arc::new(verifier), session_cookie)
    }
}

pub fn portal_router(state: PortalState) -> Router {
    Router::new()
        .route("/api/certificates/my", get(my_certificates))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
