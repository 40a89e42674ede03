use axum::{Json, extract::State};
use serde::Serialize;
use tracing::debug;

use crate::db::Certificate;
use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::router::PortalState;

#[derive(Debug, Serialize)]
pub struct CertificateList {
    pub certificates: Vec<Certificate>,
}

/// GET /api/certificates/my -> the caller's certificates, newest issuance first.
pub async fn my_certificates(
    State(state): State<PortalState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<CertificateList>, ApiError> {
    let certificates = state
        .certificates
        .list_for_user(identity.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch certificates"))?;

    debug!(
        user_id = identity.user_id,
        count = certificates.len(),
        "listed certificates"
    );
    Ok(Json(CertificateList { certificates }))
}
