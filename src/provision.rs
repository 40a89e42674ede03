//! One-shot maintenance operations behind the `provision-*` binaries.

use tracing::{error, info, warn};

use crate::api::cloudinary_api::{CloudinaryClient, FolderOutcome};
use crate::config::Config;
use crate::db::{SqliteStore, UpsertOutcome};
use crate::error::PortalError;

/// Who to grant admin rights to, and the password to set.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub bcrypt_cost: u32,
}

impl AdminSeed {
    /// `ADMIN_PASSWORD` has no default and must be supplied.
    pub fn from_config(cfg: &Config) -> Result<Self, PortalError> {
        let password = cfg
            .admin_password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(PortalError::MissingSetting("ADMIN_PASSWORD"))?;
        Ok(Self {
            email: cfg.admin_email.clone(),
            password,
            bcrypt_cost: cfg.bcrypt_cost,
        })
    }
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Create or update the admin user keyed by `seed.email`. Running it again
/// updates the same document.
pub async fn provision_admin(
    store: &SqliteStore,
    seed: &AdminSeed,
) -> Result<UpsertOutcome, PortalError> {
    let password_hash = bcrypt::hash(&seed.password, seed.bcrypt_cost)?;
    let outcome = store.upsert_admin(&seed.email, &password_hash).await?;
    if outcome.created {
        info!(email = %seed.email, id = outcome.id, "admin user created");
    } else {
        info!(email = %seed.email, id = outcome.id, "admin user updated");
    }
    Ok(outcome)
}

/// Ensure `name` exists on the media host. An existing folder is not an error.
pub async fn provision_folder(
    client: &CloudinaryClient,
    name: &str,
) -> Result<FolderOutcome, PortalError> {
    match client.create_folder(name).await {
        Ok(outcome @ FolderOutcome::Created(_)) => {
            info!(folder = name, "folder provisioned");
            Ok(outcome)
        }
        Ok(FolderOutcome::AlreadyExists) => {
            warn!(folder = name, "folder already exists");
            Ok(FolderOutcome::AlreadyExists)
        }
        Err(e) => {
            error!(folder = name, error = %e, "failed to create folder");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_seed_requires_password() {
        let cfg = Config::default();
        assert!(matches!(
            AdminSeed::from_config(&cfg),
            Err(PortalError::MissingSetting("ADMIN_PASSWORD"))
        ));

        let cfg = Config {
            admin_password: Some("hunter22".into()),
            ..Config::default()
        };
        let seed = AdminSeed::from_config(&cfg).unwrap();
        assert_eq!(seed.email, crate::config::DEFAULT_ADMIN_EMAIL);
        assert!(!format!("{seed:?}").contains("hunter22"));
    }
}
