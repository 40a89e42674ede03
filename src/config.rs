use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::PortalError;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_MEDIA_FOLDER: &str = "certificates";
pub const DEFAULT_SESSION_COOKIE: &str = "next-auth.session-token";
pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";

/// Environment variables read on top of the defaults. Keys are lowercased
/// by figment, so each maps onto the field of the same name.
const ENV_KEYS: &[&str] = &[
    "DATABASE_URL",
    "LISTEN_ADDR",
    "LOGLEVEL",
    "SESSION_COOKIE",
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD",
    "BCRYPT_COST",
    "CLOUDINARY_CLOUD_NAME",
    "CLOUDINARY_API_KEY",
    "CLOUDINARY_API_SECRET",
    "CLOUDINARY_API_BASE",
    "MEDIA_FOLDER",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    pub session_cookie: String,

    pub admin_email: String,
    pub admin_password: Option<String>,
    pub bcrypt_cost: u32,

    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    pub cloudinary_api_base: String,
    pub media_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:cert-portal.sqlite".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: None,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            cloudinary_api_base: CLOUDINARY_API_BASE.to_string(),
            media_folder: DEFAULT_MEDIA_FOLDER.to_string(),
        }
    }
}

impl Config {
    /// Build the figment used by [`Config::load`].
    ///
    /// `MONGODB_URI` is honoured as an alias for `DATABASE_URL`; when both are
    /// set, `DATABASE_URL` wins.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(
                Env::raw()
                    .only(&["MONGODB_URI"])
                    .map(|_| "database_url".into()),
            )
            .merge(Env::raw().only(ENV_KEYS))
    }

    pub fn load() -> Result<Self, PortalError> {
        Ok(Self::figment().extract()?)
    }
}
