use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::error::PortalError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderInfo {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    Created(FolderInfo),
    /// The host answered 409 Conflict.
    AlreadyExists,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorEnvelope {
    error: CloudinaryErrorBody,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

/// Client for the Cloudinary Admin API.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    api_base: Url,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryClient {
    pub fn new(
        http: reqwest::Client,
        api_base: Url,
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base,
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Build a client from `CLOUDINARY_*` settings; every credential is required.
    pub fn from_config(cfg: &Config) -> Result<Self, PortalError> {
        let cloud_name = required(&cfg.cloudinary_cloud_name, "CLOUDINARY_CLOUD_NAME")?;
        let api_key = required(&cfg.cloudinary_api_key, "CLOUDINARY_API_KEY")?;
        let api_secret = required(&cfg.cloudinary_api_secret, "CLOUDINARY_API_SECRET")?;
        let api_base = Url::parse(&cfg.cloudinary_api_base)?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("cert-portal/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self::new(http, api_base, cloud_name, api_key, api_secret))
    }

    /// `POST /v1_1/{cloud}/folders/{path}`. Nested paths (`a/b`) are kept as
    /// separate segments; each segment is percent-encoded.
    pub fn folder_url(&self, path: &str) -> Result<Url, PortalError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["v1_1", self.cloud_name.as_str(), "folders"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    pub async fn create_folder(&self, path: &str) -> Result<FolderOutcome, PortalError> {
        let url = self.folder_url(path)?;
        let resp = self
            .http
            .post(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let folder: FolderInfo = resp.json().await?;
            info!(folder = %folder.path, "media folder created");
            return Ok(FolderOutcome::Created(folder));
        }
        if status == StatusCode::CONFLICT {
            return Ok(FolderOutcome::AlreadyExists);
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%status, error = %e, "failed to read media host error body");
                String::new()
            }
        };
        let message = serde_json::from_str::<CloudinaryErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(PortalError::MediaHost { status, message })
    }
}

fn required(value: &Option<String>, key: &'static str) -> Result<String, PortalError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(PortalError::MissingSetting(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> CloudinaryClient {
        CloudinaryClient::new(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            "demo",
            "key",
            "secret",
        )
    }

    #[test]
    fn folder_url_encodes_segments() {
        let c = client("https://api.cloudinary.com");
        let url = c.folder_url("certificates/2024 batch").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cloudinary.com/v1_1/demo/folders/certificates/2024%20batch"
        );
    }

    #[test]
    fn from_config_requires_credentials() {
        let mut cfg = Config::default();
        cfg.cloudinary_cloud_name = Some("demo".into());
        cfg.cloudinary_api_key = Some("key".into());
        let err = CloudinaryClient::from_config(&cfg).err().unwrap();
        assert!(matches!(
            err,
            PortalError::MissingSetting("CLOUDINARY_API_SECRET")
        ));

        cfg.cloudinary_api_secret = Some("secret".into());
        assert!(CloudinaryClient::from_config(&cfg).is_ok());
    }
}
