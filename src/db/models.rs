use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys owned by the certificate envelope; never taken from free-form fields.
pub const RESERVED_CERTIFICATE_KEYS: &[&str] = &["id", "userId", "issuedAt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The caller a session token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbUser {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub is_admin: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: i64,
    pub user_id: i64,
    pub issued_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCertificate {
    pub user_id: i64,
    pub issued_at: DateTime<Utc>,
    pub fields: Map<String, Value>,
}

impl NewCertificate {
    pub fn new(user_id: i64, issued_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            issued_at,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Result of an upsert keyed by email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: i64,
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn certificate_serializes_flat_camel_case() {
        let issued_at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let mut fields = Map::new();
        fields.insert("title".into(), json!("Rust 101"));
        let cert = Certificate {
            id: 7,
            user_id: 3,
            issued_at,
            fields,
        };

        let value = serde_json::to_value(&cert).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["userId"], json!(3));
        assert_eq!(value["title"], json!("Rust 101"));
        assert!(value["issuedAt"].as_str().unwrap().starts_with("2023-11-14T22:13:20"));
    }

    #[test]
    fn user_never_serializes_password() {
        let user = DbUser {
            id: 1,
            email: "a@example.com".into(),
            password: "$2b$04$hash".into(),
            role: Role::Admin,
            is_admin: true,
            email_verified: true,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["role"], json!("admin"));
    }
}
