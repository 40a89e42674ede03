use crate::db::CertificateStore;
use crate::db::models::{
    Certificate, DbUser, Identity, NewCertificate, RESERVED_CERTIFICATE_KEYS, Role, UpsertOutcome,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::PortalError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Open (creating if missing) the database at `database_url` and apply the schema.
pub async fn connect(database_url: &str) -> Result<SqliteStore, PortalError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    let store = SqliteStore::new(pool);
    store.init_schema().await?;
    debug!(database_url, "store connected");
    Ok(store)
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), PortalError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert a plain user. Returns the row id.
    pub async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<i64, PortalError> {
        let is_admin = role == Role::Admin;
        let rec: (i64,) = sqlx::query_as(
            r#"INSERT INTO users (email, password, role, is_admin, email_verified, created_at)
               VALUES (?, ?, ?, ?, 0, ?)
               RETURNING id"#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(is_admin)
        .bind(Utc::now().timestamp_millis())
        .fetch_one(&self.pool)
        .await?;
        Ok(rec.0)
    }

    /// Upsert by unique email, granting the admin role and marking the email verified.
    /// Uses SQLite `INSERT ... ON CONFLICT(email) DO UPDATE`.
    pub async fn upsert_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<UpsertOutcome, PortalError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO users (email, password, role, is_admin, email_verified, created_at)
            VALUES (?, ?, ?, 1, 1, ?)
            ON CONFLICT(email) DO UPDATE SET
                password=excluded.password,
                role=excluded.role,
                is_admin=excluded.is_admin,
                email_verified=excluded.email_verified
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(Role::Admin.as_str())
        .bind(Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?;

        let rec: (i64,) = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(UpsertOutcome {
            id: rec.0,
            created: existing.is_none(),
        })
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<DbUser>, PortalError> {
        let row = sqlx::query(
            r#"SELECT id, email, password, role, is_admin, email_verified, created_at
               FROM users WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_user).transpose()
    }

    pub async fn count_users(&self) -> Result<i64, PortalError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Record a session issued by the auth layer.
    pub async fn insert_session(
        &self,
        session_token: &str,
        user_id: i64,
        expires: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        sqlx::query("INSERT INTO sessions (session_token, user_id, expires) VALUES (?, ?, ?)")
            .bind(session_token)
            .bind(user_id)
            .bind(expires.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Resolve an unexpired session token to the owning user's identity.
    pub async fn find_session_identity(
        &self,
        session_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Identity>, PortalError> {
        let row = sqlx::query(
            r#"SELECT u.id, u.email, u.role
               FROM sessions s JOIN users u ON u.id = s.user_id
               WHERE s.session_token = ? AND s.expires > ?"#,
        )
        .bind(session_token)
        .bind(now.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<Identity, PortalError> {
            Ok(Identity {
                user_id: row.try_get("id")?,
                email: row.try_get("email")?,
                role: decode_role(row.try_get("role")?)?,
            })
        })
        .transpose()
    }

    /// Insert a certificate. Reserved envelope keys in `fields` are dropped,
    /// and dropped again on read.
    pub async fn insert_certificate(&self, cert: NewCertificate) -> Result<i64, PortalError> {
        let mut fields = cert.fields;
        strip_reserved(&mut fields);
        let data = serde_json::to_string(&fields)?;

        let rec: (i64,) = sqlx::query_as(
            "INSERT INTO certificates (user_id, issued_at, data) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(cert.user_id)
        .bind(cert.issued_at.timestamp_millis())
        .bind(data)
        .fetch_one(&self.pool)
        .await?;
        Ok(rec.0)
    }

    pub async fn list_certificates_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<Certificate>, PortalError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, issued_at, data
               FROM certificates WHERE user_id = ?
               ORDER BY issued_at DESC, id DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_certificate).collect()
    }

    fn row_to_certificate(row: SqliteRow) -> Result<Certificate, PortalError> {
        let id: i64 = row.try_get("id")?;
        let user_id: i64 = row.try_get("user_id")?;
        let issued_at_ms: i64 = row.try_get("issued_at")?;
        let data: String = row.try_get("data")?;

        // rows may come from other writers; the envelope keys always win
        let mut fields: Map<String, Value> = serde_json::from_str(&data)?;
        strip_reserved(&mut fields);

        Ok(Certificate {
            id,
            user_id,
            issued_at: millis_to_datetime(issued_at_ms)?,
            fields,
        })
    }

    fn row_to_user(row: SqliteRow) -> Result<DbUser, PortalError> {
        let created_at_ms: i64 = row.try_get("created_at")?;
        Ok(DbUser {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            role: decode_role(row.try_get("role")?)?,
            is_admin: row.try_get("is_admin")?,
            email_verified: row.try_get("email_verified")?,
            created_at: millis_to_datetime(created_at_ms)?,
        })
    }
}

#[async_trait]
impl CertificateStore for SqliteStore {
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Certificate>, PortalError> {
        self.list_certificates_for_user(user_id).await
    }
}

fn strip_reserved(fields: &mut Map<String, Value>) {
    for key in RESERVED_CERTIFICATE_KEYS {
        fields.remove(*key);
    }
}

fn decode_role(raw: String) -> Result<Role, PortalError> {
    Role::parse(&raw).ok_or_else(|| {
        PortalError::Database(sqlx::Error::Decode(
            format!("unknown role `{raw}`").into(),
        ))
    })
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, PortalError> {
    DateTime::from_timestamp_millis(ms).ok_or(PortalError::TimestampOutOfRange(ms))
}
