#![allow(dead_code)]

use cert_portal::db::{Role, SqliteStore};
use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;

/// A single-connection in-memory store; the database lives as long as the pool.
pub async fn memory_store() -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory sqlite");
    let store = SqliteStore::new(pool);
    store.init_schema().await.expect("failed to init schema");
    store
}

pub async fn seed_user(store: &SqliteStore, email: &str) -> i64 {
    store
        .insert_user(email, "$2b$04$not-a-real-hash", Role::User)
        .await
        .expect("failed to insert user")
}

/// Issue a session valid for an hour and return its token.
pub async fn seed_session(store: &SqliteStore, user_id: i64) -> String {
    let token = format!("session-{user_id}");
    store
        .insert_session(&token, user_id, Utc::now() + Duration::hours(1))
        .await
        .expect("failed to insert session");
    token
}
