//! SQL DDL for the portal's collections.
//! Timestamps are UTC epoch milliseconds so ordering in SQL is exact.

/// SQLite schema with:
/// - `users`: `email` UNIQUE (the upsert key), `password` holds a bcrypt hash
/// - `certificates`: owned by exactly one user, free-form fields in `data` (JSON object)
/// - `sessions`: written by the external auth layer, read by token verification
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    is_admin INTEGER NOT NULL DEFAULT 0,
    email_verified INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS certificates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    issued_at INTEGER NOT NULL,
    data TEXT NOT NULL DEFAULT '{}' -- JSON object
);

CREATE INDEX IF NOT EXISTS idx_certificates_user_issued ON certificates(user_id, issued_at DESC);

CREATE TABLE IF NOT EXISTS sessions (
    session_token TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id),
    expires INTEGER NOT NULL
);
"#;
