//! Database schema and migrations.
//!
//! Migrations are applied in order; `schema_version` records the last one.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: persons
    r#"
CREATE TABLE persons (
    id          TEXT PRIMARY KEY,                    -- base64url identifier
    username    TEXT NOT NULL UNIQUE COLLATE NOCASE,
    email       TEXT NOT NULL DEFAULT '',
    password    TEXT NOT NULL,                       -- Argon2 hash
    last_seen   TEXT NOT NULL
);
"#,
];
