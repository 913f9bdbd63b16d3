//! SQL DDL for initializing the roster tables.
//! SQLite-first design; can be adapted for other RDBMS.

/// Schema for the three roster tables:
/// - `users`: one row per account, `uid` UNIQUE
/// - `sections`: class sections, `abbreviation` UNIQUE
/// - `user_sections`: membership join table
pub const SCHEMA_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uid TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    abbreviation TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_sections (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    section_id INTEGER NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, section_id)
);

CREATE INDEX IF NOT EXISTS idx_user_sections_section ON user_sections(section_id);
"#;

/// Every table owned by this schema, in child-first drop order.
pub const TABLES: &[&str] = &["user_sections", "sections", "users"];
