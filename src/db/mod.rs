//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and wire payloads
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: runtime-query storage over an `Any` pool (SQLite or MySQL)

pub mod models;
pub mod schema;
pub mod store;

pub use models::{DbSection, DbUser, UserProfile, UserRecord};
pub use schema::{SCHEMA_INIT, TABLES};
pub use store::{AnyPool, Storage};
