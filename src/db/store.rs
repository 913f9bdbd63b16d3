use crate::config::DatabaseDescriptor;
use crate::db::models::{DbSection, DbUser};
use crate::db::schema::{SCHEMA_INIT, TABLES};
use crate::error::RosterError;
use chrono::{DateTime, Utc};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{Any, Pool, Row};
use std::sync::Once;

pub type AnyPool = Pool<Any>;

static DRIVERS: Once = Once::new();

/// Which SQL dialect the pool speaks. Catalog queries differ per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    MySql,
}

#[derive(Clone)]
pub struct Storage {
    pool: AnyPool,
    backend: Backend,
}

impl Storage {
    /// Open a pool against the configured store. For file-backed stores the
    /// parent directory is created first so a fresh checkout can connect.
    pub async fn connect(descriptor: &DatabaseDescriptor) -> Result<Self, RosterError> {
        DRIVERS.call_once(sqlx::any::install_default_drivers);

        if let Some(path) = descriptor.file_path()
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let pool = AnyPoolOptions::new()
            .max_connections(4)
            .connect(descriptor.url())
            .await?;
        let backend = match descriptor {
            DatabaseDescriptor::File { .. } => Backend::Sqlite,
            DatabaseDescriptor::Server { .. } => Backend::MySql,
        };
        Ok(Self { pool, backend })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Names of the tables currently present in the store.
    pub async fn table_names(&self) -> Result<Vec<String>, RosterError> {
        let sql = match self.backend {
            Backend::Sqlite => {
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'"
            }
            Backend::MySql => {
                "SELECT table_name FROM information_schema.tables WHERE table_schema = DATABASE()"
            }
        };
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>(0).map_err(RosterError::from))
            .collect()
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), RosterError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SCHEMA_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Drop every table this schema owns, child tables first.
    pub async fn drop_schema(&self) -> Result<(), RosterError> {
        for table in TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Upsert by unique uid. Returns the row id.
    /// Uses `INSERT ... ON CONFLICT(uid) DO UPDATE`.
    pub async fn upsert_user(
        &self,
        uid: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<i64, RosterError> {
        let created_at = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO users (uid, name, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(uid) DO UPDATE SET
                name=excluded.name,
                password_hash=excluded.password_hash
            "#,
        )
        .bind(uid)
        .bind(name)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        // Fetch id after upsert
        let rec: (i64,) = sqlx::query_as("SELECT id FROM users WHERE uid = ?")
            .bind(uid)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn user_by_uid(&self, uid: &str) -> Result<Option<DbUser>, RosterError> {
        let row = sqlx::query(
            "SELECT id, uid, name, password_hash, created_at FROM users WHERE uid = ?",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_user).transpose()
    }

    pub async fn list_users(&self) -> Result<Vec<DbUser>, RosterError> {
        let rows = sqlx::query("SELECT id, uid, name, password_hash, created_at FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_user).collect()
    }

    pub async fn count_users(&self) -> Result<i64, RosterError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Upsert by unique abbreviation. Returns the row id.
    pub async fn upsert_section(&self, abbreviation: &str, name: &str) -> Result<i64, RosterError> {
        sqlx::query(
            r#"
            INSERT INTO sections (abbreviation, name)
            VALUES (?, ?)
            ON CONFLICT(abbreviation) DO UPDATE SET name=excluded.name
            "#,
        )
        .bind(abbreviation)
        .bind(name)
        .execute(&self.pool)
        .await?;

        let rec: (i64,) = sqlx::query_as("SELECT id FROM sections WHERE abbreviation = ?")
            .bind(abbreviation)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn list_sections(&self) -> Result<Vec<DbSection>, RosterError> {
        let rows = sqlx::query("SELECT id, abbreviation, name FROM sections ORDER BY abbreviation")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                Ok(DbSection {
                    id: row.try_get("id")?,
                    abbreviation: row.try_get("abbreviation")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    pub async fn link_user_section(&self, user_id: i64, section_id: i64) -> Result<(), RosterError> {
        sqlx::query(
            "INSERT INTO user_sections (user_id, section_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(section_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_user(row: AnyRow) -> Result<DbUser, RosterError> {
        let id: i64 = row.try_get("id")?;
        let uid: String = row.try_get("uid")?;
        let name: String = row.try_get("name")?;
        let password_hash: String = row.try_get("password_hash")?;
        let created_at_str: String = row.try_get("created_at")?;

        let created_at: DateTime<Utc> = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(DbUser {
            id,
            uid,
            name,
            password_hash,
            created_at,
        })
    }
}
