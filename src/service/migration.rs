//! Legacy-data migration runner.
//!
//! A one-shot, strictly sequential procedure: pre-flight confirmation when
//! the schema already holds tables, optional file backup, authenticate
//! against the legacy service, extract the full user dataset, drop and
//! recreate the schema, seed defaults, then replay the extracted payload
//! through the application's own bulk-create endpoint. Every external call
//! is all-or-nothing: no retries, no partial commit, no rollback. A replay
//! failure therefore leaves seed data in place with no legacy data; rerunning
//! starts over from the confirmation prompt.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use tower::util::ServiceExt;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::Storage;
use crate::error::RosterError;
use crate::server::{AppState, app_router};
use crate::service::legacy::LegacyClient;
use crate::service::seed;

/// Operator confirmation capability, injectable so tests can script answers.
pub trait ConfirmationProvider: Send {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Interactive confirmation on standard input; accepts `y`/`Y`.
pub struct StdinConfirmation;

impl ConfirmationProvider for StdinConfirmation {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        println!("{prompt}");
        print!("Do you want to continue? (y/n) ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().eq_ignore_ascii_case("y"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Completed,
    /// The operator declined the destructive migration; nothing was touched.
    Declined,
}

pub struct MigrationRunner {
    config: Arc<Config>,
    storage: Storage,
    legacy: LegacyClient,
    confirm: Box<dyn ConfirmationProvider>,
}

impl MigrationRunner {
    pub fn new(
        config: Arc<Config>,
        storage: Storage,
        confirm: Box<dyn ConfirmationProvider>,
    ) -> Result<Self, RosterError> {
        let legacy = LegacyClient::new(&config.legacy)?;
        Ok(Self {
            config,
            storage,
            legacy,
            confirm,
        })
    }

    pub async fn run(&mut self) -> Result<MigrationOutcome, RosterError> {
        let tables = self.storage.table_names().await?;
        if !tables.is_empty() {
            warn!(
                tables = tables.len(),
                "existing schema detected; migration drops all local data"
            );
            if !self
                .confirm
                .confirm("Warning, you are about to lose all data in the database!")?
            {
                info!("migration declined; exiting without changes");
                return Ok(MigrationOutcome::Declined);
            }
        }

        self.backup()?;

        self.legacy
            .authenticate(&self.config.default_user, &self.config.default_password)
            .await
            .map_err(RosterError::RemoteCall)?;

        let payload = self
            .legacy
            .fetch_users()
            .await
            .map_err(RosterError::RemoteCall)?;
        info!("legacy data extracted");

        self.storage.drop_schema().await?;
        info!("all tables dropped");
        self.storage.init_schema().await?;
        info!("all tables created");

        seed::seed_defaults(&self.storage, &self.config).await?;

        self.replay(payload).await?;
        info!("legacy data loaded through bulk-create endpoint");

        Ok(MigrationOutcome::Completed)
    }

    /// Copy the database file aside before the destructive rebuild. Only
    /// file-backed stores can be backed up; anything else gets a warning.
    fn backup(&self) -> Result<(), RosterError> {
        let descriptor = self.config.database();
        match (descriptor.file_path(), self.config.backup_file.as_ref()) {
            (Some(source), Some(target)) if source.exists() => {
                fs::copy(source, target)?;
                info!(backup = %target.display(), "database backed up");
            }
            (Some(_), Some(_)) => {
                info!("no database file yet; nothing to back up");
            }
            _ => {
                warn!("backup not supported for this database configuration");
            }
        }
        Ok(())
    }

    /// Submit the extracted payload to the application's own bulk-create
    /// endpoint, so migrated data passes the same validation as normal writes.
    async fn replay(&self, payload: Value) -> Result<(), RosterError> {
        let state = AppState::new(self.storage.clone(), self.config.clone());
        let app = app_router(state)?;

        let request = Request::builder()
            .method("POST")
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload)?))?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|err: std::convert::Infallible| -> RosterError { match err {} })?;

        if response.status() != StatusCode::OK {
            return Err(RosterError::ReplayRejected(response.status()));
        }
        Ok(())
    }
}
