use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::Storage;
use crate::error::RosterError;
use crate::server::handlers::{auth, users};

#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub config: Arc<Config>,
    key: Key,
}

impl AppState {
    pub fn new(storage: Storage, config: Arc<Config>) -> Self {
        // Stretch the configured secret to the 64 bytes a cookie key requires.
        let digest = Sha512::digest(config.secret_key.as_bytes());
        let key = Key::from(digest.as_slice());
        Self {
            storage,
            config,
            key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

/// Build the application router: session-gated reads, the bulk-create entry
/// point, CORS for the configured frontend origins, and the upload body cap.
pub fn app_router(state: AppState) -> Result<Router, RosterError> {
    let cors = cors_layer(&state.config)?;
    let body_limit = DefaultBodyLimit::max(state.config.upload.max_content_length);

    Ok(Router::new()
        .route("/api/authenticate", post(auth::authenticate))
        .route("/api/logout", post(auth::logout))
        .route("/api/user", get(users::current_user))
        .route("/api/users", get(users::list_users).post(users::bulk_create))
        .route("/api/sections", get(users::list_sections))
        .layer(cors)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(config: &Config) -> Result<CorsLayer, RosterError> {
    let mut origins = Vec::with_capacity(config.cors_origins.len());
    for origin in &config.cors_origins {
        let value = origin
            .parse::<HeaderValue>()
            .map_err(|e| RosterError::Config(format!("invalid CORS origin {origin:?}: {e}")))?;
        origins.push(value);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}
