use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::info;

use crate::db::UserProfile;
use crate::error::RosterError;
use crate::server::router::AppState;
use crate::server::session;
use crate::service::password;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub uid: String,
    pub password: String,
}

/// POST /api/authenticate -> verifies credentials and issues the session cookie.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, RosterError> {
    let user = state
        .storage
        .user_by_uid(&req.uid)
        .await?
        .ok_or(RosterError::Unauthorized)?;

    if !password::verify(&req.password, &user.password_hash)? {
        return Err(RosterError::Unauthorized);
    }

    info!(uid = %user.uid, "session established");
    let jar = jar.add(session::session_cookie(&state.config, &user.uid));
    Ok((jar, Json(UserProfile::from(user))))
}

/// POST /api/logout -> drops the session cookie.
pub async fn logout(State(state): State<AppState>, jar: PrivateCookieJar) -> impl IntoResponse {
    let jar = jar.remove(session::clear_cookie(&state.config));
    (jar, StatusCode::NO_CONTENT)
}
