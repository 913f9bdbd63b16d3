use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use time::Duration;

use crate::config::Config;
use crate::error::RosterError;
use crate::server::router::AppState;

const SESSION_TTL: Duration = Duration::days(1);

/// The authenticated caller, resolved from the private session cookie.
/// Rejects with 401 when the cookie is missing or fails decryption.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub uid: String,
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = RosterError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|err| -> RosterError { match err {} })?;
        let Some(cookie) = jar.get(&state.config.token_name) else {
            return Err(RosterError::Unauthorized);
        };
        Ok(Self {
            uid: cookie.value().to_string(),
        })
    }
}

/// Session cookie issued on successful authentication.
pub fn session_cookie(config: &Config, uid: &str) -> Cookie<'static> {
    Cookie::build(Cookie::new(config.token_name.clone(), uid.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(SESSION_TTL)
        .build()
}

pub fn clear_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build(Cookie::new(config.token_name.clone(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
