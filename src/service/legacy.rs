use reqwest::Response;
use serde_json::Value;
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::config::LegacySettings;
use crate::error::{RemoteFailure, RosterError};

const AUTH_FAILED: &str = "Failed to authenticate";
const EXTRACT_FAILED: &str = "Failed to extract legacy data";

/// Client for the legacy service's export API. The cookie store carries the
/// session artifact returned by authentication, so extraction calls made on
/// the same client are automatically authenticated.
pub struct LegacyClient {
    http: reqwest::Client,
    auth_url: Url,
    data_url: Url,
}

impl LegacyClient {
    pub fn new(legacy: &LegacySettings) -> Result<Self, RosterError> {
        let http = reqwest::Client::builder()
            .user_agent("rosterd-migrate/0.3")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            auth_url: legacy.auth_url.clone(),
            data_url: legacy.data_url.clone(),
        })
    }

    /// Authenticate and store the returned session cookie.
    pub async fn authenticate(&self, uid: &str, password: &str) -> Result<(), RemoteFailure> {
        let body = serde_json::json!({ "uid": uid, "password": password });
        let resp = self
            .http
            .post(self.auth_url.clone())
            .header("X-Origin", "client")
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteFailure::transport(AUTH_FAILED, &e))?;
        Self::check_status(AUTH_FAILED, resp).await?;
        info!(uid, "authenticated against legacy service");
        Ok(())
    }

    /// Fetch the full legacy user dataset as one JSON document.
    pub async fn fetch_users(&self) -> Result<Value, RemoteFailure> {
        let resp = self
            .http
            .get(self.data_url.clone())
            .header("X-Origin", "client")
            .send()
            .await
            .map_err(|e| RemoteFailure::transport(EXTRACT_FAILED, &e))?;
        let resp = Self::check_status(EXTRACT_FAILED, resp).await?;
        resp.json()
            .await
            .map_err(|e| RemoteFailure::transport(EXTRACT_FAILED, &e))
    }

    async fn check_status(message: &str, resp: Response) -> Result<Response, RemoteFailure> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let error = if body.is_empty() {
            status.to_string()
        } else {
            body
        };
        Err(RemoteFailure::status(message, status.as_u16(), error))
    }
}
