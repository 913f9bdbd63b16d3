use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::db::{DbSection, UserProfile, UserRecord};
use crate::error::RosterError;
use crate::server::router::AppState;
use crate::server::session::SessionUser;
use crate::service::password;

#[derive(Debug, Serialize)]
pub struct BulkCreateSummary {
    pub created: usize,
}

/// GET /api/user -> profile of the authenticated caller.
pub async fn current_user(
    session: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, RosterError> {
    let user = state
        .storage
        .user_by_uid(&session.uid)
        .await?
        .ok_or(RosterError::Unauthorized)?;
    Ok(Json(user.into()))
}

/// GET /api/users -> every user on record.
pub async fn list_users(
    _session: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfile>>, RosterError> {
    let users = state.storage.list_users().await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// GET /api/sections -> every class section on record.
pub async fn list_sections(
    _session: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<DbSection>>, RosterError> {
    Ok(Json(state.storage.list_sections().await?))
}

/// POST /api/users -> the bulk-create entry point.
///
/// Accepts a JSON array of user records (or `{"users": [...]}`). The whole
/// request is validated before the first insert: any malformed record or
/// empty uid rejects the batch with 400. Passwords are hashed on the way in,
/// and named sections are created and linked.
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<BulkCreateSummary>, RosterError> {
    let records = parse_records(payload)?;

    let mut created = 0usize;
    for record in &records {
        let raw_password = record
            .password
            .as_deref()
            .unwrap_or(&state.config.default_password);
        let password_hash = password::hash(raw_password)?;
        let name = record.name.clone().unwrap_or_else(|| record.uid.clone());

        let user_id = state
            .storage
            .upsert_user(&record.uid, &name, &password_hash)
            .await?;

        for abbreviation in record.sections.iter().flatten() {
            let section_id = state
                .storage
                .upsert_section(abbreviation, abbreviation)
                .await?;
            state.storage.link_user_section(user_id, section_id).await?;
        }
        created += 1;
    }

    info!(created, "bulk create finished");
    Ok(Json(BulkCreateSummary { created }))
}

fn parse_records(payload: Value) -> Result<Vec<UserRecord>, RosterError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("users") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(RosterError::Validation(
                    "expected a JSON array of user records".to_string(),
                ));
            }
        },
        _ => {
            return Err(RosterError::Validation(
                "expected a JSON array of user records".to_string(),
            ));
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let record: UserRecord = serde_json::from_value(item)
            .map_err(|e| RosterError::Validation(format!("malformed user record: {e}")))?;
        if record.uid.trim().is_empty() {
            return Err(RosterError::Validation(
                "user record with empty uid".to_string(),
            ));
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_accepts_bare_array_and_wrapped_object() {
        let bare = json!([{"uid": "a"}, {"uid": "b", "name": "B"}]);
        assert_eq!(parse_records(bare).unwrap().len(), 2);

        let wrapped = json!({"users": [{"uid": "c"}]});
        assert_eq!(parse_records(wrapped).unwrap().len(), 1);
    }

    #[test]
    fn parse_rejects_missing_or_empty_uid() {
        assert!(parse_records(json!([{"name": "no uid"}])).is_err());
        assert!(parse_records(json!([{"uid": "  "}])).is_err());
    }

    #[test]
    fn parse_rejects_non_list_payloads() {
        assert!(parse_records(json!("nope")).is_err());
        assert!(parse_records(json!({"records": []})).is_err());
    }
}
