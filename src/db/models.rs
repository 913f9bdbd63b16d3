use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct DbUser {
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DbSection {
    pub id: i64,
    pub abbreviation: String,
    pub name: String,
}

/// Wire shape accepted by the bulk-create entry point. `uid` is mandatory;
/// everything else falls back to defaults during insertion.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<String>>,
}

/// Public projection of a user row. Never carries the password hash.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub uid: String,
    pub name: String,
}

impl From<DbUser> for UserProfile {
    fn from(u: DbUser) -> Self {
        Self {
            id: u.id,
            uid: u.uid,
            name: u.name,
        }
    }
}
