use tracing::info;

use crate::config::Config;
use crate::db::Storage;
use crate::error::RosterError;
use crate::service::password;

/// Baseline accounts present even when no migration has ever succeeded.
const BASELINE_USERS: &[(&str, &str)] = &[("alice", "Alice Turing"), ("grace", "Grace Hopper")];

const BASELINE_SECTIONS: &[(&str, &str)] = &[
    ("CSA", "Computer Science A"),
    ("CSP", "Computer Science Principles"),
];

/// Insert the default administrator, baseline users and baseline sections.
/// All inserts are upserts, so reseeding an existing store is harmless.
pub async fn seed_defaults(storage: &Storage, config: &Config) -> Result<(), RosterError> {
    let admin_hash = password::hash(&config.default_password)?;
    storage
        .upsert_user(&config.default_user, "Administrator", &admin_hash)
        .await?;

    for (uid, name) in BASELINE_USERS {
        let hash = password::hash(&config.default_password)?;
        storage.upsert_user(uid, name, &hash).await?;
    }

    for (abbreviation, name) in BASELINE_SECTIONS {
        storage.upsert_section(abbreviation, name).await?;
    }

    info!(
        users = 1 + BASELINE_USERS.len(),
        sections = BASELINE_SECTIONS.len(),
        "default records seeded"
    );
    Ok(())
}
