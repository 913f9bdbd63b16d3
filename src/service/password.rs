//! Password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::RosterError;

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash(input: &str) -> Result<String, RosterError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(input.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| RosterError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored hash. Parameters come from the hash itself.
pub fn verify(input: &str, hash: &str) -> Result<bool, RosterError> {
    let parsed = PasswordHash::new(hash).map_err(|e| RosterError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(input.as_bytes(), &parsed)
        .is_ok())
}
