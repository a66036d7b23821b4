//! Argon2id password hashing on the blocking thread pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use async_trait::async_trait;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id with default parameters and a random salt per hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

fn hash_blocking(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError::backend(err.to_string()))
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool, PasswordHashError> {
    let parsed =
        PasswordHash::new(hash).map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHashError::backend(err.to_string())),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|err| PasswordHashError::backend(err.to_string()))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .map_err(|err| PasswordHashError::backend(err.to_string()))?
    }
}
