use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::Rng;

use crate::config::SecretManager;
use crate::errors::InternalError;

/// Local password hashing and verification
///
/// Argon2id with the application pepper as the secret parameter. Work runs on
/// the blocking pool. The stored hash never leaves this type in any form
/// other than the one it was given.
pub struct PasswordProvider {
    secret_manager: Arc<SecretManager>,
    params: Params,
}

impl PasswordProvider {
    pub fn new(secret_manager: Arc<SecretManager>) -> Self {
        Self::with_params(secret_manager, Params::default())
    }

    /// Explicit cost parameters, used by tests to keep hashing cheap
    pub fn with_params(secret_manager: Arc<SecretManager>, params: Params) -> Self {
        Self { secret_manager, params }
    }

    fn argon2<'a>(pepper: &'a [u8], params: Params) -> Result<Argon2<'a>, InternalError> {
        Argon2::new_with_secret(pepper, Algorithm::Argon2id, Version::V0x13, params)
            .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let secret_manager = Arc::clone(&self.secret_manager);
        let params = self.params.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut rand_core::OsRng);
            let argon2 = Self::argon2(secret_manager.pepper().as_bytes(), params)?;
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| InternalError::crypto("password_hash", e.to_string()))
        })
        .await
        .map_err(|e| InternalError::crypto("password_hash", e.to_string()))?
    }

    /// True only when `password` matches `stored_hash`. A malformed hash is a mismatch.
    pub async fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, InternalError> {
        let secret_manager = Arc::clone(&self.secret_manager);
        let params = self.params.clone();
        let stored_hash = stored_hash.to_string();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&stored_hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Stored password hash could not be parsed: {}", e);
                    return Ok(false);
                }
            };
            let argon2 = Self::argon2(secret_manager.pepper().as_bytes(), params)?;
            Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
        .map_err(|e| InternalError::crypto("password_verify", e.to_string()))?
    }

    /// Random password for newly created local accounts
    pub fn generate_password(&self) -> String {
        const PASSWORD_LENGTH: usize = 20;
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                 abcdefghijklmnopqrstuvwxyz\
                                 0123456789\
                                 !@#$%^&*()_+-=";

        let mut rng = rand::rng();
        (0..PASSWORD_LENGTH)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}
