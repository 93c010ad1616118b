use std::fmt;

use crate::config::{ConfigSpec, EnvironmentProvider, errors::ConfigError};

pub const JWT_SECRET_MIN_LENGTH: usize = 32;
pub const PEPPER_MIN_LENGTH: usize = 16;

/// Centralized holder for the token signing secret and the password pepper
pub struct SecretManager {
    jwt_secret: String,
    pepper: String,
}

impl SecretManager {
    /// Load and validate all secrets from the environment
    ///
    /// # Errors
    /// Returns `ConfigError` if any required secret is missing or too short
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        let jwt_secret = ConfigSpec::new(env, "JWT_SECRET")
            .required(true)
            .min_length(JWT_SECRET_MIN_LENGTH)
            .load()?;
        let pepper = ConfigSpec::new(env, "PASSWORD_PEPPER")
            .required(true)
            .min_length(PEPPER_MIN_LENGTH)
            .load()?;

        Ok(Self { jwt_secret, pepper })
    }

    /// Build from explicit values, applying the same length rules
    pub fn new(jwt_secret: impl Into<String>, pepper: impl Into<String>) -> Result<Self, ConfigError> {
        let jwt_secret = jwt_secret.into();
        let pepper = pepper.into();

        if jwt_secret.len() < JWT_SECRET_MIN_LENGTH {
            return Err(ConfigError::TooShort {
                setting_name: "JWT_SECRET".to_string(),
                expected: JWT_SECRET_MIN_LENGTH,
                actual: jwt_secret.len(),
            });
        }
        if pepper.len() < PEPPER_MIN_LENGTH {
            return Err(ConfigError::TooShort {
                setting_name: "PASSWORD_PEPPER".to_string(),
                expected: PEPPER_MIN_LENGTH,
                actual: pepper.len(),
            });
        }

        Ok(Self { jwt_secret, pepper })
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn pepper(&self) -> &str {
        &self.pepper
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("jwt_secret", &"<redacted>")
            .field("pepper", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretManager {{ secrets_loaded: 2 }}")
    }
}
