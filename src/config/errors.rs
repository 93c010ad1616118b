use thiserror::Error;

/// Startup and runtime configuration failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required setting '{setting_name}' is missing")]
    Missing { setting_name: String },

    #[error("Setting '{setting_name}' must be at least {expected} characters, got {actual}")]
    TooShort {
        setting_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid setting '{setting_name}': {reason}")]
    Invalid { setting_name: String, reason: String },
}

impl ConfigError {
    pub fn missing(setting_name: &str) -> Self {
        Self::Missing { setting_name: setting_name.to_string() }
    }

    pub fn invalid(setting_name: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            setting_name: setting_name.to_string(),
            reason: reason.into(),
        }
    }
}
