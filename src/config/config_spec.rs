use crate::config::{EnvironmentProvider, errors::ConfigError};

/// Specification for a single environment-backed setting
///
/// Resolution order is environment variable, then default. Empty values are
/// treated as unset.
pub struct ConfigSpec<'a> {
    env: &'a dyn EnvironmentProvider,
    name: &'static str,
    default_value: Option<&'static str>,
    required: bool,
    min_length: Option<usize>,
    validator: Option<fn(&str) -> Result<(), String>>,
}

impl<'a> ConfigSpec<'a> {
    pub fn new(env: &'a dyn EnvironmentProvider, name: &'static str) -> Self {
        Self {
            env,
            name,
            default_value: None,
            required: false,
            min_length: None,
            validator: None,
        }
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn validator(mut self, f: fn(&str) -> Result<(), String>) -> Self {
        self.validator = Some(f);
        self
    }

    /// Resolve the raw string value
    pub fn load(&self) -> Result<String, ConfigError> {
        let value = match self.env.get_var(self.name).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => match self.default_value {
                Some(default) => default.to_string(),
                None if self.required => return Err(ConfigError::missing(self.name)),
                None => String::new(),
            },
        };

        if let Some(min_len) = self.min_length {
            if value.len() < min_len {
                return Err(ConfigError::TooShort {
                    setting_name: self.name.to_string(),
                    expected: min_len,
                    actual: value.len(),
                });
            }
        }

        if let Some(validate) = self.validator {
            validate(&value).map_err(|reason| ConfigError::invalid(self.name, reason))?;
        }

        Ok(value)
    }

    pub fn load_parsed<T>(&self) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.load()?;
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(self.name, format!("'{raw}': {e}")))
    }

    pub fn load_bool(&self) -> Result<bool, ConfigError> {
        let raw = self.load()?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(ConfigError::invalid(self.name, format!("'{other}' is not a boolean"))),
        }
    }
}

pub fn validate_port(value: &str) -> Result<(), String> {
    match value.trim().parse::<u16>() {
        Ok(0) => Err("port must be between 1 and 65535".to_string()),
        Ok(_) => Ok(()),
        Err(_) => Err(format!("'{value}' is not a valid port")),
    }
}

pub fn validate_positive(value: &str) -> Result<(), String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(_) => Ok(()),
        Err(_) => Err(format!("'{value}' is not a positive integer")),
    }
}

/// Longest accepted session lifetime: one year
pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 24 * 366;

pub fn validate_expiry_hours(value: &str) -> Result<(), String> {
    validate_positive(value)?;
    match value.trim().parse::<u64>() {
        Ok(hours) if hours <= MAX_TOKEN_EXPIRY_HOURS => Ok(()),
        _ => Err(format!("must be at most {MAX_TOKEN_EXPIRY_HOURS} hours")),
    }
}
