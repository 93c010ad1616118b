use std::fmt;

use crate::config::{
    ConfigSpec, EnvironmentProvider,
    config_spec::validate_port,
    errors::ConfigError,
};

/// Infrastructure settings read once at startup
#[derive(Clone, PartialEq, Eq)]
pub struct AppSettings {
    host: String,
    port: u16,
    database_url: String,
    frontend_url: String,
    app_env: String,
}

impl AppSettings {
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        Ok(Self {
            host: ConfigSpec::new(env, "HOST").default_value("0.0.0.0").load()?,
            port: ConfigSpec::new(env, "PORT")
                .default_value("8080")
                .validator(validate_port)
                .load_parsed()?,
            database_url: ConfigSpec::new(env, "DATABASE_URL")
                .default_value("sqlite://proposals.db?mode=rwc")
                .load()?,
            frontend_url: ConfigSpec::new(env, "FRONTEND_URL")
                .default_value("http://localhost:3000")
                .load()?,
            app_env: ConfigSpec::new(env, "APP_ENV").default_value("development").load()?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn frontend_url(&self) -> &str {
        &self.frontend_url
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

// DATABASE_URL may embed credentials
impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &"<redacted>")
            .field("frontend_url", &self.frontend_url)
            .field("app_env", &self.app_env)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::from_env_provider(&MockEnvironment::empty()).unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert_eq!(settings.database_url(), "sqlite://proposals.db?mode=rwc");
        assert!(!settings.is_production());
    }

    #[test]
    fn test_invalid_port() {
        let env = MockEnvironment::empty().with_var("PORT", "http");
        assert!(AppSettings::from_env_provider(&env).is_err());
    }
}
