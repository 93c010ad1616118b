use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{
    ConfigSpec, EnvironmentProvider,
    config_spec::{validate_expiry_hours, validate_port, validate_positive},
    errors::ConfigError,
};

/// Session token parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    pub expiry_hours: i64,
    pub issuer: String,
}

/// Directory connection parameters
#[derive(Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    pub server: String,
    pub port: u16,
    pub base_dn: String,
    pub bind_username: String,
    pub bind_password: String,
    pub timeout_secs: u64,
    /// Try the directory for usernames with no local record, provisioning them on success
    pub auto_provision: bool,
}

impl DirectorySettings {
    pub fn url(&self) -> String {
        format!("ldap://{}:{}", self.server, self.port)
    }

    pub fn is_configured(&self) -> bool {
        !self.server.is_empty() && !self.base_dn.is_empty()
    }
}

impl fmt::Debug for DirectorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorySettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("base_dn", &self.base_dn)
            .field("bind_username", &self.bind_username)
            .field("bind_password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("auto_provision", &self.auto_provision)
            .finish()
    }
}

/// Settings that may change while the server runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub token: TokenSettings,
    pub directory: DirectorySettings,
}

impl RuntimeConfig {
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        let token = TokenSettings {
            expiry_hours: ConfigSpec::new(env, "JWT_EXPIRY_HOURS")
                .default_value("24")
                .validator(validate_expiry_hours)
                .load_parsed()?,
            issuer: ConfigSpec::new(env, "JWT_ISSUER")
                .default_value("proposal-backend")
                .load()?,
        };

        let directory = DirectorySettings {
            server: ConfigSpec::new(env, "LDAP_SERVER").load()?,
            port: ConfigSpec::new(env, "LDAP_PORT")
                .default_value("389")
                .validator(validate_port)
                .load_parsed()?,
            base_dn: ConfigSpec::new(env, "LDAP_BASE_DN").load()?,
            bind_username: ConfigSpec::new(env, "LDAP_BIND_USERNAME").load()?,
            bind_password: ConfigSpec::new(env, "LDAP_BIND_PASSWORD").load()?,
            timeout_secs: ConfigSpec::new(env, "LDAP_TIMEOUT_SECS")
                .default_value("10")
                .validator(validate_positive)
                .load_parsed()?,
            auto_provision: ConfigSpec::new(env, "LDAP_AUTO_PROVISION").load_bool()?,
        };

        Ok(Self { token, directory })
    }
}

/// Shared, swappable view of [`RuntimeConfig`]
///
/// Readers take an `Arc` snapshot and keep using it for the rest of their
/// operation, so an update never produces a half-old, half-new read. Writers
/// replace the whole snapshot.
pub struct ConfigHandle {
    current: RwLock<Arc<RuntimeConfig>>,
}

impl ConfigHandle {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { current: RwLock::new(Arc::new(config)) }
    }

    pub fn snapshot(&self) -> Arc<RuntimeConfig> {
        Arc::clone(&self.current.read())
    }

    /// Apply `f` to a copy of the current config and publish the result
    pub fn update<F>(&self, f: F) -> Arc<RuntimeConfig>
    where
        F: FnOnce(&mut RuntimeConfig),
    {
        let mut guard = self.current.write();
        let mut next = RuntimeConfig::clone(&guard);
        f(&mut next);
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        next
    }
}

impl fmt::Debug for ConfigHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigHandle").field("current", &self.snapshot()).finish()
    }
}
