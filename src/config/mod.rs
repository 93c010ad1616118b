mod config_spec;
mod database;
mod env_provider;
pub mod errors;
mod logging;
pub mod runtime;
mod secret_manager;
mod settings;

pub use config_spec::ConfigSpec;
pub use database::{connect as connect_database, migrate as migrate_database};
pub use env_provider::{EnvironmentProvider, SystemEnvironment};
#[cfg(test)]
pub use env_provider::MockEnvironment;
pub use errors::ConfigError;
pub use logging::{LoggingConfig, LoggingError, init_logging};
pub use runtime::{ConfigHandle, DirectorySettings, RuntimeConfig, TokenSettings};
pub use secret_manager::SecretManager;
pub use settings::AppSettings;
