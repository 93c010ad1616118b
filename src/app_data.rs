use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{ConfigHandle, EnvironmentProvider, RuntimeConfig, SecretManager};
use crate::errors::InternalError;
use crate::providers::{
    AuthenticationProvider, AuthorizationProvider, Clock, DirectoryConnector, DirectoryProvider, LdapConnector,
    PasswordProvider, SystemClock, TokenProvider,
};
use crate::stores::{LoginAttemptStore, ProposalStore, UserStore};

/// Centralized application data following the main-owned stores pattern
///
/// Stores and providers are created once and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init()
///   ├─ db, secret_manager, config (ConfigHandle), clock
///   ├─ user_store, login_attempt_store, proposal_store
///   └─ password / directory / token / authentication / authorization providers
///   ↓ wrapped in Arc<AppData>
///   ↓ passed to coordinators
///   ├─ LoginCoordinator::new(app_data)
///   ├─ ProposalCoordinator::new(app_data)
///   └─ UserCoordinator, LoginLogCoordinator, DirectoryConfigCoordinator
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub secret_manager: Arc<SecretManager>,
    pub config: Arc<ConfigHandle>,
    pub clock: Arc<dyn Clock>,
    pub user_store: Arc<UserStore>,
    pub login_attempt_store: Arc<LoginAttemptStore>,
    pub proposal_store: Arc<ProposalStore>,
    pub password_provider: Arc<PasswordProvider>,
    pub directory_provider: Arc<DirectoryProvider>,
    pub token_provider: Arc<TokenProvider>,
    pub authentication_provider: Arc<AuthenticationProvider>,
    pub authorization_provider: Arc<AuthorizationProvider>,
}

impl AppData {
    /// Wire stores and providers from already-built parts
    pub fn new(
        db: DatabaseConnection,
        secret_manager: Arc<SecretManager>,
        config: Arc<ConfigHandle>,
        clock: Arc<dyn Clock>,
        connector: Arc<dyn DirectoryConnector>,
        password_provider: PasswordProvider,
    ) -> Self {
        let user_store = Arc::new(UserStore::new(db.clone()));
        let login_attempt_store = Arc::new(LoginAttemptStore::new(db.clone()));
        let proposal_store = Arc::new(ProposalStore::new(db.clone()));

        let password_provider = Arc::new(password_provider);
        let directory_provider = Arc::new(DirectoryProvider::new(connector, Arc::clone(&config)));
        let token_provider = Arc::new(TokenProvider::new(
            Arc::clone(&secret_manager),
            Arc::clone(&config),
            Arc::clone(&clock),
        ));
        let authentication_provider = Arc::new(AuthenticationProvider::new(
            Arc::clone(&user_store),
            Arc::clone(&password_provider),
            Arc::clone(&directory_provider),
            Arc::clone(&config),
            Arc::clone(&clock),
        ));
        let authorization_provider = Arc::new(AuthorizationProvider::new(
            Arc::clone(&token_provider),
            Arc::clone(&user_store),
        ));

        Self {
            db,
            secret_manager,
            config,
            clock,
            user_store,
            login_attempt_store,
            proposal_store,
            password_provider,
            directory_provider,
            token_provider,
            authentication_provider,
            authorization_provider,
        }
    }

    /// Initialize production application data
    ///
    /// The database must already be connected and migrated.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` when secrets or runtime settings are missing or invalid
    pub fn init(db: DatabaseConnection, env: &dyn EnvironmentProvider) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        tracing::debug!("Initializing secret manager...");
        let secret_manager = Arc::new(
            SecretManager::from_env_provider(env)
                .map_err(|e| InternalError::parse("secret_manager", format!("Secret manager init failed: {e}")))?,
        );

        let runtime = RuntimeConfig::from_env_provider(env)
            .map_err(|e| InternalError::parse("runtime_config", e.to_string()))?;
        if !runtime.directory.is_configured() {
            tracing::warn!("LDAP_SERVER/LDAP_BASE_DN not set; directory logins will fail");
        }
        let config = Arc::new(ConfigHandle::new(runtime));

        let password_provider = PasswordProvider::new(Arc::clone(&secret_manager));
        let app_data = Self::new(
            db,
            secret_manager,
            config,
            Arc::new(SystemClock),
            Arc::new(LdapConnector),
            password_provider,
        );

        tracing::info!("AppData initialization complete");
        Ok(app_data)
    }
}
