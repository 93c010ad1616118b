// Common test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use argon2::Params;
use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use proposal_backend::AppData;
use proposal_backend::config::{ConfigHandle, DirectorySettings, RuntimeConfig, SecretManager, TokenSettings};
use proposal_backend::coordinators::{LoginCoordinator, NewAccount, UserCoordinator};
use proposal_backend::errors::internal::DirectoryError;
use proposal_backend::providers::{DirectoryConnector, DirectoryEntry, DirectorySession, ManualClock, PasswordProvider};
use proposal_backend::types::db::user;
use proposal_backend::types::internal::{ClientMeta, RequestContext, UserRole};

pub const JWT_SECRET: &str = "integration-secret-key-at-least-32-chars";
pub const START: i64 = 1_760_000_000;

/// Creates an in-memory database with migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Directory with a fixed set of accounts
#[derive(Clone, Default)]
pub struct StaticDirectory {
    accounts: Arc<HashMap<String, (DirectoryEntry, String)>>,
}

impl StaticDirectory {
    pub fn with_accounts(accounts: &[(&str, &str)]) -> Self {
        let accounts = accounts
            .iter()
            .map(|(username, password)| {
                let entry = DirectoryEntry {
                    dn: format!("CN={username},OU=Staff,DC=example,DC=org"),
                    cn: username.to_string(),
                    mail: format!("{username}@example.org"),
                    display_name: format!("{username} (directory)"),
                    department: "Treasury".to_string(),
                };
                (username.to_string(), (entry, password.to_string()))
            })
            .collect();
        Self { accounts: Arc::new(accounts) }
    }
}

#[async_trait]
impl DirectoryConnector for StaticDirectory {
    async fn connect(&self, settings: &DirectorySettings) -> Result<Box<dyn DirectorySession>, DirectoryError> {
        Ok(Box::new(StaticSession {
            accounts: Arc::clone(&self.accounts),
            service: (settings.bind_username.clone(), settings.bind_password.clone()),
        }))
    }
}

struct StaticSession {
    accounts: Arc<HashMap<String, (DirectoryEntry, String)>>,
    service: (String, String),
}

#[async_trait]
impl DirectorySession for StaticSession {
    async fn bind(&mut self, dn: &str, password: &str) -> Result<(), DirectoryError> {
        let ok = (dn == self.service.0 && password == self.service.1)
            || self.accounts.values().any(|(entry, pw)| entry.dn == dn && pw == password);
        if ok { Ok(()) } else { Err(DirectoryError::BindRejected) }
    }

    async fn search_user(&mut self, _base_dn: &str, username: &str) -> Result<Option<DirectoryEntry>, DirectoryError> {
        Ok(self.accounts.get(username).map(|(entry, _)| entry.clone()))
    }

    async fn close(&mut self) {}
}

/// Application wired over an in-memory database, a manual clock and a static directory
pub struct TestApp {
    pub app_data: Arc<AppData>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub async fn new(directory: StaticDirectory) -> Self {
        Self::with_secret(directory, JWT_SECRET).await
    }

    pub async fn with_secret(directory: StaticDirectory, jwt_secret: &str) -> Self {
        let secret_manager = Arc::new(
            SecretManager::new(jwt_secret, "integration-pepper-value").expect("valid secrets"),
        );
        let runtime = RuntimeConfig {
            token: TokenSettings {
                expiry_hours: 8,
                issuer: "proposal-backend".to_string(),
            },
            directory: DirectorySettings {
                server: "ldap.example.org".to_string(),
                port: 389,
                base_dn: "DC=example,DC=org".to_string(),
                bind_username: "svc-bind".to_string(),
                bind_password: "svc-secret".to_string(),
                timeout_secs: 5,
                auto_provision: false,
            },
        };
        let clock = Arc::new(ManualClock::at_unix(START));
        let params = Params::new(1024, 1, 1, None).expect("valid argon2 params");

        let app_data = AppData::new(
            setup_test_db().await,
            Arc::clone(&secret_manager),
            Arc::new(ConfigHandle::new(runtime)),
            clock.clone(),
            Arc::new(directory),
            PasswordProvider::with_params(secret_manager, params),
        );

        Self { app_data: Arc::new(app_data), clock }
    }

    /// Local account created the way the CLI does it
    pub async fn local_user(&self, username: &str, password: &str, role: UserRole) -> user::Model {
        UserCoordinator::new(Arc::clone(&self.app_data))
            .create_unchecked(NewAccount {
                username: username.to_string(),
                email: None,
                full_name: username.to_string(),
                role,
                department: "Finance".to_string(),
                is_directory_user: false,
                password: Some(password.to_string()),
            })
            .await
            .expect("account is created")
            .user
    }

    pub async fn directory_user(&self, username: &str, role: UserRole) -> user::Model {
        UserCoordinator::new(Arc::clone(&self.app_data))
            .create_unchecked(NewAccount {
                username: username.to_string(),
                email: None,
                full_name: username.to_string(),
                role,
                department: String::new(),
                is_directory_user: true,
                password: None,
            })
            .await
            .expect("account is created")
            .user
    }

    /// Log in and return an authenticated request context
    pub async fn session(&self, username: &str, password: &str) -> RequestContext {
        let ctx = RequestContext::for_api(ClientMeta::default());
        let (token, _) = LoginCoordinator::new(Arc::clone(&self.app_data))
            .login(&ctx, username, password)
            .await
            .expect("login succeeds");
        self.app_data
            .authorization_provider
            .authenticate(RequestContext::for_api(ClientMeta::default()), Some(&token.token))
            .expect("fresh token validates")
    }
}
