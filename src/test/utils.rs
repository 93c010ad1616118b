// Test utilities shared across unit tests
// Only compiled when running tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use argon2::Params;
use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::config::{ConfigHandle, DirectorySettings, RuntimeConfig, SecretManager, TokenSettings};
use crate::errors::internal::DirectoryError;
use crate::providers::{DirectoryConnector, DirectoryEntry, DirectorySession, ManualClock, PasswordProvider};
use crate::stores::NewUser;
use crate::types::db::user;
use crate::types::internal::{AuthenticatedIdentity, UserRole};

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";
pub const TEST_PEPPER: &str = "test-pepper-for-unit-tests";
pub const TEST_START: i64 = 1_750_000_000;

/// In-memory SQLite with the full schema
///
/// A single pooled connection keeps every query on the same in-memory database.
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

/// File-backed SQLite with a pool of several connections
///
/// For tests that need transactions to really run side by side. The file is
/// created under the system temp directory; callers remove it when done.
pub async fn setup_file_test_db(path: &std::path::Path) -> DatabaseConnection {
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options.max_connections(4).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to create file database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Runtime settings with an unconfigured directory
pub fn test_runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        token: TokenSettings {
            expiry_hours: 24,
            issuer: "proposal-backend".to_string(),
        },
        directory: DirectorySettings {
            server: String::new(),
            port: 389,
            base_dn: String::new(),
            bind_username: "svc-proposals".to_string(),
            bind_password: "svc-password".to_string(),
            timeout_secs: 10,
            auto_provision: false,
        },
    }
}

pub fn test_secret_manager() -> Arc<SecretManager> {
    Arc::new(SecretManager::new(TEST_JWT_SECRET, TEST_PEPPER).expect("test secrets are valid"))
}

/// Argon2 with minimal cost so tests stay fast
pub fn test_password_provider() -> PasswordProvider {
    PasswordProvider::with_params(
        test_secret_manager(),
        Params::new(1024, 1, 1, None).expect("valid argon2 params"),
    )
}

#[derive(Clone)]
struct FakeAccount {
    password: String,
    entry: DirectoryEntry,
}

#[derive(Default)]
struct FakeDirectoryState {
    accounts: HashMap<String, FakeAccount>,
    unreachable: bool,
    connects: AtomicUsize,
}

/// In-memory directory for tests
///
/// The service account is whatever `test_runtime_config` configures. Entries
/// get `cn = "cn-<username>"`. Clones share state so connection counts can be
/// read after the directory was handed to a provider.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<FakeDirectoryState>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory that refuses every connection
    pub fn unreachable() -> Self {
        Self {
            state: Arc::new(FakeDirectoryState { unreachable: true, ..Default::default() }),
        }
    }

    pub fn with_user(self, username: &str, password: &str, display_name: &str, mail: &str) -> Self {
        let mut accounts = self.state.accounts.clone();
        accounts.insert(
            username.to_string(),
            FakeAccount {
                password: password.to_string(),
                entry: DirectoryEntry {
                    dn: format!("CN={username},OU=Users,DC=corp,DC=test"),
                    cn: format!("cn-{username}"),
                    mail: mail.to_string(),
                    display_name: display_name.to_string(),
                    department: "Finance".to_string(),
                },
            },
        );
        Self {
            state: Arc::new(FakeDirectoryState {
                accounts,
                unreachable: self.state.unreachable,
                connects: AtomicUsize::new(self.connect_count()),
            }),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryConnector for FakeDirectory {
    async fn connect(&self, settings: &DirectorySettings) -> Result<Box<dyn DirectorySession>, DirectoryError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        if self.state.unreachable {
            return Err(DirectoryError::unavailable(format!("connect to {}: refused", settings.url())));
        }
        Ok(Box::new(FakeSession {
            state: Arc::clone(&self.state),
            service_account: (settings.bind_username.clone(), settings.bind_password.clone()),
        }))
    }
}

struct FakeSession {
    state: Arc<FakeDirectoryState>,
    service_account: (String, String),
}

#[async_trait]
impl DirectorySession for FakeSession {
    async fn bind(&mut self, dn: &str, password: &str) -> Result<(), DirectoryError> {
        if dn == self.service_account.0 {
            return if password == self.service_account.1 { Ok(()) } else { Err(DirectoryError::BindRejected) };
        }

        let matched = self
            .state
            .accounts
            .values()
            .any(|account| account.entry.dn == dn && account.password == password);
        if matched { Ok(()) } else { Err(DirectoryError::BindRejected) }
    }

    async fn search_user(&mut self, _base_dn: &str, username: &str) -> Result<Option<DirectoryEntry>, DirectoryError> {
        Ok(self.state.accounts.get(username).map(|account| account.entry.clone()))
    }

    async fn close(&mut self) {}
}

/// Fully wired application data over an in-memory database and a manual clock
pub struct TestContext {
    pub app_data: Arc<AppData>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    /// `directory` is configured as the active directory server
    pub async fn new(directory: FakeDirectory) -> Self {
        Self::with_db(directory, setup_test_db().await)
    }

    pub fn with_db(directory: FakeDirectory, db: DatabaseConnection) -> Self {
        let mut runtime = test_runtime_config();
        runtime.directory.server = "dc01.corp.test".to_string();
        runtime.directory.base_dn = "DC=corp,DC=test".to_string();

        let clock = Arc::new(ManualClock::at_unix(TEST_START));
        let app_data = AppData::new(
            db,
            test_secret_manager(),
            Arc::new(ConfigHandle::new(runtime)),
            clock.clone(),
            Arc::new(directory),
            test_password_provider(),
        );

        Self { app_data: Arc::new(app_data), clock }
    }

    /// Active local account with a real hash of `password`
    pub async fn local_user(&self, username: &str, password: &str, role: UserRole) -> user::Model {
        let hash = self
            .app_data
            .password_provider
            .hash_password(password)
            .await
            .expect("hashing succeeds");
        self.app_data
            .user_store
            .create(
                NewUser {
                    username: username.to_string(),
                    email: Some(format!("{username}@corp.test")),
                    full_name: username.to_string(),
                    role,
                    department: "Finance".to_string(),
                    is_directory_user: false,
                    password_hash: Some(hash),
                },
                TEST_START,
            )
            .await
            .expect("user is created")
    }

    pub fn token_for(&self, user: &user::Model) -> String {
        self.app_data
            .token_provider
            .issue(&AuthenticatedIdentity::from(user))
            .expect("token is issued")
            .token
    }
}
