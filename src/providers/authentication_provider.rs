use std::sync::Arc;

use crate::config::ConfigHandle;
use crate::errors::InternalError;
use crate::errors::internal::{DirectoryError, LoginError, login};
use crate::providers::clock::Clock;
use crate::providers::directory_provider::DirectoryProvider;
use crate::providers::password_provider::PasswordProvider;
use crate::stores::UserStore;
use crate::types::db::user;
use crate::types::internal::role::DEFAULT_DIRECTORY_ROLE;
use crate::types::internal::{AuthenticatedIdentity, DirectoryIdentity};

/// Resolves a username and password to an identity
///
/// Looks the username up locally, then dispatches to the directory or to the
/// local hash depending on the account's directory flag. Never both. After a
/// directory login the stored record is reconciled: profile fields come from
/// the directory while role and flags stay as stored.
pub struct AuthenticationProvider {
    user_store: Arc<UserStore>,
    password_provider: Arc<PasswordProvider>,
    directory_provider: Arc<DirectoryProvider>,
    config: Arc<ConfigHandle>,
    clock: Arc<dyn Clock>,
}

impl AuthenticationProvider {
    pub fn new(
        user_store: Arc<UserStore>,
        password_provider: Arc<PasswordProvider>,
        directory_provider: Arc<DirectoryProvider>,
        config: Arc<ConfigHandle>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_store,
            password_provider,
            directory_provider,
            config,
            clock,
        }
    }

    pub async fn resolve(&self, username: &str, password: &str) -> Result<AuthenticatedIdentity, InternalError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(LoginError::invalid_credentials(login::REASON_EMPTY_CREDENTIALS));
        }

        let record = self.user_store.find_by_username(username).await?;

        match record {
            None if self.config.snapshot().directory.auto_provision => {
                self.authenticate_directory(username, password, None).await
            }
            None => Err(LoginError::account_not_found(username)),
            Some(record) if !record.is_active => Err(LoginError::account_inactive(username)),
            Some(record) if record.is_directory_user => {
                self.authenticate_directory(username, password, Some(record)).await
            }
            Some(record) => self.authenticate_local(record, password).await,
        }
    }

    async fn authenticate_local(&self, record: user::Model, password: &str) -> Result<AuthenticatedIdentity, InternalError> {
        let Some(stored_hash) = record.password_hash.as_deref() else {
            tracing::warn!(user_id = %record.id, "local account has no password hash");
            return Err(LoginError::invalid_credentials(login::REASON_WRONG_PASSWORD));
        };

        if !self.password_provider.verify(stored_hash, password).await? {
            return Err(LoginError::invalid_credentials(login::REASON_WRONG_PASSWORD));
        }

        Ok(AuthenticatedIdentity::from(&record))
    }

    async fn authenticate_directory(
        &self,
        username: &str,
        password: &str,
        existing: Option<user::Model>,
    ) -> Result<AuthenticatedIdentity, InternalError> {
        let verified = self
            .directory_provider
            .authenticate(username, password)
            .await
            .map_err(|e| Self::map_directory_error(e, existing.is_some(), username))?;

        let reconciled = self.reconcile(existing, &verified).await?;

        // The stored flag wins over anything the directory says
        if !reconciled.is_active {
            return Err(LoginError::account_inactive(username));
        }

        Ok(AuthenticatedIdentity::from(&reconciled))
    }

    async fn reconcile(
        &self,
        existing: Option<user::Model>,
        verified: &DirectoryIdentity,
    ) -> Result<user::Model, InternalError> {
        let now = self.clock.unix_now();
        match existing {
            Some(record) => self.user_store.refresh_directory_profile(&record.id, verified, now).await,
            None => {
                tracing::info!(username = %verified.username, role = %DEFAULT_DIRECTORY_ROLE, "provisioning directory user");
                self.user_store
                    .provision_directory_user(verified, DEFAULT_DIRECTORY_ROLE, now)
                    .await
            }
        }
    }

    fn map_directory_error(err: DirectoryError, has_record: bool, username: &str) -> InternalError {
        match err {
            DirectoryError::Unavailable(detail) => LoginError::directory_unavailable(detail),
            DirectoryError::EntryNotFound(_) if !has_record => LoginError::account_not_found(username),
            DirectoryError::EntryNotFound(_) => {
                LoginError::invalid_credentials(login::REASON_DIRECTORY_ENTRY_MISSING)
            }
            DirectoryError::BindRejected => {
                LoginError::invalid_credentials(login::REASON_WRONG_DIRECTORY_PASSWORD)
            }
        }
    }
}
