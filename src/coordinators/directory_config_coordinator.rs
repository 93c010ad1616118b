use std::sync::Arc;

use crate::app_data::AppData;
use crate::config::{ConfigHandle, DirectorySettings};
use crate::errors::InternalError;
use crate::errors::internal::WorkflowError;
use crate::providers::authorization_provider::ADMIN_ONLY;
use crate::providers::{AuthorizationProvider, DirectoryProvider};
use crate::types::internal::RequestContext;

/// Partial directory settings change; `None` keeps the current value
#[derive(Clone, Default)]
pub struct DirectorySettingsChange {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub base_dn: Option<String>,
    pub bind_username: Option<String>,
    pub bind_password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub auto_provision: Option<bool>,
}

impl DirectorySettingsChange {
    fn apply(self, settings: &mut DirectorySettings) {
        if let Some(server) = self.server {
            settings.server = server.trim().to_string();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(base_dn) = self.base_dn {
            settings.base_dn = base_dn.trim().to_string();
        }
        if let Some(bind_username) = self.bind_username {
            settings.bind_username = bind_username;
        }
        // An empty password in an update means "unchanged"
        if let Some(bind_password) = self.bind_password.filter(|p| !p.is_empty()) {
            settings.bind_password = bind_password;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.timeout_secs = timeout_secs;
        }
        if let Some(auto_provision) = self.auto_provision {
            settings.auto_provision = auto_provision;
        }
    }
}

/// Directory settings administration
///
/// Updates publish a new runtime snapshot; requests already running keep the
/// snapshot they started with. Changes live in memory only.
pub struct DirectoryConfigCoordinator {
    config: Arc<ConfigHandle>,
    directory_provider: Arc<DirectoryProvider>,
    authorization_provider: Arc<AuthorizationProvider>,
}

impl DirectoryConfigCoordinator {
    /// Create DirectoryConfigCoordinator from AppData
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            config: Arc::clone(&app_data.config),
            directory_provider: Arc::clone(&app_data.directory_provider),
            authorization_provider: Arc::clone(&app_data.authorization_provider),
        }
    }

    pub async fn get(&self, ctx: &RequestContext) -> Result<DirectorySettings, InternalError> {
        self.authorization_provider
            .require_active_role(ctx, ADMIN_ONLY, "read directory settings")
            .await?;
        Ok(self.config.snapshot().directory.clone())
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        change: DirectorySettingsChange,
    ) -> Result<DirectorySettings, InternalError> {
        let caller = self
            .authorization_provider
            .require_active_role(ctx, ADMIN_ONLY, "update directory settings")
            .await?;
        if change.port == Some(0) {
            return Err(WorkflowError::validation("port must be between 1 and 65535").into());
        }
        if change.timeout_secs == Some(0) {
            return Err(WorkflowError::validation("timeout must be at least one second").into());
        }

        let published = self.config.update(|config| change.apply(&mut config.directory));
        tracing::info!(
            request_id = %ctx.request_id,
            actor = %caller.user_id,
            settings = ?published.directory,
            "directory settings updated"
        );
        Ok(published.directory.clone())
    }

    /// Service-account bind against the current settings
    pub async fn test_connection(&self, ctx: &RequestContext) -> Result<(), InternalError> {
        self.authorization_provider
            .require_active_role(ctx, ADMIN_ONLY, "test directory connection")
            .await?;
        self.test_connection_unchecked().await
    }

    pub async fn test_connection_unchecked(&self) -> Result<(), InternalError> {
        self.directory_provider.test_connection().await.map_err(|e| {
            tracing::warn!(error = %e, "directory connection test failed");
            InternalError::Directory(e)
        })
    }
}
