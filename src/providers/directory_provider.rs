use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings, Scope, SearchEntry, ldap_escape};

use crate::config::{ConfigHandle, DirectorySettings};
use crate::errors::internal::DirectoryError;
use crate::types::internal::DirectoryIdentity;

const SEARCH_ATTRIBUTES: [&str; 4] = ["cn", "mail", "displayName", "department"];
const LDAP_INVALID_CREDENTIALS: u32 = 49;

/// A directory entry as returned by a user search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub cn: String,
    pub mail: String,
    pub display_name: String,
    pub department: String,
}

/// Opens sessions against a directory server
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    async fn connect(&self, settings: &DirectorySettings) -> Result<Box<dyn DirectorySession>, DirectoryError>;
}

/// One connection to the directory
#[async_trait]
pub trait DirectorySession: Send {
    /// Simple bind. Rejected credentials yield [`DirectoryError::BindRejected`].
    async fn bind(&mut self, dn: &str, password: &str) -> Result<(), DirectoryError>;

    /// Find the entry whose account name equals `username`
    async fn search_user(&mut self, base_dn: &str, username: &str) -> Result<Option<DirectoryEntry>, DirectoryError>;

    async fn close(&mut self);
}

/// [`DirectoryConnector`] over plain LDAP using `ldap3`
pub struct LdapConnector;

#[async_trait]
impl DirectoryConnector for LdapConnector {
    async fn connect(&self, settings: &DirectorySettings) -> Result<Box<dyn DirectorySession>, DirectoryError> {
        let conn_settings = LdapConnSettings::new().set_conn_timeout(Duration::from_secs(settings.timeout_secs));
        let (conn, ldap) = LdapConnAsync::with_settings(conn_settings, &settings.url())
            .await
            .map_err(|e| DirectoryError::unavailable(format!("connect to {}: {}", settings.url(), e)))?;
        ldap3::drive!(conn);

        Ok(Box::new(LdapSession { ldap }))
    }
}

struct LdapSession {
    ldap: ldap3::Ldap,
}

fn first_attr(entry: &SearchEntry, name: &str) -> String {
    entry
        .attrs
        .get(name)
        .and_then(|values| values.first())
        .cloned()
        .unwrap_or_default()
}

#[async_trait]
impl DirectorySession for LdapSession {
    async fn bind(&mut self, dn: &str, password: &str) -> Result<(), DirectoryError> {
        let result = self
            .ldap
            .simple_bind(dn, password)
            .await
            .map_err(|e| DirectoryError::unavailable(format!("bind: {e}")))?;

        match result.rc {
            0 => Ok(()),
            LDAP_INVALID_CREDENTIALS => Err(DirectoryError::BindRejected),
            rc => Err(DirectoryError::unavailable(format!("bind returned rc={rc}: {}", result.text))),
        }
    }

    async fn search_user(&mut self, base_dn: &str, username: &str) -> Result<Option<DirectoryEntry>, DirectoryError> {
        let filter = format!("(&(objectClass=user)(sAMAccountName={}))", ldap_escape(username));
        let (entries, _) = self
            .ldap
            .search(base_dn, Scope::Subtree, &filter, SEARCH_ATTRIBUTES.to_vec())
            .await
            .and_then(|result| result.success())
            .map_err(|e| DirectoryError::unavailable(format!("search: {e}")))?;

        Ok(entries.into_iter().next().map(|raw| {
            let entry = SearchEntry::construct(raw);
            DirectoryEntry {
                cn: first_attr(&entry, "cn"),
                mail: first_attr(&entry, "mail"),
                display_name: first_attr(&entry, "displayName"),
                department: first_attr(&entry, "department"),
                dn: entry.dn,
            }
        }))
    }

    async fn close(&mut self) {
        if let Err(e) = self.ldap.unbind().await {
            tracing::debug!("LDAP unbind failed: {}", e);
        }
    }
}

/// Verifies credentials against the directory
///
/// Service-account bind, user search, then a bind as the found entry. The
/// whole exchange is bounded by the configured timeout.
pub struct DirectoryProvider {
    connector: Arc<dyn DirectoryConnector>,
    config: Arc<ConfigHandle>,
}

impl DirectoryProvider {
    pub fn new(connector: Arc<dyn DirectoryConnector>, config: Arc<ConfigHandle>) -> Self {
        Self { connector, config }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<DirectoryIdentity, DirectoryError> {
        // An empty password would be an anonymous bind, which most servers accept
        if password.is_empty() {
            return Err(DirectoryError::BindRejected);
        }

        let snapshot = self.config.snapshot();
        let settings = &snapshot.directory;
        if !settings.is_configured() {
            return Err(DirectoryError::unavailable("directory is not configured"));
        }

        let timeout = Duration::from_secs(settings.timeout_secs);
        let entry = tokio::time::timeout(timeout, self.lookup_and_bind(settings, username, password))
            .await
            .map_err(|_| DirectoryError::unavailable(format!("timed out after {}s", settings.timeout_secs)))??;

        let entry = entry.ok_or_else(|| DirectoryError::EntryNotFound(username.to_string()))?;

        let full_name = if entry.display_name.is_empty() { entry.cn } else { entry.display_name };

        Ok(DirectoryIdentity {
            username: username.to_string(),
            email: Some(entry.mail).filter(|m| !m.is_empty()),
            full_name,
            department: entry.department,
        })
    }

    /// Connect and bind with the service account only
    pub async fn test_connection(&self) -> Result<(), DirectoryError> {
        let snapshot = self.config.snapshot();
        let settings = &snapshot.directory;
        if !settings.is_configured() {
            return Err(DirectoryError::unavailable("directory is not configured"));
        }

        let timeout = Duration::from_secs(settings.timeout_secs);
        tokio::time::timeout(timeout, self.check_service_account(settings))
            .await
            .map_err(|_| DirectoryError::unavailable(format!("timed out after {}s", settings.timeout_secs)))?
    }

    async fn check_service_account(&self, settings: &DirectorySettings) -> Result<(), DirectoryError> {
        let mut session = self.connector.connect(settings).await?;
        let result = Self::service_bind(session.as_mut(), settings).await;
        session.close().await;
        result
    }

    async fn service_bind(session: &mut dyn DirectorySession, settings: &DirectorySettings) -> Result<(), DirectoryError> {
        session
            .bind(&settings.bind_username, &settings.bind_password)
            .await
            .map_err(|e| match e {
                DirectoryError::BindRejected => DirectoryError::unavailable("service account bind rejected"),
                other => other,
            })
    }

    /// Returns `Ok(None)` when no entry matches
    async fn lookup_and_bind(
        &self,
        settings: &DirectorySettings,
        username: &str,
        password: &str,
    ) -> Result<Option<DirectoryEntry>, DirectoryError> {
        let mut session = self.connector.connect(settings).await?;

        let result: Result<Option<DirectoryEntry>, DirectoryError> = async {
            Self::service_bind(session.as_mut(), settings).await?;

            let Some(entry) = session.search_user(&settings.base_dn, username).await? else {
                return Ok(None);
            };

            session.bind(&entry.dn, password).await?;
            Ok(Some(entry))
        }
        .await;

        session.close().await;
        result
    }
}
