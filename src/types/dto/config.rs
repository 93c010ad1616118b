use poem_openapi::Object;

use crate::config::runtime::DirectorySettings;

/// Directory settings as shown to administrators. The bind password is never returned.
#[derive(Object, Debug)]
pub struct DirectoryConfigResponse {
    pub server: String,
    pub port: u16,
    pub base_dn: String,
    pub bind_username: String,
    pub bind_password_set: bool,
    pub timeout_secs: u64,
    pub auto_provision: bool,
}

impl From<&DirectorySettings> for DirectoryConfigResponse {
    fn from(settings: &DirectorySettings) -> Self {
        Self {
            server: settings.server.clone(),
            port: settings.port,
            base_dn: settings.base_dn.clone(),
            bind_username: settings.bind_username.clone(),
            bind_password_set: !settings.bind_password.is_empty(),
            timeout_secs: settings.timeout_secs,
            auto_provision: settings.auto_provision,
        }
    }
}

/// Partial update; omitted fields keep their current value.
#[derive(Object)]
pub struct UpdateDirectoryConfigRequest {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub base_dn: Option<String>,
    pub bind_username: Option<String>,
    pub bind_password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub auto_provision: Option<bool>,
}

impl std::fmt::Debug for UpdateDirectoryConfigRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateDirectoryConfigRequest")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("base_dn", &self.base_dn)
            .field("bind_username", &self.bind_username)
            .field("bind_password", &self.bind_password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("auto_provision", &self.auto_provision)
            .finish()
    }
}

#[derive(Object, Debug)]
pub struct DirectoryTestResponse {
    pub success: bool,
    pub message: String,
}
