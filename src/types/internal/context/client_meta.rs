use std::net::IpAddr;

/// Transport metadata about the client, recorded with every login attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl ClientMeta {
    pub fn new(ip_address: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self { ip_address, user_agent }
    }

    /// IP rendered for storage; empty when unknown.
    pub fn ip_string(&self) -> String {
        self.ip_address.map(|ip| ip.to_string()).unwrap_or_default()
    }

    pub fn user_agent_string(&self) -> String {
        self.user_agent.clone().unwrap_or_default()
    }
}
