use super::{client_meta::ClientMeta, request_id::RequestId, request_source::RequestSource};
use crate::types::internal::auth::Caller;

/// Request context that flows through all layers
///
/// Built at the boundary (API handler, CLI command, startup task) and passed
/// by reference to coordinators and providers. Carries client metadata for the
/// login audit and, once the bearer token is verified, the caller identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// IP address and user agent of the client
    pub client: ClientMeta,

    /// Verified caller; `None` until the session token has been checked
    pub caller: Option<Caller>,
}

impl RequestContext {
    /// Create an unauthenticated context for an API request
    pub fn for_api(client: ClientMeta) -> Self {
        Self {
            request_id: RequestId::new(),
            source: RequestSource::API,
            client,
            caller: None,
        }
    }

    /// Create a RequestContext for CLI operations
    pub fn for_cli(command_name: &str) -> Self {
        tracing::debug!(command = command_name, "creating CLI request context");
        Self {
            request_id: RequestId::new(),
            source: RequestSource::CLI,
            client: ClientMeta::default(),
            caller: None,
        }
    }

    /// Create a RequestContext for system operations
    pub fn for_system(operation_name: &str) -> Self {
        tracing::debug!(operation = operation_name, "creating system request context");
        Self {
            request_id: RequestId::new(),
            source: RequestSource::System,
            client: ClientMeta::default(),
            caller: None,
        }
    }

    /// Attach the verified caller
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_client(mut self, client: ClientMeta) -> Self {
        self.client = client;
        self
    }

    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }

    /// Identifier used in logs for whoever initiated the operation
    pub fn actor_id(&self) -> String {
        match (&self.caller, self.source) {
            (Some(caller), _) => caller.user_id.clone(),
            (None, RequestSource::API) => "anonymous".to_string(),
            (None, source) => source.to_string(),
        }
    }
}
