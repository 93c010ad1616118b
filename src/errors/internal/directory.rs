use thiserror::Error;

/// Failures reported by the directory adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Could not connect, timed out, or the service account bind failed
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    /// No entry matches the username under the base DN
    #[error("Directory entry not found for {0}")]
    EntryNotFound(String),

    /// The directory refused the supplied credentials
    #[error("Directory rejected the credentials")]
    BindRejected,
}

impl DirectoryError {
    pub fn unavailable(detail: impl std::fmt::Display) -> Self {
        Self::Unavailable(detail.to_string())
    }
}
