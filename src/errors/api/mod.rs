// API-facing error types
pub mod admin;
pub mod auth;
pub mod proposal;

// Re-exports for convenience
pub use admin::AdminError;
pub use auth::AuthError;
pub use proposal::ProposalError;
