// Providers - domain logic that sits between stores and coordinators
pub mod authentication_provider;
pub mod authorization_provider;
pub mod clock;
pub mod directory_provider;
pub mod password_provider;
pub mod proposal_lifecycle;
pub mod token_provider;

pub use authentication_provider::AuthenticationProvider;
pub use authorization_provider::AuthorizationProvider;
pub use clock::{Clock, ManualClock, SystemClock};
pub use directory_provider::{DirectoryConnector, DirectoryEntry, DirectoryProvider, DirectorySession, LdapConnector};
pub use password_provider::PasswordProvider;
pub use proposal_lifecycle::{LifecycleEvent, ProposalLifecycle};
pub use token_provider::TokenProvider;
