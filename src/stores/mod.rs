// Stores layer - Data access
pub mod login_attempt_store;
pub mod proposal_store;
pub mod user_store;

pub use login_attempt_store::{LoginAttemptStore, LoginStats, NewLoginAttempt};
pub use proposal_store::ProposalStore;
pub use user_store::{NewUser, UserStore, UserUpdate};
