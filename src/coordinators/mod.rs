// Coordinators layer - Workflow orchestration
//
// Coordinators compose stores and providers for specific API endpoints and
// CLI commands. Every one is built from Arc<AppData>.

pub mod directory_config_coordinator;
pub mod login_coordinator;
pub mod login_log_coordinator;
pub mod proposal_coordinator;
pub mod user_coordinator;

pub use directory_config_coordinator::{DirectoryConfigCoordinator, DirectorySettingsChange};
pub use login_coordinator::LoginCoordinator;
pub use login_log_coordinator::LoginLogCoordinator;
pub use proposal_coordinator::ProposalCoordinator;
pub use user_coordinator::{CreatedAccount, NewAccount, UserCoordinator};
