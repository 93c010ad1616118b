// Internal types shared between layers
pub mod auth;
pub mod context;
pub mod proposal;
pub mod proposal_status;
pub mod role;

pub use auth::{AuthenticatedIdentity, Caller, DirectoryIdentity, IssuedToken, SessionClaims};
pub use context::{ClientMeta, RequestContext, RequestId, RequestSource};
pub use proposal_status::{ApprovalStatus, ProposalStatus};
pub use role::UserRole;
