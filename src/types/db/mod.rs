// Database entities - SeaORM models
pub mod approval;
pub mod attachment;
pub mod comment;
pub mod login_attempt;
pub mod proposal;
pub mod user;
