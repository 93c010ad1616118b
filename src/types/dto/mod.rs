// API request/response models
pub mod auth;
pub mod common;
pub mod config;
pub mod login_log;
pub mod proposal;
pub mod user;
