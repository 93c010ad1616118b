// CLI module for administrative operations requiring server access

pub mod accounts;
pub mod directory;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;
use crate::types::internal::UserRole;

/// Investment proposal backend
#[derive(Parser)]
#[command(name = "proposal-backend")]
#[command(about = "Investment proposal approval backend", long_about = None)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Run pending database migrations and exit
    Migrate,

    /// Change the role of an existing account
    SetRole {
        username: String,
        /// One of: admin, "Corp FA", Direktur, CEO, CFO, "Sourcing dan Procurement"
        role: UserRole,
    },

    /// Create a local (password) account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        role: UserRole,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "")]
        department: String,
        /// Generated when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Bind against the configured directory with the service account
    TestDirectory,
}

/// Execute an administrative command
///
/// `Serve` and `Migrate` are handled by the binary before AppData exists.
pub async fn execute_command(command: Commands, app_data: Arc<AppData>) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve | Commands::Migrate => {
            return Err("serve and migrate are not administrative commands".into());
        }
        Commands::SetRole { username, role } => {
            accounts::set_role(app_data, &username, role).await?;
        }
        Commands::CreateUser { username, full_name, role, email, department, password } => {
            accounts::create_user(
                app_data,
                accounts::CreateUserArgs { username, full_name, role, email, department, password },
            )
            .await?;
        }
        Commands::TestDirectory => {
            directory::test_directory(app_data).await?;
        }
    }

    Ok(())
}
