// Offline account administration: role changes and local account creation

use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::{NewAccount, UserCoordinator};
use crate::types::internal::{RequestContext, UserRole};

/// Change the role of an existing account
pub async fn set_role(
    app_data: Arc<AppData>,
    username: &str,
    role: UserRole,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = RequestContext::for_cli("set-role");
    let coordinator = UserCoordinator::new(app_data);

    let updated = coordinator.set_role_unchecked(username, role).await?;
    tracing::info!(request_id = %ctx.request_id, user_id = %updated.id, role = %role, "role changed from CLI");
    println!("✓ {} is now {}", updated.username, updated.role);

    Ok(())
}

/// Arguments for a local (password) account
pub struct CreateUserArgs {
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub department: String,
    pub password: Option<String>,
}

/// Create a local account; prints the generated password when none was given
pub async fn create_user(app_data: Arc<AppData>, args: CreateUserArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = RequestContext::for_cli("create-user");
    let coordinator = UserCoordinator::new(app_data);

    let created = coordinator
        .create_unchecked(NewAccount {
            username: args.username,
            email: args.email,
            full_name: args.full_name,
            role: args.role,
            department: args.department,
            is_directory_user: false,
            password: args.password,
        })
        .await?;

    tracing::info!(request_id = %ctx.request_id, user_id = %created.user.id, "account created from CLI");
    println!("✓ Created {} ({}) with role {}", created.user.username, created.user.id, created.user.role);
    if let Some(password) = created.generated_password {
        println!();
        println!("   Generated password: {password}");
        println!("   It will not be shown again.");
    }

    Ok(())
}
