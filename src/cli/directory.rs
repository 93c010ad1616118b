use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::DirectoryConfigCoordinator;

/// Bind with the configured service account and report the outcome
pub async fn test_directory(app_data: Arc<AppData>) -> Result<(), Box<dyn std::error::Error>> {
    let server = app_data.config.snapshot().directory.url();
    println!("Testing directory connection to {server} ...");

    DirectoryConfigCoordinator::new(app_data)
        .test_connection_unchecked()
        .await
        .map_err(|e| {
            println!("❌ Directory connection failed: {e}");
            e
        })?;

    println!("✓ Service account bind succeeded");
    Ok(())
}
