use crate::config::{AppSettings, connect_database, migrate_database};

/// Run pending database migrations and exit
///
/// Does not build the full AppData, so secrets are not required.
pub async fn run_migrations(settings: &AppSettings) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Running database migrations...");

    let db = connect_database(settings.database_url()).await?;
    migrate_database(&db).await?;

    tracing::info!("All migrations completed successfully");
    println!("✓ Database is up to date");

    Ok(())
}
