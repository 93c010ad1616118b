use std::sync::Arc;

use clap::Parser;
use poem::{Server, listener::TcpListener};

use proposal_backend::api::build_app;
use proposal_backend::app_data::AppData;
use proposal_backend::cli::{self, Cli, Commands};
use proposal_backend::config::{
    AppSettings, LoggingConfig, SystemEnvironment, connect_database, init_logging, migrate_database,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let env = SystemEnvironment;
    init_logging(&LoggingConfig::from_env_provider(&env))?;

    let cli = Cli::parse();
    let settings = AppSettings::from_env_provider(&env)?;
    tracing::debug!(?settings, "settings loaded");

    let command = cli.command.unwrap_or(Commands::Serve);
    if let Commands::Migrate = command {
        return cli::migrate::run_migrations(&settings).await;
    }

    let db = connect_database(settings.database_url()).await?;
    migrate_database(&db).await?;

    let app_data = Arc::new(AppData::init(db, &env)?);

    match command {
        Commands::Serve => serve(app_data, &settings).await?,
        command => cli::execute_command(command, app_data).await?,
    }

    Ok(())
}

async fn serve(app_data: Arc<AppData>, settings: &AppSettings) -> Result<(), std::io::Error> {
    let app = build_app(app_data, settings);

    tracing::info!(
        address = %settings.bind_address(),
        production = settings.is_production(),
        "starting server; Swagger UI at /swagger, API under /api"
    );

    Server::new(TcpListener::bind(settings.bind_address()))
        .run(app)
        .await
}
