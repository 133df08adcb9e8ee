// src/main.rs
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use outreach_pipeline::cli::CliApp;
use outreach_pipeline::config::{load_config, Config, Secrets};
use outreach_pipeline::models::Result;
use outreach_pipeline::storage::create_db_pool;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("outreach_pipeline={}", config.logging.level).parse()?),
        )
        .init();

    info!("Initializing database...");
    let pool = create_db_pool("data/prospects.db").await?;

    let secrets = Secrets::from_env();
    let app = CliApp::new(config, secrets, pool);

    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
