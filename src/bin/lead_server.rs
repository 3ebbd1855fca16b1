use clap::Parser;
use maps_lead_scraper::config::server::ServerConfig;
use maps_lead_scraper::core::scraper::ScrapeOptions;
use maps_lead_scraper::utils::{logger, validation::Validate};
use maps_lead_scraper::web::server::{shutdown_signal, LeadServer};
use maps_lead_scraper::web::AppState;
use maps_lead_scraper::{ApiKeySource, AppSettings, GoogleConnector};
use std::sync::Arc;

/// Web UI for Google Maps lead searches. Binds 0.0.0.0 on $PORT (default 8080).
#[derive(Parser, Debug)]
#[command(name = "lead-server")]
#[command(version)]
struct Args {
    /// TOML settings file; a missing file means defaults
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Human-readable logs instead of JSON lines
    #[arg(long)]
    pretty_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_server_logger(!args.pretty_logs);

    let settings = AppSettings::load_or_default(&args.config)?;
    settings.validate()?;

    let server_config = ServerConfig::from_env()?.apply_settings(&settings.server);

    if ApiKeySource::new(&args.config).load().is_none() {
        tracing::warn!("No Google Maps API key configured yet; searches will fail until one is provided");
    }

    let connector = GoogleConnector::new(ApiKeySource::new(&args.config), settings.google.clone());
    let state = AppState::new(
        Arc::new(connector),
        ScrapeOptions::from(&settings.search),
        settings.search.default_radius,
        &server_config,
    );

    LeadServer::new(server_config, state)
        .serve_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
