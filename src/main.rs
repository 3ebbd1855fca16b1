use clap::Parser;
use maps_lead_scraper::core::export;
use maps_lead_scraper::core::scraper::ScrapeOptions;
use maps_lead_scraper::utils::error::{self, LeadError};
use maps_lead_scraper::utils::{logger, validation::Validate};
use maps_lead_scraper::{
    ApiKeySource, AppSettings, CliConfig, GoogleMapsClient, LeadEngine, LeadPipeline, LeadScraper,
    LocalStorage,
};
use std::sync::Arc;

const MISSING_KEY_HELP: &str = "\
No API key found. Provide GOOGLE_MAPS_API_KEY via a .env file, config.toml, or environment.
Examples:
  1) .env file:
       GOOGLE_MAPS_API_KEY=YOUR_KEY_HERE
  2) config.toml file:
       [google]
       api_key = \"YOUR_KEY_HERE\"
  3) Environment variable:
       export GOOGLE_MAPS_API_KEY=YOUR_KEY_HERE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting maps-lead-scraper CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let mut settings = match AppSettings::load_or_default(&config.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", config.config, e);
            eprintln!("💡 Make sure the file is valid TOML or remove it to use defaults");
            std::process::exit(1);
        }
    };
    if let Some(max_pages) = config.max_pages {
        settings.search.max_pages = max_pages;
    }

    // 驗證配置
    if let Err(e) = config.validate().and_then(|_| settings.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(error::exit_code(&e.severity()));
    }

    let Some(api_key) = ApiKeySource::new(&config.config).load() else {
        eprintln!("[fatal] {}", MISSING_KEY_HELP);
        std::process::exit(error::exit_code(&LeadError::MissingApiKey.severity()));
    };
    tracing::info!("API key loaded successfully");

    let request = config.search_request();
    tracing::info!(
        "Query: '{}' | Location: '{}' | Radius: {}m",
        request.query,
        request.location,
        request.radius
    );

    let client = GoogleMapsClient::new(&api_key, &settings.google)?;
    let scraper = LeadScraper::new(Arc::new(client), ScrapeOptions::from(&settings.search));
    let storage = LocalStorage::new(config.output_dir.clone());
    let formats = export::output_formats(config.json_only, config.csv_only);
    let pipeline = LeadPipeline::new(scraper, storage, request, formats);

    match LeadEngine::new(pipeline).run().await {
        Ok(summary) if summary.lead_count == 0 => {
            println!("No leads to write. Exiting.");
        }
        Ok(summary) => {
            for path in &summary.output_paths {
                println!("📁 {}", path);
            }
            println!("✅ Collected {} leads.", summary.lead_count);
        }
        Err(e) => {
            tracing::error!(
                "❌ Lead collection failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = error::exit_code(&e.severity());

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
