pub mod api_key;
pub mod server;
pub mod settings;

use crate::domain::model::SearchRequest;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "maps-lead-scraper")]
#[command(about = "Scrape business leads from Google Maps using the Places API")]
pub struct CliConfig {
    /// Search term, e.g. "Generator Dealer"
    #[arg(long)]
    pub query: String,

    /// Location, e.g. "Atlanta, GA"
    #[arg(long)]
    pub location: String,

    /// Search radius in meters
    #[arg(long, default_value = "5000")]
    pub radius: u32,

    #[arg(long, help = "Write only JSON (skip CSV)")]
    pub json_only: bool,

    #[arg(long, help = "Write only CSV (skip JSON)")]
    pub csv_only: bool,

    #[arg(long, default_value = ".")]
    pub output_dir: String,

    /// TOML settings file; a missing file means defaults
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    /// Override the maximum number of Text Search pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn search_request(&self) -> SearchRequest {
        SearchRequest::new(self.query.trim(), self.location.trim(), self.radius)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.search_request().validate()?;
        validation::validate_path("output_dir", &self.output_dir)?;
        if let Some(max_pages) = self.max_pages {
            validation::validate_positive_number("max_pages", max_pages, 1)?;
        }
        Ok(())
    }
}

impl Validate for SearchRequest {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("query", &self.query)?;
        validation::validate_non_empty_string("location", &self.location)?;
        validation::validate_radius("radius", self.radius)
    }
}
