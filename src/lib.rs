pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod web;

pub use adapters::{GoogleConnector, GoogleMapsClient, LocalStorage};
pub use config::{api_key::ApiKeySource, settings::AppSettings, CliConfig};
pub use crate::core::{engine::LeadEngine, pipeline::LeadPipeline, scraper::LeadScraper};
pub use domain::model::{Lead, SearchRequest};
pub use utils::error::{LeadError, Result};
