use crate::config::settings::SearchSettings;
use crate::domain::model::{LatLng, Lead, PlaceRecord, SearchRequest};
use crate::domain::ports::PlacesApi;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeOptions {
    pub max_pages: usize,
    /// A fresh `next_page_token` is rejected until it becomes valid server-side.
    pub page_wait: Duration,
    pub detail_pause: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self::from(&SearchSettings::default())
    }
}

impl From<&SearchSettings> for ScrapeOptions {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            max_pages: settings.max_pages.max(1),
            page_wait: Duration::from_millis(settings.page_wait_ms),
            detail_pause: Duration::from_millis(settings.detail_pause_ms),
        }
    }
}

/// Geocode → Text Search (all pages) → Place Details for each unique place.
///
/// Failures inside a stage are logged and the stage yields what it has, so a
/// flaky page or detail call costs only that page or lead.
pub struct LeadScraper {
    api: Arc<dyn PlacesApi>,
    options: ScrapeOptions,
}

impl LeadScraper {
    pub fn new(api: Arc<dyn PlacesApi>, options: ScrapeOptions) -> Self {
        Self { api, options }
    }

    pub async fn geocode_location(&self, location: &str) -> Option<LatLng> {
        match self.api.geocode(location).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Geocoding failed for '{}': {}", location, e);
                None
            }
        }
    }

    pub async fn text_search_all_pages(
        &self,
        query: &str,
        location: LatLng,
        radius: u32,
    ) -> Vec<String> {
        let mut all_ids = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut page = 0;

        loop {
            page += 1;
            let result = match next_page_token.take() {
                Some(token) => {
                    tokio::time::sleep(self.options.page_wait).await;
                    self.api.next_page(query, &token).await
                }
                None => self.api.text_search(query, location, radius).await,
            };

            let search_page = match result {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!(
                        "Text Search failed on page {}: {}; keeping {} results",
                        page,
                        e,
                        all_ids.len()
                    );
                    break;
                }
            };

            if search_page.place_ids.is_empty() {
                break;
            }
            tracing::debug!("Page {}: {} results", page, search_page.place_ids.len());
            all_ids.extend(search_page.place_ids);

            match search_page.next_page_token {
                None => break,
                Some(_) if page >= self.options.max_pages => {
                    tracing::info!(
                        "Reached max_pages={}; stopping pagination",
                        self.options.max_pages
                    );
                    break;
                }
                Some(token) => next_page_token = Some(token),
            }
        }

        all_ids
    }

    pub async fn collect_place_details(&self, request: &SearchRequest) -> Vec<PlaceRecord> {
        tracing::info!("Geocoding location: {}", request.location);
        let Some(latlng) = self.geocode_location(&request.location).await else {
            tracing::error!("Could not geocode the location; aborting");
            return Vec::new();
        };

        tracing::info!(
            "Starting Text Search for '{}' within {}m of {}",
            request.query,
            request.radius,
            request.location
        );
        let found = self
            .text_search_all_pages(&request.query, latlng, request.radius)
            .await;
        if found.is_empty() {
            tracing::info!("No search results found");
            return Vec::new();
        }

        let place_ids = dedupe_preserving_order(found);
        let total = place_ids.len();
        tracing::info!("Found {} unique places. Fetching details...", total);

        let mut records = Vec::with_capacity(total);
        for (idx, place_id) in place_ids.iter().enumerate() {
            tracing::debug!("[{}/{}] {}", idx + 1, total, place_id);

            match self.api.place_details(place_id).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    tracing::debug!("No details for place_id={}; skipping", place_id)
                }
                Err(e) => {
                    tracing::warn!("Details failed for place_id={}: {}; skipping", place_id, e)
                }
            }

            if !self.options.detail_pause.is_zero() {
                tokio::time::sleep(self.options.detail_pause).await;
            }
        }

        tracing::info!("Done fetching details: {}/{} places", records.len(), total);
        records
    }

    pub async fn find_leads(&self, request: &SearchRequest) -> Vec<Lead> {
        self.collect_place_details(request)
            .await
            .iter()
            .map(Lead::from_record)
            .collect()
    }
}

pub fn dedupe_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
