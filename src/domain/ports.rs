use crate::domain::model::{LatLng, PlaceRecord, TextSearchPage, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Destination for rendered output files.
pub trait Storage: Send + Sync {
    /// Writes `data` to `path` and returns where it landed.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// The slice of the Google Maps web services the scraper needs.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// First geocoding match for a free-form address, `None` when nothing matched.
    async fn geocode(&self, address: &str) -> Result<Option<LatLng>>;

    /// First Text Search page biased to `location` within `radius` meters.
    async fn text_search(&self, query: &str, location: LatLng, radius: u32)
        -> Result<TextSearchPage>;

    /// Follow-up Text Search page for a `next_page_token`.
    async fn next_page(&self, query: &str, page_token: &str) -> Result<TextSearchPage>;

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceRecord>>;
}

/// Builds a ready [`PlacesApi`] on demand, resolving credentials at call time.
pub trait PlacesConnector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn PlacesApi>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PlaceRecord>>;
    async fn transform(&self, data: Vec<PlaceRecord>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<Vec<String>>;
}
