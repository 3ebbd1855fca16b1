use crate::config::api_key::ApiKeySource;
use crate::config::settings::GoogleSettings;
use crate::domain::model::{LatLng, PlaceRecord, TextSearchPage};
use crate::domain::ports::{PlacesApi, PlacesConnector};
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";
const DETAILS_PATH: &str = "/maps/api/place/details/json";

/// Place Details fields requested per lead. Details are billed by field group,
/// so this list is the cost knob.
pub const DETAIL_FIELDS: &[&str] = &[
    "rating",
    "geometry/viewport/northeast",
    "geometry/location/lat",
    "serves_wine",
    "website",
    "formatted_address",
    "adr_address",
    "reservable",
    "formatted_phone_number",
    "geometry/location/lng",
    "address_component",
    "editorial_summary",
    "geometry",
    "business_status",
    "reviews",
    "utc_offset",
    "geometry/viewport/southwest",
    "serves_lunch",
    "secondary_opening_hours",
    "review",
    "geometry/viewport/northeast/lng",
    "geometry/viewport/northeast/lat",
    "type",
    "wheelchair_accessible_entrance",
    "price_level",
    "delivery",
    "takeout",
    "serves_breakfast",
    "serves_beer",
    "opening_hours",
    "serves_vegetarian_food",
    "dine_in",
    "place_id",
    "photo",
    "international_phone_number",
    "current_opening_hours",
    "curbside_pickup",
    "geometry/viewport/southwest/lng",
    "user_ratings_total",
    "vicinity",
    "icon",
    "url",
    "geometry/location",
    "name",
    "geometry/viewport/southwest/lat",
    "serves_brunch",
    "geometry/viewport",
    "plus_code",
    "serves_dinner",
    "permanently_closed",
];

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(flatten)]
    body: T,
}

impl<T> Envelope<T> {
    fn ensure_ok(&self) -> Result<()> {
        match self.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(()),
            "OVER_QUERY_LIMIT" => Err(LeadError::QuotaExceeded),
            status => Err(LeadError::ApiError {
                status: status.to_string(),
                message: self.error_message.clone(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeBody {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct TextSearchBody {
    #[serde(default)]
    results: Vec<TextSearchResult>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    #[serde(default)]
    place_id: Option<String>,
}

impl From<TextSearchBody> for TextSearchPage {
    fn from(body: TextSearchBody) -> Self {
        Self {
            place_ids: body
                .results
                .into_iter()
                .filter_map(|r| r.place_id)
                .filter(|id| !id.is_empty())
                .collect(),
            next_page_token: body.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailsBody {
    #[serde(default)]
    result: Option<serde_json::Map<String, serde_json::Value>>,
}

/// reqwest-backed client for the Geocoding, Text Search and Place Details endpoints.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl GoogleMapsClient {
    pub fn new(api_key: &str, settings: &GoogleSettings) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(LeadError::MissingApiKey);
        }

        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry_attempts: settings.retry_attempts,
            retry_delay: settings.retry_delay(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Envelope<T>> {
        let mut attempt = 0;
        loop {
            match self.try_get_json(path, params).await {
                Err(e) if e.is_retriable() && attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "Request to {} failed ({}), retry {}/{}",
                        path,
                        e,
                        attempt,
                        self.retry_attempts
                    );
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Envelope<T>> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadError::HttpStatusError {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        if envelope.status == "OVER_QUERY_LIMIT" {
            return Err(LeadError::QuotaExceeded);
        }
        Ok(envelope)
    }
}

#[async_trait]
impl PlacesApi for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Option<LatLng>> {
        let envelope: Envelope<GeocodeBody> = self
            .get_json(GEOCODE_PATH, &[("address", address.to_string())])
            .await?;
        envelope.ensure_ok()?;
        Ok(envelope
            .body
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location))
    }

    async fn text_search(
        &self,
        query: &str,
        location: LatLng,
        radius: u32,
    ) -> Result<TextSearchPage> {
        let envelope: Envelope<TextSearchBody> = self
            .get_json(
                TEXT_SEARCH_PATH,
                &[
                    ("query", query.to_string()),
                    ("location", location.to_string()),
                    ("radius", radius.to_string()),
                ],
            )
            .await?;
        envelope.ensure_ok()?;
        Ok(envelope.body.into())
    }

    async fn next_page(&self, query: &str, page_token: &str) -> Result<TextSearchPage> {
        let envelope: Envelope<TextSearchBody> = self
            .get_json(
                TEXT_SEARCH_PATH,
                &[
                    ("query", query.to_string()),
                    ("pagetoken", page_token.to_string()),
                ],
            )
            .await?;
        envelope.ensure_ok()?;
        Ok(envelope.body.into())
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceRecord>> {
        let envelope: Envelope<DetailsBody> = self
            .get_json(
                DETAILS_PATH,
                &[
                    ("place_id", place_id.to_string()),
                    ("fields", DETAIL_FIELDS.join(",")),
                ],
            )
            .await?;

        if envelope.status == "NOT_FOUND" {
            return Ok(None);
        }
        envelope.ensure_ok()?;

        Ok(envelope
            .body
            .result
            .filter(|data| !data.is_empty())
            .map(|data| PlaceRecord {
                place_id: place_id.to_string(),
                data,
            }))
    }
}

/// Resolves the API key on every connect so a key added after startup is
/// picked up. The HTTP client is reused while the key stays the same.
#[derive(Debug)]
pub struct GoogleConnector {
    api_key: Option<String>,
    key_source: ApiKeySource,
    settings: GoogleSettings,
    cached: Mutex<Option<Arc<GoogleMapsClient>>>,
}

impl GoogleConnector {
    pub fn new(key_source: ApiKeySource, settings: GoogleSettings) -> Self {
        Self {
            api_key: None,
            key_source,
            settings,
            cached: Mutex::new(None),
        }
    }

    /// Connector with a fixed key, bypassing the key sources.
    pub fn with_api_key(api_key: impl Into<String>, settings: GoogleSettings) -> Self {
        Self {
            api_key: Some(api_key.into()),
            key_source: ApiKeySource::default(),
            settings,
            cached: Mutex::new(None),
        }
    }
}

impl PlacesConnector for GoogleConnector {
    fn connect(&self) -> Result<Arc<dyn PlacesApi>> {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => self.key_source.load().ok_or(LeadError::MissingApiKey)?,
        };

        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = cached.as_ref().filter(|c| c.api_key == api_key.trim()) {
            return Ok(client.clone());
        }

        tracing::debug!("Building Google Maps client");
        let client = Arc::new(GoogleMapsClient::new(&api_key, &self.settings)?);
        *cached = Some(client.clone());
        Ok(client)
    }
}
