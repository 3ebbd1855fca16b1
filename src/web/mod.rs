//! Browser UI and JSON API served by `lead-server`.
//!
//! `POST /api/leads` runs one search and caches the result; the CSV download
//! at `GET /api/leads.csv` is served from that cache only.

pub mod cache;
pub mod rate_limit;
pub mod server;

use crate::config::server::ServerConfig;
use crate::core::export::{self, ColumnOrder};
use crate::core::scraper::{LeadScraper, ScrapeOptions};
use crate::domain::model::{Lead, SearchRequest};
use crate::domain::ports::PlacesConnector;
use crate::utils::error::LeadError;
use crate::utils::validation::Validate;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cache::ResultCache;
use rate_limit::RateGuard;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("index.html");

pub const MSG_TOO_FAST: &str = "You're clicking too fast—please wait a few seconds.";
pub const MSG_MISSING_KEY: &str =
    "API key missing. Provide it via environment, .env or config.toml.";
pub const MSG_MISSING_INPUT: &str = "Please provide both a Search Query and a Location.";
pub const MSG_NO_RESULTS: &str = "No results. Try a broader query, larger radius, or nearby city.";
pub const MSG_NOT_CACHED: &str = "No cached results for this search. Run the search first.";

#[derive(Clone)]
pub struct AppState {
    connector: Arc<dyn PlacesConnector>,
    options: ScrapeOptions,
    default_radius: u32,
    guard: Arc<RateGuard>,
    cache: Arc<ResultCache>,
}

impl AppState {
    pub fn new(
        connector: Arc<dyn PlacesConnector>,
        options: ScrapeOptions,
        default_radius: u32,
        config: &ServerConfig,
    ) -> Self {
        Self {
            connector,
            options,
            default_radius,
            guard: Arc::new(RateGuard::new(config.min_request_interval)),
            cache: Arc::new(ResultCache::new(config.cache_capacity)),
        }
    }
}

/// JSON error body `{"error": ...}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<LeadError> for ApiError {
    fn from(e: LeadError) -> Self {
        match e {
            LeadError::MissingApiKey => Self::new(StatusCode::SERVICE_UNAVAILABLE, MSG_MISSING_KEY),
            LeadError::InvalidConfigValueError { .. } => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            other => {
                tracing::error!("Unexpected error: {}", other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Unexpected error: {}", other.user_friendly_message()),
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct LeadQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub radius: Option<u32>,
}

impl LeadQuery {
    fn into_request(self, default_radius: u32) -> SearchRequest {
        SearchRequest::new(
            self.query.trim(),
            self.location.trim(),
            self.radius.unwrap_or(default_radius),
        )
    }
}

/// A lead keyed by column name in [`ColumnOrder::Display`] order.
#[derive(Debug, Clone)]
pub struct DisplayLead(pub Lead);

impl Serialize for DisplayLead {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let columns = ColumnOrder::Display.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(column, self.0.field(column))?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct LeadsResponse {
    pub count: usize,
    pub leads: Vec<DisplayLead>,
    pub download_url: Option<String>,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/leads", post(find_leads_handler))
        .route("/api/leads.csv", get(download_csv_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn find_leads_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LeadQuery>, JsonRejection>,
) -> Result<Json<LeadsResponse>, ApiError> {
    let Json(input) = payload?;

    let client = rate_limit::client_key(&headers);
    if !state.guard.check(&client).await {
        return Err(ApiError::new(StatusCode::TOO_MANY_REQUESTS, MSG_TOO_FAST));
    }

    let api = state.connector.connect()?;

    let request = input.into_request(state.default_radius);
    if request.query.is_empty() || request.location.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, MSG_MISSING_INPUT));
    }
    request.validate()?;

    tracing::info!(
        "Searching '{}' around '{}' within {} m",
        request.query,
        request.location,
        request.radius
    );
    let leads = LeadScraper::new(api, state.options.clone())
        .find_leads(&request)
        .await;

    let filename = export::download_filename(&request.query, &request.location);

    if leads.is_empty() {
        return Ok(Json(LeadsResponse {
            count: 0,
            leads: Vec::new(),
            download_url: None,
            filename,
            message: Some(MSG_NO_RESULTS.to_string()),
        }));
    }

    let leads = state.cache.insert(&request, leads).await;
    Ok(Json(LeadsResponse {
        count: leads.len(),
        leads: leads.iter().cloned().map(DisplayLead).collect(),
        download_url: Some(download_url(&request)),
        filename,
        message: None,
    }))
}

async fn download_csv_handler(
    State(state): State<AppState>,
    query: Result<Query<LeadQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(input) = query?;
    let request = input.into_request(state.default_radius);
    let leads = state
        .cache
        .get(&request)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, MSG_NOT_CACHED))?;

    let body = export::leads_to_csv(&leads, ColumnOrder::Display)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::download_filename(&request.query, &request.location)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

fn download_url(request: &SearchRequest) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("query", &request.query)
        .append_pair("location", &request.location)
        .append_pair("radius", &request.radius.to_string())
        .finish();
    format!("/api/leads.csv?{}", query)
}
