use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use httpmock::prelude::*;
use maps_lead_scraper::config::server::ServerConfig;
use maps_lead_scraper::config::settings::GoogleSettings;
use maps_lead_scraper::core::scraper::ScrapeOptions;
use maps_lead_scraper::domain::ports::PlacesConnector;
use maps_lead_scraper::web::{self, AppState};
use maps_lead_scraper::{ApiKeySource, GoogleConnector};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

fn fast_options() -> ScrapeOptions {
    ScrapeOptions {
        max_pages: 10,
        page_wait: Duration::ZERO,
        detail_pause: Duration::ZERO,
    }
}

fn app_with(connector: Arc<dyn PlacesConnector>, min_interval: Duration) -> Router {
    let mut config = ServerConfig::default();
    config.min_request_interval = min_interval;
    web::router(AppState::new(connector, fast_options(), 5000, &config))
}

fn google_app(server: &MockServer, min_interval: Duration) -> Router {
    let settings = GoogleSettings {
        base_url: server.base_url(),
        retry_attempts: 0,
        ..GoogleSettings::default()
    };
    app_with(
        Arc::new(GoogleConnector::with_api_key("test-key", settings)),
        min_interval,
    )
}

fn keyless_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let source = ApiKeySource::new(dir.path().join("config.toml"))
        .with_env_var("MAPS_LEAD_SCRAPER_WEB_TEST_NEVER_SET")
        .with_dotenv_path(dir.path().join(".env"));
    let app = app_with(
        Arc::new(GoogleConnector::new(source, GoogleSettings::default())),
        Duration::ZERO,
    );
    (dir, app)
}

fn mock_one_lead(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/maps/api/geocode/json");
        then.status(200).json_body(json!({
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 33.749, "lng": -84.388}}}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/maps/api/place/textsearch/json");
        then.status(200).json_body(json!({
            "status": "OK",
            "results": [{"place_id": "p1"}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/maps/api/place/details/json");
        then.status(200).json_body(json!({
            "status": "OK",
            "result": {
                "name": "Acme Generators",
                "formatted_address": "1 Main St, Atlanta, GA",
                "website": "https://acme.example",
                "types": ["store"]
            }
        }));
    });
}

fn search_request(body: serde_json::Value, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/leads")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_index_serves_ui() {
    let (_dir, app) = keyless_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Google Maps Lead Scraper"));
    assert!(html.contains("Find Leads"));
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = keyless_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_missing_api_key_is_503() {
    let (_dir, app) = keyless_app();
    let response = app
        .oneshot(search_request(
            json!({"query": "Plumber", "location": "Austin, TX"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"], web::MSG_MISSING_KEY);
}

#[tokio::test]
async fn test_blank_inputs_are_400() {
    let server = MockServer::start();
    let app = google_app(&server, Duration::ZERO);

    let response = app
        .oneshot(search_request(json!({"query": "Plumber", "location": "  "}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], web::MSG_MISSING_INPUT);
}

#[tokio::test]
async fn test_search_then_download_csv() {
    let server = MockServer::start();
    mock_one_lead(&server);
    let app = google_app(&server, Duration::ZERO);

    let response = app
        .clone()
        .oneshot(search_request(
            json!({"query": "Generator Dealer", "location": "Atlanta, GA", "radius": 5000}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let name_at = text.find("\"name\":").unwrap();
    let place_id_at = text.find("\"place_id\":").unwrap();
    assert!(name_at < place_id_at, "leads are keyed in display order: {text}");

    let result: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(result["count"], 1);
    assert_eq!(result["leads"][0]["name"], "Acme Generators");
    assert_eq!(result["leads"][0]["place_id"], "p1");
    assert_eq!(result["leads"][0]["types"], "store");
    assert_eq!(result["leads"][0]["formatted_phone_number"], "");
    assert_eq!(result["filename"], "Generator_Dealer_Atlanta_GA.csv");
    assert!(result.get("message").is_none());
    assert!(result.get("rows").is_none());

    let download_url = result["download_url"].as_str().unwrap().to_string();
    let response = app
        .oneshot(Request::builder().uri(download_url).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Generator_Dealer_Atlanta_GA.csv\""
    );
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("name,formatted_address,formatted_phone_number,website,url,place_id,types,business_status")
    );
    assert!(lines.next().unwrap().starts_with("Acme Generators,\"1 Main St, Atlanta, GA\""));
}

#[tokio::test]
async fn test_download_without_search_is_404() {
    let server = MockServer::start();
    let app = google_app(&server, Duration::ZERO);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/leads.csv?query=Plumber&location=Austin&radius=5000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_no_results_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/maps/api/geocode/json");
        then.status(200)
            .json_body(json!({"status": "ZERO_RESULTS", "results": []}));
    });
    let app = google_app(&server, Duration::ZERO);

    let response = app
        .oneshot(search_request(
            json!({"query": "Plumber", "location": "Atlantis"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["leads"], json!([]));
    assert_eq!(body["message"], web::MSG_NO_RESULTS);
    assert!(body["download_url"].is_null());
}

#[tokio::test]
async fn test_rapid_repeat_is_rate_limited_per_client() {
    let server = MockServer::start();
    mock_one_lead(&server);
    let app = google_app(&server, Duration::from_secs(60));
    let body = json!({"query": "Generator Dealer", "location": "Atlanta, GA"});

    let first = app
        .clone()
        .oneshot(search_request(body.clone(), Some("203.0.113.7")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(search_request(body.clone(), Some("203.0.113.7")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(second).await["error"], web::MSG_TOO_FAST);

    let other_client = app
        .oneshot(search_request(body, Some("198.51.100.2")))
        .await
        .unwrap();
    assert_eq!(other_client.status(), StatusCode::OK);
}

fn raw_search_request(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/leads")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_malformed_body_is_json_400() {
    let server = MockServer::start();
    let app = google_app(&server, Duration::ZERO);

    for body in ["{not json", r#"{"query": "Plumber", "location": "Austin", "radius": -5}"#] {
        let response = app.clone().oneshot(raw_search_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let error = body_json(response).await;
        assert!(error["error"].as_str().is_some_and(|m| !m.is_empty()), "body {body}");
    }
}

#[tokio::test]
async fn test_malformed_body_does_not_use_rate_slot() {
    let server = MockServer::start();
    mock_one_lead(&server);
    let app = google_app(&server, Duration::from_secs(60));

    let rejected = app.clone().oneshot(raw_search_request("{not json")).await.unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let accepted = app
        .oneshot(search_request(
            json!({"query": "Generator Dealer", "location": "Atlanta, GA"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_download_query_is_json_400() {
    let server = MockServer::start();
    let app = google_app(&server, Duration::ZERO);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/leads.csv?query=Plumber&location=Austin&radius=far")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
