use axum::http::HeaderMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const PRUNE_THRESHOLD: usize = 1024;

/// Per-client minimum spacing between searches.
pub struct RateGuard {
    min_interval: Duration,
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl RateGuard {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Records the call and returns `true` when `client` may proceed. A
    /// rejected call does not restart the client's interval.
    pub async fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now()).await
    }

    async fn check_at(&self, client: &str, now: Instant) -> bool {
        if self.min_interval.is_zero() {
            return true;
        }

        let mut last_seen = self.last_seen.lock().await;
        if let Some(previous) = last_seen.get(client) {
            if now.saturating_duration_since(*previous) < self.min_interval {
                return false;
            }
        }

        if last_seen.len() >= PRUNE_THRESHOLD {
            let min_interval = self.min_interval;
            last_seen.retain(|_, seen| now.saturating_duration_since(*seen) < min_interval);
        }
        last_seen.insert(client.to_string(), now);
        true
    }
}

/// Client identity for rate limiting: first `X-Forwarded-For` hop, else `local`.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("local")
        .to_string()
}
