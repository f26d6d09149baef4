//! External geolocation API provider
//!
//! Queries an ip-api.com style HTTP endpoint returning JSON with
//! {status, country, countryCode, regionName, city, lat, lon}. The
//! synchronous ureq call runs inside `spawn_blocking` with a bounded
//! timeout; every failure mode maps to an unavailable result.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::{GeoLookupResult, GeoProvider};

/// External API geo provider
pub struct ExternalApiProvider {
    api_url_template: String,
    agent: Agent,
}

impl ExternalApiProvider {
    /// Create an external API provider.
    ///
    /// `api_url_template` uses `{ip}` as the placeholder, e.g.
    /// `http://ip-api.com/json/{ip}?fields=status,countryCode,city`
    pub fn new(api_url_template: &str, timeout_secs: u64) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build()
            .into();

        Self {
            api_url_template: api_url_template.to_string(),
            agent,
        }
    }

    /// Fetch geo data synchronously (called inside spawn_blocking)
    fn fetch_sync(agent: &Agent, url: String) -> GeoLookupResult {
        let resp = match agent.get(&url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("Geo API request to \"{}\" failed: {}", url, e);
                return GeoLookupResult::unavailable();
            }
        };

        let json: serde_json::Value = match resp.into_body().read_json() {
            Ok(j) => j,
            Err(e) => {
                warn!("Geo API response from \"{}\" parse failed: {}", url, e);
                return GeoLookupResult::unavailable();
            }
        };

        // ip-api.com answers {"status":"success", ...} or
        // {"status":"fail","message":...}
        if json["status"].as_str() != Some("success") {
            trace!("Geo API returned non-success status");
            return GeoLookupResult::unavailable();
        }

        let result = GeoLookupResult {
            success: true,
            country: json["country"].as_str().map(String::from),
            country_code: json["countryCode"].as_str().map(String::from),
            region: json["regionName"].as_str().map(String::from),
            city: json["city"].as_str().map(String::from),
            latitude: json["lat"].as_f64(),
            longitude: json["lon"].as_f64(),
            source: None,
        };

        trace!(
            "Geo API lookup: country={:?}, city={:?}",
            result.country_code, result.city
        );

        result
    }
}

#[async_trait]
impl GeoProvider for ExternalApiProvider {
    async fn lookup(&self, ip: &str) -> GeoLookupResult {
        let url = self.api_url_template.replace("{ip}", ip);
        let agent = self.agent.clone();

        // ureq is synchronous; run it on the blocking thread pool
        tokio::task::spawn_blocking(move || Self::fetch_sync(&agent, url))
            .await
            .unwrap_or_else(|e| {
                warn!("Geo lookup spawn_blocking failed: {}", e);
                GeoLookupResult::unavailable()
            })
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}
