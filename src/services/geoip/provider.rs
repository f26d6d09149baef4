//! Geo lookup abstraction and resolver
//!
//! [`GeoResolver`] is the single entry point for IP geolocation:
//! 1. local/private addresses short-circuit to a fixed demo location
//! 2. a bounded TTL cache keyed by the hashed visitor key
//! 3. cache miss falls through to the configured [`GeoProvider`]
//!
//! Lookups never fail hard: provider trouble degrades to a result with
//! `success = false` and callers record the event without geo data.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::trace;

use super::external_api::ExternalApiProvider;
use crate::config::AnalyticsConfig;
use crate::utils::ip::{is_private_or_local, visitor_key};

/// Where a geo lookup result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GeoSource {
    Default,
    Cache,
    Ip,
}

/// Result of a geolocation lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLookupResult {
    pub success: bool,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: Option<GeoSource>,
}

impl GeoLookupResult {
    /// Lookup failed or was unavailable; callers proceed without geo data
    pub fn unavailable() -> Self {
        Self {
            success: false,
            country: None,
            country_code: None,
            region: None,
            city: None,
            latitude: None,
            longitude: None,
            source: None,
        }
    }

    /// Fixed demo location returned for local development traffic
    pub fn default_location() -> Self {
        Self {
            success: true,
            country: Some("El Salvador".to_string()),
            country_code: Some("SV".to_string()),
            region: Some("San Salvador".to_string()),
            city: Some("San Salvador".to_string()),
            latitude: Some(13.6929),
            longitude: Some(-89.2182),
            source: Some(GeoSource::Default),
        }
    }
}

/// Remote geolocation lookup
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Resolve an IP address; soft-fails with `success = false`
    async fn lookup(&self, ip: &str) -> GeoLookupResult;

    /// Provider name (for logs)
    fn name(&self) -> &'static str;
}

/// Caching geo resolver
///
/// The cache is keyed by the hashed visitor key, never the raw address,
/// so cache contents are as privacy-safe as the event log itself. Only
/// successful lookups are cached; failures stay uncached so a recovered
/// provider is retried on the next event.
pub struct GeoResolver {
    provider: Arc<dyn GeoProvider>,
    cache: Cache<String, GeoLookupResult>,
    salt: String,
}

impl GeoResolver {
    pub fn new(config: &AnalyticsConfig) -> Self {
        let provider = Arc::new(ExternalApiProvider::new(
            &config.geoip_api_url,
            config.geoip_timeout_secs,
        ));
        Self::with_provider(provider, config)
    }

    /// Build a resolver around any provider (tests inject mocks here)
    pub fn with_provider(provider: Arc<dyn GeoProvider>, config: &AnalyticsConfig) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(config.geo_cache_ttl_secs))
            .max_capacity(config.geo_cache_capacity)
            .build();

        Self {
            provider,
            cache,
            salt: config.visitor_salt.clone(),
        }
    }

    /// Resolve a client IP to a location. Never errors.
    pub async fn resolve(&self, client_ip: Option<&str>) -> GeoLookupResult {
        let Some(ip) = client_ip.filter(|s| !s.is_empty()) else {
            return GeoLookupResult::default_location();
        };

        // Local development traffic gets the demo location without
        // touching the cache or the network
        if ip
            .parse::<IpAddr>()
            .map(|addr| is_private_or_local(&addr))
            .unwrap_or(false)
        {
            return GeoLookupResult::default_location();
        }

        let key = visitor_key(ip, &self.salt);

        if let Some(mut cached) = self.cache.get(&key).await {
            trace!("Geo cache hit for visitor {}", key);
            cached.source = Some(GeoSource::Cache);
            return cached;
        }

        let mut result = self.provider.lookup(ip).await;
        if result.success {
            result.source = Some(GeoSource::Ip);
            self.cache.insert(key, result.clone()).await;
        }

        result
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}
