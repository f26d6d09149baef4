//! Service layer for business logic
//!
//! Enrichment and reference-data services shared by the event recorder
//! and the HTTP API.

pub mod device;
pub mod geoip;
pub mod phone;

pub use device::{DeviceType, classify_device, referrer_domain};
pub use geoip::{GeoLookupResult, GeoProvider, GeoResolver, GeoSource};
