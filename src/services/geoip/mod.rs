//! Geolocation service module
//!
//! IP-based geolocation with a privacy-first design: lookups are cached
//! under hashed visitor keys, local traffic short-circuits to a demo
//! location, and provider failures degrade to "no geo data".

mod external_api;
mod locations;
mod provider;

pub use external_api::ExternalApiProvider;
pub use locations::coordinates_for;
pub use provider::{GeoLookupResult, GeoProvider, GeoResolver, GeoSource};
