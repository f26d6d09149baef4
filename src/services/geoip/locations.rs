//! Known-location coordinate table
//!
//! Reference coordinates for cities the product commonly sees, used
//! when the remote provider is unavailable or for manually entered
//! locations. Keys are "{city}_{country_code}", lowercase.

/// (key, latitude, longitude)
static KNOWN_LOCATIONS: &[(&str, f64, f64)] = &[
    // El Salvador
    ("san salvador_sv", 13.6929, -89.2182),
    ("santa ana_sv", 13.9942, -89.5597),
    ("san miguel_sv", 13.4833, -88.1833),
    ("la libertad_sv", 13.4883, -89.3225),
    ("soyapango_sv", 13.7167, -89.1500),
    // United States
    ("miami_us", 25.7617, -80.1918),
    ("boston_us", 42.3601, -71.0589),
    ("new york_us", 40.7128, -74.0060),
    ("los angeles_us", 34.0522, -118.2437),
    ("houston_us", 29.7604, -95.3698),
    // Mexico
    ("ciudad de méxico_mx", 19.4326, -99.1332),
    ("cdmx_mx", 19.4326, -99.1332),
    ("mexico city_mx", 19.4326, -99.1332),
    ("guadalajara_mx", 20.6597, -103.3496),
    ("monterrey_mx", 25.6866, -100.3161),
    // Central America
    ("guatemala city_gt", 14.6349, -90.5069),
    ("tegucigalpa_hn", 14.0723, -87.1921),
    ("san josé_cr", 9.9281, -84.0907),
    ("panama city_pa", 8.9824, -79.5199),
    ("managua_ni", 12.1150, -86.2362),
    // South America
    ("bogotá_co", 4.7110, -74.0721),
    ("lima_pe", -12.0464, -77.0428),
    ("buenos aires_ar", -34.6037, -58.3816),
    ("são paulo_br", -23.5505, -46.6333),
    // Europe
    ("madrid_es", 40.4168, -3.7038),
    ("barcelona_es", 41.3851, 2.1734),
    ("london_gb", 51.5074, -0.1278),
    ("paris_fr", 48.8566, 2.3522),
];

/// Look up reference coordinates for a (city, country_code) pair.
///
/// Exact key match first, then a prefix match on the city name (the
/// part before any comma). Returns (None, None) when nothing matches.
pub fn coordinates_for(city: Option<&str>, country_code: Option<&str>) -> (Option<f64>, Option<f64>) {
    let (Some(city), Some(country_code)) = (
        city.filter(|s| !s.is_empty()),
        country_code.filter(|s| !s.is_empty()),
    ) else {
        return (None, None);
    };

    let city_lower = city.to_lowercase();
    let key = format!("{}_{}", city_lower, country_code.to_lowercase());

    if let Some((_, lat, lon)) = KNOWN_LOCATIONS.iter().find(|(k, _, _)| *k == key) {
        return (Some(*lat), Some(*lon));
    }

    // Prefix match on the city part, tolerating "City, Region" input
    let city_prefix = city_lower.split(',').next().unwrap_or(&city_lower);
    if let Some((_, lat, lon)) = KNOWN_LOCATIONS
        .iter()
        .find(|(k, _, _)| k.starts_with(city_prefix))
    {
        return (Some(*lat), Some(*lon));
    }

    (None, None)
}
