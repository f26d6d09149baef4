//! Device classification and referrer handling
//!
//! Pure helpers used while enriching engagement events. Classification
//! is deliberately coarse: the dashboard only distinguishes mobile,
//! tablet and desktop traffic.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Coarse device category derived from the User-Agent string
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

/// Classify a User-Agent string into a [`DeviceType`].
///
/// Case-insensitive substring checks; mobile tokens are checked before
/// tablet tokens, so a UA matching both classifies as mobile.
pub fn classify_device(user_agent: Option<&str>) -> DeviceType {
    let Some(ua) = user_agent.filter(|s| !s.is_empty()) else {
        return DeviceType::Unknown;
    };

    let ua = ua.to_lowercase();

    if ua.contains("mobile") || ua.contains("android") || ua.contains("iphone") {
        return DeviceType::Mobile;
    }

    if ua.contains("tablet") || ua.contains("ipad") {
        return DeviceType::Tablet;
    }

    DeviceType::Desktop
}

/// Extract the referrer domain only (privacy-safe).
///
/// Returns the host component of a URL-like string, never the path or
/// query. None on empty input or parse failure.
pub fn referrer_domain(referrer: Option<&str>) -> Option<String> {
    let referrer = referrer.filter(|s| !s.is_empty())?;

    url::Url::parse(referrer)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mobile() {
        assert_eq!(
            classify_device(Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)")),
            DeviceType::Mobile
        );
        assert_eq!(
            classify_device(Some("Mozilla/5.0 (Linux; Android 14; Pixel 8)")),
            DeviceType::Mobile
        );
    }

    #[test]
    fn test_classify_tablet() {
        assert_eq!(
            classify_device(Some("Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)")),
            DeviceType::Tablet
        );
        assert_eq!(classify_device(Some("Some Tablet Browser")), DeviceType::Tablet);
    }

    #[test]
    fn test_classify_mobile_wins_over_tablet() {
        // UA carrying both mobile and tablet tokens classifies as mobile
        assert_eq!(
            classify_device(Some("Mozilla/5.0 (iPad; Mobile Safari)")),
            DeviceType::Mobile
        );
    }

    #[test]
    fn test_classify_desktop_and_unknown() {
        assert_eq!(
            classify_device(Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64)")),
            DeviceType::Desktop
        );
        assert_eq!(classify_device(None), DeviceType::Unknown);
        assert_eq!(classify_device(Some("")), DeviceType::Unknown);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify_device(Some("SOMETHING IPHONE")), DeviceType::Mobile);
    }

    #[test]
    fn test_device_type_string_form() {
        assert_eq!(DeviceType::Mobile.to_string(), "mobile");
        assert_eq!("tablet".parse::<DeviceType>().unwrap(), DeviceType::Tablet);
    }

    #[test]
    fn test_referrer_domain() {
        assert_eq!(
            referrer_domain(Some("https://www.linkedin.com/in/someone?src=share")),
            Some("www.linkedin.com".to_string())
        );
        assert_eq!(
            referrer_domain(Some("http://example.com/path/to/page")),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_referrer_domain_never_leaks_path() {
        let domain = referrer_domain(Some("https://site.test/secret?token=abc")).unwrap();
        assert!(!domain.contains("secret"));
        assert!(!domain.contains("token"));
    }

    #[test]
    fn test_referrer_domain_invalid() {
        assert_eq!(referrer_domain(None), None);
        assert_eq!(referrer_domain(Some("")), None);
        assert_eq!(referrer_domain(Some("not a url")), None);
        // scheme-less strings are not valid absolute URLs
        assert_eq!(referrer_domain(Some("example.com/page")), None);
    }
}
