//! Country phone directory
//!
//! Static per-country dialing rules used to validate and format phone
//! numbers for card contact components. The table is compiled once on
//! first use and never mutated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Phone formatting/validation rules for one country
#[derive(Debug, Clone, Serialize)]
pub struct CountryPhoneRule {
    /// ISO 3166-1 alpha-2 code ("SV", "MX")
    pub code: &'static str,
    pub name: &'static str,
    /// International dial code with + prefix ("+503")
    pub dial_code: &'static str,
    pub flag: &'static str,
    pub min_length: usize,
    pub max_length: usize,
    /// Example input shown as a placeholder
    pub placeholder: &'static str,
    /// Full-match pattern over the digit string, when one is defined
    #[serde(skip)]
    pub pattern: Option<&'static Regex>,
}

impl CountryPhoneRule {
    /// Display string: "El Salvador (+503)" with flag prefix
    pub fn display_text(&self) -> String {
        format!("{} {} ({})", self.flag, self.name, self.dial_code)
    }
}

/// Result of phone number validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneValidation {
    pub is_valid: bool,
    pub error: Option<String>,
    pub current_length: usize,
    pub required_length: usize,
    pub e164: Option<String>,
}

macro_rules! country {
    ($code:literal, $name:literal, $dial:literal, $flag:literal, $min:literal, $max:literal, $ph:literal, $pat:literal) => {{
        static PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new($pat).unwrap());
        CountryPhoneRule {
            code: $code,
            name: $name,
            dial_code: $dial,
            flag: $flag,
            min_length: $min,
            max_length: $max,
            placeholder: $ph,
            pattern: Some(&*PATTERN),
        }
    }};
}

static COUNTRIES: Lazy<Vec<CountryPhoneRule>> = Lazy::new(|| {
    vec![
        // Central America
        country!("SV", "El Salvador", "+503", "🇸🇻", 8, 8, "7000 0000", r"^[267][0-9]{7}$"),
        country!("GT", "Guatemala", "+502", "🇬🇹", 8, 8, "5000 0000", r"^[2-7][0-9]{7}$"),
        country!("HN", "Honduras", "+504", "🇭🇳", 8, 8, "9000 0000", r"^[23789][0-9]{7}$"),
        country!("NI", "Nicaragua", "+505", "🇳🇮", 8, 8, "8000 0000", r"^[578][0-9]{7}$"),
        country!("CR", "Costa Rica", "+506", "🇨🇷", 8, 8, "8000 0000", r"^[2-8][0-9]{7}$"),
        country!("PA", "Panama", "+507", "🇵🇦", 8, 8, "6000 0000", r"^[236][0-9]{7}$"),
        country!("BZ", "Belize", "+501", "🇧🇿", 7, 7, "600 0000", r"^[6][0-9]{6}$"),
        // North America
        country!("MX", "Mexico", "+52", "🇲🇽", 10, 10, "55 1234 5678", r"^[1-9][0-9]{9}$"),
        country!("US", "United States", "+1", "🇺🇸", 10, 10, "555 123 4567", r"^[2-9][0-9]{9}$"),
        country!("CA", "Canada", "+1", "🇨🇦", 10, 10, "416 123 4567", r"^[2-9][0-9]{9}$"),
        // South America
        country!("CO", "Colombia", "+57", "🇨🇴", 10, 10, "300 123 4567", r"^[3][0-9]{9}$"),
        country!("PE", "Peru", "+51", "🇵🇪", 9, 9, "900 000 000", r"^[9][0-9]{8}$"),
        country!("AR", "Argentina", "+54", "🇦🇷", 10, 10, "11 1234 5678", r"^[1-9][0-9]{9}$"),
        country!("CL", "Chile", "+56", "🇨🇱", 9, 9, "9 1234 5678", r"^[9][0-9]{8}$"),
        country!("EC", "Ecuador", "+593", "🇪🇨", 9, 9, "99 123 4567", r"^[9][0-9]{8}$"),
        country!("VE", "Venezuela", "+58", "🇻🇪", 10, 10, "412 123 4567", r"^[4][0-9]{9}$"),
        country!("BO", "Bolivia", "+591", "🇧🇴", 8, 8, "7000 0000", r"^[67][0-9]{7}$"),
        country!("PY", "Paraguay", "+595", "🇵🇾", 9, 9, "981 123 456", r"^[9][0-9]{8}$"),
        country!("UY", "Uruguay", "+598", "🇺🇾", 8, 8, "99 123 456", r"^[9][0-9]{7}$"),
        // Caribbean
        country!("DO", "Dominican Republic", "+1", "🇩🇴", 10, 10, "809 123 4567", r"^(809|829|849)[0-9]{7}$"),
        country!("PR", "Puerto Rico", "+1", "🇵🇷", 10, 10, "787 123 4567", r"^(787|939)[0-9]{7}$"),
        country!("CU", "Cuba", "+53", "🇨🇺", 8, 8, "5123 4567", r"^[5][0-9]{7}$"),
        // Europe
        country!("ES", "Spain", "+34", "🇪🇸", 9, 9, "600 000 000", r"^[6-7][0-9]{8}$"),
        country!("FR", "France", "+33", "🇫🇷", 9, 9, "6 12 34 56 78", r"^[67][0-9]{8}$"),
        country!("DE", "Germany", "+49", "🇩🇪", 10, 11, "151 1234 5678", r"^[1][0-9]{9,10}$"),
        country!("IT", "Italy", "+39", "🇮🇹", 9, 10, "312 345 6789", r"^[3][0-9]{8,9}$"),
        country!("GB", "United Kingdom", "+44", "🇬🇧", 10, 10, "7911 123456", r"^[7][0-9]{9}$"),
        country!("PT", "Portugal", "+351", "🇵🇹", 9, 9, "912 345 678", r"^[9][0-9]{8}$"),
    ]
});

/// All available countries, in display order
pub fn all_countries() -> &'static [CountryPhoneRule] {
    &COUNTRIES
}

/// Look up a country by ISO code, case-insensitively
pub fn by_code(country_code: &str) -> Option<&'static CountryPhoneRule> {
    COUNTRIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(country_code))
}

/// Look up a country by dial code ("+503")
pub fn by_dial_code(dial_code: &str) -> Option<&'static CountryPhoneRule> {
    COUNTRIES
        .iter()
        .find(|c| c.dial_code.eq_ignore_ascii_case(dial_code))
}

/// The product's default country (El Salvador)
pub fn default_country() -> &'static CountryPhoneRule {
    by_code("SV").expect("SV is always present in the country table")
}

fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a national number against a country's rules.
///
/// Checks run in order: known country, non-empty digits, minimum
/// length, maximum length, pattern. The first failing check produces
/// the result; validation failures are values, never errors.
pub fn validate(country_code: &str, national_number: &str) -> PhoneValidation {
    let Some(country) = by_code(country_code) else {
        return PhoneValidation {
            is_valid: false,
            error: Some("Select a country".to_string()),
            current_length: 0,
            required_length: 0,
            e164: None,
        };
    };

    let digits = digits_only(national_number);

    if digits.is_empty() {
        return PhoneValidation {
            is_valid: false,
            error: Some("Enter a phone number".to_string()),
            current_length: 0,
            required_length: country.min_length,
            e164: None,
        };
    }

    if digits.len() < country.min_length {
        let missing = country.min_length - digits.len();
        return PhoneValidation {
            is_valid: false,
            error: Some(format!(
                "Missing {} digit{}",
                missing,
                if missing > 1 { "s" } else { "" }
            )),
            current_length: digits.len(),
            required_length: country.min_length,
            e164: None,
        };
    }

    if digits.len() > country.max_length {
        return PhoneValidation {
            is_valid: false,
            error: Some(format!(
                "Maximum {} digits for {}",
                country.max_length, country.name
            )),
            current_length: digits.len(),
            required_length: country.max_length,
            e164: None,
        };
    }

    if let Some(pattern) = country.pattern {
        if !pattern.is_match(&digits) {
            return PhoneValidation {
                is_valid: false,
                error: Some(format!("Invalid number for {}", country.name)),
                current_length: digits.len(),
                required_length: country.min_length,
                e164: None,
            };
        }
    }

    PhoneValidation {
        is_valid: true,
        error: None,
        current_length: digits.len(),
        required_length: country.min_length,
        e164: Some(format!("{}{}", country.dial_code, digits)),
    }
}

/// Format a number to E.164 by concatenating dial code and digits.
/// Does not validate; unknown countries return the input unchanged.
pub fn to_e164(country_code: &str, national_number: &str) -> String {
    match by_code(country_code) {
        Some(country) => format!("{}{}", country.dial_code, digits_only(national_number)),
        None => national_number.to_string(),
    }
}
