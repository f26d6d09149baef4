//! Phone directory endpoints
//!
//! Country listing and number validation backing the contact-component
//! editor. Validation failures are structured results, not errors.

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::services::phone;

#[derive(Debug, Serialize)]
pub struct CountryEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub dial_code: &'static str,
    pub flag: &'static str,
    pub min_length: usize,
    pub max_length: usize,
    pub placeholder: &'static str,
    pub display_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub country_code: String,
    pub number: String,
}

pub struct PhoneService;

impl PhoneService {
    pub async fn list_countries() -> impl Responder {
        let countries: Vec<CountryEntry> = phone::all_countries()
            .iter()
            .map(|rule| CountryEntry {
                code: rule.code,
                name: rule.name,
                dial_code: rule.dial_code,
                flag: rule.flag,
                min_length: rule.min_length,
                max_length: rule.max_length,
                placeholder: rule.placeholder,
                display_text: rule.display_text(),
            })
            .collect();

        HttpResponse::Ok().json(ApiResponse::ok(countries))
    }

    pub async fn validate(body: web::Json<ValidateRequest>) -> impl Responder {
        let result = phone::validate(&body.country_code, &body.number);
        HttpResponse::Ok().json(ApiResponse::ok(result))
    }
}
