pub mod auth;
pub mod health;
pub mod phone;
pub mod stats;
pub mod track;

pub use auth::AuthService;
pub use health::HealthService;
pub use phone::PhoneService;
pub use stats::StatsService;
pub use track::TrackService;

use serde::Serialize;

/// API error codes, grouped by domain:
/// - 0: success
/// - 1000-1099: generic errors
/// - 2000-2099: authentication errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,

    AuthFailed = 2000,
}

/// Uniform JSON response envelope
#[derive(Serialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
        }
    }
}
