//! Login endpoint
//!
//! Exchanges credentials for a signed session token via the identity
//! gate. Failed logins always answer the same way.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiResponse, ErrorCode};
use crate::api::identity::IdentityGate;
use crate::errors::CardtraceError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub organization_id: String,
    pub organization_name: String,
}

pub struct AuthService;

impl AuthService {
    pub async fn login(
        body: web::Json<LoginRequest>,
        gate: web::Data<Arc<IdentityGate>>,
    ) -> impl Responder {
        let principal = match gate.authenticate(&body.email, &body.password).await {
            Ok(principal) => principal,
            Err(CardtraceError::Unauthorized(_)) => {
                info!("Login failed for submitted credentials");
                return HttpResponse::Unauthorized().json(ApiResponse::<()>::error(
                    ErrorCode::AuthFailed,
                    "Invalid email or password",
                ));
            }
            Err(e) => {
                debug!("Login errored: {}", e);
                return HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    ErrorCode::InternalServerError,
                    "Internal Server Error",
                ));
            }
        };

        match gate.issue_session(&principal) {
            Ok(token) => HttpResponse::Ok().json(ApiResponse::ok(LoginResponse {
                token,
                user: SessionUser {
                    id: principal.user_id.to_string(),
                    email: principal.email,
                    full_name: principal.full_name,
                    role: principal.role,
                    organization_id: principal.organization_id.to_string(),
                    organization_name: principal.organization_name,
                },
            })),
            Err(e) => {
                debug!("Session token issuance failed: {}", e);
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    ErrorCode::InternalServerError,
                    "Internal Server Error",
                ))
            }
        }
    }
}
