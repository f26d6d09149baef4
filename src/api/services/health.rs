//! Health probe
//!
//! Fast, unauthenticated liveness check with a bounded storage ping.

use actix_web::{HttpResponse, Responder, web};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use crate::storage::SeaOrmStorage;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage_backend: String,
    pub storage_ok: bool,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(storage: web::Data<Arc<SeaOrmStorage>>) -> impl Responder {
        trace!("Received health check request");

        let ping = Statement::from_string(
            storage.connection().get_database_backend(),
            "SELECT 1".to_string(),
        );
        let storage_ok = matches!(
            tokio::time::timeout(
                Duration::from_secs(5),
                storage.connection().execute_raw(ping)
            )
            .await,
            Ok(Ok(_))
        );

        let response = HealthResponse {
            status: if storage_ok { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            storage_backend: storage.backend_name().to_string(),
            storage_ok,
        };

        if storage_ok {
            HttpResponse::Ok().json(response)
        } else {
            HttpResponse::ServiceUnavailable().json(response)
        }
    }
}
