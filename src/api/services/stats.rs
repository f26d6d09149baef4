//! Analytics read endpoints
//!
//! Session-guarded: the auth middleware has already placed a
//! [`SessionPrincipal`] in the request extensions, and every card
//! lookup is checked against the principal's organization. Cards
//! outside the tenant answer 404, not 403, so ids do not leak.

use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use super::{ApiResponse, ErrorCode};
use crate::analytics::AnalyticsAggregator;
use crate::analytics::aggregator::DEFAULT_RECENT_LIMIT;
use crate::api::identity::SessionPrincipal;
use crate::storage::SeaOrmStorage;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Inclusive window start, RFC 3339
    pub from: Option<String>,
    /// Inclusive window end, RFC 3339
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

pub struct StatsService;

impl StatsService {
    pub async fn card_stats(
        req: HttpRequest,
        path: web::Path<Uuid>,
        query: web::Query<StatsQuery>,
        aggregator: web::Data<Arc<AnalyticsAggregator>>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let card_id = path.into_inner();

        if let Err(resp) = authorize_card(&req, card_id, &storage).await {
            return resp;
        }

        let from = match parse_bound(query.from.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let to = match parse_bound(query.to.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match aggregator.get_stats(card_id, from, to).await {
            Ok(stats) => HttpResponse::Ok().json(ApiResponse::ok(stats)),
            Err(e) => {
                error!("Stats aggregation failed for card {}: {}", card_id, e);
                internal_error()
            }
        }
    }

    pub async fn recent_events(
        req: HttpRequest,
        path: web::Path<Uuid>,
        query: web::Query<RecentQuery>,
        aggregator: web::Data<Arc<AnalyticsAggregator>>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let card_id = path.into_inner();

        if let Err(resp) = authorize_card(&req, card_id, &storage).await {
            return resp;
        }

        let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);

        match aggregator.get_recent_events(card_id, limit).await {
            Ok(events) => HttpResponse::Ok().json(ApiResponse::ok(events)),
            Err(e) => {
                error!("Recent events query failed for card {}: {}", card_id, e);
                internal_error()
            }
        }
    }
}

/// Confirm the card exists and belongs to the caller's organization
async fn authorize_card(
    req: &HttpRequest,
    card_id: Uuid,
    storage: &Arc<SeaOrmStorage>,
) -> Result<(), HttpResponse> {
    let Some(organization_id) = req
        .extensions()
        .get::<SessionPrincipal>()
        .map(|p| p.organization_id)
    else {
        // the middleware always inserts a principal; treat absence as
        // an unauthenticated request
        return Err(HttpResponse::Unauthorized().json(ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            "Unauthorized",
        )));
    };

    match storage.find_card(card_id).await {
        Ok(Some(card)) if card.organization_id == organization_id => Ok(()),
        Ok(_) => Err(not_found()),
        Err(e) => {
            error!("Card lookup failed during authorization: {}", e);
            Err(internal_error())
        }
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, HttpResponse> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                ErrorCode::InvalidDateFormat,
                format!("Invalid RFC 3339 timestamp: {}", raw),
            ))
        })
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(ErrorCode::NotFound, "Card not found"))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
        ErrorCode::InternalServerError,
        "Internal Server Error",
    ))
}
