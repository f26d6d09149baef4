//! HTTP API surface
//!
//! Route layout:
//! - `/health` — liveness probe (public)
//! - `/t/{card_id}` — anonymous event tracking (public)
//! - `/api/auth/login` — credential exchange (public)
//! - `/api/phone/*` — phone directory (public)
//! - `/api/cards/*` — analytics reads (session-guarded, tenant-scoped)

pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod services;

pub use identity::{IdentityGate, SessionPrincipal};
pub use middleware::SessionAuth;

use actix_web::web;

use services::{AuthService, HealthService, PhoneService, StatsService, TrackService};

/// Routes that do not require a session
pub fn configure_public_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(HealthService::health_check))
        .route("/t/{card_id}", web::post().to(TrackService::track_event))
        .route("/api/auth/login", web::post().to(AuthService::login))
        .route(
            "/api/phone/countries",
            web::get().to(PhoneService::list_countries),
        )
        .route("/api/phone/validate", web::post().to(PhoneService::validate));
}

/// Session-guarded analytics routes, mounted under `/api/cards`
pub fn configure_card_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{card_id}/stats", web::get().to(StatsService::card_stats))
        .route(
            "/{card_id}/events",
            web::get().to(StatsService::recent_events),
        );
}
