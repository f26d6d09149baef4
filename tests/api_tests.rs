//! HTTP API integration tests
//!
//! Drives the actix handlers end-to-end against a temporary SQLite
//! database: anonymous tracking, login, session-guarded stats and the
//! tenant-scoping rules.

use std::sync::Arc;

use actix_web::{App, test, web};
use async_trait::async_trait;
use tempfile::TempDir;
use uuid::Uuid;

use cardtrace::analytics::store::EventStore;
use cardtrace::analytics::{AnalyticsAggregator, EventRecorder};
use cardtrace::api::{IdentityGate, SessionAuth, configure_card_routes, configure_public_routes};
use cardtrace::config::AnalyticsConfig;
use cardtrace::services::geoip::{GeoLookupResult, GeoProvider, GeoResolver};
use cardtrace::storage::SeaOrmStorage;
use cardtrace::utils::password::hash_password;

struct NoGeo;

#[async_trait]
impl GeoProvider for NoGeo {
    async fn lookup(&self, _ip: &str) -> GeoLookupResult {
        GeoLookupResult::unavailable()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

struct TestWorld {
    storage: Arc<SeaOrmStorage>,
    recorder: Arc<EventRecorder>,
    aggregator: Arc<AnalyticsAggregator>,
    identity: Arc<IdentityGate>,
    _td: TempDir,
}

async fn build_world() -> TestWorld {
    let td = TempDir::new().unwrap();
    let path = td.path().join("api_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = Arc::new(SeaOrmStorage::new(&url).await.unwrap());

    let config = AnalyticsConfig::default();
    let event_store: Arc<dyn EventStore> = storage.clone();
    let geo = Arc::new(GeoResolver::with_provider(Arc::new(NoGeo), &config));
    let recorder = Arc::new(EventRecorder::new(
        event_store.clone(),
        geo,
        &config.visitor_salt,
    ));
    let aggregator = Arc::new(AnalyticsAggregator::new(event_store));
    let identity = Arc::new(IdentityGate::new(storage.clone()));

    TestWorld {
        storage,
        recorder,
        aggregator,
        identity,
        _td: td,
    }
}

macro_rules! test_app {
    ($world:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($world.storage.clone()))
                .app_data(web::Data::new($world.recorder.clone()))
                .app_data(web::Data::new($world.aggregator.clone()))
                .app_data(web::Data::new($world.identity.clone()))
                .configure(configure_public_routes)
                .service(
                    web::scope("/api/cards")
                        .wrap(SessionAuth)
                        .configure(configure_card_routes),
                ),
        )
        .await
    };
}

async fn seed_account(
    storage: &SeaOrmStorage,
    org_name: &str,
    email: &str,
    password: &str,
) -> (Uuid, Uuid) {
    let org_id = storage.insert_organization(org_name).await.unwrap();
    let password_hash = hash_password(password).unwrap();
    let user_id = storage
        .insert_user(org_id, email, &password_hash, "Test User", "admin")
        .await
        .unwrap();
    (org_id, user_id)
}

macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"email": $email, "password": $password}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
        assert_eq!(body["code"], 0, "login failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }};
}

// =============================================================================
// Tracking endpoint
// =============================================================================

#[actix_rt::test]
async fn test_track_and_read_stats() {
    let world = build_world().await;
    let (org_id, user_id) =
        seed_account(&world.storage, "Acme", "owner@acme.test", "secret_pass_1").await;
    let card_id = world
        .storage
        .insert_card(org_id, user_id, "acme-card", "Acme Card")
        .await
        .unwrap();

    let app = test_app!(world);

    // anonymous page view
    let req = test::TestRequest::post()
        .uri(&format!("/t/{}", card_id))
        .insert_header(("User-Agent", "Mozilla/5.0 (iPhone; like Mac OS X) Mobile"))
        .set_json(serde_json::json!({"kind": "page_view"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);

    // link click with channel
    let req = test::TestRequest::post()
        .uri(&format!("/t/{}", card_id))
        .set_json(serde_json::json!({
            "kind": "link_click",
            "channel": "linkedin",
            "url": "https://linkedin.com/in/x"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);

    // stats behind the session gate
    let token = login!(app, "owner@acme.test", "secret_pass_1");
    let req = test::TestRequest::get()
        .uri(&format!("/api/cards/{}/stats", card_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["counts"]["page_view"], 1);
    assert_eq!(body["data"]["counts"]["link_click"], 1);
    assert_eq!(body["data"]["device_breakdown"]["mobile"], 1);
}

#[actix_rt::test]
async fn test_track_unknown_card_is_404() {
    let world = build_world().await;
    let app = test_app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/t/{}", Uuid::new_v4()))
        .set_json(serde_json::json!({"kind": "page_view"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn test_track_link_click_requires_channel() {
    let world = build_world().await;
    let (org_id, user_id) =
        seed_account(&world.storage, "Acme", "owner@acme.test", "secret_pass_1").await;
    let card_id = world
        .storage
        .insert_card(org_id, user_id, "acme-card", "Acme Card")
        .await
        .unwrap();

    let app = test_app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/t/{}", card_id))
        .set_json(serde_json::json!({"kind": "link_click"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

// =============================================================================
// Session gate and tenancy
// =============================================================================

#[actix_rt::test]
async fn test_stats_requires_session() {
    let world = build_world().await;
    let (org_id, user_id) =
        seed_account(&world.storage, "Acme", "owner@acme.test", "secret_pass_1").await;
    let card_id = world
        .storage
        .insert_card(org_id, user_id, "acme-card", "Acme Card")
        .await
        .unwrap();

    let app = test_app!(world);

    let req = test::TestRequest::get()
        .uri(&format!("/api/cards/{}/stats", card_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri(&format!("/api/cards/{}/stats", card_id))
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_foreign_org_card_answers_404() {
    let world = build_world().await;
    let (org_a, user_a) =
        seed_account(&world.storage, "Org A", "a@a.test", "secret_pass_a").await;
    seed_account(&world.storage, "Org B", "b@b.test", "secret_pass_b").await;
    let card_id = world
        .storage
        .insert_card(org_a, user_a, "a-card", "A Card")
        .await
        .unwrap();

    let app = test_app!(world);

    // org B's session cannot see org A's card
    let token = login!(app, "b@b.test", "secret_pass_b");
    let req = test::TestRequest::get()
        .uri(&format!("/api/cards/{}/stats", card_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn test_login_rejects_bad_credentials() {
    let world = build_world().await;
    seed_account(&world.storage, "Acme", "owner@acme.test", "secret_pass_1").await;

    let app = test_app!(world);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({"email": "owner@acme.test", "password": "nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

// =============================================================================
// Recent events and phone endpoints
// =============================================================================

#[actix_rt::test]
async fn test_recent_events_endpoint_limit() {
    let world = build_world().await;
    let (org_id, user_id) =
        seed_account(&world.storage, "Acme", "owner@acme.test", "secret_pass_1").await;
    let card_id = world
        .storage
        .insert_card(org_id, user_id, "acme-card", "Acme Card")
        .await
        .unwrap();

    let app = test_app!(world);

    for kind in ["page_view", "qr_scan", "share"] {
        let req = test::TestRequest::post()
            .uri(&format!("/t/{}", card_id))
            .set_json(serde_json::json!({"kind": kind}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 204);
    }

    let token = login!(app, "owner@acme.test", "secret_pass_1");
    let req = test::TestRequest::get()
        .uri(&format!("/api/cards/{}/events?limit=2", card_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    // newest first
    assert_eq!(events[0]["kind"], "share");
    assert_eq!(events[1]["kind"], "qr_scan");
}

#[actix_rt::test]
async fn test_phone_endpoints() {
    let world = build_world().await;
    let app = test_app!(world);

    let req = test::TestRequest::get().uri("/api/phone/countries").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 28);

    let req = test::TestRequest::post()
        .uri("/api/phone/validate")
        .set_json(serde_json::json!({"country_code": "SV", "number": "7000-0000"}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["is_valid"], true);
    assert_eq!(body["data"]["e164"], "+50370000000");
}

#[actix_rt::test]
async fn test_health_endpoint() {
    let world = build_world().await;
    let app = test_app!(world);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage_backend"], "sqlite");
}
