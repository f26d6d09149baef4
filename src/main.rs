use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use tracing::info;

use cardtrace::analytics::store::EventStore;
use cardtrace::analytics::{AnalyticsAggregator, EventRecorder};
use cardtrace::api::{IdentityGate, SessionAuth, configure_card_routes, configure_public_routes};
use cardtrace::config::get_config;
use cardtrace::services::geoip::GeoResolver;
use cardtrace::storage::SeaOrmStorage;
use cardtrace::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = get_config();

    // Guard must stay alive for the process lifetime
    let _log_guard = init_logging(&config.logging);

    info!("Starting cardtrace v{}", env!("CARGO_PKG_VERSION"));

    let storage = match SeaOrmStorage::new(&config.database.url).await {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    let event_store: Arc<dyn EventStore> = storage.clone();
    let geo = Arc::new(GeoResolver::new(&config.analytics));
    info!("Geo resolver using {} provider", geo.provider_name());

    let recorder = Arc::new(EventRecorder::new(
        event_store.clone(),
        geo,
        &config.analytics.visitor_salt,
    ));
    let aggregator = Arc::new(AnalyticsAggregator::new(event_store));
    let identity = Arc::new(IdentityGate::new(storage.clone()));

    let bind_addr = (config.server.host.as_str(), config.server.port);
    info!("Listening on {}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        let cors_origin = &get_config().api.cors_origin;
        let cors = if cors_origin.is_empty() {
            Cors::default()
        } else {
            Cors::default()
                .allowed_origin(cors_origin)
                .allow_any_method()
                .allow_any_header()
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(recorder.clone()))
            .app_data(web::Data::new(aggregator.clone()))
            .app_data(web::Data::new(identity.clone()))
            .configure(configure_public_routes)
            .service(
                web::scope("/api/cards")
                    .wrap(SessionAuth)
                    .configure(configure_card_routes),
            )
    })
    .workers(config.server.cpu_count)
    .bind(bind_addr)?
    .run()
    .await
}
