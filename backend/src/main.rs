use std::sync::Arc;

use backend::{
    AppState,
    config::Config,
    create_router,
    geocoding::Nominatim,
    routing::Osrm,
    service::SeatService,
    solar::SunCalc,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=info,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    if let Err(err) = config.validate() {
        tracing::error!("invalid configuration: {err}");
        std::process::exit(2);
    }

    let client = config.http_client().expect("build HTTP client");
    let service = SeatService::new(
        Arc::new(Nominatim::new(client.clone(), &config.nominatim_url)),
        Arc::new(Osrm::new(client, &config.osrm_url)),
        Arc::new(SunCalc),
    )
    .with_traffic(config.traffic);

    tracing::info!("geocoder: {}", config.nominatim_url);
    tracing::info!("router: {}", config.osrm_url);
    tracing::info!(
        "traffic: {:?}, upstream timeout: {}s",
        service.traffic(),
        config.upstream_timeout_secs
    );

    let app = create_router(AppState {
        service: Arc::new(service),
        suggest_limit: config.suggest_limit,
    });

    let addr = config.bind_addr;
    tracing::info!("starting backend on http://{addr}");
    tracing::info!("API endpoints:");
    tracing::info!("  POST /find-seat - Recommend a seat side for a journey");
    tracing::info!("  GET /autocomplete?q= - Place suggestions (geocoder passthrough)");
    tracing::info!("  GET /reverse-geocode?lat=&lon= - Reverse lookup (geocoder passthrough)");
    axum::serve(tokio::net::TcpListener::bind(addr).await.expect("bind listener"), app)
        .await
        .expect("server error");
}
