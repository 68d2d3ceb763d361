use crate::cli::ServeArgs;
use crate::infra::{seeded_directory, AppState, TracingNotificationPublisher};
use crate::routes::with_marketplace_routes;
use crate::sweeper;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tender_market::config::AppConfig;
use tender_market::error::AppError;
use tender_market::marketplace::{InMemoryMarketplaceStore, MarketplaceService};
use tender_market::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryMarketplaceStore::new());
    let directory = Arc::new(seeded_directory());
    let notifier = Arc::new(TracingNotificationPublisher);
    let marketplace_service = Arc::new(MarketplaceService::new(store, directory, notifier));

    tokio::spawn(sweeper::run(
        marketplace_service.clone(),
        config.sweeper.interval,
    ));

    let app = with_marketplace_routes(marketplace_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tender marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}
