use crate::cli::ServeArgs;
use crate::demo::seed_demo_portfolio;
use crate::infra::{AppState, InMemoryPropertyRepository, RecordingNotifier};
use crate::routes::with_settlement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hausverwaltung::config::AppConfig;
use hausverwaltung::error::AppError;
use hausverwaltung::telemetry;
use hausverwaltung::workflows::settlement::SettlementService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let repository = Arc::new(InMemoryPropertyRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let settlement_service = Arc::new(SettlementService::new(repository, notifier));

    if config.portfolio.seed_demo_portfolio {
        let seeded = seed_demo_portfolio(&settlement_service)?;
        info!(seeded, "demo portfolio seeded");
    }

    let app = with_settlement_routes(settlement_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "settlement dashboard service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
