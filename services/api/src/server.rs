use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPromotionRepository};
use crate::routes::with_promotion_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use promotion_review::config::AppConfig;
use promotion_review::error::AppError;
use promotion_review::telemetry;
use promotion_review::workflows::promotion::{
    PromotionApi, PromotionSelectionService, RecalculationQueue, RetrySettings, SelectionPolicy,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let repository = Arc::new(InMemoryPromotionRepository::default());
    let service = Arc::new(PromotionSelectionService::new(
        repository,
        SelectionPolicy::default(),
    ));
    let (queue, worker) =
        RecalculationQueue::spawn(service.clone(), RetrySettings::from(&config.promotion));
    tokio::spawn(async move {
        if let Err(err) = worker.await {
            warn!(error = %err, "recalculation worker stopped");
        }
    });

    let api = Arc::new(PromotionApi {
        service,
        queue,
        config: config.promotion.clone(),
    });

    let app = with_promotion_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        target_year = config.promotion.target_year(),
        "promotion review service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
