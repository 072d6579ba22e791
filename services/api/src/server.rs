use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicantRepository, InMemoryObjectStorage};
use crate::routes::with_onboarding_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use momscare::config::AppConfig;
use momscare::error::AppError;
use momscare::onboarding::{
    OnboardingApi, QueuedNotifier, SmtpMailTransport, StaticTokenAuthorizer, TemplateSettings,
};
use momscare::telemetry;
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

    let transport = SmtpMailTransport::from_config(&config.mail)?;
    let notifier = Arc::new(QueuedNotifier::spawn(
        Arc::new(transport),
        TemplateSettings {
            admin_email: config.mail.admin_email.clone(),
            dashboard_url: config.dashboard_url(),
        },
    ));

    let api = OnboardingApi::new(
        Arc::new(InMemoryApplicantRepository::default()),
        Arc::new(InMemoryObjectStorage::new(config.server.public_url())),
        notifier.clone(),
        Arc::new(StaticTokenAuthorizer::new(&config.admin.api_token)),
    );

    let app = with_onboarding_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "onboarding service ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    notifier.shutdown().await;
    info!("onboarding service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
