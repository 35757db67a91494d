use crate::cli::ServeArgs;
use crate::infra::{open_store, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use prefab_directory::config::AppConfig;
use prefab_directory::error::AppError;
use prefab_directory::http::DirectoryServices;
use prefab_directory::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry, config.environment)?;

    let store = open_store(&config)?;
    let services = DirectoryServices::from_config(store.clone(), &config);

    if let Some(admin) = &config.auth.bootstrap_admin {
        if let Some(created) = services
            .accounts
            .ensure_bootstrap_admin(&admin.email, &admin.password)?
        {
            info!(email = %created.email, "bootstrap admin created");
        }
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        store,
    };

    let app = with_operational_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        database = %config.database.path,
        uploads = %config.uploads.directory.display(),
        "prefab directory ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
