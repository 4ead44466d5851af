use anyhow::Result;
use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::Config,
    db, handlers,
    handlers::AppState,
    price::{EiaClient, PriceResolver, SqlitePriceStore},
    trips::TripLedger,
};

/// Start the drive cost server
///
/// This function:
/// 1. Installs the metrics recorder
/// 2. Opens the database and runs migrations
/// 3. Wires the price resolver and trip ledger
/// 4. Serves requests until Ctrl-C / SIGTERM
pub async fn start_server(config: Config) -> Result<()> {
    info!("Drive cost service starting...");

    let metrics_handle = Arc::new(crate::metrics::init_metrics()?);
    let pool = db::connect(&config.database).await?;
    let state = build_state(&config, pool)?;

    let app = create_router(state, metrics_handle, &config.server.cors_origins);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Build the shared state backed by SQLite and the EIA API
pub fn build_state(config: &Config, pool: SqlitePool) -> Result<AppState> {
    let provider = EiaClient::new(&config.eia)?;
    let store = SqlitePriceStore::new(pool.clone());

    info!(
        regions = config.eia.series.len(),
        base_url = %config.eia.base_url,
        "Price resolver configured"
    );

    Ok(AppState {
        resolver: Arc::new(PriceResolver::new(
            Arc::new(store),
            Arc::new(provider),
            config.eia.series.clone(),
        )),
        ledger: Arc::new(TripLedger::new(pool)),
    })
}

pub fn create_router(
    state: AppState,
    metrics_handle: Arc<PrometheusHandle>,
    cors_origins: &[String],
) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/calculate/",
            post(handlers::calculate::calculate_drive_cost),
        )
        .route("/api/history/", get(handlers::trips::get_calculation_history))
        .route("/api/stats/", get(handlers::reports::get_drive_stats))
        .route(
            "/api/available-months/",
            get(handlers::reports::get_available_months),
        )
        .route(
            "/api/monthly-summary/",
            get(handlers::reports::get_monthly_summary),
        )
        .route("/api/monthly-data/", get(handlers::reports::get_monthly_data))
        .route(
            "/api/update-entry/:entry_id",
            put(handlers::trips::update_entry),
        )
        .route(
            "/api/delete-entry/:entry_id",
            put(handlers::trips::delete_entry),
        )
        .route("/api/health/", get(handlers::system::health_check))
        .with_state(state);

    Router::new()
        .route("/metrics", get(handlers::system::metrics))
        .with_state(metrics_handle)
        .merge(api_routes)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
