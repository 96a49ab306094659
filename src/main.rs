use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use depot_api::{
    app_router,
    config::{init_tracing, load_config, AppConfig},
    db, events,
    events::EventSender,
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    init_tracing(&config.log_level, config.log_json);

    info!(
        environment = %config.environment,
        "Starting depot-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_pool = Arc::new(
        db::establish_connection_from_app_config(&config)
            .await
            .context("Failed to connect to the database")?,
    );

    if config.auto_migrate {
        db::run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
    let event_sender = Arc::new(EventSender::new(event_tx));
    tokio::spawn(events::process_events(event_rx));

    let cors = build_cors_layer(&config)?;
    let state = AppState::new(db_pool, Arc::new(config.clone()), event_sender);

    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid host/port configuration")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn build_cors_layer(config: &AppConfig) -> Result<CorsLayer> {
    if config.has_cors_allowed_origins() {
        let origins = config
            .cors_allowed_origins
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", origin))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut layer = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);
        if config.cors_allow_credentials {
            layer = layer.allow_credentials(true);
        }
        Ok(layer)
    } else if config.should_allow_permissive_cors() {
        Ok(CorsLayer::permissive())
    } else {
        Ok(CorsLayer::new())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
