use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer,
};

use crate::config::ServerConfig;
use crate::executor::QueryExecutor;
use handlers::{graphql_handler, health_check, schema_handler};

pub mod handlers;
pub mod models;

const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub executor: QueryExecutor,
    pub config: ServerConfig,
}

pub fn router(app_state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(app_state.config.request_timeout_secs);
    Router::new()
        .route("/health", get(health_check))
        .route("/graphql", post(graphql_handler))
        .route("/schema", get(schema_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(CatchPanicLayer::new())
        .with_state(app_state)
}

pub async fn run_with_config(config: ServerConfig, executor: QueryExecutor) {
    log::info!(
        "Server configuration: http={}:{}, max_result_rows={:?}",
        config.http_host,
        config.http_port,
        config.max_result_rows
    );

    let http_bind_address = format!("{}:{}", config.http_host, config.http_port);
    let app = router(Arc::new(AppState {
        executor,
        config: config.clone(),
    }));

    let http_listener = match TcpListener::bind(&http_bind_address).await {
        Ok(listener) => {
            log::info!("Successfully bound HTTP listener to {}", http_bind_address);
            listener
        }
        Err(e) => {
            log::error!(
                "Failed to bind HTTP listener to {}: {}",
                http_bind_address,
                e
            );
            log::error!("  Is another process using port {}?", config.http_port);
            std::process::exit(1);
        }
    };

    log::info!("GraphQL endpoint: http://{}/graphql", http_bind_address);

    let http_server = axum::serve(http_listener, app).with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received shutdown signal, shutting down...");
    });

    if let Err(e) = http_server.await {
        log::error!("HTTP server fatal error: {:?}", e);
        std::process::exit(1);
    }
    log::info!("Server stopped");
}
