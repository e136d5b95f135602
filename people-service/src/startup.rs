//! Application startup and lifecycle management.

use crate::config::PeopleConfig;
use crate::handlers;
use crate::services::{PeopleDb, PersonStore};
use axum::{
    http::Request,
    middleware::from_fn,
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PersonStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }
}

/// Build the HTTP router.
///
/// Layers run outermost first: CORS, request id, request logging, metrics,
/// then the handler (which performs JSON body parsing).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route(
            "/people",
            get(handlers::list_people).post(handlers::create_person),
        )
        .route(
            "/people/:id",
            axum::routing::delete(handlers::delete_person).put(handlers::update_person),
        )
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(from_fn(request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect to MongoDB and bind the listener. Port 0 binds an ephemeral
    /// port, which tests rely on.
    pub async fn build(config: PeopleConfig) -> Result<Self, AppError> {
        let db = PeopleDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;

        Self::build_with_store(config, Arc::new(db)).await
    }

    /// Bind the listener around an already constructed store.
    pub async fn build_with_store(
        config: PeopleConfig,
        store: Arc<dyn PersonStore>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState::new(store),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> Arc<dyn PersonStore> {
        self.state.store.clone()
    }

    /// Serve until Ctrl+C or SIGTERM, then release the store connection.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let store = self.state.store.clone();
        let app = build_router(self.state);

        let result = axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        store.close().await;

        result.map_err(|e| {
            tracing::error!("HTTP server error: {}", e);
            e
        })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
