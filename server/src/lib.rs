use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    classify::ServerErrorsFailureClass, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::Span;
use utoipa::OpenApi;

pub mod assets;
pub mod config;
pub mod domain;
pub mod error;
pub mod file_reply;
mod handlers;
pub mod intake;
pub mod media;
pub mod mock;
pub mod namer;

#[cfg(test)] // <-- not needed in integration tests
extern crate rstest;

use crate::assets::AssetStore;
use crate::config::ServerConfig;
use crate::domain::Analyst;
use crate::intake::UploadIntake;
use crate::mock::MockAnalyst;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Path prefix stored files are served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

extern crate tokio;

/// Shared, read-only request handling state built once at startup.
pub struct AppState {
    pub intake: UploadIntake,
    pub assets: AssetStore,
    pub analyst: Arc<dyn Analyst>,
}

impl AppState {
    #[must_use]
    pub fn new(config: &ServerConfig, analyst: Arc<dyn Analyst>) -> Self {
        Self {
            intake: UploadIntake::new(&config.upload_dir, UPLOADS_ROUTE, config.limits),
            assets: AssetStore::new(&config.upload_dir),
            analyst,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::inspect,
        handlers::verify,
        handlers::federated_sync,
        handlers::get_upload,
    ),
    components(schemas(
        kernel::InspectionResult,
        kernel::StoredFile,
        kernel::Provenance,
        kernel::SyncRequest,
        kernel::SyncAck,
        kernel::ErrorResponse,
    )),
    tags(
        (name = "inspection", description = "Photo upload and simulated produce inspection"),
        (name = "provenance", description = "Simulated blockchain provenance"),
        (name = "federated", description = "Simulated federated learning aggregator"),
        (name = "uploads", description = "Stored photos")
    )
)]
pub struct ApiDoc;

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "farmtrust=debug,server=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> io::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env();
    let listener = TcpListener::bind(config.socket()).await?;
    serve(listener, config, shutdown_signal()).await
}

/// Serves the API on an already bound listener until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, config: ServerConfig, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::debug!("listening on {}", listener.local_addr()?);
    tracing::info!(
        "storing uploads in {}, at most {} photos of {} bytes per request",
        config.upload_dir.display(),
        config.limits.max_files,
        config.limits.max_file_size
    );
    tracing::debug!(
        "database configured at {} (not queried)",
        config.redacted_database_uri()
    );

    let app = create_routes(&config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

pub fn create_routes(config: &ServerConfig) -> Router {
    let state = AppState::new(config, Arc::new(MockAnalyst::default()));
    create_routes_with(config, state)
}

/// Builds the router around an explicit state.
///
/// Requests pass the layers top to bottom: tracing, the body cap, timeout, then CORS.
pub fn create_routes_with(config: &ServerConfig, state: AppState) -> Router {
    Router::new()
        .route("/api/inspect", post(handlers::inspect))
        .route("/api/verify/:batch_id", get(handlers::verify))
        .route("/api/federated-sync", post(handlers::federated_sync))
        .route(
            &format!("{UPLOADS_ROUTE}/:file_name"),
            get(handlers::get_upload),
        )
        .route("/api-docs/openapi.json", get(openapi))
        .with_state(Arc::new(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        tracing::error!("Server error: {error}");
                    },
                ))
                .layer(RequestBodyLimitLayer::new(config.body_limit()))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.request_timeout,
                ))
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::disable())
                .into_inner(),
        )
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}
