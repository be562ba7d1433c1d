use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use pixedit::common::StorageConfig;
use pixedit::process::Dispatcher;
use pixedit::upload::Intake;

mod flash;
mod handlers;
mod templates;

pub use handlers::ProcessResponse;

/// URL under which processed images are served.
pub const PROCESSED_URL_PREFIX: &str = "/static/processed";

/// Room for multipart boundaries and the other form fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub struct AppState {
    pub intake: Intake,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            intake: Intake::new(config.clone()),
            dispatcher: Dispatcher::new(config),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        self.dispatcher.config()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let processed_dir = state.config().processed_dir.clone();
    let body_limit = state.config().max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(handlers::home))
        .route("/about", get(handlers::about))
        .route("/edit", get(handlers::home).post(handlers::edit))
        .route("/api/edit", post(handlers::api_edit))
        .route("/ping", get(|| async { "pong" }))
        .route("/health", get(|| async { "healthy" }))
        .nest_service(PROCESSED_URL_PREFIX, ServeDir::new(processed_dir))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
        .with_state(state)
}
