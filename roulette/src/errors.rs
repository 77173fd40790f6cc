use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for roulette operations
pub type Result<T, E = RouletteError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum RouletteError {
    #[error("catalog returned no games")]
    NoGames,

    #[error("player metrics not found")]
    PlayerNotFound,

    #[error("version engine error: {0}")]
    Versions(#[from] versions::cache::VersionError),

    #[error("upstream fetch failed: {0}")]
    Fetch(#[from] versions::fetch::FetchError),

    #[error("version store error: {0}")]
    Store(#[from] versions::store::StoreError),

    #[error("play metrics error: {0}")]
    PlayMetrics(#[from] crate::play_metrics::PlayMetricsError),

    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("metrics exporter error: {0}")]
    MetricsInit(#[from] shared::metrics::MetricsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

impl IntoResponse for RouletteError {
    fn into_response(self) -> Response {
        let status = match self {
            RouletteError::NoGames | RouletteError::PlayerNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}
