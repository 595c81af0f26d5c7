use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use guwen_core::CorpusError;
use serde_json::json;
use tracing::error;

use crate::dictionary::DictionaryError;

/// Code for upstream dictionary failures.
pub const UPSTREAM_CODE: &str = "E6001";
/// Code for a blocking task that panicked or was cancelled.
pub const TASK_CODE: &str = "E6002";

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Upstream(#[from] DictionaryError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Corpus(CorpusError::InvalidArgument { .. }) => StatusCode::BAD_REQUEST,
            Self::Corpus(
                CorpusError::NotFound(_)
                | CorpusError::OutOfRange { .. }
                | CorpusError::InvalidFormat(_),
            ) => StatusCode::NOT_FOUND,
            Self::Corpus(CorpusError::Io { .. }) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Corpus(e) => e.code().code(),
            Self::Upstream(_) => UPSTREAM_CODE,
            Self::Task(_) => TASK_CODE,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), code = self.code(), error = %self, "request failed");
        }
        let body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}
