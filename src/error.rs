use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;
pub type TranslationResult<T> = Result<T, TranslationError>;

/// Failures reported by a translation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row for this `(kind, entity, language)` already exists.
    #[error("translation {kind}/{entity_id}/{language} already exists")]
    DuplicateKey {
        kind: String,
        entity_id: String,
        language: String,
    },

    /// The row the write expected to find does not exist.
    #[error("translation {kind}/{entity_id}/{language} does not exist")]
    Missing {
        kind: String,
        entity_id: String,
        language: String,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to (de)serialize translation fields: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error taxonomy surfaced to callers of the translation subsystem.
///
/// Absence of a translation on a read path is never an error; the resolver
/// models it as an empty view.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl TranslationError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for TranslationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Don't leak driver details to API clients
            Self::Store(err) => {
                tracing::error!(error = %err, "translation store failure");
                "translation store operation failed".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
