//! Error types for the triage pipeline and its HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Shown to the user when a request fails after validation. The detail goes to the log.
pub const GENERIC_FAILURE: &str = "Não foi possível processar o e-mail. Tente novamente.";

/// Input problems the user can fix. These are rendered as a normal response,
/// never surfaced as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriageError {
    #[error("Por favor, faça somente o upload do email ou a descrição do e-mail")]
    ConflictingInput,

    #[error("Por favor, digite, pelo menos, o corpo do email")]
    MissingBody,
}

impl TriageError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConflictingInput => "conflicting_input",
            Self::MissingBody => "missing_body",
        }
    }
}

/// Failures while turning an uploaded file into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{filename} is not valid UTF-8 text")]
    InvalidUtf8 {
        filename: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to extract PDF text from {filename}: {message}")]
    Pdf { filename: String, message: String },
}

/// Failures that abort a single request.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Classification error: {0}")]
    Classify(#[source] anyhow::Error),
}

#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn custom(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<PipelineError> for ApiError {
    fn from(_err: PipelineError) -> Self {
        Self::internal(GENERIC_FAILURE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16(),
        });
        (self.status_code, Json(body)).into_response()
    }
}
