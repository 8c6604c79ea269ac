use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Failure to turn an uploaded document into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("File is not valid UTF-8 text")]
    InvalidUtf8,

    #[error("No extractable text")]
    NoText,

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Text extraction timed out after {0}s")]
    TimedOut(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Question,
    Answer,
}

impl std::fmt::Display for CardField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardField::Question => write!(f, "Question"),
            CardField::Answer => write!(f, "Answer"),
        }
    }
}

/// Why a question/answer pair was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardRejection {
    #[error("{0} cannot be empty")]
    EmptyField(CardField),

    #[error("{field} is too short (minimum {min} characters)")]
    TooShort { field: CardField, min: usize },

    #[error("{field} is too long (maximum {max} characters)")]
    TooLong { field: CardField, max: usize },
}

/// Failure on the live generation path. Nothing here is retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid or expired API key")]
    Auth(String),

    #[error("API quota exceeded")]
    Quota(String),

    #[error("Invalid response format: {0}")]
    Format(String),

    #[error("Generation failed: {0}")]
    Transient(String),
}

impl GenerationError {
    /// Sorts a raw provider error message into the taxonomy.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("invalid_api_key")
            || lower.contains("401")
            || lower.contains("incorrect api key")
        {
            GenerationError::Auth(message)
        } else if lower.contains("insufficient_quota") || lower.contains("quota") {
            GenerationError::Quota(message)
        } else {
            GenerationError::Transient(message)
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            GenerationError::Auth(_) => "Check the configured API credentials.",
            GenerationError::Quota(_) => "Check the provider account billing and limits.",
            GenerationError::Format(_) => "The model returned malformed output; try again.",
            GenerationError::Transient(_) => "Switch to demo mode or try again later.",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::Persistence(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<CardRejection> for AppError {
    fn from(err: CardRejection) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, hint) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.to_string(),
                Some("Upload a text-based .txt or .pdf file."),
            ),
            AppError::Generation(e) => {
                let status = match e {
                    GenerationError::Auth(_) => StatusCode::UNAUTHORIZED,
                    GenerationError::Quota(_) => StatusCode::TOO_MANY_REQUESTS,
                    GenerationError::Format(_) | GenerationError::Transient(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                tracing::warn!("Generation error: {e:?}");
                (status, e.to_string(), Some(e.hint()))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = axum::Json(ErrorResponse {
            error: message,
            status: status.as_u16(),
            hint,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_provider_errors() {
        assert!(matches!(
            GenerationError::classify("HTTP 401: invalid_api_key"),
            GenerationError::Auth(_)
        ));
        assert!(matches!(
            GenerationError::classify("ProviderError: insufficient_quota"),
            GenerationError::Quota(_)
        ));
        assert!(matches!(
            GenerationError::classify("connection reset by peer"),
            GenerationError::Transient(_)
        ));
    }

    #[test]
    fn test_rejection_messages() {
        let err = CardRejection::TooShort {
            field: CardField::Answer,
            min: 10,
        };
        assert_eq!(err.to_string(), "Answer is too short (minimum 10 characters)");
        assert_eq!(
            CardRejection::EmptyField(CardField::Question).to_string(),
            "Question cannot be empty"
        );
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let resp = AppError::from(StoreError::NotFound("Flashcard set not found".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_generation_error_status() {
        let resp = AppError::from(GenerationError::Quota("insufficient_quota".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
