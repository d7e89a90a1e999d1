use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pinhole_core::ShortenerError;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The request itself is unusable.
    BadRequest(String),
    Shortener(ShortenerError),
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        AppError::Shortener(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // An unknown or foreign id is a client mistake on the redirect path.
            AppError::Shortener(ShortenerError::NotFound(_)) => StatusCode::BAD_REQUEST,
            AppError::Shortener(ShortenerError::Gone(_)) => StatusCode::GONE,
            AppError::Shortener(
                err @ (ShortenerError::Aborted(_) | ShortenerError::Storage(_)),
            ) => {
                error!(error = %err, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match self {
            AppError::BadRequest(reason) => reason,
            AppError::Shortener(_) if status.is_server_error() => {
                "internal server error".to_string()
            }
            AppError::Shortener(err) => err.to_string(),
        };

        (status, body).into_response()
    }
}
