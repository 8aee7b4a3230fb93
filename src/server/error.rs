use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type AppResult<T> = Result<T, Error>;

/// client errors carry a short machine code plus a readable message, upstream
/// failures become gateway errors with the upstream status embedded, internal
/// detail is logged but never echoed back
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    // ssrf guard tripped - the target host is private/reserved
    #[error("{0}")]
    BlockedUrl(String),

    #[error("upstream returned status {0}")]
    BadGateway(u16),

    #[error("internal server error")]
    InternalServerError,

    #[error("internal server error")]
    InternalServerErrorWithContext(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl Error {
    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::BlockedUrl(_) => "blocked_url",
            Self::BadGateway(_) => "bad_gateway",
            Self::InternalServerError | Self::InternalServerErrorWithContext(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::BlockedUrl(_) => StatusCode::BAD_REQUEST,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::InternalServerError | Self::InternalServerErrorWithContext(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self {
            // context stays in the logs, the client gets the generic line
            Error::InternalServerErrorWithContext(ctx) => {
                error!("internal error: {}", ctx);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };

        (self.status(), Json(body)).into_response()
    }
}
