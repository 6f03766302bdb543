use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use service::auth::AuthError;
use tracing::error;
use utoipa::ToSchema;

/// Transport-level status, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    Internal,
}

impl Status {
    pub fn http(self) -> StatusCode {
        match self {
            Status::InvalidArgument => StatusCode::BAD_REQUEST,
            Status::AlreadyExists => StatusCode::CONFLICT,
            Status::NotFound => StatusCode::NOT_FOUND,
            Status::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body returned by every auth endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub code: Status,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    pub status: Status,
    pub message: &'static str,
}

impl ApiError {
    pub fn invalid_argument(message: &'static str) -> Self {
        Self { status: Status::InvalidArgument, message }
    }

    /// Hide `cause` from the client; it only reaches the log.
    fn internal(cause: &AuthError, message: &'static str) -> Self {
        error!(code = cause.code(), error = %cause, "{message}");
        Self { status: Status::Internal, message }
    }

    pub fn login(e: &AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::invalid_argument("invalid credentials"),
            AuthError::InvalidInput(msg) => Self::invalid_argument(*msg),
            _ => Self::internal(e, "failed to login"),
        }
    }

    pub fn register(e: &AuthError) -> Self {
        match e {
            AuthError::UserAlreadyExists => Self { status: Status::AlreadyExists, message: "user already exists" },
            AuthError::InvalidInput(msg) => Self::invalid_argument(*msg),
            _ => Self::internal(e, "failed to register user"),
        }
    }

    pub fn is_admin(e: &AuthError) -> Self {
        match e {
            AuthError::UserNotFound => Self { status: Status::NotFound, message: "user not found" },
            AuthError::InvalidInput(msg) => Self::invalid_argument(*msg),
            _ => Self::internal(e, "failed to check admin status"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { code: self.status, error: self.message.to_string() };
        (self.status.http(), Json(body)).into_response()
    }
}
