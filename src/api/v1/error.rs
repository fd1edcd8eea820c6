use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{reject, Rejection};

/// Client-visible error codes. Deliberately coarse: the client never learns
/// whether a login failed on the email or the password, nor why a refresh
/// token was refused. The specific cause is logged before the collapse.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    #[error("Please check your email and password and try again.")]
    InvalidCredentials,
    #[error("Email already exists. Please sign in.")]
    DuplicateAccount,
    #[error("Not authenticated.")]
    NotAuthenticated,
    #[error("Failed to refresh access token.")]
    InvalidRefreshToken,
    #[error("Authorization token is missing or invalid.")]
    AuthenticationError,
    #[error("Invalid or expired token.")]
    AuthorizationError,
    #[error("Malformed request.")]
    ValidationError,
    #[error("Resource not found.")]
    NotFound,
    #[error("Upstream model request failed.")]
    UpstreamError,
    #[error("Internal error.")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiErrorCode::DuplicateAccount => StatusCode::CONFLICT,
            ApiErrorCode::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiErrorCode::InvalidRefreshToken => StatusCode::FORBIDDEN,
            ApiErrorCode::AuthenticationError => StatusCode::UNAUTHORIZED,
            ApiErrorCode::AuthorizationError => StatusCode::FORBIDDEN,
            ApiErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    /// Correlates the client-visible failure with the server-side log line.
    pub request_id: uuid::Uuid,
}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::DuplicateAccount => ApiErrorCode::DuplicateAccount,
            AuthError::NotAuthenticated => ApiErrorCode::NotAuthenticated,
            AuthError::InvalidRefreshToken => ApiErrorCode::InvalidRefreshToken,
            // The gate path: revoked, expired and tampered tokens all read
            // the same from outside.
            AuthError::TokenRevoked | AuthError::TokenExpired | AuthError::TokenInvalid => {
                ApiErrorCode::AuthorizationError
            }
            AuthError::Validation(_) => ApiErrorCode::ValidationError,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<AssistantError> for ApiErrorCode {
    fn from(error: AssistantError) -> Self {
        match error {
            AssistantError::Upstream(e) => {
                warn!("Upstream completion error: {}", e);
                ApiErrorCode::UpstreamError
            }
            AssistantError::MalformedResponse(e) => {
                warn!("Malformed completion response: {}", e);
                ApiErrorCode::UpstreamError
            }
            AssistantError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.find::<warp::reject::MissingHeader>().is_some() {
        ApiErrorCode::AuthenticationError
    } else if err.find::<warp::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::InvalidQuery>().is_some()
    {
        ApiErrorCode::ValidationError
    } else if err.is_not_found() || err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::NotFound
    } else {
        warn!("Unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let request_id = uuid::Uuid::new_v4();
    warn!(%request_id, code = ?code, "request rejected");

    let json = warp::reply::json(&ApiResponse::<()>::err(ApiError {
        message: code.to_string(),
        code: code.clone(),
        request_id,
    }));
    Ok(warp::reply::with_status(json, code.status()))
}
