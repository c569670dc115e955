use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::error::ServiceError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// Errors returned by handlers, rendered as `{code, msg, data}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: u16,
    pub msg: String,
    pub data: Option<Value>,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::Service(ServiceError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Validation { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Service(ServiceError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let status = self.status();
        let msg = match self {
            // Storage details stay in the log
            Self::Service(ServiceError::Database(_)) => "internal server error".to_string(),
            other => other.to_string(),
        };

        ErrorBody {
            code: status.as_u16(),
            msg,
            data: match self {
                Self::Service(err) => err.payload().cloned(),
                _ => None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Service(ServiceError::Database(e)) = &self {
            log::error!("database error: {e}");
        }

        (self.status(), Json(self.body())).into_response()
    }
}
