pub mod equipment;
pub mod laboratory;
pub mod reservation;
pub mod user;

use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope, the counterpart of [`crate::error::ErrorBody`]
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            msg: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            code: 201,
            msg: "created".to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            code: 200,
            msg: msg.into(),
            data: None,
        }
    }
}
