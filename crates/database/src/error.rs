use sea_orm::DbErr;
use serde_json::Value;
use thiserror::Error;

/// Business-rule and storage failures raised by the services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// A business rule was violated. `payload` names the offending field or
    /// carries the blocking count.
    #[error("{message}")]
    Validation { message: String, payload: Value },

    /// The caller is authenticated but may not act on this entity
    #[error("{0}")]
    Forbidden(String),

    /// Unexpected storage failure. The transaction has been rolled back.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>, payload: Value) -> Self {
        Self::Validation {
            message: message.into(),
            payload,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// The machine-readable payload of a validation failure
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Validation { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod test {
    use crate::error::ServiceError;
    use sea_orm::DbErr;
    use serde_json::json;

    #[test]
    fn test_validation_carries_payload() {
        let err = ServiceError::validation("laboratory name already exists", json!({"field": "name"}));
        assert_eq!(err.to_string(), "laboratory name already exists");
        assert_eq!(err.payload(), Some(&json!({"field": "name"})));
    }

    #[test]
    fn test_db_err_converts() {
        let err: ServiceError = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, ServiceError::Database(_)));
        assert!(err.payload().is_none());
    }
}
