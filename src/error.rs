use juniper::{FieldError, IntoFieldError, Object, ScalarValue, Value};

use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("UNAUTHENTICATED")]
    Unauthenticated,
    #[error("FORBIDDEN")]
    Forbidden,
    #[error("INVALID_CREDENTIALS")]
    InvalidCredentials,
    #[error("EMAIL_ALREADY_EXISTS")]
    EmailAlreadyExists,
    #[error("NOT_FOUND")]
    NotFound,
    #[error("{0}")]
    BadUserInput(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPattern(msg) => {
                AppError::BadUserInput(format!("Invalid filter pattern: {msg}"))
            }
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    /// Stable machine-readable code, surfaced as `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AppError::NotFound => "NOT_FOUND",
            AppError::BadUserInput(_) => "BAD_USER_INPUT",
            AppError::Internal(_) | AppError::Store(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl<S: ScalarValue> IntoFieldError<S> for AppError {
    fn into_field_error(self) -> FieldError<S> {
        match &self {
            AppError::Internal(msg) => tracing::error!("Internal error: {msg}"),
            AppError::Store(err) => tracing::error!("Store error: {err}"),
            _ => {}
        }

        let mut extensions = Object::<S>::with_capacity(1);
        extensions.add_field("code", Value::scalar(self.code().to_string()));
        FieldError::new(self, Value::Object(extensions))
    }
}
