use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// A single rejected submission field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn field_names(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The submission is missing required fields or carries malformed ones.
    #[error("invalid submission: {}", field_names(.0))]
    Validation(Vec<FieldError>),

    #[error("verification request {0} not found")]
    NotFound(i32),

    /// Storage backend failure; the detail is logged, never returned to clients.
    #[error("database error: {0}")]
    Database(String),
}

impl From<DbErr> for RegistrarError {
    fn from(e: DbErr) -> Self {
        Self::Database(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail transport is misconfigured: {0}")]
    Misconfigured(String),

    #[error("mail transport failed: {0}")]
    Transport(String),

    #[error("mail provider rejected the message (status={status}): {body}")]
    Rejected { status: u16, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_fields() {
        let err = RegistrarError::Validation(vec![
            FieldError::new("first_name", "This field is required."),
            FieldError::new("email", "Enter a valid email address."),
        ]);
        assert_eq!(err.to_string(), "invalid submission: first_name, email");
    }

    #[test]
    fn rejected_error_carries_status() {
        let err = NotifyError::Rejected {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert!(err.to_string().contains("status=401"));
    }
}
