use axum::http::StatusCode;
use thiserror::Error;

use crate::error::HttpError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Property {0} not found")]
    PropertyNotFound(i64),

    #[error("Notification {0} not found")]
    NotificationNotFound(i64),

    #[error("Rental application {0} not found")]
    ApplicationNotFound(i64),

    #[error("Invoice {0} not found")]
    InvoiceNotFound(i64),

    #[error("Contract {0} not found")]
    ContractNotFound(i64),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("You have already applied to this property")]
    DuplicateApplication,

    #[error("User {0} does not own property {1}")]
    NotPropertyOwner(i64, i64),

    #[error("User {0} is not the receiver of notification {1}")]
    NotNotificationReceiver(i64, i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::PropertyNotFound(_)
            | ServiceError::NotificationNotFound(_)
            | ServiceError::ApplicationNotFound(_)
            | ServiceError::InvoiceNotFound(_)
            | ServiceError::ContractNotFound(_)
            | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::DuplicateApplication => StatusCode::CONFLICT,

            ServiceError::NotPropertyOwner(_, _)
            | ServiceError::NotNotificationReceiver(_, _) => StatusCode::FORBIDDEN,

            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Transport(_)
            | ServiceError::Storage(_)
            | ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        match error {
            // Driver details stay in the logs
            ServiceError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                HttpError::server_error("A database error occurred")
            }
            ServiceError::Storage(ref e) => {
                tracing::error!("Storage error: {}", e);
                HttpError::server_error("Failed to store the uploaded files")
            }
            _ => HttpError::new(error.to_string(), status),
        }
    }
}

impl From<sqlx::Error> for HttpError {
    fn from(error: sqlx::Error) -> Self {
        HttpError::from(ServiceError::Database(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let cases = [
            (ServiceError::PropertyNotFound(3), StatusCode::NOT_FOUND),
            (ServiceError::DuplicateApplication, StatusCode::CONFLICT),
            (ServiceError::NotPropertyOwner(1, 3), StatusCode::FORBIDDEN),
            (ServiceError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(HttpError::from(error).status, status);
        }
    }

    #[test]
    fn duplicate_application_keeps_user_message() {
        let err = HttpError::from(ServiceError::DuplicateApplication);
        assert_eq!(err.message, "You have already applied to this property");
    }

    #[test]
    fn database_details_are_hidden() {
        let err = HttpError::from(ServiceError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.message, "A database error occurred");
    }

    #[test]
    fn raw_driver_errors_are_hidden() {
        let err = HttpError::from(sqlx::Error::Protocol("relation \"users\" does not exist".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "A database error occurred");
    }
}
