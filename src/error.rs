//! Domain failures raised by the services and their HTTP mapping.

use anyhow::anyhow;
use thiserror::Error;

use matricula_core::{AppError, FieldError};
use matricula_db::StoreError;
use matricula_models::ApplicationStatus;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Roll number {0} is already assigned")]
    DuplicateRollNumber(String),

    #[error("{field} already exists")]
    Duplicate { field: &'static str },

    #[error("Application has already been approved")]
    AlreadyApproved { status: ApplicationStatus },

    #[error("Cannot {action} an application that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: ApplicationStatus,
    },

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The record exists but belongs to another account.
    #[error("Access denied")]
    AccessDenied,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure from a shared component that already carries its HTTP shape,
    /// such as the password hasher.
    #[error("Internal error")]
    Internal(AppError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        ServiceError::Internal(err)
    }
}

fn duplicate(field: &'static str, message: String) -> AppError {
    AppError::conflict(message.clone()).with_details(vec![FieldError::new(field, message)])
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(details) => AppError::validation(details),
            ServiceError::NotFound(entity) => AppError::not_found(anyhow!("{} not found", entity)),
            ServiceError::DuplicateRollNumber(roll_number) => duplicate(
                "rollNumber",
                format!("Roll number {} is already assigned", roll_number),
            ),
            ServiceError::Duplicate { field } => duplicate(field, format!("{} already exists", field)),
            ServiceError::AlreadyApproved { status } => {
                AppError::conflict("Application has already been approved")
                    .with_resource_status(status.as_str())
            }
            ServiceError::InvalidTransition { action, status } => AppError::conflict(format!(
                "Cannot {} an application that is {}",
                action, status
            ))
            .with_resource_status(status.as_str()),
            ServiceError::InvalidCredentials => AppError::unauthorized("Invalid credentials"),
            ServiceError::AccessDenied => AppError::forbidden("Access denied"),
            ServiceError::Store(StoreError::Duplicate { field }) => {
                duplicate(field, format!("{} already exists", field))
            }
            ServiceError::Store(StoreError::NotFound { entity }) => {
                AppError::not_found(anyhow!("{} not found", entity))
            }
            ServiceError::Store(other) => AppError::database(other),
            ServiceError::Internal(app) => app,
        }
    }
}
