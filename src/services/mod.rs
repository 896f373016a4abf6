pub mod contacts;
pub mod dashboard;
pub mod entreprises;
pub mod factures;
pub mod missions;
pub mod profiles;
pub mod slug;
mod validate;

use crate::auth::PasswordError;
use crate::database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ServiceError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ServiceError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
