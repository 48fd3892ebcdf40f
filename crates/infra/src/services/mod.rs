//! Application services.
//!
//! Each service owns the repository handles and collaborators it needs,
//! passed in at construction. Services validate request structs, call the
//! store and classify store failures into [`ServiceError`].
//!
//! ## Classification
//!
//! Operations that wrap their store calls (creates, saves, bulk deletes) map:
//!
//! | StoreError | ServiceError |
//! |------------|--------------|
//! | `UniqueViolation { detail }` | `BadRequest(detail)` |
//! | anything else | `Internal("Error check logs")`, full error logged |
//!
//! Every other store failure propagates unclassified as `ServiceError::Store`.

use std::sync::Arc;

use thiserror::Error;

use medsupply_core::DomainError;
use medsupply_observability::Logger;

use crate::store::StoreError;

pub mod asset;
pub mod department;
pub mod lot;
pub mod supply;

pub use asset::AssetService;
pub use department::DepartmentService;
pub use lot::LotService;
pub use supply::SupplyService;

/// Message returned to callers for internal-class failures.
pub const INTERNAL_MESSAGE: &str = "Error check logs";

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Caller input was rejected (validation, uniqueness, unknown id on lookup).
    #[error("{0}")]
    BadRequest(String),

    /// Classified internal failure. The message is opaque; details are in the logs.
    #[error("{0}")]
    Internal(String),

    /// Unclassified store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        ServiceError::BadRequest(err.detail().to_string())
    }
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal() -> Self {
        Self::Internal(INTERNAL_MESSAGE.to_string())
    }
}

/// Log a store failure and classify it.
#[derive(Clone)]
pub(crate) struct ErrorClassifier {
    logger: Arc<dyn Logger>,
    source: &'static str,
}

impl ErrorClassifier {
    pub(crate) fn new(logger: Arc<dyn Logger>, source: &'static str) -> Self {
        Self { logger, source }
    }

    pub(crate) fn store(&self, err: StoreError) -> ServiceError {
        self.logger.error(&err.to_string(), self.source);
        match err {
            StoreError::UniqueViolation { detail } => ServiceError::BadRequest(detail),
            _ => ServiceError::internal(),
        }
    }

    /// Classify the store failure inside a service error; other kinds pass through.
    pub(crate) fn service(&self, err: ServiceError) -> ServiceError {
        match err {
            ServiceError::Store(store) => self.store(store),
            other => other,
        }
    }
}
