//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable: an operation that returns one of these has
/// left the inventory exactly as it found it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An operation referenced an id that is not (or no longer) present.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A use/split amount outside the range the batch or item allows.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Merge across different locations or product names.
    #[error("incompatible batches: {0}")]
    IncompatibleBatches(String),

    /// A required field was empty or a numeric field was out of its domain.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// A location still referenced by inventory cannot be deleted.
    #[error("location {location} is still referenced by {references} entries")]
    LocationInUse { location: String, references: usize },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleBatches(msg.into())
    }

    pub fn invalid_field(msg: impl Into<String>) -> Self {
        Self::InvalidField(msg.into())
    }

    pub fn location_in_use(location: impl ToString, references: usize) -> Self {
        Self::LocationInUse {
            location: location.to_string(),
            references,
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Stable machine-readable kind, for presentation layers that map errors
    /// to their own messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "not_found",
            DomainError::InvalidQuantity(_) => "invalid_quantity",
            DomainError::IncompatibleBatches(_) => "incompatible_batches",
            DomainError::InvalidField(_) => "invalid_field",
            DomainError::LocationInUse { .. } => "location_in_use",
            DomainError::InvalidId(_) => "invalid_id",
        }
    }
}
