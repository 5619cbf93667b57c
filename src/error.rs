use thiserror::Error;

/// Rejected add-dialog input. Never reaches the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in the fields")]
    BlankFields,
    #[error("Quantity must be a whole number, got {0:?}")]
    InvalidQuantity(String),
    #[error("Quantity must be at least 1, got {0}")]
    NonPositiveQuantity(i64),
    #[error("Quantity is too large: {0}")]
    QuantityTooLarge(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid product: {0}")]
    Validation(#[from] ValidationError),
    #[error("Product database error: {0}")]
    Database(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No row at position {position} (row count {row_count})")]
    NoSuchRow { position: usize, row_count: usize },
    #[error("Screen has not been entered yet")]
    NotEntered,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
