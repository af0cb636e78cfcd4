//! Error types for todo operations.

use thiserror::Error;
use todo_store::{ItemId, StoreError};

/// Result type for todo operations.
pub type TodoResult<T> = Result<T, TodoError>;

/// Errors surfaced by [`crate::TodoService`].
#[derive(Error, Debug)]
pub enum TodoError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// The referenced item does not exist.
    #[error("todo item does not exist")]
    NotFound(Option<ItemId>),

    /// The store failed underneath the operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl TodoError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns true if the caller sent something wrong.
    ///
    /// The HTTP layer answers these with a 4xx status and the error text.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TodoError::Validation(_) | TodoError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(TodoError::validation("bad").is_client_error());
        assert!(TodoError::NotFound(None).is_client_error());
        assert!(!TodoError::Store(StoreError::codec("x")).is_client_error());
    }

    #[test]
    fn not_found_message_is_fixed() {
        let with_id = TodoError::NotFound(Some(ItemId::new()));
        assert_eq!(with_id.to_string(), TodoError::NotFound(None).to_string());
    }
}
