use crate::types::DbId;

/// Boxed error coming out of a store implementation.
pub type StoreSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Cannot delete record: {0}")]
    DeleteRestriction(String),

    #[error("Store error: {0}")]
    Store(#[source] StoreSource),
}

impl CoreError {
    /// A `notification` row that no longer exists.
    pub fn notification_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "notification",
            id: id.to_string(),
        }
    }

    /// Wrap a store-layer error without altering it.
    ///
    /// Intended for `map_err(CoreError::store)` at the store boundary.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store(Box::new(err))
    }
}

/// Convenience alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn display_not_found() {
        let err = CoreError::notification_not_found(42);
        assert_eq!(
            err.to_string(),
            "Entity not found: notification with id 42"
        );
    }

    #[test]
    fn display_delete_restriction() {
        let err = CoreError::DeleteRestriction("group has members".into());
        assert_eq!(err.to_string(), "Cannot delete record: group has members");
    }

    #[test]
    fn store_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        let err = CoreError::store(io);
        assert_eq!(err.to_string(), "Store error: read timed out");
        let source = err.source().expect("source should be preserved");
        assert_eq!(source.to_string(), "read timed out");
    }
}
