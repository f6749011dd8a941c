//! Crate-level error definitions.

use thiserror::Error;

/// Errors surfaced by the registry to its callers.
///
/// These are the only failures that escape the logging path; everything else
/// is swallowed and diagnosed internally.
#[derive(Debug, Error)]
pub enum Error {
    /// No logger is registered under the requested id.
    #[error("logger {id:?} not found in registry")]
    LoggerNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A durable change was requested but no store is attached.
    #[error("registry has no store attached")]
    NoStoreAttached,

    /// The attached store failed the requested operation.
    #[error("store operation failed: {0}")]
    Store(#[from] crate::store::StoreError),
}

impl Error {
    /// HTTP-style status code for this error, for HTTP-facing callers.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::LoggerNotFound { .. } => 404,
            Error::NoStoreAttached => 409,
            Error::Store(_) => 502,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_carries_id() {
        let err = Error::LoggerNotFound {
            id: "api.worker".into(),
        };
        assert!(err.to_string().contains("api.worker"));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_no_store_attached() {
        let err = Error::NoStoreAttached;
        assert_eq!(err.to_string(), "registry has no store attached");
        assert_ne!(err.status_code(), 404);
    }
}
