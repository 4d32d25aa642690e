//! Error types for the Mejiro library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`MejiroError`] enum. Variants map one-to-one onto the failure modes of
//! the write and search paths, so callers can match on the contract they
//! care about (duplicate submissions, per-item indexing failures, decode
//! mismatches) and let everything else bubble up.
//!
//! # Examples
//!
//! ```
//! use mejiro::error::{MejiroError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(MejiroError::internal("store unavailable"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Mejiro operations.
#[derive(Error, Debug)]
pub enum MejiroError {
    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors from the store client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stored attribute shape incompatible with the requested type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Malformed data returned by the store.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An id was resubmitted while a prior write for it was still pending.
    #[error("Duplicate pending write for id: {0}")]
    DuplicateKey(String),

    /// A per-item indexing failure reported by the store.
    #[error("Indexing failure for id: {id}. Error: {reason}")]
    Indexing {
        /// Id of the document that failed to index.
        id: String,
        /// Failure reason reported by the store.
        reason: String,
    },

    /// A flush cycle recorded no outcome for an id it drained.
    #[error("No bulk result recorded for id: {0}")]
    MissingResult(String),

    /// Unexpected failure from the remote service.
    #[error("Internal service error: {0}")]
    Internal(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with MejiroError.
pub type Result<T> = std::result::Result<T, MejiroError>;

impl MejiroError {
    /// Create a new decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        MejiroError::Decode(msg.into())
    }

    /// Create a new invalid data error.
    pub fn invalid_data<S: Into<String>>(msg: S) -> Self {
        MejiroError::InvalidData(msg.into())
    }

    /// Create a new duplicate key error.
    pub fn duplicate_key<S: Into<String>>(id: S) -> Self {
        MejiroError::DuplicateKey(id.into())
    }

    /// Create a new indexing error.
    pub fn indexing<I: Into<String>, R: Into<String>>(id: I, reason: R) -> Self {
        MejiroError::Indexing {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a new missing result error.
    pub fn missing_result<S: Into<String>>(id: S) -> Self {
        MejiroError::MissingResult(id.into())
    }

    /// Create a new internal service error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        MejiroError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = MejiroError::decode("Test decode error");
        assert_eq!(error.to_string(), "Decode error: Test decode error");

        let error = MejiroError::duplicate_key("abc");
        assert_eq!(error.to_string(), "Duplicate pending write for id: abc");

        let error = MejiroError::indexing("abc", "mapping conflict");
        assert_eq!(
            error.to_string(),
            "Indexing failure for id: abc. Error: mapping conflict"
        );

        let error = MejiroError::missing_result("abc");
        assert_eq!(error.to_string(), "No bulk result recorded for id: abc");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let mejiro_error = MejiroError::from(io_error);

        match mejiro_error {
            MejiroError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let mejiro_error = MejiroError::from(json_error);

        match mejiro_error {
            MejiroError::Json(_) => {} // Expected
            _ => panic!("Expected JSON error variant"),
        }
    }
}
