//! Error types for the remarka library.
//!
//! All fallible operations return [`RemarkaError`] through the crate-wide
//! [`Result`] alias. Vector arithmetic and model fitting keep their own typed
//! errors ([`VectorError`], [`MLError`]) which convert into it.
//!
//! # Examples
//!
//! ```
//! use remarka::error::{RemarkaError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(RemarkaError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

use crate::ml::MLError;
use crate::vector::VectorError;

/// The main error type for remarka operations.
#[derive(Error, Debug)]
pub enum RemarkaError {
    /// I/O errors (file operations, memory maps, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Embedding store errors (loading, lookups of required tokens)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Dataset errors (malformed CSV rows, label files)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Supervised model errors
    #[error("Model error: {0}")]
    Model(String),

    /// Rule-based classifier construction errors
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Vector arithmetic errors
    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),

    /// Model fitting errors
    #[error("ML error: {0}")]
    ML(#[from] MLError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Zip archive errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with RemarkaError.
pub type Result<T> = std::result::Result<T, RemarkaError>;

impl RemarkaError {
    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        RemarkaError::Embedding(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        RemarkaError::Dataset(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        RemarkaError::Model(msg.into())
    }

    /// Create a new classifier error.
    pub fn classifier<S: Into<String>>(msg: S) -> Self {
        RemarkaError::Classifier(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        RemarkaError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        RemarkaError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        RemarkaError::Other(format!("Not found: {}", msg.into()))
    }
}
