//! Dense vector arithmetic over word embeddings.
//!
//! - `similarity`: norms, L2 normalization and cosine similarity
//! - `aggregate`: averaging token embeddings into one direction vector
//!
//! Degenerate inputs are reported through [`VectorError`] instead of
//! producing NaN or infinite values.

pub mod aggregate;
pub mod similarity;

use thiserror::Error;

pub use self::aggregate::{aggregate, aggregate_or_zeros};
pub use self::similarity::{cosine, norm, normalized};

/// Failures of vector arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorError {
    /// None of the aggregated tokens had an embedding.
    #[error("no token was found in the embedding store")]
    EmptyAggregation,

    /// A vector with zero magnitude cannot be normalized.
    #[error("vector has zero norm")]
    ZeroNormVector,

    /// Two vectors of different dimensionality were combined.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
