//! Word embedding store.
//!
//! The rule-based classifier and the feature builder only need two things
//! from a pre-trained embedding table: the vector of a token (or a miss) and
//! the nearest neighbours of a token. [`EmbeddingStore`] captures that
//! contract; [`KeyedVectors`] is the in-memory implementation loaded from
//! word2vec binaries by the [`word2vec`] module.
//!
//! # Example
//!
//! ```
//! use remarka::embedding::{EmbeddingStore, KeyedVectors};
//!
//! let store = KeyedVectors::from_pairs(
//!     2,
//!     vec![("входить_VERB", vec![1.0, 0.0]), ("появляться_VERB", vec![0.9, 0.1])],
//! )?;
//!
//! assert!(store.lookup("уходить_VERB").is_none());
//! let neighbors = store.nearest_neighbors("входить_VERB", 10)?;
//! assert_eq!(neighbors[0].token, "появляться_VERB");
//! # Ok::<(), remarka::error::RemarkaError>(())
//! ```

pub mod keyed_vectors;
pub mod word2vec;

use std::fmt::Debug;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use self::keyed_vectors::KeyedVectors;

/// Dimensionality of the RusVectōrēs models the corpus is tagged for.
pub const DEFAULT_DIMENSION: usize = 300;

/// Number of neighbours returned by a similarity query when none is given.
pub const DEFAULT_NEIGHBORS: usize = 10;

/// Name of the model file inside a RusVectōrēs zip archive.
pub const DEFAULT_ARCHIVE_ENTRY: &str = "model.bin";

/// A token similar to a query token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The neighbouring token.
    pub token: String,
    /// Cosine similarity to the query token.
    pub similarity: f32,
}

/// Read-only mapping from token to dense vector.
pub trait EmbeddingStore: Send + Sync + Debug {
    /// Dimensionality of every vector in the store.
    fn dimension(&self) -> usize;

    /// Number of tokens in the store.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector of `token`, or `None` if it is out of vocabulary.
    fn lookup(&self, token: &str) -> Option<&[f32]>;

    fn contains(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    /// The `k` tokens most similar to `token`, best first, excluding `token`.
    ///
    /// Fails if `token` is not in the store.
    fn nearest_neighbors(&self, token: &str, k: usize) -> Result<Vec<Neighbor>>;
}

/// Where to load the embedding table from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Path to a word2vec binary, or to a zip archive containing one.
    pub path: PathBuf,
    /// Entry to read when `path` is a zip archive.
    pub archive_entry: String,
    /// Reject tables whose dimensionality differs.
    pub expected_dimension: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/models/180.zip"),
            archive_entry: DEFAULT_ARCHIVE_ENTRY.to_string(),
            expected_dimension: Some(DEFAULT_DIMENSION),
        }
    }
}

impl EmbeddingConfig {
    /// Configuration for the given model path with default settings.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Load the table this configuration points at.
    ///
    /// Paths with a `.zip` extension are opened as archives.
    pub fn load(&self) -> Result<KeyedVectors> {
        let is_zip = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

        let store = if is_zip {
            word2vec::load_word2vec_zip(&self.path, &self.archive_entry)?
        } else {
            word2vec::load_word2vec(&self.path)?
        };

        if let Some(expected) = self.expected_dimension
            && store.dimension() != expected
        {
            return Err(crate::error::RemarkaError::embedding(format!(
                "{} has dimension {}, expected {}",
                self.path.display(),
                store.dimension(),
                expected
            )));
        }

        Ok(store)
    }
}
