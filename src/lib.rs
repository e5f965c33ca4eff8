//! # Remarka
//!
//! Classification of drama stage directions into character entrances and
//! exits, driven by pre-trained word embeddings.
//!
//! ## Features
//!
//! - Rule-based classifier: exemplar verbs near the anchors "входить" and
//!   "уходить", with a cosine similarity fallback
//! - word2vec binary loading, plain or zip-archived
//! - Parallel batch prediction against a goal label
//! - Feature tables and supervised baselines (logistic regression, decision
//!   tree, random forest) with cross-validated grid search
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use remarka::classifier::{RuleBasedClassifier, RuleClassifierConfig};
//! use remarka::direction::{Direction, DirectionLabel};
//! use remarka::embedding::KeyedVectors;
//!
//! let store = KeyedVectors::from_pairs(
//!     2,
//!     vec![
//!         ("входить_VERB", vec![1.0, 0.0]),
//!         ("появляться_VERB", vec![0.9, 0.1]),
//!         ("уходить_VERB", vec![0.0, 1.0]),
//!         ("убегать_VERB", vec![0.1, 0.9]),
//!     ],
//! )?;
//! let config = RuleClassifierConfig::default().with_neighbors(1);
//! let classifier = RuleBasedClassifier::new(Arc::new(store), config)?;
//!
//! let direction = Direction::from(vec!["чацкий_S", "появляться_VERB"]);
//! assert_eq!(classifier.single_prediction(&direction), DirectionLabel::Entrance);
//! # Ok::<(), remarka::error::RemarkaError>(())
//! ```

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod direction;
pub mod embedding;
pub mod error;
pub mod features;
pub mod ml;
pub mod vector;

pub mod prelude {
    pub use crate::classifier::{DirectionClassifier, RuleBasedClassifier, RuleClassifierConfig};
    pub use crate::config::RemarkaConfig;
    pub use crate::direction::{Direction, DirectionLabel};
    pub use crate::embedding::{EmbeddingConfig, EmbeddingStore, KeyedVectors};
    pub use crate::error::{RemarkaError, Result};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
