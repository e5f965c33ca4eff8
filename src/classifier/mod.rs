//! Rule-based classification of stage directions.
//!
//! A direction is labelled `entrance`, `exit` or left unresolved in two
//! stages:
//!
//! 1. **Exact match**: the first verb of the direction is looked up in two
//!    exemplar sets, the nearest neighbours of an entrance anchor verb and of
//!    an exit anchor verb in the embedding space.
//! 2. **Similarity fallback**: all verbs are averaged into one vector which
//!    is compared with both anchor embeddings; the closer anchor wins and a
//!    tie stays unresolved.
//!
//! # Architecture
//!
//! - `DirectionClassifier` trait: common interface for direction classifiers
//! - `RuleBasedClassifier`: the two-stage classifier
//! - `ExemplarSet`: neighbour sets used by the exact-match stage
//! - `batch`: label many directions and score them against a goal label
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use remarka::classifier::{RuleBasedClassifier, RuleClassifierConfig};
//! use remarka::direction::{Direction, DirectionLabel};
//! use remarka::embedding::KeyedVectors;
//!
//! let store = KeyedVectors::from_pairs(
//!     2,
//!     vec![
//!         ("входить_VERB", vec![1.0, 0.0]),
//!         ("войти_VERB", vec![0.9, 0.1]),
//!         ("уходить_VERB", vec![0.0, 1.0]),
//!         ("выйти_VERB", vec![0.1, 0.9]),
//!     ],
//! )?;
//!
//! let config = RuleClassifierConfig::default().with_neighbors(1);
//! let classifier = RuleBasedClassifier::new(Arc::new(store), config)?;
//! let direction = Direction::from(vec!["войти_VERB", "в_PR", "комната_S"]);
//! assert_eq!(classifier.single_prediction(&direction), DirectionLabel::Entrance);
//! # Ok::<(), remarka::error::RemarkaError>(())
//! ```

pub mod batch;
mod classifier;
mod config;
mod exemplar;
mod rule_based;

pub use batch::{match_goal, predict_batch, predict_batch_parallel, predict_labels};
pub use classifier::DirectionClassifier;
pub use config::RuleClassifierConfig;
pub use exemplar::ExemplarSet;
pub use rule_based::{Decision, Evidence, RuleBasedClassifier, Stage};
