//! Batch prediction against a goal label.
//!
//! The evaluation code compares predictions with binary gold labels ("is
//! this direction an entrance?"), so a batch of directions is turned into a
//! 0/1 vector: 1 where the predicted label equals the goal label.

use rayon::prelude::*;

use crate::classifier::classifier::DirectionClassifier;
use crate::direction::{Direction, DirectionLabel};

/// Predicted labels for every direction, in input order.
pub fn predict_labels<C>(classifier: &C, directions: &[Direction]) -> Vec<DirectionLabel>
where
    C: DirectionClassifier + ?Sized,
{
    directions
        .iter()
        .map(|direction| classifier.predict(direction))
        .collect()
}

/// 1 where `label == goal`, 0 otherwise.
pub fn match_goal(labels: &[DirectionLabel], goal: DirectionLabel) -> Vec<u8> {
    labels.iter().map(|label| u8::from(*label == goal)).collect()
}

/// One 0/1 value per direction: whether its predicted label equals `goal`.
///
/// An unresolved prediction only matches an unresolved goal.
pub fn predict_batch<C>(classifier: &C, directions: &[Direction], goal: DirectionLabel) -> Vec<u8>
where
    C: DirectionClassifier + ?Sized,
{
    match_goal(&predict_labels(classifier, directions), goal)
}

/// [`predict_batch`] spread over the rayon thread pool. Output order matches
/// input order.
pub fn predict_batch_parallel<C>(
    classifier: &C,
    directions: &[Direction],
    goal: DirectionLabel,
) -> Vec<u8>
where
    C: DirectionClassifier + ?Sized,
{
    directions
        .par_iter()
        .map(|direction| u8::from(classifier.predict(direction) == goal))
        .collect()
}
