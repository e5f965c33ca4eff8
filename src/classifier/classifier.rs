//! Direction classifier trait definition.

use crate::direction::{Direction, DirectionLabel};

/// Direction classifier trait.
///
/// Implementations always produce a label; inputs they cannot decide on map
/// to [`DirectionLabel::Unresolved`].
pub trait DirectionClassifier: Send + Sync {
    /// Predict the label of a single direction.
    fn predict(&self, direction: &Direction) -> DirectionLabel;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}
