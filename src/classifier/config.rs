//! Configuration of the rule-based classifier.

use serde::{Deserialize, Serialize};

use crate::direction::VERB_MARKER;
use crate::embedding::DEFAULT_NEIGHBORS;

/// Settings for [`RuleBasedClassifier`](super::RuleBasedClassifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleClassifierConfig {
    /// Canonical "to enter" verb.
    pub entrance_anchor: String,
    /// Canonical "to leave" verb.
    pub exit_anchor: String,
    /// Neighbours of each anchor taken into its exemplar set.
    pub neighbors: usize,
    /// Token suffix identifying verbs.
    pub verb_marker: String,
}

impl Default for RuleClassifierConfig {
    fn default() -> Self {
        Self {
            entrance_anchor: "входить_VERB".to_string(),
            exit_anchor: "уходить_VERB".to_string(),
            neighbors: DEFAULT_NEIGHBORS,
            verb_marker: VERB_MARKER.to_string(),
        }
    }
}

impl RuleClassifierConfig {
    /// Use different anchor verbs.
    pub fn with_anchors<S: Into<String>>(mut self, entrance: S, exit: S) -> Self {
        self.entrance_anchor = entrance.into();
        self.exit_anchor = exit.into();
        self
    }

    /// Set the number of neighbours per exemplar set.
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuleClassifierConfig::default();
        assert_eq!(config.entrance_anchor, "входить_VERB");
        assert_eq!(config.exit_anchor, "уходить_VERB");
        assert_eq!(config.neighbors, 10);
        assert_eq!(config.verb_marker, "_VERB");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RuleClassifierConfig =
            serde_json::from_str(r#"{"entrance_anchor": "войти_VERB", "neighbors": 5}"#).unwrap();
        assert_eq!(config.entrance_anchor, "войти_VERB");
        assert_eq!(config.exit_anchor, "уходить_VERB");
        assert_eq!(config.neighbors, 5);
    }
}
