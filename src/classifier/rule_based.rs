//! Two-stage rule-based direction classifier.

use std::sync::Arc;

use log::{debug, trace};

use crate::classifier::batch;
use crate::classifier::classifier::DirectionClassifier;
use crate::classifier::config::RuleClassifierConfig;
use crate::classifier::exemplar::ExemplarSet;
use crate::direction::{Direction, DirectionLabel};
use crate::embedding::EmbeddingStore;
use crate::error::{RemarkaError, Result};
use crate::vector::{VectorError, aggregate, cosine, norm};

/// States of the per-direction decision procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Verbs extracted, nothing decided yet.
    Start,
    /// The first verb is an exemplar.
    ExactMatchFound(DirectionLabel),
    /// No exemplar matched; compare against the anchors.
    SimilarityFallback,
    /// A label was chosen. A tie resolves to `Unresolved`.
    Resolved(DirectionLabel),
    /// No decision is possible.
    Unresolved,
}

/// What a decision was based on.
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    /// The direction has no verbs.
    NoVerbs,
    /// The first verb belongs to an exemplar set.
    Exemplar { token: String },
    /// Cosine similarities of the averaged verbs to each anchor.
    Similarity { entrance: f32, exit: f32 },
    /// The fallback could not compute a vector.
    Degenerate(VectorError),
}

/// A label together with the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub label: DirectionLabel,
    pub evidence: Evidence,
}

/// Classifies directions as entrances or exits.
///
/// The embedding store is shared; the exemplar sets and anchor vectors are
/// derived once at construction and never change.
pub struct RuleBasedClassifier {
    store: Arc<dyn EmbeddingStore>,
    config: RuleClassifierConfig,
    exemplars: ExemplarSet,
    entrance_vector: Vec<f32>,
    exit_vector: Vec<f32>,
}

impl std::fmt::Debug for RuleBasedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleBasedClassifier")
            .field("config", &self.config)
            .field("entrance_exemplars", &self.exemplars.entrance().len())
            .field("exit_exemplars", &self.exemplars.exit().len())
            .field("vocabulary_size", &self.store.len())
            .finish()
    }
}

impl RuleBasedClassifier {
    /// Create a classifier, deriving the exemplar sets from the store.
    ///
    /// Fails if an anchor is missing from the store or has a zero vector,
    /// or if `config.neighbors` is zero.
    pub fn new(store: Arc<dyn EmbeddingStore>, config: RuleClassifierConfig) -> Result<Self> {
        if config.neighbors == 0 {
            return Err(RemarkaError::classifier("neighbors must be at least 1"));
        }
        let entrance_vector = Self::validate_anchor(store.as_ref(), &config.entrance_anchor)?;
        let exit_vector = Self::validate_anchor(store.as_ref(), &config.exit_anchor)?;

        let exemplars = ExemplarSet::derive(
            store.as_ref(),
            &config.entrance_anchor,
            &config.exit_anchor,
            config.neighbors,
        )?;

        Ok(Self {
            store,
            config,
            exemplars,
            entrance_vector,
            exit_vector,
        })
    }

    /// Create a classifier with caller-supplied exemplar sets.
    pub fn with_exemplars(
        store: Arc<dyn EmbeddingStore>,
        config: RuleClassifierConfig,
        exemplars: ExemplarSet,
    ) -> Result<Self> {
        let entrance_vector = Self::validate_anchor(store.as_ref(), &config.entrance_anchor)?;
        let exit_vector = Self::validate_anchor(store.as_ref(), &config.exit_anchor)?;

        Ok(Self {
            store,
            config,
            exemplars,
            entrance_vector,
            exit_vector,
        })
    }

    fn validate_anchor(store: &dyn EmbeddingStore, anchor: &str) -> Result<Vec<f32>> {
        let vector = store.lookup(anchor).ok_or_else(|| {
            RemarkaError::classifier(format!("anchor '{anchor}' is not in the embedding store"))
        })?;
        if norm(vector) == 0.0 {
            return Err(RemarkaError::classifier(format!(
                "anchor '{anchor}' has a zero vector"
            )));
        }
        Ok(vector.to_vec())
    }

    pub fn config(&self) -> &RuleClassifierConfig {
        &self.config
    }

    pub fn exemplars(&self) -> &ExemplarSet {
        &self.exemplars
    }

    pub fn store(&self) -> &Arc<dyn EmbeddingStore> {
        &self.store
    }

    /// Look up the first verb in the exemplar sets.
    ///
    /// Only `verbs[0]` is inspected: a direction whose first verb is not an
    /// exemplar goes to the similarity fallback even if a later verb is one.
    pub fn exact_match<T: AsRef<str>>(&self, verbs: &[T]) -> Option<DirectionLabel> {
        let first = verbs.first()?.as_ref();
        if self.exemplars.is_entrance(first) {
            Some(DirectionLabel::Entrance)
        } else if self.exemplars.is_exit(first) {
            Some(DirectionLabel::Exit)
        } else {
            None
        }
    }

    /// Cosine similarity of the averaged verbs to the entrance and exit anchors.
    pub fn anchor_similarities<T: AsRef<str>>(
        &self,
        verbs: &[T],
    ) -> std::result::Result<(f32, f32), VectorError> {
        let direction_vector = aggregate(self.store.as_ref(), verbs)?;
        let entrance = cosine(&direction_vector, &self.entrance_vector)?;
        let exit = cosine(&direction_vector, &self.exit_vector)?;
        Ok((entrance, exit))
    }

    /// Decide between the anchors by similarity. Equal similarities are a tie.
    pub fn similarity_fallback<T: AsRef<str>>(
        &self,
        verbs: &[T],
    ) -> std::result::Result<DirectionLabel, VectorError> {
        let (entrance, exit) = self.anchor_similarities(verbs)?;
        Ok(Self::compare(entrance, exit))
    }

    fn compare(entrance: f32, exit: f32) -> DirectionLabel {
        if entrance > exit {
            DirectionLabel::Entrance
        } else if exit > entrance {
            DirectionLabel::Exit
        } else {
            DirectionLabel::Unresolved
        }
    }

    /// Run the decision procedure and report how the label was reached.
    pub fn decide(&self, direction: &Direction) -> Decision {
        let verbs = direction.verbs_with_marker(&self.config.verb_marker);
        let mut evidence = Evidence::NoVerbs;
        let mut stage = Stage::Start;

        loop {
            trace!("{stage:?}");
            stage = match stage {
                Stage::Start if verbs.is_empty() => Stage::Unresolved,
                Stage::Start => match self.exact_match(&verbs) {
                    Some(label) => {
                        evidence = Evidence::Exemplar {
                            token: verbs[0].to_string(),
                        };
                        Stage::ExactMatchFound(label)
                    }
                    None => Stage::SimilarityFallback,
                },
                Stage::ExactMatchFound(label) => Stage::Resolved(label),
                Stage::SimilarityFallback => match self.anchor_similarities(&verbs) {
                    Ok((entrance, exit)) => {
                        evidence = Evidence::Similarity { entrance, exit };
                        Stage::Resolved(Self::compare(entrance, exit))
                    }
                    Err(e) => {
                        debug!("similarity fallback failed for {verbs:?}: {e}");
                        evidence = Evidence::Degenerate(e);
                        Stage::Unresolved
                    }
                },
                Stage::Resolved(label) => return Decision { label, evidence },
                Stage::Unresolved => {
                    return Decision {
                        label: DirectionLabel::Unresolved,
                        evidence,
                    };
                }
            };
        }
    }

    /// Label a single direction. Never fails.
    pub fn single_prediction(&self, direction: &Direction) -> DirectionLabel {
        let decision = self.decide(direction);
        debug!(
            "{:?} -> {} ({:?})",
            direction.tokens(),
            decision.label,
            decision.evidence
        );
        decision.label
    }

    /// 1 for every direction whose label equals `goal`, 0 otherwise.
    pub fn predict_batch(&self, directions: &[Direction], goal: DirectionLabel) -> Vec<u8> {
        batch::predict_batch(self, directions, goal)
    }
}

impl DirectionClassifier for RuleBasedClassifier {
    fn predict(&self, direction: &Direction) -> DirectionLabel {
        self.single_prediction(direction)
    }

    fn name(&self) -> &str {
        "rule_based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use ahash::AHashMap;

    use crate::embedding::{KeyedVectors, Neighbor};

    fn store() -> Arc<dyn EmbeddingStore> {
        Arc::new(
            KeyedVectors::from_pairs(
                2,
                vec![
                    ("входить_VERB", vec![1.0, 0.0]),
                    ("уходить_VERB", vec![0.0, 1.0]),
                    ("появляться_VERB", vec![0.9, 0.2]),
                    ("удаляться_VERB", vec![0.2, 0.9]),
                    ("сидеть_VERB", vec![1.0, 0.1]),
                    ("стоять_VERB", vec![0.1, 1.0]),
                    ("молчать_VERB", vec![1.0, 1.0]),
                    ("замирать_VERB", vec![0.0, 0.0]),
                ],
            )
            .unwrap(),
        )
    }

    fn classifier() -> RuleBasedClassifier {
        let exemplars = ExemplarSet::from_tokens(
            ["появляться_VERB", "вбегать_VERB"],
            ["удаляться_VERB", "выбегать_VERB"],
        );
        RuleBasedClassifier::with_exemplars(store(), RuleClassifierConfig::default(), exemplars)
            .unwrap()
    }

    /// Counts `lookup` calls per token.
    #[derive(Debug)]
    struct CountingStore {
        inner: KeyedVectors,
        lookups: Mutex<AHashMap<String, usize>>,
    }

    impl EmbeddingStore for CountingStore {
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn len(&self) -> usize {
            self.inner.len()
        }

        fn lookup(&self, token: &str) -> Option<&[f32]> {
            *self.lookups.lock().unwrap().entry(token.to_string()).or_default() += 1;
            self.inner.lookup(token)
        }

        fn nearest_neighbors(&self, token: &str, k: usize) -> Result<Vec<Neighbor>> {
            self.inner.nearest_neighbors(token, k)
        }
    }

    fn direction(tokens: &[&str]) -> Direction {
        tokens.iter().copied().collect()
    }

    #[test]
    fn test_anchors_are_looked_up_once_on_construction() {
        let counting = Arc::new(CountingStore {
            inner: KeyedVectors::from_pairs(
                2,
                vec![
                    ("входить_VERB", vec![1.0, 0.0]),
                    ("уходить_VERB", vec![0.0, 1.0]),
                    ("появляться_VERB", vec![0.9, 0.2]),
                ],
            )
            .unwrap(),
            lookups: Mutex::new(AHashMap::new()),
        });
        let store: Arc<dyn EmbeddingStore> = counting.clone();

        RuleBasedClassifier::new(store, RuleClassifierConfig::default().with_neighbors(1)).unwrap();
        let lookups = counting.lookups.lock().unwrap();
        assert_eq!(lookups.get("входить_VERB"), Some(&1));
        assert_eq!(lookups.get("уходить_VERB"), Some(&1));
    }

    #[test]
    fn test_no_verbs_is_unresolved() {
        let classifier = classifier();
        for tokens in [&[][..], &["дверь_S", "открытый_A"][..]] {
            let decision = classifier.decide(&direction(tokens));
            assert_eq!(decision.label, DirectionLabel::Unresolved);
            assert_eq!(decision.evidence, Evidence::NoVerbs);
        }
    }

    #[test]
    fn test_first_verb_entrance_exemplar_wins() {
        let classifier = classifier();
        let label = classifier
            .single_prediction(&direction(&["появляться_VERB", "уходить_VERB", "стоять_VERB"]));
        assert_eq!(label, DirectionLabel::Entrance);
    }

    #[test]
    fn test_first_verb_exit_exemplar_wins() {
        let classifier = classifier();
        let decision = classifier.decide(&direction(&["тихо_ADV", "удаляться_VERB", "входить_VERB"]));
        assert_eq!(decision.label, DirectionLabel::Exit);
        assert_eq!(
            decision.evidence,
            Evidence::Exemplar {
                token: "удаляться_VERB".to_string()
            }
        );
    }

    #[test]
    fn test_exemplar_without_embedding_still_matches() {
        let classifier = classifier();
        assert_eq!(
            classifier.single_prediction(&direction(&["выбегать_VERB"])),
            DirectionLabel::Exit
        );
    }

    #[test]
    fn test_only_first_verb_is_checked() {
        let classifier = classifier();
        // "выбегать" is an exit exemplar but comes second and has no
        // embedding, so the fallback decides on "сидеть" alone.
        let decision = classifier.decide(&direction(&["сидеть_VERB", "выбегать_VERB"]));
        assert_eq!(decision.label, DirectionLabel::Entrance);
        assert!(matches!(decision.evidence, Evidence::Similarity { .. }));
    }

    #[test]
    fn test_fallback_averages_all_verbs() {
        let classifier = classifier();
        // mean of (1.0, 0.1) and (0.1, 1.0) and (0.1, 1.0) leans towards exit
        let label = classifier
            .single_prediction(&direction(&["сидеть_VERB", "стоять_VERB", "стоять_VERB"]));
        assert_eq!(label, DirectionLabel::Exit);
    }

    #[test]
    fn test_tie_is_unresolved() {
        let classifier = classifier();
        let decision = classifier.decide(&direction(&["молчать_VERB"]));
        assert_eq!(decision.label, DirectionLabel::Unresolved);
        match decision.evidence {
            Evidence::Similarity { entrance, exit } => assert_eq!(entrance, exit),
            other => panic!("unexpected evidence {other:?}"),
        }
    }

    #[test]
    fn test_out_of_vocabulary_verbs_are_unresolved() {
        let classifier = classifier();
        let decision = classifier.decide(&direction(&["шептать_VERB", "кричать_VERB"]));
        assert_eq!(decision.label, DirectionLabel::Unresolved);
        assert_eq!(decision.evidence, Evidence::Degenerate(VectorError::EmptyAggregation));
    }

    #[test]
    fn test_zero_vector_verb_is_unresolved() {
        let classifier = classifier();
        let decision = classifier.decide(&direction(&["замирать_VERB"]));
        assert_eq!(decision.label, DirectionLabel::Unresolved);
        assert_eq!(decision.evidence, Evidence::Degenerate(VectorError::ZeroNormVector));
    }

    #[test]
    fn test_construction_fails_without_anchor() {
        let config = RuleClassifierConfig::default().with_anchors("войти_VERB", "уходить_VERB");
        let err = RuleBasedClassifier::new(store(), config).unwrap_err();
        assert!(err.to_string().contains("войти_VERB"));
    }

    #[test]
    fn test_construction_fails_with_zero_neighbors() {
        let config = RuleClassifierConfig::default().with_neighbors(0);
        assert!(RuleBasedClassifier::new(store(), config).is_err());
    }

    #[test]
    fn test_construction_fails_with_zero_anchor() {
        let config = RuleClassifierConfig::default().with_anchors("замирать_VERB", "уходить_VERB");
        assert!(RuleBasedClassifier::new(store(), config).is_err());
    }

    #[test]
    fn test_new_derives_exemplars_from_store() {
        let config = RuleClassifierConfig::default().with_neighbors(2);
        let classifier = RuleBasedClassifier::new(store(), config).unwrap();
        assert!(classifier.exemplars().is_entrance("сидеть_VERB"));
        assert!(classifier.exemplars().is_entrance("появляться_VERB"));
        assert!(classifier.exemplars().is_exit("стоять_VERB"));
        assert_eq!(classifier.exemplars().exit().len(), 2);
    }

    #[test]
    fn test_custom_verb_marker() {
        let mut config = RuleClassifierConfig::default();
        config.verb_marker = "_V".to_string();
        let exemplars = ExemplarSet::from_tokens(["вбегать_V"], ["выбегать_V"]);
        let classifier = RuleBasedClassifier::with_exemplars(store(), config, exemplars).unwrap();
        assert_eq!(
            classifier.single_prediction(&direction(&["выбегать_V"])),
            DirectionLabel::Exit
        );
        assert_eq!(
            classifier.single_prediction(&direction(&["уходить_VERB"])),
            DirectionLabel::Unresolved
        );
    }
}
