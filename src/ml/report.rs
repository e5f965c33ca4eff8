//! Comparison tables of fitted models.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::classifier::{DirectionClassifier, predict_batch_parallel};
use crate::direction::{Direction, DirectionLabel};
use crate::error::Result;
use crate::features::Dataset;
use crate::ml::metrics::{f1_score, precision, recall};
use crate::ml::selection::{ModelSpec, grid_search_cv};
use crate::ml::{MLError, ModelFittingConfig};

/// Scores of one model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReportRow {
    pub model: String,
    /// Hyper-parameters chosen by the grid search.
    pub params: ModelSpec,
    /// Mean cross-validated F1 on the training split.
    pub cross_val: f64,
    pub validation: f64,
    pub test: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub rows: Vec<ModelReportRow>,
    pub generated_at: DateTime<Utc>,
}

impl ModelReport {
    /// Row with the highest validation score, earliest first on ties.
    pub fn best_by_validation(&self) -> Option<&ModelReportRow> {
        self.rows.iter().reduce(|best, row| {
            if row.validation > best.validation {
                row
            } else {
                best
            }
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Grid-search every configured family on `train` and score the winners on
/// `valid` and `test`.
pub fn models_for_type(
    train: &Dataset,
    valid: &Dataset,
    test: &Dataset,
    config: &ModelFittingConfig,
) -> Result<ModelReport> {
    let grid = config.grid();
    let mut rows = Vec::with_capacity(config.families.len());

    for &family in &config.families {
        info!("Fitting {family} on {} samples", train.len());
        let search = grid_search_cv(&grid.candidates(family), &train.x, &train.y, config)?;

        let validation = f1_score(&valid.y, &search.model.predict(&valid.x)?);
        let test_score = f1_score(&test.y, &search.model.predict(&test.x)?);
        info!("{family}: validation F1 {validation:.4}, test F1 {test_score:.4}");

        rows.push(ModelReportRow {
            model: family.name().to_string(),
            params: search.best_spec,
            cross_val: search.best_score,
            validation,
            test: test_score,
        });
    }

    Ok(ModelReport {
        rows,
        generated_at: Utc::now(),
    })
}

/// Scores of the rule-based classifier against gold labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBasedScore {
    pub goal: DirectionLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Score the rule-based predictions for `goal` against 0/1 labels.
pub fn rule_based_report<C>(
    classifier: &C,
    directions: &[Direction],
    y: &[u8],
    goal: DirectionLabel,
) -> Result<RuleBasedScore>
where
    C: DirectionClassifier + ?Sized,
{
    if directions.len() != y.len() {
        return Err(MLError::invalid_features(format!(
            "{} directions but {} labels",
            directions.len(),
            y.len()
        ))
        .into());
    }

    let predicted = predict_batch_parallel(classifier, directions, goal);
    let score = RuleBasedScore {
        goal,
        precision: precision(y, &predicted),
        recall: recall(y, &predicted),
        f1: f1_score(y, &predicted),
    };
    info!("{} ({goal}): F1 {:.4}", classifier.name(), score.f1);
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureMatrix;
    use crate::ml::ModelFamily;

    fn dataset(n: usize, offset: f64) -> Dataset {
        let rows = (0..n)
            .map(|i| vec![if i % 2 == 1 { 3.0 } else { -3.0 } + offset, (i % 4) as f64])
            .collect();
        let labels = (0..n).map(|i| (i % 2) as u8).collect();
        Dataset::new(FeatureMatrix::from_rows(rows).unwrap(), labels).unwrap()
    }

    struct AlwaysEntrance;

    impl DirectionClassifier for AlwaysEntrance {
        fn predict(&self, _direction: &Direction) -> DirectionLabel {
            DirectionLabel::Entrance
        }

        fn name(&self) -> &str {
            "always_entrance"
        }
    }

    #[test]
    fn test_models_for_type() {
        let config = ModelFittingConfig {
            folds: 3,
            grid_size: Some(3),
            families: vec![ModelFamily::DecisionTree, ModelFamily::RandomForest],
            ..Default::default()
        };
        let report =
            models_for_type(&dataset(24, 0.0), &dataset(8, 0.1), &dataset(8, -0.1), &config)
                .unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].model, "Decision Tree");
        assert_eq!(report.rows[0].validation, 1.0);
        assert_eq!(report.rows[0].test, 1.0);
        assert_eq!(report.best_by_validation().unwrap().model, "Decision Tree");
    }

    #[test]
    fn test_report_json() {
        let report = ModelReport {
            rows: vec![ModelReportRow {
                model: "Logistic Regression".to_string(),
                params: ModelSpec::LogisticRegression { c: 0.1 },
                cross_val: 0.5,
                validation: 0.6,
                test: 0.7,
            }],
            generated_at: Utc::now(),
        };

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        report.save(&path).unwrap();
        assert_eq!(ModelReport::load(&path).unwrap(), report);
    }

    #[test]
    fn test_rule_based_report() {
        let directions = vec![Direction::default(); 4];
        let score =
            rule_based_report(&AlwaysEntrance, &directions, &[1, 1, 0, 0], DirectionLabel::Entrance)
                .unwrap();
        assert_eq!(score.precision, 0.5);
        assert_eq!(score.recall, 1.0);
        assert!((score.f1 - 2.0 / 3.0).abs() < 1e-12);

        let exit = rule_based_report(&AlwaysEntrance, &directions, &[1, 1, 0, 0], DirectionLabel::Exit)
            .unwrap();
        assert_eq!(exit.f1, 0.0);
    }

    #[test]
    fn test_rule_based_report_length_mismatch() {
        assert!(
            rule_based_report(&AlwaysEntrance, &[Direction::default()], &[], DirectionLabel::Entrance)
                .is_err()
        );
    }
}
