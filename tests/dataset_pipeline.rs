use std::fmt::Write as _;
use std::fs;
use std::sync::Arc;

use remarka::classifier::{RuleBasedClassifier, RuleClassifierConfig};
use remarka::config::RemarkaConfig;
use remarka::corpus::dataset::{DatasetPaths, read_directions_for_rules, read_labels};
use remarka::direction::DirectionLabel;
use remarka::embedding::KeyedVectors;
use remarka::error::Result;
use remarka::features::{POS_COLUMNS, load_dataset};
use remarka::ml::{ModelFamily, ModelFittingConfig, models_for_type, rule_based_report};
use tempfile::TempDir;

const ENTRANCE_VERBS: [&str; 3] = ["входить_VERB", "войти_VERB", "появляться_VERB"];
const OTHER_VERBS: [&str; 3] = ["уходить_VERB", "сидеть_VERB", "молчать_VERB"];

fn store() -> Result<KeyedVectors> {
    KeyedVectors::from_pairs(
        3,
        vec![
            ("входить_VERB", vec![1.0, 0.0, 0.0]),
            ("войти_VERB", vec![0.9, 0.1, 0.0]),
            ("появляться_VERB", vec![0.95, 0.0, 0.1]),
            ("уходить_VERB", vec![0.0, 1.0, 0.0]),
            ("сидеть_VERB", vec![0.0, 0.2, 1.0]),
            ("молчать_VERB", vec![0.1, 0.3, 0.9]),
            ("чацкий_S", vec![0.3, 0.3, 0.3]),
        ],
    )
}

/// Write `<type>_X_<subset>.csv` and `<type>_y_<subset>.csv` with `n` rows
/// alternating between entrances and other directions.
fn write_split(paths: &DatasetPaths, subset: &str, n: usize) -> Result<()> {
    let mut features = format!(";wv_items;{}\n", POS_COLUMNS.join(";"));
    let mut labels = String::new();

    for i in 0..n {
        let entrance = i % 2 == 0;
        let verbs = if entrance { ENTRANCE_VERBS } else { OTHER_VERBS };
        let verb = verbs[(i / 2) % verbs.len()];
        let counts: Vec<String> = (0..POS_COLUMNS.len())
            .map(|col| if col == 9 { "1".to_string() } else { "0".to_string() })
            .collect();

        writeln!(features, "{i};['чацкий_S', '{verb}'];{}", counts.join(";")).unwrap();
        writeln!(labels, "{}", u8::from(entrance)).unwrap();
    }

    fs::write(paths.features_path("entrance", subset), features)?;
    fs::write(paths.labels_path("entrance", subset), labels)?;
    Ok(())
}

#[test]
fn supervised_models_learn_entrances() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new()?;
    let paths = DatasetPaths::new(dir.path());
    write_split(&paths, "train", 30)?;
    write_split(&paths, "valid", 10)?;
    write_split(&paths, "test", 10)?;

    let store = store()?;
    let train = load_dataset(&paths, "entrance", "train", &store)?;
    let valid = load_dataset(&paths, "entrance", "valid", &store)?;
    let test = load_dataset(&paths, "entrance", "test", &store)?;
    assert_eq!(train.len(), 30);
    assert_eq!(train.x.cols(), POS_COLUMNS.len() + 3);

    let config = ModelFittingConfig {
        folds: 3,
        grid_size: Some(4),
        families: vec![ModelFamily::LogisticRegression, ModelFamily::DecisionTree],
        ..Default::default()
    };
    let report = models_for_type(&train, &valid, &test, &config)?;

    assert_eq!(report.rows.len(), 2);
    for row in &report.rows {
        assert_eq!(row.validation, 1.0, "{} failed on validation", row.model);
        assert_eq!(row.test, 1.0, "{} failed on test", row.model);
    }

    let json = report.to_json()?;
    assert!(json.contains("\"Decision Tree\""));
    Ok(())
}

#[test]
fn rule_based_model_scores_against_labels() -> Result<()> {
    let dir = TempDir::new()?;
    let paths = DatasetPaths::new(dir.path());
    write_split(&paths, "test", 12)?;

    let classifier = RuleBasedClassifier::new(
        Arc::new(store()?),
        RuleClassifierConfig::default().with_neighbors(2),
    )?;
    let directions = read_directions_for_rules(paths.features_path("entrance", "test"))?;
    let labels = read_labels(paths.labels_path("entrance", "test"))?;

    let score = rule_based_report(&classifier, &directions, &labels, DirectionLabel::Entrance)?;
    assert_eq!(score.f1, 1.0);
    Ok(())
}

#[test]
fn mismatched_label_file_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let paths = DatasetPaths::new(dir.path());
    write_split(&paths, "train", 6)?;
    fs::write(paths.labels_path("entrance", "train"), "1\n0\n")?;

    assert!(load_dataset(&paths, "entrance", "train", &store()?).is_err());
    Ok(())
}

#[test]
fn config_file_points_at_dataset_root() -> Result<()> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("remarka.json");
    fs::write(
        &config_path,
        format!(
            r#"{{"dataset": {{"root": "{}"}}, "fitting": {{"folds": 3}}}}"#,
            dir.path().display()
        ),
    )?;

    let config = RemarkaConfig::from_json_file(&config_path)?;
    assert_eq!(config.dataset.root, dir.path());
    assert_eq!(config.fitting.folds, 3);
    assert_eq!(config.fitting.grid_size, None);
    Ok(())
}
