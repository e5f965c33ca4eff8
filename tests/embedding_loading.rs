use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use remarka::classifier::{RuleBasedClassifier, RuleClassifierConfig};
use remarka::direction::{Direction, DirectionLabel};
use remarka::embedding::word2vec::{load_word2vec, load_word2vec_zip, write_word2vec};
use remarka::embedding::{EmbeddingConfig, EmbeddingStore, KeyedVectors};
use remarka::error::{RemarkaError, Result};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn sample_store() -> Result<KeyedVectors> {
    KeyedVectors::from_pairs(
        4,
        vec![
            ("входить_VERB", vec![1.0, 0.1, 0.0, 0.0]),
            ("войти_VERB", vec![0.9, 0.2, 0.0, 0.1]),
            ("уходить_VERB", vec![0.0, 0.1, 1.0, 0.0]),
            ("выйти_VERB", vec![0.1, 0.0, 0.9, 0.2]),
            ("комната_S", vec![0.3, 0.3, 0.3, 0.3]),
        ],
    )
}

fn write_archive(dir: &TempDir, entry: &str, store: &KeyedVectors) -> Result<std::path::PathBuf> {
    let mut model = Vec::new();
    write_word2vec(store, &mut model)?;

    let path = dir.path().join("180.zip");
    let mut archive = zip::ZipWriter::new(File::create(&path)?);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    archive.start_file(entry, options)?;
    archive.write_all(&model)?;
    archive.finish()?;
    Ok(path)
}

#[test]
fn plain_binary_loads_through_mmap() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model.bin");
    write_word2vec(&sample_store()?, File::create(&path)?)?;

    let store = load_word2vec(&path)?;
    assert_eq!(store.len(), 5);
    assert_eq!(store.dimension(), 4);
    assert_eq!(store.lookup("войти_VERB"), Some(&[0.9, 0.2, 0.0, 0.1][..]));
    Ok(())
}

#[test]
fn zipped_model_feeds_the_classifier() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new()?;
    let path = write_archive(&dir, "model.bin", &sample_store()?)?;

    let config = EmbeddingConfig {
        path,
        expected_dimension: Some(4),
        ..EmbeddingConfig::default()
    };
    let store = Arc::new(config.load()?);
    let classifier =
        RuleBasedClassifier::new(store, RuleClassifierConfig::default().with_neighbors(1))?;

    assert_eq!(
        classifier.single_prediction(&Direction::from(vec!["войти_VERB", "в_PR", "комната_S"])),
        DirectionLabel::Entrance
    );
    assert_eq!(
        classifier.single_prediction(&Direction::from(vec!["выйти_VERB"])),
        DirectionLabel::Exit
    );
    Ok(())
}

#[test]
fn missing_archive_entry_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_archive(&dir, "other.bin", &sample_store()?)?;

    let err = load_word2vec_zip(&path, "model.bin").unwrap_err();
    assert!(matches!(err, RemarkaError::Zip(_)));
    Ok(())
}

#[test]
fn unexpected_dimension_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_archive(&dir, "model.bin", &sample_store()?)?;

    let err = EmbeddingConfig::with_path(path).load().unwrap_err();
    assert!(err.to_string().contains("expected 300"));
    Ok(())
}

#[test]
fn missing_model_file_is_an_error() {
    let err = EmbeddingConfig::with_path("/nonexistent/model.bin").load().unwrap_err();
    assert!(matches!(err, RemarkaError::Embedding(_)));
}
