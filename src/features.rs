//! Feature tables for the supervised direction classifiers.
//!
//! Each direction becomes one row: its part-of-speech counts followed by the
//! mean embedding of its tokens.

use std::path::Path;

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::corpus::dataset::{DatasetPaths, DirectionRecord, read_labels, read_records};
use crate::embedding::EmbeddingStore;
use crate::error::{RemarkaError, Result};
use crate::vector::aggregate_or_zeros;

/// Part-of-speech count columns, in feature order.
pub const POS_COLUMNS: [&str; 12] = [
    "INTJ", "APRO", "SPRO", "ADVPRO", "PERSN", "NUM", "A", "ANUM", "ADV", "S", "PR", "PART",
];

/// Dense row-major matrix of features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Build a matrix from a flat row-major buffer.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(RemarkaError::invalid_argument(format!(
                "{} values do not fill a {rows}x{cols} matrix",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from rows of equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(RemarkaError::invalid_argument(format!(
                    "row {i} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// A new matrix holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            rows: indices.len(),
            cols: self.cols,
            data,
        }
    }
}

/// One feature row: POS counts, then the mean token embedding.
///
/// Directions without any known token get a zero embedding part, and every
/// non-finite value is replaced by zero.
pub fn record_features<S>(record: &DirectionRecord, store: &S) -> Vec<f64>
where
    S: EmbeddingStore + ?Sized,
{
    let embedding = aggregate_or_zeros(store, &record.wv_items);

    record
        .pos_counts
        .iter()
        .copied()
        .chain(embedding.into_iter().map(f64::from))
        .map(|value| if value.is_finite() { value } else { 0.0 })
        .collect()
}

/// Feature matrix for a list of records. Rows keep the record order.
pub fn build_features<S>(records: &[DirectionRecord], store: &S) -> FeatureMatrix
where
    S: EmbeddingStore + ?Sized,
{
    let cols = POS_COLUMNS.len() + store.dimension();
    let data: Vec<f64> = records
        .par_iter()
        .flat_map_iter(|record| record_features(record, store))
        .collect();

    FeatureMatrix {
        rows: records.len(),
        cols,
        data,
    }
}

/// Features and binary labels of one dataset split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub x: FeatureMatrix,
    pub y: Vec<u8>,
}

impl Dataset {
    pub fn new(x: FeatureMatrix, y: Vec<u8>) -> Result<Self> {
        if x.rows() != y.len() {
            return Err(RemarkaError::dataset(format!(
                "{} feature rows but {} labels",
                x.rows(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Read one split from disk and turn it into features.
pub fn load_dataset<S>(
    paths: &DatasetPaths,
    direction_type: &str,
    subset: &str,
    store: &S,
) -> Result<Dataset>
where
    S: EmbeddingStore + ?Sized,
{
    load_dataset_from(
        paths.features_path(direction_type, subset),
        paths.labels_path(direction_type, subset),
        store,
    )
}

/// Read a feature table and label file and turn them into features.
pub fn load_dataset_from<S, P, Q>(features_path: P, labels_path: Q, store: &S) -> Result<Dataset>
where
    S: EmbeddingStore + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let records = read_records(features_path.as_ref())?;
    let labels = read_labels(labels_path.as_ref())?;
    info!(
        "Read {} directions from {}",
        records.len(),
        features_path.as_ref().display()
    );

    Dataset::new(build_features(&records, store), labels)
}
