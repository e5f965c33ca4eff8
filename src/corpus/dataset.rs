//! Labelled direction datasets.
//!
//! A dataset for one direction type and subset is a pair of files under a
//! common root:
//!
//! - `<type>_X_<subset>.csv`: `;`-separated table with a header. The
//!   `wv_items` column holds the stringified token list of the direction and
//!   one column per part-of-speech tag holds its count. Other columns are
//!   ignored.
//! - `<type>_y_<subset>.csv`: one integer label (0 or 1) per line.

use std::fs;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::direction::{Direction, parse_token_list};
use crate::error::{RemarkaError, Result};
use crate::features::POS_COLUMNS;

/// Name of the token list column.
pub const TOKENS_COLUMN: &str = "wv_items";

/// Location of the dataset files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub root: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data/ml"),
        }
    }
}

impl DatasetPaths {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Path of the feature table, e.g. `setting_X_train.csv`.
    pub fn features_path(&self, direction_type: &str, subset: &str) -> PathBuf {
        self.root
            .join(format!("{direction_type}_X_{subset}.csv"))
    }

    /// Path of the label file, e.g. `setting_y_train.csv`.
    pub fn labels_path(&self, direction_type: &str, subset: &str) -> PathBuf {
        self.root
            .join(format!("{direction_type}_y_{subset}.csv"))
    }
}

/// One row of a feature table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionRecord {
    /// Tokens of the direction.
    pub wv_items: Vec<String>,
    /// Counts for each column of [`POS_COLUMNS`], in that order.
    pub pos_counts: [f64; POS_COLUMNS.len()],
}

impl DirectionRecord {
    pub fn direction(&self) -> Direction {
        Direction::new(self.wv_items.clone())
    }
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| {
            RemarkaError::dataset(format!("{} has no '{name}' column", path.display()))
        })
}

fn cell<'r>(record: &'r csv::StringRecord, idx: usize, path: &Path, row: usize) -> Result<&'r str> {
    record.get(idx).ok_or_else(|| {
        RemarkaError::dataset(format!("{}: row {} is too short", path.display(), row + 1))
    })
}

/// Read every row of a feature table.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<DirectionRecord>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let tokens_idx = column_index(&headers, TOKENS_COLUMN, path)?;
    let pos_idx = POS_COLUMNS
        .iter()
        .map(|name| column_index(&headers, name, path))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;

        let wv_items = parse_token_list(cell(&record, tokens_idx, path, row)?);
        let mut pos_counts = [0.0; POS_COLUMNS.len()];
        for (slot, (&idx, name)) in pos_counts.iter_mut().zip(pos_idx.iter().zip(POS_COLUMNS)) {
            let raw = cell(&record, idx, path, row)?.trim();
            // An empty cell is a missing count.
            if raw.is_empty() {
                continue;
            }
            *slot = raw.parse::<f64>().map_err(|e| {
                RemarkaError::dataset(format!(
                    "{}: row {}, column {name}: invalid count '{raw}': {e}",
                    path.display(),
                    row + 1
                ))
            })?;
        }

        records.push(DirectionRecord {
            wv_items,
            pos_counts,
        });
    }

    Ok(records)
}

/// Read a label file: one 0/1 integer per non-empty line.
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_no, line)| match line.trim().parse::<i64>() {
            Ok(0) => Ok(0),
            Ok(1) => Ok(1),
            Ok(other) => Err(RemarkaError::dataset(format!(
                "{}: line {}: label {other} is not binary",
                path.display(),
                line_no + 1
            ))),
            Err(e) => Err(RemarkaError::dataset(format!(
                "{}: line {}: {e}",
                path.display(),
                line_no + 1
            ))),
        })
        .collect()
}

/// Directions of a feature table, for the rule-based classifier.
pub fn read_directions_for_rules<P: AsRef<Path>>(path: P) -> Result<Vec<Direction>> {
    Ok(read_records(path)?
        .into_iter()
        .map(|record| Direction::new(record.wv_items))
        .collect())
}
