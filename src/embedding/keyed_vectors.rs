//! In-memory embedding table with cached norms.

use std::cmp::Ordering;

use ahash::AHashMap;
use rayon::prelude::*;

use crate::embedding::{EmbeddingStore, Neighbor};
use crate::error::{RemarkaError, Result};
use crate::vector::similarity::{cosine_with_norms, norm};

/// Vocabularies above this size are scored in parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// Token vectors stored row-major in one contiguous buffer.
///
/// Row `i` belongs to `vocab[i]`. Row norms are computed on insert so that
/// neighbour queries only need one dot product per row.
#[derive(Debug, Clone)]
pub struct KeyedVectors {
    dimension: usize,
    vocab: Vec<String>,
    index: AHashMap<String, usize>,
    data: Vec<f32>,
    norms: Vec<f32>,
}

impl KeyedVectors {
    /// Create an empty table of the given dimensionality.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vocab: Vec::new(),
            index: AHashMap::new(),
            data: Vec::new(),
            norms: Vec::new(),
        }
    }

    /// Create an empty table with room for `capacity` tokens.
    ///
    /// Fails when `capacity * dimension` overflows.
    pub fn with_capacity(dimension: usize, capacity: usize) -> Result<Self> {
        let values = capacity.checked_mul(dimension).ok_or_else(|| {
            RemarkaError::embedding(format!(
                "cannot reserve {capacity} vectors of dimension {dimension}"
            ))
        })?;

        Ok(Self {
            dimension,
            vocab: Vec::with_capacity(capacity),
            index: AHashMap::with_capacity(capacity),
            data: Vec::with_capacity(values),
            norms: Vec::with_capacity(capacity),
        })
    }

    /// Build a table from `(token, vector)` pairs.
    pub fn from_pairs<S, I>(dimension: usize, pairs: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Vec<f32>)>,
    {
        let mut store = Self::new(dimension);
        for (token, vector) in pairs {
            store.insert(token, &vector)?;
        }
        Ok(store)
    }

    /// Add a token, replacing its vector if it is already present.
    pub fn insert<S: Into<String>>(&mut self, token: S, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RemarkaError::embedding(format!(
                "vector dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }

        let token = token.into();
        match self.index.get(&token) {
            Some(&row) => {
                let start = row * self.dimension;
                self.data[start..start + self.dimension].copy_from_slice(vector);
                self.norms[row] = norm(vector);
            }
            None => {
                self.index.insert(token.clone(), self.vocab.len());
                self.vocab.push(token);
                self.data.extend_from_slice(vector);
                self.norms.push(norm(vector));
            }
        }

        Ok(())
    }

    /// Tokens in insertion order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocab
    }

    /// Iterate `(token, vector)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.vocab
            .iter()
            .enumerate()
            .map(move |(row, token)| (token.as_str(), self.row(row)))
    }

    fn row(&self, row: usize) -> &[f32] {
        let start = row * self.dimension;
        &self.data[start..start + self.dimension]
    }

    fn score_rows(&self, query_row: usize) -> Vec<(usize, f32)> {
        let query = self.row(query_row);
        let query_norm = self.norms[query_row];

        let score = |row: usize| -> Option<(usize, f32)> {
            if row == query_row || self.norms[row] == 0.0 {
                return None;
            }
            let similarity = cosine_with_norms(query, query_norm, self.row(row), self.norms[row]);
            Some((row, similarity))
        };

        if self.vocab.len() >= PARALLEL_THRESHOLD {
            (0..self.vocab.len()).into_par_iter().filter_map(score).collect()
        } else {
            (0..self.vocab.len()).filter_map(score).collect()
        }
    }
}

/// Higher similarity first; earlier rows win ties.
fn by_similarity(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

impl EmbeddingStore for KeyedVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vocab.len()
    }

    fn lookup(&self, token: &str) -> Option<&[f32]> {
        self.index.get(token).map(|&row| self.row(row))
    }

    fn nearest_neighbors(&self, token: &str, k: usize) -> Result<Vec<Neighbor>> {
        let query_row = *self
            .index
            .get(token)
            .ok_or_else(|| RemarkaError::not_found(format!("token '{token}' is not in vocabulary")))?;

        if self.norms[query_row] == 0.0 {
            return Err(RemarkaError::embedding(format!(
                "token '{token}' has a zero vector"
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored = self.score_rows(query_row);
        if scored.len() > k {
            scored.select_nth_unstable_by(k - 1, by_similarity);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_similarity);

        Ok(scored
            .into_iter()
            .map(|(row, similarity)| Neighbor {
                token: self.vocab[row].clone(),
                similarity,
            })
            .collect())
    }
}
