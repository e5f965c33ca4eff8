//! Averaging token embeddings into a single direction vector.

use crate::embedding::EmbeddingStore;
use crate::vector::VectorError;

/// Mean of the embeddings of every token found in `store`.
///
/// Out-of-vocabulary tokens are skipped. If no token is found the call
/// fails with [`VectorError::EmptyAggregation`] before any division happens.
pub fn aggregate<S, T>(store: &S, tokens: &[T]) -> Result<Vec<f32>, VectorError>
where
    S: EmbeddingStore + ?Sized,
    T: AsRef<str>,
{
    let dimension = store.dimension();
    let mut total = vec![0.0_f32; dimension];
    let mut found = 0_usize;

    for token in tokens {
        let Some(vector) = store.lookup(token.as_ref()) else {
            continue;
        };
        if vector.len() != dimension {
            return Err(VectorError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }
        for (acc, value) in total.iter_mut().zip(vector) {
            *acc += value;
        }
        found += 1;
    }

    if found == 0 {
        return Err(VectorError::EmptyAggregation);
    }

    let count = found as f32;
    for value in &mut total {
        *value /= count;
    }

    Ok(total)
}

/// Like [`aggregate`], but a direction without known tokens becomes the zero
/// vector. Feature tables use this so every row keeps the same width.
pub fn aggregate_or_zeros<S, T>(store: &S, tokens: &[T]) -> Vec<f32>
where
    S: EmbeddingStore + ?Sized,
    T: AsRef<str>,
{
    aggregate(store, tokens).unwrap_or_else(|_| vec![0.0; store.dimension()])
}
