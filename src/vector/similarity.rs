//! Cosine similarity with explicit zero-norm handling.

use crate::vector::VectorError;

/// Euclidean (L2) norm of a vector.
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Unit-length copy of `v`.
///
/// Fails with [`VectorError::ZeroNormVector`] when `v` has zero magnitude
/// (this includes the empty vector).
pub fn normalized(v: &[f32]) -> Result<Vec<f32>, VectorError> {
    let n = norm(v);
    if n == 0.0 || !n.is_finite() {
        return Err(VectorError::ZeroNormVector);
    }
    Ok(v.iter().map(|x| x / n).collect())
}

/// Cosine similarity of two vectors, in `[-1, 1]`.
///
/// Both vectors are L2-normalized and their dot product is returned.
pub fn cosine(v1: &[f32], v2: &[f32]) -> Result<f32, VectorError> {
    if v1.len() != v2.len() {
        return Err(VectorError::DimensionMismatch {
            expected: v1.len(),
            actual: v2.len(),
        });
    }

    let a = normalized(v1)?;
    let b = normalized(v2)?;
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();

    Ok(dot.clamp(-1.0, 1.0))
}

/// Cosine similarity given a precomputed norm for each side.
///
/// Used by the embedding store, which caches row norms. Both norms must be
/// non-zero.
pub(crate) fn cosine_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
