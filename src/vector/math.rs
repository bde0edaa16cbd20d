//! Cosine similarity and centroid math over dense embedding vectors.
//!
//! Embeddings in SEO exports are often ragged (truncated columns, missing
//! values), so nothing here errors on a length mismatch:
//! - Similarity compares only the shared prefix of the two vectors
//! - A zero-magnitude or empty vector has similarity 0 with anything
//! - A centroid is either empty or unit length

/// Norms below this are treated as zero.
const EPSILON: f32 = 1e-10;

/// Computes cosine similarity between two vectors.
///
/// Only the first `min(a.len(), b.len())` dimensions are compared. Returns 0
/// when either side has zero magnitude over that prefix, so the result is
/// never NaN for finite input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let shared = a.len().min(b.len());
    let (a, b) = (&a[..shared], &b[..shared]);

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);

    if norm_a <= EPSILON || norm_b <= EPSILON {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Computes the L2-normalized elementwise mean of `vectors`.
///
/// The dimension is taken from the first vector. Shorter vectors contribute
/// zero for their missing dimensions and longer ones are truncated. Returns an
/// empty vector for empty input, or when the mean has zero magnitude.
pub fn centroid<V: AsRef<[f32]>>(vectors: &[V]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let dimension = first.as_ref().len();
    let mut mean = vec![0.0f32; dimension];

    for vector in vectors {
        for (slot, value) in mean.iter_mut().zip(vector.as_ref()) {
            *slot += value;
        }
    }

    let count = vectors.len() as f32;
    for value in mean.iter_mut() {
        *value /= count;
    }

    if normalize_vector(&mut mean) {
        mean
    } else {
        Vec::new()
    }
}

/// Euclidean length of a vector.
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Normalizes a vector in-place to unit length.
///
/// Returns `false` and leaves the vector untouched when its norm is too small
/// to divide by.
fn normalize_vector(vector: &mut [f32]) -> bool {
    let norm = l2_norm(vector);
    if norm <= EPSILON || !norm.is_finite() {
        return false;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
    true
}
