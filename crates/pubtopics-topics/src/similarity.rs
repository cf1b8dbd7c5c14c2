//! Cosine similarity between paper concept-score vectors.
//!
//! The pairwise distance matrix built here is the input to average-linkage
//! clustering.

/// Calculate cosine similarity between two vectors.
///
/// Returns value in [-1.0, 1.0] where 1.0 = identical direction. A zero vector
/// has similarity 0.0 with everything.
///
/// # Panics
/// Panics if vectors have different dimensions.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Calculate pairwise distances between concept vectors.
///
/// Returns a symmetric matrix where distance = 1 - cosine_similarity, clamped
/// to [0, 1]. Concept scores are non-negative so the clamp only absorbs
/// rounding error.
pub fn pairwise_distances(vectors: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = vectors.len();
    let mut distances = vec![vec![0.0f64; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let sim = cosine_similarity(&vectors[i], &vectors[j]);
            let dist = (1.0 - sim).clamp(0.0, 1.0);
            distances[i][j] = dist;
            distances[j][i] = dist;
        }
    }

    distances
}
