//! Fixed-length weighted feature vectors and cosine similarity
//!
//! Every personality record maps to exactly [`VECTOR_LEN`] components in a
//! fixed dimension order. Cosine similarity is the single scoring primitive
//! of the whole system; there is no alternative metric.

/// Number of dimensions in every feature vector. Never changes at runtime.
pub const VECTOR_LEN: usize = 16;

/// A weighted feature vector over the 16 personality dimensions.
///
/// Dimension order is fixed and never reordered; component `i` of a
/// personal vector is `(rating_i - 3.0) * weight_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; VECTOR_LEN]);

impl FeatureVector {
    pub fn new(components: [f64; VECTOR_LEN]) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[f64; VECTOR_LEN] {
        &self.0
    }

    /// Add `delta` to the component at `index`.
    ///
    /// Used when deriving a board's matching vector from its author's
    /// personal vector.
    pub fn add_at(&mut self, index: usize, delta: f64) {
        self.0[index] += delta;
    }

    /// Cosine of the angle between two vectors, in `[-1, 1]`.
    ///
    /// Degenerate case: if either vector has zero magnitude the result is
    /// a deterministic 0.0 rather than a division fault.
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f64 {
        let mut dot = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;
        for i in 0..VECTOR_LEN {
            dot += self.0[i] * other.0[i];
            norm_a += self.0[i] * self.0[i];
            norm_b += other.0[i] * other.0[i];
        }

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}
