//! Distance functions for the vector index.
//!
//! Every metric is expressed as a distance (lower = closer). Scores reported
//! by search are the negated distance, so "higher = more similar" holds for
//! every metric.
//!
//! - `InnerProduct`: distance = -dot(a, b). Vectors are assumed pre-normalized.
//! - `Cosine`: distance = 1 - cos(a, b)
//! - `Euclidean`: distance = ||a - b||

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance metric used for clustering and ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Negative inner product over pre-normalized vectors
    #[default]
    InnerProduct,
    /// One minus cosine similarity
    Cosine,
    /// L2 distance
    Euclidean,
}

impl DistanceMetric {
    /// Distance between `a` and `b` (lower = closer)
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Dimension mismatch in distance");
        match self {
            DistanceMetric::InnerProduct => -dot_product(a, b),
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
            DistanceMetric::Euclidean => euclidean_distance(a, b),
        }
    }

    /// Score between `a` and `b` (higher = more similar)
    #[inline]
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        -self.distance(a, b)
    }

    /// Whether centroids are kept on the unit sphere
    pub fn normalizes_centroids(&self) -> bool {
        matches!(self, DistanceMetric::InnerProduct | DistanceMetric::Cosine)
    }

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::InnerProduct => "inner_product",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dot product (inner product)
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm (Euclidean length)
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Squared L2 distance
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_l2(a, b).sqrt()
}

/// Cosine similarity; 0.0 if either vector has zero norm
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product(a, b) / (norm_a * norm_b)
    }
}

/// Scale `v` to unit length in place; zero vectors are left as-is
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
