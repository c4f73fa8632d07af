//! Seeded k-means clustering
//!
//! k-means++ seeding followed by Lloyd's refinement. All randomness comes
//! from a `StdRng` seeded with the configured seed, so the same vectors in
//! the same order always produce the same centroids.

use super::distance::{normalize_in_place, squared_l2, DistanceMetric};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for one k-means run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    /// Upper bound on Lloyd iterations
    pub max_iterations: usize,
    /// Stop when no centroid moves farther than this (L2)
    pub convergence_threshold: f32,
    /// RNG seed for k-means++ seeding
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        KMeansParams {
            max_iterations: 25,
            convergence_threshold: 1e-4,
            seed: 42,
        }
    }
}

/// Output of [`train`]
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Final centroids, `k` of them
    pub centroids: Vec<Vec<f32>>,
    /// Index of the nearest centroid for each input vector
    pub assignments: Vec<usize>,
    /// Lloyd iterations actually run
    pub iterations: usize,
}

/// Index of the centroid nearest to `v`
///
/// Ties resolve to the lower centroid index.
pub fn nearest_centroid(v: &[f32], centroids: &[Vec<f32>], metric: DistanceMetric) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = metric.distance(v, centroid);
        if d < best_dist {
            best_dist = d;
            best = c;
        }
    }
    best
}

/// Cluster `vectors` into `k` groups.
///
/// Callers guarantee `1 <= k <= vectors.len()` and equal vector lengths.
pub fn train(
    vectors: &[&[f32]],
    k: usize,
    metric: DistanceMetric,
    params: &KMeansParams,
) -> KMeansResult {
    debug_assert!(k >= 1 && k <= vectors.len());
    let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(params.seed);

    let mut centroids = kmeans_plusplus_init(vectors, k, &mut rng);
    if metric.normalizes_centroids() {
        for c in centroids.iter_mut() {
            normalize_in_place(c);
        }
    }

    let mut assignments = vec![0usize; vectors.len()];
    let mut iterations = 0;

    for _ in 0..params.max_iterations {
        iterations += 1;

        for (i, v) in vectors.iter().enumerate() {
            assignments[i] = nearest_centroid(v, &centroids, metric);
        }

        let mut sums = vec![vec![0.0f32; dim]; k];
        let mut counts = vec![0usize; k];
        for (i, v) in vectors.iter().enumerate() {
            let c = assignments[i];
            counts[c] += 1;
            for (s, x) in sums[c].iter_mut().zip(v.iter()) {
                *s += x;
            }
        }

        let mut max_shift = 0.0f32;
        for c in 0..k {
            // Emptied clusters keep their previous centroid
            if counts[c] == 0 {
                continue;
            }
            let mut updated: Vec<f32> = sums[c].iter().map(|s| s / counts[c] as f32).collect();
            if metric.normalizes_centroids() {
                normalize_in_place(&mut updated);
            }
            let shift = squared_l2(&updated, &centroids[c]).sqrt();
            max_shift = max_shift.max(shift);
            centroids[c] = updated;
        }

        if max_shift < params.convergence_threshold {
            break;
        }
    }

    // Final assignment against the settled centroids
    for (i, v) in vectors.iter().enumerate() {
        assignments[i] = nearest_centroid(v, &centroids, metric);
    }

    KMeansResult {
        centroids,
        assignments,
        iterations,
    }
}

/// k-means++ seeding: first centroid uniform, the rest proportional to D(x)^2
fn kmeans_plusplus_init<R: Rng>(vectors: &[&[f32]], k: usize, rng: &mut R) -> Vec<Vec<f32>> {
    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..vectors.len()));

    // Squared distance of each vector to its nearest chosen centroid
    let mut nearest: Vec<f64> = vectors
        .iter()
        .map(|v| squared_l2(v, vectors[chosen[0]]) as f64)
        .collect();

    while chosen.len() < k {
        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 {
            let threshold = rng.gen::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = None;
            for (i, &w) in nearest.iter().enumerate() {
                if w <= 0.0 {
                    continue;
                }
                cumsum += w;
                if cumsum >= threshold {
                    selected = Some(i);
                    break;
                }
            }
            // Rounding can leave the threshold just past the sum
            selected.or_else(|| nearest.iter().rposition(|&w| w > 0.0))
        } else {
            None
        };

        // All remaining points coincide with a centroid: take the lowest unused index
        let next = match next {
            Some(i) => i,
            None => match (0..vectors.len()).find(|i| !chosen.contains(i)) {
                Some(i) => i,
                None => break,
            },
        };

        chosen.push(next);
        for (i, v) in vectors.iter().enumerate() {
            let d = squared_l2(v, vectors[next]) as f64;
            if d < nearest[i] {
                nearest[i] = d;
            }
        }
    }

    chosen.iter().map(|&i| vectors[i].to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f32>> {
        // Two well separated groups on the unit circle
        let mut out = Vec::new();
        for i in 0..10 {
            let t = 0.01 * i as f32;
            out.push(vec![t.cos(), t.sin()]);
            out.push(vec![-(t.cos()), -(t.sin())]);
        }
        out
    }

    fn refs(v: &[Vec<f32>]) -> Vec<&[f32]> {
        v.iter().map(|x| x.as_slice()).collect()
    }

    #[test]
    fn test_separates_two_groups() {
        let data = blobs();
        let result = train(&refs(&data), 2, DistanceMetric::InnerProduct, &KMeansParams::default());
        assert_eq!(result.centroids.len(), 2);
        for pair in result.assignments.chunks(2) {
            assert_ne!(pair[0], pair[1]);
        }
        for (i, a) in result.assignments.iter().enumerate() {
            assert_eq!(*a, result.assignments[i % 2]);
        }
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let data = blobs();
        let params = KMeansParams::default();
        let a = train(&refs(&data), 3, DistanceMetric::InnerProduct, &params);
        let b = train(&refs(&data), 3, DistanceMetric::InnerProduct, &params);
        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.assignments, b.assignments);
    }

    #[test]
    fn test_centroids_normalized_for_inner_product() {
        let data = blobs();
        let result = train(&refs(&data), 2, DistanceMetric::InnerProduct, &KMeansParams::default());
        for c in &result.centroids {
            let norm: f32 = c.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_k_equals_n_with_duplicates() {
        let data = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        let result = train(&refs(&data), 3, DistanceMetric::Euclidean, &KMeansParams::default());
        assert_eq!(result.centroids.len(), 3);
    }

    #[test]
    fn test_nearest_centroid_tie_prefers_lower_index() {
        let centroids = vec![vec![1.0, 0.0], vec![1.0, 0.0]];
        assert_eq!(
            nearest_centroid(&[1.0, 0.0], &centroids, DistanceMetric::InnerProduct),
            0
        );
    }

    #[test]
    fn test_single_iteration_limit() {
        let data = blobs();
        let params = KMeansParams {
            max_iterations: 1,
            ..KMeansParams::default()
        };
        let result = train(&refs(&data), 2, DistanceMetric::Euclidean, &params);
        assert_eq!(result.iterations, 1);
    }
}
