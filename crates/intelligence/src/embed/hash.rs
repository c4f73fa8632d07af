//! Feature-hashing embedder
//!
//! Tokens are lowercase alphanumeric runs. Each token and each adjacent token
//! pair is hashed with xxh3 into one of `dimension` buckets with a sign taken
//! from a second hash bit, then the vector is L2-normalized. Texts sharing
//! words end up close under inner product.

use pantry_engine::{EmbedError, Embedder};
use xxhash_rust::xxh3::xxh3_64_with_seed;

const TOKEN_SEED: u64 = 0x5eed_0001;
const BIGRAM_SEED: u64 = 0x5eed_0002;
/// Bigrams count for less than single tokens
const BIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic offline embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashEmbedder {
    /// Embedder producing `dimension`-length vectors
    pub fn new(dimension: usize) -> Self {
        HashEmbedder {
            dimension,
            model_id: format!("feature-hash-v1-{}", dimension),
        }
    }

    fn add(&self, vector: &mut [f32], feature: &[u8], seed: u64, weight: f32) {
        let h = xxh3_64_with_seed(feature, seed);
        let bucket = (h % self.dimension as u64) as usize;
        let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

/// Lowercase alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

impl Embedder for HashEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if self.dimension == 0 {
            return Err(EmbedError::Unavailable(
                "feature-hash embedder has dimension 0".into(),
            ));
        }
        let mut vector = vec![0.0f32; self.dimension];
        let tokens = tokenize(text);
        for token in &tokens {
            self.add(&mut vector, token.as_bytes(), TOKEN_SEED, 1.0);
        }
        for pair in tokens.windows(2) {
            let joined = format!("{} {}", pair[0], pair[1]);
            self.add(&mut vector, joined.as_bytes(), BIGRAM_SEED, BIGRAM_WEIGHT);
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Stamppot: mashed Potatoes & kale!"),
            vec!["stamppot", "mashed", "potatoes", "kale"]
        );
        assert!(tokenize("  --- ").is_empty());
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let e = HashEmbedder::new(64);
        let a = e.embed("Recipe: Pesto. Description: Basil sauce").unwrap();
        let b = e.embed("Recipe: Pesto. Description: Basil sauce").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm = dot(&a, &a).sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_insensitive() {
        let e = HashEmbedder::new(32);
        assert_eq!(e.embed("POTATOES").unwrap(), e.embed("potatoes").unwrap());
    }

    #[test]
    fn test_shared_words_are_closer() {
        let e = HashEmbedder::new(256);
        let query = e.embed("Potatoes").unwrap();
        let related = e.embed("Recipe: Stamppot. Description: Mashed potatoes with kale").unwrap();
        let unrelated = e.embed("Recipe: Pesto. Description: Basil and pine nut sauce").unwrap();
        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let e = HashEmbedder::new(8);
        assert_eq!(e.embed("").unwrap(), vec![0.0; 8]);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashEmbedder::new(0).embed("x").is_err());
    }
}
