//! Duration phrases to buckets

use pantry_core::DurationBucket;

const SHORT_PHRASES: &[&str] = &[
    "quick",
    "quickly",
    "fast",
    "speedy",
    "rapid",
    "short",
    "in a hurry",
    "half an hour",
    "under 30 minutes",
    "less than 30 minutes",
    "30 minutes or less",
    "weeknight",
];

const MEDIUM_PHRASES: &[&str] = &[
    "moderate",
    "medium",
    "about an hour",
    "around an hour",
    "an hour or so",
    "within an hour",
    "under an hour",
    "not too long",
];

const LONG_PHRASES: &[&str] = &[
    "slow",
    "slowly",
    "long",
    "lengthy",
    "all day",
    "slow cooked",
    "leisurely",
    "takes hours",
    "several hours",
    "hours",
];

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn contains_phrase(haystack: &[String], phrase: &str) -> bool {
    let needle = words(phrase);
    !needle.is_empty()
        && haystack
            .windows(needle.len())
            .any(|w| w.iter().zip(&needle).all(|(a, b)| a == b))
}

/// Map a duration phrase ("quick", "about an hour", "all day") to a bucket.
///
/// Canonical labels are accepted as is. Medium phrases are checked first so
/// "not too long" and "under an hour" do not fall into `long` or `short`.
pub fn bucket_for_phrase(phrase: &str) -> Option<DurationBucket> {
    if let Some(bucket) = DurationBucket::parse(phrase) {
        return Some(bucket);
    }
    let haystack = words(phrase);
    if MEDIUM_PHRASES.iter().any(|p| contains_phrase(&haystack, p)) {
        return Some(DurationBucket::Medium);
    }
    if SHORT_PHRASES.iter().any(|p| contains_phrase(&haystack, p)) {
        return Some(DurationBucket::Short);
    }
    if LONG_PHRASES.iter().any(|p| contains_phrase(&haystack, p)) {
        return Some(DurationBucket::Long);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_labels() {
        assert_eq!(bucket_for_phrase("short"), Some(DurationBucket::Short));
        assert_eq!(bucket_for_phrase("Medium"), Some(DurationBucket::Medium));
        assert_eq!(bucket_for_phrase("long"), Some(DurationBucket::Long));
    }

    #[test]
    fn test_short_phrases() {
        for p in ["quick", "fast dinners", "under half an hour", "in a hurry"] {
            assert_eq!(bucket_for_phrase(p), Some(DurationBucket::Short), "{}", p);
        }
    }

    #[test]
    fn test_medium_phrases() {
        for p in ["moderate", "about an hour", "not too long", "an hour or so"] {
            assert_eq!(bucket_for_phrase(p), Some(DurationBucket::Medium), "{}", p);
        }
    }

    #[test]
    fn test_long_phrases() {
        for p in ["slow", "all day", "slow-cooked", "takes several hours"] {
            assert_eq!(bucket_for_phrase(p), Some(DurationBucket::Long), "{}", p);
        }
    }

    #[test]
    fn test_no_match() {
        assert_eq!(bucket_for_phrase("vegetarian"), None);
        assert_eq!(bucket_for_phrase(""), None);
        assert_eq!(bucket_for_phrase("shortbread"), None);
    }
}
