//! Schema descriptor for query plans
//!
//! The descriptor enumerates what a plan may reference: output columns,
//! predicate columns, duration bucket thresholds, nesting depth and the
//! largest accepted limit. Plans are validated against it before execution.

use crate::plan::Column;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default upper bound (inclusive, minutes) of the `short` bucket
pub const DEFAULT_SHORT_MAX_MINUTES: i64 = 30;
/// Default upper bound (inclusive, minutes) of the `medium` bucket
pub const DEFAULT_MEDIUM_MAX_MINUTES: i64 = 60;
/// Default maximum filter nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 2;
/// Default maximum plan limit
pub const DEFAULT_MAX_LIMIT: usize = 1000;

/// Categorical bucket over `total_time`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    /// total_time <= short_max
    Short,
    /// short_max < total_time <= medium_max
    Medium,
    /// total_time > medium_max
    Long,
}

impl DurationBucket {
    /// All buckets in ascending order
    pub fn all() -> [DurationBucket; 3] {
        [
            DurationBucket::Short,
            DurationBucket::Medium,
            DurationBucket::Long,
        ]
    }

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationBucket::Short => "short",
            DurationBucket::Medium => "medium",
            DurationBucket::Long => "long",
        }
    }

    /// Parse a canonical label (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Some(DurationBucket::Short),
            "medium" => Some(DurationBucket::Medium),
            "long" => Some(DurationBucket::Long),
            _ => None,
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed thresholds for [`DurationBucket`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketThresholds {
    /// Inclusive upper bound of `short`
    pub short_max_minutes: i64,
    /// Inclusive upper bound of `medium`
    pub medium_max_minutes: i64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        BucketThresholds {
            short_max_minutes: DEFAULT_SHORT_MAX_MINUTES,
            medium_max_minutes: DEFAULT_MEDIUM_MAX_MINUTES,
        }
    }
}

impl BucketThresholds {
    /// Bucket a total time in minutes
    pub fn bucket(&self, total_time: i64) -> DurationBucket {
        if total_time <= self.short_max_minutes {
            DurationBucket::Short
        } else if total_time <= self.medium_max_minutes {
            DurationBucket::Medium
        } else {
            DurationBucket::Long
        }
    }

    /// Inclusive minute range covered by a bucket
    pub fn range(&self, bucket: DurationBucket) -> (Option<i64>, Option<i64>) {
        match bucket {
            DurationBucket::Short => (None, Some(self.short_max_minutes)),
            DurationBucket::Medium => (
                Some(self.short_max_minutes + 1),
                Some(self.medium_max_minutes),
            ),
            DurationBucket::Long => (Some(self.medium_max_minutes + 1), None),
        }
    }

    /// Thresholds must be positive and strictly increasing
    pub fn is_valid(&self) -> bool {
        self.short_max_minutes > 0 && self.medium_max_minutes > self.short_max_minutes
    }
}

/// What a query plan is allowed to reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Columns a plan may project (and group by)
    pub output_columns: Vec<Column>,
    /// Columns a plan may filter on
    pub predicate_columns: Vec<Column>,
    /// Duration bucket thresholds
    pub buckets: BucketThresholds,
    /// Maximum filter nesting depth (a plain condition has depth 1)
    pub max_depth: usize,
    /// Largest accepted `limit`
    pub max_limit: usize,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        SchemaDescriptor {
            output_columns: vec![
                Column::Id,
                Column::Name,
                Column::Description,
                Column::Servings,
                Column::TotalTime,
                Column::DurationBucket,
                Column::Equipment,
                Column::Ingredients,
                Column::Steps,
                Column::Similarity,
                Column::Count,
            ],
            predicate_columns: vec![
                Column::Id,
                Column::Name,
                Column::Description,
                Column::Servings,
                Column::TotalTime,
                Column::DurationBucket,
                Column::Equipment,
                Column::Ingredients,
                Column::Steps,
            ],
            buckets: BucketThresholds::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl SchemaDescriptor {
    /// Whether `column` may be projected
    pub fn allows_output(&self, column: Column) -> bool {
        self.output_columns.contains(&column)
    }

    /// Whether `column` may be filtered on
    pub fn allows_predicate(&self, column: Column) -> bool {
        self.predicate_columns.contains(&column)
    }

    /// Short human-readable description, used in model prompts
    pub fn describe(&self) -> String {
        let outputs: Vec<&str> = self.output_columns.iter().map(|c| c.as_str()).collect();
        let predicates: Vec<&str> = self.predicate_columns.iter().map(|c| c.as_str()).collect();
        format!(
            "output columns: {}\npredicate columns: {}\nduration buckets: short (<= {} min), medium (<= {} min), long (> {} min)\nmax limit: {}",
            outputs.join(", "),
            predicates.join(", "),
            self.buckets.short_max_minutes,
            self.buckets.medium_max_minutes,
            self.buckets.medium_max_minutes,
            self.max_limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        let t = BucketThresholds::default();
        assert_eq!(t.bucket(1), DurationBucket::Short);
        assert_eq!(t.bucket(30), DurationBucket::Short);
        assert_eq!(t.bucket(31), DurationBucket::Medium);
        assert_eq!(t.bucket(60), DurationBucket::Medium);
        assert_eq!(t.bucket(61), DurationBucket::Long);
    }

    #[test]
    fn test_bucket_range_matches_bucket() {
        let t = BucketThresholds::default();
        for bucket in DurationBucket::all() {
            let (min, max) = t.range(bucket);
            if let Some(min) = min {
                assert_eq!(t.bucket(min), bucket);
            }
            if let Some(max) = max {
                assert_eq!(t.bucket(max), bucket);
            }
        }
    }

    #[test]
    fn test_thresholds_validity() {
        assert!(BucketThresholds::default().is_valid());
        assert!(!BucketThresholds {
            short_max_minutes: 60,
            medium_max_minutes: 30
        }
        .is_valid());
    }

    #[test]
    fn test_bucket_parse() {
        assert_eq!(DurationBucket::parse("SHORT"), Some(DurationBucket::Short));
        assert_eq!(DurationBucket::parse(" long "), Some(DurationBucket::Long));
        assert_eq!(DurationBucket::parse("quick"), None);
    }

    #[test]
    fn test_default_schema_excludes_derived_predicates() {
        let schema = SchemaDescriptor::default();
        assert!(schema.allows_output(Column::Similarity));
        assert!(!schema.allows_predicate(Column::Similarity));
        assert!(!schema.allows_predicate(Column::Count));
        assert!(schema.describe().contains("ingredients"));
    }
}
