//! Query plan grammar
//!
//! A [`Plan`] is a structured, read-only description of a query: a
//! conjunction of filters, an optional similarity clause, an optional limit,
//! an optional group-by column and an output column list. There is no way to
//! express a mutation in this type.
//!
//! Plans are checked against a [`SchemaDescriptor`] by [`Plan::validate`],
//! which returns a [`ValidatedPlan`]. Only validated plans can be executed.

use crate::error::{Error, Result};
use crate::schema::{DurationBucket, SchemaDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A column of the recipe relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Record id
    Id,
    /// Recipe name
    Name,
    /// Recipe description
    Description,
    /// Number of servings
    Servings,
    /// Total time in minutes
    TotalTime,
    /// Bucket derived from total time
    DurationBucket,
    /// Equipment list
    Equipment,
    /// Ingredient list (predicates match the item names)
    Ingredients,
    /// Step list
    Steps,
    /// Similarity score (output only, requires a similarity clause)
    Similarity,
    /// Group count (output only, requires group_by)
    Count,
}

/// How a column's values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer scalar
    Integer,
    /// Free text
    Text,
    /// Ordered sequence of strings (existential matching)
    Sequence,
    /// Duration bucket
    Bucket,
    /// Computed during execution, never filterable
    Derived,
}

impl Column {
    /// Canonical column name
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Description => "description",
            Column::Servings => "servings",
            Column::TotalTime => "total_time",
            Column::DurationBucket => "duration_bucket",
            Column::Equipment => "equipment",
            Column::Ingredients => "ingredients",
            Column::Steps => "steps",
            Column::Similarity => "similarity",
            Column::Count => "count",
        }
    }

    /// Parse a column name (case-insensitive, accepts common aliases)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "id" => Some(Column::Id),
            "name" | "title" => Some(Column::Name),
            "description" => Some(Column::Description),
            "servings" => Some(Column::Servings),
            "total_time" | "totaltime" | "time" => Some(Column::TotalTime),
            "duration_bucket" | "duration" => Some(Column::DurationBucket),
            "equipment" => Some(Column::Equipment),
            "ingredients" | "ingredient" => Some(Column::Ingredients),
            "steps" | "step" => Some(Column::Steps),
            "similarity" | "score" => Some(Column::Similarity),
            "count" => Some(Column::Count),
            _ => None,
        }
    }

    /// Comparison kind of this column
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Id | Column::Servings | Column::TotalTime => ColumnKind::Integer,
            Column::Name | Column::Description => ColumnKind::Text,
            Column::Equipment | Column::Ingredients | Column::Steps => ColumnKind::Sequence,
            Column::DurationBucket => ColumnKind::Bucket,
            Column::Similarity | Column::Count => ColumnKind::Derived,
        }
    }

    /// Whether rows can be grouped by this column
    pub fn is_groupable(&self) -> bool {
        !matches!(
            self,
            Column::Id | Column::Description | Column::Steps | Column::Similarity | Column::Count
        )
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal compared against a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// Integer literal
    Int(i64),
    /// Text literal (compared case-insensitively)
    Text(String),
    /// Duration bucket literal
    Bucket(DurationBucket),
}

/// Comparison operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Equality (case-insensitive for text; existential for sequences)
    Eq(Literal),
    /// Inclusive integer range; at least one bound is required
    Range {
        /// Inclusive lower bound
        #[serde(default)]
        min: Option<i64>,
        /// Inclusive upper bound
        #[serde(default)]
        max: Option<i64>,
    },
    /// Case-insensitive substring (existential for sequences)
    Contains(String),
}

/// A single column comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Predicate {
    /// Column compared
    pub column: Column,
    /// Operator and operand
    pub op: Op,
}

impl Predicate {
    /// Equality against an integer
    pub fn eq_int(column: Column, value: i64) -> Self {
        Predicate {
            column,
            op: Op::Eq(Literal::Int(value)),
        }
    }

    /// Equality against text
    pub fn eq_text(column: Column, value: impl Into<String>) -> Self {
        Predicate {
            column,
            op: Op::Eq(Literal::Text(value.into())),
        }
    }

    /// Inclusive range
    pub fn range(column: Column, min: Option<i64>, max: Option<i64>) -> Self {
        Predicate {
            column,
            op: Op::Range { min, max },
        }
    }

    /// Case-insensitive containment
    pub fn contains(column: Column, needle: impl Into<String>) -> Self {
        Predicate {
            column,
            op: Op::Contains(needle.into()),
        }
    }

    /// Duration bucket equality
    pub fn bucket(bucket: DurationBucket) -> Self {
        Predicate {
            column: Column::DurationBucket,
            op: Op::Eq(Literal::Bucket(bucket)),
        }
    }

    fn validate(&self, schema: &SchemaDescriptor) -> Result<()> {
        if !schema.allows_predicate(self.column) {
            return Err(Error::validation(format!(
                "column '{}' cannot be used in a predicate",
                self.column
            )));
        }
        let compatible = match (self.column.kind(), &self.op) {
            (ColumnKind::Integer, Op::Eq(Literal::Int(_))) => true,
            (ColumnKind::Integer, Op::Range { min, max }) => {
                if min.is_none() && max.is_none() {
                    return Err(Error::validation(format!(
                        "range on '{}' needs at least one bound",
                        self.column
                    )));
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(Error::validation(format!(
                            "range on '{}' is empty ({} > {})",
                            self.column, lo, hi
                        )));
                    }
                }
                true
            }
            (ColumnKind::Text | ColumnKind::Sequence, Op::Eq(Literal::Text(s)))
            | (ColumnKind::Text | ColumnKind::Sequence, Op::Contains(s)) => {
                if s.trim().is_empty() {
                    return Err(Error::validation(format!(
                        "empty text operand for '{}'",
                        self.column
                    )));
                }
                true
            }
            (ColumnKind::Bucket, Op::Eq(Literal::Bucket(_))) => true,
            _ => false,
        };
        if !compatible {
            return Err(Error::validation(format!(
                "operator {:?} is not supported on column '{}'",
                self.op, self.column
            )));
        }
        Ok(())
    }
}

/// A filter tree node
///
/// Top-level filters of a plan are combined with AND; `AnyOf` introduces an
/// OR group one level deeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// A single comparison
    Condition(Predicate),
    /// True if any child is true
    AnyOf(Vec<Filter>),
}

impl Filter {
    /// Nesting depth (a condition has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            Filter::Condition(_) => 1,
            Filter::AnyOf(children) => 1 + children.iter().map(Filter::depth).max().unwrap_or(0),
        }
    }

    /// Visit every predicate in the tree
    pub fn predicates(&self) -> Vec<&Predicate> {
        match self {
            Filter::Condition(p) => vec![p],
            Filter::AnyOf(children) => children.iter().flat_map(Filter::predicates).collect(),
        }
    }

    fn validate(&self, schema: &SchemaDescriptor) -> Result<()> {
        if self.depth() > schema.max_depth {
            return Err(Error::validation(format!(
                "filter nesting depth {} exceeds maximum {}",
                self.depth(),
                schema.max_depth
            )));
        }
        match self {
            Filter::Condition(p) => p.validate(schema),
            Filter::AnyOf(children) => {
                if children.is_empty() {
                    return Err(Error::validation("any_of group must not be empty"));
                }
                children.iter().try_for_each(|c| c.validate(schema))
            }
        }
    }
}

impl From<Predicate> for Filter {
    fn from(p: Predicate) -> Self {
        Filter::Condition(p)
    }
}

/// What to rank by similarity against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityQuery {
    /// Text, embedded before execution
    Text(String),
    /// Pre-computed query vector
    Vector(Vec<f32>),
}

/// Similarity ranking clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Similarity {
    /// Query text or vector
    pub query: SimilarityQuery,
    /// Multiplier applied to the reported similarity score
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

/// An unvalidated query plan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Conjunctive filters
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Optional similarity ranking
    #[serde(default)]
    pub similarity: Option<Similarity>,
    /// Optional maximum number of rows
    #[serde(default)]
    pub limit: Option<usize>,
    /// Optional grouping column (rows become `(key, count)`)
    #[serde(default)]
    pub group_by: Option<Column>,
    /// Output columns, in order
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Plan {
    /// Start a plan projecting `columns`
    pub fn select(columns: impl IntoIterator<Item = Column>) -> Self {
        Plan {
            columns: columns.into_iter().collect(),
            ..Plan::default()
        }
    }

    /// Builder: add a conjunctive filter
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Builder: rank by similarity to text
    pub fn similar_to_text(mut self, text: impl Into<String>) -> Self {
        self.similarity = Some(Similarity {
            query: SimilarityQuery::Text(text.into()),
            weight: 1.0,
        });
        self
    }

    /// Builder: rank by similarity to a vector
    pub fn similar_to_vector(mut self, vector: Vec<f32>) -> Self {
        self.similarity = Some(Similarity {
            query: SimilarityQuery::Vector(vector),
            weight: 1.0,
        });
        self
    }

    /// Builder: set the similarity weight (requires a similarity clause)
    pub fn with_weight(mut self, weight: f32) -> Self {
        if let Some(sim) = self.similarity.as_mut() {
            sim.weight = weight;
        }
        self
    }

    /// Builder: set the limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builder: group by a column
    pub fn group_by(mut self, column: Column) -> Self {
        self.group_by = Some(column);
        self
    }

    /// Check the plan against `schema`
    ///
    /// Grouped plans are normalized so their output is exactly
    /// `[group_column, count]`.
    pub fn validate(mut self, schema: &SchemaDescriptor) -> Result<ValidatedPlan> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > schema.max_limit {
                return Err(Error::validation(format!(
                    "limit must be between 1 and {}, got {}",
                    schema.max_limit, limit
                )));
            }
        }

        if let Some(sim) = &self.similarity {
            if !sim.weight.is_finite() || sim.weight <= 0.0 {
                return Err(Error::validation(format!(
                    "similarity weight must be a positive number, got {}",
                    sim.weight
                )));
            }
            match &sim.query {
                SimilarityQuery::Text(t) if t.trim().is_empty() => {
                    return Err(Error::validation("similarity text must not be empty"));
                }
                SimilarityQuery::Vector(v) if v.is_empty() => {
                    return Err(Error::validation("similarity vector must not be empty"));
                }
                SimilarityQuery::Vector(v) => {
                    if let Some(i) = v.iter().position(|x| !x.is_finite()) {
                        return Err(Error::validation(format!(
                            "similarity vector component {} is not finite",
                            i
                        )));
                    }
                }
                _ => {}
            }
        }

        for filter in &self.filters {
            filter.validate(schema)?;
        }

        match self.group_by {
            Some(group) => {
                if !group.is_groupable() || !schema.allows_output(group) {
                    return Err(Error::validation(format!(
                        "cannot group by column '{}'",
                        group
                    )));
                }
                if let Some(bad) = self
                    .columns
                    .iter()
                    .find(|c| **c != group && **c != Column::Count)
                {
                    return Err(Error::validation(format!(
                        "grouped plans can only output '{}' and 'count', got '{}'",
                        group, bad
                    )));
                }
                self.columns = vec![group, Column::Count];
            }
            None => {
                if self.columns.is_empty() {
                    return Err(Error::validation("plan must declare output columns"));
                }
                for column in &self.columns {
                    if !schema.allows_output(*column) {
                        return Err(Error::validation(format!(
                            "column '{}' cannot be output",
                            column
                        )));
                    }
                    if *column == Column::Count {
                        return Err(Error::validation("'count' requires group_by"));
                    }
                    if *column == Column::Similarity && self.similarity.is_none() {
                        return Err(Error::validation(
                            "'similarity' requires a similarity clause",
                        ));
                    }
                }
            }
        }

        Ok(ValidatedPlan(self))
    }
}

/// A plan that passed [`Plan::validate`]
///
/// Fields are read-only; the only permitted change is replacing the
/// similarity text with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedPlan(Plan);

impl ValidatedPlan {
    /// The underlying plan
    pub fn plan(&self) -> &Plan {
        &self.0
    }

    /// Conjunctive filters
    pub fn filters(&self) -> &[Filter] {
        &self.0.filters
    }

    /// Similarity clause
    pub fn similarity(&self) -> Option<&Similarity> {
        self.0.similarity.as_ref()
    }

    /// Limit
    pub fn limit(&self) -> Option<usize> {
        self.0.limit
    }

    /// Group-by column
    pub fn group_by(&self) -> Option<Column> {
        self.0.group_by
    }

    /// Output columns
    pub fn columns(&self) -> &[Column] {
        &self.0.columns
    }

    /// Text of the similarity clause, if it has not been embedded yet
    pub fn similarity_text(&self) -> Option<&str> {
        match self.0.similarity.as_ref().map(|s| &s.query) {
            Some(SimilarityQuery::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// Replace the similarity query with its embedding
    ///
    /// Has no effect on plans without a similarity clause.
    pub fn with_query_vector(mut self, vector: Vec<f32>) -> Self {
        if let Some(sim) = self.0.similarity.as_mut() {
            sim.query = SimilarityQuery::Vector(vector);
        }
        self
    }

    /// Unwrap into the plain plan
    pub fn into_inner(self) -> Plan {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::default()
    }

    #[test]
    fn test_simple_plan_validates() {
        let plan = Plan::select([Column::Id, Column::Name])
            .filter(Predicate::contains(Column::Ingredients, "potato"))
            .limit(5);
        let validated = plan.validate(&schema()).unwrap();
        assert_eq!(validated.columns(), &[Column::Id, Column::Name]);
        assert_eq!(validated.limit(), Some(5));
    }

    #[test]
    fn test_empty_columns_rejected() {
        let err = Plan::default().validate(&schema()).unwrap_err();
        assert!(err.to_string().contains("output columns"));
    }

    #[test]
    fn test_limit_bounds() {
        let s = schema();
        assert!(Plan::select([Column::Id]).limit(0).validate(&s).is_err());
        assert!(Plan::select([Column::Id])
            .limit(s.max_limit + 1)
            .validate(&s)
            .is_err());
        assert!(Plan::select([Column::Id])
            .limit(s.max_limit)
            .validate(&s)
            .is_ok());
    }

    #[test]
    fn test_operator_column_compatibility() {
        let s = schema();
        // Range on text
        assert!(Plan::select([Column::Id])
            .filter(Predicate::range(Column::Name, Some(1), None))
            .validate(&s)
            .is_err());
        // Contains on integer
        assert!(Plan::select([Column::Id])
            .filter(Predicate::contains(Column::Servings, "4"))
            .validate(&s)
            .is_err());
        // Bucket literal on bucket column
        assert!(Plan::select([Column::Id])
            .filter(Predicate::bucket(DurationBucket::Short))
            .validate(&s)
            .is_ok());
        // Text literal on bucket column
        assert!(Plan::select([Column::Id])
            .filter(Predicate::eq_text(Column::DurationBucket, "short"))
            .validate(&s)
            .is_err());
    }

    #[test]
    fn test_range_needs_a_bound_and_order() {
        let s = schema();
        assert!(Plan::select([Column::Id])
            .filter(Predicate::range(Column::TotalTime, None, None))
            .validate(&s)
            .is_err());
        assert!(Plan::select([Column::Id])
            .filter(Predicate::range(Column::TotalTime, Some(60), Some(30)))
            .validate(&s)
            .is_err());
    }

    #[test]
    fn test_derived_columns_not_filterable() {
        let plan = Plan::select([Column::Id]).filter(Predicate::eq_int(Column::Count, 3));
        assert!(plan.validate(&schema()).is_err());
    }

    #[test]
    fn test_nesting_depth_enforced() {
        let inner = Filter::AnyOf(vec![
            Predicate::contains(Column::Ingredients, "kale").into(),
            Predicate::contains(Column::Ingredients, "spinach").into(),
        ]);
        let ok = Plan::select([Column::Id]).filter(inner.clone());
        assert!(ok.validate(&schema()).is_ok());

        let too_deep = Plan::select([Column::Id]).filter(Filter::AnyOf(vec![inner]));
        let err = too_deep.validate(&schema()).unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn test_empty_any_of_rejected() {
        let plan = Plan::select([Column::Id]).filter(Filter::AnyOf(vec![]));
        assert!(plan.validate(&schema()).is_err());
    }

    #[test]
    fn test_similarity_column_requires_clause() {
        let s = schema();
        assert!(Plan::select([Column::Name, Column::Similarity])
            .validate(&s)
            .is_err());
        assert!(Plan::select([Column::Name, Column::Similarity])
            .similar_to_text("potatoes")
            .validate(&s)
            .is_ok());
    }

    #[test]
    fn test_similarity_weight_must_be_positive() {
        let plan = Plan::select([Column::Name])
            .similar_to_text("potatoes")
            .with_weight(0.0);
        assert!(plan.validate(&schema()).is_err());
    }

    #[test]
    fn test_similarity_vector_must_be_finite() {
        let s = schema();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let err = Plan::select([Column::Name])
                .similar_to_vector(vec![0.5, bad, 0.5])
                .validate(&s)
                .unwrap_err();
            assert!(err.is_validation_error());
            assert!(err.to_string().contains("component 1"));
        }
        assert!(Plan::select([Column::Name])
            .similar_to_vector(vec![0.5, -0.25, 0.0])
            .validate(&s)
            .is_ok());
    }

    #[test]
    fn test_group_by_normalizes_columns() {
        let validated = Plan::default()
            .group_by(Column::DurationBucket)
            .validate(&schema())
            .unwrap();
        assert_eq!(
            validated.columns(),
            &[Column::DurationBucket, Column::Count]
        );
    }

    #[test]
    fn test_group_by_rejects_foreign_columns() {
        let plan = Plan::select([Column::Name, Column::Count]).group_by(Column::Servings);
        assert!(plan.validate(&schema()).is_err());
    }

    #[test]
    fn test_count_requires_group_by() {
        assert!(Plan::select([Column::Count]).validate(&schema()).is_err());
    }

    #[test]
    fn test_group_by_non_groupable() {
        assert!(Plan::default()
            .group_by(Column::Description)
            .validate(&schema())
            .is_err());
    }

    #[test]
    fn test_schema_restricts_columns() {
        let mut s = schema();
        s.output_columns.retain(|c| *c != Column::Steps);
        s.predicate_columns.retain(|c| *c != Column::Equipment);
        assert!(Plan::select([Column::Steps]).validate(&s).is_err());
        assert!(Plan::select([Column::Id])
            .filter(Predicate::contains(Column::Equipment, "oven"))
            .validate(&s)
            .is_err());
    }

    #[test]
    fn test_with_query_vector_replaces_text() {
        let validated = Plan::select([Column::Name])
            .similar_to_text("soup")
            .validate(&schema())
            .unwrap();
        assert_eq!(validated.similarity_text(), Some("soup"));
        let embedded = validated.with_query_vector(vec![1.0, 0.0]);
        assert_eq!(embedded.similarity_text(), None);
        assert_eq!(
            embedded.similarity().unwrap().query,
            SimilarityQuery::Vector(vec![1.0, 0.0])
        );
    }

    #[test]
    fn test_plan_json_rejects_unknown_fields() {
        let json = r#"{"columns": ["name"], "delete": true}"#;
        assert!(serde_json::from_str::<Plan>(json).is_err());
    }

    #[test]
    fn test_column_parse_aliases() {
        assert_eq!(Column::parse("totalTime"), Some(Column::TotalTime));
        assert_eq!(Column::parse("Ingredient"), Some(Column::Ingredients));
        assert_eq!(Column::parse("password"), None);
    }
}
