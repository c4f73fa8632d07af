//! Proposal parser
//!
//! A proposer answers with free text that should contain one JSON object.
//! [`extract_json`] finds it, [`parse_proposal`] reads it with a closed
//! grammar (unknown fields are errors) and [`Proposal::into_plan`] turns it
//! into an unvalidated [`Plan`]. The grammar has no way to express a write;
//! a proposer asked for one answers `{"refuse": "<reason>"}` instead.
//!
//! ```json
//! {
//!   "columns": ["name", "total_time"],
//!   "filters": [
//!     {"column": "ingredients", "op": "contains", "value": "potato"},
//!     {"any_of": [
//!       {"column": "duration", "op": "eq", "value": "quick"},
//!       {"column": "servings", "op": "gte", "value": 4}
//!     ]}
//!   ],
//!   "similar_to": "hearty winter stew",
//!   "limit": 5
//! }
//! ```

use super::buckets::bucket_for_phrase;
use super::TranslateError;
use pantry_core::{Column, ColumnKind, Filter, Plan, Predicate};
use serde::Deserialize;
use serde_json::Value as Json;

/// Top-level proposal
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Proposal {
    /// Output column names
    #[serde(default)]
    pub columns: Vec<String>,
    /// Conjunctive filters
    #[serde(default)]
    pub filters: Vec<ProposedFilter>,
    /// Text to rank by similarity
    #[serde(default)]
    pub similar_to: Option<String>,
    /// Weight applied to the similarity score
    #[serde(default)]
    pub similarity_weight: Option<f32>,
    /// Maximum number of rows
    #[serde(default)]
    pub limit: Option<u64>,
    /// Column to group and count by
    #[serde(default)]
    pub group_by: Option<String>,
    /// Set when the proposer declines the request
    #[serde(default)]
    pub refuse: Option<String>,
}

/// A filter: a single condition or an OR group
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProposedFilter {
    /// `{"any_of": [...]}`
    AnyOf(AnyOfGroup),
    /// `{"column": ..., "op": ..., "value": ...}`
    Condition(ProposedCondition),
}

/// OR group
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnyOfGroup {
    /// Alternatives
    pub any_of: Vec<ProposedFilter>,
}

/// Single comparison
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProposedCondition {
    /// Column name (aliases accepted)
    pub column: String,
    /// Operator name
    pub op: String,
    /// Operand for eq/contains/lt/lte/gt/gte, or `[lo, hi]` for between
    #[serde(default)]
    pub value: Option<Json>,
    /// Lower bound for between
    #[serde(default)]
    pub min: Option<i64>,
    /// Upper bound for between
    #[serde(default)]
    pub max: Option<i64>,
}

/// Find the first JSON object in a model response.
///
/// Code fences are skipped; braces inside strings are ignored.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a proposal object with the closed grammar
pub fn parse_proposal(json: &str) -> Result<Proposal, TranslateError> {
    serde_json::from_str(json).map_err(|e| TranslateError::Parse(e.to_string()))
}

/// Extract and parse in one step
pub fn parse_response(response: &str) -> Result<Proposal, TranslateError> {
    let json = extract_json(response)
        .ok_or_else(|| TranslateError::Parse("response contains no JSON object".into()))?;
    parse_proposal(json)
}

fn column(name: &str) -> Result<Column, TranslateError> {
    Column::parse(name).ok_or_else(|| TranslateError::UnknownColumn(name.to_string()))
}

fn invalid(column: &str, detail: impl Into<String>) -> TranslateError {
    TranslateError::InvalidValue {
        column: column.to_string(),
        detail: detail.into(),
    }
}

fn as_int(column: &str, value: Option<&Json>) -> Result<i64, TranslateError> {
    match value {
        Some(Json::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| invalid(column, format!("{} is not an integer", n))),
        Some(Json::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(column, format!("'{}' is not an integer", s))),
        Some(other) => Err(invalid(column, format!("expected an integer, got {}", other))),
        None => Err(invalid(column, "missing value")),
    }
}

fn as_text(column: &str, value: Option<&Json>) -> Result<String, TranslateError> {
    match value {
        Some(Json::String(s)) => Ok(s.clone()),
        Some(Json::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(invalid(column, format!("expected text, got {}", other))),
        None => Err(invalid(column, "missing value")),
    }
}

fn duration_bucket(column: &str, value: Option<&Json>) -> Result<Predicate, TranslateError> {
    let phrase = as_text(column, value)?;
    bucket_for_phrase(&phrase)
        .map(Predicate::bucket)
        .ok_or_else(|| invalid(column, format!("'{}' is not a duration", phrase)))
}

impl ProposedCondition {
    fn into_predicate(self) -> Result<Predicate, TranslateError> {
        let col = column(&self.column)?;
        let name = self.column.as_str();
        let op = self.op.trim().to_lowercase();
        let value = self.value.as_ref();

        // "total_time = quick" means the bucket, not a minute count
        let phrase_on_time = col == Column::TotalTime
            && matches!(value, Some(Json::String(s)) if s.trim().parse::<i64>().is_err());

        match op.as_str() {
            "eq" | "equals" | "=" | "==" | "is" => match col.kind() {
                ColumnKind::Bucket => duration_bucket(name, value),
                ColumnKind::Integer if phrase_on_time => duration_bucket(name, value),
                ColumnKind::Integer => Ok(Predicate::eq_int(col, as_int(name, value)?)),
                _ => Ok(Predicate::eq_text(col, as_text(name, value)?)),
            },
            "contains" | "like" | "includes" | "has" => match col.kind() {
                ColumnKind::Bucket => duration_bucket(name, value),
                ColumnKind::Integer if phrase_on_time => duration_bucket(name, value),
                _ => Ok(Predicate::contains(col, as_text(name, value)?)),
            },
            "between" | "range" => {
                let (min, max) = match value {
                    Some(Json::Array(bounds)) if bounds.len() == 2 => (
                        Some(as_int(name, bounds.first())?),
                        Some(as_int(name, bounds.get(1))?),
                    ),
                    Some(other) => {
                        return Err(invalid(name, format!("expected [min, max], got {}", other)))
                    }
                    None => (self.min, self.max),
                };
                Ok(Predicate::range(col, min, max))
            }
            "lt" | "<" => {
                let bound = as_int(name, value)?.saturating_sub(1);
                Ok(Predicate::range(col, None, Some(bound)))
            }
            "lte" | "<=" => Ok(Predicate::range(col, None, Some(as_int(name, value)?))),
            "gt" | ">" => {
                let bound = as_int(name, value)?.saturating_add(1);
                Ok(Predicate::range(col, Some(bound), None))
            }
            "gte" | ">=" => Ok(Predicate::range(col, Some(as_int(name, value)?), None)),
            _ => Err(TranslateError::UnsupportedOperator {
                column: self.column.clone(),
                op: self.op.clone(),
            }),
        }
    }
}

impl ProposedFilter {
    fn into_filter(self) -> Result<Filter, TranslateError> {
        match self {
            ProposedFilter::Condition(c) => Ok(Filter::Condition(c.into_predicate()?)),
            ProposedFilter::AnyOf(group) => Ok(Filter::AnyOf(
                group
                    .any_of
                    .into_iter()
                    .map(ProposedFilter::into_filter)
                    .collect::<Result<_, _>>()?,
            )),
        }
    }
}

impl Proposal {
    /// Convert to an unvalidated plan.
    ///
    /// Without explicit columns the plan projects `id` and `name` (plus
    /// `similarity` when ranking). Grouped plans always project
    /// `[group, count]`.
    pub fn into_plan(self) -> Result<Plan, TranslateError> {
        if let Some(reason) = self.refuse {
            return Err(TranslateError::Refused(reason));
        }
        let group_by = self.group_by.as_deref().map(column).transpose()?;
        let mut columns = self
            .columns
            .iter()
            .map(|c| column(c))
            .collect::<Result<Vec<_>, _>>()?;

        let ranking = self
            .similar_to
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if let Some(group) = group_by {
            columns = vec![group, Column::Count];
        } else if columns.is_empty() {
            columns = vec![Column::Id, Column::Name];
            if ranking.is_some() {
                columns.push(Column::Similarity);
            }
        }

        let mut plan = Plan::select(columns);
        for filter in self.filters {
            plan = plan.filter(filter.into_filter()?);
        }
        if let Some(text) = ranking {
            plan = plan.similar_to_text(text);
            if let Some(weight) = self.similarity_weight {
                plan = plan.with_weight(weight);
            }
        }
        if let Some(limit) = self.limit {
            let limit = usize::try_from(limit)
                .map_err(|_| TranslateError::Invalid(format!("limit {} is too large", limit)))?;
            plan = plan.limit(limit);
        }
        if let Some(group) = group_by {
            plan = plan.group_by(group);
        }
        Ok(plan)
    }
}
