//! Output enum for command execution results.
//!
//! Every command produces exactly one output type. This mapping is deterministic:
//! the same command always produces the same output variant (though the values
//! may differ based on database state).
//!
//! Query results are a [`ResultSet`] of [`Row`]s. A row keeps its columns in
//! plan order and serializes as a JSON object.

use pantry_core::{Plan, Recipe, Value};
use pantry_engine::IndexStats;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One result row: ordered `(column, value)` pairs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    /// Empty row
    pub fn new() -> Self {
        Row { cells: Vec::new() }
    }

    /// Append a cell
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.cells.push((column.into(), value));
    }

    /// Value of `column`
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Cells in order
    pub fn cells(&self) -> &[(String, Value)] {
        &self.cells
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> serde::de::Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of column names to values")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    row.push(name, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Rows returned by a query, with their column names
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    /// Output column names in order
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Values of one column, in row order
    pub fn column(&self, name: &str) -> Vec<&Value> {
        self.rows.iter().filter_map(|r| r.get(name)).collect()
    }

    /// Serialize to a JSON array of row objects
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.rows)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// How a plan would be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Ascending-id scan over every record
    FullScan,
    /// Vector index probe, then filtering of the candidates
    SimilarityProbe,
}

/// Cost estimate returned by `explain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEstimate {
    /// Execution strategy
    pub strategy: Strategy,
    /// Clusters probed (0 for scans and for an unclustered index)
    pub clusters_probed: usize,
    /// Centroids plus member vectors scored
    pub vectors_compared: usize,
    /// Candidates requested from the index
    pub candidates_fetched: usize,
    /// Records the filters run against
    pub records_examined: usize,
}

/// A recipe returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarHit {
    /// The recipe
    pub recipe: Recipe,
    /// Similarity score (higher is closer)
    pub score: f32,
}

/// Successful command execution results.
///
/// Each [`Command`](crate::Command) variant maps to exactly one `Output` variant.
///
/// # Example
///
/// ```text
/// use pantry_executor::{Command, Output, Executor};
///
/// match executor.execute(Command::CountRecipes)? {
///     Output::Uint(n) => println!("{} recipes", n),
///     _ => unreachable!("CountRecipes always returns Uint"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// Id of a newly appended recipe
    RecipeId(u64),

    /// Ids of appended recipes, in input order
    RecipeIds(Vec<u64>),

    /// A single recipe
    Recipe(Recipe),

    /// Recipes in id order
    Recipes(Vec<Recipe>),

    /// Unsigned integer result (for count operations)
    Uint(u64),

    /// Ranked similarity hits
    Hits(Vec<SimilarHit>),

    /// Query result rows
    Rows(ResultSet),

    /// Query cost estimate
    Estimate(PlanEstimate),

    /// A validated plan
    Plan(Plan),

    /// Vector index statistics
    IndexStats(IndexStats),
}
