//! `group_by` aggregation
//!
//! Rows are `(group_key, count)`, sorted by count descending then key
//! ascending. Sequence columns contribute each distinct case-folded element
//! once per record.

use pantry_core::{BucketThresholds, Column, Recipe, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Group key; integer columns sort numerically
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    /// Integer column value
    Int(i64),
    /// Text value (case-folded for sequence columns)
    Text(String),
}

impl From<GroupKey> for Value {
    fn from(key: GroupKey) -> Self {
        match key {
            GroupKey::Int(n) => Value::Int(n),
            GroupKey::Text(s) => Value::Text(s),
        }
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Distinct group keys one record contributes
pub fn keys_for(recipe: &Recipe, column: Column, buckets: &BucketThresholds) -> BTreeSet<GroupKey> {
    let f = &recipe.fields;
    let mut keys = BTreeSet::new();
    match column {
        Column::Name => {
            keys.insert(GroupKey::Text(f.name.clone()));
        }
        Column::Servings => {
            keys.insert(GroupKey::Int(f.servings));
        }
        Column::TotalTime => {
            keys.insert(GroupKey::Int(f.total_time));
        }
        Column::DurationBucket => {
            keys.insert(GroupKey::Text(
                buckets.bucket(f.total_time).as_str().to_string(),
            ));
        }
        Column::Equipment => keys.extend(f.equipment.iter().map(|e| GroupKey::Text(fold(e)))),
        Column::Ingredients => {
            keys.extend(f.ingredients.iter().map(|i| GroupKey::Text(fold(&i.item))))
        }
        _ => {}
    }
    keys
}

/// Count records per group key
pub fn group_counts<'a>(
    recipes: impl IntoIterator<Item = &'a Recipe>,
    column: Column,
    buckets: &BucketThresholds,
) -> Vec<(GroupKey, u64)> {
    let mut counts: BTreeMap<GroupKey, u64> = BTreeMap::new();
    for recipe in recipes {
        for key in keys_for(recipe, column, buckets) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    let mut groups: Vec<(GroupKey, u64)> = counts.into_iter().collect();
    // BTreeMap order is key ascending; a stable sort on count keeps it for ties
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{Ingredient, RecipeFields, RecordId};

    fn recipe(id: u64, total_time: i64, equipment: &[&str], items: &[&str]) -> Recipe {
        Recipe::new(
            RecordId::new(id),
            RecipeFields {
                name: format!("Recipe {}", id),
                description: "desc".into(),
                servings: 2,
                total_time,
                equipment: equipment.iter().map(|s| s.to_string()).collect(),
                ingredients: items.iter().map(|i| Ingredient::counted(*i, 1.0)).collect(),
                steps: vec!["Cook.".into()],
            },
        )
    }

    #[test]
    fn test_sequence_elements_counted_once_per_record() {
        let recipes = vec![
            recipe(1, 20, &["Pot", "pot", "Pan"], &["Salt"]),
            recipe(2, 40, &["POT"], &["Salt", "Pepper"]),
            recipe(3, 90, &["Wok"], &["pepper"]),
        ];
        let groups = group_counts(&recipes, Column::Equipment, &BucketThresholds::default());
        assert_eq!(
            groups,
            vec![
                (GroupKey::Text("pot".into()), 2),
                (GroupKey::Text("pan".into()), 1),
                (GroupKey::Text("wok".into()), 1),
            ]
        );
    }

    #[test]
    fn test_ties_sorted_by_key() {
        let recipes = vec![
            recipe(1, 20, &[], &["Salt", "Pepper"]),
            recipe(2, 90, &[], &["pepper", "salt"]),
        ];
        let groups = group_counts(&recipes, Column::Ingredients, &BucketThresholds::default());
        assert_eq!(
            groups,
            vec![
                (GroupKey::Text("pepper".into()), 2),
                (GroupKey::Text("salt".into()), 2),
            ]
        );
    }

    #[test]
    fn test_bucket_and_integer_groups() {
        let recipes = vec![recipe(1, 20, &[], &[]), recipe(2, 25, &[], &[]), recipe(3, 90, &[], &[])];
        let buckets = BucketThresholds::default();
        assert_eq!(
            group_counts(&recipes, Column::DurationBucket, &buckets),
            vec![
                (GroupKey::Text("short".into()), 2),
                (GroupKey::Text("long".into()), 1),
            ]
        );
        let by_time = group_counts(&recipes, Column::TotalTime, &buckets);
        assert_eq!(by_time[0], (GroupKey::Int(20), 1));
        assert_eq!(by_time[2], (GroupKey::Int(90), 1));
    }
}
