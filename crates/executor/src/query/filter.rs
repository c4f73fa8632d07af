//! Predicate evaluation and projection
//!
//! Text comparisons are case-insensitive. Sequence columns (equipment,
//! ingredients, steps) are existential: a predicate holds when any element
//! satisfies it. Ingredients compare on their item name.

use pantry_core::{
    BucketThresholds, Column, Filter, Literal, Op, Predicate, Recipe, Value,
};

/// Whether `recipe` satisfies every filter (an empty list matches all)
pub fn matches_all(recipe: &Recipe, filters: &[Filter], buckets: &BucketThresholds) -> bool {
    filters.iter().all(|f| matches_filter(recipe, f, buckets))
}

/// Whether `recipe` satisfies one filter tree
pub fn matches_filter(recipe: &Recipe, filter: &Filter, buckets: &BucketThresholds) -> bool {
    match filter {
        Filter::Condition(p) => matches_predicate(recipe, p, buckets),
        Filter::AnyOf(alternatives) => alternatives
            .iter()
            .any(|f| matches_filter(recipe, f, buckets)),
    }
}

fn integer(recipe: &Recipe, column: Column) -> Option<i64> {
    match column {
        Column::Id => i64::try_from(recipe.id.as_u64()).ok(),
        Column::Servings => Some(recipe.fields.servings),
        Column::TotalTime => Some(recipe.fields.total_time),
        _ => None,
    }
}

fn texts(recipe: &Recipe, column: Column) -> Vec<&str> {
    let f = &recipe.fields;
    match column {
        Column::Name => vec![f.name.as_str()],
        Column::Description => vec![f.description.as_str()],
        Column::Equipment => f.equipment.iter().map(String::as_str).collect(),
        Column::Ingredients => f.ingredients.iter().map(|i| i.item.as_str()).collect(),
        Column::Steps => f.steps.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Whether `recipe` satisfies a single predicate
pub fn matches_predicate(recipe: &Recipe, predicate: &Predicate, buckets: &BucketThresholds) -> bool {
    let column = predicate.column;
    match &predicate.op {
        Op::Eq(Literal::Int(n)) => integer(recipe, column) == Some(*n),
        Op::Eq(Literal::Bucket(b)) => {
            column == Column::DurationBucket && buckets.bucket(recipe.fields.total_time) == *b
        }
        Op::Eq(Literal::Text(needle)) => {
            let needle = needle.trim().to_lowercase();
            texts(recipe, column)
                .iter()
                .any(|t| t.trim().to_lowercase() == needle)
        }
        Op::Contains(needle) => {
            let needle = needle.trim().to_lowercase();
            texts(recipe, column)
                .iter()
                .any(|t| t.to_lowercase().contains(&needle))
        }
        Op::Range { min, max } => match integer(recipe, column) {
            Some(v) => min.map_or(true, |lo| v >= lo) && max.map_or(true, |hi| v <= hi),
            None => false,
        },
    }
}

/// Value of `column` for `recipe`.
///
/// `similarity` is the weighted score when the plan ranks by similarity.
/// `count` has no per-record value and projects as null.
pub fn project(
    recipe: &Recipe,
    column: Column,
    similarity: Option<f32>,
    buckets: &BucketThresholds,
) -> Value {
    let f = &recipe.fields;
    match column {
        Column::Id => i64::try_from(recipe.id.as_u64()).map_or(Value::Null, Value::Int),
        Column::Name => Value::Text(f.name.clone()),
        Column::Description => Value::Text(f.description.clone()),
        Column::Servings => Value::Int(f.servings),
        Column::TotalTime => Value::Int(f.total_time),
        Column::DurationBucket => Value::Text(buckets.bucket(f.total_time).as_str().to_string()),
        Column::Equipment => Value::List(f.equipment.clone()),
        Column::Ingredients => Value::Ingredients(f.ingredients.clone()),
        Column::Steps => Value::List(f.steps.clone()),
        Column::Similarity => similarity.map_or(Value::Null, |s| Value::Float(s as f64)),
        Column::Count => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{DurationBucket, Ingredient, RecipeFields, RecordId};

    fn recipe() -> Recipe {
        Recipe::new(
            RecordId::new(3),
            RecipeFields {
                name: "Stamppot Boerenkool".into(),
                description: "Dutch mash of potatoes and kale".into(),
                servings: 4,
                total_time: 45,
                equipment: vec!["Large pot".into(), "Potato masher".into()],
                ingredients: vec![
                    Ingredient::new("Potatoes", 1.0, "kg"),
                    Ingredient::new("Kale", 500.0, "grams"),
                ],
                steps: vec!["Boil the potatoes.".into(), "Mash with kale.".into()],
            },
        )
    }

    fn check(p: Predicate) -> bool {
        matches_predicate(&recipe(), &p, &BucketThresholds::default())
    }

    #[test]
    fn test_integer_predicates() {
        assert!(check(Predicate::eq_int(Column::Servings, 4)));
        assert!(!check(Predicate::eq_int(Column::Servings, 2)));
        assert!(check(Predicate::eq_int(Column::Id, 3)));
        assert!(check(Predicate::range(Column::TotalTime, Some(45), Some(45))));
        assert!(check(Predicate::range(Column::TotalTime, None, Some(60))));
        assert!(!check(Predicate::range(Column::TotalTime, Some(46), None)));
    }

    #[test]
    fn test_text_predicates_ignore_case() {
        assert!(check(Predicate::eq_text(Column::Name, "stamppot boerenkool")));
        assert!(!check(Predicate::eq_text(Column::Name, "stamppot")));
        assert!(check(Predicate::contains(Column::Description, "POTATOES")));
    }

    #[test]
    fn test_sequence_predicates_are_existential() {
        assert!(check(Predicate::contains(Column::Ingredients, "potato")));
        assert!(check(Predicate::eq_text(Column::Ingredients, "kale")));
        assert!(!check(Predicate::eq_text(Column::Ingredients, "kal")));
        assert!(check(Predicate::contains(Column::Equipment, "masher")));
        assert!(check(Predicate::contains(Column::Steps, "boil")));
        assert!(!check(Predicate::contains(Column::Equipment, "wok")));
    }

    #[test]
    fn test_bucket_predicate() {
        assert!(check(Predicate::bucket(DurationBucket::Medium)));
        assert!(!check(Predicate::bucket(DurationBucket::Short)));
        let tight = BucketThresholds {
            short_max_minutes: 50,
            medium_max_minutes: 90,
        };
        assert!(matches_predicate(
            &recipe(),
            &Predicate::bucket(DurationBucket::Short),
            &tight
        ));
    }

    #[test]
    fn test_any_of_and_conjunction() {
        let buckets = BucketThresholds::default();
        let either = Filter::AnyOf(vec![
            Predicate::contains(Column::Equipment, "wok").into(),
            Predicate::contains(Column::Equipment, "pot").into(),
        ]);
        assert!(matches_filter(&recipe(), &either, &buckets));
        let both = vec![either, Predicate::eq_int(Column::Servings, 2).into()];
        assert!(!matches_all(&recipe(), &both, &buckets));
        assert!(matches_all(&recipe(), &[], &buckets));
    }

    #[test]
    fn test_project() {
        let buckets = BucketThresholds::default();
        let r = recipe();
        assert_eq!(project(&r, Column::Id, None, &buckets), Value::Int(3));
        assert_eq!(
            project(&r, Column::DurationBucket, None, &buckets),
            Value::Text("medium".into())
        );
        assert_eq!(project(&r, Column::Similarity, None, &buckets), Value::Null);
        assert_eq!(
            project(&r, Column::Similarity, Some(0.5), &buckets),
            Value::Float(0.5)
        );
        assert_eq!(
            project(&r, Column::Equipment, None, &buckets),
            Value::List(vec!["Large pot".into(), "Potato masher".into()])
        );
    }

    #[test]
    fn test_id_beyond_i64_projects_null_and_never_matches() {
        let buckets = BucketThresholds::default();
        let mut r = recipe();
        r.id = RecordId::new(u64::MAX);
        assert_eq!(project(&r, Column::Id, None, &buckets), Value::Null);
        assert!(!matches_predicate(&r, &Predicate::eq_int(Column::Id, -1), &buckets));
    }
}
