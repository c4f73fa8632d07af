//! Plan Tests
//!
//! Filter-only plans return exactly the records a filtered scan returns,
//! in ascending id order.

use crate::common::*;
use pantry::{Column, Filter, Plan, Predicate, Recipe, Value};
use proptest::prelude::*;

fn ids_of(rows: &pantry::ResultSet) -> Vec<u64> {
    rows.column("id")
        .iter()
        .filter_map(|v| v.as_int())
        .map(|id| id as u64)
        .collect()
}

fn scan_ids(recipes: &[Recipe], keep: impl Fn(&Recipe) -> bool) -> Vec<u64> {
    recipes
        .iter()
        .filter(|r| keep(r))
        .map(|r| r.id.as_u64())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn range_filters_match_scan(min in 1i64..160, span in 0i64..120, servings in 1i64..7) {
        let pantry = create_pantry();
        fill(&pantry, 40);
        let recipes = pantry.recipes().unwrap();
        let max = min + span;

        let rows = pantry
            .execute(
                Plan::select([Column::Id])
                    .filter(Predicate::range(Column::TotalTime, Some(min), Some(max)))
                    .filter(Predicate::range(Column::Servings, Some(servings), None)),
            )
            .unwrap();
        let expected = scan_ids(&recipes, |r| {
            (min..=max).contains(&r.fields.total_time) && r.fields.servings >= servings
        });
        prop_assert_eq!(ids_of(&rows), expected);
    }

    #[test]
    fn any_of_matches_scan(needle in prop::sample::select(vec!["potato", "LENTIL", "leek", "rice"]),
                           servings in 1i64..7) {
        let pantry = create_pantry();
        fill(&pantry, 30);
        let recipes = pantry.recipes().unwrap();

        let rows = pantry
            .execute(Plan::select([Column::Id]).filter(Filter::AnyOf(vec![
                Predicate::contains(Column::Ingredients, needle).into(),
                Predicate::eq_int(Column::Servings, servings).into(),
            ])))
            .unwrap();
        let lowered = needle.to_lowercase();
        let expected = scan_ids(&recipes, |r| {
            r.fields.ingredients.iter().any(|i| i.item.to_lowercase().contains(&lowered))
                || r.fields.servings == servings
        });
        prop_assert_eq!(ids_of(&rows), expected);
    }
}

#[test]
fn projected_columns_follow_plan_order() {
    let pantry = create_pantry();
    fill(&pantry, 3);
    let rows = pantry
        .execute(Plan::select([Column::Servings, Column::Name, Column::Equipment]).limit(1))
        .unwrap();
    assert_eq!(rows.columns, vec!["servings", "name", "equipment"]);
    assert_eq!(
        rows.to_json().unwrap(),
        r#"[{"servings":1,"name":"potatoes soup 0","equipment":["Oven"]}]"#
    );
    assert_eq!(rows.rows[0].get("servings"), Some(&Value::Int(1)));
}
