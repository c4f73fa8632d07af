//! Concurrency Tests
//!
//! Readers run while a writer appends; every read sees a consistent prefix.

use crate::common::*;
use pantry::{Column, Plan, Predicate};
use std::sync::Arc;
use std::thread;

#[test]
fn readers_during_appends_see_ascending_prefixes() {
    let pantry = Arc::new(create_pantry());
    fill(&pantry, 10);

    thread::scope(|s| {
        let writer = Arc::clone(&pantry);
        s.spawn(move || {
            for i in 10..110 {
                writer.add_recipe(recipe(i)).unwrap();
            }
        });

        for _ in 0..4 {
            let reader = Arc::clone(&pantry);
            s.spawn(move || {
                for _ in 0..25 {
                    let ids: Vec<u64> = reader.scan(|_| true).map(|r| r.id.as_u64()).collect();
                    assert!(ids.len() >= 10);
                    assert_eq!(ids, (1..=ids.len() as u64).collect::<Vec<_>>());

                    let hits = reader.similar("leek soup", 3).unwrap();
                    assert!(!hits.is_empty());
                    assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
                }
            });
        }
    });

    assert_eq!(pantry.count().unwrap(), 110);
}

#[test]
fn lazy_build_happens_once_population_is_reached() {
    let pantry = create_pantry();
    let threshold = pantry.database().config().index.min_build_population;
    fill(&pantry, threshold - 1);
    assert!(!pantry.index_stats().unwrap().built);

    pantry.add_recipe(recipe(threshold)).unwrap();
    let stats = pantry.index_stats().unwrap();
    assert!(stats.built);
    assert_eq!(stats.len, threshold);
    assert_eq!(stats.cluster_sizes.iter().sum::<usize>(), threshold);
}

#[test]
fn concurrent_plans_agree() {
    let pantry = Arc::new(create_pantry());
    fill(&pantry, 60);
    let plan = Plan::select([Column::Name])
        .filter(Predicate::contains(Column::Equipment, "oven"))
        .similar_to_text("apple pie")
        .limit(5);
    let expected = pantry.execute(plan.clone()).unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            let pantry = Arc::clone(&pantry);
            let plan = plan.clone();
            let expected = &expected;
            s.spawn(move || {
                for _ in 0..10 {
                    assert_eq!(&pantry.execute(plan.clone()).unwrap(), expected);
                }
            });
        }
    });
}
