//! Common test utilities for integration tests

use pantry::{DistanceMetric, HashEmbedder, Ingredient, Pantry, PantryConfig, RecipeFields};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const DIM: usize = 64;

/// Route `tracing` output to the test harness; `RUST_LOG=pantry=debug` to see it
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn embedder() -> Arc<HashEmbedder> {
    Arc::new(HashEmbedder::new(DIM))
}

pub fn config() -> PantryConfig {
    init_tracing();
    let mut config = PantryConfig::with_dimension(DIM);
    config.metric = DistanceMetric::Cosine;
    config
}

/// In-memory pantry with the test config
pub fn create_pantry() -> Pantry {
    Pantry::ephemeral(config(), embedder()).unwrap()
}

/// A valid recipe whose fields vary with `i`
pub fn recipe(i: usize) -> RecipeFields {
    const DISHES: &[&str] = &["soup", "stew", "salad", "pie", "curry", "bread"];
    const MAINS: &[&str] = &["potatoes", "lentils", "leeks", "apples", "rice"];
    let dish = DISHES[i % DISHES.len()];
    let main = MAINS[i % MAINS.len()];
    RecipeFields {
        name: format!("{} {} {}", main, dish, i),
        description: format!("A simple {} built around {}", dish, main),
        servings: 1 + (i % 6) as i64,
        total_time: 10 + ((i * 17) % 150) as i64,
        equipment: vec![if i % 2 == 0 { "Oven" } else { "Large pot" }.to_string()],
        ingredients: vec![
            Ingredient::new(main, 300.0, "grams"),
            Ingredient::counted("Onion", 1.0),
        ],
        steps: vec!["Prepare.".into(), "Cook.".into()],
    }
}

/// Append `n` recipes built by [`recipe`]
pub fn fill(pantry: &Pantry, n: usize) {
    for i in 0..n {
        pantry.add_recipe(recipe(i)).unwrap();
    }
}
