//! Executor-level tests over an ephemeral database

mod commands;

use crate::Pantry;
use pantry_core::{Ingredient, RecipeFields};
use pantry_engine::{DistanceMetric, PantryConfig};
use pantry_intelligence::HashEmbedder;
use std::sync::Arc;

pub(crate) const DIM: usize = 256;

fn recipe(
    name: &str,
    description: &str,
    servings: i64,
    total_time: i64,
    equipment: &[&str],
    ingredients: &[&str],
) -> RecipeFields {
    RecipeFields {
        name: name.into(),
        description: description.into(),
        servings,
        total_time,
        equipment: equipment.iter().map(|e| e.to_string()).collect(),
        ingredients: ingredients
            .iter()
            .map(|i| Ingredient::new(*i, 100.0, "grams"))
            .collect(),
        steps: vec!["Prepare everything.".into(), "Cook and serve.".into()],
    }
}

/// Sixteen recipes; four of them mention potatoes in their description
pub(crate) fn cookbook() -> Vec<RecipeFields> {
    vec![
        recipe("Stamppot", "Mashed potatoes with kale and smoked sausage", 4, 45, &["Large pot", "Potato masher"], &["Potatoes", "Kale", "Smoked sausage"]),
        recipe("Potatoes Au Gratin", "Sliced potatoes baked in cream", 6, 90, &["Oven", "Baking dish"], &["Potatoes", "Cream", "Gruyere"]),
        recipe("Patatas Bravas", "Crispy fried potatoes served with a smoky and spicy tomato sauce for sharing", 4, 35, &["Frying pan"], &["Potatoes", "Tomato", "Paprika"]),
        recipe("Shepherd's Pie", "Minced lamb stew under a thick crust of mashed potatoes baked until golden and bubbling at the edges of the dish", 6, 75, &["Oven", "Large pot"], &["Lamb", "Potatoes", "Carrot"]),
        recipe("Pesto", "Basil sauce", 4, 10, &["Blender"], &["Basil", "Pine nuts", "Parmesan"]),
        recipe("Tomato Soup", "Creamy roasted tomato soup", 4, 40, &["Oven", "Blender"], &["Tomato", "Onion", "Cream"]),
        recipe("Pancakes", "Fluffy breakfast pancakes with maple syrup", 2, 20, &["Frying pan", "Whisk"], &["Flour", "Milk", "Egg"]),
        recipe("Beef Stew", "Slow cooked beef with root vegetables", 6, 180, &["Dutch oven"], &["Beef", "Carrot", "Onion"]),
        recipe("Caesar Salad", "Crisp romaine with anchovy dressing", 2, 15, &["Salad bowl"], &["Romaine", "Anchovy", "Parmesan"]),
        recipe("Risotto", "Creamy mushroom rice", 4, 50, &["Large pot"], &["Rice", "Mushroom", "Parmesan"]),
        recipe("Omelette", "Folded eggs with herbs", 1, 10, &["Frying pan"], &["Egg", "Chives"]),
        recipe("Banana Bread", "Moist loaf with ripe bananas", 8, 70, &["Oven", "Loaf tin"], &["Banana", "Flour", "Butter"]),
        recipe("Guacamole", "Avocado dip with lime", 4, 10, &["Mortar"], &["Avocado", "Lime", "Onion"]),
        recipe("Chili", "Spicy bean and beef chili", 6, 120, &["Dutch oven"], &["Beef", "Beans", "Tomato"]),
        recipe("Hummus", "Chickpea dip with tahini", 4, 15, &["Blender"], &["Chickpeas", "Tahini", "Lemon"]),
        recipe("Apple Pie", "Spiced apples in a flaky crust", 8, 95, &["Oven", "Pie dish"], &["Apple", "Flour", "Butter"]),
    ]
}

pub(crate) fn config() -> PantryConfig {
    let mut config = PantryConfig::with_dimension(DIM);
    config.metric = DistanceMetric::Cosine;
    config.index.num_clusters = 4;
    config
}

pub(crate) fn embedder() -> Arc<HashEmbedder> {
    Arc::new(HashEmbedder::new(DIM))
}

/// Ephemeral pantry holding [`cookbook`], not yet clustered
pub(crate) fn seeded() -> Pantry {
    let pantry = Pantry::ephemeral(config(), embedder()).unwrap();
    for fields in cookbook() {
        pantry.add_recipe(fields).unwrap();
    }
    pantry
}
