//! Command dispatch, seeding and persistence

use super::{config, cookbook, embedder, seeded, DIM};
use crate::{Command, Error, NewRecipe, Output, Pantry};
use pantry_core::{Column, Plan, RecordId};
use pantry_engine::Embedder;

fn seed_json() -> String {
    let mut unit = vec![0.0f32; DIM];
    unit[7] = 1.0;
    serde_json::json!([
        {
            "name": "Pesto",
            "description": "Basil sauce",
            "servings": 4,
            "totalTime": 10,
            "equipment": ["Blender"],
            "ingredients": [{"item": "Basil", "amount": 50, "unit": "grams"}],
            "steps": ["Blend."]
        },
        {
            "name": "Flatbread",
            "description": "Pan baked bread",
            "servings": 2,
            "totalTime": 25,
            "equipment": ["Frying pan"],
            "ingredients": [{"item": "Flour", "amount": 200, "unit": "grams"}],
            "steps": ["Knead.", "Fry."],
            "embedding": unit
        }
    ])
    .to_string()
}

#[test]
fn test_seed_from_json_with_and_without_embeddings() {
    let pantry = Pantry::ephemeral(config(), embedder()).unwrap();
    let ids = pantry.seed_from_json(&seed_json()).unwrap();
    assert_eq!(ids, vec![RecordId::new(1), RecordId::new(2)]);
    assert_eq!(pantry.count().unwrap(), 2);
    assert_eq!(pantry.get(RecordId::new(2)).unwrap().fields.total_time, 25);

    // The precomputed unit vector is what the index holds for Flatbread
    let mut query = vec![0.0f32; DIM];
    query[7] = 1.0;
    let hits = pantry.database().search(&query, 1, None).unwrap();
    assert_eq!(hits[0].0, RecordId::new(2));
}

#[test]
fn test_seed_stops_at_first_invalid_recipe() {
    let pantry = Pantry::ephemeral(config(), embedder()).unwrap();
    let json = r#"[
        {"name": "Toast", "description": "Bread, toasted", "servings": 1, "totalTime": 5,
         "equipment": [], "ingredients": [], "steps": []},
        {"name": "Nothing", "description": "Zero servings", "servings": 0, "totalTime": 5,
         "equipment": [], "ingredients": [], "steps": []},
        {"name": "Tea", "description": "Hot tea", "servings": 1, "totalTime": 5,
         "equipment": [], "ingredients": [], "steps": []}
    ]"#;
    let err = pantry.seed_from_json(json).unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(pantry.count().unwrap(), 1);
}

#[test]
fn test_malformed_seed_json_is_serialization_error() {
    let pantry = Pantry::ephemeral(config(), embedder()).unwrap();
    let err = pantry.seed_from_json("[{\"name\": ").unwrap_err();
    assert!(matches!(err, Error::Serialization { .. }));
}

#[test]
fn test_wrong_length_embedding_is_rejected() {
    let pantry = Pantry::ephemeral(config(), embedder()).unwrap();
    let err = pantry
        .add_recipe_with_embedding(cookbook().remove(0), vec![1.0; 3])
        .unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(pantry.count().unwrap(), 0);
}

#[test]
fn test_get_missing_recipe() {
    let pantry = seeded();
    let err = pantry.get(RecordId::new(99)).unwrap_err();
    assert_eq!(err, Error::RecipeNotFound { id: 99 });
    assert!(err.is_not_found());
}

#[test]
fn test_recipes_in_id_order() {
    let pantry = seeded();
    let recipes = pantry.recipes().unwrap();
    assert_eq!(recipes.len(), 16);
    assert_eq!(recipes[0].name(), "Stamppot");
    assert!(recipes.windows(2).all(|w| w[0].id < w[1].id));
}

#[test]
fn test_execute_many_collects_each_result() {
    let pantry = Pantry::ephemeral(config(), embedder()).unwrap();
    let results = pantry.executor().execute_many(vec![
        Command::AddRecipe {
            recipe: NewRecipe::from(cookbook().remove(4)),
        },
        Command::CountRecipes,
        Command::GetRecipe { id: 5 },
        Command::Execute {
            plan: Plan::select([Column::Name]).limit(1),
        },
    ]);
    assert_eq!(results[0], Ok(Output::RecipeId(1)));
    assert_eq!(results[1], Ok(Output::Uint(1)));
    assert!(matches!(results[2], Err(Error::RecipeNotFound { id: 5 })));
    match &results[3] {
        Ok(Output::Rows(rows)) => assert_eq!(rows.to_json().unwrap(), r#"[{"name":"Pesto"}]"#),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_command_from_json() {
    let pantry = seeded();
    let cmd: Command = serde_json::from_str(
        r#"{"Execute": {"plan": {"columns": ["name"], "filters": [
            {"condition": {"column": "servings", "op": {"eq": {"int": 1}}}}
        ]}}}"#,
    )
    .unwrap();
    match pantry.execute_command(cmd).unwrap() {
        Output::Rows(rows) => assert_eq!(rows.to_json().unwrap(), r#"[{"name":"Omelette"}]"#),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_build_index_command() {
    let pantry = seeded();
    let before = pantry.index_stats().unwrap();
    assert!(!before.built);

    let out = pantry
        .execute_command(Command::BuildIndex {
            num_clusters: Some(2),
        })
        .unwrap();
    match out {
        Output::IndexStats(stats) => {
            assert!(stats.built);
            assert_eq!(stats.cluster_sizes.iter().sum::<usize>(), 16);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_reopen_keeps_recipes_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let query = embedder().embed("Potatoes").unwrap();
    let before = {
        let pantry = Pantry::open_with_config(dir.path(), config(), embedder()).unwrap();
        for fields in cookbook() {
            pantry.add_recipe(fields).unwrap();
        }
        pantry.database().search(&query, 3, None).unwrap()
    };

    let pantry = Pantry::open(dir.path(), embedder()).unwrap();
    assert_eq!(pantry.count().unwrap(), 16);
    assert_eq!(pantry.database().search(&query, 3, None).unwrap(), before);
}
