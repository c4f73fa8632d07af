//! Record store
//!
//! Append-only, id-ordered map of committed recipes. The store only holds
//! field data; embeddings live in the vector index. Records are shared as
//! `Arc<Recipe>` so readers never copy field data.

use pantry_core::{Error, Recipe, RecordId, Result};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

/// Committed recipes keyed by id
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: BTreeMap<RecordId, Arc<Recipe>>,
    next_id: RecordId,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// Empty store; the first id handed out is 1
    pub fn new() -> Self {
        RecordStore {
            records: BTreeMap::new(),
            next_id: RecordId::new(1),
        }
    }

    /// Id the next insert must carry
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    /// Insert a committed recipe.
    ///
    /// Ids must strictly increase; anything else is an invariant violation.
    pub fn insert(&mut self, recipe: Recipe) -> Result<()> {
        if recipe.id < self.next_id {
            return Err(Error::Internal(format!(
                "record id {} is not above the last assigned id",
                recipe.id
            )));
        }
        self.next_id = recipe.id.next();
        self.records.insert(recipe.id, Arc::new(recipe));
        Ok(())
    }

    /// Undo the insert of `id` when it was the last one.
    ///
    /// Used when a later step of the same append fails.
    pub fn revert(&mut self, id: RecordId) {
        if id.next() == self.next_id && self.records.remove(&id).is_some() {
            self.next_id = id;
        }
    }

    /// Fetch by id
    pub fn get(&self, id: RecordId) -> Result<Arc<Recipe>> {
        self.records
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { id })
    }

    /// Whether a record exists
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of records
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// All records, ascending id
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Recipe>> + '_ {
        self.records.values()
    }

    /// First record after `after` (or the first record) satisfying `predicate`
    pub fn next_matching<F>(&self, after: Option<RecordId>, predicate: F) -> Option<Arc<Recipe>>
    where
        F: Fn(&Recipe) -> bool,
    {
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        self.records
            .range((lower, Bound::Unbounded))
            .map(|(_, r)| r)
            .find(|r| predicate(r))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::RecipeFields;

    fn recipe(id: u64, name: &str) -> Recipe {
        Recipe::new(
            RecordId::new(id),
            RecipeFields {
                name: name.into(),
                description: "desc".into(),
                servings: 1,
                total_time: 10,
                equipment: vec![],
                ingredients: vec![],
                steps: vec![],
            },
        )
    }

    #[test]
    fn test_ids_start_at_one() {
        let store = RecordStore::new();
        assert_eq!(store.next_id(), RecordId::new(1));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = RecordStore::new();
        store.insert(recipe(1, "Pesto")).unwrap();
        assert_eq!(store.next_id(), RecordId::new(2));
        assert_eq!(store.get(RecordId::new(1)).unwrap().name(), "Pesto");
        assert!(store.get(RecordId::new(2)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_non_increasing_id_rejected() {
        let mut store = RecordStore::new();
        store.insert(recipe(1, "A")).unwrap();
        assert!(store.insert(recipe(1, "B")).is_err());
        assert_eq!(store.get(RecordId::new(1)).unwrap().name(), "A");
    }

    #[test]
    fn test_revert_undoes_only_the_last_insert() {
        let mut store = RecordStore::new();
        store.insert(recipe(1, "a")).unwrap();
        store.insert(recipe(2, "b")).unwrap();

        store.revert(RecordId::new(1));
        assert_eq!(store.count(), 2);

        store.revert(RecordId::new(2));
        assert_eq!(store.count(), 1);
        assert!(!store.contains(RecordId::new(2)));
        assert_eq!(store.next_id(), RecordId::new(2));
    }

    #[test]
    fn test_next_matching_walks_in_order() {
        let mut store = RecordStore::new();
        for (i, name) in ["Soup", "Salad", "Stew", "Pie"].iter().enumerate() {
            store.insert(recipe(i as u64 + 1, name)).unwrap();
        }
        let starts_with_s = |r: &Recipe| r.name().starts_with('S');
        let first = store.next_matching(None, starts_with_s).unwrap();
        assert_eq!(first.id, RecordId::new(1));
        let second = store.next_matching(Some(first.id), starts_with_s).unwrap();
        assert_eq!(second.id, RecordId::new(2));
        let third = store.next_matching(Some(second.id), starts_with_s).unwrap();
        assert_eq!(third.id, RecordId::new(3));
        assert!(store.next_matching(Some(third.id), starts_with_s).is_none());
    }
}
