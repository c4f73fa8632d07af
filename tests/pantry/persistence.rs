//! Persistence Tests
//!
//! Recipes survive reopen; a torn tail is cut off; a data directory is
//! opened by one handle at a time.

use crate::common::*;
use pantry::{Embedder, Error, HashEmbedder, Pantry, RecordId};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

const LOG_FILE: &str = "recipes.log";

#[test]
fn reopen_restores_records_and_ids() {
    let dir = tempfile::tempdir().unwrap();
    {
        let pantry = Pantry::open_with_config(dir.path(), config(), embedder()).unwrap();
        fill(&pantry, 5);
    }

    let pantry = Pantry::open(dir.path(), embedder()).unwrap();
    assert_eq!(pantry.count().unwrap(), 5);
    assert_eq!(pantry.get(RecordId::new(3)).unwrap().fields, recipe(2));

    let next = pantry.add_recipe(recipe(5)).unwrap();
    assert_eq!(next, RecordId::new(6));
}

#[test]
fn reopen_keeps_similarity_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let before = {
        let pantry = Pantry::open_with_config(dir.path(), config(), embedder()).unwrap();
        fill(&pantry, 20);
        pantry.similar("lentil soup", 5).unwrap()
    };
    let pantry = Pantry::open(dir.path(), embedder()).unwrap();
    assert_eq!(pantry.similar("lentil soup", 5).unwrap(), before);
}

#[test]
fn garbage_tail_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    {
        let pantry = Pantry::open_with_config(dir.path(), config(), embedder()).unwrap();
        fill(&pantry, 3);
    }
    {
        let mut log = OpenOptions::new()
            .append(true)
            .open(dir.path().join(LOG_FILE))
            .unwrap();
        log.write_all(&[0x13, 0x37, 0x00, 0x42, 0xff]).unwrap();
    }

    let pantry = Pantry::open(dir.path(), embedder()).unwrap();
    assert_eq!(pantry.count().unwrap(), 3);
    assert_eq!(pantry.add_recipe(recipe(3)).unwrap(), RecordId::new(4));
}

#[test]
fn corrupt_last_frame_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    {
        let pantry = Pantry::open_with_config(dir.path(), config(), embedder()).unwrap();
        fill(&pantry, 3);
    }
    let path = dir.path().join(LOG_FILE);
    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    std::fs::write(&path, &bytes).unwrap();

    let pantry = Pantry::open(dir.path(), embedder()).unwrap();
    assert_eq!(pantry.count().unwrap(), 2);
}

#[test]
fn second_handle_on_same_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let _first = Pantry::open_with_config(dir.path(), config(), embedder()).unwrap();
    assert!(Pantry::open(dir.path(), embedder()).is_err());
}

#[test]
fn embedder_dimension_change_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    {
        let pantry = Pantry::open_with_config(dir.path(), config(), embedder()).unwrap();
        fill(&pantry, 2);
    }
    let other: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(DIM * 2));
    let err = Pantry::open(dir.path(), other).unwrap_err();
    assert_eq!(
        err,
        Error::DimensionMismatch {
            expected: DIM,
            got: DIM * 2
        }
    );
    assert!(err.is_fatal());
}
