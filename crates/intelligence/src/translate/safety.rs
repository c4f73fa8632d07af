//! Mutating-intent screen
//!
//! Runs on the raw request before any model is consulted. A request that
//! reads as an instruction to change stored data is refused outright.

/// Verbs that always mean a write
const MUTATING_VERBS: &[&str] = &[
    "delete", "drop", "update", "insert", "truncate", "alter", "erase", "wipe", "purge",
    "destroy", "overwrite", "upsert", "modify", "remove", "rename", "reset",
];

/// Verbs that mean a write when their object is the stored data
/// ("clear all recipes", but not "clear soups")
const OBJECT_VERBS: &[&str] = &[
    "add", "create", "save", "store", "put", "edit", "change", "clear", "empty", "replace",
    "set", "discard",
];

/// Words that may sit between such a verb and its object
const FILLERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "our", "your", "its", "new",
    "some", "all", "every", "each", "any", "both", "more", "few", "several", "many", "of",
    "out", "entire", "whole", "existing", "old", "one", "two", "three", "four", "five", "six",
    "seven", "eight", "nine", "ten", "dozen",
];

/// Articles that turn a verb into a noun ("a drop of vanilla")
const ARTICLES: &[&str] = &["a", "an", "the"];

/// How many tokens after the verb its object may appear
const OBJECT_REACH: usize = 4;

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Whether `token` is `verb` or a regular inflection of it
fn is_form_of(token: &str, verb: &str) -> bool {
    if token == verb {
        return true;
    }
    if let Some(rest) = token.strip_prefix(verb) {
        if matches!(rest, "s" | "es" | "d" | "ed" | "ing" | "ion" | "ions") {
            return true;
        }
        // drop -> dropped, dropping
        if let Some(last) = verb.chars().last() {
            let mut doubled = String::new();
            doubled.push(last);
            if let Some(tail) = rest.strip_prefix(doubled.as_str()) {
                if matches!(tail, "ed" | "ing") {
                    return true;
                }
            }
        }
    }
    // empty -> emptied, empties
    if let Some(stem) = verb.strip_suffix('y') {
        if let Some(rest) = token.strip_prefix(stem) {
            if matches!(rest, "ied" | "ies") {
                return true;
            }
        }
    }
    // delete -> deleting, deletion
    if let Some(stem) = verb.strip_suffix('e') {
        if let Some(rest) = token.strip_prefix(stem) {
            if matches!(rest, "ing" | "ion" | "ions") {
                return true;
            }
        }
    }
    false
}

/// Nouns naming the stored data
fn is_data_word(token: &str) -> bool {
    matches!(
        token,
        "recipe"
            | "recipes"
            | "record"
            | "records"
            | "entry"
            | "entries"
            | "database"
            | "db"
            | "table"
            | "tables"
            | "collection"
            | "pantry"
            | "data"
            | "everything"
    )
}

fn is_filler(token: &str) -> bool {
    FILLERS.contains(&token) || token.chars().all(|c| c.is_ascii_digit())
}

/// Return the word that makes `request` a write, if any.
pub fn find_mutating_intent(request: &str) -> Option<String> {
    let tokens = tokens(request);
    for (i, token) in tokens.iter().enumerate() {
        let after_article = i > 0 && ARTICLES.contains(&tokens[i - 1].as_str());

        if !after_article && MUTATING_VERBS.iter().any(|v| is_form_of(token, v)) {
            return Some(token.clone());
        }

        if OBJECT_VERBS.iter().any(|v| is_form_of(token, v)) {
            let object = tokens[i + 1..]
                .iter()
                .take(OBJECT_REACH)
                .find(|t| !is_filler(t));
            if object.is_some_and(|t| is_data_word(t)) {
                return Some(token.clone());
            }
        }
    }
    None
}
