//! Prompt template for plan proposals

use pantry_core::SchemaDescriptor;

/// System prompt for plan proposals.
///
/// The model is asked for one JSON object in the proposal grammar; the
/// schema description is appended per request.
pub const SYSTEM_PROMPT: &str = "\
You translate questions about a recipe collection into a JSON query plan. \
The collection is read-only: you can never add, change or remove recipes.

Output exactly one JSON object and nothing else, with these optional fields:
  \"columns\": list of column names to return
  \"filters\": list of conditions that must all hold; a condition is
      {\"column\": <name>, \"op\": <op>, \"value\": <value>}
    or an alternative group {\"any_of\": [<condition>, ...]}
  \"similar_to\": text to rank recipes by meaning (e.g. \"hearty winter stew\")
  \"similarity_weight\": positive number, default 1
  \"limit\": maximum number of rows
  \"group_by\": column to count recipes by

Operators: eq, contains, between (value [min, max]), lt, lte, gt, gte.
Use contains for ingredients, equipment and steps. Use the duration column \
with value short, medium or long for how long a recipe takes.

If the question asks to add, change, replace, clear or remove anything, output \
{\"refuse\": <short reason>} and no other field.

Do NOT include explanations, comments or markdown.";

/// Build the messages array for an OpenAI-compatible chat completions request.
pub fn build_messages(request: &str, schema: &SchemaDescriptor) -> serde_json::Value {
    let system = format!("{}\n\nSchema:\n{}", SYSTEM_PROMPT, schema.describe());
    serde_json::json!([
        {"role": "system", "content": system},
        {"role": "user", "content": request}
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_mentions_grammar() {
        assert!(SYSTEM_PROMPT.contains("\"filters\""));
        assert!(SYSTEM_PROMPT.contains("any_of"));
        assert!(SYSTEM_PROMPT.contains("read-only"));
        assert!(SYSTEM_PROMPT.contains("\"refuse\""));
    }

    #[test]
    fn test_build_messages_structure() {
        let messages = build_messages("quick soups", &SchemaDescriptor::default());
        let arr = messages.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["role"], "system");
        assert!(arr[0]["content"].as_str().unwrap().contains("predicate columns"));
        assert_eq!(arr[1]["role"], "user");
        assert_eq!(arr[1]["content"], "quick soups");
    }
}
