//! Minimal argument validation against a tool's schema.
//!
//! Only the presence of each `required` key is checked. Types and values
//! are deliberately left to the tool itself.

use baton_core::error::ArgumentError;
use serde_json::Value;

/// Check that `args` carries every key named in `schema.required`.
///
/// A schema that is not a JSON object (including `null`) accepts anything.
/// A `required` entry that is missing or not an array counts as empty.
/// When keys are required but `args` is absent or not an object, the first
/// required key is reported missing.
pub fn validate_args(schema: &Value, args: Option<&Value>) -> Result<(), ArgumentError> {
    let Some(schema) = schema.as_object() else {
        return Ok(());
    };
    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return Ok(());
    };

    let provided = args.and_then(Value::as_object);
    for key in required.iter().filter_map(Value::as_str) {
        if !provided.is_some_and(|obj| obj.contains_key(key)) {
            return Err(ArgumentError::MissingRequired(key.to_string()));
        }
    }
    Ok(())
}
