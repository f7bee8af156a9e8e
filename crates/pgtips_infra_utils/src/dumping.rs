use std::collections::BTreeMap;
use std::fs;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

#[cfg(test)]
#[path = "dumping_test.rs"]
mod dumping_test;

#[derive(Debug, thiserror::Error)]
pub enum DumpingError {
    #[error("Failed to serialize to JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to write {file_path}: {source}")]
    Write {
        file_path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Rebuilds a JSON value such that every object, at every depth, lists its keys in ascending
/// lexicographic order. Array element order is preserved.
pub fn sort_json_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(key, inner)| (key, sort_json_keys(inner))).collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_json_keys).collect()),
        scalar => scalar,
    }
}

/// Serializes `value` into its canonical textual form: sorted object keys and two-space
/// indentation. Equal inputs always render to identical bytes.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DumpingError> {
    let value = sort_json_keys(serde_json::to_value(value)?);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Writes the canonical JSON form of `value` to `file_path`, followed by a newline.
///
/// The document is fully rendered before the file is touched, so a serialization failure never
/// leaves a truncated file behind.
pub fn serialize_to_file<T: Serialize + ?Sized>(
    value: &T,
    file_path: &str,
) -> Result<(), DumpingError> {
    let mut rendered = to_canonical_json(value)?;
    rendered.push('\n');
    fs::write(file_path, rendered)
        .map_err(|source| DumpingError::Write { file_path: file_path.to_string(), source })?;
    info!("Wrote {file_path}.");
    Ok(())
}

/// Asserts that the file at `file_path` holds the JSON form of `value`. Meant for tests guarding
/// checked-in generated files; the panic message explains how to regenerate them.
#[cfg(any(feature = "testing", test))]
pub fn serialize_to_file_test<T: Serialize + ?Sized>(
    value: &T,
    file_path: &str,
    fix_binary_name: &str,
) {
    let expected = serde_json::to_value(value).expect("Failed to serialize the value.");
    let absolute_path = crate::path::resolve_project_relative_path(file_path)
        .unwrap_or_else(|error| panic!("Failed to resolve {file_path}: {error}"));
    let file_content = fs::read_to_string(&absolute_path)
        .unwrap_or_else(|error| panic!("Failed to read {}: {error}", absolute_path.display()));
    let actual: Value = serde_json::from_str(&file_content)
        .unwrap_or_else(|error| panic!("Failed to parse {file_path}: {error}"));

    let error_message = format!(
        "{file_path} is not up to date. To update it, run: cargo run --bin {fix_binary_name} -q \
         -- --output-path {file_path}"
    );
    crate::test_utils::assert_json_eq(&actual, &expected, error_message);
}
