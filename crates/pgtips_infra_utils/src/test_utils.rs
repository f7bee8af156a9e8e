use assert_json_diff::{assert_json_matches_no_panic, CompareMode, Config};
use serde::Serialize;
use serde_json::Value;

/// Compare two JSON values for an exact match.
///
/// Extends the functionality of [`assert_json_diff::assert_json_eq`] by also adding a customizable
/// error message print. Uses [`assert_json_matches_no_panic`].
pub fn assert_json_eq<Lhs, Rhs>(lhs: &Lhs, rhs: &Rhs, message: String)
where
    Lhs: Serialize,
    Rhs: Serialize,
{
    if let Err(error) = assert_json_matches_no_panic(lhs, rhs, Config::new(CompareMode::Strict)) {
        let printed_error = format!("\n\n{}\n{}\n\n", message, error);
        panic!("{}", printed_error);
    }
}

/// Panics unless every object nested in `value` has its keys in strictly ascending order, as
/// they appear when iterating the object.
pub fn assert_json_keys_sorted(value: &Value) {
    assert_keys_sorted_at(value, "$");
}

fn assert_keys_sorted_at(value: &Value, pointer: &str) {
    match value {
        Value::Object(map) => {
            let keys: Vec<&String> = map.keys().collect();
            for pair in keys.windows(2) {
                assert!(
                    pair[0] < pair[1],
                    "Keys {:?} and {:?} are out of order at {pointer}.",
                    pair[0],
                    pair[1]
                );
            }
            for (key, inner) in map {
                assert_keys_sorted_at(inner, &format!("{pointer}.{key}"));
            }
        }
        Value::Array(values) => {
            for (index, inner) in values.iter().enumerate() {
                assert_keys_sorted_at(inner, &format!("{pointer}[{index}]"));
            }
        }
        _ => {}
    }
}
