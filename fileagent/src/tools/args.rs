//! Argument coercion for tool calls.
//!
//! Models are loose with JSON types, so numbers may arrive as strings and
//! booleans as `0`/`1` or words. A missing or `null` argument takes its
//! default; anything that cannot be coerced is `InvalidArgument`.

use serde_json::{Map, Value};

use crate::error::ToolError;

/// Non-negative integer argument. Fractions are truncated toward zero.
pub(crate) fn usize_arg(
    tool: &str,
    args: &Map<String, Value>,
    key: &str,
    default: usize,
) -> Result<usize, ToolError> {
    let invalid = || ToolError::invalid_argument(tool, format!("'{key}' to be a non-negative integer"));
    let number = match args.get(key) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match number {
        Some(n) if n.is_finite() && n > -1.0 => Ok(n.trunc() as usize),
        _ => Err(invalid()),
    }
}

pub(crate) fn bool_arg(
    tool: &str,
    args: &Map<String, Value>,
    key: &str,
    default: bool,
) -> Result<bool, ToolError> {
    let parsed = match args.get(key) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Some(_) => None,
    };
    parsed.ok_or_else(|| ToolError::invalid_argument(tool, format!("'{key}' to be a boolean")))
}

/// Required text argument, trimmed. Numbers are accepted as their decimal
/// text.
pub(crate) fn required_str(
    tool: &str,
    args: &Map<String, Value>,
    key: &str,
) -> Result<String, ToolError> {
    let text = match args.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        return Err(ToolError::invalid_argument(
            tool,
            format!("non-empty '{key}'"),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn integers_accept_numbers_and_numeric_strings() {
        let a = args(json!({ "n": 7, "f": 2.9, "s": " 12 ", "null": null }));
        assert_eq!(usize_arg("t", &a, "n", 1).expect("n"), 7);
        assert_eq!(usize_arg("t", &a, "f", 1).expect("f"), 2);
        assert_eq!(usize_arg("t", &a, "s", 1).expect("s"), 12);
        assert_eq!(usize_arg("t", &a, "null", 4).expect("null"), 4);
        assert_eq!(usize_arg("t", &a, "missing", 5).expect("missing"), 5);
    }

    #[test]
    fn integers_reject_garbage_and_negatives() {
        let a = args(json!({ "word": "many", "neg": -3, "list": [1] }));
        for key in ["word", "neg", "list"] {
            let err = usize_arg("search_files", &a, key, 1).unwrap_err();
            assert_eq!(err.kind(), "InvalidArgument", "key {key}");
        }
    }

    #[test]
    fn booleans_accept_common_spellings() {
        let a = args(json!({ "b": true, "one": 1, "yes": "Yes", "zero": "0", "no": "no" }));
        assert!(bool_arg("t", &a, "b", false).expect("b"));
        assert!(bool_arg("t", &a, "one", false).expect("one"));
        assert!(bool_arg("t", &a, "yes", false).expect("yes"));
        assert!(!bool_arg("t", &a, "zero", true).expect("zero"));
        assert!(!bool_arg("t", &a, "no", true).expect("no"));
        assert!(bool_arg("t", &a, "missing", true).expect("missing"));

        let bad = args(json!({ "b": "maybe" }));
        assert_eq!(bool_arg("t", &bad, "b", false).unwrap_err().kind(), "InvalidArgument");
    }

    #[test]
    fn required_text_is_trimmed_and_non_empty() {
        let a = args(json!({ "q": "  timeout ", "blank": "   ", "n": 42 }));
        assert_eq!(required_str("t", &a, "q").expect("q"), "timeout");
        assert_eq!(required_str("t", &a, "n").expect("n"), "42");

        let err = required_str("search_files", &a, "blank").unwrap_err();
        assert_eq!(err.to_string(), "search_files requires non-empty 'blank'");
        assert!(required_str("t", &a, "missing").is_err());
    }
}
