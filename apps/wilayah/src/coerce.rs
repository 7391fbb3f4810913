//! Field coercion between tabular cells and typed document values.
//!
//! Tabular cells are always text. A cell becomes a JSON number only when it
//! is all digits and has no significant leading zero, so codes such as
//! `"0110"` keep their exact spelling. The reverse direction renders any
//! value as plain text; CSV quoting is left to the writer, which quotes a
//! cell only when it holds a comma, a double quote, or a line break.

use regex::Regex;
use serde_json::Value as Json;
use std::borrow::Cow;
use std::sync::OnceLock;

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("static regex"))
}

/// True when `s` is a non-empty run of ASCII digits.
pub fn is_digits(s: &str) -> bool {
    digits_re().is_match(s)
}

/// True when a tabular cell should be stored as a JSON number.
///
/// `"0"` qualifies; `"007"` does not.
pub fn is_numeric_literal(s: &str) -> bool {
    is_digits(s) && !(s.len() > 1 && s.starts_with('0'))
}

/// Convert one tabular cell to its document value.
///
/// Digit strings too large for `u64` stay strings, since the document
/// encoder cannot hold them as exact integers.
pub fn to_document_value(cell: &str) -> Json {
    if is_numeric_literal(cell) {
        if let Ok(n) = cell.parse::<u64>() {
            return Json::from(n);
        }
    }
    Json::String(cell.to_string())
}

/// Render a document value as tabular cell text.
pub fn to_tabular_text(value: &Json) -> Cow<'_, str> {
    match value {
        Json::String(s) => Cow::Borrowed(s.as_str()),
        Json::Null => Cow::Borrowed(""),
        Json::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Json::Number(n) => Cow::Owned(n.to_string()),
        // nested values are not part of the dataset shape; keep them readable
        other => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_cells_become_numbers() {
        assert_eq!(to_document_value("11"), json!(11));
        assert_eq!(to_document_value("1101012001"), json!(1101012001u64));
        assert_eq!(to_document_value("0"), json!(0));
    }

    #[test]
    fn test_leading_zero_and_text_stay_strings() {
        assert_eq!(to_document_value("0110"), json!("0110"));
        assert_eq!(to_document_value("00"), json!("00"));
        assert_eq!(to_document_value("Aceh"), json!("Aceh"));
        assert_eq!(to_document_value("-5"), json!("-5"));
        assert_eq!(to_document_value("1.5"), json!("1.5"));
        assert_eq!(to_document_value(""), json!(""));
        assert_eq!(to_document_value("12\n"), json!("12\n"));
    }

    #[test]
    fn test_oversized_digit_run_stays_string() {
        let big = "123456789012345678901234567890";
        assert_eq!(to_document_value(big), json!(big));
    }

    #[test]
    fn test_document_values_render_as_plain_text() {
        assert_eq!(to_tabular_text(&json!(11)), "11");
        assert_eq!(to_tabular_text(&json!("0110")), "0110");
        assert_eq!(to_tabular_text(&json!(null)), "");
        assert_eq!(to_tabular_text(&json!(true)), "true");
        assert_eq!(to_tabular_text(&json!(["a", 1])), r#"["a",1]"#);
    }

    #[test]
    fn test_cell_round_trip_is_lossless() {
        for cell in ["11", "0", "0110", "Kab. Aceh Selatan", "Kota, X", "9"] {
            let back = to_tabular_text(&to_document_value(cell)).into_owned();
            assert_eq!(back, cell);
        }
    }
}
