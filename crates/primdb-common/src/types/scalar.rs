//! The scalar type system.
//!
//! primdb has exactly three column types: `int`, `str`, and `bool`. Values
//! are strongly typed and never coerced: a boolean is not an integer, and
//! a string that looks like a number is still a string.
//!
//! # Literal syntax
//!
//! | Type    | Form                                   | Example            |
//! |---------|----------------------------------------|--------------------|
//! | Boolean | `true` / `false`, any case             | `TRUE`, `false`    |
//! | Integer | optional sign followed by ASCII digits | `42`, `-7`, `+3`   |
//! | Text    | single- or double-quoted, no escapes   | `"Ann"`, `'x y'`   |
//!
//! Unquoted words that are neither booleans nor integers are rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, ValidationError};

/// A column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// 64-bit signed integer.
    #[serde(rename = "int")]
    Integer,
    /// UTF-8 text.
    #[serde(rename = "str")]
    Text,
    /// Boolean.
    #[serde(rename = "bool")]
    Boolean,
}

impl ScalarType {
    /// All scalar types, in declaration order.
    pub const ALL: [ScalarType; 3] = [ScalarType::Integer, ScalarType::Text, ScalarType::Boolean];

    /// Returns the name used for this type in column specs and on disk.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::Integer => "int",
            ScalarType::Text => "str",
            ScalarType::Boolean => "bool",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| SchemaError::UnknownType(s.to_string()))
    }
}

/// A runtime scalar value.
///
/// Serialized untagged, so rows persist as plain JSON objects
/// (`{"ID": 1, "name": "Ann", "active": true}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
}

impl Value {
    /// Returns the scalar type of this value.
    #[must_use]
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Value::Boolean(_) => ScalarType::Boolean,
            Value::Integer(_) => ScalarType::Integer,
            Value::Text(_) => ScalarType::Text,
        }
    }

    /// Returns the integer payload, if this is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text payload, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Renders this value in command-language literal syntax.
    ///
    /// Text is double-quoted unless it contains a double quote, in which
    /// case single quotes are used.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Text(s) if s.contains('"') => format!("'{s}'"),
            Value::Text(s) => format!("\"{s}\""),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Parses a single literal token into a value.
///
/// Surrounding whitespace is ignored. Booleans are checked first, then
/// integers, then quoted text.
pub fn parse_literal(token: &str) -> Result<Value, ValidationError> {
    let t = token.trim();

    if t.eq_ignore_ascii_case("true") {
        return Ok(Value::Boolean(true));
    }
    if t.eq_ignore_ascii_case("false") {
        return Ok(Value::Boolean(false));
    }

    if is_integer_literal(t) {
        return t
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| ValidationError::InvalidLiteral {
                token: t.to_string(),
                reason: "integer out of range",
            });
    }

    if let Some(text) = unquote(t) {
        return Ok(Value::Text(text.to_string()));
    }

    Err(ValidationError::InvalidLiteral {
        token: t.to_string(),
        reason: "strings must be quoted",
    })
}

/// Checks that a value has exactly the expected type.
pub fn validate(value: &Value, expected: ScalarType) -> Result<(), ValidationError> {
    let found = value.scalar_type();
    if found == expected {
        Ok(())
    } else {
        Err(ValidationError::TypeMismatch {
            column: None,
            expected,
            found,
        })
    }
}

fn is_integer_literal(t: &str) -> bool {
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn unquote(t: &str) -> Option<&str> {
    let first = t.chars().next()?;
    if t.len() >= 2 && (first == '"' || first == '\'') && t.ends_with(first) {
        Some(&t[1..t.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_booleans_case_insensitive() {
        assert_eq!(parse_literal("true").unwrap(), Value::Boolean(true));
        assert_eq!(parse_literal("FALSE").unwrap(), Value::Boolean(false));
        assert_eq!(parse_literal("  True ").unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_literal("42").unwrap(), Value::Integer(42));
        assert_eq!(parse_literal("-7").unwrap(), Value::Integer(-7));
        assert_eq!(parse_literal("+3").unwrap(), Value::Integer(3));
        assert_eq!(parse_literal("007").unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_parse_integer_out_of_range() {
        let err = parse_literal("99999999999999999999").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLiteral { .. }));
    }

    #[test]
    fn test_parse_quoted_text() {
        assert_eq!(parse_literal("\"hello\"").unwrap(), Value::from("hello"));
        assert_eq!(parse_literal("'a, b'").unwrap(), Value::from("a, b"));
        assert_eq!(parse_literal("\"\"").unwrap(), Value::from(""));
        // Quoted numbers and booleans stay text.
        assert_eq!(parse_literal("\"42\"").unwrap(), Value::from("42"));
        assert_eq!(parse_literal("'true'").unwrap(), Value::from("true"));
    }

    #[test]
    fn test_unquoted_words_rejected() {
        for token in ["hello", "4a", "-", "+", "\"", "'abc\"", "1.5", ""] {
            let err = parse_literal(token).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidLiteral { .. }),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_literal_text_form_parses_back() {
        let values = [
            Value::Integer(42),
            Value::Integer(-1),
            Value::Boolean(true),
            Value::from("hello"),
            Value::from("say \"hi\""),
        ];
        for value in values {
            assert_eq!(parse_literal(&value.to_literal()).unwrap(), value);
        }
    }

    #[test]
    fn test_validate_exact_types() {
        assert!(validate(&Value::Integer(1), ScalarType::Integer).is_ok());
        assert!(validate(&Value::from("x"), ScalarType::Text).is_ok());
        assert!(validate(&Value::Boolean(false), ScalarType::Boolean).is_ok());

        // No implicit coercion between booleans and integers.
        let err = validate(&Value::Boolean(true), ScalarType::Integer).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                column: None,
                expected: ScalarType::Integer,
                found: ScalarType::Boolean,
            }
        );
        assert!(validate(&Value::Integer(1), ScalarType::Boolean).is_err());
        assert!(validate(&Value::from("1"), ScalarType::Integer).is_err());
    }

    #[test]
    fn test_scalar_type_names() {
        assert_eq!("int".parse::<ScalarType>().unwrap(), ScalarType::Integer);
        assert_eq!("str".parse::<ScalarType>().unwrap(), ScalarType::Text);
        assert_eq!("bool".parse::<ScalarType>().unwrap(), ScalarType::Boolean);
        assert!(matches!(
            "float".parse::<ScalarType>(),
            Err(SchemaError::UnknownType(t)) if t == "float"
        ));
        assert_eq!(ScalarType::Text.to_string(), "str");
    }

    #[test]
    fn test_value_json_shape() {
        let json = serde_json::to_string(&vec![
            Value::Integer(1),
            Value::from("a"),
            Value::Boolean(false),
        ])
        .unwrap();
        assert_eq!(json, r#"[1,"a",false]"#);

        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0], Value::Integer(1));
        assert_eq!(back[1], Value::from("a"));
        assert_eq!(back[2], Value::Boolean(false));
    }
}
