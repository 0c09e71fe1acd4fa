//! Attributes
//!
//! Typed attribute values for products and options.

use std::{collections::BTreeMap, fmt};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Attribute map, ordered by key.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A single attribute value.
///
/// Untagged variants are tried in declaration order, so a quoted `"200"` stays
/// text while a bare `200` becomes a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean flag
    Bool(bool),

    /// Free text
    Text(String),

    /// Decimal number
    Number(Decimal),

    /// List of values
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Whether this value is, or (for lists) contains, `needle`.
    pub fn matches(&self, needle: &AttributeValue) -> bool {
        match self {
            Self::List(values) => values.iter().any(|value| value == needle),
            value => value == needle,
        }
    }

    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
            Self::List(values) => {
                f.write_str("[")?;

                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }

                    write!(f, "{value}")?;
                }

                f.write_str("]")
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for AttributeValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn list_matches_members() {
        let value = AttributeValue::List(vec!["wood".into(), "composite".into()]);

        assert!(value.matches(&"wood".into()));
        assert!(!value.matches(&"steel".into()));
    }

    #[test]
    fn numbers_compare_by_value() {
        let left = AttributeValue::Number(Decimal::new(2000, 1));

        assert!(left.matches(&AttributeValue::from(200)));
    }

    #[test]
    fn yaml_keeps_quoted_numbers_as_text() -> TestResult {
        let attributes: Attributes = serde_norway::from_str(
            "diameter: 200\nmodel: \"200\"\nindoor: false\nwoods: [thermo, cedar]\n",
        )?;

        assert_eq!(attributes.get("diameter"), Some(&AttributeValue::from(200)));
        assert_eq!(attributes.get("model"), Some(&AttributeValue::from("200")));
        assert_eq!(attributes.get("indoor"), Some(&AttributeValue::Bool(false)));
        assert_eq!(
            attributes.get("woods"),
            Some(&AttributeValue::List(vec!["thermo".into(), "cedar".into()]))
        );

        Ok(())
    }

    #[test]
    fn display_renders_lists() {
        let value = AttributeValue::List(vec![AttributeValue::from(1), "a".into()]);

        assert_eq!(value.to_string(), "[1, a]");
    }
}
