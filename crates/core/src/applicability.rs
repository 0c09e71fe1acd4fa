//! Option Applicability
//!
//! Nested boolean predicates deciding whether an option is relevant to a base
//! product at all. Options that fail are hidden before any compatibility rule runs.

use serde::Deserialize;
use smallvec::{SmallVec, smallvec};

use crate::{attributes::AttributeValue, keys::OptionKey, products::BaseProduct};

/// Boolean operation used to combine child rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOp {
    /// All child rules must match.
    #[default]
    And,

    /// At least one child rule must match.
    Or,
}

/// Applicability expression over product attributes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Applicability {
    /// How `rules` are combined.
    #[serde(default)]
    pub op: BoolOp,

    /// Child rules. Empty means "applies to every product".
    #[serde(default)]
    pub rules: SmallVec<[ApplicabilityRule; 2]>,
}

/// Single applicability rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ApplicabilityRule {
    /// Attribute must equal (or, for list attributes, contain) `value`.
    AttributeEquals {
        /// Attribute name
        key: String,

        /// Expected value
        value: AttributeValue,
    },

    /// Attribute must match one of `values`.
    AttributeIn {
        /// Attribute name
        key: String,

        /// Accepted values
        values: Vec<AttributeValue>,
    },

    /// Attribute must be set.
    AttributePresent {
        /// Attribute name
        key: String,
    },

    /// Attribute must not be set.
    AttributeAbsent {
        /// Attribute name
        key: String,
    },

    /// The option must be one of the product's heating types.
    HeatingType,

    /// Nested expression.
    Group(Box<Applicability>),
}

impl Applicability {
    /// Create an expression from operator and rules.
    #[must_use]
    pub fn new(op: BoolOp, rules: SmallVec<[ApplicabilityRule; 2]>) -> Self {
        Self { op, rules }
    }

    /// Applies to every product.
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Applies when `key` equals `value`.
    #[must_use]
    pub fn attribute_equals(key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            op: BoolOp::And,
            rules: smallvec![ApplicabilityRule::AttributeEquals {
                key: key.into(),
                value: value.into(),
            }],
        }
    }

    /// Applies when the option is one of the product's heating types.
    #[must_use]
    pub fn heating_type() -> Self {
        Self {
            op: BoolOp::And,
            rules: smallvec![ApplicabilityRule::HeatingType],
        }
    }

    /// Whether this expression places no constraint at all.
    pub fn is_unconditional(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate the expression for `option` on `product`.
    #[must_use]
    pub fn matches(&self, product: &BaseProduct, option: &OptionKey) -> bool {
        if self.rules.is_empty() {
            return true;
        }

        match self.op {
            BoolOp::And => self.rules.iter().all(|rule| rule.matches(product, option)),
            BoolOp::Or => self.rules.iter().any(|rule| rule.matches(product, option)),
        }
    }
}

impl ApplicabilityRule {
    #[must_use]
    fn matches(&self, product: &BaseProduct, option: &OptionKey) -> bool {
        match self {
            Self::AttributeEquals { key, value } => product
                .attribute(key)
                .is_some_and(|attribute| attribute.matches(value)),
            Self::AttributeIn { key, values } => product
                .attribute(key)
                .is_some_and(|attribute| values.iter().any(|value| attribute.matches(value))),
            Self::AttributePresent { key } => product.attribute(key).is_some(),
            Self::AttributeAbsent { key } => product.attribute(key).is_none(),
            Self::HeatingType => product.supports_heating(option),
            Self::Group(group) => group.matches(product, option),
        }
    }
}
