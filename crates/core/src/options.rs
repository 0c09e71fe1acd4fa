//! Option Groups & Options

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    applicability::Applicability,
    attributes::Attributes,
    keys::{GroupKey, OptionKey},
    tags::Tags,
};

/// How many options a group accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionType {
    /// At most one option.
    Single,

    /// Any number of options, bounded by the group's `min`/`max`.
    Multi,

    /// A yes/no choice; at most one option.
    Boolean,
}

impl SelectionType {
    /// Whether the group holds at most one option.
    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::Single | Self::Boolean)
    }
}

/// A named cluster of related options with a cardinality policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    /// Group key
    pub key: GroupKey,

    /// Display name
    pub name: String,

    /// Selection cardinality kind
    pub selection_type: SelectionType,

    /// Minimum number of selected options; `None` is unbounded.
    pub min: Option<u32>,

    /// Maximum number of selected options; `None` is unbounded.
    pub max: Option<u32>,

    /// Display and pricing order
    pub sort_order: i32,
}

impl OptionGroup {
    /// Create a group with no count bounds.
    pub fn new(key: impl Into<GroupKey>, selection_type: SelectionType, sort_order: i32) -> Self {
        let key = key.into();

        Self {
            name: key.to_string(),
            key,
            selection_type,
            min: None,
            max: None,
            sort_order,
        }
    }

    /// Set the count bounds.
    #[must_use]
    pub fn with_bounds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Minimum selection count, zero when unbounded.
    pub fn min_selected(&self) -> u32 {
        self.min.unwrap_or(0)
    }

    /// Effective maximum, capped at one for exclusive groups.
    pub fn max_selected(&self) -> Option<u32> {
        if self.selection_type.is_exclusive() {
            Some(self.max.map_or(1, |max| max.min(1)))
        } else {
            self.max
        }
    }

    /// Whether the caller must choose something in this group.
    pub fn is_required(&self) -> bool {
        self.min_selected() >= 1
    }
}

/// Quantity bounds for options that carry a count rather than presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityRule {
    /// Smallest accepted quantity
    pub min: u32,

    /// Largest accepted quantity
    pub max: u32,

    /// Quantity used when the caller gives none
    pub default: u32,
}

impl QuantityRule {
    /// Whether `quantity` is within bounds.
    pub fn accepts(&self, quantity: u32) -> bool {
        (self.min..=self.max).contains(&quantity)
    }

    /// Clamp `quantity` into bounds.
    pub fn clamp(&self, quantity: u32) -> u32 {
        quantity.clamp(self.min, self.max.max(self.min))
    }
}

/// A selectable option.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    /// Option key, unique within the catalog
    pub key: OptionKey,

    /// Owning group
    pub group: GroupKey,

    /// Display name
    pub name: String,

    /// Unit price excluding VAT
    pub price_excl: Decimal,

    /// VAT rate in percent
    pub vat_rate_percent: Decimal,

    /// Option tags
    pub tags: Tags,

    /// Free-form option attributes
    pub attributes: Attributes,

    /// Which base products the option is relevant to
    pub applies_to: Applicability,

    /// Quantity bounds, if the option carries a quantity
    pub quantity_rule: Option<QuantityRule>,
}

impl ConfigOption {
    /// Create an option that applies everywhere and has no tags.
    pub fn new(
        key: impl Into<OptionKey>,
        group: impl Into<GroupKey>,
        price_excl: Decimal,
        vat_rate_percent: Decimal,
    ) -> Self {
        let key = key.into();

        Self {
            name: key.to_string(),
            key,
            group: group.into(),
            price_excl,
            vat_rate_percent,
            tags: Tags::default(),
            attributes: Attributes::new(),
            applies_to: Applicability::always(),
            quantity_rule: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Set the applicability expression.
    #[must_use]
    pub fn applies_to(mut self, applies_to: Applicability) -> Self {
        self.applies_to = applies_to;
        self
    }

    /// Set the quantity rule.
    #[must_use]
    pub fn with_quantity_rule(mut self, rule: QuantityRule) -> Self {
        self.quantity_rule = Some(rule);
        self
    }
}
