//! Products

use std::borrow::Cow;

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{
    attributes::{AttributeValue, Attributes},
    keys::{OptionKey, ProductId},
};

/// Attribute name resolving to the product type.
pub const TYPE_ATTRIBUTE: &str = "type";

/// Attribute name resolving to the product shape.
pub const SHAPE_ATTRIBUTE: &str = "shape";

/// Base product a configuration starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseProduct {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product category (e.g. `hottub`, `sauna`, `cold-plunge`)
    pub product_type: String,

    /// Product shape (e.g. `round`, `square`)
    pub shape: Option<String>,

    /// Base price excluding VAT
    pub base_price_excl: Decimal,

    /// VAT rate in percent (e.g. `21`)
    pub vat_rate_percent: Decimal,

    /// Free-form product attributes
    pub attributes: Attributes,

    /// Heating options this product can be fitted with
    pub heating_types: SmallVec<[OptionKey; 4]>,
}

impl BaseProduct {
    /// Look up an attribute by name.
    ///
    /// Explicit attributes win; `type` and `shape` fall back to the product's
    /// own fields.
    pub fn attribute(&self, key: &str) -> Option<Cow<'_, AttributeValue>> {
        if let Some(value) = self.attributes.get(key) {
            return Some(Cow::Borrowed(value));
        }

        match key {
            TYPE_ATTRIBUTE => Some(Cow::Owned(AttributeValue::Text(
                self.product_type.clone(),
            ))),
            SHAPE_ATTRIBUTE => self
                .shape
                .as_ref()
                .map(|shape| Cow::Owned(AttributeValue::Text(shape.clone()))),
            _ => None,
        }
    }

    /// Whether the product lists `option` as one of its heating types.
    pub fn supports_heating(&self, option: &OptionKey) -> bool {
        self.heating_types.contains(option)
    }
}
