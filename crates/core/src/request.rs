//! Evaluation Requests
//!
//! Boundary input as sent by API callers. Requests are validated once, here,
//! and turned into typed selections before they reach the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    keys::{GroupKey, OptionKey, ProductId},
    pricing::CustomerType,
    selections::{ConfigSelections, GroupSelection},
};

/// Errors rejecting a request before evaluation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// `productId` is empty.
    #[error("productId must not be blank")]
    BlankProductId,

    /// `selections.baseProductId` names a different product.
    #[error("selections are for {selections}, not {product}")]
    ProductMismatch {
        /// `productId` of the request
        product: ProductId,
        /// `baseProductId` of the selections
        selections: ProductId,
    },

    /// A group key is empty.
    #[error("group keys must not be blank")]
    BlankGroupKey,

    /// An option id is empty.
    #[error("option ids in group {0} must not be blank")]
    BlankOptionId(GroupKey),

    /// A quantity key is empty.
    #[error("quantity keys must not be blank")]
    BlankQuantityKey,

    /// A quantity is zero.
    #[error("quantity for {0} must be at least 1")]
    ZeroQuantity(OptionKey),

    /// The catalog has no such product.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
}

/// Evaluation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// Product to configure
    pub product_id: String,

    /// Customer type, private when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,

    /// Current selections
    #[serde(default)]
    pub selections: SelectionsInput,
}

/// Selections as sent by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionsInput {
    /// Product the selections were made for; defaults to the request's product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_product_id: Option<String>,

    /// Choices per group
    #[serde(default)]
    pub groups: BTreeMap<String, GroupInput>,

    /// Quantities per option
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quantities: BTreeMap<String, u32>,
}

/// Choices within one group as sent by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupInput {
    /// `{ "optionIds": [...] }`
    Multi {
        /// Selected options
        #[serde(rename = "optionIds")]
        option_ids: Vec<String>,
    },

    /// `{ "optionId": ... }`; a null id clears the group
    Single {
        /// Selected option
        #[serde(rename = "optionId", default)]
        option_id: Option<String>,
    },
}

/// A request that passed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Product to configure
    pub product_id: ProductId,

    /// Customer type, if given
    pub customer_type: Option<CustomerType>,

    /// Typed selections
    pub selections: ConfigSelections,
}

impl EvaluationRequest {
    /// Create a request with empty selections.
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            customer_type: None,
            selections: SelectionsInput::default(),
        }
    }

    /// Check the request shape and convert it into typed selections.
    ///
    /// Empty group entries (a null `optionId` or empty `optionIds`) are
    /// dropped. Whether keys exist in the catalog is left to the resolver.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for blank ids, mismatched products or zero
    /// quantities.
    pub fn validate(&self) -> Result<ValidatedRequest, RequestError> {
        let product_id = ProductId::new(self.product_id.trim());

        if product_id.is_blank() {
            return Err(RequestError::BlankProductId);
        }

        if let Some(base) = &self.selections.base_product_id
            && base.trim() != product_id.as_str()
        {
            return Err(RequestError::ProductMismatch {
                product: product_id,
                selections: ProductId::new(base.trim()),
            });
        }

        let mut selections = ConfigSelections::new(product_id.clone());

        for (group, input) in &self.selections.groups {
            let group = GroupKey::new(group.trim());

            if group.is_blank() {
                return Err(RequestError::BlankGroupKey);
            }

            let selection = match input {
                GroupInput::Single { option_id: None } => continue,
                GroupInput::Single {
                    option_id: Some(option_id),
                } => GroupSelection::Single {
                    option_id: OptionKey::new(option_id.trim()),
                },
                GroupInput::Multi { option_ids } if option_ids.is_empty() => continue,
                GroupInput::Multi { option_ids } => GroupSelection::Multi {
                    option_ids: option_ids
                        .iter()
                        .map(|option_id| OptionKey::new(option_id.trim()))
                        .collect(),
                },
            };

            if selection.options().iter().any(OptionKey::is_blank) {
                return Err(RequestError::BlankOptionId(group));
            }

            selections.groups.insert(group, selection);
        }

        for (option, &quantity) in &self.selections.quantities {
            let option = OptionKey::new(option.trim());

            if option.is_blank() {
                return Err(RequestError::BlankQuantityKey);
            }

            if quantity == 0 {
                return Err(RequestError::ZeroQuantity(option));
            }

            selections.set_quantity(option, quantity);
        }

        Ok(ValidatedRequest {
            product_id,
            customer_type: self.customer_type,
            selections,
        })
    }
}
