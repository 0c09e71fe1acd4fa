//! Evaluation
//!
//! Single entry point composing the resolver and the pricing calculator.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error};

use crate::{
    catalog::Catalog,
    keys::OptionKey,
    pricing::{CustomerType, PricingResult, price},
    products::BaseProduct,
    request::{EvaluationRequest, RequestError},
    resolver::{
        Resolution,
        issues::{ConfigurationError, Requirement, ValidationError},
        resolve,
    },
    selections::ConfigSelections,
};

/// Everything a caller needs to render the configurator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Step template driving the flow
    pub template_key: String,

    /// Selections after defaults and rules
    pub resolved_selections: ConfigSelections,

    /// Options that cannot be selected, with reasons
    pub disabled_options: BTreeMap<OptionKey, String>,

    /// Options removed from view, with reasons
    pub hidden_options: BTreeMap<OptionKey, String>,

    /// Unmet preconditions
    pub requirements: Vec<Requirement>,

    /// Problems with the caller's selections
    pub validation_errors: Vec<ValidationError>,

    /// Problems with the catalog data
    pub configuration_errors: Vec<ConfigurationError>,

    /// Price breakdown of the resolved selections
    pub pricing: PricingResult,
}

impl EvaluationResult {
    /// Whether the customer may move on: no requirements and no validation errors.
    pub fn can_proceed(&self) -> bool {
        self.requirements.is_empty() && self.validation_errors.is_empty()
    }
}

/// Evaluate `selections` for `product`.
///
/// Pure: the same inputs always give an equal result. A missing customer type
/// prices for a private customer.
#[tracing::instrument(skip_all, fields(product_id = %product.id))]
pub fn evaluate(
    catalog: &Catalog,
    product: &BaseProduct,
    customer_type: Option<CustomerType>,
    selections: &ConfigSelections,
) -> EvaluationResult {
    let customer_type = customer_type.unwrap_or_default();

    let Resolution {
        resolved_selections,
        disabled_options,
        hidden_options,
        included_options,
        requirements,
        validation_errors,
        mut configuration_errors,
        passes,
    } = resolve(catalog, product, selections);

    let pricing = match price(
        catalog,
        product,
        &resolved_selections,
        &included_options,
        customer_type,
    ) {
        Ok(pricing) => pricing,
        Err(err) => {
            configuration_errors.push(ConfigurationError::Pricing {
                message: err.to_string(),
            });

            PricingResult::empty(catalog.currency(), customer_type.primary_basis())
        }
    };

    for issue in &configuration_errors {
        error!(%issue, "catalog configuration error");
    }

    let template_key = catalog
        .template_for(&product.product_type)
        .map_or_else(|| product.product_type.clone(), |template| template.key.clone());

    debug!(
        passes,
        total_excl = %pricing.total_excl,
        total_incl = %pricing.total_incl,
        "evaluated configuration"
    );

    EvaluationResult {
        template_key,
        resolved_selections,
        disabled_options,
        hidden_options,
        requirements,
        validation_errors,
        configuration_errors,
        pricing,
    }
}

/// Evaluation service bound to one catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Configurator<'c> {
    catalog: &'c Catalog,
}

impl<'c> Configurator<'c> {
    /// Bind to `catalog`.
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Catalog snapshot in use.
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Evaluate selections for a product looked up by id.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnknownProduct`] if the catalog has no such product.
    pub fn evaluate(
        &self,
        product_id: &str,
        customer_type: Option<CustomerType>,
        selections: &ConfigSelections,
    ) -> Result<EvaluationResult, RequestError> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| RequestError::UnknownProduct(product_id.into()))?;

        Ok(evaluate(self.catalog, product, customer_type, selections))
    }

    /// Validate and evaluate a boundary request.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request is malformed or names an
    /// unknown product.
    pub fn evaluate_request(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, RequestError> {
        let validated = request.validate()?;

        self.evaluate(
            validated.product_id.as_str(),
            validated.customer_type,
            &validated.selections,
        )
    }
}
