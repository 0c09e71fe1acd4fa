//! Configurator prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    applicability::{Applicability, ApplicabilityRule, BoolOp},
    attributes::{AttributeValue, Attributes},
    catalog::{Catalog, CatalogBuilder, CatalogError},
    evaluation::{Configurator, EvaluationResult, evaluate},
    fixtures::{CatalogFixture, FixtureError},
    keys::{GroupKey, OptionKey, ProductId, RuleKey},
    options::{ConfigOption, OptionGroup, QuantityRule, SelectionType},
    pricing::{
        CustomerType, PriceBasis, PriceLine, PriceLineKind, PricingError, PricingResult, price,
    },
    products::BaseProduct,
    quote::QuoteError,
    request::{EvaluationRequest, GroupInput, RequestError, SelectionsInput, ValidatedRequest},
    resolver::{
        Resolution,
        issues::{ConfigurationError, Requirement, ValidationError},
        resolve,
    },
    rules::{CompatibilityRule, RuleEffect, SelectionState, Trigger, TriggerCondition},
    selections::{ConfigSelections, GroupSelection},
    tags::Tags,
    templates::{Step, StepProgress, StepTemplate},
};
