//! Fixtures
//!
//! Catalog snapshots described in YAML. Lists keep their file order, which
//! becomes the catalog's declaration order.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    applicability::Applicability,
    attributes::Attributes,
    catalog::{Catalog, CatalogError},
    keys::{GroupKey, OptionKey, ProductId, RuleKey},
    options::{ConfigOption, OptionGroup, QuantityRule, SelectionType},
    products::BaseProduct,
    rules::{CompatibilityRule, RuleEffect, Trigger},
    tags::Tags,
    templates::StepTemplate,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A price is in a different currency than the catalog
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// The parsed snapshot is inconsistent
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Catalog snapshot as written in YAML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFixture {
    /// ISO currency code every price is expressed in
    pub currency: String,

    /// Base products
    #[serde(default)]
    pub products: Vec<ProductFixture>,

    /// Option groups
    #[serde(default)]
    pub groups: Vec<GroupFixture>,

    /// Options
    #[serde(default)]
    pub options: Vec<OptionFixture>,

    /// Compatibility rules
    #[serde(default)]
    pub rules: Vec<RuleFixture>,

    /// Step templates
    #[serde(default)]
    pub templates: Vec<StepTemplate>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductFixture {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product category
    #[serde(rename = "type")]
    pub product_type: String,

    /// Product shape
    #[serde(default)]
    pub shape: Option<String>,

    /// Base price excluding VAT (e.g. "3000.00 EUR")
    pub price: String,

    /// VAT rate (e.g. "21%")
    pub vat: String,

    /// Free-form attributes
    #[serde(default)]
    pub attributes: Attributes,

    /// Supported heating options
    #[serde(default)]
    pub heating_types: SmallVec<[OptionKey; 4]>,
}

/// Option Group Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupFixture {
    /// Group key
    pub key: GroupKey,

    /// Display name, defaults to the key
    #[serde(default)]
    pub name: Option<String>,

    /// Selection cardinality kind
    pub selection_type: SelectionType,

    /// Minimum selections
    #[serde(default)]
    pub min: Option<u32>,

    /// Maximum selections
    #[serde(default)]
    pub max: Option<u32>,

    /// Display order
    #[serde(default)]
    pub sort_order: i32,
}

/// Option Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionFixture {
    /// Option key
    pub key: OptionKey,

    /// Owning group
    pub group: GroupKey,

    /// Display name, defaults to the key
    #[serde(default)]
    pub name: Option<String>,

    /// Price excluding VAT (e.g. "450.00 EUR")
    pub price: String,

    /// VAT rate (e.g. "21%")
    pub vat: String,

    /// Option tags
    #[serde(default)]
    pub tags: Tags,

    /// Free-form attributes
    #[serde(default)]
    pub attributes: Attributes,

    /// Products the option applies to
    #[serde(default)]
    pub applies_to: Applicability,

    /// Quantity bounds for counted options
    #[serde(default)]
    pub quantity: Option<QuantityRule>,
}

/// Compatibility Rule Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFixture {
    /// Rule key
    pub key: RuleKey,

    /// Trigger, absent means "always fires"
    #[serde(default)]
    pub trigger: Trigger,

    /// Effect on the targets
    pub effect: RuleEffect,

    /// Target options
    pub targets: SmallVec<[OptionKey; 4]>,

    /// Message shown to the customer
    #[serde(default)]
    pub message: Option<String>,
}

impl CatalogFixture {
    /// Parse a snapshot from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not describe a catalog snapshot.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Build a validated [`Catalog`] from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed prices or percentages, unknown or
    /// mismatched currencies, and any [`CatalogError`].
    pub fn into_catalog(self) -> Result<Catalog, FixtureError> {
        let currency = parse_currency(&self.currency)?;
        let mut builder = Catalog::builder(currency);

        for product in self.products {
            builder = builder.product(BaseProduct {
                base_price_excl: parse_price(&product.price, currency)?,
                vat_rate_percent: parse_percentage(&product.vat)?,
                id: product.id,
                name: product.name,
                product_type: product.product_type,
                shape: product.shape,
                attributes: product.attributes,
                heating_types: product.heating_types,
            });
        }

        for group in self.groups {
            let mut option_group = OptionGroup::new(group.key, group.selection_type, group.sort_order)
                .with_bounds(group.min, group.max);

            if let Some(name) = group.name {
                option_group.name = name;
            }

            builder = builder.group(option_group);
        }

        for option in self.options {
            let mut config_option = ConfigOption::new(
                option.key,
                option.group,
                parse_price(&option.price, currency)?,
                parse_percentage(&option.vat)?,
            )
            .with_tags(option.tags)
            .applies_to(option.applies_to);

            if let Some(name) = option.name {
                config_option = config_option.named(name);
            }

            if let Some(rule) = option.quantity {
                config_option = config_option.with_quantity_rule(rule);
            }

            config_option.attributes = option.attributes;

            builder = builder.option(config_option);
        }

        for rule in self.rules {
            let mut compatibility_rule =
                CompatibilityRule::new(rule.key, rule.trigger, rule.effect, rule.targets);

            if let Some(message) = rule.message {
                compatibility_rule = compatibility_rule.with_message(message);
            }

            builder = builder.rule(compatibility_rule);
        }

        for template in self.templates {
            builder = builder.template(template);
        }

        Ok(builder.build()?)
    }
}

impl Catalog {
    /// Parse and validate a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the YAML is malformed or the snapshot is
    /// inconsistent.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, FixtureError> {
        CatalogFixture::from_yaml_str(yaml)?.into_catalog()
    }

    /// Load and validate a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or its contents
    /// are not a valid snapshot.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }
}

/// Look up a supported ISO currency.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes other than GBP, USD
/// and EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a price string (e.g. "79.95 EUR") in the catalog's currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal, or if the currency differs from `currency`.
pub fn parse_price(s: &str, currency: &'static Currency) -> Result<Decimal, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let found = parse_currency(code)?;

    if found != currency {
        return Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        ));
    }

    Ok(amount)
}

/// Parse a percentage (e.g. "21%" or "21") into percent points.
///
/// # Errors
///
/// Returns an error if the value is not a decimal.
pub fn parse_percentage(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();
    let points = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    points
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
}
