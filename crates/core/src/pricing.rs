//! Pricing
//!
//! VAT-aware price breakdown for resolved selections.

use std::collections::BTreeSet;

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    keys::{GroupKey, OptionKey},
    products::BaseProduct,
    selections::ConfigSelections,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Errors that can occur while pricing a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Decimal arithmetic overflowed.
    #[error("price arithmetic overflowed on {0}")]
    Overflow(String),

    /// The resolved selections name an option missing from the catalog.
    #[error("missing option {0}")]
    MissingOption(OptionKey),
}

/// Who is buying; decides which price figure is shown first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// Consumer, shown prices including VAT
    #[default]
    #[serde(alias = "PRIVATE")]
    Private,

    /// Business, shown prices excluding VAT
    #[serde(alias = "COMPANY")]
    Company,
}

impl CustomerType {
    /// Price basis displayed first to this customer.
    pub fn primary_basis(self) -> PriceBasis {
        match self {
            Self::Private => PriceBasis::Incl,
            Self::Company => PriceBasis::Excl,
        }
    }
}

/// Whether a figure includes VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceBasis {
    /// Excluding VAT
    Excl,

    /// Including VAT
    Incl,
}

/// What a breakdown line prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLineKind {
    /// The base product
    Base,

    /// A selected option
    Option,
}

/// One line of the price breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    /// Line kind
    pub kind: PriceLineKind,

    /// Product id or option key
    pub key: String,

    /// Owning group, `None` for the base line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupKey>,

    /// Display name
    pub name: String,

    /// Units priced
    pub quantity: u32,

    /// Price per unit excluding VAT, zero when included
    pub price_excl: Decimal,

    /// VAT rate in percent
    pub vat_rate_percent: Decimal,

    /// Price per unit including VAT, rounded to cents
    pub price_incl: Decimal,

    /// `price_excl * quantity`
    pub line_total_excl: Decimal,

    /// VAT on the line
    pub line_vat: Decimal,

    /// `line_total_excl + line_vat`
    pub line_total_incl: Decimal,

    /// Bundled by a rule at no cost
    pub included: bool,
}

/// Full price breakdown and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    /// Currency of every amount
    #[serde(serialize_with = "serialize_currency")]
    pub currency: &'static Currency,

    /// Figure to show first
    pub primary_basis: PriceBasis,

    /// Sum of line totals excluding VAT
    pub total_excl: Decimal,

    /// Sum of line VAT
    pub vat_total: Decimal,

    /// `total_excl + vat_total`
    pub total_incl: Decimal,

    /// Lines in display order
    pub breakdown: Vec<PriceLine>,
}

impl PricingResult {
    /// Zero totals and no lines.
    pub fn empty(currency: &'static Currency, primary_basis: PriceBasis) -> Self {
        Self {
            currency,
            primary_basis,
            total_excl: Decimal::ZERO,
            vat_total: Decimal::ZERO,
            total_incl: Decimal::ZERO,
            breakdown: Vec::new(),
        }
    }

    /// The total matching [`PricingResult::primary_basis`].
    pub fn primary_total(&self) -> Decimal {
        match self.primary_basis {
            PriceBasis::Excl => self.total_excl,
            PriceBasis::Incl => self.total_incl,
        }
    }

    /// Breakdown line for a product id or option key.
    pub fn line(&self, key: &str) -> Option<&PriceLine> {
        self.breakdown.iter().find(|line| line.key == key)
    }
}

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "signature required by serialize_with"
)]
fn serialize_currency<S: Serializer>(
    currency: &&'static Currency,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(currency.iso_alpha_code)
}

/// Round to cents, halves away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Price `resolved` selections for `product`.
///
/// Lines come in display order: the base product, then groups by sort order,
/// then options by declaration order. Options in `included` are priced at zero.
///
/// # Errors
///
/// Returns a [`PricingError`] if decimal arithmetic overflows or a selected
/// option is missing from the catalog.
pub fn price(
    catalog: &Catalog,
    product: &BaseProduct,
    resolved: &ConfigSelections,
    included: &BTreeSet<OptionKey>,
    customer_type: CustomerType,
) -> Result<PricingResult, PricingError> {
    let mut breakdown = vec![LineInput {
        kind: PriceLineKind::Base,
        key: product.id.as_str(),
        group: None,
        name: &product.name,
        quantity: 1,
        price_excl: product.base_price_excl,
        vat_rate_percent: product.vat_rate_percent,
        included: false,
    }
    .price()?];

    for group in catalog.groups_in_display_order() {
        for option in catalog.options_in_group(&group.key) {
            if !resolved.is_selected(&option.key) {
                continue;
            }

            let line = LineInput {
                kind: PriceLineKind::Option,
                key: option.key.as_str(),
                group: Some(&group.key),
                name: &option.name,
                quantity: resolved.quantity_of(&option.key),
                price_excl: option.price_excl,
                vat_rate_percent: option.vat_rate_percent,
                included: included.contains(&option.key),
            }
            .price()?;

            breakdown.push(line);
        }
    }

    if let Some((_, option)) = resolved
        .selected_options()
        .find(|(_, option)| catalog.option(option.as_str()).is_none())
    {
        return Err(PricingError::MissingOption(option.clone()));
    }

    let (total_excl, vat_total) = breakdown.iter().try_fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(excl, vat), line| {
            let excl = excl.checked_add(line.line_total_excl);
            let vat = vat.checked_add(line.line_vat);

            excl.zip(vat)
                .ok_or_else(|| PricingError::Overflow("totals".to_string()))
        },
    )?;

    let total_incl = total_excl
        .checked_add(vat_total)
        .ok_or_else(|| PricingError::Overflow("totals".to_string()))?;

    Ok(PricingResult {
        currency: catalog.currency(),
        primary_basis: customer_type.primary_basis(),
        total_excl,
        vat_total,
        total_incl,
        breakdown,
    })
}

struct LineInput<'a> {
    kind: PriceLineKind,
    key: &'a str,
    group: Option<&'a GroupKey>,
    name: &'a str,
    quantity: u32,
    price_excl: Decimal,
    vat_rate_percent: Decimal,
    included: bool,
}

impl LineInput<'_> {
    fn price(self) -> Result<PriceLine, PricingError> {
        let overflow = || PricingError::Overflow(self.key.to_string());

        let price_excl = if self.included {
            Decimal::ZERO
        } else {
            self.price_excl
        };

        let factor = self
            .vat_rate_percent
            .checked_div(HUNDRED)
            .and_then(|rate| Decimal::ONE.checked_add(rate))
            .ok_or_else(overflow)?;

        let price_incl = round_cents(
            price_excl
                .checked_mul(factor)
                .ok_or_else(overflow)?,
        );

        let quantity = Decimal::from(self.quantity);

        let line_total_excl = price_excl
            .checked_mul(quantity)
            .ok_or_else(overflow)?;

        let line_vat = price_incl
            .checked_sub(price_excl)
            .and_then(|vat| vat.checked_mul(quantity))
            .ok_or_else(overflow)?;

        let line_total_incl = line_total_excl
            .checked_add(line_vat)
            .ok_or_else(overflow)?;

        Ok(PriceLine {
            kind: self.kind,
            key: self.key.to_string(),
            group: self.group.cloned(),
            name: self.name.to_string(),
            quantity: self.quantity,
            price_excl,
            vat_rate_percent: self.vat_rate_percent,
            price_incl,
            line_total_excl,
            line_vat,
            line_total_incl,
            included: self.included,
        })
    }
}
