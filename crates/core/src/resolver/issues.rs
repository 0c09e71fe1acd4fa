//! Resolver Issues
//!
//! Everything the resolver reports back. None of these are raised as errors:
//! they travel inside the evaluation result.

use serde::Serialize;
use thiserror::Error;

use crate::keys::{GroupKey, OptionKey, RuleKey};

/// Reason recorded for options hidden because they do not apply to the product.
pub const NOT_APPLICABLE: &str = "not-applicable";

/// Recoverable problems with the caller's selections.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ValidationError {
    /// The selections name a group the catalog does not have.
    #[error("unknown option group {group}")]
    UnknownGroup {
        /// Group as sent by the caller
        group: GroupKey,
    },

    /// The selections name an option the catalog does not have.
    #[error("unknown option {option} in group {group}")]
    UnknownOption {
        /// Group as sent by the caller
        group: GroupKey,
        /// Option as sent by the caller
        option: OptionKey,
    },

    /// An option was sent under a group it does not belong to.
    #[error("option {option} belongs to {expected}, not {group}")]
    OptionGroupMismatch {
        /// Group as sent by the caller
        group: GroupKey,
        /// Option as sent by the caller
        option: OptionKey,
        /// Group the option belongs to
        expected: GroupKey,
    },

    /// A hidden option was selected and has been dropped.
    #[error("option {option} is not available: {reason}")]
    HiddenSelection {
        /// Owning group
        group: GroupKey,
        /// Dropped option
        option: OptionKey,
        /// Why the option is hidden
        reason: String,
    },

    /// A disabled option was selected and has been dropped.
    #[error("option {option} cannot be selected: {reason}")]
    DisabledSelection {
        /// Owning group
        group: GroupKey,
        /// Dropped option
        option: OptionKey,
        /// Why the option is disabled
        reason: String,
    },

    /// Fewer options selected than the group's minimum.
    #[error("group {group} needs at least {min} selection(s), has {selected}")]
    TooFewSelections {
        /// Offending group
        group: GroupKey,
        /// Group minimum
        min: u32,
        /// Distinct options selected
        selected: u32,
    },

    /// More options selected than the group's maximum.
    #[error("group {group} allows at most {max} selection(s), has {selected}")]
    TooManySelections {
        /// Offending group
        group: GroupKey,
        /// Group maximum
        max: u32,
        /// Distinct options selected
        selected: u32,
    },

    /// A quantity lies outside the option's quantity rule; it has been clamped.
    #[error("quantity {quantity} for {option} must be between {min} and {max}")]
    QuantityOutOfRange {
        /// Owning group
        group: GroupKey,
        /// Offending option
        option: OptionKey,
        /// Quantity as sent by the caller
        quantity: u32,
        /// Rule minimum
        min: u32,
        /// Rule maximum
        max: u32,
    },

    /// A quantity was sent for a selected option that does not carry one.
    #[error("option {option} does not take a quantity")]
    UnexpectedQuantity {
        /// Owning group
        group: GroupKey,
        /// Offending option
        option: OptionKey,
    },
}

impl ValidationError {
    /// Group the issue belongs to, when the group exists in the catalog.
    pub fn group(&self) -> Option<&GroupKey> {
        match self {
            Self::UnknownGroup { .. } => None,
            Self::UnknownOption { group, .. }
            | Self::OptionGroupMismatch { group, .. }
            | Self::HiddenSelection { group, .. }
            | Self::DisabledSelection { group, .. }
            | Self::TooFewSelections { group, .. }
            | Self::TooManySelections { group, .. }
            | Self::QuantityOutOfRange { group, .. }
            | Self::UnexpectedQuantity { group, .. } => Some(group),
        }
    }
}

/// A fired `require_one_of` rule with no satisfied target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    /// Rule that raised the requirement
    pub rule: RuleKey,

    /// Group of the first target
    pub group: GroupKey,

    /// Options any one of which satisfies the requirement
    pub options: Vec<OptionKey>,

    /// Human-readable message
    pub message: String,
}

/// Problems with the catalog data itself rather than the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ConfigurationError {
    /// Rule application kept changing selections.
    #[error("rule application did not settle within {bound} passes")]
    RulesDidNotSettle {
        /// Pass bound
        bound: usize,
    },

    /// A group requires more options than the product can ever offer.
    #[error("group {group} requires {min} option(s) but only {available} apply")]
    UnsatisfiableGroup {
        /// Offending group
        group: GroupKey,
        /// Group minimum
        min: u32,
        /// Options applicable to the product
        available: u32,
    },

    /// Price arithmetic overflowed.
    #[error("pricing failed: {message}")]
    Pricing {
        /// Underlying error
        message: String,
    },
}
