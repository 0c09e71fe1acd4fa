//! Compatibility Rules
//!
//! A rule links a trigger over the current selections to an effect on a set of
//! target options. Rules carry no state between evaluations.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::{
    applicability::BoolOp,
    keys::{OptionKey, RuleKey},
    tags::Tags,
};

/// Read access to the selections a trigger is evaluated against.
pub trait SelectionState {
    /// Whether `option` is currently selected.
    fn is_selected(&self, option: &OptionKey) -> bool;

    /// Whether any selected option carries one of `tags`.
    fn any_selected_tagged(&self, tags: &Tags) -> bool;
}

/// Trigger expression.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Trigger {
    /// How `conditions` are combined.
    #[serde(default)]
    pub op: BoolOp,

    /// Child conditions. Empty means "always fires".
    #[serde(default)]
    pub conditions: SmallVec<[TriggerCondition; 2]>,
}

/// Single trigger condition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// `option` is selected.
    Selected {
        /// Option key
        option: OptionKey,
    },

    /// `option` is not selected.
    NotSelected {
        /// Option key
        option: OptionKey,
    },

    /// At least one of `options` is selected.
    AnySelected {
        /// Option keys
        options: SmallVec<[OptionKey; 4]>,
    },

    /// At least one selected option carries one of `tags`.
    AnyTagged {
        /// Tags to look for
        tags: Tags,
    },

    /// Nested expression.
    Group(Box<Trigger>),
}

impl Trigger {
    /// Create a trigger from operator and conditions.
    #[must_use]
    pub fn new(op: BoolOp, conditions: SmallVec<[TriggerCondition; 2]>) -> Self {
        Self { op, conditions }
    }

    /// Fires unconditionally.
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Fires when `option` is selected.
    #[must_use]
    pub fn selected(option: impl Into<OptionKey>) -> Self {
        Self {
            op: BoolOp::And,
            conditions: smallvec![TriggerCondition::Selected {
                option: option.into()
            }],
        }
    }

    /// Fires when any of `options` is selected.
    #[must_use]
    pub fn any_selected<I, K>(options: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<OptionKey>,
    {
        Self {
            op: BoolOp::And,
            conditions: smallvec![TriggerCondition::AnySelected {
                options: options.into_iter().map(Into::into).collect(),
            }],
        }
    }

    /// Evaluate the trigger against `state`.
    pub fn fires(&self, state: &impl SelectionState) -> bool {
        if self.conditions.is_empty() {
            return true;
        }

        match self.op {
            BoolOp::And => self.conditions.iter().all(|condition| condition.holds(state)),
            BoolOp::Or => self.conditions.iter().any(|condition| condition.holds(state)),
        }
    }

    /// Every option key the trigger mentions.
    pub fn referenced_options(&self) -> Vec<&OptionKey> {
        let mut keys = Vec::new();

        for condition in &self.conditions {
            match condition {
                TriggerCondition::Selected { option } | TriggerCondition::NotSelected { option } => {
                    keys.push(option);
                }
                TriggerCondition::AnySelected { options } => keys.extend(options.iter()),
                TriggerCondition::AnyTagged { .. } => {}
                TriggerCondition::Group(group) => keys.extend(group.referenced_options()),
            }
        }

        keys
    }
}

impl TriggerCondition {
    fn holds(&self, state: &impl SelectionState) -> bool {
        match self {
            Self::Selected { option } => state.is_selected(option),
            Self::NotSelected { option } => !state.is_selected(option),
            Self::AnySelected { options } => options.iter().any(|option| state.is_selected(option)),
            Self::AnyTagged { tags } => state.any_selected_tagged(tags),
            Self::Group(group) => group.fires(state),
        }
    }
}

/// What a fired rule does to its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    /// Targets stay visible but cannot be selected.
    Disable,

    /// Targets are removed from view.
    Hide,

    /// Targets are selected unless the caller already chose in their group.
    ForceSelect,

    /// At least one target must be selected before checkout.
    RequireOneOf,

    /// Like [`RuleEffect::ForceSelect`], and the target is bundled at no cost.
    Include,
}

impl RuleEffect {
    /// Whether the effect adds its targets to the selections.
    pub fn selects(self) -> bool {
        matches!(self, Self::ForceSelect | Self::Include)
    }
}

/// A catalog-declared constraint between options.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityRule {
    /// Rule key
    pub key: RuleKey,

    /// When the rule fires
    pub trigger: Trigger,

    /// What the rule does
    pub effect: RuleEffect,

    /// Options the effect applies to
    pub targets: SmallVec<[OptionKey; 4]>,

    /// Human-readable explanation shown to the customer
    pub message: Option<String>,
}

impl CompatibilityRule {
    /// Create a rule without a message.
    pub fn new<I, K>(key: impl Into<RuleKey>, trigger: Trigger, effect: RuleEffect, targets: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<OptionKey>,
    {
        Self {
            key: key.into(),
            trigger,
            effect,
            targets: targets.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Reason recorded against each target when the rule fires.
    pub fn reason(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        match self.effect {
            RuleEffect::Disable => format!("disabled-by:{}", self.key),
            RuleEffect::Hide => format!("hidden-by:{}", self.key),
            RuleEffect::ForceSelect => format!("selected-by:{}", self.key),
            RuleEffect::RequireOneOf => format!("required-by:{}", self.key),
            RuleEffect::Include => format!("included-by:{}", self.key),
        }
    }
}
