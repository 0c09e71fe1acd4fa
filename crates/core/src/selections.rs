//! Selections
//!
//! The caller's sparse record of choices per option group. The engine never
//! mutates a caller's selections; it builds a new resolved copy.

use std::{collections::BTreeMap, slice};

use serde::{Deserialize, Serialize};

use crate::{
    keys::{GroupKey, OptionKey, ProductId},
    options::OptionGroup,
};

/// Choices made within one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupSelection {
    /// A single option (`SINGLE` and `BOOLEAN` groups).
    Single {
        /// Selected option
        #[serde(rename = "optionId")]
        option_id: OptionKey,
    },

    /// Any number of options (`MULTI` groups). Repeating a key selects it
    /// more than once.
    Multi {
        /// Selected options
        #[serde(rename = "optionIds")]
        option_ids: Vec<OptionKey>,
    },
}

impl GroupSelection {
    /// Selected options, repeats included.
    pub fn options(&self) -> &[OptionKey] {
        match self {
            Self::Single { option_id } => slice::from_ref(option_id),
            Self::Multi { option_ids } => option_ids,
        }
    }

    /// Whether `option` is selected.
    pub fn contains(&self, option: &OptionKey) -> bool {
        self.options().contains(option)
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.options().is_empty()
    }
}

/// Selections for one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSelections {
    /// Base product being configured
    pub base_product_id: ProductId,

    /// Choices per group
    #[serde(default)]
    pub groups: BTreeMap<GroupKey, GroupSelection>,

    /// Quantities for options that carry one
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quantities: BTreeMap<OptionKey, u32>,
}

impl ConfigSelections {
    /// Empty selections for `base_product_id`.
    pub fn new(base_product_id: ProductId) -> Self {
        Self {
            base_product_id,
            groups: BTreeMap::new(),
            quantities: BTreeMap::new(),
        }
    }

    /// Builder form of a single-option choice.
    #[must_use]
    pub fn with_option(mut self, group: impl Into<GroupKey>, option: impl Into<OptionKey>) -> Self {
        self.groups.insert(
            group.into(),
            GroupSelection::Single {
                option_id: option.into(),
            },
        );
        self
    }

    /// Builder form of a multi-option choice.
    #[must_use]
    pub fn with_options<I, K>(mut self, group: impl Into<GroupKey>, options: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<OptionKey>,
    {
        self.groups.insert(
            group.into(),
            GroupSelection::Multi {
                option_ids: options.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Builder form of [`ConfigSelections::set_quantity`].
    #[must_use]
    pub fn with_quantity(mut self, option: impl Into<OptionKey>, quantity: u32) -> Self {
        self.set_quantity(option.into(), quantity);
        self
    }

    /// Choices for `group`, if any.
    pub fn group(&self, group: &str) -> Option<&GroupSelection> {
        self.groups.get(group)
    }

    /// Whether `option` is selected in any group.
    pub fn is_selected(&self, option: &OptionKey) -> bool {
        self.groups.values().any(|selection| selection.contains(option))
    }

    /// Every `(group, option)` pair, repeats included.
    pub fn selected_options(&self) -> impl Iterator<Item = (&GroupKey, &OptionKey)> {
        self.groups.iter().flat_map(|(group, selection)| {
            selection.options().iter().map(move |option| (group, option))
        })
    }

    /// Explicit quantity for `option`, if one was set.
    pub fn quantity(&self, option: &OptionKey) -> Option<u32> {
        self.quantities.get(option).copied()
    }

    /// Priced quantity of `option`: the explicit quantity if set, otherwise the
    /// number of times it is selected.
    pub fn quantity_of(&self, option: &OptionKey) -> u32 {
        if let Some(quantity) = self.quantity(option) {
            return quantity;
        }

        let count = self
            .selected_options()
            .filter(|(_, selected)| *selected == option)
            .count();

        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Select `option` in `group`.
    ///
    /// Exclusive groups replace their current choice; `MULTI` groups add the
    /// option unless it is already there.
    pub fn select(&mut self, group: &OptionGroup, option: OptionKey) {
        if group.selection_type.is_exclusive() {
            self.groups
                .insert(group.key.clone(), GroupSelection::Single { option_id: option });
            return;
        }

        let mut option_ids = match self.groups.remove(&group.key) {
            Some(selection) => selection.options().to_vec(),
            None => Vec::new(),
        };

        if !option_ids.contains(&option) {
            option_ids.push(option);
        }

        self.groups
            .insert(group.key.clone(), GroupSelection::Multi { option_ids });
    }

    /// Remove every occurrence of `option` from `group`, along with its quantity.
    pub fn deselect(&mut self, group: &GroupKey, option: &OptionKey) {
        let Some(selection) = self.groups.remove(group) else {
            return;
        };

        self.quantities.remove(option);

        match selection {
            GroupSelection::Single { option_id } if &option_id != option => {
                self.groups
                    .insert(group.clone(), GroupSelection::Single { option_id });
            }
            GroupSelection::Single { .. } => {}
            GroupSelection::Multi { mut option_ids } => {
                option_ids.retain(|selected| selected != option);

                if !option_ids.is_empty() {
                    self.groups
                        .insert(group.clone(), GroupSelection::Multi { option_ids });
                }
            }
        }
    }

    /// Select `option` if it is not selected in `group`, otherwise deselect it.
    ///
    /// Toggling twice restores the original selections for the group.
    pub fn toggle(&mut self, group: &OptionGroup, option: OptionKey) {
        let selected = self
            .groups
            .get(&group.key)
            .is_some_and(|selection| selection.contains(&option));

        if selected {
            self.deselect(&group.key, &option);
        } else {
            self.select(group, option);
        }
    }

    /// Drop every choice in `group`.
    pub fn clear_group(&mut self, group: &GroupKey) {
        if let Some(selection) = self.groups.remove(group) {
            for option in selection.options() {
                self.quantities.remove(option);
            }
        }
    }

    /// Set the quantity of `option`.
    pub fn set_quantity(&mut self, option: OptionKey, quantity: u32) {
        self.quantities.insert(option, quantity);
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::options::SelectionType;

    use super::*;

    fn extras() -> OptionGroup {
        OptionGroup::new("EXTRAS", SelectionType::Multi, 0)
    }

    fn lid() -> OptionGroup {
        OptionGroup::new("LID", SelectionType::Single, 0)
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let original =
            ConfigSelections::new("hottub-round-200".into()).with_options("EXTRAS", ["extra-headrest"]);

        let mut selections = original.clone();

        selections.toggle(&extras(), "extra-thermometer".into());
        assert!(selections.is_selected(&"extra-thermometer".into()));

        selections.toggle(&extras(), "extra-thermometer".into());
        assert_eq!(selections, original);
    }

    #[test]
    fn toggle_on_empty_group_round_trips() {
        let original = ConfigSelections::new("hottub-round-200".into());
        let mut selections = original.clone();

        selections.toggle(&lid(), "lid-hard".into());
        selections.toggle(&lid(), "lid-hard".into());

        assert_eq!(selections, original);
    }

    #[test]
    fn select_replaces_in_exclusive_groups() {
        let mut selections = ConfigSelections::new("p".into());

        selections.select(&lid(), "lid-soft".into());
        selections.select(&lid(), "lid-hard".into());

        assert_eq!(
            selections.group("LID"),
            Some(&GroupSelection::Single {
                option_id: "lid-hard".into()
            })
        );
    }

    #[test]
    fn select_appends_once_in_multi_groups() {
        let mut selections = ConfigSelections::new("p".into());

        selections.select(&extras(), "a".into());
        selections.select(&extras(), "b".into());
        selections.select(&extras(), "a".into());

        assert_eq!(
            selections.group("EXTRAS").map(GroupSelection::options),
            Some(&[OptionKey::from("a"), OptionKey::from("b")][..])
        );
    }

    #[test]
    fn quantity_of_counts_repeats_unless_explicit() {
        let selections = ConfigSelections::new("p".into())
            .with_options("LEDS", ["led-spot", "led-spot", "led-strip"])
            .with_quantity("led-strip", 3);

        assert_eq!(selections.quantity_of(&"led-spot".into()), 2);
        assert_eq!(selections.quantity_of(&"led-strip".into()), 3);
        assert_eq!(selections.quantity_of(&"led-none".into()), 0);
    }

    #[test]
    fn clear_group_drops_quantities() {
        let mut selections = ConfigSelections::new("p".into())
            .with_options("LEDS", ["led-spot"])
            .with_quantity("led-spot", 4);

        selections.clear_group(&"LEDS".into());

        assert!(selections.groups.is_empty());
        assert!(selections.quantities.is_empty());
    }

    #[test]
    fn deserializes_single_and_multi_shapes() -> TestResult {
        let selections: ConfigSelections = serde_norway::from_str(
            "baseProductId: hottub-round-200\ngroups:\n  LID:\n    optionId: lid-hard\n  EXTRAS:\n    optionIds: [extra-headrest]\n",
        )?;

        assert!(selections.is_selected(&"lid-hard".into()));
        assert!(selections.is_selected(&"extra-headrest".into()));
        assert!(matches!(
            selections.group("EXTRAS"),
            Some(GroupSelection::Multi { .. })
        ));

        Ok(())
    }
}
