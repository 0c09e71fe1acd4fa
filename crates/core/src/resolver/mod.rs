//! Rule Resolver
//!
//! Turns the caller's selections into resolved selections plus the sets of
//! hidden and disabled options, unmet requirements and validation errors.
//!
//! Resolution runs in passes. Each pass evaluates every rule trigger against
//! the previous pass's selections, re-applies the caller's choices minus
//! anything hidden or disabled, adds rule-forced choices to groups the caller
//! left empty, then fills single-candidate required groups with their default.
//! Passes repeat until the selections stop changing.

use std::{
    collections::{BTreeMap, BTreeSet},
    iter,
};

use tracing::debug;

use crate::{
    catalog::Catalog,
    keys::{GroupKey, OptionKey},
    options::SelectionType,
    products::BaseProduct,
    rules::{CompatibilityRule, RuleEffect, SelectionState},
    selections::{ConfigSelections, GroupSelection},
    tags::Tags,
};

pub mod issues;

use issues::{ConfigurationError, NOT_APPLICABLE, Requirement, ValidationError};

/// Option key to the reason it is hidden or disabled.
pub type ReasonMap = BTreeMap<OptionKey, String>;

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Selections after defaults and rule-forced choices
    pub resolved_selections: ConfigSelections,

    /// Options that cannot be selected
    pub disabled_options: ReasonMap,

    /// Options removed from view
    pub hidden_options: ReasonMap,

    /// Selected options bundled at no cost
    pub included_options: BTreeSet<OptionKey>,

    /// Unmet preconditions blocking checkout
    pub requirements: Vec<Requirement>,

    /// Problems with the caller's selections
    pub validation_errors: Vec<ValidationError>,

    /// Problems with the catalog data
    pub configuration_errors: Vec<ConfigurationError>,

    /// Passes run before the selections settled
    pub passes: usize,
}

/// Resolve `selections` for `product` against `catalog`.
///
/// Never fails: malformed references, cardinality violations and unstable
/// rule sets are all reported inside the returned [`Resolution`].
pub fn resolve(
    catalog: &Catalog,
    product: &BaseProduct,
    selections: &ConfigSelections,
) -> Resolution {
    let mut validation_errors = Vec::new();
    let mut configuration_errors = Vec::new();

    let not_applicable = applicability_filter(catalog, product);

    configuration_errors.extend(unsatisfiable_groups(catalog, &not_applicable));

    let (explicit, repeats) = explicit_selections(catalog, selections, &mut validation_errors);

    let bound = catalog.rules().len().saturating_add(2);
    let mut previous = explicit.without(|option| not_applicable.contains_key(option));
    let mut outcome = run_pass(catalog, &not_applicable, &explicit, &previous);
    let mut passes = 1;

    while outcome.selections != previous {
        if passes >= bound {
            configuration_errors.push(ConfigurationError::RulesDidNotSettle { bound });
            break;
        }

        previous = outcome.selections.clone();
        outcome = run_pass(catalog, &not_applicable, &explicit, &previous);
        passes += 1;
    }

    let PassOutcome {
        selections: working,
        hidden,
        disabled,
        included,
        fired,
    } = outcome;

    for (group, option) in explicit.iter() {
        if working.contains(option) {
            continue;
        }

        if let Some(reason) = hidden.get(option) {
            validation_errors.push(ValidationError::HiddenSelection {
                group: group.clone(),
                option: option.clone(),
                reason: reason.clone(),
            });
        } else if let Some(reason) = disabled.get(option) {
            validation_errors.push(ValidationError::DisabledSelection {
                group: group.clone(),
                option: option.clone(),
                reason: reason.clone(),
            });
        }
    }

    validation_errors.extend(cardinality_errors(catalog, &working));

    let quantities = resolve_quantities(catalog, selections, &working, &repeats, &mut validation_errors);
    let requirements = unmet_requirements(catalog, &fired, &working);
    let resolved_selections = working.to_selections(catalog, product, &repeats, quantities);

    debug!(
        passes,
        hidden = hidden.len(),
        disabled = disabled.len(),
        requirements = requirements.len(),
        validation_errors = validation_errors.len(),
        "resolved selections"
    );

    Resolution {
        resolved_selections,
        disabled_options: disabled,
        hidden_options: hidden,
        included_options: included,
        requirements,
        validation_errors,
        configuration_errors,
        passes,
    }
}

/// Options that do not apply to `product`, hidden before any rule runs.
pub fn applicability_filter(catalog: &Catalog, product: &BaseProduct) -> ReasonMap {
    catalog
        .options()
        .iter()
        .filter(|option| !option.applies_to.matches(product, &option.key))
        .map(|option| (option.key.clone(), NOT_APPLICABLE.to_string()))
        .collect()
}

/// Distinct options per group, each list in catalog declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Working {
    groups: BTreeMap<GroupKey, Vec<OptionKey>>,
}

impl Working {
    fn insert(&mut self, catalog: &Catalog, group: &GroupKey, option: OptionKey) {
        let options = self.groups.entry(group.clone()).or_default();

        if options.contains(&option) {
            return;
        }

        let position = catalog.option_position(option.as_str());
        let idx = options
            .partition_point(|existing| catalog.option_position(existing.as_str()) < position);

        options.insert(idx, option);
    }

    fn contains(&self, option: &OptionKey) -> bool {
        self.groups.values().any(|options| options.contains(option))
    }

    fn count(&self, group: &GroupKey) -> usize {
        self.groups.get(group).map_or(0, Vec::len)
    }

    fn is_empty_group(&self, group: &GroupKey) -> bool {
        self.count(group) == 0
    }

    fn iter(&self) -> impl Iterator<Item = (&GroupKey, &OptionKey)> {
        self.groups
            .iter()
            .flat_map(|(group, options)| options.iter().map(move |option| (group, option)))
    }

    /// Copy without the options matching `remove`; emptied groups disappear.
    fn without(&self, remove: impl Fn(&OptionKey) -> bool) -> Self {
        let groups = self
            .groups
            .iter()
            .filter_map(|(group, options)| {
                let kept: Vec<OptionKey> = options
                    .iter()
                    .filter(|option| !remove(option))
                    .cloned()
                    .collect();

                (!kept.is_empty()).then(|| (group.clone(), kept))
            })
            .collect();

        Self { groups }
    }

    fn to_selections(
        &self,
        catalog: &Catalog,
        product: &BaseProduct,
        repeats: &BTreeMap<OptionKey, u32>,
        quantities: BTreeMap<OptionKey, u32>,
    ) -> ConfigSelections {
        let groups = self
            .groups
            .iter()
            .map(|(group, options)| {
                let exclusive = catalog
                    .group(group.as_str())
                    .is_some_and(|group| group.selection_type.is_exclusive());

                let selection = match options.as_slice() {
                    [only] if exclusive => GroupSelection::Single {
                        option_id: only.clone(),
                    },
                    _ => GroupSelection::Multi {
                        option_ids: options
                            .iter()
                            .flat_map(|option| {
                                let times = if exclusive || quantities.contains_key(option) {
                                    1
                                } else {
                                    repeats.get(option).copied().unwrap_or(1)
                                };

                                iter::repeat_n(option.clone(), usize::try_from(times).unwrap_or(1))
                            })
                            .collect(),
                    },
                };

                (group.clone(), selection)
            })
            .collect();

        ConfigSelections {
            base_product_id: product.id.clone(),
            groups,
            quantities,
        }
    }
}

struct SelectionView<'a> {
    catalog: &'a Catalog,
    working: &'a Working,
}

impl SelectionState for SelectionView<'_> {
    fn is_selected(&self, option: &OptionKey) -> bool {
        self.working.contains(option)
    }

    fn any_selected_tagged(&self, tags: &Tags) -> bool {
        self.working.iter().any(|(_, option)| {
            self.catalog
                .option(option.as_str())
                .is_some_and(|option| option.tags.intersects(tags))
        })
    }
}

struct PassOutcome<'c> {
    selections: Working,
    hidden: ReasonMap,
    disabled: ReasonMap,
    included: BTreeSet<OptionKey>,
    fired: Vec<&'c CompatibilityRule>,
}

fn run_pass<'c>(
    catalog: &'c Catalog,
    not_applicable: &ReasonMap,
    explicit: &Working,
    previous: &Working,
) -> PassOutcome<'c> {
    let view = SelectionView {
        catalog,
        working: previous,
    };

    let fired: Vec<&CompatibilityRule> = catalog
        .rules()
        .iter()
        .filter(|rule| rule.trigger.fires(&view))
        .collect();

    let mut hidden = not_applicable.clone();
    let mut disabled = ReasonMap::new();

    for rule in &fired {
        let reasons = match rule.effect {
            RuleEffect::Hide => &mut hidden,
            RuleEffect::Disable => &mut disabled,
            RuleEffect::ForceSelect | RuleEffect::RequireOneOf | RuleEffect::Include => continue,
        };

        for target in &rule.targets {
            reasons
                .entry(target.clone())
                .or_insert_with(|| rule.reason());
        }
    }

    let blocked =
        |option: &OptionKey| hidden.contains_key(option) || disabled.contains_key(option);

    let mut selections = explicit.without(blocked);
    let chosen_groups: BTreeSet<GroupKey> = selections.groups.keys().cloned().collect();

    for rule in fired.iter().filter(|rule| rule.effect.selects()) {
        for target in &rule.targets {
            if blocked(target) {
                continue;
            }

            let Some(option) = catalog.option(target.as_str()) else {
                continue;
            };

            let Some(group) = catalog.group(option.group.as_str()) else {
                continue;
            };

            if chosen_groups.contains(&group.key) {
                continue;
            }

            if !group.selection_type.is_exclusive() || selections.is_empty_group(&group.key) {
                selections.insert(catalog, &group.key, target.clone());
            }
        }
    }

    resolve_defaults(catalog, &mut selections, blocked);

    let included = fired
        .iter()
        .filter(|rule| rule.effect == RuleEffect::Include)
        .flat_map(|rule| rule.targets.iter())
        .filter(|target| selections.contains(target))
        .cloned()
        .collect();

    PassOutcome {
        selections,
        hidden,
        disabled,
        included,
        fired,
    }
}

/// Auto-select the only available option of required single groups the
/// caller left empty.
///
/// `blocked` is fixed within a pass and a filled group is never revisited, so
/// one sweep is final. Defaults that enable further rules chain through the
/// outer rule passes.
fn resolve_defaults(
    catalog: &Catalog,
    selections: &mut Working,
    blocked: impl Fn(&OptionKey) -> bool,
) {
    for group in catalog.groups_in_display_order() {
        if group.selection_type != SelectionType::Single
            || !group.is_required()
            || !selections.is_empty_group(&group.key)
        {
            continue;
        }

        let mut candidates = catalog
            .options_in_group(&group.key)
            .filter(|option| !blocked(&option.key));

        if let (Some(only), None) = (candidates.next(), candidates.next()) {
            selections.insert(catalog, &group.key, only.key.clone());
        }
    }
}

fn explicit_selections(
    catalog: &Catalog,
    selections: &ConfigSelections,
    errors: &mut Vec<ValidationError>,
) -> (Working, BTreeMap<OptionKey, u32>) {
    let mut working = Working::default();
    let mut repeats: BTreeMap<OptionKey, u32> = BTreeMap::new();

    for (group_key, selection) in &selections.groups {
        let Some(group) = catalog.group(group_key.as_str()) else {
            errors.push(ValidationError::UnknownGroup {
                group: group_key.clone(),
            });
            continue;
        };

        for option_key in selection.options() {
            let Some(option) = catalog.option(option_key.as_str()) else {
                errors.push(ValidationError::UnknownOption {
                    group: group_key.clone(),
                    option: option_key.clone(),
                });
                continue;
            };

            if option.group != group.key {
                errors.push(ValidationError::OptionGroupMismatch {
                    group: group_key.clone(),
                    option: option_key.clone(),
                    expected: option.group.clone(),
                });
                continue;
            }

            if working.contains(option_key) {
                if !group.selection_type.is_exclusive() {
                    let count = repeats.entry(option_key.clone()).or_insert(1);
                    *count = count.saturating_add(1);
                }

                continue;
            }

            working.insert(catalog, &group.key, option_key.clone());
        }
    }

    (working, repeats)
}

fn unsatisfiable_groups(catalog: &Catalog, not_applicable: &ReasonMap) -> Vec<ConfigurationError> {
    catalog
        .groups_in_display_order()
        .filter_map(|group| {
            let min = group.min_selected();

            if min == 0 {
                return None;
            }

            let applicable = catalog
                .options_in_group(&group.key)
                .filter(|option| !not_applicable.contains_key(&option.key))
                .count();
            let applicable = u32::try_from(applicable).unwrap_or(u32::MAX);
            let available = group
                .max_selected()
                .map_or(applicable, |max| max.min(applicable));

            (min > available).then(|| ConfigurationError::UnsatisfiableGroup {
                group: group.key.clone(),
                min,
                available,
            })
        })
        .collect()
}

fn cardinality_errors(catalog: &Catalog, working: &Working) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for group in catalog.groups_in_display_order() {
        let selected = u32::try_from(working.count(&group.key)).unwrap_or(u32::MAX);
        let min = group.min_selected();

        if selected < min {
            errors.push(ValidationError::TooFewSelections {
                group: group.key.clone(),
                min,
                selected,
            });
        }

        if let Some(max) = group.max_selected()
            && selected > max
        {
            errors.push(ValidationError::TooManySelections {
                group: group.key.clone(),
                max,
                selected,
            });
        }
    }

    errors
}

fn resolve_quantities(
    catalog: &Catalog,
    selections: &ConfigSelections,
    working: &Working,
    repeats: &BTreeMap<OptionKey, u32>,
    errors: &mut Vec<ValidationError>,
) -> BTreeMap<OptionKey, u32> {
    let mut quantities = BTreeMap::new();

    for (group, option_key) in working.iter() {
        let Some(option) = catalog.option(option_key.as_str()) else {
            continue;
        };

        let requested = selections.quantity(option_key);

        let Some(rule) = option.quantity_rule else {
            if requested.is_some() {
                errors.push(ValidationError::UnexpectedQuantity {
                    group: group.clone(),
                    option: option_key.clone(),
                });
            }

            continue;
        };

        let quantity = requested
            .or_else(|| repeats.get(option_key).copied())
            .unwrap_or(rule.default);

        if !rule.accepts(quantity) {
            errors.push(ValidationError::QuantityOutOfRange {
                group: group.clone(),
                option: option_key.clone(),
                quantity,
                min: rule.min,
                max: rule.max,
            });
        }

        quantities.insert(option_key.clone(), rule.clamp(quantity));
    }

    quantities
}

fn unmet_requirements(
    catalog: &Catalog,
    fired: &[&CompatibilityRule],
    working: &Working,
) -> Vec<Requirement> {
    fired
        .iter()
        .filter(|rule| rule.effect == RuleEffect::RequireOneOf)
        .filter(|rule| !rule.targets.iter().any(|target| working.contains(target)))
        .filter_map(|rule| {
            let group = rule
                .targets
                .first()
                .and_then(|target| catalog.option(target.as_str()))
                .map(|option| option.group.clone())?;

            let options: Vec<OptionKey> = rule.targets.to_vec();
            let message = rule.message.clone().unwrap_or_else(|| {
                let names: Vec<&str> = options.iter().map(OptionKey::as_str).collect();
                format!("select one of: {}", names.join(", "))
            });

            Some(Requirement {
                rule: rule.key.clone(),
                group,
                options,
                message,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::EUR;
    use testresult::TestResult;

    use crate::{
        catalog::tests::hottub_catalog,
        keys::ProductId,
        options::{ConfigOption, OptionGroup},
        products::tests::round_hottub,
        rules::Trigger,
    };

    use super::*;

    fn empty() -> ConfigSelections {
        ConfigSelections::new(ProductId::from("hottub-round-200"))
    }

    #[test]
    fn hides_inapplicable_options_first() -> TestResult {
        let catalog = hottub_catalog()?;
        let resolution = resolve(&catalog, &round_hottub(), &empty());

        assert_eq!(
            resolution.hidden_options.get("lid-square").map(String::as_str),
            Some(NOT_APPLICABLE)
        );
        assert_eq!(
            resolution
                .hidden_options
                .get("heater-electric-3kw")
                .map(String::as_str),
            Some(NOT_APPLICABLE)
        );

        Ok(())
    }

    #[test]
    fn auto_selects_single_candidate_required_group() -> TestResult {
        let catalog = hottub_catalog()?;
        let resolution = resolve(&catalog, &round_hottub(), &empty());

        assert_eq!(
            resolution.resolved_selections.group("HEATING_BASE"),
            Some(&GroupSelection::Single {
                option_id: "heater-wood-internal".into()
            })
        );
        assert!(resolution.validation_errors.is_empty());
        assert!(resolution.configuration_errors.is_empty());

        Ok(())
    }

    #[test]
    fn drops_unknown_and_misplaced_options() -> TestResult {
        let catalog = hottub_catalog()?;
        let selections = empty()
            .with_option("LID", "lid-titanium")
            .with_options("EXTRAS", ["lid-soft", "extra-headrest"])
            .with_option("NOPE", "x");

        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert!(resolution.validation_errors.contains(&ValidationError::UnknownOption {
            group: "LID".into(),
            option: "lid-titanium".into(),
        }));
        assert!(resolution.validation_errors.contains(&ValidationError::OptionGroupMismatch {
            group: "EXTRAS".into(),
            option: "lid-soft".into(),
            expected: "LID".into(),
        }));
        assert!(resolution
            .validation_errors
            .contains(&ValidationError::UnknownGroup { group: "NOPE".into() }));
        assert!(resolution.resolved_selections.group("LID").is_none());
        assert!(!resolution.resolved_selections.is_selected(&"lid-soft".into()));
        assert!(resolution
            .resolved_selections
            .is_selected(&"extra-headrest".into()));

        Ok(())
    }

    #[test]
    fn disabled_selection_is_dropped_and_reported() -> TestResult {
        let catalog = hottub_catalog()?;
        let selections = empty()
            .with_option("SPA_SYSTEM", "spa-air")
            .with_option("LID", "lid-soft");

        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert_eq!(
            resolution.disabled_options.get("lid-soft").map(String::as_str),
            Some("Air spa systems need a hard lid")
        );
        assert!(!resolution.resolved_selections.is_selected(&"lid-soft".into()));
        assert!(resolution.validation_errors.iter().any(|error| matches!(
            error,
            ValidationError::DisabledSelection { option, .. } if option.as_str() == "lid-soft"
        )));

        Ok(())
    }

    #[test]
    fn include_rule_adds_bundled_option() -> TestResult {
        let catalog = hottub_catalog()?;
        let selections = empty().with_option("LID", "lid-hard");

        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert!(resolution
            .resolved_selections
            .is_selected(&"extra-cover-lifter".into()));
        assert!(resolution.included_options.contains("extra-cover-lifter"));

        Ok(())
    }

    #[test]
    fn include_rule_respects_explicit_group_choice() -> TestResult {
        let catalog = hottub_catalog()?;
        let selections = empty()
            .with_option("LID", "lid-hard")
            .with_options("EXTRAS", ["extra-headrest"]);

        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert!(!resolution
            .resolved_selections
            .is_selected(&"extra-cover-lifter".into()));
        assert!(resolution.included_options.is_empty());

        Ok(())
    }

    #[test]
    fn hide_wins_over_force_select() -> TestResult {
        let catalog = Catalog::builder(EUR)
            .group(OptionGroup::new("LID", SelectionType::Single, 0))
            .group(OptionGroup::new("SPA_SYSTEM", SelectionType::Single, 1))
            .option(ConfigOption::new("lid-hard", "LID", Decimal::ONE, Decimal::ZERO))
            .option(ConfigOption::new("spa-air", "SPA_SYSTEM", Decimal::ONE, Decimal::ZERO))
            .rule(CompatibilityRule::new(
                "force-lid",
                Trigger::selected("spa-air"),
                RuleEffect::ForceSelect,
                ["lid-hard"],
            ))
            .rule(CompatibilityRule::new(
                "hide-lid",
                Trigger::selected("spa-air"),
                RuleEffect::Hide,
                ["lid-hard"],
            ))
            .build()?;

        let selections = empty().with_option("SPA_SYSTEM", "spa-air");
        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert!(resolution.hidden_options.contains_key("lid-hard"));
        assert!(!resolution.resolved_selections.is_selected(&"lid-hard".into()));

        Ok(())
    }

    #[test]
    fn require_one_of_surfaces_requirement() -> TestResult {
        let catalog = Catalog::builder(EUR)
            .group(OptionGroup::new("SPA_SYSTEM", SelectionType::Single, 0))
            .group(OptionGroup::new("FILTRATION", SelectionType::Single, 1))
            .option(ConfigOption::new("spa-air", "SPA_SYSTEM", Decimal::ONE, Decimal::ZERO))
            .option(ConfigOption::new("filter-sand", "FILTRATION", Decimal::ONE, Decimal::ZERO))
            .option(ConfigOption::new("filter-cartridge", "FILTRATION", Decimal::ONE, Decimal::ZERO))
            .rule(
                CompatibilityRule::new(
                    "spa-needs-filter",
                    Trigger::selected("spa-air"),
                    RuleEffect::RequireOneOf,
                    ["filter-sand", "filter-cartridge"],
                )
                .with_message("Spa systems need filtration"),
            )
            .build()?;

        let selections = empty().with_option("SPA_SYSTEM", "spa-air");
        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert_eq!(
            resolution.requirements,
            vec![Requirement {
                rule: "spa-needs-filter".into(),
                group: "FILTRATION".into(),
                options: vec!["filter-sand".into(), "filter-cartridge".into()],
                message: "Spa systems need filtration".to_string(),
            }]
        );

        let satisfied = resolve(
            &catalog,
            &round_hottub(),
            &selections.with_option("FILTRATION", "filter-sand"),
        );

        assert!(satisfied.requirements.is_empty());

        Ok(())
    }

    #[test]
    fn oscillating_rules_are_a_configuration_error() -> TestResult {
        let catalog = Catalog::builder(EUR)
            .group(OptionGroup::new("LID", SelectionType::Single, 0))
            .option(ConfigOption::new("lid-hard", "LID", Decimal::ONE, Decimal::ZERO))
            .rule(CompatibilityRule::new(
                "self-hiding",
                Trigger::selected("lid-hard"),
                RuleEffect::Hide,
                ["lid-hard"],
            ))
            .build()?;

        let selections = empty().with_option("LID", "lid-hard");
        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert_eq!(
            resolution.configuration_errors,
            vec![ConfigurationError::RulesDidNotSettle { bound: 3 }]
        );

        Ok(())
    }

    #[test]
    fn unsatisfiable_group_is_a_configuration_error() -> TestResult {
        let catalog = Catalog::builder(EUR)
            .group(OptionGroup::new("LEDS", SelectionType::Multi, 0).with_bounds(Some(2), None))
            .option(ConfigOption::new("led-strip", "LEDS", Decimal::ONE, Decimal::ZERO))
            .build()?;

        let resolution = resolve(&catalog, &round_hottub(), &empty());

        assert_eq!(
            resolution.configuration_errors,
            vec![ConfigurationError::UnsatisfiableGroup {
                group: "LEDS".into(),
                min: 2,
                available: 1,
            }]
        );
        assert!(resolution.validation_errors.contains(&ValidationError::TooFewSelections {
            group: "LEDS".into(),
            min: 2,
            selected: 0,
        }));

        Ok(())
    }

    #[test]
    fn quantities_default_and_clamp() -> TestResult {
        let catalog = hottub_catalog()?;

        let defaulted = resolve(
            &catalog,
            &round_hottub(),
            &empty().with_options("LEDS", ["led-spot"]),
        );

        assert_eq!(defaulted.resolved_selections.quantity(&"led-spot".into()), Some(2));

        let clamped = resolve(
            &catalog,
            &round_hottub(),
            &empty()
                .with_options("LEDS", ["led-spot", "led-strip"])
                .with_quantity("led-spot", 40)
                .with_quantity("led-strip", 2),
        );

        assert_eq!(clamped.resolved_selections.quantity(&"led-spot".into()), Some(6));
        assert!(clamped.validation_errors.contains(&ValidationError::QuantityOutOfRange {
            group: "LEDS".into(),
            option: "led-spot".into(),
            quantity: 40,
            min: 1,
            max: 6,
        }));
        assert!(clamped.validation_errors.contains(&ValidationError::UnexpectedQuantity {
            group: "LEDS".into(),
            option: "led-strip".into(),
        }));
        assert_eq!(clamped.resolved_selections.quantity(&"led-strip".into()), None);

        Ok(())
    }

    #[test]
    fn multi_groups_follow_declaration_order_and_keep_repeats() -> TestResult {
        let catalog = hottub_catalog()?;
        let selections = empty().with_options(
            "EXTRAS",
            ["extra-thermometer", "extra-cover-lifter", "extra-thermometer"],
        );

        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert_eq!(
            resolution.resolved_selections.group("EXTRAS"),
            Some(&GroupSelection::Multi {
                option_ids: vec![
                    "extra-cover-lifter".into(),
                    "extra-thermometer".into(),
                    "extra-thermometer".into(),
                ]
            })
        );
        assert_eq!(
            resolution
                .resolved_selections
                .quantity_of(&"extra-thermometer".into()),
            2
        );

        Ok(())
    }

    #[test]
    fn repeated_option_counts_once_towards_group_max() -> TestResult {
        let catalog = hottub_catalog()?;
        let selections = empty().with_options(
            "EXTRAS",
            ["extra-thermometer", "extra-thermometer", "extra-thermometer"],
        );

        let resolution = resolve(&catalog, &round_hottub(), &selections);

        assert!(!resolution.validation_errors.iter().any(|error| matches!(
            error,
            ValidationError::TooManySelections { group, .. } if group.as_str() == "EXTRAS"
        )));
        assert_eq!(
            resolution
                .resolved_selections
                .quantity_of(&"extra-thermometer".into()),
            3
        );

        Ok(())
    }

    #[test]
    fn defaults_chain_through_rule_passes() -> TestResult {
        let catalog = Catalog::builder(EUR)
            .group(OptionGroup::new("MATERIAL", SelectionType::Single, 0).with_bounds(Some(1), Some(1)))
            .group(
                OptionGroup::new("HEATING_BASE", SelectionType::Single, 1)
                    .with_bounds(Some(1), Some(1)),
            )
            .option(ConfigOption::new("material-cedar", "MATERIAL", Decimal::ONE, Decimal::ZERO))
            .option(ConfigOption::new("heater-wood", "HEATING_BASE", Decimal::ONE, Decimal::ZERO))
            .option(ConfigOption::new("heater-gas", "HEATING_BASE", Decimal::ONE, Decimal::ZERO))
            .rule(CompatibilityRule::new(
                "cedar-needs-wood",
                Trigger::selected("material-cedar"),
                RuleEffect::Hide,
                ["heater-gas"],
            ))
            .build()?;

        let resolution = resolve(&catalog, &round_hottub(), &empty());

        assert!(resolution
            .resolved_selections
            .is_selected(&"material-cedar".into()));
        assert!(resolution
            .resolved_selections
            .is_selected(&"heater-wood".into()));
        assert!(resolution.hidden_options.contains_key("heater-gas"));
        assert!(resolution.configuration_errors.is_empty());
        assert!(resolution.validation_errors.is_empty());
        assert_eq!(resolution.passes, 3);

        Ok(())
    }
}
