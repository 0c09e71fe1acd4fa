//! Catalog
//!
//! Immutable snapshot of base products, option groups, options, compatibility
//! rules and step templates. Callers load a catalog once and pass it by
//! reference into every evaluation; the engine never owns or caches one.

use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    keys::{GroupKey, OptionKey, ProductId, RuleKey},
    options::{ConfigOption, OptionGroup},
    pricing::round_cents,
    products::BaseProduct,
    rules::CompatibilityRule,
    templates::StepTemplate,
};

/// Errors raised while building a catalog snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two products share an id.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// Two groups share a key.
    #[error("duplicate option group: {0}")]
    DuplicateGroup(GroupKey),

    /// Two options share a key.
    #[error("duplicate option: {0}")]
    DuplicateOption(OptionKey),

    /// Two rules share a key.
    #[error("duplicate rule: {0}")]
    DuplicateRule(RuleKey),

    /// Two templates claim the same product type.
    #[error("duplicate template for product type: {0}")]
    DuplicateTemplate(String),

    /// An option names a group the catalog does not have.
    #[error("option {option} belongs to unknown group {group}")]
    UnknownGroup {
        /// Offending option
        option: OptionKey,
        /// Missing group
        group: GroupKey,
    },

    /// A product lists a heating type the catalog does not have.
    #[error("product {product} lists unknown heating type {option}")]
    UnknownHeatingType {
        /// Offending product
        product: ProductId,
        /// Missing option
        option: OptionKey,
    },

    /// A rule refers to an option the catalog does not have.
    #[error("rule {rule} refers to unknown option {option}")]
    UnknownRuleOption {
        /// Offending rule
        rule: RuleKey,
        /// Missing option
        option: OptionKey,
    },

    /// A rule has nothing to act on.
    #[error("rule {0} has no targets")]
    EmptyRule(RuleKey),

    /// A template step refers to a group the catalog does not have.
    #[error("template {template} refers to unknown group {group}")]
    UnknownTemplateGroup {
        /// Offending template
        template: String,
        /// Missing group
        group: GroupKey,
    },

    /// A group's bounds cross.
    #[error("group {group} has min {min} greater than max {max}")]
    InvalidBounds {
        /// Offending group
        group: GroupKey,
        /// Lower bound
        min: u32,
        /// Upper bound
        max: u32,
    },

    /// A quantity rule's bounds cross or its default lies outside them.
    #[error("option {0} has an invalid quantity rule")]
    InvalidQuantityRule(OptionKey),

    /// A price or VAT rate is negative.
    #[error("{0} has a negative price or VAT rate")]
    NegativeAmount(String),
}

/// Catalog snapshot.
#[derive(Debug, Clone)]
pub struct Catalog {
    currency: &'static Currency,
    products: Vec<BaseProduct>,
    groups: Vec<OptionGroup>,
    options: Vec<ConfigOption>,
    rules: Vec<CompatibilityRule>,
    templates: Vec<StepTemplate>,

    product_index: FxHashMap<ProductId, usize>,
    group_index: FxHashMap<GroupKey, usize>,
    option_index: FxHashMap<OptionKey, usize>,
    template_index: FxHashMap<String, usize>,

    /// Group indices sorted by `sort_order`, ties in declaration order
    display_order: Vec<usize>,
}

impl Catalog {
    /// Start building a catalog priced in `currency`.
    pub fn builder(currency: &'static Currency) -> CatalogBuilder {
        CatalogBuilder::new(currency)
    }

    /// Currency all prices are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// All products in declaration order.
    pub fn products(&self) -> &[BaseProduct] {
        &self.products
    }

    /// Look up a product.
    pub fn product(&self, id: &str) -> Option<&BaseProduct> {
        self.product_index
            .get(id)
            .and_then(|&idx| self.products.get(idx))
    }

    /// All groups in declaration order.
    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    /// Look up a group.
    pub fn group(&self, key: &str) -> Option<&OptionGroup> {
        self.group_index
            .get(key)
            .and_then(|&idx| self.groups.get(idx))
    }

    /// Groups ordered by `sort_order`, ties broken by declaration order.
    pub fn groups_in_display_order(&self) -> impl Iterator<Item = &OptionGroup> {
        self.display_order
            .iter()
            .filter_map(|&idx| self.groups.get(idx))
    }

    /// All options in declaration order.
    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    /// Look up an option.
    pub fn option(&self, key: &str) -> Option<&ConfigOption> {
        self.option_index
            .get(key)
            .and_then(|&idx| self.options.get(idx))
    }

    /// Declaration position of an option, used for stable ordering.
    pub fn option_position(&self, key: &str) -> Option<usize> {
        self.option_index.get(key).copied()
    }

    /// Options belonging to `group`, in declaration order.
    pub fn options_in_group<'c>(
        &'c self,
        group: &'c GroupKey,
    ) -> impl Iterator<Item = &'c ConfigOption> + 'c {
        self.options
            .iter()
            .filter(move |option| &option.group == group)
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[CompatibilityRule] {
        &self.rules
    }

    /// All step templates.
    pub fn templates(&self) -> &[StepTemplate] {
        &self.templates
    }

    /// Step template for a product type, if one is declared.
    pub fn template_for(&self, product_type: &str) -> Option<&StepTemplate> {
        self.template_index
            .get(product_type)
            .and_then(|&idx| self.templates.get(idx))
    }
}

/// Incremental, validating catalog builder.
#[derive(Debug)]
pub struct CatalogBuilder {
    currency: &'static Currency,
    products: Vec<BaseProduct>,
    groups: Vec<OptionGroup>,
    options: Vec<ConfigOption>,
    rules: Vec<CompatibilityRule>,
    templates: Vec<StepTemplate>,
}

impl CatalogBuilder {
    /// Create an empty builder.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            products: Vec::new(),
            groups: Vec::new(),
            options: Vec::new(),
            rules: Vec::new(),
            templates: Vec::new(),
        }
    }

    /// Add a base product.
    #[must_use]
    pub fn product(mut self, product: BaseProduct) -> Self {
        self.products.push(product);
        self
    }

    /// Add an option group.
    #[must_use]
    pub fn group(mut self, group: OptionGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Add an option.
    #[must_use]
    pub fn option(mut self, option: ConfigOption) -> Self {
        self.options.push(option);
        self
    }

    /// Add a compatibility rule.
    #[must_use]
    pub fn rule(mut self, rule: CompatibilityRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a step template.
    #[must_use]
    pub fn template(mut self, template: StepTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Validate references and build the snapshot.
    ///
    /// Prices are normalised to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for duplicate keys, dangling references,
    /// crossed bounds or negative amounts.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let Self {
            currency,
            mut products,
            groups,
            mut options,
            rules,
            templates,
        } = self;

        let mut group_index = FxHashMap::default();

        for (idx, group) in groups.iter().enumerate() {
            if let (Some(min), Some(max)) = (group.min, group.max)
                && min > max
            {
                return Err(CatalogError::InvalidBounds {
                    group: group.key.clone(),
                    min,
                    max,
                });
            }

            if group_index.insert(group.key.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateGroup(group.key.clone()));
            }
        }

        let mut option_index = FxHashMap::default();

        for (idx, option) in options.iter_mut().enumerate() {
            if !group_index.contains_key(&option.group) {
                return Err(CatalogError::UnknownGroup {
                    option: option.key.clone(),
                    group: option.group.clone(),
                });
            }

            if let Some(rule) = option.quantity_rule
                && (rule.min > rule.max || !rule.accepts(rule.default))
            {
                return Err(CatalogError::InvalidQuantityRule(option.key.clone()));
            }

            if option.price_excl.is_sign_negative() || option.vat_rate_percent.is_sign_negative() {
                return Err(CatalogError::NegativeAmount(option.key.to_string()));
            }

            option.price_excl = round_cents(option.price_excl);

            if option_index.insert(option.key.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateOption(option.key.clone()));
            }
        }

        let mut product_index = FxHashMap::default();

        for (idx, product) in products.iter_mut().enumerate() {
            if let Some(option) = product
                .heating_types
                .iter()
                .find(|option| !option_index.contains_key(*option))
            {
                return Err(CatalogError::UnknownHeatingType {
                    product: product.id.clone(),
                    option: option.clone(),
                });
            }

            if product.base_price_excl.is_sign_negative()
                || product.vat_rate_percent.is_sign_negative()
            {
                return Err(CatalogError::NegativeAmount(product.id.to_string()));
            }

            product.base_price_excl = round_cents(product.base_price_excl);

            if product_index.insert(product.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }

        let mut rule_keys = FxHashSet::default();

        for rule in &rules {
            if !rule_keys.insert(&rule.key) {
                return Err(CatalogError::DuplicateRule(rule.key.clone()));
            }

            if rule.targets.is_empty() {
                return Err(CatalogError::EmptyRule(rule.key.clone()));
            }

            if let Some(option) = rule
                .targets
                .iter()
                .chain(rule.trigger.referenced_options())
                .find(|option| !option_index.contains_key(*option))
            {
                return Err(CatalogError::UnknownRuleOption {
                    rule: rule.key.clone(),
                    option: option.clone(),
                });
            }
        }

        let mut template_index = FxHashMap::default();

        for (idx, template) in templates.iter().enumerate() {
            if let Some(group) = template
                .steps
                .iter()
                .flat_map(|step| step.groups.iter())
                .find(|group| !group_index.contains_key(*group))
            {
                return Err(CatalogError::UnknownTemplateGroup {
                    template: template.key.clone(),
                    group: group.clone(),
                });
            }

            if template_index
                .insert(template.product_type.clone(), idx)
                .is_some()
            {
                return Err(CatalogError::DuplicateTemplate(
                    template.product_type.clone(),
                ));
            }
        }

        let mut display_order: Vec<usize> = (0..groups.len()).collect();
        display_order.sort_by_key(|&idx| (groups.get(idx).map(|group| group.sort_order), idx));

        Ok(Catalog {
            currency,
            products,
            groups,
            options,
            rules,
            templates,
            product_index,
            group_index,
            option_index,
            template_index,
            display_order,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::EUR;
    use smallvec::smallvec;

    use crate::{
        applicability::Applicability,
        options::{QuantityRule, SelectionType},
        products::tests::round_hottub,
        rules::{RuleEffect, Trigger},
        tags::Tags,
        templates::Step,
    };

    use super::*;

    /// Small hot tub catalog shared by unit tests across the crate.
    pub(crate) fn hottub_catalog() -> Result<Catalog, CatalogError> {
        let vat = Decimal::from(21);

        Catalog::builder(EUR)
            .product(round_hottub())
            .group(
                OptionGroup::new("HEATING_BASE", SelectionType::Single, 10)
                    .with_bounds(Some(1), Some(1)),
            )
            .group(OptionGroup::new("LID", SelectionType::Single, 20).with_bounds(Some(0), Some(1)))
            .group(OptionGroup::new("SPA_SYSTEM", SelectionType::Single, 30))
            .group(OptionGroup::new("LEDS", SelectionType::Multi, 40).with_bounds(None, Some(2)))
            .group(OptionGroup::new("EXTRAS", SelectionType::Multi, 50).with_bounds(None, Some(2)))
            .group(OptionGroup::new("STAIRS", SelectionType::Boolean, 60))
            .option(
                ConfigOption::new("heater-wood-internal", "HEATING_BASE", Decimal::from(450), vat)
                    .named("Internal wood stove")
                    .applies_to(Applicability::heating_type()),
            )
            .option(
                ConfigOption::new("heater-electric-3kw", "HEATING_BASE", Decimal::from(900), vat)
                    .applies_to(Applicability::heating_type()),
            )
            .option(ConfigOption::new("lid-soft", "LID", Decimal::from(120), vat))
            .option(
                ConfigOption::new("lid-hard", "LID", Decimal::from(350), vat)
                    .with_tags(Tags::from_strs(&["premium"])),
            )
            .option(
                ConfigOption::new("lid-square", "LID", Decimal::from(300), vat)
                    .applies_to(Applicability::attribute_equals("shape", "square")),
            )
            .option(ConfigOption::new("spa-none", "SPA_SYSTEM", Decimal::ZERO, vat))
            .option(ConfigOption::new("spa-air", "SPA_SYSTEM", Decimal::from(800), vat))
            .option(ConfigOption::new("led-strip", "LEDS", Decimal::new(7995, 2), vat))
            .option(ConfigOption::new("led-spot", "LEDS", Decimal::new(4950, 2), vat).with_quantity_rule(
                QuantityRule {
                    min: 1,
                    max: 6,
                    default: 2,
                },
            ))
            .option(ConfigOption::new("extra-cover-lifter", "EXTRAS", Decimal::from(199), vat))
            .option(ConfigOption::new("extra-thermometer", "EXTRAS", Decimal::new(1499, 2), vat))
            .option(ConfigOption::new("extra-headrest", "EXTRAS", Decimal::from(39), vat))
            .option(ConfigOption::new("stairs-wood", "STAIRS", Decimal::from(149), vat))
            .rule(
                CompatibilityRule::new(
                    "spa-needs-hard-lid",
                    Trigger::selected("spa-air"),
                    RuleEffect::Disable,
                    ["lid-soft"],
                )
                .with_message("Air spa systems need a hard lid"),
            )
            .rule(CompatibilityRule::new(
                "hard-lid-brings-lifter",
                Trigger::selected("lid-hard"),
                RuleEffect::Include,
                ["extra-cover-lifter"],
            ))
            .template(StepTemplate {
                key: "hottub-steps".to_string(),
                product_type: "hottub".to_string(),
                steps: vec![
                    Step::new("heating", smallvec![GroupKey::from("HEATING_BASE")]),
                    Step::new(
                        "comfort",
                        smallvec![GroupKey::from("LID"), GroupKey::from("SPA_SYSTEM")],
                    ),
                    Step::new(
                        "finishing",
                        smallvec![
                            GroupKey::from("LEDS"),
                            GroupKey::from("EXTRAS"),
                            GroupKey::from("STAIRS")
                        ],
                    ),
                ],
            })
            .build()
    }

    #[test]
    fn builds_indices_and_display_order() -> Result<(), CatalogError> {
        let catalog = Catalog::builder(EUR)
            .group(OptionGroup::new("B", SelectionType::Single, 5))
            .group(OptionGroup::new("A", SelectionType::Single, 1))
            .group(OptionGroup::new("C", SelectionType::Single, 5))
            .option(ConfigOption::new("b1", "B", Decimal::ONE, Decimal::ZERO))
            .build()?;

        let order: Vec<&str> = catalog
            .groups_in_display_order()
            .map(|group| group.key.as_str())
            .collect();

        assert_eq!(order, ["A", "B", "C"]);
        assert_eq!(catalog.option_position("b1"), Some(0));
        assert!(catalog.group("A").is_some());

        Ok(())
    }

    #[test]
    fn normalises_prices_to_cents() -> Result<(), CatalogError> {
        let catalog = Catalog::builder(EUR)
            .group(OptionGroup::new("G", SelectionType::Single, 0))
            .option(ConfigOption::new("o", "G", Decimal::new(10_005, 3), Decimal::ZERO))
            .build()?;

        assert_eq!(
            catalog.option("o").map(|option| option.price_excl),
            Some(Decimal::new(1001, 2))
        );

        Ok(())
    }

    #[test]
    fn rejects_duplicate_options() {
        let result = Catalog::builder(EUR)
            .group(OptionGroup::new("G", SelectionType::Single, 0))
            .option(ConfigOption::new("o", "G", Decimal::ONE, Decimal::ZERO))
            .option(ConfigOption::new("o", "G", Decimal::ONE, Decimal::ZERO))
            .build();

        assert_eq!(result.err(), Some(CatalogError::DuplicateOption("o".into())));
    }

    #[test]
    fn rejects_options_of_unknown_groups() {
        let result = Catalog::builder(EUR)
            .option(ConfigOption::new("o", "MISSING", Decimal::ONE, Decimal::ZERO))
            .build();

        assert!(matches!(result, Err(CatalogError::UnknownGroup { .. })));
    }

    #[test]
    fn rejects_rules_with_dangling_references() {
        let result = Catalog::builder(EUR)
            .group(OptionGroup::new("G", SelectionType::Single, 0))
            .option(ConfigOption::new("o", "G", Decimal::ONE, Decimal::ZERO))
            .rule(CompatibilityRule::new(
                "r",
                Trigger::selected("ghost"),
                RuleEffect::Hide,
                ["o"],
            ))
            .build();

        assert_eq!(
            result.err(),
            Some(CatalogError::UnknownRuleOption {
                rule: "r".into(),
                option: "ghost".into(),
            })
        );
    }

    #[test]
    fn rejects_crossed_group_bounds() {
        let result = Catalog::builder(EUR)
            .group(OptionGroup::new("G", SelectionType::Multi, 0).with_bounds(Some(3), Some(1)))
            .build();

        assert!(matches!(result, Err(CatalogError::InvalidBounds { .. })));
    }

    #[test]
    fn rejects_invalid_quantity_rules() {
        let result = Catalog::builder(EUR)
            .group(OptionGroup::new("G", SelectionType::Multi, 0))
            .option(
                ConfigOption::new("o", "G", Decimal::ONE, Decimal::ZERO).with_quantity_rule(
                    QuantityRule {
                        min: 1,
                        max: 3,
                        default: 5,
                    },
                ),
            )
            .build();

        assert_eq!(result.err(), Some(CatalogError::InvalidQuantityRule("o".into())));
    }

    #[test]
    fn shared_fixture_catalog_builds() -> Result<(), CatalogError> {
        let catalog = hottub_catalog()?;

        assert_eq!(catalog.products().len(), 1);
        assert!(catalog.template_for("hottub").is_some());
        assert_eq!(catalog.rules().len(), 2);

        Ok(())
    }
}
