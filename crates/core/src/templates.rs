//! Step Templates
//!
//! Ordered step flows per product type. A template decides which groups the
//! customer sees together and whether "next step" is allowed.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{evaluation::EvaluationResult, keys::GroupKey};

/// Step flow for one product type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepTemplate {
    /// Template key reported in evaluation results
    pub key: String,

    /// Product type this template applies to
    pub product_type: String,

    /// Steps in presentation order
    pub steps: Vec<Step>,
}

/// One step of a template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Step {
    /// Step key
    pub key: String,

    /// Groups shown on this step
    pub groups: SmallVec<[GroupKey; 4]>,
}

impl Step {
    /// Create a step.
    pub fn new(key: impl Into<String>, groups: SmallVec<[GroupKey; 4]>) -> Self {
        Self {
            key: key.into(),
            groups,
        }
    }
}

/// Completion state of a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepProgress {
    /// Step key
    pub step: String,

    /// Whether the step has no outstanding issues
    pub complete: bool,

    /// Messages for everything blocking this step
    pub blocking: Vec<String>,
}

impl StepTemplate {
    /// Report which steps of the template are complete for `result`.
    pub fn progress(&self, result: &EvaluationResult) -> Vec<StepProgress> {
        self.steps
            .iter()
            .map(|step| {
                let in_step = |group: Option<&GroupKey>| {
                    group.is_some_and(|group| step.groups.contains(group))
                };

                let blocking: Vec<String> = result
                    .validation_errors
                    .iter()
                    .filter(|error| in_step(error.group()))
                    .map(ToString::to_string)
                    .chain(
                        result
                            .requirements
                            .iter()
                            .filter(|requirement| in_step(Some(&requirement.group)))
                            .map(|requirement| requirement.message.clone()),
                    )
                    .collect();

                StepProgress {
                    step: step.key.clone(),
                    complete: blocking.is_empty(),
                    blocking,
                }
            })
            .collect()
    }

    /// The first step that still has outstanding issues, if any.
    pub fn first_incomplete_step(&self, result: &EvaluationResult) -> Option<StepProgress> {
        self.progress(result)
            .into_iter()
            .find(|progress| !progress.complete)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        catalog::tests::hottub_catalog,
        evaluation::evaluate,
        keys::ProductId,
        options::SelectionType,
        selections::ConfigSelections,
    };

    #[test]
    fn steps_with_cardinality_errors_are_incomplete() -> TestResult {
        let catalog = hottub_catalog()?;
        let product = catalog
            .product("hottub-round-200")
            .ok_or("missing product")?;

        let mut selections = ConfigSelections::new(ProductId::from("hottub-round-200"));
        let extras = catalog.group("EXTRAS").ok_or("missing group")?;

        assert_eq!(extras.selection_type, SelectionType::Multi);

        for option in ["extra-cover-lifter", "extra-thermometer", "extra-headrest"] {
            selections.select(extras, option.into());
        }

        let result = evaluate(&catalog, product, None, &selections);
        let template = catalog.template_for("hottub").ok_or("missing template")?;
        let progress = template.progress(&result);

        assert_eq!(progress.len(), 3);
        assert!(progress.first().is_some_and(|step| step.complete));
        assert!(progress.get(1).is_some_and(|step| step.complete));
        assert!(progress.get(2).is_some_and(|step| !step.complete));

        let first_incomplete = template
            .first_incomplete_step(&result)
            .ok_or("expected an incomplete step")?;

        assert_eq!(first_incomplete.step, "finishing");
        assert_eq!(first_incomplete.blocking.len(), 1);

        Ok(())
    }
}
