//! `check` command

use std::io;

use configurator::{
    catalog::Catalog, evaluation::evaluate, selections::ConfigSelections,
};
use tracing::{info, warn};

use crate::{config::CheckArgs, error::CliError};

/// Evaluate every product with empty selections and report catalog errors.
///
/// # Errors
///
/// Returns [`CliError::ConfigurationErrors`] if any product reports
/// configuration errors, or another [`CliError`] if the catalog cannot be
/// loaded or the report cannot be written.
pub fn run(args: &CheckArgs, mut out: impl io::Write) -> Result<(), CliError> {
    let catalog = Catalog::from_path(&args.catalog)?;

    let mut total = 0;

    for product in catalog.products() {
        let selections = ConfigSelections::new(product.id.clone());
        let result = evaluate(&catalog, product, None, &selections);

        if result.configuration_errors.is_empty() {
            writeln!(out, "ok     {}", product.id)?;
            continue;
        }

        warn!(
            product_id = %product.id,
            errors = result.configuration_errors.len(),
            "product has configuration errors"
        );

        writeln!(out, "FAILED {}", product.id)?;

        for issue in &result.configuration_errors {
            writeln!(out, "         {issue}")?;
        }

        total += result.configuration_errors.len();
    }

    info!(products = catalog.products().len(), errors = total, "checked catalog");

    if total > 0 {
        return Err(CliError::ConfigurationErrors(total));
    }

    Ok(())
}

