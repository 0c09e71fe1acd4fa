//! `evaluate` command

use std::{
    fs,
    io::{self, Read},
    path::Path,
    time::Instant,
};

use configurator::{
    catalog::Catalog,
    evaluation::{Configurator, EvaluationResult},
    request::EvaluationRequest,
};
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing::info;

use crate::{
    config::{EvaluateArgs, OutputFormat},
    error::CliError,
};

/// Evaluate one request and write the result to `out`.
///
/// # Errors
///
/// Returns a [`CliError`] if the catalog or request cannot be read, the
/// request is rejected or the output cannot be written.
pub fn run(args: &EvaluateArgs, input: impl Read, mut out: impl io::Write) -> Result<(), CliError> {
    let catalog = Catalog::from_path(&args.catalog)?;
    let request = read_request(&args.request, input)?;

    let start = Instant::now();
    let result = Configurator::new(&catalog).evaluate_request(&request)?;
    let elapsed = start.elapsed();

    info!(
        product_id = %request.product_id,
        can_proceed = result.can_proceed(),
        elapsed = %elapsed.human(Truncate::Nano),
        "evaluated request"
    );

    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &result)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => serde_norway::to_writer(&mut out, &result)?,
        OutputFormat::Table => write_report(&mut out, &catalog, &request, &result)?,
    }

    Ok(())
}

/// Parse a request from `path`, or from `input` when the path is `-`.
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
fn read_request(path: &Path, mut input: impl Read) -> Result<EvaluationRequest, CliError> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        input.read_to_string(&mut raw)?;

        return Ok(serde_norway::from_str(&raw)?);
    }

    let raw = fs::read_to_string(path)?;

    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&raw)?)
    } else {
        Ok(serde_norway::from_str(&raw)?)
    }
}

fn write_report(
    out: &mut impl io::Write,
    catalog: &Catalog,
    request: &EvaluationRequest,
    result: &EvaluationResult,
) -> Result<(), CliError> {
    writeln!(out, "Product:  {}", request.product_id.trim())?;
    writeln!(out, "Template: {}", result.template_key)?;

    result.pricing.write_to(&mut *out)?;

    if let Some(template) = catalog
        .templates()
        .iter()
        .find(|template| template.key == result.template_key)
    {
        writeln!(out, "Steps:")?;

        for progress in template.progress(result) {
            let marker = if progress.complete { "x" } else { " " };
            writeln!(out, "  [{marker}] {}", progress.step)?;

            for message in &progress.blocking {
                writeln!(out, "        {message}")?;
            }
        }

        writeln!(out)?;
    }

    write_section(
        out,
        "Requirements",
        result.requirements.iter().map(|requirement| {
            format!("{}: {}", requirement.group, requirement.message)
        }),
    )?;
    write_section(
        out,
        "Validation errors",
        result.validation_errors.iter().map(ToString::to_string),
    )?;
    write_section(
        out,
        "Configuration errors",
        result.configuration_errors.iter().map(ToString::to_string),
    )?;
    write_section(
        out,
        "Disabled options",
        result
            .disabled_options
            .iter()
            .map(|(option, reason)| format!("{option}: {reason}")),
    )?;

    let verdict = if result.can_proceed() {
        "ready to proceed"
    } else {
        "not ready to proceed"
    };

    writeln!(out, "Result: {verdict}")?;

    Ok(())
}

fn write_section(
    out: &mut impl io::Write,
    title: &str,
    lines: impl Iterator<Item = String>,
) -> Result<(), CliError> {
    let mut lines = lines.peekable();

    if lines.peek().is_none() {
        return Ok(());
    }

    writeln!(out, "{title}:")?;

    for line in lines {
        writeln!(out, "  - {line}")?;
    }

    writeln!(out)?;

    Ok(())
}
