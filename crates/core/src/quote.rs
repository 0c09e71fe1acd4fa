//! Quote
//!
//! Plain-text rendering of a [`PricingResult`] for terminals and logs.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::pricing::{PriceBasis, PriceLine, PriceLineKind, PricingResult};

/// Errors that can occur when writing a quote.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Writing to the output failed.
    #[error("failed to write quote: {0}")]
    Io(#[from] io::Error),
}

impl PricingResult {
    /// Write the breakdown as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteError`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), QuoteError> {
        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Item",
            "Group",
            "Qty",
            "Unit (excl.)",
            "VAT",
            "Total (excl.)",
            "Total (incl.)",
        ]);

        for (idx, line) in self.breakdown.iter().enumerate() {
            builder.push_record(line_cells(idx, line, self.currency));
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..8), Alignment::right());

        writeln!(out, "\n{table}")?;

        write_summary(&mut out, self)?;

        Ok(())
    }
}

fn line_cells(idx: usize, line: &PriceLine, currency: &'static Currency) -> [String; 8] {
    let group = match line.kind {
        PriceLineKind::Base => "base".to_string(),
        PriceLineKind::Option => line
            .group
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    };

    let (total_excl, total_incl) = if line.included {
        ("included".to_string(), "included".to_string())
    } else {
        (
            money(line.line_total_excl, currency),
            money(line.line_total_incl, currency),
        )
    };

    [
        format!("#{:<3}", idx + 1),
        line.name.clone(),
        group,
        line.quantity.to_string(),
        money(line.price_excl, currency),
        format!("{}%", line.vat_rate_percent.normalize()),
        total_excl,
        total_incl,
    ]
}

fn write_summary(out: &mut impl io::Write, pricing: &PricingResult) -> Result<(), QuoteError> {
    let (excl_marker, incl_marker) = match pricing.primary_basis {
        PriceBasis::Excl => ("*", " "),
        PriceBasis::Incl => (" ", "*"),
    };

    let rows = [
        (
            format!("{excl_marker}Total excl. VAT:"),
            money(pricing.total_excl, pricing.currency),
        ),
        (" VAT:".to_string(), money(pricing.vat_total, pricing.currency)),
        (
            format!("{incl_marker}Total incl. VAT:"),
            money(pricing.total_incl, pricing.currency),
        ),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in &rows {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}

fn money(amount: Decimal, currency: &'static Currency) -> String {
    Money::from_decimal(amount, currency).to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use testresult::TestResult;

    use crate::{
        catalog::tests::hottub_catalog,
        keys::{OptionKey, ProductId},
        pricing::{CustomerType, price},
        products::tests::round_hottub,
        selections::ConfigSelections,
    };

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let catalog = hottub_catalog()?;
        let resolved = ConfigSelections::new(ProductId::from("hottub-round-200"))
            .with_option("HEATING_BASE", "heater-wood-internal")
            .with_option("LID", "lid-hard")
            .with_options("EXTRAS", ["extra-cover-lifter"]);
        let included = BTreeSet::from([OptionKey::from("extra-cover-lifter")]);

        let pricing = price(
            &catalog,
            &round_hottub(),
            &resolved,
            &included,
            CustomerType::Company,
        )?;

        let mut out = Vec::new();
        pricing.write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Internal wood stove"));
        assert!(rendered.contains("HEATING_BASE"));
        assert!(rendered.contains("included"));
        assert!(rendered.contains("21%"));
        assert!(rendered.contains("*Total excl. VAT:"));

        Ok(())
    }
}
