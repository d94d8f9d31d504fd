//! Combines section outcomes into a [`CalculationResult`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::log::{LineKind, LogLine};
use super::sections::SectionOutcome;
use crate::models::{CANONICAL_CURRENCY, Currency, FormError, Money, to_canonical};

pub const NO_DATA_HINT: &str = "Моля въведете данни.";
pub const NO_SECTION_HINT: &str = "Моля изберете поне една секция от настройките.";

/// Priced, explained outcome of one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Total in [`CANONICAL_CURRENCY`], unrounded.
    pub total: Decimal,
    pub log: Vec<LogLine>,
    pub error: bool,
    pub hints: Vec<String>,
}

impl CalculationResult {
    /// Result for a form rejected by validation: zero total, the message as
    /// the only log line, no hints.
    pub fn invalid(err: &FormError) -> Self {
        Self {
            total: Decimal::ZERO,
            log: vec![LogLine::new(LineKind::Error).text(format!("Невалидни данни: {err}"))],
            error: true,
            hints: Vec::new(),
        }
    }

    pub fn total_money(&self) -> Money {
        Money::new(self.total, CANONICAL_CURRENCY)
    }

    /// Log lines rendered in their native currencies.
    pub fn rendered_log(&self) -> Vec<String> {
        self.log.iter().map(LogLine::render).collect()
    }
}

/// Sums the sections, builds the combined log and decides the hints.
///
/// `native` is the currency the sections were priced in.
pub fn aggregate(
    sections: &[SectionOutcome],
    native: Currency,
) -> CalculationResult {
    let money = |amount: Decimal| Money::new(amount, native);

    let mut log: Vec<LogLine> = sections
        .iter()
        .filter_map(|s| s.log_line.clone())
        .collect();

    for section in sections {
        if let Some(composition) = section.composition.as_ref().filter(|c| c.fired()) {
            log.push(
                LogLine::new(LineKind::CoefficientHeader)
                    .text(format!("Коефициенти (приложени към '{}'):", section.title)),
            );
            log.extend(composition.lines.iter().cloned());
        }
    }

    let native_total: Decimal = sections.iter().map(SectionOutcome::contribution).sum();

    let contributing: Vec<&SectionOutcome> = sections
        .iter()
        .filter(|s| !s.contribution().is_zero())
        .collect();
    if contributing.len() > 1 {
        let mut summary = LogLine::new(LineKind::Summary).text("ОБЩО = ");
        for (i, section) in contributing.iter().enumerate() {
            if i > 0 {
                summary = summary.text(" + ");
            }
            summary = summary
                .amount(money(section.contribution()))
                .text(format!(" ({})", section.label));
        }
        log.push(summary.text(" = ").amount(money(native_total)));
    }

    let mut hints: Vec<String> = sections.iter().filter_map(|s| s.hint.clone()).collect();
    let any_included = sections.iter().any(|s| s.included);
    let any_complete = sections.iter().any(|s| s.complete);
    if !any_included {
        hints.push(NO_SECTION_HINT.to_string());
    } else if !any_complete && native_total.is_zero() && hints.is_empty() {
        hints.push(NO_DATA_HINT.to_string());
    }

    CalculationResult {
        total: to_canonical(native_total, native),
        log,
        error: false,
        hints,
    }
}
