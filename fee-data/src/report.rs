//! Rendering calculation results for display in a chosen currency.

use std::fmt;
use std::sync::LazyLock;

use fee_core::calculations::common::format_amount;
use fee_core::calculations::{CalculationResult, LogLine};
use fee_core::{Currency, CurrencyDisplay, EURO_RATE, Money};
use regex::{Captures, Regex};
use rust_decimal::Decimal;

pub const HINTS_HEADING: &str = "За довършване:";

static EUR_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d{2})\s*€").expect("valid regex"));
static BGN_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d{2})\s*лв\.").expect("valid regex"));

/// Formats one amount according to the display preference.
///
/// `Both` always shows lev first with the euro value in parentheses.
pub fn format_money(
    money: &Money,
    display: CurrencyDisplay,
) -> String {
    match display {
        CurrencyDisplay::Eur => money.in_currency(Currency::Eur).to_string(),
        CurrencyDisplay::Bgn => money.in_currency(Currency::Bgn).to_string(),
        CurrencyDisplay::Both => format!(
            "{} ({})",
            money.in_currency(Currency::Bgn),
            money.in_currency(Currency::Eur)
        ),
    }
}

pub fn total_header(display: CurrencyDisplay) -> &'static str {
    match display {
        CurrencyDisplay::Eur => "ОБЩО (€ без ДДС):",
        CurrencyDisplay::Bgn => "ОБЩО (лв. без ДДС):",
        CurrencyDisplay::Both => "ОБЩО (без ДДС):",
    }
}

/// The total in the display currency, or `---` for a rejected form.
pub fn format_total(
    result: &CalculationResult,
    display: CurrencyDisplay,
) -> String {
    if result.error {
        return "---".to_string();
    }
    format_money(&result.total_money(), display)
}

pub fn render_line(
    line: &LogLine,
    display: CurrencyDisplay,
) -> String {
    line.render_with(|m| format_money(m, display))
}

/// Rewrites amounts embedded in plain log text.
///
/// Used for logs stored as text by older versions, where amounts can only be
/// recovered from `"<number> €"` and `"<number> лв."` substrings. Euro
/// amounts take precedence: a line with both markers only has its euro
/// amounts rewritten.
pub fn rewrite_legacy_line(
    text: &str,
    display: CurrencyDisplay,
) -> String {
    let wants_bgn = matches!(display, CurrencyDisplay::Bgn | CurrencyDisplay::Both);
    let wants_eur = matches!(display, CurrencyDisplay::Eur | CurrencyDisplay::Both);

    if text.contains('€') {
        if !wants_bgn {
            return text.to_string();
        }
        return EUR_AMOUNT
            .replace_all(text, |caps: &Captures| {
                let Some(eur) = captured_amount(caps) else {
                    return caps[0].to_string();
                };
                let bgn = format_amount(eur * EURO_RATE);
                match display {
                    CurrencyDisplay::Bgn => format!("{bgn} лв."),
                    _ => format!("{bgn} лв. ({})", &caps[0]),
                }
            })
            .into_owned();
    }

    if text.contains("лв.") && wants_eur {
        return BGN_AMOUNT
            .replace_all(text, |caps: &Captures| {
                let Some(bgn) = captured_amount(caps) else {
                    return caps[0].to_string();
                };
                let eur = format_amount(bgn / EURO_RATE);
                match display {
                    CurrencyDisplay::Eur => format!("{eur} €"),
                    _ => format!("{} ({eur} €)", &caps[0]),
                }
            })
            .into_owned();
    }

    text.to_string()
}

fn captured_amount(caps: &Captures) -> Option<Decimal> {
    caps.get(1)?.as_str().parse().ok()
}

/// A result laid out for display: title, total, log and hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: Option<String>,
    pub header: &'static str,
    pub total: String,
    pub lines: Vec<String>,
    pub hints: Vec<String>,
}

impl Report {
    pub fn new(
        result: &CalculationResult,
        object_name: &str,
        display: CurrencyDisplay,
    ) -> Self {
        let lines = if result.error {
            result.rendered_log()
        } else {
            result.log.iter().map(|l| render_line(l, display)).collect()
        };
        let title = match object_name.trim() {
            "" => None,
            name => Some(name.to_string()),
        };
        Self {
            title,
            header: total_header(display),
            total: format_total(result, display),
            lines,
            hints: result.hints.clone(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, "{title}")?;
        }
        writeln!(f, "{} {}", self.header, self.total)?;
        if !self.lines.is_empty() {
            writeln!(f)?;
            for line in &self.lines {
                writeln!(f, "{line}")?;
            }
        }
        if !self.hints.is_empty() {
            writeln!(f)?;
            writeln!(f, "{HINTS_HEADING}")?;
            for hint in &self.hints {
                writeln!(f, "- {hint}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fee_core::{Discipline, FormState, calculate};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn money_formats_per_display() {
        let fee = Money::eur(dec!(100));

        assert_eq!(format_money(&fee, CurrencyDisplay::Eur), "100.00 €");
        assert_eq!(format_money(&fee, CurrencyDisplay::Bgn), "195.58 лв.");
        assert_eq!(format_money(&fee, CurrencyDisplay::Both), "195.58 лв. (100.00 €)");
    }

    #[test]
    fn lev_amount_shown_in_euro() {
        assert_eq!(
            format_money(&Money::bgn(dec!(11736.00)), CurrencyDisplay::Eur),
            "6000.52 €"
        );
    }

    #[test]
    fn headers_follow_display() {
        assert_eq!(total_header(CurrencyDisplay::Eur), "ОБЩО (€ без ДДС):");
        assert_eq!(total_header(CurrencyDisplay::Bgn), "ОБЩО (лв. без ДДС):");
        assert_eq!(total_header(CurrencyDisplay::Both), "ОБЩО (без ДДС):");
    }

    #[test]
    fn legacy_euro_text_rewritten_to_lev() {
        let line = "II.1 Жилищна сграда: 180 м² * 4.50 €/м² = 810.00 €";

        assert_eq!(
            rewrite_legacy_line(line, CurrencyDisplay::Bgn),
            "II.1 Жилищна сграда: 180 м² * 8.80 лв./м² = 1584.22 лв."
        );
        assert_eq!(
            rewrite_legacy_line(line, CurrencyDisplay::Both),
            "II.1 Жилищна сграда: 180 м² * 8.80 лв. (4.50 €)/м² = 1584.22 лв. (810.00 €)"
        );
        assert_eq!(rewrite_legacy_line(line, CurrencyDisplay::Eur), line);
    }

    #[test]
    fn legacy_lev_text_rewritten_to_euro() {
        let line = "Сгради: 600 м² * 19.56 лв./м² = 11736.00 лв.";

        assert_eq!(
            rewrite_legacy_line(line, CurrencyDisplay::Eur),
            "Сгради: 600 м² * 10.00 €/м² = 6000.52 €"
        );
        assert_eq!(
            rewrite_legacy_line(line, CurrencyDisplay::Both),
            "Сгради: 600 м² * 19.56 лв. (10.00 €)/м² = 11736.00 лв. (6000.52 €)"
        );
        assert_eq!(rewrite_legacy_line(line, CurrencyDisplay::Bgn), line);
    }

    #[test]
    fn rejected_form_shows_placeholder_total() {
        let result = CalculationResult {
            total: Decimal::ZERO,
            log: Vec::new(),
            error: true,
            hints: Vec::new(),
        };

        assert_eq!(format_total(&result, CurrencyDisplay::Both), "---");
    }

    #[test]
    fn report_text_lists_title_total_log_and_hints() {
        let form = FormState::from_value(
            Discipline::Architectural,
            json!({
                "objectName": "Жилищна сграда Лозенец",
                "currencyDisplay": "bgn",
                "buildingType": "2",
                "area": "600",
                "phase": 3,
                "toggleDevelopmentPlans": true
            }),
        )
        .unwrap();
        let result = calculate(&form);

        let text = Report::new(&result, form.object_name(), form.currency_display()).to_string();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Жилищна сграда Лозенец"));
        assert_eq!(lines.next(), Some("ОБЩО (лв. без ДДС): 11736.00 лв."));
        assert!(text.contains(HINTS_HEADING));
        assert!(text.contains("11736.00 лв."));
    }
}
