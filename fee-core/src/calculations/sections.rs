use rust_decimal::Decimal;
use tracing::warn;

use super::coefficients::Composition;
use super::log::LogLine;
use crate::models::SectionInput;

/// What one section resolver produced.
///
/// An included section is either complete, with a subtotal and one log line,
/// or incomplete, with exactly one hint and a zero subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutcome {
    /// Heading used when coefficients are listed for this section.
    pub title: &'static str,
    /// Short name used in the summary line.
    pub label: &'static str,
    pub included: bool,
    pub complete: bool,
    /// Base subtotal in the section's native currency.
    pub subtotal: Decimal,
    pub log_line: Option<LogLine>,
    pub hint: Option<String>,
    pub composition: Option<Composition>,
}

impl SectionOutcome {
    pub fn excluded(
        title: &'static str,
        label: &'static str,
    ) -> Self {
        Self {
            title,
            label,
            included: false,
            complete: false,
            subtotal: Decimal::ZERO,
            log_line: None,
            hint: None,
            composition: None,
        }
    }

    pub fn incomplete(
        title: &'static str,
        label: &'static str,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            included: true,
            hint: Some(hint.into()),
            ..Self::excluded(title, label)
        }
    }

    pub fn complete(
        title: &'static str,
        label: &'static str,
        subtotal: Decimal,
        log_line: LogLine,
    ) -> Self {
        Self {
            included: true,
            complete: true,
            subtotal,
            log_line: Some(log_line),
            ..Self::excluded(title, label)
        }
    }

    pub fn with_composition(
        mut self,
        composition: Composition,
    ) -> Self {
        self.composition = Some(composition);
        self
    }

    /// Subtotal after coefficients, when any were applied.
    pub fn contribution(&self) -> Decimal {
        self.composition
            .as_ref()
            .map_or(self.subtotal, |c| c.adjusted)
    }
}

/// The inputs of an included section, or the finished outcome of a disabled
/// or rejected one. A rejected section fails closed with its hint.
pub(crate) fn included_input<'a, T>(
    input: &'a SectionInput<T>,
    title: &'static str,
    label: &'static str,
    hint: &str,
) -> Result<&'a T, SectionOutcome> {
    match input {
        SectionInput::Disabled => Err(SectionOutcome::excluded(title, label)),
        SectionInput::Rejected(err) => {
            warn!(section = title, "section input rejected: {}", err);
            Err(SectionOutcome::incomplete(title, label, hint))
        }
        SectionInput::Included(input) => Ok(input),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::log::LineKind;
    use crate::models::FormError;

    #[test]
    fn incomplete_section_contributes_nothing() {
        let outcome = SectionOutcome::incomplete("ПУП", "ПУП", "Попълнете вид ПУП, брой и площ на имотите.");

        assert!(outcome.included);
        assert!(!outcome.complete);
        assert_eq!(outcome.contribution(), Decimal::ZERO);
        assert_eq!(outcome.log_line, None);
    }

    #[test]
    fn rejected_input_fails_closed_with_hint() {
        let input: SectionInput<u32> = SectionInput::Rejected(FormError::UnknownCode {
            field: "planType",
            code: "7".to_string(),
        });

        let outcome = included_input(&input, "ПУП", "ПУП", "hint").unwrap_err();

        assert!(outcome.included);
        assert_eq!(outcome.hint.as_deref(), Some("hint"));
        assert_eq!(outcome.subtotal, Decimal::ZERO);
    }

    #[test]
    fn disabled_input_is_excluded() {
        let outcome = included_input(&SectionInput::<u32>::Disabled, "ПУП", "ПУП", "hint").unwrap_err();

        assert!(!outcome.included);
        assert_eq!(outcome.hint, None);
    }

    #[test]
    fn contribution_prefers_adjusted_value() {
        let outcome = SectionOutcome::complete(
            "Нови сгради",
            "Сгради",
            dec!(1000),
            LogLine::new(LineKind::Section).text("x"),
        )
        .with_composition(Composition {
            anchor: dec!(1000),
            adjusted: dec!(1500),
            lines: Vec::new(),
        });

        assert_eq!(outcome.contribution(), dec!(1500));
    }
}
