//! Ordered adjustment coefficients.
//!
//! Coefficients are declared as data and applied in three phases: percentage
//! adjustments, then flat and multiple additions, then multiplicative factors.
//! Additions are measured against the anchor subtotal; factors apply to the
//! running value. Declaration order is kept within a phase.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use tracing::warn;

use super::common::{format_quantity, format_signed_percent};
use super::log::{LineKind, LogLine};
use crate::models::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientKind {
    /// Signed percent of the anchor.
    AdditivePercentage,
    /// Absolute amount in the anchor's currency.
    AdditiveFlat,
    /// Multiple of the anchor.
    AdditiveMultiple,
    /// Repetition count `n`; adds `(n - 1) × anchor × rate`.
    AdditivePerRepetition,
    /// Factor applied to the running value.
    Multiplicative,
}

impl CoefficientKind {
    fn phase(&self) -> u8 {
        match self {
            Self::AdditivePercentage => 0,
            Self::AdditiveFlat | Self::AdditiveMultiple | Self::AdditivePerRepetition => 1,
            Self::Multiplicative => 2,
        }
    }
}

/// A declared coefficient over inputs `I`.
///
/// `magnitude` returns `None` when the coefficient is not triggered.
pub struct CoefficientSpec<I> {
    pub label: &'static str,
    pub kind: CoefficientKind,
    pub magnitude: fn(&I) -> Option<Decimal>,
    pub note: Option<fn(&I) -> Option<String>>,
    /// Only the first triggered coefficient of a group applies.
    pub exclusive_group: Option<&'static str>,
}

impl<I> CoefficientSpec<I> {
    pub fn new(
        label: &'static str,
        kind: CoefficientKind,
        magnitude: fn(&I) -> Option<Decimal>,
    ) -> Self {
        Self {
            label,
            kind,
            magnitude,
            note: None,
            exclusive_group: None,
        }
    }

    pub fn with_note(
        mut self,
        note: fn(&I) -> Option<String>,
    ) -> Self {
        self.note = Some(note);
        self
    }

    pub fn exclusive(
        mut self,
        group: &'static str,
    ) -> Self {
        self.exclusive_group = Some(group);
        self
    }
}

/// Rate per extra repetition: 0.5 below six repetitions, 0.4 from six on.
pub fn repetition_rate(repetitions: u32) -> Decimal {
    if repetitions < 6 { dec!(0.5) } else { dec!(0.4) }
}

/// Result of applying coefficients to one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub anchor: Decimal,
    pub adjusted: Decimal,
    pub lines: Vec<LogLine>,
}

impl Composition {
    pub fn fired(&self) -> bool {
        !self.lines.is_empty()
    }
}

enum Effect {
    Add(Decimal, LogLine),
    Multiply(Decimal),
}

/// Applies `specs` to `running`, measuring additions against `anchor`.
///
/// A zero anchor or a zero magnitude contributes nothing and logs nothing.
pub fn apply<I>(
    anchor: Money,
    running: Decimal,
    specs: &[CoefficientSpec<I>],
    inputs: &I,
) -> Composition {
    let mut composition = Composition {
        anchor: anchor.amount,
        adjusted: running,
        lines: Vec::new(),
    };
    if anchor.amount.is_zero() {
        return composition;
    }

    let mut taken_groups: Vec<&'static str> = Vec::new();
    for phase in 0..=2 {
        for spec in specs.iter().filter(|s| s.kind.phase() == phase) {
            let Some(effect) = effect_of(spec, anchor, inputs) else {
                continue;
            };

            if let Some(group) = spec.exclusive_group {
                if taken_groups.contains(&group) {
                    warn!(label = spec.label, group, "exclusive coefficient dropped");
                    continue;
                }
                taken_groups.push(group);
            }

            match effect {
                Effect::Add(delta, line) => {
                    composition.adjusted += delta;
                    composition.lines.push(line);
                }
                Effect::Multiply(factor) => {
                    let before = composition.adjusted;
                    let after = before * factor;
                    composition.adjusted = after;
                    composition.lines.push(
                        LogLine::new(LineKind::Coefficient)
                            .text(format!("* {}: ", spec.label))
                            .amount(Money::new(before, anchor.currency))
                            .text(format!(" × {} = ", format_quantity(factor)))
                            .amount(Money::new(after, anchor.currency)),
                    );
                }
            }
        }
    }
    composition
}

fn effect_of<I>(
    spec: &CoefficientSpec<I>,
    anchor: Money,
    inputs: &I,
) -> Option<Effect> {
    let magnitude = (spec.magnitude)(inputs).filter(|m| !m.is_zero())?;
    let money = |amount: Decimal| Money::new(amount, anchor.currency);
    let line = LogLine::new(LineKind::Coefficient);

    let effect = match spec.kind {
        CoefficientKind::AdditivePercentage => {
            let delta = anchor.amount * magnitude / dec!(100);
            let mut line = line
                .text(format!("+ {} ({}%): ", spec.label, format_signed_percent(magnitude)))
                .amount(money(delta));
            if let Some(note) = spec.note.and_then(|note| note(inputs)) {
                line = line.text(format!(" ({note})"));
            }
            Effect::Add(delta, line)
        }
        CoefficientKind::AdditiveFlat => Effect::Add(
            magnitude,
            line.text(format!("+ {}: +", spec.label)).amount(money(magnitude)),
        ),
        CoefficientKind::AdditiveMultiple => {
            let delta = anchor.amount * magnitude;
            Effect::Add(
                delta,
                line.text(format!("+ {}: +", spec.label)).amount(money(delta)),
            )
        }
        CoefficientKind::AdditivePerRepetition => {
            let count = magnitude.trunc().to_u32()?;
            if count <= 1 {
                return None;
            }
            let extra = count - 1;
            let rate = repetition_rate(count);
            let delta = Decimal::from(extra) * anchor.amount * rate;
            Effect::Add(
                delta,
                line.text(format!(
                    "+ {extra} {} (x{}): +",
                    spec.label,
                    format_quantity(rate)
                ))
                .amount(money(delta)),
            )
        }
        CoefficientKind::Multiplicative => Effect::Multiply(magnitude),
    };
    Some(effect)
}
