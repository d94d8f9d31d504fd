//! Structural fee calculation.
//!
//! A single mandatory section priced from the construction type table (EUR),
//! followed by the structural coefficients for categories that take them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use super::FeeCalculator;
use super::aggregator::{CalculationResult, aggregate};
use super::coefficients::{CoefficientKind, CoefficientSpec, apply};
use super::common::{format_amount, format_quantity};
use super::log::{LineKind, LogLine};
use super::sections::SectionOutcome;
use crate::models::{
    FormError, Money, StructuralFormState, StructuralInputs, non_negative, whole_count,
};
use crate::tables::{ConstructionType, ConstructionTypeTable, STRUCTURAL_CURRENCY, StructuralPricing};

pub const PROJECT_TYPE_HINT: &str = "Изберете вид конструкция.";
pub const AREA_HINT: &str = "Попълнете РЗП за избрания вид конструкция.";
pub const WALL_SECTIONS_HINT: &str = "Попълнете брой секции на подпорната стена.";
pub const UNPRICED_TYPE_HINT: &str = "Избраният вид конструкция липсва в ценовата таблица.";

/// Crane surcharge per m² of hall area, in EUR.
pub const CRANE_RATE: Decimal = dec!(1.00);

const TITLE: &str = "Конструкции";

/// Coefficient inputs derived from the form and the selected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralCoefficientInput {
    pub complexity_percent: Decimal,
    /// Hall area charged with the crane surcharge, when it applies.
    pub crane_area: Option<Decimal>,
    pub accelerated: bool,
    pub supervision: bool,
}

/// Coefficients for categories other than I and VII. Supervision comes last.
pub fn structural_coefficients() -> Vec<CoefficientSpec<StructuralCoefficientInput>> {
    vec![
        CoefficientSpec::new(
            "Сложна геометрия/терен",
            CoefficientKind::AdditivePercentage,
            |c: &StructuralCoefficientInput| Some(c.complexity_percent),
        ),
        CoefficientSpec::new(
            "Хале с кран",
            CoefficientKind::AdditiveFlat,
            |c: &StructuralCoefficientInput| c.crane_area.map(|area| area * CRANE_RATE),
        ),
        CoefficientSpec::new(
            "Ускорено проектиране",
            CoefficientKind::Multiplicative,
            |c: &StructuralCoefficientInput| c.accelerated.then_some(dec!(1.5)),
        ),
        CoefficientSpec::new(
            "Авторски надзор",
            CoefficientKind::Multiplicative,
            |c: &StructuralCoefficientInput| c.supervision.then_some(dec!(1.15)),
        ),
    ]
}

/// Calculator over a construction type table.
#[derive(Debug, Clone, Copy)]
pub struct StructuralCalculator<'a> {
    types: &'a ConstructionTypeTable,
}

impl StructuralCalculator<'static> {
    pub fn builtin() -> Self {
        Self::new(ConstructionTypeTable::builtin())
    }
}

impl Default for StructuralCalculator<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> StructuralCalculator<'a> {
    pub fn new(types: &'a ConstructionTypeTable) -> Self {
        Self { types }
    }

    /// Prices already validated inputs.
    ///
    /// A code that is well formed but absent from the table fails the section
    /// closed. A negative magnitude the selected type uses rejects the form.
    pub fn calculate_inputs(
        &self,
        inputs: &StructuralInputs,
    ) -> CalculationResult {
        match self.priced_section(inputs) {
            Ok(section) => aggregate(&[section], STRUCTURAL_CURRENCY),
            Err(err) => {
                warn!("structural form rejected: {}", err);
                CalculationResult::invalid(&err)
            }
        }
    }

    fn priced_section(
        &self,
        inputs: &StructuralInputs,
    ) -> Result<SectionOutcome, FormError> {
        let Some(code) = &inputs.project_type else {
            return Ok(SectionOutcome::incomplete(TITLE, TITLE, PROJECT_TYPE_HINT));
        };
        let Some(ty) = self.types.get(code) else {
            warn!(%code, "construction type missing from the active table");
            return Ok(SectionOutcome::incomplete(TITLE, TITLE, UNPRICED_TYPE_HINT));
        };

        let section = self.section(ty, inputs)?;
        if !section.complete || !ty.code.allows_coefficients() {
            return Ok(section);
        }

        let coefficient_input = StructuralCoefficientInput {
            complexity_percent: non_negative("complexityPercentage", inputs.complexity_percent)?,
            crane_area: (inputs.has_crane && ty.code.crane_eligible()).then_some(inputs.area),
            accelerated: inputs.accelerated,
            supervision: inputs.supervision,
        };
        let anchor = Money::new(section.subtotal, STRUCTURAL_CURRENCY);
        let composition = apply(
            anchor,
            anchor.amount,
            &structural_coefficients(),
            &coefficient_input,
        );
        Ok(section.with_composition(composition))
    }

    fn section(
        &self,
        ty: &ConstructionType,
        inputs: &StructuralInputs,
    ) -> Result<SectionOutcome, FormError> {
        let money = Money::eur;
        let heading = format!("{} {}: ", ty.code, ty.name);

        match ty.pricing {
            StructuralPricing::Fixed { fee } => {
                let line = LogLine::new(LineKind::Section)
                    .text(heading)
                    .amount(money(fee))
                    .text(" (фиксирана цена)");
                Ok(SectionOutcome::complete(TITLE, TITLE, fee, line))
            }
            StructuralPricing::PerSquareMetre { min_area, max_area, .. } => {
                let area = non_negative("area", inputs.area)?;
                if area.is_zero() {
                    return Ok(SectionOutcome::incomplete(TITLE, TITLE, AREA_HINT));
                }
                if let Some(max) = max_area.filter(|max| area > *max) {
                    return Ok(SectionOutcome::incomplete(
                        TITLE,
                        TITLE,
                        format!(
                            "Площта надвишава максималните {} м² за този вид конструкция.",
                            format_quantity(max)
                        ),
                    ));
                }

                let resolution = match ty.resolve_area(area) {
                    Some(Ok(resolution)) => resolution,
                    Some(Err(err)) => {
                        warn!(code = %ty.code, %area, "structural lookup failed: {}", err);
                        return Ok(SectionOutcome::incomplete(TITLE, TITLE, AREA_HINT));
                    }
                    None => return Ok(SectionOutcome::incomplete(TITLE, TITLE, AREA_HINT)),
                };
                debug!(code = %ty.code, %area, amount = %resolution.amount, "structural type resolved");

                let line = LogLine::new(LineKind::Section).text(heading);
                let line = if resolution.is_flat_fee {
                    line.amount(money(resolution.amount)).text(format!(
                        " (мин. цена за {} м²)",
                        format_quantity(min_area.unwrap_or(Decimal::ZERO))
                    ))
                } else {
                    line.text(format!("{} м² * ", format_quantity(area)))
                        .amount(money(resolution.rate_used))
                        .text("/м² = ")
                        .amount(money(resolution.amount))
                };
                Ok(SectionOutcome::complete(TITLE, TITLE, resolution.amount, line))
            }
            StructuralPricing::RetainingWall {
                section_fee,
                per_metre,
            } => {
                let wall_sections = non_negative("wallSections", inputs.wall_sections)?;
                let additional_length = non_negative("additionalLength", inputs.additional_length)?;
                let count = match whole_count("wallSections", wall_sections) {
                    Ok(count) => count,
                    Err(err) => {
                        warn!(code = %ty.code, "retaining wall rejected: {}", err);
                        return Ok(SectionOutcome::incomplete(TITLE, TITLE, WALL_SECTIONS_HINT));
                    }
                };
                if count == 0 {
                    return Ok(SectionOutcome::incomplete(TITLE, TITLE, WALL_SECTIONS_HINT));
                }
                let subtotal = wall_sections * section_fee + additional_length * per_metre;

                let mut line = LogLine::new(LineKind::Section)
                    .text(format!("{heading}{count} бр. * "))
                    .amount(money(section_fee));
                if additional_length > Decimal::ZERO {
                    line = line
                        .text(format!(" + {} м * ", format_quantity(additional_length)))
                        .amount(money(per_metre))
                        .text("/м");
                }
                let line = line.text(" = ").amount(money(subtotal));
                debug!(code = %ty.code, subtotal = %format_amount(subtotal), "retaining wall priced");
                Ok(SectionOutcome::complete(TITLE, TITLE, subtotal, line))
            }
        }
    }
}

impl FeeCalculator for StructuralCalculator<'_> {
    type Form = StructuralFormState;

    fn calculate(
        &self,
        form: &StructuralFormState,
    ) -> CalculationResult {
        match StructuralInputs::from_form(form) {
            Ok(inputs) => self.calculate_inputs(&inputs),
            Err(err) => {
                warn!("structural section rejected: {}", err);
                aggregate(
                    &[SectionOutcome::incomplete(TITLE, TITLE, PROJECT_TYPE_HINT)],
                    STRUCTURAL_CURRENCY,
                )
            }
        }
    }
}
