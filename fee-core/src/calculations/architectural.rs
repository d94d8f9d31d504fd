//! Architectural fee calculation.
//!
//! Three toggleable sections priced from BGN tables: new buildings,
//! development plans and hourly work. Coefficients modify the new-buildings
//! subtotal only.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use super::FeeCalculator;
use super::aggregator::{CalculationResult, aggregate};
use super::coefficients::{CoefficientKind, CoefficientSpec, apply};
use super::common::format_quantity;
use super::log::{LineKind, LogLine};
use super::sections::{SectionOutcome, included_input};
use crate::models::{
    ArchCoefficientInput, ArchFormState, ArchInputs, BuildingType, Currency, DevelopmentPlanInput,
    HourlyInput, Money, NewBuildingInput, PlanType, SectionInput,
};
use crate::tables::{DEVELOPMENT_PLANS, NEW_BUILDINGS, PriceTable};

const ARCH_CURRENCY: Currency = Currency::Bgn;

pub const NEW_BUILDINGS_HINT: &str = "Попълнете вид, РЗП и фаза за 'Нови сгради'.";
pub const DEVELOPMENT_PLANS_HINT: &str = "Попълнете вид ПУП, брой и площ на имотите.";
pub const HOURLY_HINT: &str = "Попълнете тип проектант и часове.";

const NEW_BUILDINGS_TITLE: &str = "Нови сгради";

/// Coefficients applied to the new-buildings subtotal, in declaration order.
pub fn arch_coefficients() -> Vec<CoefficientSpec<ArchCoefficientInput>> {
    vec![
        CoefficientSpec::new(
            "Трудност",
            CoefficientKind::AdditivePercentage,
            |c: &ArchCoefficientInput| Some(c.difficulty_percent),
        )
        .with_note(|c: &ArchCoefficientInput| c.difficulty_notes.clone()),
        CoefficientSpec::new(
            "Доп. вариант",
            CoefficientKind::AdditiveMultiple,
            |c: &ArchCoefficientInput| c.variant.then_some(dec!(0.5)),
        ),
        CoefficientSpec::new(
            "Повторения",
            CoefficientKind::AdditivePerRepetition,
            |c: &ArchCoefficientInput| Some(Decimal::from(c.repetitions)),
        ),
        CoefficientSpec::new(
            "Реконструкция (с налична док.)",
            CoefficientKind::Multiplicative,
            |c: &ArchCoefficientInput| c.reconstruction_existing.then_some(dec!(1.5)),
        )
        .exclusive("reconstruction"),
        CoefficientSpec::new(
            "Реконструкция (без налична док.)",
            CoefficientKind::Multiplicative,
            |c: &ArchCoefficientInput| c.reconstruction_missing.then_some(dec!(2.0)),
        )
        .exclusive("reconstruction"),
        CoefficientSpec::new(
            "Ускорено проектиране",
            CoefficientKind::Multiplicative,
            |c: &ArchCoefficientInput| c.accelerated.then_some(dec!(1.5)),
        ),
    ]
}

/// Calculator over a pair of architectural price tables.
#[derive(Debug, Clone, Copy)]
pub struct ArchitecturalCalculator<'a> {
    new_buildings: &'a PriceTable<BuildingType, 4>,
    development_plans: &'a PriceTable<PlanType, 4>,
}

impl ArchitecturalCalculator<'static> {
    /// Calculator over the built-in tables.
    pub fn builtin() -> Self {
        Self::new(&NEW_BUILDINGS, &DEVELOPMENT_PLANS)
    }
}

impl Default for ArchitecturalCalculator<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> ArchitecturalCalculator<'a> {
    pub fn new(
        new_buildings: &'a PriceTable<BuildingType, 4>,
        development_plans: &'a PriceTable<PlanType, 4>,
    ) -> Self {
        Self {
            new_buildings,
            development_plans,
        }
    }

    /// Prices already validated inputs.
    pub fn calculate_inputs(
        &self,
        inputs: &ArchInputs,
    ) -> CalculationResult {
        let sections = [
            self.new_buildings_section(&inputs.new_buildings),
            self.development_plans_section(&inputs.development_plans),
            self.hourly_section(&inputs.hourly),
        ];
        aggregate(&sections, ARCH_CURRENCY)
    }

    fn new_buildings_section(
        &self,
        input: &SectionInput<NewBuildingInput>,
    ) -> SectionOutcome {
        let input = match included_input(input, NEW_BUILDINGS_TITLE, "Сгради", NEW_BUILDINGS_HINT) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };
        let section = self.new_buildings_base(input);
        if !section.complete {
            return section;
        }

        let anchor = Money::new(section.subtotal, ARCH_CURRENCY);
        let composition = apply(
            anchor,
            anchor.amount,
            &arch_coefficients(),
            &input.coefficients,
        );
        section.with_composition(composition)
    }

    fn new_buildings_base(
        &self,
        input: &NewBuildingInput,
    ) -> SectionOutcome {
        let (Some(building), Some(phase)) = (input.building_type, input.phase) else {
            return SectionOutcome::incomplete(NEW_BUILDINGS_TITLE, "Сгради", NEW_BUILDINGS_HINT);
        };
        if input.area <= Decimal::ZERO {
            return SectionOutcome::incomplete(NEW_BUILDINGS_TITLE, "Сгради", NEW_BUILDINGS_HINT);
        }

        let resolution = match self.new_buildings.resolve(building, input.area, phase.column()) {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(?building, ?phase, area = %input.area, "new buildings lookup failed: {}", err);
                return SectionOutcome::incomplete(NEW_BUILDINGS_TITLE, "Сгради", NEW_BUILDINGS_HINT);
            }
        };
        debug!(?building, ?phase, area = %input.area, rate = %resolution.rate_used, "new buildings resolved");

        let line = LogLine::new(LineKind::Section).text(format!(
            "{NEW_BUILDINGS_TITLE} ({}, {}): ",
            building.name(),
            phase.name()
        ));
        let line = if resolution.is_flat_fee {
            line.amount(Money::bgn(resolution.amount)).text(" (мин. цена)")
        } else {
            line.text(format!("{} м² * ", format_quantity(input.area)))
                .amount(Money::bgn(resolution.rate_used))
                .text("/м² = ")
                .amount(Money::bgn(resolution.amount))
        };
        SectionOutcome::complete(NEW_BUILDINGS_TITLE, "Сгради", resolution.amount, line)
    }

    fn development_plans_section(
        &self,
        input: &SectionInput<DevelopmentPlanInput>,
    ) -> SectionOutcome {
        const TITLE: &str = "ПУП";
        let input = match included_input(input, TITLE, TITLE, DEVELOPMENT_PLANS_HINT) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };
        let (Some(plan), Some(plot_area)) = (input.plan_type, input.plot_area) else {
            return SectionOutcome::incomplete(TITLE, TITLE, DEVELOPMENT_PLANS_HINT);
        };
        if input.plot_count == 0 {
            return SectionOutcome::incomplete(TITLE, TITLE, DEVELOPMENT_PLANS_HINT);
        }

        let count = Decimal::from(input.plot_count);
        let resolution = match self.development_plans.resolve(plan, count, plot_area.column()) {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(?plan, ?plot_area, count = input.plot_count, "development plans lookup failed: {}", err);
                return SectionOutcome::incomplete(TITLE, TITLE, DEVELOPMENT_PLANS_HINT);
            }
        };
        debug!(?plan, ?plot_area, count = input.plot_count, price = %resolution.rate_used, "development plans resolved");

        let n = input.plot_count;
        let line = LogLine::new(LineKind::Section)
            .text(format!("ПУП ({n} бр.): {n} * "))
            .amount(Money::bgn(resolution.rate_used))
            .text("/бр. = ")
            .amount(Money::bgn(resolution.amount));
        SectionOutcome::complete(TITLE, TITLE, resolution.amount, line)
    }

    fn hourly_section(
        &self,
        input: &SectionInput<HourlyInput>,
    ) -> SectionOutcome {
        const TITLE: &str = "Часова ставка";
        const LABEL: &str = "Часова ст.";
        let input = match included_input(input, TITLE, LABEL, HOURLY_HINT) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };
        let Some(designer) = input.designer else {
            return SectionOutcome::incomplete(TITLE, LABEL, HOURLY_HINT);
        };
        if input.hours <= Decimal::ZERO {
            return SectionOutcome::incomplete(TITLE, LABEL, HOURLY_HINT);
        }

        let rate = designer.hourly_rate();
        let subtotal = rate * input.hours;
        let line = LogLine::new(LineKind::Section)
            .text(format!("Часова ставка: {} ч. * ", format_quantity(input.hours)))
            .amount(Money::bgn(rate))
            .text("/ч. = ")
            .amount(Money::bgn(subtotal));
        SectionOutcome::complete(TITLE, LABEL, subtotal, line)
    }
}

impl FeeCalculator for ArchitecturalCalculator<'_> {
    type Form = ArchFormState;

    fn calculate(
        &self,
        form: &ArchFormState,
    ) -> CalculationResult {
        match ArchInputs::from_form(form) {
            Ok(inputs) => self.calculate_inputs(&inputs),
            Err(err) => {
                warn!("architectural form rejected: {}", err);
                CalculationResult::invalid(&err)
            }
        }
    }
}
