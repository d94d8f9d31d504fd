//! The pricing rule engine.
//!
//! Each discipline validates its raw form once, resolves its sections against
//! the price tables, applies coefficients and aggregates the outcome into a
//! [`CalculationResult`]. Calculation is pure and never fails. An unusable
//! selector or count fails its own section closed with a hint; only a
//! negative magnitude the form relies on produces a result with `error` set.

pub mod aggregator;
pub mod architectural;
pub mod coefficients;
pub mod common;
pub mod log;
pub mod sections;
pub mod structural;

pub use aggregator::{CalculationResult, NO_DATA_HINT, NO_SECTION_HINT};
pub use architectural::ArchitecturalCalculator;
pub use coefficients::{CoefficientKind, CoefficientSpec, Composition};
pub use log::{LineKind, LogLine, Segment};
pub use sections::SectionOutcome;
pub use structural::StructuralCalculator;

use crate::models::FormState;
use crate::tables::ConstructionTypeTable;

/// A calculator for one discipline's raw form.
pub trait FeeCalculator {
    type Form;

    fn calculate(
        &self,
        form: &Self::Form,
    ) -> CalculationResult;
}

/// Calculates a form of either discipline with the built-in tables.
pub fn calculate(form: &FormState) -> CalculationResult {
    calculate_with(form, ConstructionTypeTable::builtin())
}

/// Calculates a form, pricing structural forms against `types`.
pub fn calculate_with(
    form: &FormState,
    types: &ConstructionTypeTable,
) -> CalculationResult {
    match form {
        FormState::Structural(form) => StructuralCalculator::new(types).calculate(form),
        FormState::Architectural(form) => ArchitecturalCalculator::builtin().calculate(form),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::models::{Discipline, EURO_RATE};

    #[test]
    fn dispatches_on_discipline() {
        let arch = FormState::from_value(
            Discipline::Architectural,
            json!({ "buildingType": "2", "area": "600", "phase": 3 }),
        )
        .unwrap();
        let structural =
            FormState::from_value(Discipline::Structural, json!({ "projectType": "II.1", "area": 180 }))
                .unwrap();

        assert_eq!(calculate(&arch).total, dec!(11736.00) / EURO_RATE);
        assert_eq!(calculate(&structural).total, dec!(810.00));
    }

    #[test]
    fn initial_forms_are_incomplete_not_errors() {
        for discipline in [Discipline::Structural, Discipline::Architectural] {
            let result = calculate(&FormState::initial(discipline));

            assert!(!result.error);
            assert_eq!(result.hints.len(), 1, "{discipline:?}");
        }
    }
}
