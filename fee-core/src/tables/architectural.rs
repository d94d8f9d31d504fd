//! Architectural price tables (BGN).

use std::sync::LazyLock;

use rust_decimal_macros::dec;

use super::price_table::{PriceCategory, PriceTable, RateTier};
use crate::models::{BuildingType, Currency, DesignPhase, PlanType, PlotArea};

/// New buildings: area in m², one column per design phase.
pub static NEW_BUILDINGS: LazyLock<PriceTable<BuildingType, 4>> = LazyLock::new(|| {
    PriceTable::new(
        "Нови сгради",
        Currency::Bgn,
        "м²",
        DesignPhase::ALL.map(|p| p.name()),
        vec![
            (
                BuildingType::SingleFamily,
                PriceCategory {
                    min_threshold: dec!(100),
                    min_fees: [dec!(293.37), dec!(1466.87), dec!(2933.75), dec!(4400.62)],
                    tiers: vec![
                        RateTier::up_to(dec!(200), [dec!(2.93), dec!(14.67), dec!(29.34), dec!(44.01)]),
                        RateTier::up_to(dec!(300), [dec!(2.35), dec!(11.73), dec!(23.47), dec!(35.20)]),
                        RateTier::up_to(dec!(500), [dec!(2.15), dec!(10.76), dec!(21.51), dec!(32.27)]),
                        RateTier::unbounded([dec!(1.96), dec!(9.78), dec!(19.56), dec!(29.34)]),
                    ],
                },
            ),
            (
                BuildingType::MultiFamily,
                PriceCategory {
                    min_threshold: dec!(500),
                    min_fees: [dec!(977.92), dec!(4889.58), dec!(9779.15), dec!(14668.73)],
                    tiers: vec![
                        RateTier::up_to(dec!(1000), [dec!(1.96), dec!(9.78), dec!(19.56), dec!(29.34)]),
                        RateTier::up_to(dec!(2500), [dec!(1.56), dec!(7.82), dec!(15.65), dec!(23.47)]),
                        RateTier::up_to(dec!(5000), [dec!(1.37), dec!(6.85), dec!(13.69), dec!(20.54)]),
                        RateTier::unbounded([dec!(1.17), dec!(5.87), dec!(11.73), dec!(17.60)]),
                    ],
                },
            ),
            (
                BuildingType::StandardPublic,
                PriceCategory {
                    min_threshold: dec!(150),
                    min_fees: [dec!(293.37), dec!(1466.87), dec!(2933.75), dec!(4400.62)],
                    tiers: vec![
                        RateTier::up_to(dec!(500), [dec!(1.96), dec!(9.78), dec!(19.56), dec!(29.34)]),
                        RateTier::up_to(dec!(1000), [dec!(1.56), dec!(7.82), dec!(15.65), dec!(23.47)]),
                        RateTier::up_to(dec!(2500), [dec!(1.37), dec!(6.85), dec!(13.69), dec!(20.54)]),
                        RateTier::unbounded([dec!(1.17), dec!(5.87), dec!(11.73), dec!(17.60)]),
                    ],
                },
            ),
            (
                BuildingType::SpecializedPublic,
                PriceCategory {
                    min_threshold: dec!(150),
                    min_fees: [dec!(381.39), dec!(1906.93), dec!(3813.87), dec!(5720.80)],
                    tiers: vec![
                        RateTier::up_to(dec!(500), [dec!(2.54), dec!(12.71), dec!(25.43), dec!(38.14)]),
                        RateTier::up_to(dec!(1000), [dec!(2.15), dec!(10.76), dec!(21.51), dec!(32.27)]),
                        RateTier::up_to(dec!(2500), [dec!(1.96), dec!(9.78), dec!(19.56), dec!(29.34)]),
                        RateTier::unbounded([dec!(1.76), dec!(8.80), dec!(17.60), dec!(26.40)]),
                    ],
                },
            ),
            (
                BuildingType::Warehouse,
                PriceCategory {
                    min_threshold: dec!(150),
                    min_fees: [dec!(264.04), dec!(1320.19), dec!(2640.37), dec!(3960.56)],
                    tiers: vec![
                        RateTier::up_to(dec!(500), [dec!(1.76), dec!(8.80), dec!(17.60), dec!(26.40)]),
                        RateTier::up_to(dec!(1000), [dec!(1.37), dec!(6.85), dec!(13.69), dec!(20.54)]),
                        RateTier::up_to(dec!(2500), [dec!(1.17), dec!(5.87), dec!(11.73), dec!(17.60)]),
                        RateTier::unbounded([dec!(0.98), dec!(4.89), dec!(9.78), dec!(14.67)]),
                    ],
                },
            ),
            (
                BuildingType::Industrial,
                PriceCategory {
                    min_threshold: dec!(150),
                    min_fees: [dec!(352.05), dec!(1760.25), dec!(3520.49), dec!(5280.74)],
                    tiers: vec![
                        RateTier::up_to(dec!(500), [dec!(2.35), dec!(11.73), dec!(23.47), dec!(35.20)]),
                        RateTier::up_to(dec!(1000), [dec!(1.96), dec!(9.78), dec!(19.56), dec!(29.34)]),
                        RateTier::up_to(dec!(2500), [dec!(1.76), dec!(8.80), dec!(17.60), dec!(26.40)]),
                        RateTier::unbounded([dec!(1.56), dec!(7.82), dec!(15.65), dec!(23.47)]),
                    ],
                },
            ),
        ],
    )
});

/// Development plans: price per plot, one column per plot-area bracket.
/// Plot-count brackets are 1, 2 to 4, and 5 or more.
pub static DEVELOPMENT_PLANS: LazyLock<PriceTable<PlanType, 4>> = LazyLock::new(|| {
    PriceTable::new(
        "ПУП",
        Currency::Bgn,
        "бр.",
        PlotArea::ALL.map(|a| a.name()),
        vec![
            (
                PlanType::Building,
                PriceCategory {
                    min_threshold: dec!(1),
                    min_fees: [dec!(977.92), dec!(1466.87), dec!(1955.83), dec!(2444.79)],
                    tiers: vec![
                        RateTier::up_to(dec!(4), [dec!(586.75), dec!(880.12), dec!(1173.50), dec!(1466.87)]),
                        RateTier::unbounded([dec!(488.96), dec!(733.44), dec!(977.92), dec!(1222.39)]),
                    ],
                },
            ),
            (
                PlanType::RegulationAndBuilding,
                PriceCategory {
                    min_threshold: dec!(1),
                    min_fees: [dec!(1173.50), dec!(1760.25), dec!(2347.00), dec!(2933.75)],
                    tiers: vec![
                        RateTier::up_to(dec!(4), [dec!(684.54), dec!(1026.81), dec!(1369.08), dec!(1711.35)]),
                        RateTier::unbounded([dec!(586.75), dec!(880.12), dec!(1173.50), dec!(1466.87)]),
                    ],
                },
            ),
            (
                PlanType::WorkingDevelopment,
                PriceCategory {
                    min_threshold: dec!(1),
                    min_fees: [dec!(1564.66), dec!(2347.00), dec!(3129.33), dec!(3911.66)],
                    tiers: vec![
                        RateTier::up_to(dec!(4), [dec!(880.12), dec!(1320.19), dec!(1760.25), dec!(2200.31)]),
                        RateTier::unbounded([dec!(782.33), dec!(1173.50), dec!(1564.66), dec!(1955.83)]),
                    ],
                },
            ),
        ],
    )
});

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn tables_are_well_formed() {
        assert_eq!(NEW_BUILDINGS.validate(), Ok(()));
        assert_eq!(DEVELOPMENT_PLANS.validate(), Ok(()));
    }

    #[test]
    fn every_building_type_and_plan_type_has_a_category() {
        for building in BuildingType::ALL {
            assert!(NEW_BUILDINGS.category(building).is_some(), "{building:?}");
        }
        for plan in PlanType::ALL {
            assert!(DEVELOPMENT_PLANS.category(plan).is_some(), "{plan:?}");
        }
    }

    #[test]
    fn multi_family_technical_project_at_600_square_metres() {
        let resolution = NEW_BUILDINGS
            .resolve(BuildingType::MultiFamily, dec!(600), DesignPhase::Technical.column())
            .unwrap();

        assert_eq!(resolution.rate_used, dec!(19.56));
        assert_eq!(resolution.amount, dec!(11736.00));
    }

    #[test]
    fn single_family_at_minimum_area_pays_minimum_fee() {
        let resolution = NEW_BUILDINGS
            .resolve(BuildingType::SingleFamily, dec!(100), DesignPhase::Conceptual.column())
            .unwrap();

        assert!(resolution.is_flat_fee);
        assert_eq!(resolution.amount, dec!(1466.87));
    }

    #[test]
    fn single_plot_uses_first_bracket() {
        let resolution = DEVELOPMENT_PLANS
            .resolve(PlanType::Building, Decimal::ONE, PlotArea::UpToOneDecare.column())
            .unwrap();

        assert_eq!(resolution.rate_used, dec!(977.92));
    }

    #[test]
    fn four_plots_stay_in_second_bracket_and_five_move_on() {
        let four = DEVELOPMENT_PLANS
            .resolve(PlanType::RegulationAndBuilding, dec!(4), PlotArea::OverTenDecares.column())
            .unwrap();
        let five = DEVELOPMENT_PLANS
            .resolve(PlanType::RegulationAndBuilding, dec!(5), PlotArea::OverTenDecares.column())
            .unwrap();

        assert_eq!(four.rate_used, dec!(1711.35));
        assert_eq!(five.rate_used, dec!(1466.87));
        assert_eq!(five.amount, dec!(7334.35));
    }
}
