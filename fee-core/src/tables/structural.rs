//! Structural construction types (EUR).
//!
//! The built-in table can be replaced at runtime, so rows are owned values
//! rather than statics.

use std::collections::HashSet;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::price_table::{PriceCategory, PriceTableError, RateTier, Resolution};
use crate::models::{ConstructionCode, Currency};

/// Native currency of structural prices.
pub const STRUCTURAL_CURRENCY: Currency = Currency::Eur;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralPricing {
    /// A single fee regardless of size.
    Fixed { fee: Decimal },
    /// Rate per m² of built-up area. Areas at or below `min_area` are billed
    /// as `min_area`; areas above `max_area` are outside the type.
    PerSquareMetre {
        rate: Decimal,
        min_area: Option<Decimal>,
        max_area: Option<Decimal>,
    },
    /// Fee per wall section plus a rate per additional metre of length.
    RetainingWall {
        section_fee: Decimal,
        per_metre: Decimal,
    },
}

impl StructuralPricing {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::PerSquareMetre { .. } => "per_m2",
            Self::RetainingWall { .. } => "retaining_wall",
        }
    }

    /// Base figure shown in price listings: the fee, the rate, or the
    /// per-section fee.
    pub fn base_price(&self) -> Decimal {
        match self {
            Self::Fixed { fee } => *fee,
            Self::PerSquareMetre { rate, .. } => *rate,
            Self::RetainingWall { section_fee, .. } => *section_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionType {
    pub code: ConstructionCode,
    pub name: String,
    pub pricing: StructuralPricing,
}

impl ConstructionType {
    /// Resolves a per-m² type through a one-tier price category whose flat
    /// fee is the minimum area at the type's rate.
    ///
    /// Returns `None` for other pricing kinds.
    pub fn resolve_area(
        &self,
        area: Decimal,
    ) -> Option<Result<Resolution, PriceTableError>> {
        let StructuralPricing::PerSquareMetre { rate, min_area, .. } = self.pricing else {
            return None;
        };
        let min_area = min_area.unwrap_or(Decimal::ZERO);
        let category = PriceCategory {
            min_threshold: min_area,
            min_fees: [rate * min_area],
            tiers: vec![RateTier::unbounded([rate])],
        };
        Some(category.resolve(area, 0))
    }
}

/// The active set of construction types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionTypeTable {
    types: Vec<ConstructionType>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConstructionTableError {
    #[error("construction type table is empty")]
    Empty,

    #[error("duplicate construction type code '{0}'")]
    DuplicateCode(String),

    #[error("construction type '{code}': {reason}")]
    InvalidRow { code: String, reason: String },
}

impl ConstructionTypeTable {
    /// Builds a table, rejecting duplicate codes and inconsistent rows.
    pub fn new(types: Vec<ConstructionType>) -> Result<Self, ConstructionTableError> {
        if types.is_empty() {
            return Err(ConstructionTableError::Empty);
        }

        let mut seen = HashSet::new();
        for ty in &types {
            if !seen.insert(ty.code.as_str()) {
                return Err(ConstructionTableError::DuplicateCode(ty.code.to_string()));
            }
            validate_row(ty)?;
        }
        Ok(Self { types })
    }

    pub fn builtin() -> &'static ConstructionTypeTable {
        &BUILTIN
    }

    pub fn get(
        &self,
        code: &ConstructionCode,
    ) -> Option<&ConstructionType> {
        self.types.iter().find(|ty| ty.code == *code)
    }

    pub fn types(&self) -> &[ConstructionType] {
        &self.types
    }
}

fn validate_row(ty: &ConstructionType) -> Result<(), ConstructionTableError> {
    let invalid = |reason: &str| ConstructionTableError::InvalidRow {
        code: ty.code.to_string(),
        reason: reason.to_string(),
    };

    let amounts = match &ty.pricing {
        StructuralPricing::Fixed { fee } => vec![*fee],
        StructuralPricing::PerSquareMetre { rate, .. } => vec![*rate],
        StructuralPricing::RetainingWall {
            section_fee,
            per_metre,
        } => vec![*section_fee, *per_metre],
    };
    if amounts.iter().any(|a| a.is_sign_negative() && !a.is_zero()) {
        return Err(invalid("prices must not be negative"));
    }

    match ty.pricing {
        StructuralPricing::PerSquareMetre {
            min_area: Some(min),
            max_area: Some(max),
            ..
        } if min > max => Err(invalid("minimum area exceeds maximum area")),
        _ => Ok(()),
    }
}

fn per_m2(
    rate: Decimal,
    min_area: Decimal,
    max_area: Option<Decimal>,
) -> StructuralPricing {
    StructuralPricing::PerSquareMetre {
        rate,
        min_area: Some(min_area),
        max_area,
    }
}

static BUILTIN: LazyLock<ConstructionTypeTable> = LazyLock::new(|| {
    let rows = [
        ("I.1", "Масивна ограда", StructuralPricing::Fixed { fee: dec!(150.00) }),
        ("I.2", "Навес или беседка до 30 м²", StructuralPricing::Fixed { fee: dec!(200.00) }),
        ("I.3", "Външно стълбище или рампа", StructuralPricing::Fixed { fee: dec!(180.00) }),
        ("II.1", "Еднофамилна жилищна сграда до два етажа", per_m2(dec!(4.50), dec!(100), None)),
        ("II.2", "Еднофамилна жилищна сграда със сутерен", per_m2(dec!(5.00), dec!(120), None)),
        ("III.1", "Многофамилна жилищна сграда до пет етажа", per_m2(dec!(4.00), dec!(300), None)),
        ("III.2", "Многофамилна жилищна сграда над пет етажа", per_m2(dec!(4.50), dec!(500), None)),
        ("IV.1", "Административна или офис сграда", per_m2(dec!(4.50), dec!(300), None)),
        ("IV.2", "Училище, детска градина или болница", per_m2(dec!(5.50), dec!(300), None)),
        ("V.1", "Едноетажно хале със стоманобетонна конструкция", per_m2(dec!(3.00), dec!(300), None)),
        ("V.2", "Едноетажно хале с метална конструкция", per_m2(dec!(2.50), dec!(300), None)),
        ("VI.1", "Многоетажна производствена сграда", per_m2(dec!(3.50), dec!(500), None)),
        (
            "VII.1",
            "Подпорна стена до 3 м височина",
            StructuralPricing::RetainingWall {
                section_fee: dec!(400.00),
                per_metre: dec!(15.00),
            },
        ),
        (
            "VII.2",
            "Подпорна стена над 3 м височина",
            StructuralPricing::RetainingWall {
                section_fee: dec!(600.00),
                per_metre: dec!(25.00),
            },
        ),
        ("VIII.1", "Пристройка към съществуваща сграда", per_m2(dec!(5.50), dec!(50), Some(dec!(500)))),
        ("VIII.2", "Надстройка на съществуваща сграда", per_m2(dec!(6.00), dec!(50), Some(dec!(500)))),
        ("IX.1", "Конструктивно обследване на съществуваща сграда", per_m2(dec!(2.00), dec!(200), None)),
        ("X.1", "Усилване на съществуваща конструкция", per_m2(dec!(7.00), dec!(50), None)),
        ("XI.1", "Открит паркинг или площадка", per_m2(dec!(1.00), dec!(500), None)),
        ("XI.2", "Гараж до 50 м²", per_m2(dec!(6.00), dec!(20), Some(dec!(50)))),
    ];

    let types = rows
        .into_iter()
        .filter_map(|(code, name, pricing)| {
            Some(ConstructionType {
                code: ConstructionCode::parse(code)?,
                name: name.to_string(),
                pricing,
            })
        })
        .collect();
    ConstructionTypeTable { types }
});

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn code(s: &str) -> ConstructionCode {
        ConstructionCode::parse(s).unwrap()
    }

    #[test]
    fn builtin_table_passes_validation() {
        let table = ConstructionTypeTable::builtin();

        assert!(ConstructionTypeTable::new(table.types().to_vec()).is_ok());
        assert_eq!(table.types().len(), 20);
    }

    #[test]
    fn builtin_table_covers_every_category() {
        let categories: HashSet<u8> = ConstructionTypeTable::builtin()
            .types()
            .iter()
            .map(|ty| ty.code.category())
            .collect();

        assert_eq!(categories.len(), 11);
    }

    #[test]
    fn get_finds_row_by_code() {
        let ty = ConstructionTypeTable::builtin().get(&code("V.2")).unwrap();

        assert_eq!(ty.pricing.kind(), "per_m2");
        assert_eq!(ty.pricing.base_price(), dec!(2.50));
    }

    #[test]
    fn resolve_area_bills_minimum_area_below_floor() {
        let ty = ConstructionTypeTable::builtin().get(&code("II.1")).unwrap();

        let resolution = ty.resolve_area(dec!(80)).unwrap().unwrap();

        assert!(resolution.is_flat_fee);
        assert_eq!(resolution.amount, dec!(450.00));
    }

    #[test]
    fn resolve_area_multiplies_rate_above_floor() {
        let ty = ConstructionTypeTable::builtin().get(&code("II.1")).unwrap();

        let resolution = ty.resolve_area(dec!(180)).unwrap().unwrap();

        assert!(!resolution.is_flat_fee);
        assert_eq!(resolution.amount, dec!(810.00));
    }

    #[test]
    fn resolve_area_is_none_for_fixed_fee() {
        let ty = ConstructionTypeTable::builtin().get(&code("I.1")).unwrap();

        assert_eq!(ty.resolve_area(dec!(10)), None);
    }

    #[test]
    fn new_rejects_duplicate_codes() {
        let row = ConstructionTypeTable::builtin().types()[0].clone();

        assert_eq!(
            ConstructionTypeTable::new(vec![row.clone(), row]),
            Err(ConstructionTableError::DuplicateCode("I.1".to_string()))
        );
    }

    #[test]
    fn new_rejects_inverted_area_limits() {
        let ty = ConstructionType {
            code: code("VIII.9"),
            name: "Пристройка".to_string(),
            pricing: per_m2(dec!(5), dec!(600), Some(dec!(500))),
        };

        assert!(matches!(
            ConstructionTypeTable::new(vec![ty]),
            Err(ConstructionTableError::InvalidRow { .. })
        ));
    }

    #[test]
    fn new_rejects_empty_table() {
        assert_eq!(ConstructionTypeTable::new(vec![]), Err(ConstructionTableError::Empty));
    }
}
