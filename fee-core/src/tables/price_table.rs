//! Tiered price tables.
//!
//! A category charges a flat minimum fee while the quantity is at or below its
//! threshold. Above the threshold the first tier whose upper bound is not
//! exceeded supplies a rate, which is multiplied by the quantity. Each table
//! has `N` parallel columns (design phases, plot-area brackets).

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Currency;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceTableError {
    #[error("quantity must not be negative, got {0}")]
    NegativeQuantity(Decimal),

    #[error("column {column} is out of range for a table with {columns} columns")]
    ColumnOutOfRange { column: usize, columns: usize },

    #[error("no category '{0}' in price table")]
    UnknownCategory(String),

    #[error("category '{category}' has no tiers")]
    NoTiers { category: String },

    #[error("category '{category}': tier {index} bound is not above the previous bound")]
    BoundsNotAscending { category: String, index: usize },

    #[error("category '{category}': only the last tier may be unbounded")]
    MisplacedFallback { category: String },

    #[error("category '{category}' has no unbounded fallback tier")]
    MissingFallback { category: String },
}

/// One rate bracket: applies while `quantity <= up_to`; `None` is the
/// unbounded fallback and must come last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTier<const N: usize> {
    pub up_to: Option<Decimal>,
    pub rates: [Decimal; N],
}

impl<const N: usize> RateTier<N> {
    pub fn up_to(
        bound: Decimal,
        rates: [Decimal; N],
    ) -> Self {
        Self {
            up_to: Some(bound),
            rates,
        }
    }

    pub fn unbounded(rates: [Decimal; N]) -> Self {
        Self { up_to: None, rates }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCategory<const N: usize> {
    /// Quantities at or below this value pay the flat minimum fee.
    pub min_threshold: Decimal,
    pub min_fees: [Decimal; N],
    pub tiers: Vec<RateTier<N>>,
}

/// Outcome of a table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub amount: Decimal,
    pub is_flat_fee: bool,
    /// The per-unit rate, or the flat fee itself when `is_flat_fee`.
    pub rate_used: Decimal,
}

impl<const N: usize> PriceCategory<N> {
    /// Resolves `quantity` against column `column`.
    ///
    /// Bound equality belongs to the lower bracket.
    pub fn resolve(
        &self,
        quantity: Decimal,
        column: usize,
    ) -> Result<Resolution, PriceTableError> {
        if column >= N {
            return Err(PriceTableError::ColumnOutOfRange { column, columns: N });
        }
        if quantity.is_sign_negative() && !quantity.is_zero() {
            return Err(PriceTableError::NegativeQuantity(quantity));
        }

        if quantity <= self.min_threshold {
            let fee = self.min_fees[column];
            return Ok(Resolution {
                amount: fee,
                is_flat_fee: true,
                rate_used: fee,
            });
        }

        let tier = self
            .tiers
            .iter()
            .find(|tier| tier.up_to.is_none_or(|bound| quantity <= bound))
            .ok_or_else(|| PriceTableError::MissingFallback {
                category: String::new(),
            })?;
        let rate = tier.rates[column];

        Ok(Resolution {
            amount: rate * quantity,
            is_flat_fee: false,
            rate_used: rate,
        })
    }

    /// Checks that bounds ascend strictly and end in a single unbounded tier.
    pub fn validate(
        &self,
        category: &str,
    ) -> Result<(), PriceTableError> {
        let category = category.to_string();
        let Some((last, bounded)) = self.tiers.split_last() else {
            return Err(PriceTableError::NoTiers { category });
        };
        if last.up_to.is_some() {
            return Err(PriceTableError::MissingFallback { category });
        }

        let mut previous = self.min_threshold;
        for (index, tier) in bounded.iter().enumerate() {
            let Some(bound) = tier.up_to else {
                return Err(PriceTableError::MisplacedFallback { category });
            };
            if bound <= previous {
                return Err(PriceTableError::BoundsNotAscending { category, index });
            }
            previous = bound;
        }
        Ok(())
    }
}

/// A table of categories keyed by `K`, quoted in a single native currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTable<K, const N: usize> {
    pub title: &'static str,
    pub currency: Currency,
    pub unit: &'static str,
    pub column_labels: [&'static str; N],
    categories: Vec<(K, PriceCategory<N>)>,
}

impl<K, const N: usize> PriceTable<K, N>
where
    K: Copy + Eq + fmt::Debug,
{
    pub fn new(
        title: &'static str,
        currency: Currency,
        unit: &'static str,
        column_labels: [&'static str; N],
        categories: Vec<(K, PriceCategory<N>)>,
    ) -> Self {
        Self {
            title,
            currency,
            unit,
            column_labels,
            categories,
        }
    }

    pub fn category(
        &self,
        key: K,
    ) -> Option<&PriceCategory<N>> {
        self.categories
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, category)| category)
    }

    pub fn categories(&self) -> impl Iterator<Item = (K, &PriceCategory<N>)> {
        self.categories.iter().map(|(k, category)| (*k, category))
    }

    pub fn resolve(
        &self,
        key: K,
        quantity: Decimal,
        column: usize,
    ) -> Result<Resolution, PriceTableError> {
        let category = self
            .category(key)
            .ok_or_else(|| PriceTableError::UnknownCategory(format!("{key:?}")))?;
        category.resolve(quantity, column).map_err(|e| match e {
            PriceTableError::MissingFallback { .. } => PriceTableError::MissingFallback {
                category: format!("{key:?}"),
            },
            other => other,
        })
    }

    /// Validates every category.
    pub fn validate(&self) -> Result<(), PriceTableError> {
        self.categories
            .iter()
            .try_for_each(|(key, category)| category.validate(&format!("{key:?}")))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn category() -> PriceCategory<2> {
        PriceCategory {
            min_threshold: dec!(100),
            min_fees: [dec!(300), dec!(600)],
            tiers: vec![
                RateTier::up_to(dec!(200), [dec!(3.00), dec!(6.00)]),
                RateTier::up_to(dec!(500), [dec!(2.00), dec!(4.00)]),
                RateTier::unbounded([dec!(1.00), dec!(2.00)]),
            ],
        }
    }

    #[test]
    fn quantity_at_threshold_pays_flat_fee() {
        let resolution = category().resolve(dec!(100), 1).unwrap();

        assert_eq!(
            resolution,
            Resolution {
                amount: dec!(600),
                is_flat_fee: true,
                rate_used: dec!(600),
            }
        );
    }

    #[test]
    fn quantity_on_bound_uses_lower_tier() {
        let resolution = category().resolve(dec!(200), 0).unwrap();

        assert_eq!(resolution.rate_used, dec!(3.00));
        assert_eq!(resolution.amount, dec!(600.00));
        assert!(!resolution.is_flat_fee);
    }

    #[test]
    fn quantity_just_above_bound_uses_next_tier() {
        let resolution = category().resolve(dec!(201), 0).unwrap();

        assert_eq!(resolution.rate_used, dec!(2.00));
        assert_eq!(resolution.amount, dec!(402.00));
    }

    #[test]
    fn quantity_beyond_last_bound_uses_fallback() {
        let resolution = category().resolve(dec!(10000), 1).unwrap();

        assert_eq!(resolution.rate_used, dec!(2.00));
        assert_eq!(resolution.amount, dec!(20000.00));
    }

    #[test]
    fn zero_quantity_is_below_threshold() {
        assert!(category().resolve(Decimal::ZERO, 0).unwrap().is_flat_fee);
    }

    #[test]
    fn negative_quantity_is_an_error() {
        assert_eq!(
            category().resolve(dec!(-1), 0),
            Err(PriceTableError::NegativeQuantity(dec!(-1)))
        );
    }

    #[test]
    fn column_out_of_range_is_an_error() {
        assert_eq!(
            category().resolve(dec!(150), 2),
            Err(PriceTableError::ColumnOutOfRange {
                column: 2,
                columns: 2
            })
        );
    }

    #[test]
    fn validate_accepts_well_formed_category() {
        assert_eq!(category().validate("test"), Ok(()));
    }

    #[test]
    fn validate_rejects_descending_bounds() {
        let mut category = category();
        category.tiers.swap(0, 1);

        assert_eq!(
            category.validate("test"),
            Err(PriceTableError::BoundsNotAscending {
                category: "test".to_string(),
                index: 1
            })
        );
    }

    #[test]
    fn validate_rejects_bound_below_threshold() {
        let mut category = category();
        category.tiers[0].up_to = Some(dec!(50));

        assert!(matches!(
            category.validate("test"),
            Err(PriceTableError::BoundsNotAscending { index: 0, .. })
        ));
    }

    #[test]
    fn validate_requires_fallback_last() {
        let mut category = category();
        category.tiers.pop();

        assert!(matches!(
            category.validate("test"),
            Err(PriceTableError::MissingFallback { .. })
        ));
    }

    #[test]
    fn table_reports_unknown_category() {
        let table: PriceTable<u8, 2> = PriceTable::new(
            "test",
            Currency::Bgn,
            "м²",
            ["a", "b"],
            vec![(1, category())],
        );

        assert!(table.resolve(1, dec!(150), 0).is_ok());
        assert_eq!(
            table.resolve(2, dec!(150), 0),
            Err(PriceTableError::UnknownCategory("2".to_string()))
        );
    }
}
