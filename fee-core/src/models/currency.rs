//! Currencies, the fixed exchange rate and tagged money amounts.
//!
//! Price tables are quoted in their own native currency: the architectural
//! tables in Bulgarian lev, the structural tables in euro. Every
//! [`CalculationResult`](crate::calculations::CalculationResult) total is
//! expressed in [`CANONICAL_CURRENCY`]; conversion for display happens outside
//! the engine.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::format_amount;

/// Fixed BGN per EUR rate.
pub const EURO_RATE: Decimal = dec!(1.95583);

/// Currency in which calculation totals are reported.
pub const CANONICAL_CURRENCY: Currency = Currency::Eur;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Eur,
    Bgn,
}

impl Currency {
    /// Marker printed after an amount, e.g. `12.00 €` or `12.00 лв.`.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eur => "€",
            Self::Bgn => "лв.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eur => "eur",
            Self::Bgn => "bgn",
        }
    }
}

/// Converts `amount` from one currency to another at [`EURO_RATE`].
///
/// No rounding is applied; callers round when formatting.
pub fn convert(
    amount: Decimal,
    from: Currency,
    to: Currency,
) -> Decimal {
    match (from, to) {
        (Currency::Bgn, Currency::Eur) => amount / EURO_RATE,
        (Currency::Eur, Currency::Bgn) => amount * EURO_RATE,
        _ => amount,
    }
}

/// Converts `amount` into [`CANONICAL_CURRENCY`].
pub fn to_canonical(
    amount: Decimal,
    from: Currency,
) -> Decimal {
    convert(amount, from, CANONICAL_CURRENCY)
}

/// Currency display preference carried on every form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyDisplay {
    #[default]
    Eur,
    Bgn,
    Both,
}

impl CurrencyDisplay {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eur => "eur",
            Self::Bgn => "bgn",
            Self::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eur" => Some(Self::Eur),
            "bgn" => Some(Self::Bgn),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// An amount tagged with the currency it is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(
        amount: Decimal,
        currency: Currency,
    ) -> Self {
        Self { amount, currency }
    }

    pub fn eur(amount: Decimal) -> Self {
        Self::new(amount, Currency::Eur)
    }

    pub fn bgn(amount: Decimal) -> Self {
        Self::new(amount, Currency::Bgn)
    }

    /// The same value expressed in `currency`.
    pub fn in_currency(
        &self,
        currency: Currency,
    ) -> Money {
        Money::new(convert(self.amount, self.currency, currency), currency)
    }
}

impl fmt::Display for Money {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} {}", format_amount(self.amount), self.currency.symbol())
    }
}
