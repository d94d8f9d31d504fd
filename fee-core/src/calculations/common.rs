//! Common helpers for fee calculations.
//!
//! Amounts keep full precision through a calculation. Rounding happens only
//! when an amount is turned into text.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fee_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount with exactly two decimal places, e.g. `11736.00`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fee_core::calculations::common::format_amount;
///
/// assert_eq!(format_amount(dec!(1466.87)), "1466.87");
/// assert_eq!(format_amount(dec!(2.5)), "2.50");
/// assert_eq!(format_amount(dec!(0.125)), "0.13");
/// ```
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_half_up(value))
}

/// Formats a user-entered magnitude (area, hours, percent) without trailing
/// zeros, so `600.00` prints as `600` and `12.50` as `12.5`.
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Formats a percentage with an explicit sign for positive values: `+10`, `-5`.
pub fn format_signed_percent(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", format_quantity(value))
    } else {
        format_quantity(value)
    }
}
