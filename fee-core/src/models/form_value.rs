//! Lenient decoding of raw form values and the boundary validation error.
//!
//! Saved forms come from a browser form, older exports and hand-written
//! files, so numbers may arrive as JSON numbers, numeric strings with comma
//! thousands separators, or `null`. Selector codes may be strings or numbers.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::currency::CurrencyDisplay;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Raised by the single validation step that turns a raw form into tagged
/// inputs. A form that fails here is structurally invalid, not incomplete.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown {field} code '{code}'")]
    UnknownCode { field: &'static str, code: String },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} must be a whole number, got {value}")]
    NotWhole { field: &'static str, value: Decimal },
}

impl FormError {
    /// Unknown codes and fractional counts make only their own section
    /// unusable. A negative magnitude rejects the whole form.
    pub fn is_section_local(&self) -> bool {
        !matches!(self, Self::Negative { .. })
    }
}

/// Validated inputs of one toggleable section. Fields of a disabled section
/// are never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionInput<T> {
    Disabled,
    /// Toggled on, but a selector or count could not be used.
    Rejected(FormError),
    Included(T),
}

impl<T> SectionInput<T> {
    /// Runs `build` only when the section is toggled on.
    ///
    /// Section-local failures become [`SectionInput::Rejected`]; anything
    /// else is returned as the form's error.
    pub(crate) fn validate(
        enabled: bool,
        build: impl FnOnce() -> Result<T, FormError>,
    ) -> Result<Self, FormError> {
        if !enabled {
            return Ok(Self::Disabled);
        }
        match build() {
            Ok(input) => Ok(Self::Included(input)),
            Err(err) if err.is_section_local() => Ok(Self::Rejected(err)),
            Err(err) => Err(err),
        }
    }
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::warn!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Deserializes a number, numeric string or `null` (zero) into a [`Decimal`].
pub(crate) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        None => Ok(Decimal::ZERO),
        Some(RawNumber::Int(i)) => Ok(Decimal::from(i)),
        // The shortest round-trip text keeps 0.1 as 0.1 rather than its binary expansion.
        Some(RawNumber::Float(f)) => parse_decimal(&f.to_string()).map_err(serde::de::Error::custom),
        Some(RawNumber::Text(s)) => parse_decimal(&s).map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Deserializes a selector code given as string or number. `null` becomes
/// the unset sentinel `"0"`.
pub(crate) fn lenient_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCode>::deserialize(deserializer)? {
        None => "0".to_string(),
        Some(RawCode::Int(i)) => i.to_string(),
        Some(RawCode::Float(f)) => f.to_string(),
        Some(RawCode::Text(s)) => s.trim().to_string(),
    })
}

/// Deserializes free text. `null` becomes empty and numbers keep their digits.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCode>::deserialize(deserializer)? {
        None => String::new(),
        Some(RawCode::Int(i)) => i.to_string(),
        Some(RawCode::Float(f)) => f.to_string(),
        Some(RawCode::Text(s)) => s,
    })
}

/// Deserializes the display preference. `null` and unknown values fall back
/// to the default.
pub(crate) fn lenient_display<'de, D>(deserializer: D) -> Result<CurrencyDisplay, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .and_then(|s| CurrencyDisplay::parse(&s))
        .unwrap_or_default())
}

/// Deserializes a flag that older files sometimes stored as `0`/`1` or `null`.
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBool {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<RawBool>::deserialize(deserializer)? {
        None => false,
        Some(RawBool::Bool(b)) => b,
        Some(RawBool::Int(i)) => i != 0,
        Some(RawBool::Text(s)) => matches!(s.trim(), "true" | "1"),
    })
}

/// True for the selector sentinel meaning "nothing chosen".
pub(crate) fn is_unset(code: &str) -> bool {
    code.is_empty() || code == "0"
}

/// Rejects negative magnitudes.
pub(crate) fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, FormError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FormError::Negative { field, value });
    }
    Ok(value)
}

/// Converts a non-negative whole-number magnitude into a count.
pub(crate) fn whole_count(
    field: &'static str,
    value: Decimal,
) -> Result<u32, FormError> {
    let value = non_negative(field, value)?;
    if !value.fract().is_zero() {
        return Err(FormError::NotWhole { field, value });
    }
    value.to_u32().ok_or(FormError::NotWhole { field, value })
}
