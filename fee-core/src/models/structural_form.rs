//! Structural form: raw record and validated inputs.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::CurrencyDisplay;
use super::form_value::{
    FormError, is_unset, lenient_bool, lenient_code, lenient_decimal, lenient_display, lenient_text,
};

const ROMAN: [&str; 11] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI"];

/// Raw structural form as stored and exchanged (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralFormState {
    /// Construction type code such as `"V.1"`; `"0"` when unset.
    #[serde(deserialize_with = "lenient_code")]
    pub project_type: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub area: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub wall_sections: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub additional_length: Decimal,
    #[serde(deserialize_with = "lenient_text")]
    pub object_name: String,
    #[serde(deserialize_with = "lenient_display")]
    pub currency_display: CurrencyDisplay,
    #[serde(deserialize_with = "lenient_bool")]
    pub has_crane: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub has_complexity: bool,
    #[serde(deserialize_with = "lenient_decimal")]
    pub complexity_percentage: Decimal,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_accelerated: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub include_supervision: bool,
}

impl Default for StructuralFormState {
    fn default() -> Self {
        Self {
            project_type: "0".to_string(),
            area: Decimal::ZERO,
            wall_sections: Decimal::ONE,
            additional_length: Decimal::ZERO,
            object_name: String::new(),
            currency_display: CurrencyDisplay::default(),
            has_crane: false,
            has_complexity: false,
            complexity_percentage: Decimal::ZERO,
            is_accelerated: false,
            include_supervision: false,
        }
    }
}

/// A syntactically valid construction type code: roman category, a dot and
/// an item number (`"V.2"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructionCode {
    category: u8,
    code: String,
}

impl ConstructionCode {
    pub fn parse(code: &str) -> Option<Self> {
        let (roman, item) = code.split_once('.')?;
        let category = ROMAN.iter().position(|r| *r == roman)? as u8 + 1;
        if item.is_empty() || !item.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            category,
            code: code.to_string(),
        })
    }

    /// Category number, 1 for `I` through 11 for `XI`.
    pub fn category(&self) -> u8 {
        self.category
    }

    pub fn category_roman(&self) -> &'static str {
        ROMAN[usize::from(self.category - 1)]
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Categories I (small fixed-fee works) and VII (retaining walls) take no
    /// adjustment coefficients.
    pub fn allows_coefficients(&self) -> bool {
        !matches!(self.category, 1 | 7)
    }

    /// Halls in categories V and VI may carry the crane surcharge.
    pub fn crane_eligible(&self) -> bool {
        matches!(self.category, 5 | 6)
    }
}

impl fmt::Display for ConstructionCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Validated structural inputs.
///
/// Which magnitudes matter depends on the pricing kind of the selected type,
/// so they are kept as entered and checked by the calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralInputs {
    pub project_type: Option<ConstructionCode>,
    pub area: Decimal,
    pub wall_sections: Decimal,
    pub additional_length: Decimal,
    pub has_crane: bool,
    /// Complexity surcharge in percent; zero unless the complexity box is ticked.
    pub complexity_percent: Decimal,
    pub accelerated: bool,
    pub supervision: bool,
}

impl StructuralInputs {
    /// Converts the raw form into tagged inputs.
    ///
    /// Whether the code names a row of the active construction type table is
    /// checked by the calculator, which owns the table.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownCode`] for a malformed construction code.
    pub fn from_form(form: &StructuralFormState) -> Result<Self, FormError> {
        let project_type = if is_unset(&form.project_type) {
            None
        } else {
            Some(ConstructionCode::parse(&form.project_type).ok_or_else(|| {
                FormError::UnknownCode {
                    field: "projectType",
                    code: form.project_type.clone(),
                }
            })?)
        };

        Ok(Self {
            project_type,
            area: form.area,
            wall_sections: form.wall_sections,
            additional_length: form.additional_length,
            has_crane: form.has_crane,
            complexity_percent: if form.has_complexity {
                form.complexity_percentage
            } else {
                Decimal::ZERO
            },
            accelerated: form.is_accelerated,
            supervision: form.include_supervision,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn construction_code_parses_roman_category() {
        let code = ConstructionCode::parse("VI.2").unwrap();

        assert_eq!(code.category(), 6);
        assert_eq!(code.category_roman(), "VI");
        assert_eq!(code.as_str(), "VI.2");
    }

    #[test]
    fn construction_code_rejects_malformed_input() {
        assert_eq!(ConstructionCode::parse("XII.1"), None);
        assert_eq!(ConstructionCode::parse("V"), None);
        assert_eq!(ConstructionCode::parse("V."), None);
        assert_eq!(ConstructionCode::parse("V.a"), None);
    }

    #[test]
    fn coefficient_eligibility_follows_category() {
        assert!(!ConstructionCode::parse("I.1").unwrap().allows_coefficients());
        assert!(!ConstructionCode::parse("VII.1").unwrap().allows_coefficients());
        assert!(ConstructionCode::parse("II.1").unwrap().allows_coefficients());
        assert!(ConstructionCode::parse("V.1").unwrap().crane_eligible());
        assert!(!ConstructionCode::parse("IV.1").unwrap().crane_eligible());
    }

    #[test]
    fn complexity_percent_ignored_without_flag() {
        let form = StructuralFormState {
            project_type: "II.1".to_string(),
            complexity_percentage: dec!(15),
            ..Default::default()
        };

        assert_eq!(
            StructuralInputs::from_form(&form).unwrap().complexity_percent,
            Decimal::ZERO
        );
    }

    #[test]
    fn malformed_project_type_is_a_form_error() {
        let form = StructuralFormState {
            project_type: "garage".to_string(),
            ..Default::default()
        };

        assert_eq!(
            StructuralInputs::from_form(&form),
            Err(FormError::UnknownCode {
                field: "projectType",
                code: "garage".to_string()
            })
        );
    }

    #[test]
    fn default_form_has_one_wall_section() {
        let inputs = StructuralInputs::from_form(&StructuralFormState::default()).unwrap();

        assert_eq!(inputs.project_type, None);
        assert_eq!(inputs.wall_sections, Decimal::ONE);
    }

    #[test]
    fn null_object_name_decodes_as_empty() {
        let form: StructuralFormState =
            serde_json::from_str(r#"{"projectType": "II.1", "objectName": null}"#).unwrap();

        assert_eq!(form.object_name, "");
        assert_eq!(form.project_type, "II.1");
    }
}
