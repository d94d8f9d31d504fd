//! Architectural form: the raw record the form UI edits, the tagged selector
//! enums, and the validated [`ArchInputs`] the engine consumes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::currency::CurrencyDisplay;
use super::form_value::{
    FormError, SectionInput, is_unset, lenient_bool, lenient_code, lenient_decimal,
    lenient_display, lenient_text, non_negative, parse_decimal, whole_count,
};

/// Raw architectural form as stored and exchanged (camelCase JSON).
///
/// Missing fields take the values of [`ArchFormState::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArchFormState {
    #[serde(deserialize_with = "lenient_text")]
    pub object_name: String,
    #[serde(deserialize_with = "lenient_display")]
    pub currency_display: CurrencyDisplay,

    #[serde(deserialize_with = "lenient_bool")]
    pub toggle_new_buildings: bool,
    #[serde(deserialize_with = "lenient_code")]
    pub building_type: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub area: Decimal,
    #[serde(deserialize_with = "lenient_code")]
    pub phase: String,

    #[serde(deserialize_with = "lenient_bool")]
    pub toggle_development_plans: bool,
    #[serde(deserialize_with = "lenient_code")]
    pub plan_type: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub plot_count: Decimal,
    #[serde(deserialize_with = "lenient_code")]
    pub plot_area: String,

    #[serde(deserialize_with = "lenient_bool")]
    pub toggle_hourly_rate: bool,
    /// The selector's value is the hourly rate itself, e.g. `"162.50"`.
    #[serde(deserialize_with = "lenient_code")]
    pub designer_type: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub hours: Decimal,

    #[serde(deserialize_with = "lenient_decimal")]
    pub difficulty_percent: Decimal,
    #[serde(deserialize_with = "lenient_text")]
    pub difficulty_notes: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub coef_variant: bool,
    #[serde(deserialize_with = "lenient_decimal")]
    pub repetitions: Decimal,
    #[serde(deserialize_with = "lenient_bool")]
    pub coef_reconstruction_existing: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub coef_reconstruction_missing: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub coef_accelerated: bool,
}

impl Default for ArchFormState {
    fn default() -> Self {
        Self {
            object_name: String::new(),
            currency_display: CurrencyDisplay::default(),
            toggle_new_buildings: true,
            building_type: "0".to_string(),
            area: Decimal::ZERO,
            phase: "0".to_string(),
            toggle_development_plans: false,
            plan_type: "0".to_string(),
            plot_count: Decimal::ZERO,
            plot_area: "0".to_string(),
            toggle_hourly_rate: false,
            designer_type: "0".to_string(),
            hours: Decimal::ZERO,
            difficulty_percent: Decimal::ZERO,
            difficulty_notes: String::new(),
            coef_variant: false,
            repetitions: Decimal::ZERO,
            coef_reconstruction_existing: false,
            coef_reconstruction_missing: false,
            coef_accelerated: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildingType {
    SingleFamily,
    MultiFamily,
    StandardPublic,
    SpecializedPublic,
    Warehouse,
    Industrial,
}

impl BuildingType {
    pub const ALL: [BuildingType; 6] = [
        Self::SingleFamily,
        Self::MultiFamily,
        Self::StandardPublic,
        Self::SpecializedPublic,
        Self::Warehouse,
        Self::Industrial,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::SingleFamily => "1",
            Self::MultiFamily => "2",
            Self::StandardPublic => "3",
            Self::SpecializedPublic => "4",
            Self::Warehouse => "5",
            Self::Industrial => "6",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SingleFamily => "Еднофамилна, Двуфамилна жилищна, Вилна сграда",
            Self::MultiFamily => "Многофамилна жилищна сграда",
            Self::StandardPublic => "ОСД, Офиси, Стандартна обществена сграда",
            Self::SpecializedPublic => "Специализирана обществена сграда",
            Self::Warehouse => "Навес, Склад, Едно-пространствена сграда без МТ",
            Self::Industrial => "Промишлена, Селскостопанска сграда",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesignPhase {
    Preliminary,
    Conceptual,
    Technical,
    Working,
}

impl DesignPhase {
    pub const ALL: [DesignPhase; 4] = [
        Self::Preliminary,
        Self::Conceptual,
        Self::Technical,
        Self::Working,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Preliminary => "1",
            Self::Conceptual => "2",
            Self::Technical => "3",
            Self::Working => "4",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Column of this phase in the new-buildings table.
    pub fn column(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Preliminary => "Предпроектно проучване",
            Self::Conceptual => "Идеен проект",
            Self::Technical => "Технически проект",
            Self::Working => "Работен проект",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanType {
    Building,
    RegulationAndBuilding,
    WorkingDevelopment,
}

impl PlanType {
    pub const ALL: [PlanType; 3] = [
        Self::Building,
        Self::RegulationAndBuilding,
        Self::WorkingDevelopment,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Building => "1",
            Self::RegulationAndBuilding => "2",
            Self::WorkingDevelopment => "3",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Building => "План за застрояване",
            Self::RegulationAndBuilding => "План за регулация и застрояване",
            Self::WorkingDevelopment => "Работен устройствен план",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotArea {
    UpToOneDecare,
    OneToFiveDecares,
    FiveToTenDecares,
    OverTenDecares,
}

impl PlotArea {
    pub const ALL: [PlotArea; 4] = [
        Self::UpToOneDecare,
        Self::OneToFiveDecares,
        Self::FiveToTenDecares,
        Self::OverTenDecares,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::UpToOneDecare => "1",
            Self::OneToFiveDecares => "2",
            Self::FiveToTenDecares => "3",
            Self::OverTenDecares => "4",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Column of this bracket in the development-plans table.
    pub fn column(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UpToOneDecare => "≤ 1 дка",
            Self::OneToFiveDecares => "1 - 5 дка",
            Self::FiveToTenDecares => "5 - 10 дка",
            Self::OverTenDecares => "> 10 дка",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesignerType {
    FullCompetence,
    LimitedCompetence,
    TechnicalAssistant,
}

impl DesignerType {
    pub const ALL: [DesignerType; 3] = [
        Self::FullCompetence,
        Self::LimitedCompetence,
        Self::TechnicalAssistant,
    ];

    /// Hourly rate in BGN. The form uses this value as the selector code.
    pub fn hourly_rate(&self) -> Decimal {
        match self {
            Self::FullCompetence => dec!(200.00),
            Self::LimitedCompetence => dec!(162.50),
            Self::TechnicalAssistant => dec!(100.00),
        }
    }

    /// Matches the selector value numerically, so `"200"` and `"200.00"` agree.
    pub fn from_code(code: &str) -> Option<Self> {
        let rate = parse_decimal(code).ok()?;
        Self::ALL.into_iter().find(|d| d.hourly_rate() == rate)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FullCompetence => "С пълна правоспособност",
            Self::LimitedCompetence => "С ограничена правоспособност",
            Self::TechnicalAssistant => "За технически сътрудник",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBuildingInput {
    pub building_type: Option<BuildingType>,
    pub area: Decimal,
    pub phase: Option<DesignPhase>,
    pub coefficients: ArchCoefficientInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevelopmentPlanInput {
    pub plan_type: Option<PlanType>,
    pub plot_count: u32,
    pub plot_area: Option<PlotArea>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyInput {
    pub designer: Option<DesignerType>,
    pub hours: Decimal,
}

/// Adjustments that modify the new-buildings subtotal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchCoefficientInput {
    /// Signed percentage, e.g. `10` or `-5`.
    pub difficulty_percent: Decimal,
    pub difficulty_notes: Option<String>,
    pub variant: bool,
    /// Total number of repetitions including the original unit.
    pub repetitions: u32,
    pub reconstruction_existing: bool,
    pub reconstruction_missing: bool,
    pub accelerated: bool,
}

/// Validated architectural inputs. Unset selectors are `None`; nothing here
/// carries a sentinel code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchInputs {
    pub new_buildings: SectionInput<NewBuildingInput>,
    pub development_plans: SectionInput<DevelopmentPlanInput>,
    pub hourly: SectionInput<HourlyInput>,
}

fn selector<T>(
    field: &'static str,
    code: &str,
    lookup: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, FormError> {
    if is_unset(code) {
        return Ok(None);
    }
    lookup(code).map(Some).ok_or_else(|| FormError::UnknownCode {
        field,
        code: code.to_string(),
    })
}

// Magnitudes are checked before selectors so a negative value always
// rejects the form, whatever else is wrong with the section.

fn new_building(form: &ArchFormState) -> Result<NewBuildingInput, FormError> {
    let area = non_negative("area", form.area)?;
    let repetitions = non_negative("repetitions", form.repetitions)?;
    let notes = form.difficulty_notes.trim();

    Ok(NewBuildingInput {
        building_type: selector("buildingType", &form.building_type, BuildingType::from_code)?,
        area,
        phase: selector("phase", &form.phase, DesignPhase::from_code)?,
        coefficients: ArchCoefficientInput {
            difficulty_percent: form.difficulty_percent,
            difficulty_notes: (!notes.is_empty()).then(|| notes.to_string()),
            variant: form.coef_variant,
            repetitions: whole_count("repetitions", repetitions)?,
            reconstruction_existing: form.coef_reconstruction_existing,
            reconstruction_missing: form.coef_reconstruction_missing,
            accelerated: form.coef_accelerated,
        },
    })
}

fn development_plan(form: &ArchFormState) -> Result<DevelopmentPlanInput, FormError> {
    let plot_count = non_negative("plotCount", form.plot_count)?;

    Ok(DevelopmentPlanInput {
        plan_type: selector("planType", &form.plan_type, PlanType::from_code)?,
        plot_count: whole_count("plotCount", plot_count)?,
        plot_area: selector("plotArea", &form.plot_area, PlotArea::from_code)?,
    })
}

fn hourly(form: &ArchFormState) -> Result<HourlyInput, FormError> {
    let hours = non_negative("hours", form.hours)?;
    let designer = if parse_decimal(&form.designer_type).is_ok_and(|rate| rate.is_zero()) {
        None
    } else {
        selector("designerType", &form.designer_type, DesignerType::from_code)?
    };

    Ok(HourlyInput { designer, hours })
}

impl ArchInputs {
    /// Converts the raw form into tagged inputs. Only toggled sections are
    /// read.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] for a negative magnitude in a toggled section.
    /// Unknown codes and fractional counts reject only their own section.
    pub fn from_form(form: &ArchFormState) -> Result<Self, FormError> {
        Ok(Self {
            new_buildings: SectionInput::validate(form.toggle_new_buildings, || new_building(form))?,
            development_plans: SectionInput::validate(form.toggle_development_plans, || {
                development_plan(form)
            })?,
            hourly: SectionInput::validate(form.toggle_hourly_rate, || hourly(form))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn included<T: std::fmt::Debug>(input: SectionInput<T>) -> T {
        match input {
            SectionInput::Included(input) => input,
            other => panic!("section not included: {other:?}"),
        }
    }

    #[test]
    fn default_form_validates_to_unset_selectors() {
        let inputs = ArchInputs::from_form(&ArchFormState::default()).unwrap();
        let new_buildings = included(inputs.new_buildings);

        assert_eq!(new_buildings.building_type, None);
        assert_eq!(new_buildings.phase, None);
        assert_eq!(inputs.development_plans, SectionInput::Disabled);
        assert_eq!(inputs.hourly, SectionInput::Disabled);
    }

    #[test]
    fn from_form_maps_codes_to_enums() {
        let form = ArchFormState {
            building_type: "2".to_string(),
            area: dec!(600),
            phase: "3".to_string(),
            toggle_development_plans: true,
            plan_type: "1".to_string(),
            plot_count: dec!(3),
            plot_area: "4".to_string(),
            toggle_hourly_rate: true,
            designer_type: "162.50".to_string(),
            ..Default::default()
        };

        let inputs = ArchInputs::from_form(&form).unwrap();
        let new_buildings = included(inputs.new_buildings);
        let plans = included(inputs.development_plans);

        assert_eq!(new_buildings.building_type, Some(BuildingType::MultiFamily));
        assert_eq!(new_buildings.phase, Some(DesignPhase::Technical));
        assert_eq!(plans.plan_type, Some(PlanType::Building));
        assert_eq!(plans.plot_count, 3);
        assert_eq!(plans.plot_area, Some(PlotArea::OverTenDecares));
        assert_eq!(included(inputs.hourly).designer, Some(DesignerType::LimitedCompetence));
    }

    #[test]
    fn disabled_sections_are_not_read() {
        let form = ArchFormState {
            plan_type: "7".to_string(),
            plot_count: dec!(2.5),
            hours: dec!(-3),
            ..Default::default()
        };

        let inputs = ArchInputs::from_form(&form).unwrap();

        assert_eq!(inputs.development_plans, SectionInput::Disabled);
        assert_eq!(inputs.hourly, SectionInput::Disabled);
    }

    #[test]
    fn designer_rate_matches_numerically() {
        assert_eq!(DesignerType::from_code("200"), Some(DesignerType::FullCompetence));
        assert_eq!(DesignerType::from_code("0.00"), None);
    }

    #[test]
    fn zero_rate_designer_is_unset() {
        let form = ArchFormState {
            toggle_hourly_rate: true,
            designer_type: "0.00".to_string(),
            ..Default::default()
        };

        assert_eq!(included(ArchInputs::from_form(&form).unwrap().hourly).designer, None);
    }

    #[test]
    fn unknown_building_type_rejects_its_section() {
        let form = ArchFormState {
            building_type: "9".to_string(),
            ..Default::default()
        };

        assert_eq!(
            ArchInputs::from_form(&form).unwrap().new_buildings,
            SectionInput::Rejected(FormError::UnknownCode {
                field: "buildingType",
                code: "9".to_string()
            })
        );
    }

    #[test]
    fn fractional_plot_count_rejects_development_plans() {
        let form = ArchFormState {
            toggle_development_plans: true,
            plan_type: "1".to_string(),
            plot_count: dec!(2.5),
            plot_area: "1".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            ArchInputs::from_form(&form).unwrap().development_plans,
            SectionInput::Rejected(FormError::NotWhole { field: "plotCount", .. })
        ));
    }

    #[test]
    fn negative_area_is_a_form_error() {
        let form = ArchFormState {
            building_type: "9".to_string(),
            area: dec!(-10),
            ..Default::default()
        };

        assert!(matches!(
            ArchInputs::from_form(&form),
            Err(FormError::Negative { field: "area", .. })
        ));
    }

    #[test]
    fn blank_difficulty_notes_are_dropped() {
        let form = ArchFormState {
            difficulty_notes: "   ".to_string(),
            ..Default::default()
        };

        assert_eq!(
            included(ArchInputs::from_form(&form).unwrap().new_buildings)
                .coefficients
                .difficulty_notes,
            None
        );
    }

    #[test]
    fn null_text_fields_decode_as_empty() {
        let form: ArchFormState =
            serde_json::from_str(r#"{"objectName": null, "difficultyNotes": null}"#).unwrap();

        assert_eq!(form.object_name, "");
        assert_eq!(form.difficulty_notes, "");
    }

    #[test]
    fn raw_form_deserializes_from_camel_case_json() {
        let form: ArchFormState = serde_json::from_str(
            r#"{"toggleNewBuildings": true, "buildingType": "2", "area": 600, "phase": 3, "currencyDisplay": "both"}"#,
        )
        .unwrap();

        assert_eq!(form.building_type, "2");
        assert_eq!(form.area, dec!(600));
        assert_eq!(form.phase, "3");
        assert_eq!(form.currency_display, CurrencyDisplay::Both);
        assert_eq!(form.plan_type, "0");
    }
}
