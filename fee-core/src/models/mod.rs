mod arch_form;
mod currency;
mod discipline;
mod form_state;
mod form_value;
mod project;
mod structural_form;

pub use arch_form::{
    ArchCoefficientInput, ArchFormState, ArchInputs, BuildingType, DesignPhase, DesignerType,
    DevelopmentPlanInput, HourlyInput, NewBuildingInput, PlanType, PlotArea,
};
pub use currency::{
    CANONICAL_CURRENCY, Currency, CurrencyDisplay, EURO_RATE, Money, convert, to_canonical,
};
pub use discipline::Discipline;
pub use form_state::FormState;
pub use form_value::{FormError, ParseDecimalError, SectionInput, parse_decimal};
pub(crate) use form_value::{non_negative, whole_count};
pub use project::{ProjectError, SavedProject, default_project_name, generate_id};
pub use structural_form::{ConstructionCode, StructuralFormState, StructuralInputs};
