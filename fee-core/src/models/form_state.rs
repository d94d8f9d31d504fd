use serde_json::Value;

use super::arch_form::ArchFormState;
use super::currency::CurrencyDisplay;
use super::discipline::Discipline;
use super::structural_form::StructuralFormState;

/// A raw form of either discipline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Structural(StructuralFormState),
    Architectural(ArchFormState),
}

impl FormState {
    /// The discipline's initial state.
    pub fn initial(discipline: Discipline) -> Self {
        match discipline {
            Discipline::Structural => Self::Structural(StructuralFormState::default()),
            Discipline::Architectural => Self::Architectural(ArchFormState::default()),
        }
    }

    /// Decodes a camelCase JSON form. Missing fields take initial-state defaults.
    pub fn from_value(
        discipline: Discipline,
        value: Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match discipline {
            Discipline::Structural => Self::Structural(serde_json::from_value(value)?),
            Discipline::Architectural => Self::Architectural(serde_json::from_value(value)?),
        })
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Structural(form) => serde_json::to_value(form),
            Self::Architectural(form) => serde_json::to_value(form),
        }
    }

    pub fn discipline(&self) -> Discipline {
        match self {
            Self::Structural(_) => Discipline::Structural,
            Self::Architectural(_) => Discipline::Architectural,
        }
    }

    pub fn object_name(&self) -> &str {
        match self {
            Self::Structural(form) => &form.object_name,
            Self::Architectural(form) => &form.object_name,
        }
    }

    pub fn set_object_name(
        &mut self,
        name: impl Into<String>,
    ) {
        let name = name.into();
        match self {
            Self::Structural(form) => form.object_name = name,
            Self::Architectural(form) => form.object_name = name,
        }
    }

    pub fn currency_display(&self) -> CurrencyDisplay {
        match self {
            Self::Structural(form) => form.currency_display,
            Self::Architectural(form) => form.currency_display,
        }
    }

    /// Resets every field to the initial state while keeping the object name.
    pub fn cleared(&self) -> Self {
        let mut fresh = Self::initial(self.discipline());
        fresh.set_object_name(self.object_name());
        fresh
    }
}
