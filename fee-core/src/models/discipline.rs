use serde::{Deserialize, Serialize};

/// Design discipline a form, project or calculation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Structural,
    Architectural,
}

impl Discipline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Architectural => "architectural",
        }
    }

    /// Accepts the stored tag as well as the short CLI forms.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structural" | "struct" => Some(Self::Structural),
            "architectural" | "arch" => Some(Self::Architectural),
            _ => None,
        }
    }

    /// Storage namespace used to keep the two workspaces apart.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Structural => "struct",
            Self::Architectural => "arch",
        }
    }

    /// Prefix of generated project names.
    pub fn project_prefix(&self) -> &'static str {
        match self {
            Self::Structural => "СК Проект",
            Self::Architectural => "АРХ Проект",
        }
    }
}
