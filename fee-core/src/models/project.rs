use chrono::{DateTime, Local, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::discipline::Discipline;
use super::form_state::FormState;

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project '{id}' holds an unreadable {discipline} form: {source}")]
    InvalidData {
        id: String,
        discipline: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("form could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A named, timestamped form kept in a discipline's workspace.
///
/// `data` stays raw JSON so files written by older versions keep every field
/// they carried; [`SavedProject::form_state`] decodes it on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProject {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    #[serde(rename = "type")]
    pub discipline: Discipline,
    pub data: Value,
    #[serde(default)]
    pub is_archived: bool,
}

impl SavedProject {
    /// Creates a new project from `form`, naming it after the object name or,
    /// when blank, after the discipline and the current time.
    pub fn from_form(
        form: &FormState,
        now: DateTime<Utc>,
    ) -> Result<Self, ProjectError> {
        let discipline = form.discipline();
        let (name, data) = named_data(form, now)?;
        Ok(Self {
            id: generate_id(now),
            name,
            last_modified: now.timestamp_millis(),
            discipline,
            data,
            is_archived: false,
        })
    }

    /// Replaces the stored form, keeping the id and archived flag.
    pub fn update_from_form(
        &mut self,
        form: &FormState,
        now: DateTime<Utc>,
    ) -> Result<(), ProjectError> {
        let (name, data) = named_data(form, now)?;
        self.name = name;
        self.data = data;
        self.discipline = form.discipline();
        self.last_modified = now.timestamp_millis();
        Ok(())
    }

    pub fn form_state(&self) -> Result<FormState, ProjectError> {
        FormState::from_value(self.discipline, self.data.clone()).map_err(|source| {
            ProjectError::InvalidData {
                id: self.id.clone(),
                discipline: self.discipline.as_str(),
                source,
            }
        })
    }

    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_modified)
    }
}

fn named_data(
    form: &FormState,
    now: DateTime<Utc>,
) -> Result<(String, Value), ProjectError> {
    let name = match form.object_name().trim() {
        "" => default_project_name(form.discipline(), now),
        trimmed => trimmed.to_string(),
    };
    let mut named = form.clone();
    named.set_object_name(name.clone());
    Ok((name, named.to_value()?))
}

/// `"<prefix> <local date and time>"`, e.g. `СК Проект 18.10.2026 г., 14:05:09`.
pub fn default_project_name(
    discipline: Discipline,
    now: DateTime<Utc>,
) -> String {
    let local = now.with_timezone(&Local);
    format!(
        "{} {}",
        discipline.project_prefix(),
        local.format("%d.%m.%Y г., %H:%M:%S")
    )
}

/// Millisecond timestamp followed by nine random base-36 characters.
pub fn generate_id(now: DateTime<Utc>) -> String {
    format!("{}{}", now.timestamp_millis(), random_base36(9))
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36_CHARS[rng.gen_range(0..36)] as char)
        .collect()
}
