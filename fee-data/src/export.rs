//! Workspace and plain-text exports.

use chrono::{DateTime, Utc};
use fee_core::calculations::CalculationResult;
use fee_core::{CurrencyDisplay, SavedProject};
use serde::{Deserialize, Serialize};

use crate::report::Report;

/// A whole workspace as written to disk. Re-importable through
/// [`crate::import::parse_projects`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceExport {
    pub workspace_name: String,
    pub exported_at: DateTime<Utc>,
    pub projects: Vec<SavedProject>,
}

impl WorkspaceExport {
    pub fn new(
        workspace_name: impl Into<String>,
        projects: Vec<SavedProject>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            workspace_name: workspace_name.into(),
            exported_at: now,
            projects,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Suggested file name for a workspace export, e.g. `Офис_workspace.json`.
pub fn workspace_file_name(workspace_name: &str) -> String {
    match workspace_name.trim() {
        "" => "workspace.json".to_string(),
        name => format!("{}_workspace.json", sanitize_file_stem(name)),
    }
}

/// The calculation as a plain-text offer, amounts in `display`.
pub fn export_txt(
    result: &CalculationResult,
    object_name: &str,
    display: CurrencyDisplay,
) -> String {
    Report::new(result, object_name, display).to_string()
}

/// Suggested file name for a text export: the object name, or `offer`.
pub fn txt_file_name(object_name: &str) -> String {
    match object_name.trim() {
        "" => "offer.txt".to_string(),
        name => format!("{}.txt", sanitize_file_stem(name)),
    }
}

fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}
