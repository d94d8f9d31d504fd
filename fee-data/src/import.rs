//! Normalization of imported project bundles.
//!
//! Accepted shapes, checked in order:
//! 1. an array of entries,
//! 2. an object with a `projects` array (a workspace export),
//! 3. a single entry.
//!
//! An entry carrying a `data` key is a saved-project bundle; anything else is
//! taken as a bare form.

use chrono::{DateTime, Utc};
use fee_core::{Discipline, SavedProject, generate_id};
use serde_json::{Map, Value};
use thiserror::Error;

pub const UNNAMED_PROJECT: &str = "Без име";
pub const IMPORTED_PROJECT: &str = "Импортиран проект";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entry {index} is not an object")]
    NotAnObject { index: usize },

    #[error("'projects' must be an array")]
    ProjectsNotArray,
}

/// Parses `text` into normalized projects, in file order.
///
/// Entries without a usable `type` are assigned to `active`.
pub fn parse_projects(
    text: &str,
    active: Discipline,
    now: DateTime<Utc>,
) -> Result<Vec<SavedProject>, ImportError> {
    let parsed: Value = serde_json::from_str(text)?;
    import_value(&parsed, active, now)
}

pub fn import_value(
    value: &Value,
    active: Discipline,
    now: DateTime<Utc>,
) -> Result<Vec<SavedProject>, ImportError> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) if obj.contains_key("projects") => match &obj["projects"] {
            Value::Array(items) => items.iter().collect(),
            _ => return Err(ImportError::ProjectsNotArray),
        },
        other => vec![other],
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let obj = entry
                .as_object()
                .ok_or(ImportError::NotAnObject { index })?;
            Ok(sanitize(obj, active, now))
        })
        .collect()
}

fn sanitize(
    entry: &Map<String, Value>,
    active: Discipline,
    now: DateTime<Utc>,
) -> SavedProject {
    let data = entry.get("data");
    let id = entry
        .get("id")
        .and_then(id_string)
        .or_else(|| data.and_then(|d| d.get("id")).and_then(id_string))
        .unwrap_or_else(|| generate_id(now));

    let Some(data) = data else {
        return SavedProject {
            id,
            name: non_empty_str(entry.get("objectName"))
                .unwrap_or(IMPORTED_PROJECT)
                .to_string(),
            last_modified: now.timestamp_millis(),
            discipline: active,
            data: Value::Object(entry.clone()),
            is_archived: false,
        };
    };

    let discipline = match entry.get("type").and_then(Value::as_str) {
        Some(tag) => Discipline::parse(tag).unwrap_or_else(|| {
            tracing::warn!(tag, "unknown project type, using the active discipline");
            active
        }),
        None => active,
    };

    SavedProject {
        id,
        name: non_empty_str(entry.get("name"))
            .or_else(|| non_empty_str(data.get("objectName")))
            .unwrap_or(UNNAMED_PROJECT)
            .to_string(),
        last_modified: entry
            .get("lastModified")
            .and_then(millis)
            .unwrap_or_else(|| now.timestamp_millis()),
        discipline,
        data: data.clone(),
        is_archived: entry.get("isArchived").is_some_and(truthy),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Ids may have been written as numbers by older exports.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if truthy(value) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric or numeric-string millisecond timestamp; zero counts as missing.
fn millis(value: &Value) -> Option<i64> {
    let ms = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        _ => None,
    }?;
    (ms != 0).then_some(ms)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn bundle_fields_are_kept() {
        let text = r#"{
            "id": "abc", "name": "Къща Банско", "lastModified": 1700000000000,
            "type": "architectural", "data": { "objectName": "x" }, "isArchived": true
        }"#;

        let projects = parse_projects(text, Discipline::Structural, now()).unwrap();

        assert_eq!(
            projects,
            vec![SavedProject {
                id: "abc".to_string(),
                name: "Къща Банско".to_string(),
                last_modified: 1_700_000_000_000,
                discipline: Discipline::Architectural,
                data: json!({ "objectName": "x" }),
                is_archived: true,
            }]
        );
    }

    #[test]
    fn bundle_falls_back_to_data_fields() {
        let value = json!([{ "data": { "id": 42, "objectName": "Склад" }, "lastModified": "0" }]);

        let p = &import_value(&value, Discipline::Structural, now()).unwrap()[0];

        assert_eq!(p.id, "42");
        assert_eq!(p.name, "Склад");
        assert_eq!(p.last_modified, now().timestamp_millis());
        assert_eq!(p.discipline, Discipline::Structural);
        assert!(!p.is_archived);
    }

    #[test]
    fn bundle_without_any_name_is_unnamed() {
        let value = json!({ "id": "1", "name": "", "data": {} });

        let p = &import_value(&value, Discipline::Architectural, now()).unwrap()[0];

        assert_eq!(p.name, UNNAMED_PROJECT);
    }

    #[test]
    fn bare_form_becomes_active_discipline_project() {
        let value = json!({ "projectType": "II.1", "area": 120, "isArchived": true });

        let p = &import_value(&value, Discipline::Structural, now()).unwrap()[0];

        assert_eq!(p.name, IMPORTED_PROJECT);
        assert_eq!(p.discipline, Discipline::Structural);
        assert_eq!(p.data, value);
        assert!(!p.is_archived);
        assert_eq!(p.id.len(), now().timestamp_millis().to_string().len() + 9);
    }

    #[test]
    fn workspace_export_is_unwrapped() {
        let value = json!({
            "workspaceName": "Офис",
            "projects": [
                { "id": "a", "data": { "objectName": "A" } },
                { "id": "b", "data": { "objectName": "B" } }
            ]
        });

        let ids: Vec<String> = import_value(&value, Discipline::Structural, now())
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn archived_flag_follows_truthiness() {
        for (flag, expected) in [
            (json!(1), true),
            (json!("yes"), true),
            (json!(0), false),
            (json!(""), false),
            (json!(null), false),
        ] {
            let value = json!({ "data": {}, "isArchived": flag });
            let p = &import_value(&value, Discipline::Structural, now()).unwrap()[0];
            assert_eq!(p.is_archived, expected, "{flag}");
        }
    }

    #[test]
    fn unknown_type_uses_active_discipline() {
        let value = json!({ "type": "electrical", "data": {} });

        let p = &import_value(&value, Discipline::Architectural, now()).unwrap()[0];

        assert_eq!(p.discipline, Discipline::Architectural);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            parse_projects("{ nope", Discipline::Structural, now()),
            Err(ImportError::Json(_))
        ));
        assert!(matches!(
            import_value(&json!([{ "data": {} }, 5]), Discipline::Structural, now()),
            Err(ImportError::NotAnObject { index: 1 })
        ));
        assert!(matches!(
            import_value(&json!({ "projects": {} }), Discipline::Structural, now()),
            Err(ImportError::ProjectsNotArray)
        ));
    }
}
