//! Command handlers. Each returns the text to print, so they can be tested
//! without a terminal.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, Utc};
use fee_core::calculations::{CalculationResult, calculate_with};
use fee_core::db::{InMemoryRepositoryFactory, RepositoryRegistry};
use fee_core::tables::ConstructionTypeTable;
use fee_core::{CurrencyDisplay, Discipline, FormState, ProjectRepository, SavedProject};
use fee_data::{
    ConstructionTypeLoader, Report, WorkspaceExport, parse_projects, txt_file_name,
    workspace_file_name,
};
use fee_db_sqlite::SqliteRepositoryFactory;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Every backend the binary knows about.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(InMemoryRepositoryFactory));
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Loads a replacement construction type table, or the built-in one.
pub fn load_construction_types(path: Option<&Path>) -> Result<ConstructionTypeTable> {
    match path {
        Some(path) => ConstructionTypeLoader::load_path(path)
            .with_context(|| format!("Failed to load construction types from '{}'", path.display())),
        None => Ok(ConstructionTypeTable::builtin().clone()),
    }
}

/// A file produced by an export command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub suggested_name: String,
    pub contents: String,
}

pub struct App {
    repo: Box<dyn ProjectRepository>,
    types: ConstructionTypeTable,
    clock: fn() -> DateTime<Utc>,
}

impl App {
    pub fn new(
        repo: Box<dyn ProjectRepository>,
        types: ConstructionTypeTable,
    ) -> Self {
        Self {
            repo,
            types,
            clock: Utc::now,
        }
    }

    pub fn with_clock(
        mut self,
        clock: fn() -> DateTime<Utc>,
    ) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn calculate(
        &self,
        form: &FormState,
    ) -> CalculationResult {
        calculate_with(form, &self.types)
    }

    /// Calculates `form_json`, or the discipline's current form when `None`.
    ///
    /// A given form becomes the discipline's current form.
    pub async fn calc(
        &self,
        discipline: Discipline,
        form_json: Option<&str>,
        currency: Option<CurrencyDisplay>,
        as_json: bool,
    ) -> Result<String> {
        let form = match form_json {
            Some(text) => {
                let value: Value = serde_json::from_str(text).context("Form is not valid JSON")?;
                let form = FormState::from_value(discipline, value.clone())
                    .context("Form does not match the discipline")?;
                self.repo
                    .set_current_form(discipline, &value)
                    .await
                    .context("Failed to store the current form")?;
                form
            }
            None => self.current_form(discipline).await?,
        };

        let result = self.calculate(&form);
        if as_json {
            return serde_json::to_string_pretty(&result).context("Failed to encode result");
        }
        let display = currency.unwrap_or_else(|| form.currency_display());
        Ok(Report::new(&result, form.object_name(), display).to_string())
    }

    async fn current_form(
        &self,
        discipline: Discipline,
    ) -> Result<FormState> {
        let stored = self
            .repo
            .current_form(discipline)
            .await
            .context("Failed to read the current form")?;
        match stored {
            Some(value) => FormState::from_value(discipline, value)
                .context("Stored current form is unreadable"),
            None => Ok(FormState::initial(discipline)),
        }
    }

    pub fn tables(
        &self,
        discipline: Discipline,
        as_csv: bool,
    ) -> Result<String> {
        match (discipline, as_csv) {
            (Discipline::Structural, true) => {
                let mut out = Vec::new();
                ConstructionTypeLoader::write(&self.types, &mut out)?;
                String::from_utf8(out).context("CSV output is not UTF-8")
            }
            (Discipline::Structural, false) => Ok(crate::price_list::structural(&self.types)?),
            (Discipline::Architectural, true) => {
                bail!("Only the structural table can be written as CSV")
            }
            (Discipline::Architectural, false) => Ok(crate::price_list::architectural()?),
        }
    }

    /// Imports every file into the workspace. Projects from each file are
    /// listed first, in file order. Unreadable files are skipped.
    ///
    /// Returns the number of imported projects.
    pub async fn import(
        &self,
        discipline: Discipline,
        files: &[(String, String)],
    ) -> Result<usize> {
        let mut imported = Vec::new();
        for (name, text) in files {
            match parse_projects(text, discipline, self.now()) {
                Ok(projects) => {
                    debug!(file = %name, count = projects.len(), "parsed import file");
                    imported.extend(projects);
                }
                Err(err) => warn!(file = %name, "skipping import file: {err}"),
            }
        }

        for project in imported.iter().rev() {
            self.repo
                .save_project(project)
                .await
                .with_context(|| format!("Failed to save imported project '{}'", project.name))?;
        }
        info!(count = imported.len(), "imported projects");
        Ok(imported.len())
    }

    pub async fn list(
        &self,
        discipline: Discipline,
        include_archived: bool,
    ) -> Result<String> {
        let projects = self
            .repo
            .list_projects(discipline, include_archived)
            .await
            .context("Failed to list projects")?;

        let mut out = String::new();
        for p in &projects {
            let modified = p
                .last_modified_at()
                .map(|t| t.with_timezone(&Local).format("%d.%m.%Y %H:%M").to_string())
                .unwrap_or_default();
            let archived = if p.is_archived { " [архив]" } else { "" };
            out.push_str(&format!("{}  {:<16}  {}{archived}\n", p.id, modified, p.name));
        }
        Ok(out)
    }

    async fn project(
        &self,
        id: &str,
    ) -> Result<(SavedProject, FormState)> {
        let project = self
            .repo
            .get_project(id)
            .await
            .with_context(|| format!("Project '{id}' could not be loaded"))?;
        let form = project.form_state()?;
        Ok((project, form))
    }

    pub async fn show(
        &self,
        id: &str,
        currency: Option<CurrencyDisplay>,
    ) -> Result<String> {
        let (_, form) = self.project(id).await?;
        let display = currency.unwrap_or_else(|| form.currency_display());
        Ok(Report::new(&self.calculate(&form), form.object_name(), display).to_string())
    }

    pub async fn export_txt(
        &self,
        id: &str,
        currency: Option<CurrencyDisplay>,
    ) -> Result<ExportedFile> {
        let (_, form) = self.project(id).await?;
        let display = currency.unwrap_or_else(|| form.currency_display());
        Ok(ExportedFile {
            suggested_name: txt_file_name(form.object_name()),
            contents: fee_data::export_txt(&self.calculate(&form), form.object_name(), display),
        })
    }

    pub async fn export_workspace(
        &self,
        discipline: Discipline,
    ) -> Result<ExportedFile> {
        let name = self
            .repo
            .workspace_name(discipline)
            .await?
            .unwrap_or_default();
        let projects = self.repo.list_projects(discipline, true).await?;
        let export = WorkspaceExport::new(name.clone(), projects, self.now());
        Ok(ExportedFile {
            suggested_name: workspace_file_name(&name),
            contents: export.to_json()?,
        })
    }

    pub async fn set_archived(
        &self,
        id: &str,
        archived: bool,
    ) -> Result<()> {
        self.repo
            .set_archived(id, archived)
            .await
            .with_context(|| format!("Project '{id}' could not be updated"))
    }

    pub async fn delete(
        &self,
        id: &str,
    ) -> Result<()> {
        self.repo
            .delete_project(id)
            .await
            .with_context(|| format!("Project '{id}' could not be deleted"))
    }

    /// Saves `form_json` into the workspace.
    ///
    /// With `project` set, that project is overwritten (keeping its id and
    /// archived flag) unless `as_new` asks for a copy.
    pub async fn save(
        &self,
        discipline: Discipline,
        form_json: &str,
        project: Option<&str>,
        as_new: bool,
    ) -> Result<SavedProject> {
        let value: Value = serde_json::from_str(form_json).context("Form is not valid JSON")?;
        let form = FormState::from_value(discipline, value)
            .context("Form does not match the discipline")?;
        let now = self.now();

        let saved = match project {
            Some(id) if !as_new => {
                let mut existing = self
                    .repo
                    .get_project(id)
                    .await
                    .with_context(|| format!("Project '{id}' could not be loaded"))?;
                existing.update_from_form(&form, now)?;
                existing
            }
            _ => SavedProject::from_form(&form, now)?,
        };

        self.repo
            .save_project(&saved)
            .await
            .context("Failed to save project")?;
        self.repo
            .set_current_form(discipline, &saved.data)
            .await
            .context("Failed to store the current form")?;
        info!(id = %saved.id, name = %saved.name, "saved project");
        Ok(saved)
    }

    /// Returns the workspace name, renaming it first when `rename` is set.
    pub async fn workspace(
        &self,
        discipline: Discipline,
        rename: Option<&str>,
    ) -> Result<String> {
        if let Some(name) = rename {
            self.repo.set_workspace_name(discipline, name.trim()).await?;
        }
        Ok(self
            .repo
            .workspace_name(discipline)
            .await?
            .unwrap_or_default())
    }

    pub async fn clear(
        &self,
        discipline: Discipline,
    ) -> Result<u64> {
        let removed = self.repo.clear_projects(discipline).await?;
        info!(discipline = discipline.as_str(), removed, "cleared workspace");
        Ok(removed)
    }
}
