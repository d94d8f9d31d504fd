use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Discipline, SavedProject};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Storage for saved projects, the workspace name and the in-progress form.
///
/// Everything is namespaced by [`Discipline`]: the structural and
/// architectural workspaces never see each other's projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    // Projects

    /// Projects of `discipline`, most recently saved first.
    async fn list_projects(
        &self,
        discipline: Discipline,
        include_archived: bool,
    ) -> Result<Vec<SavedProject>, RepositoryError>;

    async fn get_project(&self, id: &str) -> Result<SavedProject, RepositoryError>;

    /// Inserts a new project at the front of its workspace or replaces the
    /// project with the same id.
    async fn save_project(&self, project: &SavedProject) -> Result<(), RepositoryError>;

    async fn delete_project(&self, id: &str) -> Result<(), RepositoryError>;

    async fn set_archived(&self, id: &str, archived: bool) -> Result<(), RepositoryError>;

    /// Removes every project of `discipline` and returns how many were removed.
    async fn clear_projects(&self, discipline: Discipline) -> Result<u64, RepositoryError>;

    // Workspace settings

    async fn workspace_name(&self, discipline: Discipline) -> Result<Option<String>, RepositoryError>;

    async fn set_workspace_name(
        &self,
        discipline: Discipline,
        name: &str,
    ) -> Result<(), RepositoryError>;

    /// The raw form last being edited, if any.
    async fn current_form(&self, discipline: Discipline) -> Result<Option<Value>, RepositoryError>;

    async fn set_current_form(
        &self,
        discipline: Discipline,
        form: &Value,
    ) -> Result<(), RepositoryError>;
}
