use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{ProjectRepository, RepositoryError};
use crate::models::{Discipline, SavedProject};

#[derive(Debug, Default)]
struct Workspace {
    projects: Vec<SavedProject>,
    name: Option<String>,
    current_form: Option<Value>,
}

/// A process-local project store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    workspaces: RwLock<HashMap<Discipline, Workspace>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Discipline, Workspace>>, RepositoryError> {
        self.workspaces
            .read()
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Discipline, Workspace>>, RepositoryError> {
        self.workspaces
            .write()
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list_projects(
        &self,
        discipline: Discipline,
        include_archived: bool,
    ) -> Result<Vec<SavedProject>, RepositoryError> {
        let workspaces = self.read()?;
        Ok(workspaces
            .get(&discipline)
            .map(|ws| {
                ws.projects
                    .iter()
                    .filter(|p| include_archived || !p.is_archived)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_project(&self, id: &str) -> Result<SavedProject, RepositoryError> {
        let workspaces = self.read()?;
        workspaces
            .values()
            .flat_map(|ws| ws.projects.iter())
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn save_project(&self, project: &SavedProject) -> Result<(), RepositoryError> {
        let mut workspaces = self.write()?;
        // An id is unique across disciplines; saving under another one moves it.
        for (discipline, ws) in workspaces.iter_mut() {
            if *discipline != project.discipline {
                ws.projects.retain(|p| p.id != project.id);
            }
        }
        let projects = &mut workspaces.entry(project.discipline).or_default().projects;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => projects.insert(0, project.clone()),
        }
        Ok(())
    }

    async fn delete_project(&self, id: &str) -> Result<(), RepositoryError> {
        let mut workspaces = self.write()?;
        for ws in workspaces.values_mut() {
            if let Some(pos) = ws.projects.iter().position(|p| p.id == id) {
                ws.projects.remove(pos);
                return Ok(());
            }
        }
        Err(RepositoryError::NotFound)
    }

    async fn set_archived(&self, id: &str, archived: bool) -> Result<(), RepositoryError> {
        let mut workspaces = self.write()?;
        let project = workspaces
            .values_mut()
            .flat_map(|ws| ws.projects.iter_mut())
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        project.is_archived = archived;
        Ok(())
    }

    async fn clear_projects(&self, discipline: Discipline) -> Result<u64, RepositoryError> {
        let mut workspaces = self.write()?;
        let removed = workspaces
            .get_mut(&discipline)
            .map(|ws| std::mem::take(&mut ws.projects).len())
            .unwrap_or(0);
        Ok(removed as u64)
    }

    async fn workspace_name(&self, discipline: Discipline) -> Result<Option<String>, RepositoryError> {
        Ok(self.read()?.get(&discipline).and_then(|ws| ws.name.clone()))
    }

    async fn set_workspace_name(
        &self,
        discipline: Discipline,
        name: &str,
    ) -> Result<(), RepositoryError> {
        self.write()?.entry(discipline).or_default().name = Some(name.to_string());
        Ok(())
    }

    async fn current_form(&self, discipline: Discipline) -> Result<Option<Value>, RepositoryError> {
        Ok(self
            .read()?
            .get(&discipline)
            .and_then(|ws| ws.current_form.clone()))
    }

    async fn set_current_form(
        &self,
        discipline: Discipline,
        form: &Value,
    ) -> Result<(), RepositoryError> {
        self.write()?.entry(discipline).or_default().current_form = Some(form.clone());
        Ok(())
    }
}

pub struct InMemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for InMemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn ProjectRepository>, RepositoryError> {
        Ok(Box::new(InMemoryProjectRepository::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn project(id: &str, discipline: Discipline, name: &str) -> SavedProject {
        SavedProject {
            id: id.to_string(),
            name: name.to_string(),
            last_modified: 1_700_000_000_000,
            discipline,
            data: json!({ "objectName": name }),
            is_archived: false,
        }
    }

    fn ids(projects: &[SavedProject]) -> Vec<&str> {
        projects.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn new_projects_are_listed_first() {
        let repo = InMemoryProjectRepository::new();
        repo.save_project(&project("a", Discipline::Structural, "A")).await.unwrap();
        repo.save_project(&project("b", Discipline::Structural, "B")).await.unwrap();

        let listed = repo.list_projects(Discipline::Structural, false).await.unwrap();

        assert_eq!(ids(&listed), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn saving_existing_id_replaces_in_place() {
        let repo = InMemoryProjectRepository::new();
        repo.save_project(&project("a", Discipline::Structural, "A")).await.unwrap();
        repo.save_project(&project("b", Discipline::Structural, "B")).await.unwrap();
        repo.save_project(&project("a", Discipline::Structural, "A2")).await.unwrap();

        let listed = repo.list_projects(Discipline::Structural, false).await.unwrap();

        assert_eq!(ids(&listed), vec!["b", "a"]);
        assert_eq!(listed[1].name, "A2");
    }

    #[tokio::test]
    async fn saving_id_under_other_discipline_moves_it() {
        let repo = InMemoryProjectRepository::new();
        repo.save_project(&project("dup", Discipline::Structural, "S")).await.unwrap();
        repo.save_project(&project("dup", Discipline::Architectural, "A")).await.unwrap();

        let structural = repo.list_projects(Discipline::Structural, true).await.unwrap();
        let arch = repo.list_projects(Discipline::Architectural, true).await.unwrap();

        assert!(structural.is_empty());
        assert_eq!(ids(&arch), vec!["dup"]);
        assert_eq!(repo.get_project("dup").await.unwrap().discipline, Discipline::Architectural);
    }

    #[tokio::test]
    async fn disciplines_are_isolated() {
        let repo = InMemoryProjectRepository::new();
        repo.save_project(&project("s", Discipline::Structural, "S")).await.unwrap();
        repo.save_project(&project("r", Discipline::Architectural, "R")).await.unwrap();

        let arch = repo.list_projects(Discipline::Architectural, true).await.unwrap();
        assert_eq!(ids(&arch), vec!["r"]);

        assert_eq!(repo.clear_projects(Discipline::Structural).await.unwrap(), 1);
        assert_eq!(repo.list_projects(Discipline::Architectural, true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn archived_projects_are_hidden_unless_requested() {
        let repo = InMemoryProjectRepository::new();
        repo.save_project(&project("a", Discipline::Architectural, "A")).await.unwrap();
        repo.set_archived("a", true).await.unwrap();

        assert!(repo.list_projects(Discipline::Architectural, false).await.unwrap().is_empty());
        let all = repo.list_projects(Discipline::Architectural, true).await.unwrap();
        assert!(all[0].is_archived);

        repo.set_archived("a", false).await.unwrap();
        assert_eq!(repo.list_projects(Discipline::Architectural, false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let repo = InMemoryProjectRepository::new();

        assert_eq!(repo.get_project("x").await.err(), Some(RepositoryError::NotFound));
        assert_eq!(repo.delete_project("x").await.err(), Some(RepositoryError::NotFound));
        assert_eq!(repo.set_archived("x", true).await.err(), Some(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_project() {
        let repo = InMemoryProjectRepository::new();
        repo.save_project(&project("a", Discipline::Structural, "A")).await.unwrap();

        repo.delete_project("a").await.unwrap();

        assert_eq!(repo.get_project("a").await.err(), Some(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn workspace_settings_round_trip() {
        let repo = InMemoryProjectRepository::new();
        assert_eq!(repo.workspace_name(Discipline::Structural).await.unwrap(), None);

        repo.set_workspace_name(Discipline::Structural, "Офис София").await.unwrap();
        repo.set_current_form(Discipline::Structural, &json!({ "area": 120 })).await.unwrap();

        assert_eq!(
            repo.workspace_name(Discipline::Structural).await.unwrap().as_deref(),
            Some("Офис София")
        );
        assert_eq!(
            repo.current_form(Discipline::Structural).await.unwrap(),
            Some(json!({ "area": 120 }))
        );
        assert_eq!(repo.current_form(Discipline::Architectural).await.unwrap(), None);
    }

    #[tokio::test]
    async fn factory_creates_empty_store() {
        let repo = InMemoryRepositoryFactory
            .create(&DbConfig::default())
            .await
            .unwrap();

        assert!(repo.list_projects(Discipline::Structural, true).await.unwrap().is_empty());
    }
}
