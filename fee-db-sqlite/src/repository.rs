use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use fee_core::{Discipline, ProjectRepository, RepositoryError, SavedProject};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `connection_string`, which is a file path (created when
    /// missing), a `sqlite:` URL, or `:memory:`.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let pool = if connection_string == ":memory:" {
            // Every connection to :memory: is its own database; keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
        } else {
            let options = if connection_string.starts_with("sqlite:") {
                SqliteConnectOptions::from_str(connection_string)
                    .with_context(|| format!("Invalid database URL: {}", connection_string))?
            } else {
                SqliteConnectOptions::new().filename(connection_string)
            };
            SqlitePoolOptions::new()
                .connect_with(options.create_if_missing(true))
                .await
        }
        .with_context(|| format!("Failed to connect to database: {}", connection_string))?;

        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

#[derive(FromRow)]
struct ProjectRow {
    id: String,
    discipline: String,
    name: String,
    last_modified: i64,
    data: String,
    is_archived: bool,
}

impl TryFrom<ProjectRow> for SavedProject {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let discipline = Discipline::parse(&row.discipline).ok_or_else(|| {
            RepositoryError::Database(format!(
                "project '{}' has unknown discipline '{}'",
                row.id, row.discipline
            ))
        })?;
        Ok(SavedProject {
            data: serde_json::from_str(&row.data)?,
            id: row.id,
            name: row.name,
            last_modified: row.last_modified,
            discipline,
            is_archived: row.is_archived,
        })
    }
}

const PROJECT_COLUMNS: &str = "id, discipline, name, last_modified, data, is_archived";

#[async_trait]
impl ProjectRepository for SqliteRepository {
    async fn list_projects(
        &self,
        discipline: Discipline,
        include_archived: bool,
    ) -> Result<Vec<SavedProject>, RepositoryError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE discipline = ? AND (? OR is_archived = 0)
             ORDER BY seq DESC"
        );
        let rows: Vec<ProjectRow> = sqlx::query_as(&sql)
            .bind(discipline.as_str())
            .bind(include_archived)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(SavedProject::try_from).collect()
    }

    async fn get_project(&self, id: &str) -> Result<SavedProject, RepositoryError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?");
        let row: ProjectRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn save_project(&self, project: &SavedProject) -> Result<(), RepositoryError> {
        let data = serde_json::to_string(&project.data)?;

        sqlx::query(
            "INSERT INTO projects (id, discipline, name, last_modified, data, is_archived)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                discipline = excluded.discipline,
                name = excluded.name,
                last_modified = excluded.last_modified,
                data = excluded.data,
                is_archived = excluded.is_archived",
        )
        .bind(&project.id)
        .bind(project.discipline.as_str())
        .bind(&project.name)
        .bind(project.last_modified)
        .bind(data)
        .bind(project.is_archived)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        tracing::debug!(id = %project.id, discipline = project.discipline.as_str(), "saved project");
        Ok(())
    }

    async fn delete_project(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_archived(&self, id: &str, archived: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE projects SET is_archived = ? WHERE id = ?")
            .bind(archived)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn clear_projects(&self, discipline: Discipline) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE discipline = ?")
            .bind(discipline.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected())
    }

    async fn workspace_name(&self, discipline: Discipline) -> Result<Option<String>, RepositoryError> {
        let name: Option<Option<String>> = sqlx::query_scalar(
            "SELECT workspace_name FROM workspace_settings WHERE discipline = ?",
        )
        .bind(discipline.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(name.flatten())
    }

    async fn set_workspace_name(
        &self,
        discipline: Discipline,
        name: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO workspace_settings (discipline, workspace_name) VALUES (?, ?)
             ON CONFLICT(discipline) DO UPDATE SET workspace_name = excluded.workspace_name",
        )
        .bind(discipline.as_str())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn current_form(&self, discipline: Discipline) -> Result<Option<Value>, RepositoryError> {
        let form: Option<Option<String>> = sqlx::query_scalar(
            "SELECT current_form FROM workspace_settings WHERE discipline = ?",
        )
        .bind(discipline.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match form.flatten() {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set_current_form(
        &self,
        discipline: Discipline,
        form: &Value,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO workspace_settings (discipline, current_form) VALUES (?, ?)
             ON CONFLICT(discipline) DO UPDATE SET current_form = excluded.current_form",
        )
        .bind(discipline.as_str())
        .bind(serde_json::to_string(form)?)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }
}
