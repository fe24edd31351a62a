//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `projects`, the parents of board scopes.
//!
//! # Invariants
//! - Deleting a project cascades to its boards and their tasks.
//! - Listing is deterministic: `created_at ASC, uuid ASC`.

use crate::model::project::Project;
use crate::model::{EntityId, EntityKind};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    created_at,
    updated_at
FROM projects";

/// Repository interface for project operations.
pub trait ProjectRepository {
    fn create_project(&self, name: &str) -> RepoResult<Project>;
    fn get_project(&self, id: EntityId) -> RepoResult<Option<Project>>;
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn rename_project(&self, id: EntityId, name: &str) -> RepoResult<()>;
    fn delete_project(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, name: &str) -> RepoResult<Project> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO projects (uuid, name) VALUES (?1, ?2);",
            params![id.to_string(), name],
        )?;
        self.get_project(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Project,
            id,
        })
    }

    fn get_project(&self, id: EntityId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_project_row(row)?);
        }
        Ok(items)
    }

    fn rename_project(&self, id: EntityId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Project,
                id,
            });
        }
        Ok(())
    }

    fn delete_project(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Project,
                id,
            });
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Project {
        uuid: parse_uuid(&uuid_text, "projects.uuid")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
