//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide row-level CRUD over `tasks`.
//! - Persist `sort_order`/`board_uuid` values computed by the ordering engine.
//!
//! # Invariants
//! - Listing is deterministic: `sort_order ASC, uuid ASC`.

use crate::model::task::{Task, TaskPatch};
use crate::model::{EntityId, EntityKind};
use crate::repo::{parse_sort_order, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    board_uuid,
    title,
    description,
    sort_order,
    created_at,
    updated_at
FROM tasks";

/// Repository interface for task rows.
pub trait TaskRepository {
    /// Inserts one task at an order already opened by the engine.
    fn insert_task(
        &self,
        board_id: EntityId,
        title: &str,
        description: Option<&str>,
        sort_order: u32,
    ) -> RepoResult<Task>;
    fn get_task(&self, id: EntityId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, board_id: EntityId) -> RepoResult<Vec<Task>>;
    /// Applies a normalized patch. Empty patches only bump `updated_at`.
    fn update_task(&self, id: EntityId, patch: &TaskPatch) -> RepoResult<()>;
    /// Re-parents one task to `board_id` at an order already opened there.
    fn reparent_task(&self, id: EntityId, board_id: EntityId, sort_order: u32)
        -> RepoResult<()>;
    fn delete_task(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(
        &self,
        board_id: EntityId,
        title: &str,
        description: Option<&str>,
        sort_order: u32,
    ) -> RepoResult<Task> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (uuid, board_uuid, title, description, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                board_id.to_string(),
                title,
                description,
                i64::from(sort_order),
            ],
        )?;
        self.get_task(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Task,
            id,
        })
    }

    fn get_task(&self, id: EntityId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, board_id: EntityId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE board_uuid = ?1
             ORDER BY sort_order ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        Ok(items)
    }

    fn update_task(&self, id: EntityId, patch: &TaskPatch) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET title = COALESCE(?2, title),
                 description = CASE WHEN ?3 = 1 THEN ?4 ELSE description END,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                patch.title.as_deref(),
                patch.description.is_some(),
                patch.description.as_ref().and_then(|value| value.as_deref()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Task,
                id,
            });
        }
        Ok(())
    }

    fn reparent_task(
        &self,
        id: EntityId,
        board_id: EntityId,
        sort_order: u32,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET board_uuid = ?2,
                 sort_order = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), board_id.to_string(), i64::from(sort_order)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Task,
                id,
            });
        }
        Ok(())
    }

    fn delete_task(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Task,
                id,
            });
        }
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let board_text: String = row.get("board_uuid")?;
    Ok(Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid")?,
        board_uuid: parse_uuid(&board_text, "tasks.board_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        sort_order: parse_sort_order(row.get("sort_order")?, "tasks.sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
