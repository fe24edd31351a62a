//! Board repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide row-level CRUD over `boards`.
//! - Persist `sort_order` values computed by the ordering engine.
//!
//! # Invariants
//! - Listing is deterministic: `sort_order ASC, uuid ASC`.
//! - Deleting a board cascades to its tasks.

use crate::model::board::Board;
use crate::model::{EntityId, EntityKind};
use crate::repo::{parse_sort_order, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const BOARD_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    title,
    sort_order,
    created_at,
    updated_at
FROM boards";

/// Repository interface for board rows.
pub trait BoardRepository {
    /// Inserts one board at an order already opened by the engine.
    fn insert_board(&self, project_id: EntityId, title: &str, sort_order: u32)
        -> RepoResult<Board>;
    fn get_board(&self, id: EntityId) -> RepoResult<Option<Board>>;
    fn list_boards(&self, project_id: EntityId) -> RepoResult<Vec<Board>>;
    fn rename_board(&self, id: EntityId, title: &str) -> RepoResult<()>;
    fn delete_board(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed board repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn insert_board(
        &self,
        project_id: EntityId,
        title: &str,
        sort_order: u32,
    ) -> RepoResult<Board> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO boards (uuid, project_uuid, title, sort_order)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                project_id.to_string(),
                title,
                i64::from(sort_order),
            ],
        )?;
        self.get_board(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Board,
            id,
        })
    }

    fn get_board(&self, id: EntityId) -> RepoResult<Option<Board>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOARD_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_board_row(row)?));
        }
        Ok(None)
    }

    fn list_boards(&self, project_id: EntityId) -> RepoResult<Vec<Board>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOARD_SELECT_SQL}
             WHERE project_uuid = ?1
             ORDER BY sort_order ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_board_row(row)?);
        }
        Ok(items)
    }

    fn rename_board(&self, id: EntityId, title: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE boards
             SET title = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), title],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Board,
                id,
            });
        }
        Ok(())
    }

    fn delete_board(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM boards WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Board,
                id,
            });
        }
        Ok(())
    }
}

fn parse_board_row(row: &Row<'_>) -> RepoResult<Board> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_uuid")?;
    Ok(Board {
        uuid: parse_uuid(&uuid_text, "boards.uuid")?,
        project_uuid: parse_uuid(&project_text, "boards.project_uuid")?,
        title: row.get("title")?,
        sort_order: parse_sort_order(row.get("sort_order")?, "boards.sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
