//! Sibling order persistence contracts and SQLite adapters.
//!
//! # Responsibility
//! - Expose per-scope read/write of `(entity id, sort_order)` pairs.
//! - Keep table/column selection static per entity kind.
//!
//! # Invariants
//! - Every method runs on the caller's connection; when that connection is
//!   inside a transaction, all reads and writes belong to it.
//! - Listing is deterministic: `sort_order ASC, uuid ASC`.

use crate::model::{EntityId, EntityKind};
use crate::ordering::scope::{OrderRange, OrderedEntity, Scope};
use crate::repo::{parse_sort_order, parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::marker::PhantomData;

/// Order-column access for one entity kind, consumed by the ordering engine.
pub trait SiblingRepository {
    /// Entity kind whose rows this repository reads and writes.
    fn kind(&self) -> EntityKind;
    /// Returns whether the scope's parent record exists.
    fn scope_exists(&self, scope: Scope) -> RepoResult<bool>;
    /// Counts siblings in one scope.
    fn count_siblings(&self, scope: Scope) -> RepoResult<u32>;
    /// Lists siblings in one scope by ascending order.
    fn list_orders(&self, scope: Scope) -> RepoResult<Vec<OrderedEntity>>;
    /// Loads the parent id of one entity regardless of scope.
    fn parent_of(&self, entity_id: EntityId) -> RepoResult<Option<EntityId>>;
    /// Adds `delta` to every sibling order inside `range`; returns rows changed.
    fn shift_orders(&self, scope: Scope, range: OrderRange, delta: i64) -> RepoResult<usize>;
    /// Sets one sibling's order; returns rows changed.
    fn set_order(&self, scope: Scope, entity_id: EntityId, order: u32) -> RepoResult<usize>;
}

/// Static table layout for one ordered entity kind.
pub trait SiblingTable {
    const KIND: EntityKind;
    const TABLE: &'static str;
    const PARENT_COLUMN: &'static str;
    const PARENT_TABLE: &'static str;
}

/// Boards ordered within a project.
#[derive(Debug, Clone, Copy)]
pub struct BoardSiblings;

impl SiblingTable for BoardSiblings {
    const KIND: EntityKind = EntityKind::Board;
    const TABLE: &'static str = "boards";
    const PARENT_COLUMN: &'static str = "project_uuid";
    const PARENT_TABLE: &'static str = "projects";
}

/// Tasks ordered within a board.
#[derive(Debug, Clone, Copy)]
pub struct TaskSiblings;

impl SiblingTable for TaskSiblings {
    const KIND: EntityKind = EntityKind::Task;
    const TABLE: &'static str = "tasks";
    const PARENT_COLUMN: &'static str = "board_uuid";
    const PARENT_TABLE: &'static str = "boards";
}

/// SQLite-backed sibling repository for one entity kind.
pub struct SqliteSiblingRepository<'conn, T: SiblingTable> {
    conn: &'conn Connection,
    _table: PhantomData<T>,
}

pub type SqliteBoardSiblings<'conn> = SqliteSiblingRepository<'conn, BoardSiblings>;
pub type SqliteTaskSiblings<'conn> = SqliteSiblingRepository<'conn, TaskSiblings>;

impl<'conn, T: SiblingTable> SqliteSiblingRepository<'conn, T> {
    /// Creates an adapter over a migrated connection or open transaction.
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _table: PhantomData,
        }
    }
}

impl<T: SiblingTable> SiblingRepository for SqliteSiblingRepository<'_, T> {
    fn kind(&self) -> EntityKind {
        T::KIND
    }

    fn scope_exists(&self, scope: Scope) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE uuid = ?1);",
                T::PARENT_TABLE
            ),
            [scope.parent_id().to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count_siblings(&self, scope: Scope) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?1;",
                T::TABLE,
                T::PARENT_COLUMN
            ),
            [scope.parent_id().to_string()],
            |row| row.get(0),
        )?;
        parse_sort_order(count, "sibling count")
    }

    fn list_orders(&self, scope: Scope) -> RepoResult<Vec<OrderedEntity>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, sort_order
             FROM {}
             WHERE {} = ?1
             ORDER BY sort_order ASC, uuid ASC;",
            T::TABLE,
            T::PARENT_COLUMN
        ))?;
        let mut rows = stmt.query([scope.parent_id().to_string()])?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let order: i64 = row.get(1)?;
            items.push(OrderedEntity {
                id: parse_uuid(&uuid_text, "sibling uuid")?,
                scope,
                order: parse_sort_order(order, "sibling sort_order")?,
            });
        }
        Ok(items)
    }

    fn parent_of(&self, entity_id: EntityId) -> RepoResult<Option<EntityId>> {
        let parent: Option<String> = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE uuid = ?1;",
                    T::PARENT_COLUMN,
                    T::TABLE
                ),
                [entity_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        parent
            .map(|value| parse_uuid(&value, "sibling parent uuid"))
            .transpose()
    }

    fn shift_orders(&self, scope: Scope, range: OrderRange, delta: i64) -> RepoResult<usize> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET sort_order = sort_order + ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE {} = ?1
                   AND sort_order >= ?3
                   AND (?4 IS NULL OR sort_order <= ?4);",
                T::TABLE,
                T::PARENT_COLUMN
            ),
            params![
                scope.parent_id().to_string(),
                delta,
                i64::from(range.start),
                range.end.map(i64::from),
            ],
        )?;
        Ok(changed)
    }

    fn set_order(&self, scope: Scope, entity_id: EntityId, order: u32) -> RepoResult<usize> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET sort_order = ?3,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1
                   AND {} = ?2;",
                T::TABLE,
                T::PARENT_COLUMN
            ),
            params![
                entity_id.to_string(),
                scope.parent_id().to_string(),
                i64::from(order),
            ],
        )?;
        Ok(changed)
    }
}
