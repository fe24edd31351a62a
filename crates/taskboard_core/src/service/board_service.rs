//! Board use-case service.
//!
//! # Responsibility
//! - Create, list, rename, delete, move, and batch-reorder the boards of a
//!   project.
//!
//! # Invariants
//! - Every order change runs resolve -> engine -> row write inside one
//!   retried transaction.
//! - The boards of a project always hold orders `0..N-1`.

use crate::config::CoreConfig;
use crate::db::tx::{run_scoped, RetryPolicy};
use crate::model::board::Board;
use crate::model::EntityId;
use crate::ordering::engine::OrderingEngine;
use crate::ordering::error::OrderingResult;
use crate::ordering::resolver::ScopeResolver;
use crate::ordering::scope::{OrderedEntity, Scope};
use crate::ordering::validate::{validate_batch, validate_move, validate_position, Assignment};
use crate::repo::board_repo::{BoardRepository, SqliteBoardRepository};
use crate::repo::ensure_connection_ready;
use crate::repo::sibling_repo::SqliteBoardSiblings;
use crate::service::normalize_label;
use log::info;
use rusqlite::Connection;

/// Board service facade.
pub struct BoardService<'conn> {
    conn: &'conn Connection,
    policy: RetryPolicy,
}

impl<'conn> BoardService<'conn> {
    /// Creates service over a migrated connection.
    pub fn try_new(conn: &'conn Connection, config: &CoreConfig) -> OrderingResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            policy: config.retry_policy(),
        })
    }

    /// Creates a board at `position`, or after all boards when `None`.
    ///
    /// Positions past the end are clamped to the end.
    pub fn create_board(
        &self,
        project_id: EntityId,
        title: impl Into<String>,
        position: Option<i64>,
    ) -> OrderingResult<Board> {
        let title = normalize_label("title", title.into())?;
        if let Some(position) = position {
            validate_position(None, position)?;
        }

        let scope = Scope::boards_of(project_id);
        let board = run_scoped(self.conn, scope, &self.policy, "board_create", |tx| {
            let scope = ScopeResolver::new(tx).boards_of(project_id)?;
            let siblings = SqliteBoardSiblings::new(tx);
            let engine = OrderingEngine::new(&siblings);
            let order = match position {
                Some(position) => engine.insert_at(scope, position)?,
                None => engine.append(scope)?,
            };
            Ok(SqliteBoardRepository::new(tx).insert_board(project_id, &title, order)?)
        })?;

        info!(
            "event=board_create module=service status=ok scope={} board={} order={}",
            scope, board.uuid, board.sort_order
        );
        Ok(board)
    }

    pub fn get_board(&self, project_id: EntityId, board_id: EntityId) -> OrderingResult<Board> {
        ScopeResolver::new(self.conn).board_in(Scope::boards_of(project_id), board_id)
    }

    /// Lists the project's boards in order.
    pub fn list_boards(&self, project_id: EntityId) -> OrderingResult<Vec<Board>> {
        ScopeResolver::new(self.conn).boards_of(project_id)?;
        Ok(SqliteBoardRepository::new(self.conn).list_boards(project_id)?)
    }

    pub fn rename_board(
        &self,
        project_id: EntityId,
        board_id: EntityId,
        title: impl Into<String>,
    ) -> OrderingResult<()> {
        let title = normalize_label("title", title.into())?;
        let scope = Scope::boards_of(project_id);
        run_scoped(self.conn, scope, &self.policy, "board_rename", |tx| {
            ScopeResolver::new(tx).board_in(scope, board_id)?;
            Ok(SqliteBoardRepository::new(tx).rename_board(board_id, &title)?)
        })
    }

    /// Deletes a board and its tasks, closing its slot among the project's boards.
    pub fn delete_board(&self, project_id: EntityId, board_id: EntityId) -> OrderingResult<()> {
        let scope = Scope::boards_of(project_id);
        let vacated = run_scoped(self.conn, scope, &self.policy, "board_delete", |tx| {
            ScopeResolver::new(tx).board_in(scope, board_id)?;
            let siblings = SqliteBoardSiblings::new(tx);
            let vacated = OrderingEngine::new(&siblings).remove_at(scope, board_id)?;
            SqliteBoardRepository::new(tx).delete_board(board_id)?;
            Ok(vacated)
        })?;

        info!(
            "event=board_delete module=service status=ok scope={} board={} order={}",
            scope, board_id, vacated
        );
        Ok(())
    }

    /// Moves a board to `position` and returns its final order.
    pub fn move_board(
        &self,
        project_id: EntityId,
        board_id: EntityId,
        position: i64,
    ) -> OrderingResult<u32> {
        validate_move(Assignment::new(board_id, position))?;
        let scope = Scope::boards_of(project_id);
        let order = run_scoped(self.conn, scope, &self.policy, "board_move", |tx| {
            ScopeResolver::new(tx).board_in(scope, board_id)?;
            let siblings = SqliteBoardSiblings::new(tx);
            OrderingEngine::new(&siblings).move_to(scope, board_id, position)
        })?;

        info!(
            "event=board_move module=service status=ok scope={} board={} order={}",
            scope, board_id, order
        );
        Ok(order)
    }

    /// Applies a drag-and-drop batch and returns the project's boards in order.
    pub fn reorder_boards(
        &self,
        project_id: EntityId,
        assignments: &[Assignment],
    ) -> OrderingResult<Vec<OrderedEntity>> {
        validate_batch(assignments)?;
        let scope = Scope::boards_of(project_id);
        let ordered = run_scoped(self.conn, scope, &self.policy, "board_reorder", |tx| {
            let scope = ScopeResolver::new(tx).boards_of(project_id)?;
            let siblings = SqliteBoardSiblings::new(tx);
            OrderingEngine::new(&siblings).batch_reorder(scope, assignments)
        })?;

        info!(
            "event=board_reorder module=service status=ok scope={} assignments={}",
            scope,
            assignments.len()
        );
        Ok(ordered)
    }
}
