//! Scope resolution for board/task requests.
//!
//! # Responsibility
//! - Map caller-supplied ids to the ordering [`Scope`] they address.
//! - Verify that referenced entities belong to the claimed parents.
//!
//! # Invariants
//! - Read-only. Callers run it inside the same transaction as the write so
//!   the membership check and the shift see one snapshot.

use crate::model::board::Board;
use crate::model::task::Task;
use crate::model::EntityId;
use crate::ordering::error::{Conflict, EntityRef, OrderingError, OrderingResult};
use crate::ordering::scope::Scope;
use crate::repo::board_repo::{BoardRepository, SqliteBoardRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use rusqlite::Connection;

/// Resolves scopes against persisted parent links.
pub struct ScopeResolver<'conn> {
    projects: SqliteProjectRepository<'conn>,
    boards: SqliteBoardRepository<'conn>,
    tasks: SqliteTaskRepository<'conn>,
}

impl<'conn> ScopeResolver<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            projects: SqliteProjectRepository::new(conn),
            boards: SqliteBoardRepository::new(conn),
            tasks: SqliteTaskRepository::new(conn),
        }
    }

    /// Scope of the boards of `project_id`.
    ///
    /// # Errors
    /// - `NotFound` when the project does not exist.
    pub fn boards_of(&self, project_id: EntityId) -> OrderingResult<Scope> {
        self.projects
            .get_project(project_id)?
            .ok_or(OrderingError::NotFound(EntityRef::project(project_id)))?;
        Ok(Scope::boards_of(project_id))
    }

    /// Scope of the tasks of `board_id`, which must belong to `project_id`.
    ///
    /// # Errors
    /// - `NotFound` when the project or board does not exist.
    /// - `Conflict` when the board belongs to another project.
    pub fn tasks_of(&self, project_id: EntityId, board_id: EntityId) -> OrderingResult<Scope> {
        self.boards_of(project_id)?;
        self.board_in(Scope::boards_of(project_id), board_id)?;
        Ok(Scope::tasks_of(board_id))
    }

    /// Loads `board_id` and checks it sits in `scope`.
    pub fn board_in(&self, scope: Scope, board_id: EntityId) -> OrderingResult<Board> {
        let board = self
            .boards
            .get_board(board_id)?
            .ok_or(OrderingError::NotFound(EntityRef::board(board_id)))?;
        ensure_parent(scope, EntityRef::board(board_id), board.project_uuid)?;
        Ok(board)
    }

    /// Loads `task_id` and checks it sits in `scope`.
    pub fn task_in(&self, scope: Scope, task_id: EntityId) -> OrderingResult<Task> {
        let task = self
            .tasks
            .get_task(task_id)?
            .ok_or(OrderingError::NotFound(EntityRef::task(task_id)))?;
        ensure_parent(scope, EntityRef::task(task_id), task.board_uuid)?;
        Ok(task)
    }
}

fn ensure_parent(scope: Scope, entity: EntityRef, actual_parent: EntityId) -> OrderingResult<()> {
    if scope.kind() != entity.kind {
        return Err(Conflict::KindMismatch {
            scope,
            repository: entity.kind,
        }
        .into());
    }
    if actual_parent != scope.parent_id() {
        return Err(Conflict::ScopeMismatch {
            entity,
            claimed_parent: scope.parent_id(),
            actual_parent,
        }
        .into());
    }
    Ok(())
}
