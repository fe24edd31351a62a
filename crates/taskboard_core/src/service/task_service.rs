//! Task use-case service.
//!
//! # Responsibility
//! - Create, list, update, delete, move, batch-reorder, and transfer the
//!   tasks of a board.
//!
//! # Invariants
//! - Task scopes are always resolved through their project: a board that
//!   belongs to another project is a `Conflict`.
//! - Transfers close the slot in the source board and open one in the target
//!   board inside a single transaction.

use crate::config::CoreConfig;
use crate::db::tx::{run_scoped, RetryPolicy};
use crate::model::task::{Task, TaskPatch};
use crate::model::EntityId;
use crate::ordering::engine::OrderingEngine;
use crate::ordering::error::{EntityRef, OrderingError, OrderingResult};
use crate::ordering::resolver::ScopeResolver;
use crate::ordering::scope::{OrderedEntity, Scope};
use crate::ordering::validate::{validate_batch, validate_move, validate_position, Assignment};
use crate::repo::ensure_connection_ready;
use crate::repo::sibling_repo::SqliteTaskSiblings;
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::service::{normalize_body, normalize_label};
use log::info;
use rusqlite::Connection;

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }
}

/// Task service facade.
pub struct TaskService<'conn> {
    conn: &'conn Connection,
    policy: RetryPolicy,
}

impl<'conn> TaskService<'conn> {
    /// Creates service over a migrated connection.
    pub fn try_new(conn: &'conn Connection, config: &CoreConfig) -> OrderingResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            policy: config.retry_policy(),
        })
    }

    /// Creates a task at `position`, or after all tasks when `None`.
    pub fn create_task(
        &self,
        project_id: EntityId,
        board_id: EntityId,
        input: NewTask,
        position: Option<i64>,
    ) -> OrderingResult<Task> {
        let title = normalize_label("title", input.title)?;
        let description = normalize_body(input.description);
        if let Some(position) = position {
            validate_position(None, position)?;
        }

        let scope = Scope::tasks_of(board_id);
        let task = run_scoped(self.conn, scope, &self.policy, "task_create", |tx| {
            let scope = ScopeResolver::new(tx).tasks_of(project_id, board_id)?;
            let siblings = SqliteTaskSiblings::new(tx);
            let engine = OrderingEngine::new(&siblings);
            let order = match position {
                Some(position) => engine.insert_at(scope, position)?,
                None => engine.append(scope)?,
            };
            Ok(SqliteTaskRepository::new(tx).insert_task(
                board_id,
                &title,
                description.as_deref(),
                order,
            )?)
        })?;

        info!(
            "event=task_create module=service status=ok scope={} task={} order={}",
            scope, task.uuid, task.sort_order
        );
        Ok(task)
    }

    pub fn get_task(
        &self,
        project_id: EntityId,
        board_id: EntityId,
        task_id: EntityId,
    ) -> OrderingResult<Task> {
        let resolver = ScopeResolver::new(self.conn);
        let scope = resolver.tasks_of(project_id, board_id)?;
        resolver.task_in(scope, task_id)
    }

    /// Lists the board's tasks in order.
    pub fn list_tasks(&self, project_id: EntityId, board_id: EntityId) -> OrderingResult<Vec<Task>> {
        ScopeResolver::new(self.conn).tasks_of(project_id, board_id)?;
        Ok(SqliteTaskRepository::new(self.conn).list_tasks(board_id)?)
    }

    /// Updates title and/or description. Order is untouched.
    pub fn update_task(
        &self,
        project_id: EntityId,
        board_id: EntityId,
        task_id: EntityId,
        patch: TaskPatch,
    ) -> OrderingResult<Task> {
        let patch = TaskPatch {
            title: patch
                .title
                .map(|title| normalize_label("title", title))
                .transpose()?,
            description: patch.description.map(normalize_body),
        };

        let scope = Scope::tasks_of(board_id);
        run_scoped(self.conn, scope, &self.policy, "task_update", |tx| {
            let resolver = ScopeResolver::new(tx);
            let scope = resolver.tasks_of(project_id, board_id)?;
            resolver.task_in(scope, task_id)?;
            let tasks = SqliteTaskRepository::new(tx);
            tasks.update_task(task_id, &patch)?;
            tasks
                .get_task(task_id)?
                .ok_or(OrderingError::NotFound(EntityRef::task(task_id)))
        })
    }

    /// Deletes a task, closing its slot among the board's tasks.
    pub fn delete_task(
        &self,
        project_id: EntityId,
        board_id: EntityId,
        task_id: EntityId,
    ) -> OrderingResult<()> {
        let scope = Scope::tasks_of(board_id);
        let vacated = run_scoped(self.conn, scope, &self.policy, "task_delete", |tx| {
            let resolver = ScopeResolver::new(tx);
            let scope = resolver.tasks_of(project_id, board_id)?;
            resolver.task_in(scope, task_id)?;
            let siblings = SqliteTaskSiblings::new(tx);
            let vacated = OrderingEngine::new(&siblings).remove_at(scope, task_id)?;
            SqliteTaskRepository::new(tx).delete_task(task_id)?;
            Ok(vacated)
        })?;

        info!(
            "event=task_delete module=service status=ok scope={} task={} order={}",
            scope, task_id, vacated
        );
        Ok(())
    }

    /// Moves a task within its board and returns its final order.
    pub fn move_task(
        &self,
        project_id: EntityId,
        board_id: EntityId,
        task_id: EntityId,
        position: i64,
    ) -> OrderingResult<u32> {
        validate_move(Assignment::new(task_id, position))?;
        let scope = Scope::tasks_of(board_id);
        let order = run_scoped(self.conn, scope, &self.policy, "task_move", |tx| {
            let resolver = ScopeResolver::new(tx);
            let scope = resolver.tasks_of(project_id, board_id)?;
            resolver.task_in(scope, task_id)?;
            let siblings = SqliteTaskSiblings::new(tx);
            OrderingEngine::new(&siblings).move_to(scope, task_id, position)
        })?;

        info!(
            "event=task_move module=service status=ok scope={} task={} order={}",
            scope, task_id, order
        );
        Ok(order)
    }

    /// Applies a drag-and-drop batch and returns the board's tasks in order.
    pub fn reorder_tasks(
        &self,
        project_id: EntityId,
        board_id: EntityId,
        assignments: &[Assignment],
    ) -> OrderingResult<Vec<OrderedEntity>> {
        validate_batch(assignments)?;
        let scope = Scope::tasks_of(board_id);
        let ordered = run_scoped(self.conn, scope, &self.policy, "task_reorder", |tx| {
            let scope = ScopeResolver::new(tx).tasks_of(project_id, board_id)?;
            let siblings = SqliteTaskSiblings::new(tx);
            OrderingEngine::new(&siblings).batch_reorder(scope, assignments)
        })?;

        info!(
            "event=task_reorder module=service status=ok scope={} assignments={}",
            scope,
            assignments.len()
        );
        Ok(ordered)
    }

    /// Moves a task to another board of the same project.
    ///
    /// Lands at `position` (clamped) or after all target tasks when `None`.
    /// A transfer to the source board degrades to [`TaskService::move_task`].
    pub fn transfer_task(
        &self,
        project_id: EntityId,
        from_board_id: EntityId,
        task_id: EntityId,
        to_board_id: EntityId,
        position: Option<i64>,
    ) -> OrderingResult<Task> {
        if let Some(position) = position {
            validate_position(Some(task_id), position)?;
        }

        if from_board_id == to_board_id {
            let position = position.unwrap_or(i64::MAX);
            self.move_task(project_id, from_board_id, task_id, position)?;
            return self.get_task(project_id, from_board_id, task_id);
        }

        let source = Scope::tasks_of(from_board_id);
        let task = run_scoped(self.conn, source, &self.policy, "task_transfer", |tx| {
            let resolver = ScopeResolver::new(tx);
            let source = resolver.tasks_of(project_id, from_board_id)?;
            let target = resolver.tasks_of(project_id, to_board_id)?;
            resolver.task_in(source, task_id)?;

            let siblings = SqliteTaskSiblings::new(tx);
            let engine = OrderingEngine::new(&siblings);
            engine.remove_at(source, task_id)?;
            let order = match position {
                Some(position) => engine.insert_at(target, position)?,
                None => engine.append(target)?,
            };

            let tasks = SqliteTaskRepository::new(tx);
            tasks.reparent_task(task_id, to_board_id, order)?;
            tasks
                .get_task(task_id)?
                .ok_or(OrderingError::NotFound(EntityRef::task(task_id)))
        })?;

        info!(
            "event=task_transfer module=service status=ok from_board={} to_board={} task={} order={}",
            from_board_id, to_board_id, task_id, task.sort_order
        );
        Ok(task)
    }
}
