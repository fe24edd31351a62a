//! Project use-case service.
//!
//! # Responsibility
//! - Create, rename, list, and delete projects (the parents of board scopes).
//!
//! # Invariants
//! - Project names are non-blank after normalization.
//! - Deleting a project removes whole scopes, so no sibling shifting is needed.

use crate::config::CoreConfig;
use crate::db::tx::{run_in_transaction, RetryPolicy};
use crate::model::project::Project;
use crate::model::EntityId;
use crate::ordering::error::{EntityRef, OrderingError, OrderingResult};
use crate::repo::ensure_connection_ready;
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::service::normalize_label;
use log::info;
use rusqlite::Connection;

const TARGET: &str = "projects";

/// Project service facade.
pub struct ProjectService<'conn> {
    conn: &'conn Connection,
    policy: RetryPolicy,
}

impl<'conn> ProjectService<'conn> {
    /// Creates service over a migrated connection.
    pub fn try_new(conn: &'conn Connection, config: &CoreConfig) -> OrderingResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            policy: config.retry_policy(),
        })
    }

    pub fn create_project(&self, name: impl Into<String>) -> OrderingResult<Project> {
        let name = normalize_label("name", name.into())?;
        let project = run_in_transaction(self.conn, &TARGET, &self.policy, "project_create", |tx| {
            Ok(SqliteProjectRepository::new(tx).create_project(&name)?)
        })?;
        info!(
            "event=project_create module=service status=ok project={}",
            project.uuid
        );
        Ok(project)
    }

    pub fn get_project(&self, project_id: EntityId) -> OrderingResult<Project> {
        SqliteProjectRepository::new(self.conn)
            .get_project(project_id)?
            .ok_or(OrderingError::NotFound(EntityRef::project(project_id)))
    }

    /// Lists projects by creation time.
    pub fn list_projects(&self) -> OrderingResult<Vec<Project>> {
        Ok(SqliteProjectRepository::new(self.conn).list_projects()?)
    }

    pub fn rename_project(
        &self,
        project_id: EntityId,
        name: impl Into<String>,
    ) -> OrderingResult<()> {
        let name = normalize_label("name", name.into())?;
        run_in_transaction(self.conn, &TARGET, &self.policy, "project_rename", |tx| {
            Ok(SqliteProjectRepository::new(tx).rename_project(project_id, &name)?)
        })
    }

    /// Deletes a project with all of its boards and tasks.
    pub fn delete_project(&self, project_id: EntityId) -> OrderingResult<()> {
        run_in_transaction(self.conn, &TARGET, &self.policy, "project_delete", |tx| {
            Ok(SqliteProjectRepository::new(tx).delete_project(project_id)?)
        })?;
        info!(
            "event=project_delete module=service status=ok project={}",
            project_id
        );
        Ok(())
    }
}
