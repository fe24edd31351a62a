//! Density maintenance across every scope.
//!
//! # Responsibility
//! - Report board/task scopes whose orders are not exactly `0..N-1`.
//! - Renumber such scopes, keeping their current relative order.
//!
//! # Invariants
//! - Each scope is repaired in its own transaction.
//! - Dense scopes are never rewritten.

use crate::config::CoreConfig;
use crate::db::tx::{run_scoped, RetryPolicy};
use crate::model::EntityKind;
use crate::ordering::density::{check_density, DensityReport};
use crate::ordering::engine::OrderingEngine;
use crate::ordering::error::OrderingResult;
use crate::ordering::scope::Scope;
use crate::repo::board_repo::{BoardRepository, SqliteBoardRepository};
use crate::repo::ensure_connection_ready;
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::sibling_repo::{SiblingRepository, SqliteBoardSiblings, SqliteTaskSiblings};
use log::{info, warn};
use rusqlite::Connection;

/// Outcome of [`MaintenanceService::repair_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Scopes that were renumbered.
    pub scopes: usize,
    /// Rows whose order changed.
    pub rows: usize,
}

/// Maintenance service facade.
pub struct MaintenanceService<'conn> {
    conn: &'conn Connection,
    policy: RetryPolicy,
}

impl<'conn> MaintenanceService<'conn> {
    /// Creates service over a migrated connection.
    pub fn try_new(conn: &'conn Connection, config: &CoreConfig) -> OrderingResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            policy: config.retry_policy(),
        })
    }

    /// Returns a report for every scope that violates density.
    pub fn check_all(&self) -> OrderingResult<Vec<DensityReport>> {
        let mut reports = Vec::new();
        for scope in self.all_scopes()? {
            let report = match scope.kind() {
                EntityKind::Task => check_scope(&SqliteTaskSiblings::new(self.conn), scope)?,
                EntityKind::Board | EntityKind::Project => {
                    check_scope(&SqliteBoardSiblings::new(self.conn), scope)?
                }
            };
            if !report.is_dense() {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Renumbers every non-dense scope.
    pub fn repair_all(&self) -> OrderingResult<RepairSummary> {
        let mut summary = RepairSummary::default();
        for report in self.check_all()? {
            let scope = report.scope;
            let rows = run_scoped(self.conn, scope, &self.policy, "scope_repair", |tx| {
                match scope.kind() {
                    EntityKind::Task => {
                        OrderingEngine::new(&SqliteTaskSiblings::new(tx)).normalize(scope)
                    }
                    EntityKind::Board | EntityKind::Project => {
                        OrderingEngine::new(&SqliteBoardSiblings::new(tx)).normalize(scope)
                    }
                }
            })?;
            warn!(
                "event=scope_repair module=service status=ok scope={} gaps={} duplicates={} rows={}",
                scope,
                report.gaps.len(),
                report.duplicates.len(),
                rows
            );
            summary.scopes += 1;
            summary.rows += rows;
        }

        info!(
            "event=repair_all module=service status=ok scopes={} rows={}",
            summary.scopes, summary.rows
        );
        Ok(summary)
    }

    fn all_scopes(&self) -> OrderingResult<Vec<Scope>> {
        let projects = SqliteProjectRepository::new(self.conn).list_projects()?;
        let boards = SqliteBoardRepository::new(self.conn);

        let mut scopes = Vec::new();
        for project in projects {
            scopes.push(Scope::boards_of(project.uuid));
            for board in boards.list_boards(project.uuid)? {
                scopes.push(Scope::tasks_of(board.uuid));
            }
        }
        Ok(scopes)
    }
}

fn check_scope<R: SiblingRepository>(repo: &R, scope: Scope) -> OrderingResult<DensityReport> {
    let snapshot = repo.list_orders(scope)?;
    Ok(check_density(scope, &snapshot))
}
