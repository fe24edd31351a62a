//! Domain records for projects, boards, and tasks.
//!
//! # Responsibility
//! - Define read models returned by repositories and services.
//! - Name the entity kinds that ordering scopes and errors refer to.
//!
//! # Invariants
//! - Every record is identified by a stable `EntityId`.
//! - `sort_order` on boards/tasks is relative to their parent only.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod board;
pub mod project;
pub mod task;

/// Stable identifier shared by every persisted record.
pub type EntityId = Uuid;

/// Persisted record category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Board,
    Task,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Board => "board",
            Self::Task => "task",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
