//! Sibling scopes and ordered-entity snapshots.

use crate::model::{EntityId, EntityKind};
use std::fmt::{Display, Formatter};

/// Identifies one sibling set: boards of a project, or tasks of a board.
///
/// Order values are only comparable inside the same scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    kind: EntityKind,
    parent_id: EntityId,
}

impl Scope {
    /// Boards owned by `project_id`.
    pub fn boards_of(project_id: EntityId) -> Self {
        Self {
            kind: EntityKind::Board,
            parent_id: project_id,
        }
    }

    /// Tasks owned by `board_id`.
    pub fn tasks_of(board_id: EntityId) -> Self {
        Self {
            kind: EntityKind::Task,
            parent_id: board_id,
        }
    }

    /// Kind of the ordered siblings.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn parent_id(&self) -> EntityId {
        self.parent_id
    }

    /// Kind of the record that owns this sibling set.
    pub fn parent_kind(&self) -> EntityKind {
        match self.kind {
            EntityKind::Task => EntityKind::Board,
            EntityKind::Board | EntityKind::Project => EntityKind::Project,
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s_of_{}:{}", self.kind, self.parent_kind(), self.parent_id)
    }
}

/// One sibling's position as read inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedEntity {
    pub id: EntityId,
    pub scope: Scope,
    pub order: u32,
}

/// Inclusive range of order values targeted by a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRange {
    pub start: u32,
    /// `None` means unbounded above.
    pub end: Option<u32>,
}

impl OrderRange {
    /// Every order `>= start`.
    pub fn from(start: u32) -> Self {
        Self { start, end: None }
    }

    /// Every order in `start..=end`.
    pub fn between(start: u32, end: u32) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn contains(&self, order: u32) -> bool {
        order >= self.start && self.end.map_or(true, |end| order <= end)
    }
}

/// A bulk order adjustment: every sibling whose order is in `range` moves by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub range: OrderRange,
    pub delta: i64,
}
