//! Task record, ordered among the tasks of one board.

use crate::model::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: EntityId,
    /// Owning board; defines the task's ordering scope.
    pub board_uuid: EntityId,
    pub title: String,
    /// Free-form body. `None` when the task has no description.
    pub description: Option<String>,
    /// Dense position among the board's tasks.
    pub sort_order: u32,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Field changes applied by a task update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}
