//! Board record, ordered among the boards of one project.

use crate::model::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub uuid: EntityId,
    /// Owning project; defines the board's ordering scope.
    pub project_uuid: EntityId,
    pub title: String,
    /// Dense position among the project's boards.
    pub sort_order: u32,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}
