//! Reorder request validation.
//!
//! # Responsibility
//! - Reject malformed single-move and batch requests before any write.
//! - Normalize accepted positions into non-negative slots.
//!
//! # Invariants
//! - Positions above the scope size are accepted here; the engine clamps them.
//! - Accepted batches are sorted by ascending target position.

use crate::model::EntityId;
use crate::ordering::error::{InvalidArgument, OrderingResult};
use std::collections::HashSet;

/// Caller-supplied target position for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub entity_id: EntityId,
    pub position: i64,
}

impl Assignment {
    pub fn new(entity_id: EntityId, position: i64) -> Self {
        Self {
            entity_id,
            position,
        }
    }
}

/// Assignment whose position passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidAssignment {
    pub entity_id: EntityId,
    pub position: u32,
}

/// Validates one requested position.
///
/// Positions beyond `u32::MAX` saturate; they clamp to the last slot later.
pub fn validate_position(entity_id: Option<EntityId>, position: i64) -> OrderingResult<u32> {
    if position < 0 {
        return Err(InvalidArgument::NegativePosition {
            entity_id,
            position,
        }
        .into());
    }
    Ok(u32::try_from(position).unwrap_or(u32::MAX))
}

/// Validates a single-move request.
pub fn validate_move(assignment: Assignment) -> OrderingResult<ValidAssignment> {
    let position = validate_position(Some(assignment.entity_id), assignment.position)?;
    Ok(ValidAssignment {
        entity_id: assignment.entity_id,
        position,
    })
}

/// Validates a batch request and returns it in ascending position order.
///
/// # Errors
/// - `EmptyBatch` when `assignments` is empty.
/// - `NegativePosition` for any position below zero.
/// - `DuplicatePosition` when two assignments target the same slot.
/// - `DuplicateEntity` when one entity is assigned twice.
pub fn validate_batch(assignments: &[Assignment]) -> OrderingResult<Vec<ValidAssignment>> {
    if assignments.is_empty() {
        return Err(InvalidArgument::EmptyBatch.into());
    }

    let mut positions = HashSet::with_capacity(assignments.len());
    let mut entities = HashSet::with_capacity(assignments.len());
    let mut accepted = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let valid = validate_move(*assignment)?;
        // Compare requested values; saturation would merge distinct oversized slots.
        if !positions.insert(assignment.position) {
            return Err(InvalidArgument::DuplicatePosition(assignment.position).into());
        }
        if !entities.insert(valid.entity_id) {
            return Err(InvalidArgument::DuplicateEntity(valid.entity_id).into());
        }
        accepted.push((assignment.position, valid));
    }

    accepted.sort_by_key(|(requested, _)| *requested);
    Ok(accepted.into_iter().map(|(_, valid)| valid).collect())
}
