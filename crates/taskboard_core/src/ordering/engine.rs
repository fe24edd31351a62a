//! Ordered-sibling positioning engine.
//!
//! # Responsibility
//! - Compute the shifts that keep one scope's orders dense.
//! - Write those shifts through a [`SiblingRepository`] bound to the
//!   caller's transaction.
//!
//! # Invariants
//! - Before and after every operation a scope of N siblings holds exactly the
//!   orders `0..N-1`.
//! - Every precondition (scope, membership, arguments) is checked before the
//!   first write, so a failed call leaves nothing to roll back.
//! - The engine never opens or commits transactions itself.

use crate::model::EntityId;
use crate::ordering::density::check_density;
use crate::ordering::error::{Conflict, EntityRef, OrderingError, OrderingResult};
use crate::ordering::scope::{OrderRange, OrderedEntity, Scope, Shift};
use crate::ordering::validate::{validate_batch, validate_move, validate_position, Assignment};
use crate::repo::sibling_repo::SiblingRepository;
use log::{debug, warn};
use std::collections::HashMap;

/// Shift that opens slot `position` in a scope of `count` siblings.
///
/// Returns `None` when inserting at the end.
pub fn plan_insert(position: u32, count: u32) -> Option<Shift> {
    if position >= count {
        return None;
    }
    Some(Shift {
        range: OrderRange::from(position),
        delta: 1,
    })
}

/// Shift that closes the slot vacated by a sibling at `order`.
pub fn plan_remove(order: u32) -> Shift {
    Shift {
        range: OrderRange::from(order.saturating_add(1)),
        delta: -1,
    }
}

/// Shift applied to the other siblings when one moves from `current` to `target`.
///
/// Moving up the list pushes `[target, current-1]` down by one slot; moving
/// down pulls `[current+1, target]` up by one. Returns `None` for a no-op.
pub fn plan_move(current: u32, target: u32) -> Option<Shift> {
    if target < current {
        Some(Shift {
            range: OrderRange::between(target, current - 1),
            delta: 1,
        })
    } else if target > current {
        Some(Shift {
            range: OrderRange::between(current + 1, target),
            delta: -1,
        })
    } else {
        None
    }
}

/// Ordering operations over one repository adapter.
pub struct OrderingEngine<'r, R: SiblingRepository + ?Sized> {
    repo: &'r R,
}

impl<'r, R: SiblingRepository + ?Sized> OrderingEngine<'r, R> {
    /// Binds the engine to a repository already scoped to a transaction.
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Returns the order for a new sibling placed after all others.
    ///
    /// The caller persists the new row with the returned order.
    pub fn append(&self, scope: Scope) -> OrderingResult<u32> {
        self.ensure_scope(scope)?;
        let count = self.repo.count_siblings(scope)?;
        debug!(
            "event=order_append module=ordering status=ok scope={} order={}",
            scope, count
        );
        Ok(count)
    }

    /// Opens a slot at `position` (clamped to `[0, N]`) and returns it.
    ///
    /// The caller persists the new row with the returned order.
    pub fn insert_at(&self, scope: Scope, position: i64) -> OrderingResult<u32> {
        let requested = validate_position(None, position)?;
        self.ensure_scope(scope)?;
        let count = self.repo.count_siblings(scope)?;
        let order = requested.min(count);

        let affected = match plan_insert(order, count) {
            Some(shift) => self.apply(scope, shift)?,
            None => 0,
        };
        debug!(
            "event=order_insert module=ordering status=ok scope={} order={} shifted={}",
            scope, order, affected
        );
        Ok(order)
    }

    /// Closes the slot of `entity_id` and returns the order it held.
    ///
    /// The caller deletes (or re-parents) the row in the same transaction.
    pub fn remove_at(&self, scope: Scope, entity_id: EntityId) -> OrderingResult<u32> {
        self.ensure_scope(scope)?;
        let snapshot = self.snapshot(scope)?;
        let current = self.locate(scope, &snapshot, entity_id)?;

        let affected = self.apply(scope, plan_remove(current.order))?;
        debug!(
            "event=order_remove module=ordering status=ok scope={} entity={} order={} shifted={}",
            scope, entity_id, current.order, affected
        );
        Ok(current.order)
    }

    /// Moves `entity_id` to `position` (clamped to `[0, N-1]`) within its scope.
    ///
    /// Returns the entity's final order.
    pub fn move_to(&self, scope: Scope, entity_id: EntityId, position: i64) -> OrderingResult<u32> {
        let requested = validate_move(Assignment::new(entity_id, position))?.position;
        self.ensure_scope(scope)?;
        let snapshot = self.snapshot(scope)?;
        let current = self.locate(scope, &snapshot, entity_id)?.order;
        let last = (snapshot.len() as u32).saturating_sub(1);
        let target = requested.min(last);

        let Some(shift) = plan_move(current, target) else {
            debug!(
                "event=order_move module=ordering status=noop scope={} entity={} order={}",
                scope, entity_id, current
            );
            return Ok(current);
        };

        let affected = self.apply(scope, shift)?;
        self.write_order(scope, entity_id, target)?;
        debug!(
            "event=order_move module=ordering status=ok scope={} entity={} from={} to={} shifted={}",
            scope, entity_id, current, target, affected
        );
        Ok(target)
    }

    /// Applies many moves as one logical operation.
    ///
    /// Assignments are applied in ascending target order, each against the
    /// state left by the previous one. Siblings not named keep their relative
    /// order. Returns the full scope in its final order.
    pub fn batch_reorder(
        &self,
        scope: Scope,
        assignments: &[Assignment],
    ) -> OrderingResult<Vec<OrderedEntity>> {
        let accepted = validate_batch(assignments)?;
        self.ensure_scope(scope)?;
        let snapshot = self.snapshot(scope)?;
        for assignment in &accepted {
            self.locate(scope, &snapshot, assignment.entity_id)?;
        }

        let mut sequence = snapshot.iter().map(|entity| entity.id).collect::<Vec<_>>();
        let last = sequence.len().saturating_sub(1);
        for assignment in &accepted {
            let Some(from) = sequence.iter().position(|id| *id == assignment.entity_id) else {
                return Err(OrderingError::NotFound(EntityRef {
                    kind: scope.kind(),
                    id: assignment.entity_id,
                }));
            };
            let id = sequence.remove(from);
            let to = (assignment.position as usize).min(last);
            sequence.insert(to, id);
        }

        let written = self.write_sequence(scope, &snapshot, &sequence)?;
        debug!(
            "event=order_batch module=ordering status=ok scope={} assignments={} written={}",
            scope,
            accepted.len(),
            written
        );
        Ok(to_entities(scope, &sequence))
    }

    /// Rewrites the scope's orders to `0..N-1`, keeping the current
    /// `(order, id)` sequence. Returns the number of rows changed.
    pub fn normalize(&self, scope: Scope) -> OrderingResult<usize> {
        self.ensure_scope(scope)?;
        let snapshot = self.snapshot(scope)?;
        let sequence = snapshot.iter().map(|entity| entity.id).collect::<Vec<_>>();
        let written = self.write_sequence(scope, &snapshot, &sequence)?;
        debug!(
            "event=order_normalize module=ordering status=ok scope={} written={}",
            scope, written
        );
        Ok(written)
    }

    /// Reads the scope sorted by `(order, id)`, warning when it is not dense.
    pub fn snapshot(&self, scope: Scope) -> OrderingResult<Vec<OrderedEntity>> {
        let mut entities = self.repo.list_orders(scope)?;
        entities.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));

        let report = check_density(scope, &entities);
        if !report.is_dense() {
            warn!(
                "event=order_density module=ordering status=violated scope={} count={} gaps={} duplicates={}",
                scope,
                report.count,
                report.gaps.len(),
                report.duplicates.len()
            );
        }
        Ok(entities)
    }

    fn ensure_scope(&self, scope: Scope) -> OrderingResult<()> {
        if self.repo.kind() != scope.kind() {
            return Err(Conflict::KindMismatch {
                scope,
                repository: self.repo.kind(),
            }
            .into());
        }
        if !self.repo.scope_exists(scope)? {
            return Err(OrderingError::NotFound(EntityRef {
                kind: scope.parent_kind(),
                id: scope.parent_id(),
            }));
        }
        Ok(())
    }

    fn locate(
        &self,
        scope: Scope,
        snapshot: &[OrderedEntity],
        entity_id: EntityId,
    ) -> OrderingResult<OrderedEntity> {
        if let Some(entity) = snapshot.iter().find(|entity| entity.id == entity_id) {
            return Ok(*entity);
        }

        let entity = EntityRef {
            kind: scope.kind(),
            id: entity_id,
        };
        match self.repo.parent_of(entity_id)? {
            None => Err(OrderingError::NotFound(entity)),
            Some(actual_parent) => Err(Conflict::ScopeMismatch {
                entity,
                claimed_parent: scope.parent_id(),
                actual_parent,
            }
            .into()),
        }
    }

    fn apply(&self, scope: Scope, shift: Shift) -> OrderingResult<usize> {
        Ok(self.repo.shift_orders(scope, shift.range, shift.delta)?)
    }

    fn write_order(&self, scope: Scope, entity_id: EntityId, order: u32) -> OrderingResult<()> {
        if self.repo.set_order(scope, entity_id, order)? == 0 {
            return Err(OrderingError::NotFound(EntityRef {
                kind: scope.kind(),
                id: entity_id,
            }));
        }
        Ok(())
    }

    fn write_sequence(
        &self,
        scope: Scope,
        snapshot: &[OrderedEntity],
        sequence: &[EntityId],
    ) -> OrderingResult<usize> {
        let previous = snapshot
            .iter()
            .map(|entity| (entity.id, entity.order))
            .collect::<HashMap<_, _>>();

        let mut written = 0;
        for (index, id) in sequence.iter().enumerate() {
            let order = index as u32;
            if previous.get(id) == Some(&order) {
                continue;
            }
            self.write_order(scope, *id, order)?;
            written += 1;
        }
        Ok(written)
    }
}

fn to_entities(scope: Scope, sequence: &[EntityId]) -> Vec<OrderedEntity> {
    sequence
        .iter()
        .enumerate()
        .map(|(index, id)| OrderedEntity {
            id: *id,
            scope,
            order: index as u32,
        })
        .collect()
}
