//! Retried write transactions for ordering operations.
//!
//! # Responsibility
//! - Run one read-compute-write body under SQLite's writer lock.
//! - Retry the whole body from a fresh snapshot on lock contention.
//!
//! # Invariants
//! - Transactions start with `BEGIN IMMEDIATE`, so two bodies touching the
//!   same scope never interleave.
//! - A body that fails is rolled back before the error is returned or retried.
//! - Non-contention errors are returned unchanged without retry.

use crate::ordering::error::{Conflict, OrderingResult};
use crate::ordering::scope::Scope;
use log::{debug, error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::Display;
use std::time::{Duration, Instant};

/// Bounded retry policy for transaction contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause before each retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(25),
        }
    }
}

/// Runs `body` inside an immediate transaction and commits it.
///
/// `target` only labels log events (usually a [`Scope`]).
///
/// # Errors
/// - `Conflict::RetriesExhausted` when every attempt hit `BUSY`/`LOCKED`.
/// - Any other error from `body` or SQLite, after rollback.
pub fn run_in_transaction<T>(
    conn: &Connection,
    target: &dyn Display,
    policy: &RetryPolicy,
    operation: &'static str,
    mut body: impl FnMut(&Transaction<'_>) -> OrderingResult<T>,
) -> OrderingResult<T> {
    let max_attempts = policy.max_attempts.max(1);
    let started_at = Instant::now();

    for attempt in 1..=max_attempts {
        match attempt_once(conn, &mut body) {
            Ok(value) => {
                debug!(
                    "event=tx_commit module=db status=ok op={} target={} attempt={} duration_ms={}",
                    operation,
                    target,
                    attempt,
                    started_at.elapsed().as_millis()
                );
                return Ok(value);
            }
            Err(err) if err.is_busy() => {
                warn!(
                    "event=tx_commit module=db status=retry op={} target={} attempt={} max_attempts={}",
                    operation, target, attempt, max_attempts
                );
                if attempt < max_attempts && !policy.backoff.is_zero() {
                    std::thread::sleep(policy.backoff);
                }
            }
            Err(err) => {
                debug!(
                    "event=tx_commit module=db status=rollback op={} target={} attempt={} error_code={}",
                    operation,
                    target,
                    attempt,
                    err.kind().code()
                );
                return Err(err);
            }
        }
    }

    error!(
        "event=tx_commit module=db status=error op={} target={} attempts={} error_code=retries_exhausted",
        operation, target, max_attempts
    );
    Err(Conflict::RetriesExhausted {
        operation,
        attempts: max_attempts,
    }
    .into())
}

/// Convenience wrapper labelling events with the ordering scope.
pub fn run_scoped<T>(
    conn: &Connection,
    scope: Scope,
    policy: &RetryPolicy,
    operation: &'static str,
    body: impl FnMut(&Transaction<'_>) -> OrderingResult<T>,
) -> OrderingResult<T> {
    run_in_transaction(conn, &scope, policy, operation, body)
}

fn attempt_once<T>(
    conn: &Connection,
    body: &mut impl FnMut(&Transaction<'_>) -> OrderingResult<T>,
) -> OrderingResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    // Dropping `tx` on the error path rolls it back.
    let value = body(&tx)?;
    tx.commit()?;
    Ok(value)
}
