//! Ordered-sibling positioning.
//!
//! # Responsibility
//! - Keep a dense, collision-free `sort_order` among the boards of a project
//!   and the tasks of a board.
//! - Resolve and validate requests before any order value is written.
//!
//! # Invariants
//! - A scope with N siblings holds exactly the orders `0..N-1` between
//!   committed operations.
//! - Orders from different scopes are never compared.

pub mod density;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod scope;
pub mod validate;

pub use density::{check_density, DensityReport};
pub use engine::OrderingEngine;
pub use error::{Conflict, EntityRef, ErrorKind, InvalidArgument, OrderingError, OrderingResult};
pub use resolver::ScopeResolver;
pub use scope::{OrderRange, OrderedEntity, Scope, Shift};
pub use validate::{validate_batch, validate_move, Assignment, ValidAssignment};
