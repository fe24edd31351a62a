//! Core domain logic for the task board.
//! This crate is the single source of truth for sibling ordering invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::tx::RetryPolicy;
pub use db::{
    open_db, open_db_in_memory, open_db_with_config, open_existing_db_with_config, DbError,
};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::board::Board;
pub use model::project::Project;
pub use model::task::{Task, TaskPatch};
pub use model::{EntityId, EntityKind};
pub use ordering::{
    Assignment, Conflict, DensityReport, EntityRef, ErrorKind, InvalidArgument, OrderedEntity,
    OrderingEngine, OrderingError, OrderingResult, Scope, ScopeResolver,
};
pub use repo::{RepoError, RepoResult};
pub use service::board_service::BoardService;
pub use service::maintenance_service::{MaintenanceService, RepairSummary};
pub use service::project_service::ProjectService;
pub use service::task_service::{NewTask, TaskService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
