//! Typed outcomes for ordering, scope resolution, and the services above them.

use crate::db::DbError;
use crate::model::{EntityId, EntityKind};
use crate::ordering::scope::Scope;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by ordering operations and services.
pub type OrderingResult<T> = Result<T, OrderingError>;

/// Kind-qualified record reference used in error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn project(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Project,
            id,
        }
    }

    pub fn board(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Board,
            id,
        }
    }

    pub fn task(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Task,
            id,
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Malformed request detail. Always raised before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    /// Target position below zero.
    NegativePosition {
        entity_id: Option<EntityId>,
        position: i64,
    },
    /// Batch reorder without assignments.
    EmptyBatch,
    /// Two batch assignments target the same slot.
    DuplicatePosition(i64),
    /// One entity appears twice in a batch.
    DuplicateEntity(EntityId),
    /// Required text field is blank after normalization.
    BlankField(&'static str),
}

impl Display for InvalidArgument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativePosition {
                entity_id: Some(id),
                position,
            } => write!(f, "position {position} for {id} must not be negative"),
            Self::NegativePosition {
                entity_id: None,
                position,
            } => write!(f, "position {position} must not be negative"),
            Self::EmptyBatch => write!(f, "batch reorder requires at least one assignment"),
            Self::DuplicatePosition(position) => {
                write!(f, "batch assigns position {position} more than once")
            }
            Self::DuplicateEntity(id) => write!(f, "batch assigns {id} more than once"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
        }
    }
}

/// State disagreement between a request and persisted data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// Entity exists but belongs to a different parent than claimed.
    ScopeMismatch {
        entity: EntityRef,
        claimed_parent: EntityId,
        actual_parent: EntityId,
    },
    /// Sibling repository adapter does not serve the requested scope kind.
    KindMismatch {
        scope: Scope,
        repository: EntityKind,
    },
    /// Transaction kept hitting lock contention.
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
    },
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScopeMismatch {
                entity,
                claimed_parent,
                actual_parent,
            } => write!(
                f,
                "{entity} belongs to {actual_parent}, not claimed parent {claimed_parent}"
            ),
            Self::KindMismatch { scope, repository } => write!(
                f,
                "scope {scope} cannot be served by {repository} sibling repository"
            ),
            Self::RetriesExhausted {
                operation,
                attempts,
            } => write!(
                f,
                "{operation} gave up after {attempts} attempt(s) due to lock contention"
            ),
        }
    }
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    /// Storage failure other than lock contention.
    Storage,
}

impl ErrorKind {
    /// Stable code for transport layers.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

#[derive(Debug)]
pub enum OrderingError {
    /// Entity or scope parent does not exist.
    NotFound(EntityRef),
    InvalidArgument(InvalidArgument),
    Conflict(Conflict),
    /// Repository or SQLite failure.
    Repo(RepoError),
}

impl OrderingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }

    /// Returns whether retrying the whole transaction may succeed.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Repo(err) => err.is_busy(),
            _ => false,
        }
    }
}

impl Display for OrderingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::InvalidArgument(detail) => write!(f, "invalid argument: {detail}"),
            Self::Conflict(detail) => write!(f, "conflict: {detail}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrderingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidArgument(_) => None,
            Self::Conflict(_) => None,
        }
    }
}

impl From<InvalidArgument> for OrderingError {
    fn from(value: InvalidArgument) -> Self {
        Self::InvalidArgument(value)
    }
}

impl From<Conflict> for OrderingError {
    fn from(value: Conflict) -> Self {
        Self::Conflict(value)
    }
}

impl From<RepoError> for OrderingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound(EntityRef { kind, id }),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for OrderingError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for OrderingError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::Db(DbError::Sqlite(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::{Conflict, EntityRef, ErrorKind, InvalidArgument, OrderingError};
    use uuid::Uuid;

    #[test]
    fn kinds_map_to_stable_codes() {
        let not_found = OrderingError::NotFound(EntityRef::board(Uuid::new_v4()));
        let invalid = OrderingError::from(InvalidArgument::EmptyBatch);
        let conflict = OrderingError::from(Conflict::RetriesExhausted {
            operation: "board_move",
            attempts: 3,
        });

        assert_eq!(not_found.kind().code(), "not_found");
        assert_eq!(invalid.kind(), ErrorKind::InvalidArgument);
        assert_eq!(conflict.kind().code(), "conflict");
        assert!(!conflict.is_busy());
    }
}
