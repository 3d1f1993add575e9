//! Storage ports.
//!
//! One trait per entity family. Every method is tenant-scoped: an entity of
//! another tenant is reported exactly like a missing one. Writes of versioned
//! documents are conditional on the version the caller read; the store bumps
//! the version on success and answers [`RepositoryError::VersionConflict`]
//! otherwise.
//!
//! Queries are deliberately coarse (tenant + room/category/status). Date
//! overlap and ordering happen in [`crate::availability::PostQueryFilter`].

mod audits;
mod deposits;
mod folios;
mod overbooking;
mod rooms;
mod stays;

use innkeep_shared::AppError;
use thiserror::Error;

pub use audits::{NightAuditRepository, ShiftRepository, SmartAlertRepository};
pub use deposits::DepositRepository;
pub use folios::{FolioQuery, FolioRepository};
pub use overbooking::{AlertQuery, OverbookingRepository};
pub use rooms::RoomRepository;
pub use stays::{RoomGuard, RoomStays, StayQuery, StayRepository, StayWrite};

/// Result type for repository calls.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Entity missing (or owned by another tenant).
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Conditional write lost against a concurrent writer.
    #[error("{entity} {id} was modified concurrently")]
    VersionConflict {
        /// Entity kind.
        entity: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Insert collided with a unique key.
    #[error("{entity} {id} already exists")]
    AlreadyExists {
        /// Entity kind.
        entity: &'static str,
        /// Conflicting key.
        id: String,
    },

    /// Backend failure (connection, serialization, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Builds a `NotFound` error.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a `VersionConflict` error.
    pub fn version_conflict(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::VersionConflict {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds an `AlreadyExists` error.
    pub fn already_exists(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true when re-reading and retrying may succeed.
    #[must_use]
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::VersionConflict { .. } => "CONCURRENT_MODIFICATION",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Backend(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::VersionConflict { .. } | Self::AlreadyExists { .. } => 409,
            Self::Backend(_) => 500,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepositoryError::VersionConflict { .. } | RepositoryError::AlreadyExists { .. } => {
                Self::Conflict(err.to_string())
            }
            RepositoryError::Backend(msg) => Self::Database(msg),
        }
    }
}
