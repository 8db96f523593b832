//! Shared error types for the services crate.

use thiserror::Error;

use portal_core::calendar::CalendarError;
use portal_core::model::{SlotError, StudentError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `RoutineService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoutineServiceError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StudentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudentServiceError {
    #[error(transparent)]
    Student(#[from] StudentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the timetable session and calendar queries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimetableError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RoutineServiceError {
    /// True for persistence failures the user can retry.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_io())
    }
}

impl StudentServiceError {
    /// True for persistence failures the user can retry.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_io())
    }
}

impl TimetableError {
    /// True for persistence failures the user can retry.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_io())
    }
}
