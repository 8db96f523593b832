use storage::repository::{Documents, Storage};

use crate::Clock;
use crate::error::{AppServicesError, TimetableError};
use crate::routine_service::RoutineService;
use crate::student_service::StudentService;
use crate::timetable::TimetableSession;

/// Assembles app-facing services over one document store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    documents: Documents,
    routine: RoutineService,
    students: StudentService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        let documents = storage.documents;
        Self {
            clock,
            routine: RoutineService::new(clock, documents.clone()),
            students: StudentService::new(documents.clone()),
            documents,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    #[must_use]
    pub fn routine(&self) -> &RoutineService {
        &self.routine
    }

    #[must_use]
    pub fn students(&self) -> &StudentService {
        &self.students
    }

    /// Open a timetable session over the current documents.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Storage` if the initial load fails.
    pub async fn open_timetable(&self) -> Result<TimetableSession, TimetableError> {
        TimetableSession::open(self.clock, self.documents.clone()).await
    }
}
