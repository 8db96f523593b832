use chrono::NaiveDate;
use portal_core::calendar::{MonthCursor, MonthView, project_month};
use portal_core::model::{CompletionMap, Day, RoutineStore, SlotId, StudentRoster};
use portal_core::toggle::{CounterAdjustment, toggle_completion};
use storage::repository::{Documents, StorageError};

use crate::Clock;
use crate::error::TimetableError;

/// The documents the calendar page works from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetableSnapshot {
    pub routine: RoutineStore,
    pub completions: CompletionMap,
    pub students: StudentRoster,
}

impl TimetableSnapshot {
    /// Load all three documents from the store.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub async fn load(documents: &Documents) -> Result<Self, StorageError> {
        Ok(Self {
            routine: documents.routine().await?,
            completions: documents.completed_tasks().await?,
            students: documents.students().await?,
        })
    }
}

/// Outcome of a committed completion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub completed: bool,
    pub counter: CounterAdjustment,
}

/// One user's view of the timetable, holding a local snapshot.
///
/// Toggles read the stored documents, update the snapshot optimistically and
/// then persist it. If a write fails the snapshot is replaced by whatever the
/// store holds, so no half-applied state survives locally.
pub struct TimetableSession {
    clock: Clock,
    documents: Documents,
    snapshot: TimetableSnapshot,
}

impl TimetableSession {
    /// Open a session by loading the current documents.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Storage` if the initial load fails.
    pub async fn open(clock: Clock, documents: Documents) -> Result<Self, TimetableError> {
        let snapshot = TimetableSnapshot::load(&documents).await?;
        Ok(Self {
            clock,
            documents,
            snapshot,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> &TimetableSnapshot {
        &self.snapshot
    }

    /// Replace the local snapshot with the stored documents.
    ///
    /// The local snapshot is kept if the load fails.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Storage` if any document cannot be read.
    pub async fn reload(&mut self) -> Result<(), TimetableError> {
        self.snapshot = TimetableSnapshot::load(&self.documents).await?;
        Ok(())
    }

    /// Project a month from the local snapshot.
    #[must_use]
    pub fn month_view(&self, month: MonthCursor) -> MonthView {
        project_month(&self.snapshot.routine, &self.snapshot.completions, month)
    }

    /// Project the month containing today's date.
    #[must_use]
    pub fn current_month_view(&self) -> MonthView {
        self.month_view(MonthCursor::containing(self.clock.today()))
    }

    /// Project a month given as raw numbers.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Calendar` for an out-of-range month or year.
    pub fn month_view_for(&self, year: i32, month: u32) -> Result<MonthView, TimetableError> {
        Ok(self.month_view(MonthCursor::new(year, month)?))
    }

    /// Flip completion of a slot on one date and persist both documents.
    ///
    /// The three documents are re-read from the store first, so edits made
    /// elsewhere since the session opened are carried into the write. The
    /// slot is resolved against the routine for the date's weekday. A slot
    /// that is not scheduled that day is ignored and `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Storage` if the read or either write fails.
    /// After a failed write the snapshot has been reloaded from the store.
    pub async fn toggle(
        &mut self,
        date: NaiveDate,
        slot_id: &SlotId,
    ) -> Result<Option<ToggleOutcome>, TimetableError> {
        let current = TimetableSnapshot::load(&self.documents).await?;
        let weekday = Day::of(date);
        let Some(student) = current
            .routine
            .find_slot(weekday, slot_id)
            .map(|slot| slot.student().to_string())
        else {
            tracing::warn!(%date, %weekday, %slot_id, "toggle ignored: slot not scheduled that day");
            self.snapshot = current;
            return Ok(None);
        };

        let toggled = toggle_completion(
            &current.completions,
            date,
            slot_id,
            &student,
            &current.students,
        );
        self.snapshot = TimetableSnapshot {
            routine: current.routine.clone(),
            completions: toggled.completions,
            students: toggled.students,
        };

        if let Err(err) = self.commit(&current).await {
            tracing::warn!(%date, %slot_id, error = %err, "toggle not saved; reverting");
            self.revert(current).await;
            return Err(err.into());
        }

        Ok(Some(ToggleOutcome {
            completed: toggled.completed,
            counter: toggled.counter,
        }))
    }

    async fn commit(&self, previous: &TimetableSnapshot) -> Result<(), StorageError> {
        self.documents
            .save_completed_tasks(&self.snapshot.completions)
            .await?;
        if self.snapshot.students == previous.students {
            return Ok(());
        }
        if let Err(err) = self.documents.save_students(&self.snapshot.students).await {
            // Undo the completion write so the two documents stay in step.
            if let Err(undo) = self
                .documents
                .save_completed_tasks(&previous.completions)
                .await
            {
                tracing::warn!(error = %undo, "could not restore completion map");
            }
            return Err(err);
        }
        Ok(())
    }

    async fn revert(&mut self, previous: TimetableSnapshot) {
        match TimetableSnapshot::load(&self.documents).await {
            Ok(stored) => self.snapshot = stored,
            Err(err) => {
                tracing::warn!(error = %err, "reload failed; keeping last known-good snapshot");
                self.snapshot = previous;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveTime};
    use portal_core::model::{SlotDraft, Student};
    use portal_core::time::fixed_clock;
    use storage::repository::Storage;

    async fn seeded() -> Documents {
        let documents = Storage::in_memory().documents;
        let slot = SlotDraft {
            start: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            subject: "Math".into(),
            student: "Alice".into(),
        }
        .validate(SlotId::new("s1"))
        .unwrap();
        documents
            .save_routine(&RoutineStore::new().add_slot(Day::Monday, slot))
            .await
            .unwrap();
        let roster: StudentRoster = [Student::new("Alice", 30).unwrap()].into_iter().collect();
        documents.save_students(&roster).await.unwrap();
        documents
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn toggle_persists_both_documents() {
        let documents = seeded().await;
        let mut session = TimetableSession::open(fixed_clock(), documents.clone())
            .await
            .unwrap();

        let outcome = session
            .toggle(date(4), &SlotId::new("s1"))
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.counter, CounterAdjustment::Incremented);

        let stored = TimetableSnapshot::load(&documents).await.unwrap();
        assert_eq!(&stored, session.snapshot());
        assert!(stored.completions.is_completed(date(4), &SlotId::new("s1")));
        assert_eq!(stored.students.get("Alice").unwrap().total_completed(), 1);
    }

    #[tokio::test]
    async fn toggle_on_unscheduled_weekday_is_ignored() {
        let documents = seeded().await;
        let mut session = TimetableSession::open(fixed_clock(), documents)
            .await
            .unwrap();
        let before = session.snapshot().clone();

        // 2024-03-05 is a Tuesday.
        let outcome = session.toggle(date(5), &SlotId::new("s1")).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(session.snapshot(), &before);
    }

    #[tokio::test]
    async fn toggle_keeps_roster_edits_made_after_open() {
        let documents = seeded().await;
        let mut session = TimetableSession::open(fixed_clock(), documents.clone())
            .await
            .unwrap();

        let mut roster = documents.students().await.unwrap();
        roster.get_mut("Alice").unwrap().set_total_completed(45);
        roster.insert(Student::new("Bob", 10).unwrap()).unwrap();
        documents.save_students(&roster).await.unwrap();

        session
            .toggle(date(4), &SlotId::new("s1"))
            .await
            .unwrap()
            .unwrap();

        let stored = documents.students().await.unwrap();
        assert_eq!(stored.get("Alice").unwrap().total_completed(), 46);
        assert!(stored.get("Bob").is_some());
        assert_eq!(session.snapshot().students, stored);
    }

    #[tokio::test]
    async fn current_month_follows_advanced_clock() {
        let mut clock = fixed_clock();
        clock.advance(Duration::days(28));
        let session = TimetableSession::open(clock, seeded().await)
            .await
            .unwrap();
        let view = session.current_month_view();
        assert_eq!((view.month.year(), view.month.month()), (2024, 4));
        assert_eq!(view.days().count(), 30);
    }

    #[tokio::test]
    async fn current_month_follows_clock() {
        let session = TimetableSession::open(fixed_clock(), seeded().await)
            .await
            .unwrap();
        let view = session.current_month_view();
        assert_eq!((view.month.year(), view.month.month()), (2024, 3));
        assert_eq!(view.days().count(), 31);
        assert!(session.month_view_for(2024, 13).is_err());
    }
}
