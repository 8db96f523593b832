use portal_core::model::{Day, RoutineStore, SlotDraft, SlotField, SlotId};
use storage::repository::Documents;

use crate::Clock;
use crate::error::RoutineServiceError;

/// Read-modify-write editing of the weekly routine document.
///
/// Each call loads the whole routine, applies one change, and saves it back.
/// Concurrent editors are not reconciled; the last save wins.
#[derive(Clone)]
pub struct RoutineService {
    clock: Clock,
    documents: Documents,
}

impl RoutineService {
    #[must_use]
    pub fn new(clock: Clock, documents: Documents) -> Self {
        Self { clock, documents }
    }

    /// Load the current routine.
    ///
    /// # Errors
    ///
    /// Returns `RoutineServiceError::Storage` if the routine cannot be read.
    pub async fn load(&self) -> Result<RoutineStore, RoutineServiceError> {
        Ok(self.documents.routine().await?)
    }

    /// Validate a draft, give it a fresh id, and append it to `day`.
    ///
    /// # Errors
    ///
    /// Returns `RoutineServiceError::Slot` for validation failures.
    /// Returns `RoutineServiceError::Storage` if persistence fails.
    pub async fn add_slot(&self, day: Day, draft: SlotDraft) -> Result<SlotId, RoutineServiceError> {
        let slot = draft.validate(SlotId::generate(self.clock.now()))?;
        let id = slot.id().clone();
        let routine = self.documents.routine().await?;
        self.documents
            .save_routine(&routine.add_slot(day, slot))
            .await?;
        tracing::debug!(%day, slot_id = %id, "slot added");
        Ok(id)
    }

    /// Replace one field of a slot and return the saved routine.
    ///
    /// An unknown id is not an error: the routine is returned unchanged and
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RoutineServiceError::Slot` if the new value is invalid.
    /// Returns `RoutineServiceError::Storage` if persistence fails.
    pub async fn update_slot_field(
        &self,
        day: Day,
        slot_id: &SlotId,
        field: SlotField,
    ) -> Result<RoutineStore, RoutineServiceError> {
        let field = field.validate()?;
        let routine = self.documents.routine().await?;
        let updated = routine.update_slot_field(day, slot_id, field);
        if updated != routine {
            self.documents.save_routine(&updated).await?;
        }
        Ok(updated)
    }

    /// Remove a slot and return the saved routine. Absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RoutineServiceError::Storage` if persistence fails.
    pub async fn remove_slot(
        &self,
        day: Day,
        slot_id: &SlotId,
    ) -> Result<RoutineStore, RoutineServiceError> {
        let routine = self.documents.routine().await?;
        let updated = routine.remove_slot(day, slot_id);
        if updated != routine {
            self.documents.save_routine(&updated).await?;
        }
        Ok(updated)
    }
}
