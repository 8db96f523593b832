use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::day::Day;
use crate::model::ids::SlotId;
use crate::model::slot::{Slot, SlotField};

/// The weekly recurring schedule.
///
/// Each weekday owns an ordered slot list. Lists are shared between snapshots
/// and copied only when a mutation touches them, so a value handed to a reader
/// never changes underneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutineStore {
    days: BTreeMap<Day, Arc<Vec<Slot>>>,
}

impl RoutineStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots scheduled on `day`, in list order. Absent days are empty.
    #[must_use]
    pub fn slots_for(&self, day: Day) -> &[Slot] {
        self.days
            .get(&day)
            .map(|slots| slots.as_slice())
            .unwrap_or(&[])
    }

    /// Slots scheduled on `day`, ordered by start time for display.
    #[must_use]
    pub fn sorted_slots_for(&self, day: Day) -> Vec<Slot> {
        let mut slots = self.slots_for(day).to_vec();
        slots.sort_by_key(Slot::start);
        slots
    }

    /// Finds a slot by id within one weekday.
    #[must_use]
    pub fn find_slot(&self, day: Day, slot_id: &SlotId) -> Option<&Slot> {
        self.slots_for(day).iter().find(|slot| slot.id() == slot_id)
    }

    /// Total number of slots across the week.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.days.values().map(|slots| slots.len()).sum()
    }

    /// Iterate over days that have a list, in Sunday-first order.
    pub fn days(&self) -> impl Iterator<Item = (Day, &[Slot])> {
        self.days.iter().map(|(day, slots)| (*day, slots.as_slice()))
    }

    /// Returns a new routine with `slot` appended to `day`.
    ///
    /// Id uniqueness is the caller's responsibility.
    #[must_use]
    pub fn add_slot(&self, day: Day, slot: Slot) -> Self {
        let mut next = self.clone();
        Arc::make_mut(next.days.entry(day).or_default()).push(slot);
        next
    }

    /// Returns a new routine with one field of a slot replaced.
    ///
    /// An unknown id leaves the routine unchanged.
    #[must_use]
    pub fn update_slot_field(&self, day: Day, slot_id: &SlotId, field: SlotField) -> Self {
        let mut next = self.clone();
        let Some(slots) = next.days.get_mut(&day) else {
            tracing::warn!(%day, %slot_id, "slot update ignored: day has no slots");
            return next;
        };
        let Some(index) = slots.iter().position(|slot| slot.id() == slot_id) else {
            tracing::warn!(%day, %slot_id, "slot update ignored: unknown slot id");
            return next;
        };
        Arc::make_mut(slots)[index].apply(field);
        next
    }

    /// Returns a new routine without the slot; a no-op if it is absent.
    #[must_use]
    pub fn remove_slot(&self, day: Day, slot_id: &SlotId) -> Self {
        let mut next = self.clone();
        if let Some(slots) = next.days.get_mut(&day) {
            if slots.iter().any(|slot| slot.id() == slot_id) {
                Arc::make_mut(slots).retain(|slot| slot.id() != slot_id);
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::slot::SlotDraft;
    use chrono::NaiveTime;

    fn slot(id: &str, hour: u32, subject: &str) -> Slot {
        SlotDraft {
            start: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            subject: subject.into(),
            student: "Alice".into(),
        }
        .validate(SlotId::new(id))
        .unwrap()
    }

    #[test]
    fn absent_days_behave_as_empty() {
        let routine = RoutineStore::new();
        assert!(routine.slots_for(Day::Monday).is_empty());
        assert_eq!(routine.slot_count(), 0);
    }

    #[test]
    fn add_slot_appends_and_leaves_original_untouched() {
        let before = RoutineStore::new().add_slot(Day::Monday, slot("s1", 9, "Math"));
        let after = before.add_slot(Day::Monday, slot("s2", 8, "Art"));

        assert_eq!(before.slots_for(Day::Monday).len(), 1);
        let ids: Vec<_> = after
            .slots_for(Day::Monday)
            .iter()
            .map(|s| s.id().as_str())
            .collect();
        assert_eq!(ids, ["s1", "s2"]);

        let sorted: Vec<_> = after
            .sorted_slots_for(Day::Monday)
            .into_iter()
            .map(|s| s.subject().to_string())
            .collect();
        assert_eq!(sorted, ["Art", "Math"]);
    }

    #[test]
    fn update_slot_field_replaces_one_field() {
        let routine = RoutineStore::new().add_slot(Day::Tuesday, slot("s1", 9, "Math"));
        let updated = routine.update_slot_field(
            Day::Tuesday,
            &SlotId::new("s1"),
            SlotField::Subject("Physics".into()),
        );

        let changed = updated.find_slot(Day::Tuesday, &SlotId::new("s1")).unwrap();
        assert_eq!(changed.subject(), "Physics");
        assert_eq!(changed.student(), "Alice");
        assert_eq!(
            routine
                .find_slot(Day::Tuesday, &SlotId::new("s1"))
                .unwrap()
                .subject(),
            "Math"
        );
    }

    #[test]
    fn update_slot_field_with_unknown_id_is_noop() {
        let routine = RoutineStore::new().add_slot(Day::Tuesday, slot("s1", 9, "Math"));
        let updated = routine.update_slot_field(
            Day::Tuesday,
            &SlotId::new("missing"),
            SlotField::Subject("Physics".into()),
        );
        assert_eq!(updated, routine);

        let other_day = routine.update_slot_field(
            Day::Friday,
            &SlotId::new("s1"),
            SlotField::Subject("Physics".into()),
        );
        assert_eq!(other_day, routine);
    }

    #[test]
    fn remove_slot_is_idempotent() {
        let routine = RoutineStore::new().add_slot(Day::Monday, slot("s1", 9, "Math"));
        let removed = routine.remove_slot(Day::Monday, &SlotId::new("s1"));
        assert!(removed.slots_for(Day::Monday).is_empty());

        let again = removed.remove_slot(Day::Monday, &SlotId::new("s1"));
        assert_eq!(again, removed);
        assert_eq!(routine.slots_for(Day::Monday).len(), 1);
    }

    #[test]
    fn removed_day_keeps_an_empty_list() {
        let routine = RoutineStore::new()
            .add_slot(Day::Monday, slot("s1", 9, "Math"))
            .remove_slot(Day::Monday, &SlotId::new("s1"));
        let json = serde_json::to_value(&routine).unwrap();
        assert_eq!(json, serde_json::json!({ "Monday": [] }));
    }

    #[test]
    fn deserializes_weekday_keyed_document() {
        let json = serde_json::json!({
            "Monday": [
                { "id": "s1", "start": "09:00", "end": "10:00", "subject": "Math", "student": "Alice" }
            ],
            "Wednesday": []
        });
        let routine: RoutineStore = serde_json::from_value(json).unwrap();
        assert_eq!(routine.slots_for(Day::Monday)[0].student(), "Alice");
        assert!(routine.slots_for(Day::Wednesday).is_empty());
        assert_eq!(routine.days().count(), 2);
    }

    #[test]
    fn weekday_keys_are_case_sensitive() {
        let json = serde_json::json!({ "monday": [] });
        assert!(serde_json::from_value::<RoutineStore>(json).is_err());
    }
}
