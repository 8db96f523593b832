use chrono::NaiveDate;

use crate::model::{CompletionMap, SlotId, StudentRoster};

/// What happened to the student counter during a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAdjustment {
    Incremented,
    Decremented,
    /// No roster entry matched the slot's student.
    StudentMissing,
}

/// Result of flipping one completion entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub completions: CompletionMap,
    pub students: StudentRoster,
    pub completed: bool,
    pub counter: CounterAdjustment,
}

/// Flip `(date, slot_id)` and move the student's counter with it.
///
/// Both documents are returned as new values so a caller can commit them
/// together or discard both. An unknown student still gets the flip.
#[must_use]
pub fn toggle_completion(
    completions: &CompletionMap,
    date: NaiveDate,
    slot_id: &SlotId,
    student_name: &str,
    students: &StudentRoster,
) -> Toggled {
    let (completions, completed) = completions.toggled(date, slot_id);
    let mut students = students.clone();

    let counter = match students.get_mut(student_name) {
        Some(student) => {
            student.record_completion(completed);
            if completed {
                CounterAdjustment::Incremented
            } else {
                CounterAdjustment::Decremented
            }
        }
        None => {
            tracing::warn!(
                student = student_name,
                %slot_id,
                %date,
                "completion toggled for a student missing from the roster"
            );
            CounterAdjustment::StudentMissing
        }
    };

    Toggled {
        completions,
        students,
        completed,
        counter,
    }
}
