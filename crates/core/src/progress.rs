use serde::Serialize;

use crate::model::Student;

/// Cyclical progress for one student.
///
/// Behaves like an odometer: `percentage` falls back to 0 each time the
/// lifetime counter crosses a multiple of the cycle length, while `cycles`
/// counts finished laps.
///
/// # Examples
///
/// ```
/// # use portal_core::progress::Progress;
/// let progress = Progress::from_counts(45, 30);
/// assert_eq!(progress.cycles, 1);
/// assert_eq!(progress.current_cycle_completed, 15);
/// assert_eq!(progress.percentage, 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub cycles: u32,
    pub current_cycle_completed: u32,
    pub percentage: u8,
}

impl Progress {
    /// Compute progress from raw counts. A zero cycle length yields all zeros.
    #[must_use]
    pub fn from_counts(total_completed: u32, days_to_complete: u32) -> Self {
        if days_to_complete == 0 {
            return Self {
                cycles: 0,
                current_cycle_completed: 0,
                percentage: 0,
            };
        }

        let cycles = total_completed / days_to_complete;
        let current = total_completed % days_to_complete;
        // Integer half-up rounding of 100 * current / days.
        let rounded = (200 * u64::from(current) + u64::from(days_to_complete))
            / (2 * u64::from(days_to_complete));
        let percentage = u8::try_from(rounded.min(100)).unwrap_or(100);

        Self {
            cycles,
            current_cycle_completed: current,
            percentage,
        }
    }
}

/// Progress for a roster entry.
#[must_use]
pub fn compute_progress(student: &Student) -> Progress {
    Progress::from_counts(student.total_completed(), student.days_to_complete())
}
