use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::model::{CompletionMap, Day, RoutineStore, Slot, date_key};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CalendarError {
    #[error("month must be in 1..=12, got {0}")]
    InvalidMonth(u32),
    #[error("year {0} is out of the supported calendar range")]
    InvalidYear(i32),
}

//
// ─── MONTH CURSOR ──────────────────────────────────────────────────────────────
//

/// A validated `(year, month)` pair with rollover-aware navigation.
///
/// # Examples
///
/// ```
/// # use portal_core::calendar::MonthCursor;
/// let december = MonthCursor::new(2023, 12)?;
/// let january = december.next()?;
/// assert_eq!((january.year(), january.month()), (2024, 1));
/// assert_eq!(january.days_in_month(), 31);
/// # Ok::<(), portal_core::calendar::CalendarError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    /// # Errors
    ///
    /// Returns `CalendarError` if the month is not 1–12 or the year cannot be
    /// represented.
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidYear(year))?;
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// # Errors
    ///
    /// Returns `CalendarError::InvalidYear` at the end of chrono's range.
    pub fn next(&self) -> Result<Self, CalendarError> {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map(Self::containing)
            .ok_or(CalendarError::InvalidYear(self.year + 1))
    }

    /// # Errors
    ///
    /// Returns `CalendarError::InvalidYear` at the start of chrono's range.
    pub fn prev(&self) -> Result<Self, CalendarError> {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map(Self::containing)
            .ok_or(CalendarError::InvalidYear(self.year - 1))
    }

    /// First calendar day of the month.
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        // Validated in `new`/`containing`.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Sunday-first column of day 1 (0 = Sunday).
    #[must_use]
    pub fn first_weekday(&self) -> u32 {
        Day::of(self.first_day()).index_from_sunday()
    }

    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        match first.checked_add_months(Months::new(1)) {
            Some(next) => u32::try_from((next - first).num_days()).unwrap_or(31),
            // December of chrono's last representable year.
            None => 31,
        }
    }

    /// Every date in the month, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        first.iter_days().take(self.days_in_month() as usize)
    }
}

//
// ─── CELLS ─────────────────────────────────────────────────────────────────────
//

/// A recurring slot as it appears on one specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedSlot {
    pub slot: Slot,
    pub completed: bool,
}

/// One day of the projected month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub date_key: String,
    pub day: u32,
    pub weekday: Day,
    pub slots: Vec<ProjectedSlot>,
}

impl DayCell {
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.completed).count()
    }

    /// True when the day has slots and every one is done.
    #[must_use]
    pub fn is_fully_completed(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(|s| s.completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
    /// Leading placeholder before day 1 in a Sunday-first grid.
    Blank,
    Day(DayCell),
}

impl CalendarCell {
    #[must_use]
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            CalendarCell::Blank => None,
            CalendarCell::Day(cell) => Some(cell),
        }
    }
}

/// A month laid out for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    pub month: MonthCursor,
    pub cells: Vec<CalendarCell>,
}

impl MonthView {
    /// Day cells only, skipping leading blanks.
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(CalendarCell::as_day)
    }

    #[must_use]
    pub fn leading_blanks(&self) -> usize {
        self.cells
            .iter()
            .take_while(|cell| matches!(cell, CalendarCell::Blank))
            .count()
    }

    #[must_use]
    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days().find(|cell| cell.day == day)
    }
}

//
// ─── PROJECTOR ─────────────────────────────────────────────────────────────────
//

/// Lays the weekly routine over a calendar month.
///
/// Schedules are looked up by weekday, completion by exact date. Nothing is
/// cached; each call recomputes from its inputs.
#[must_use]
pub fn project_month(
    routine: &RoutineStore,
    completions: &CompletionMap,
    month: MonthCursor,
) -> MonthView {
    let blanks = month.first_weekday() as usize;
    let mut cells = Vec::with_capacity(blanks + month.days_in_month() as usize);
    cells.extend(std::iter::repeat_n(CalendarCell::Blank, blanks));

    for date in month.dates() {
        let weekday = Day::of(date);
        let slots = routine
            .slots_for(weekday)
            .iter()
            .map(|slot| ProjectedSlot {
                completed: completions.is_completed(date, slot.id()),
                slot: slot.clone(),
            })
            .collect();
        cells.push(CalendarCell::Day(DayCell {
            date,
            date_key: date_key(date),
            day: date.day(),
            weekday,
            slots,
        }));
    }

    MonthView { month, cells }
}

/// Convenience wrapper that validates a raw `(year, month)` first.
///
/// # Errors
///
/// Returns `CalendarError` for an out-of-range month or year.
pub fn project(
    routine: &RoutineStore,
    completions: &CompletionMap,
    year: i32,
    month: u32,
) -> Result<MonthView, CalendarError> {
    Ok(project_month(routine, completions, MonthCursor::new(year, month)?))
}
