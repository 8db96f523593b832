use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SlotId;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid date key (expected YYYY-MM-DD): {0}")]
pub struct DateKeyError(pub String);

/// Formats a calendar date as the zero-padded `YYYY-MM-DD` completion key.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` completion key.
///
/// # Errors
///
/// Returns `DateKeyError` unless the input is exactly a zero-padded date.
pub fn parse_date_key(raw: &str) -> Result<NaiveDate, DateKeyError> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(DateKeyError(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT).map_err(|_| DateKeyError(raw.to_string()))
}

/// Sparse per-date record of which recurring slots were marked done.
///
/// Only completed slots are stored; absence means "not completed". Clearing
/// the last slot of a date drops the date key too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionMap {
    dates: BTreeMap<NaiveDate, BTreeMap<SlotId, bool>>,
}

impl CompletionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_completed(&self, date: NaiveDate, slot_id: &SlotId) -> bool {
        self.dates
            .get(&date)
            .and_then(|entries| entries.get(slot_id))
            .copied()
            .unwrap_or(false)
    }

    /// Recorded entries for one date, if any slot was ever toggled on it.
    #[must_use]
    pub fn entries_for(&self, date: NaiveDate) -> Option<&BTreeMap<SlotId, bool>> {
        self.dates.get(&date)
    }

    /// Number of slots currently marked done on `date`.
    #[must_use]
    pub fn completed_on(&self, date: NaiveDate) -> usize {
        self.entries_for(date)
            .map_or(0, |entries| entries.values().filter(|done| **done).count())
    }

    /// Returns a new map with the entry flipped, and the entry's new state.
    #[must_use]
    pub fn toggled(&self, date: NaiveDate, slot_id: &SlotId) -> (Self, bool) {
        let mut next = self.clone();
        let now_completed = !self.is_completed(date, slot_id);
        if now_completed {
            next.dates
                .entry(date)
                .or_default()
                .insert(slot_id.clone(), true);
        } else if let Some(entries) = next.dates.get_mut(&date) {
            entries.remove(slot_id);
            if entries.is_empty() {
                next.dates.remove(&date);
            }
        }
        (next, now_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_keys_are_zero_padded() {
        assert_eq!(date_key(day(2024, 3, 4)), "2024-03-04");
        assert_eq!(parse_date_key("2024-03-04").unwrap(), day(2024, 3, 4));
        assert!(parse_date_key("2024-3-4").is_err());
        assert!(parse_date_key("Monday").is_err());
        assert!(parse_date_key("2024- 3-04").is_err());
        assert!(parse_date_key("+202-03-04").is_err());
        assert!(parse_date_key("2024/03/04").is_err());
        assert!(parse_date_key("2024-03-4 ").is_err());
    }

    #[test]
    fn first_toggle_marks_done_second_clears() {
        let map = CompletionMap::new();
        let s1 = SlotId::new("s1");

        let (once, done) = map.toggled(day(2024, 3, 4), &s1);
        assert!(done);
        assert!(once.is_completed(day(2024, 3, 4), &s1));
        assert!(!map.is_completed(day(2024, 3, 4), &s1));

        let (twice, done) = once.toggled(day(2024, 3, 4), &s1);
        assert!(!done);
        assert!(!twice.is_completed(day(2024, 3, 4), &s1));
        assert_eq!(twice.completed_on(day(2024, 3, 4)), 0);
        assert_eq!(twice, map);
        assert!(twice.entries_for(day(2024, 3, 4)).is_none());
    }

    #[test]
    fn clearing_one_slot_keeps_the_others_on_that_date() {
        let (map, _) = CompletionMap::new().toggled(day(2024, 3, 4), &SlotId::new("s1"));
        let (map, _) = map.toggled(day(2024, 3, 4), &SlotId::new("s2"));
        let (map, done) = map.toggled(day(2024, 3, 4), &SlotId::new("s1"));

        assert!(!done);
        assert_eq!(map.completed_on(day(2024, 3, 4)), 1);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "2024-03-04": { "s2": true } }));
    }

    #[test]
    fn stored_false_entries_read_as_not_completed() {
        let json = serde_json::json!({ "2024-03-04": { "s1": false } });
        let map: CompletionMap = serde_json::from_value(json).unwrap();
        assert!(!map.is_completed(day(2024, 3, 4), &SlotId::new("s1")));

        let (map, done) = map.toggled(day(2024, 3, 4), &SlotId::new("s1"));
        assert!(done);
        assert!(map.is_completed(day(2024, 3, 4), &SlotId::new("s1")));
    }

    #[test]
    fn wire_format_is_date_then_slot_keyed() {
        let (map, _) = CompletionMap::new().toggled(day(2024, 3, 4), &SlotId::new("s1"));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "2024-03-04": { "s1": true } }));

        let back: CompletionMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }
}
