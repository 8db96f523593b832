use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SlotId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SlotError {
    #[error("slot subject cannot be empty")]
    EmptySubject,

    #[error("slot student cannot be empty")]
    EmptyStudent,

    #[error("slot must end after it starts ({start} >= {end})")]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },
}

//
// ─── SLOT ──────────────────────────────────────────────────────────────────────
//

/// One scheduled block on a weekday, recurring every week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    id: SlotId,
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
    subject: String,
    student: String,
}

/// Unvalidated slot fields as submitted by an editor.
#[derive(Debug, Clone)]
pub struct SlotDraft {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub subject: String,
    pub student: String,
}

/// A single editable slot field, carrying its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotField {
    Start(NaiveTime),
    End(NaiveTime),
    Subject(String),
    Student(String),
}

impl SlotDraft {
    /// Validate the draft and attach the given id.
    ///
    /// # Errors
    ///
    /// Returns `SlotError` if the subject or student is blank, or if the
    /// slot does not end after it starts.
    pub fn validate(self, id: SlotId) -> Result<Slot, SlotError> {
        let subject = self.subject.trim().to_string();
        if subject.is_empty() {
            return Err(SlotError::EmptySubject);
        }
        let student = self.student.trim().to_string();
        if student.is_empty() {
            return Err(SlotError::EmptyStudent);
        }
        if self.start >= self.end {
            return Err(SlotError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            });
        }

        Ok(Slot {
            id,
            start: self.start,
            end: self.end,
            subject,
            student,
        })
    }
}

impl SlotField {
    /// Normalize text fields and reject blank values.
    ///
    /// # Errors
    ///
    /// Returns `SlotError` for a blank subject or student.
    pub fn validate(self) -> Result<Self, SlotError> {
        match self {
            SlotField::Subject(subject) => {
                let subject = subject.trim().to_string();
                if subject.is_empty() {
                    return Err(SlotError::EmptySubject);
                }
                Ok(SlotField::Subject(subject))
            }
            SlotField::Student(student) => {
                let student = student.trim().to_string();
                if student.is_empty() {
                    return Err(SlotError::EmptyStudent);
                }
                Ok(SlotField::Student(student))
            }
            times => Ok(times),
        }
    }
}

impl Slot {
    #[must_use]
    pub fn id(&self) -> &SlotId {
        &self.id
    }

    #[must_use]
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn student(&self) -> &str {
        &self.student
    }

    /// Overwrite one field in place.
    ///
    /// Field edits are applied as given; an editor may briefly hold a slot
    /// whose range is inverted while both ends are being changed.
    pub fn apply(&mut self, field: SlotField) {
        match field {
            SlotField::Start(start) => self.start = start,
            SlotField::End(end) => self.end = end,
            SlotField::Subject(subject) => self.subject = subject,
            SlotField::Student(student) => self.student = student,
        }
    }
}

/// `HH:MM` wire format used by the routine document.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn draft() -> SlotDraft {
        SlotDraft {
            start: at(9, 0),
            end: at(10, 0),
            subject: "Math".into(),
            student: "Alice".into(),
        }
    }

    #[test]
    fn validate_trims_text_fields() {
        let slot = SlotDraft {
            subject: "  Math ".into(),
            ..draft()
        }
        .validate(SlotId::new("s1"))
        .unwrap();
        assert_eq!(slot.subject(), "Math");
        assert_eq!(slot.id().as_str(), "s1");
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let err = SlotDraft {
            subject: "   ".into(),
            ..draft()
        }
        .validate(SlotId::new("s1"))
        .unwrap_err();
        assert_eq!(err, SlotError::EmptySubject);

        let err = SlotDraft {
            student: String::new(),
            ..draft()
        }
        .validate(SlotId::new("s1"))
        .unwrap_err();
        assert_eq!(err, SlotError::EmptyStudent);
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let err = SlotDraft {
            start: at(11, 0),
            ..draft()
        }
        .validate(SlotId::new("s1"))
        .unwrap_err();
        assert!(matches!(err, SlotError::InvalidTimeRange { .. }));
    }

    #[test]
    fn field_validation_trims_and_rejects_blank_text() {
        assert_eq!(
            SlotField::Subject(" Art ".into()).validate().unwrap(),
            SlotField::Subject("Art".into())
        );
        assert_eq!(
            SlotField::Student("  ".into()).validate().unwrap_err(),
            SlotError::EmptyStudent
        );
        assert_eq!(
            SlotField::Start(at(8, 0)).validate().unwrap(),
            SlotField::Start(at(8, 0))
        );
    }

    #[test]
    fn times_use_hour_minute_wire_format() {
        let slot = draft().validate(SlotId::new("s1")).unwrap();
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["start"], "09:00");
        assert_eq!(json["end"], "10:00");

        let back: Slot = serde_json::from_value(json).unwrap();
        assert_eq!(back, slot);
    }
}
