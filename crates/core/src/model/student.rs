use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudentError {
    #[error("student name cannot be empty")]
    EmptyName,

    #[error("days to complete must be > 0")]
    InvalidDaysToComplete,

    #[error("a student named {0} already exists")]
    DuplicateName(String),
}

/// A student on the roster. The name is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    name: String,
    days_to_complete: u32,
    #[serde(default)]
    total_completed: u32,
}

impl Student {
    /// Create a student with a zeroed completion counter.
    ///
    /// # Errors
    ///
    /// Returns `StudentError` if the name is blank or the cycle length is zero.
    pub fn new(name: impl Into<String>, days_to_complete: u32) -> Result<Self, StudentError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(StudentError::EmptyName);
        }
        validate_days_to_complete(days_to_complete)?;
        Ok(Self {
            name,
            days_to_complete,
            total_completed: 0,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn days_to_complete(&self) -> u32 {
        self.days_to_complete
    }

    #[must_use]
    pub fn total_completed(&self) -> u32 {
        self.total_completed
    }

    /// Change the cycle length.
    ///
    /// # Errors
    ///
    /// Returns `StudentError::InvalidDaysToComplete` for zero.
    pub fn set_days_to_complete(&mut self, days: u32) -> Result<(), StudentError> {
        validate_days_to_complete(days)?;
        self.days_to_complete = days;
        Ok(())
    }

    /// Overwrite the lifetime counter (administrative edit).
    pub fn set_total_completed(&mut self, total: u32) {
        self.total_completed = total;
    }

    pub(crate) fn record_completion(&mut self, completed: bool) {
        self.total_completed = if completed {
            self.total_completed.saturating_add(1)
        } else {
            self.total_completed.saturating_sub(1)
        };
    }
}

fn validate_days_to_complete(days: u32) -> Result<(), StudentError> {
    if days == 0 {
        return Err(StudentError::InvalidDaysToComplete);
    }
    Ok(())
}

/// The persisted list of students.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRoster {
    students: Vec<Student>,
}

impl StudentRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|student| student.name == name)
    }

    /// Append a student.
    ///
    /// # Errors
    ///
    /// Returns `StudentError::DuplicateName` if the name is already taken.
    pub fn insert(&mut self, student: Student) -> Result<(), StudentError> {
        if self.get(student.name()).is_some() {
            return Err(StudentError::DuplicateName(student.name));
        }
        self.students.push(student);
        Ok(())
    }

    /// Remove a student by name, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Student> {
        let index = self.students.iter().position(|s| s.name == name)?;
        Some(self.students.remove(index))
    }
}

impl FromIterator<Student> for StudentRoster {
    fn from_iter<I: IntoIterator<Item = Student>>(iter: I) -> Self {
        Self {
            students: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_cycle_length() {
        assert_eq!(
            Student::new("Alice", 0).unwrap_err(),
            StudentError::InvalidDaysToComplete
        );
        let mut alice = Student::new("Alice", 30).unwrap();
        assert!(alice.set_days_to_complete(0).is_err());
        assert_eq!(alice.days_to_complete(), 30);
    }

    #[test]
    fn counter_never_goes_below_zero() {
        let mut alice = Student::new("Alice", 30).unwrap();
        alice.record_completion(false);
        assert_eq!(alice.total_completed(), 0);
        alice.record_completion(true);
        alice.record_completion(true);
        assert_eq!(alice.total_completed(), 2);
    }

    #[test]
    fn roster_rejects_duplicate_names() {
        let mut roster = StudentRoster::new();
        roster.insert(Student::new("Alice", 30).unwrap()).unwrap();
        let err = roster.insert(Student::new("Alice", 10).unwrap()).unwrap_err();
        assert_eq!(err, StudentError::DuplicateName("Alice".into()));
        assert!(roster.remove("Alice").is_some());
        assert!(roster.remove("Alice").is_none());
    }

    #[test]
    fn uses_camel_case_wire_names() {
        let json = serde_json::json!([{ "name": "Alice", "daysToComplete": 30, "totalCompleted": 45 }]);
        let roster: StudentRoster = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(roster.get("Alice").unwrap().total_completed(), 45);
        assert_eq!(serde_json::to_value(&roster).unwrap(), json);
    }
}
