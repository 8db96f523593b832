use portal_core::model::{Student, StudentRoster};
use portal_core::progress::{Progress, compute_progress};
use serde::Serialize;
use storage::repository::Documents;

use crate::error::StudentServiceError;

/// Progress row for one roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentProgress {
    pub name: String,
    pub days_to_complete: u32,
    pub total_completed: u32,
    pub progress: Progress,
}

impl StudentProgress {
    fn from_student(student: &Student) -> Self {
        Self {
            name: student.name().to_string(),
            days_to_complete: student.days_to_complete(),
            total_completed: student.total_completed(),
            progress: compute_progress(student),
        }
    }
}

/// Roster administration and progress queries.
///
/// Edits that name a missing student return `Ok(false)` instead of failing.
#[derive(Clone)]
pub struct StudentService {
    documents: Documents,
}

impl StudentService {
    #[must_use]
    pub fn new(documents: Documents) -> Self {
        Self { documents }
    }

    /// # Errors
    ///
    /// Returns `StudentServiceError::Storage` if the roster cannot be read.
    pub async fn roster(&self) -> Result<StudentRoster, StudentServiceError> {
        Ok(self.documents.students().await?)
    }

    /// Add a student with a zeroed counter.
    ///
    /// # Errors
    ///
    /// Returns `StudentServiceError::Student` for a blank or duplicate name or a
    /// zero cycle length.
    /// Returns `StudentServiceError::Storage` if persistence fails.
    pub async fn add_student(
        &self,
        name: &str,
        days_to_complete: u32,
    ) -> Result<Student, StudentServiceError> {
        let student = Student::new(name, days_to_complete)?;
        let mut roster = self.documents.students().await?;
        roster.insert(student.clone())?;
        self.documents.save_students(&roster).await?;
        Ok(student)
    }

    /// Change a student's cycle length.
    ///
    /// # Errors
    ///
    /// Returns `StudentServiceError::Student` for zero.
    /// Returns `StudentServiceError::Storage` if persistence fails.
    pub async fn set_days_to_complete(
        &self,
        name: &str,
        days: u32,
    ) -> Result<bool, StudentServiceError> {
        self.edit(name, |student| student.set_days_to_complete(days))
            .await
    }

    /// Overwrite a student's lifetime counter.
    ///
    /// # Errors
    ///
    /// Returns `StudentServiceError::Storage` if persistence fails.
    pub async fn set_total_completed(
        &self,
        name: &str,
        total: u32,
    ) -> Result<bool, StudentServiceError> {
        self.edit(name, |student| {
            student.set_total_completed(total);
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `StudentServiceError::Storage` if persistence fails.
    pub async fn remove_student(&self, name: &str) -> Result<bool, StudentServiceError> {
        let mut roster = self.documents.students().await?;
        if roster.remove(name).is_none() {
            tracing::warn!(student = name, "remove ignored: unknown student");
            return Ok(false);
        }
        self.documents.save_students(&roster).await?;
        Ok(true)
    }

    /// Progress for every student, in roster order.
    ///
    /// # Errors
    ///
    /// Returns `StudentServiceError::Storage` if the roster cannot be read.
    pub async fn list_progress(&self) -> Result<Vec<StudentProgress>, StudentServiceError> {
        let roster = self.documents.students().await?;
        Ok(roster
            .students()
            .iter()
            .map(StudentProgress::from_student)
            .collect())
    }

    /// # Errors
    ///
    /// Returns `StudentServiceError::Storage` if the roster cannot be read.
    pub async fn progress_for(
        &self,
        name: &str,
    ) -> Result<Option<StudentProgress>, StudentServiceError> {
        let roster = self.documents.students().await?;
        Ok(roster.get(name).map(StudentProgress::from_student))
    }

    async fn edit<F>(&self, name: &str, apply: F) -> Result<bool, StudentServiceError>
    where
        F: FnOnce(&mut Student) -> Result<(), portal_core::model::StudentError>,
    {
        let mut roster = self.documents.students().await?;
        let Some(student) = roster.get_mut(name) else {
            tracing::warn!(student = name, "edit ignored: unknown student");
            return Ok(false);
        };
        apply(student)?;
        self.documents.save_students(&roster).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use portal_core::model::StudentError;
    use storage::repository::Storage;

    #[tokio::test]
    async fn progress_reflects_admin_edits() {
        let service = StudentService::new(Storage::in_memory().documents);
        service.add_student("Alice", 30).await.unwrap();
        assert!(service.set_total_completed("Alice", 45).await.unwrap());

        let row = service.progress_for("Alice").await.unwrap().unwrap();
        assert_eq!(row.progress.cycles, 1);
        assert_eq!(row.progress.current_cycle_completed, 15);
        assert_eq!(row.progress.percentage, 50);

        assert!(service.set_days_to_complete("Alice", 45).await.unwrap());
        let row = service.progress_for("Alice").await.unwrap().unwrap();
        assert_eq!(row.progress.cycles, 1);
        assert_eq!(row.progress.percentage, 0);
    }

    #[tokio::test]
    async fn rejects_non_positive_cycle_length() {
        let service = StudentService::new(Storage::in_memory().documents);
        let err = service.add_student("Alice", 0).await.unwrap_err();
        assert!(matches!(
            err,
            StudentServiceError::Student(StudentError::InvalidDaysToComplete)
        ));

        service.add_student("Alice", 10).await.unwrap();
        assert!(service.set_days_to_complete("Alice", 0).await.is_err());
        let row = service.progress_for("Alice").await.unwrap().unwrap();
        assert_eq!(row.days_to_complete, 10);
    }

    #[tokio::test]
    async fn unknown_names_are_soft_no_ops() {
        let service = StudentService::new(Storage::in_memory().documents);
        assert!(!service.set_total_completed("Nobody", 3).await.unwrap());
        assert!(!service.remove_student("Nobody").await.unwrap());
        assert!(service.progress_for("Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_progress_keeps_roster_order() {
        let service = StudentService::new(Storage::in_memory().documents);
        service.add_student("Bob", 5).await.unwrap();
        service.add_student("Alice", 30).await.unwrap();
        let names: Vec<String> = service
            .list_progress()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.name)
            .collect();
        assert_eq!(names, ["Bob", "Alice"]);
        assert!(service.add_student("Bob", 5).await.is_err());
    }
}
