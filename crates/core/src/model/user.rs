use serde::{Deserialize, Serialize};

/// Portal account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

/// The signed-in account as far as the timetable cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Whether this account may edit the routine and the roster.
    #[must_use]
    pub fn can_edit_routine(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Teacher)
    }
}
