use std::fmt::Display;

use portal_core::model::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message queued for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Per-session state handed explicitly to handlers.
///
/// Created signed-out; `resume` binds a user, `logout` clears everything.
#[derive(Debug, Default)]
pub struct PortalContext {
    user: Option<User>,
    notices: Vec<Notice>,
}

impl PortalContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a user, e.g. when a stored session is resumed.
    pub fn resume(&mut self, user: User) {
        tracing::info!(user = %user.username, "session resumed");
        self.user = Some(user);
    }

    /// Drop the user and any pending notices.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.username, "session ended");
        }
        self.notices.clear();
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Queue a failure notice for a user-initiated action.
    pub fn report_failure(&mut self, action: &str, err: &impl Display) {
        self.notify(NoticeLevel::Error, format!("{action} failed: {err}"));
    }

    /// Take all queued notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::model::Role;

    #[test]
    fn logout_clears_user_and_notices() {
        let mut ctx = PortalContext::new();
        assert!(!ctx.is_signed_in());

        ctx.resume(User::new("teacher", Role::Teacher));
        ctx.notify(NoticeLevel::Info, "saved");
        assert!(ctx.user().unwrap().can_edit_routine());

        ctx.logout();
        assert!(!ctx.is_signed_in());
        assert!(ctx.drain_notices().is_empty());
    }

    #[test]
    fn drain_returns_notices_in_order() {
        let mut ctx = PortalContext::new();
        ctx.notify(NoticeLevel::Info, "one");
        ctx.report_failure("Toggle", &"connection error: offline");
        let notices = ctx.drain_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].level, NoticeLevel::Error);
        assert_eq!(notices[1].message, "Toggle failed: connection error: offline");
        assert!(ctx.drain_notices().is_empty());
    }
}
