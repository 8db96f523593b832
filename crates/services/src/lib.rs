#![forbid(unsafe_code)]

pub mod app_services;
pub mod context;
pub mod error;
pub mod routine_service;
pub mod student_service;
pub mod timetable;

pub use portal_core::Clock;

pub use app_services::AppServices;
pub use context::{Notice, NoticeLevel, PortalContext};
pub use error::{AppServicesError, RoutineServiceError, StudentServiceError, TimetableError};
pub use routine_service::RoutineService;
pub use student_service::{StudentProgress, StudentService};
pub use timetable::{TimetableSession, TimetableSnapshot, ToggleOutcome};
