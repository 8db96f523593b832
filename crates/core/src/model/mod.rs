mod completion;
mod day;
mod ids;
mod routine;
mod slot;
mod student;
mod user;

pub use completion::{CompletionMap, DateKeyError, date_key, parse_date_key};
pub use day::{Day, UnknownDayError};
pub use ids::SlotId;
pub use routine::RoutineStore;
pub use slot::{Slot, SlotDraft, SlotError, SlotField};
pub use student::{Student, StudentError, StudentRoster};
pub use user::{Role, User};
