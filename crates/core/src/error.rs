use thiserror::Error;

use crate::calendar::CalendarError;
use crate::model::{DateKeyError, SlotError, StudentError, UnknownDayError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error(transparent)]
    Student(#[from] StudentError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    DateKey(#[from] DateKeyError),
    #[error(transparent)]
    Day(#[from] UnknownDayError),
}
