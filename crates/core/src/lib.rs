#![forbid(unsafe_code)]

pub mod calendar;
pub mod error;
pub mod model;
pub mod progress;
pub mod time;
pub mod toggle;

pub use error::Error;
pub use time::Clock;
