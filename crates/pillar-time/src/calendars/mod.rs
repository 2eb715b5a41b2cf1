//! Market-specific calendars.

pub mod target;
