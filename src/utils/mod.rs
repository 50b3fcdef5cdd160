//! Shared helpers for rates, dates and number formatting

pub mod format;
pub mod math;
pub mod time;
