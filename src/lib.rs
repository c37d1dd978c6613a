//! Small cli for tracking daily tasks. Mark a task as done each day and it keeps count of your
//! current and best streaks, with a mini calendar of the last days.
//!

pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod streak;
pub mod tracker;
pub mod utils;
