use chrono::NaiveDate;
use thiserror::Error;

/// Failures a user can cause through a command. Everything else (I/O, broken files) travels as
/// [anyhow::Error].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Can't parse \"{input}\" into a calendar date")]
    InvalidDate { input: String },

    #[error("No such task: {0}")]
    TaskNotFound(String),

    #[error("Task already exists: {0}")]
    TaskExists(String),

    #[error("Task name can't be empty")]
    EmptyName,

    #[error("Can't mark {0} as done, it's in the future")]
    FutureDate(NaiveDate),
}
