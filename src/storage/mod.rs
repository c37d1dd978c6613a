//! Storage is organized through [task_storage::JsonTaskStorage].
//!  The basic idea is:
//!   - There is an application directory with a single `streaks.json` file.
//!   - The file holds every task keyed by its lowercased name.
//!   - Completion days are stored as an ordered set, so a day is never recorded twice.

pub mod entities;
pub mod task_storage;
