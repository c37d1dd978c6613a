use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// A task as it is stored on the disk.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct TaskEntity {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub done_days: BTreeSet<NaiveDate>,
}

impl TaskEntity {
    pub fn new(name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            name,
            created_at,
            done_days: BTreeSet::new(),
        }
    }
}

/// Turns a user supplied name into the key tasks are stored under. Names are case insensitive.
pub fn task_key(name: &str) -> Result<String, TrackerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::EmptyName);
    }
    Ok(name.to_lowercase())
}

/// Contents of the task file.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct TaskDatabase {
    #[serde(default)]
    tasks: BTreeMap<String, TaskEntity>,
}

impl TaskDatabase {
    pub fn add_task(
        &mut self,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<&TaskEntity, TrackerError> {
        let key = task_key(name)?;
        if self.tasks.contains_key(&key) {
            return Err(TrackerError::TaskExists(name.trim().to_string()));
        }
        Ok(self
            .tasks
            .entry(key)
            .or_insert_with(|| TaskEntity::new(name.trim().to_string(), created_at)))
    }

    pub fn get(&self, name: &str) -> Result<&TaskEntity, TrackerError> {
        self.tasks
            .get(&task_key(name)?)
            .ok_or_else(|| TrackerError::TaskNotFound(name.trim().to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut TaskEntity, TrackerError> {
        self.tasks
            .get_mut(&task_key(name)?)
            .ok_or_else(|| TrackerError::TaskNotFound(name.trim().to_string()))
    }

    /// Returns false if the day was already recorded.
    pub fn mark_done(&mut self, name: &str, day: NaiveDate) -> Result<bool, TrackerError> {
        Ok(self.get_mut(name)?.done_days.insert(day))
    }

    /// Returns false if there was nothing to remove.
    pub fn unmark(&mut self, name: &str, day: NaiveDate) -> Result<bool, TrackerError> {
        Ok(self.get_mut(name)?.done_days.remove(&day))
    }

    /// Clears every completion of a task. The task itself stays. Returns how many days were
    /// removed.
    pub fn reset(&mut self, name: &str) -> Result<usize, TrackerError> {
        let task = self.get_mut(name)?;
        let removed = task.done_days.len();
        task.done_days.clear();
        Ok(removed)
    }

    /// Tasks ordered by their key.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskEntity> {
        self.tasks.values()
    }

    pub fn total_marks(&self) -> usize {
        self.tasks.values().map(|v| v.done_days.len()).sum()
    }

    pub fn completed_on(&self, day: NaiveDate) -> impl Iterator<Item = &TaskEntity> {
        self.tasks().filter(move |v| v.done_days.contains(&day))
    }
}
