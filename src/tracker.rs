//! Operations behind every command. [Tracker] reads tasks from a [TaskStorage] and applies changes
//! through [TaskStorage::update], using a [Clock] to decide what "today" is.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::{
    error::TrackerError,
    storage::{
        entities::{TaskDatabase, TaskEntity},
        task_storage::TaskStorage,
    },
    streak::{compute_streaks_with_grace, Streaks, DEFAULT_GRACE_DAYS},
    utils::clock::Clock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneOutcome {
    Marked,
    AlreadyDone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub name: String,
    pub streaks: Streaks,
    pub total_days: usize,
    pub done_days: BTreeSet<NaiveDate>,
}

pub struct Tracker<S, C> {
    storage: S,
    clock: C,
    grace_days: u32,
}

impl<S: TaskStorage, C: Clock> Tracker<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            grace_days: DEFAULT_GRACE_DAYS,
        }
    }

    pub fn with_grace_days(self, grace_days: u32) -> Self {
        Self { grace_days, ..self }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Creates a task with no completions. Returns the stored display name.
    #[instrument(skip(self))]
    pub async fn add(&self, name: &str) -> Result<String> {
        let created_at = self.clock.time();
        let name = self
            .storage
            .update(|db| Ok(db.add_task(name, created_at)?.name.clone()))
            .await?;
        info!("Added task {name}");
        Ok(name)
    }

    /// Marks a task as done on `day`, today by default. Days after today are rejected.
    #[instrument(skip(self))]
    pub async fn done(&self, name: &str, day: Option<NaiveDate>) -> Result<(String, DoneOutcome)> {
        let today = self.clock.today();
        let day = day.unwrap_or(today);
        if day > today {
            return Err(TrackerError::FutureDate(day).into());
        }

        let (name, outcome) = self
            .storage
            .update(|db| {
                let outcome = if db.mark_done(name, day)? {
                    DoneOutcome::Marked
                } else {
                    DoneOutcome::AlreadyDone
                };
                Ok((db.get(name)?.name.clone(), outcome))
            })
            .await?;
        if outcome == DoneOutcome::Marked {
            info!("Marked {name} done on {day}");
        }
        Ok((name, outcome))
    }

    /// Removes the completion on `day`, today by default. Returns whether there was one.
    #[instrument(skip(self))]
    pub async fn undo(&self, name: &str, day: Option<NaiveDate>) -> Result<(String, bool)> {
        let day = day.unwrap_or_else(|| self.clock.today());
        let (name, removed) = self
            .storage
            .update(|db| {
                let removed = db.unmark(name, day)?;
                Ok((db.get(name)?.name.clone(), removed))
            })
            .await?;
        if removed {
            info!("Removed completion of {name} on {day}");
        }
        Ok((name, removed))
    }

    /// Clears every completion of a task and keeps the task. Returns the number of removed days.
    #[instrument(skip(self))]
    pub async fn reset(&self, name: &str) -> Result<(String, usize)> {
        let (name, removed) = self
            .storage
            .update(|db| {
                let removed = db.reset(name)?;
                Ok((db.get(name)?.name.clone(), removed))
            })
            .await?;
        info!("Reset {name}, removed {removed} completions");
        Ok((name, removed))
    }

    pub async fn task_summary(&self, name: &str) -> Result<TaskSummary> {
        let db = self.storage.load().await?;
        Ok(self.summarize(db.get(name)?))
    }

    /// Summaries of every task ordered by name.
    pub async fn summaries(&self) -> Result<Vec<TaskSummary>> {
        let db = self.storage.load().await?;
        Ok(db.tasks().map(|v| self.summarize(v)).collect())
    }

    /// Best streak across all tasks.
    pub async fn overall_best(&self) -> Result<u32> {
        Ok(self
            .summaries()
            .await?
            .iter()
            .map(|v| v.streaks.best)
            .max()
            .unwrap_or(0))
    }

    pub async fn total_marks(&self) -> Result<usize> {
        Ok(self.storage.load().await?.total_marks())
    }

    /// Names of tasks completed on `day`, today by default.
    pub async fn completed_on(&self, day: Option<NaiveDate>) -> Result<(NaiveDate, Vec<String>)> {
        let day = day.unwrap_or_else(|| self.clock.today());
        let db: TaskDatabase = self.storage.load().await?;
        let names = db.completed_on(day).map(|v| v.name.clone()).collect();
        Ok((day, names))
    }

    fn summarize(&self, task: &TaskEntity) -> TaskSummary {
        TaskSummary {
            name: task.name.clone(),
            streaks: compute_streaks_with_grace(
                &task.done_days,
                self.clock.today(),
                self.grace_days,
            ),
            total_days: task.done_days.len(),
            done_days: task.done_days.clone(),
        }
    }
}
