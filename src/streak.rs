//! Streak math. A streak is a maximal run of consecutive days on which a task was done.
//!
//! Everything here is pure: the reference day is always passed in, so callers decide what
//! "today" means (see [crate::utils::clock::Clock]).

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::{error::TrackerError, utils::time::DAY_FORMAT};

/// How many days may pass after the last completion before the streak stops being current.
/// With 1, a task done yesterday still has a live streak today.
pub const DEFAULT_GRACE_DAYS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    pub current: u32,
    pub best: u32,
}

/// Computes streaks with [DEFAULT_GRACE_DAYS].
pub fn compute_streaks<'a>(
    days: impl IntoIterator<Item = &'a NaiveDate>,
    today: NaiveDate,
) -> Streaks {
    compute_streaks_with_grace(days, today, DEFAULT_GRACE_DAYS)
}

/// Scans the days in ascending order once. `best` is the longest run found, `current` is the
/// run ending at the latest day, but only if that day is at most `grace_days` before `today`.
pub fn compute_streaks_with_grace<'a>(
    days: impl IntoIterator<Item = &'a NaiveDate>,
    today: NaiveDate,
    grace_days: u32,
) -> Streaks {
    let days: BTreeSet<NaiveDate> = days.into_iter().copied().collect();

    let mut best = 0;
    let mut running = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        running = match previous {
            Some(previous) if previous.succ_opt() == Some(day) => running + 1,
            _ => 1,
        };
        best = best.max(running);
        previous = Some(day);
    }

    let current = match previous {
        Some(last) if (0..=i64::from(grace_days)).contains(&(today - last).num_days()) => running,
        _ => 0,
    };

    Streaks { current, best }
}

/// Parses a `YYYY-MM-DD` day.
pub fn parse_day(value: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT).map_err(|_| TrackerError::InvalidDate {
        input: value.to_string(),
    })
}

/// Same as [compute_streaks], for days that are still strings. Fails on the first day that
/// isn't a calendar date.
pub fn compute_streaks_from_str<S: AsRef<str>>(
    days: &[S],
    today: NaiveDate,
) -> Result<Streaks, TrackerError> {
    let days = days
        .iter()
        .map(|v| parse_day(v.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(compute_streaks(&days, today))
}
