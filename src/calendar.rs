use std::collections::BTreeSet;

use ansi_term::Colour::Green;
use chrono::NaiveDate;

use crate::utils::time::{days_ending_at, format_short_day};

pub const DEFAULT_CALENDAR_DAYS: u32 = 14;
pub const MAX_CALENDAR_DAYS: u32 = 366;

const DONE_MARK: &str = "O";
const MISSED_MARK: &str = ".";

/// Returns a compact calendar for the `span` days ending with `today`: a line of marks (`O` for
/// done, `.` for missed) and a line of `MM-DD` dates underneath.
pub fn mini_calendar(
    done_days: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    span: u32,
    colored: bool,
) -> String {
    let mut marks = String::new();
    let mut dates = Vec::new();
    for day in days_ending_at(today, span) {
        if done_days.contains(&day) {
            if colored {
                marks.push_str(&Green.bold().paint(DONE_MARK).to_string());
            } else {
                marks.push_str(DONE_MARK);
            }
        } else {
            marks.push_str(MISSED_MARK);
        }
        dates.push(format_short_day(day));
    }
    format!("{marks}\n{}", dates.join(" "))
}
