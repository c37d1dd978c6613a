use chrono::NaiveDate;

/// Format used for storing days and for `YYYY-MM-DD` date arguments.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a day to a string in streaks.
pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Short form used under calendar marks.
pub fn format_short_day(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

/// Iterates `span` days ending with `last` (inclusive), oldest first.
pub fn days_ending_at(last: NaiveDate, span: u32) -> impl Iterator<Item = NaiveDate> {
    (0..span)
        .rev()
        .filter_map(move |offset| last.checked_sub_days(chrono::Days::new(offset.into())))
}
