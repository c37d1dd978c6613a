use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use chrono_english::parse_date_string;
use clap::ValueEnum;

use crate::{error::TrackerError, streak::parse_day};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct DateArgs {
    #[arg(
        long = "date",
        short,
        help = "Day to use instead of today. Examples are \"2025-03-15\", \"yesterday\", \"3 days ago\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl DateArgs {
    /// `None` when no date was given, so the caller falls back to `today`. Relative phrases
    /// like "yesterday" count from `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<Option<NaiveDate>, TrackerError> {
        self.date
            .as_deref()
            .map(|v| parse_date_arg(v, reference_time(today), self.date_style))
            .transpose()
    }
}

/// Local noon of `day`, the instant relative phrases are parsed against.
pub fn reference_time(day: NaiveDate) -> DateTime<Local> {
    let noon = day.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    noon.and_local_timezone(Local)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&noon))
}

/// Accepts `YYYY-MM-DD` first and falls back to english phrases relative to `now`.
pub fn parse_date_arg(
    value: &str,
    now: DateTime<Local>,
    style: DateStyle,
) -> Result<NaiveDate, TrackerError> {
    if let Ok(day) = parse_day(value) {
        return Ok(day);
    }
    parse_date_string(value.trim(), now, style.into())
        .map(|v| v.date_naive())
        .map_err(|_| TrackerError::InvalidDate {
            input: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, NaiveDate, TimeZone};

    use crate::error::TrackerError;

    use super::{parse_date_arg, reference_time, DateStyle};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(parse_date_arg("2024-03-01", now(), DateStyle::Uk), Ok(day(3, 1)));
    }

    #[test]
    fn test_relative_dates() {
        assert_eq!(parse_date_arg("yesterday", now(), DateStyle::Uk), Ok(day(3, 9)));
        assert_eq!(parse_date_arg("3 days ago", now(), DateStyle::Uk), Ok(day(3, 7)));
    }

    #[test]
    fn test_dialects() {
        assert_eq!(parse_date_arg("02/03/2024", now(), DateStyle::Uk), Ok(day(3, 2)));
        assert_eq!(parse_date_arg("02/03/2024", now(), DateStyle::Us), Ok(day(2, 3)));
    }

    #[test]
    fn test_reference_time_stays_on_day() {
        for d in [day(1, 1), day(3, 31), day(10, 27), day(12, 31)] {
            assert_eq!(reference_time(d).date_naive(), d);
        }
    }

    #[test]
    fn test_relative_dates_follow_reference_day() {
        let today = day(1, 3);
        assert_eq!(
            parse_date_arg("yesterday", reference_time(today), DateStyle::Uk),
            Ok(day(1, 2))
        );
    }

    #[test]
    fn test_invalid_date() {
        assert_eq!(
            parse_date_arg("someday", now(), DateStyle::Uk),
            Err(TrackerError::InvalidDate {
                input: "someday".into()
            })
        );
    }
}
