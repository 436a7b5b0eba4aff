//! Calendar period windows
//!
//! A single boundary function produces the half-open UTC window for every
//! grouping granularity. Both the store's range queries and the dashboard
//! labels go through it, so the two can never disagree on where a week or
//! month begins.
//!
//! Conventions: weeks start on Monday, and all calendar math is done in UTC.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Calendar grouping granularity for session statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    /// Returns the identifier used in CLI arguments and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Returns the half-open UTC window `[start, end)` containing `anchor`.
    ///
    /// Any anchor inside the window produces the same window, so querying a
    /// week by its Monday or its Sunday returns the same set of sessions.
    pub fn window(&self, anchor: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let date = anchor.date_naive();
        let (start, end) = match self {
            Period::Day => (date, date + Days::new(1)),
            Period::Week => {
                let monday = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
                (monday, monday + Days::new(7))
            }
            Period::Month => {
                let first = first_of_month(date.year(), date.month());
                let next = if date.month() == 12 {
                    first_of_month(date.year() + 1, 1)
                } else {
                    first_of_month(date.year(), date.month() + 1)
                };
                (first, next)
            }
            Period::Year => (
                first_of_month(date.year(), 1),
                first_of_month(date.year() + 1, 1),
            ),
        };
        (midnight(start), midnight(end))
    }

    /// Human-readable label for the window containing `anchor`,
    /// e.g. "Monday, March 03, 2025" or "Mar 03 - Mar 09, 2025".
    pub fn label(&self, anchor: DateTime<Utc>) -> String {
        let (start, end) = self.window(anchor);
        match self {
            Period::Day => start.format("%A, %B %d, %Y").to_string(),
            Period::Week => {
                let last_day = end - Days::new(1);
                format!(
                    "{} - {}",
                    start.format("%b %d"),
                    last_day.format("%b %d, %Y")
                )
            }
            Period::Month => start.format("%B %Y").to_string(),
            Period::Year => start.format("%Y").to_string(),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Day 1 exists in every month; the fallback is unreachable
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" | "Day" => Ok(Period::Day),
            "week" | "Week" => Ok(Period::Week),
            "month" | "Month" => Ok(Period::Month),
            "year" | "Year" => Ok(Period::Year),
            _ => Err(format!("unknown period: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn test_day_window() {
        let (start, end) = Period::Day.window(at(2025, 3, 5, 14));
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_week_starts_monday() {
        // 2025-03-05 is a Wednesday; the containing week is Mar 3 - Mar 10
        let (start, end) = Period::Week.window(at(2025, 3, 5, 14));
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_week_window_same_for_every_day_in_week() {
        let wednesday = Period::Week.window(at(2025, 3, 5, 14));
        let monday = Period::Week.window(at(2025, 3, 3, 0));
        let sunday = Period::Week.window(at(2025, 3, 9, 23));
        assert_eq!(wednesday, monday);
        assert_eq!(wednesday, sunday);
    }

    #[test]
    fn test_month_window_december_rolls_over() {
        let (start, end) = Period::Month.window(at(2024, 12, 15, 9));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_year_window() {
        let (start, end) = Period::Year.window(at(2025, 7, 4, 12));
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Period::Day.label(at(2025, 3, 5, 14)), "Wednesday, March 05, 2025");
        assert_eq!(Period::Week.label(at(2025, 3, 5, 14)), "Mar 03 - Mar 09, 2025");
        assert_eq!(Period::Month.label(at(2025, 3, 5, 14)), "March 2025");
        assert_eq!(Period::Year.label(at(2025, 3, 5, 14)), "2025");
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert!("fortnight".parse::<Period>().is_err());
    }
}
