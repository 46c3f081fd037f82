use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_YEAR: i32 = 9999;

/// Inclusive range of calendar days (UTC) used by the squad aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportPeriod {
    /// Returns `None` when either bound is missing, malformed, outside years
    /// 1..=9999, or the range is reversed.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start_date = parse_date(start?)?;
        let end_date = parse_date(end?)?;
        if end_date < start_date {
            return None;
        }
        Some(ReportPeriod {
            start_date,
            end_date,
        })
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.start_date.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last millisecond of `end_date`, saturating at the largest representable instant.
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.end_date
            .and_time(NaiveTime::MIN)
            .and_utc()
            .checked_add_signed(Duration::days(1))
            .and_then(|next_day| next_day.checked_sub_signed(Duration::milliseconds(1)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.starts_at() && instant <= self.ends_at()
    }

    pub fn total_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()?;
    (1..=MAX_YEAR).contains(&date.year()).then_some(date)
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.start_date.format(DATE_FORMAT),
            self.end_date.format(DATE_FORMAT)
        )
    }
}
