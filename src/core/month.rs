//! Month keys - the first-of-month dates that key budgets and bucket transactions.

use crate::errors::{Error, Result};
use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month, represented by its first day.
///
/// Aggregation windows are half-open: `[start, next().start())`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        // day 1 always exists
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Builds a month key from a year and a 1-based month number.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| Error::validation(format!("Invalid month: {year}-{month:02}")))
    }

    /// The current month in UTC.
    #[must_use]
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    /// Parses `YYYY-MM` or a first-of-month `YYYY-MM-DD`.
    ///
    /// A full date that is not the first of its month is rejected rather than truncated,
    /// so a caller cannot budget "2024-01-15" by accident.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            if date.day() != 1 {
                return Err(Error::validation(format!(
                    "Month must be the first day of a month, got {input}"
                )));
            }
            return Ok(Self(date));
        }
        NaiveDate::parse_from_str(&format!("{input}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| Error::validation(format!("Invalid month: {input}")))
    }

    /// First day of the month.
    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.0
    }

    /// The following month; its start is this month's exclusive end.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.checked_add_months(Months::new(1)).unwrap_or(self.0))
    }

    /// Whether `date` falls inside this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start() && date < self.next().start()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

impl From<MonthKey> for NaiveDate {
    fn from(value: MonthKey) -> Self {
        value.0
    }
}
