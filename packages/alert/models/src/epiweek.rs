//! Epidemiological week calendar.
//!
//! Weeks run Sunday to Saturday. Week 1 of a year is the first week with
//! at least four days in that year, so the epidemiological year starts on
//! the Sunday on or before January 4th. Weeks are encoded as
//! `year * 100 + week` (e.g. `202405`), the same form the case-alert feed
//! uses.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest week number an epidemiological year can have.
pub const MAX_WEEK: u32 = 53;

/// Errors from constructing epidemiological weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EpiWeekError {
    /// Week number outside `1..=53`.
    #[error("invalid epidemiological week {week} in {year}")]
    InvalidWeek {
        /// Year component.
        year: u32,
        /// Rejected week component.
        week: u32,
    },

    /// The date cannot be placed on the calendar.
    #[error("date out of supported range")]
    OutOfRange,

    /// A range whose start is after its end.
    #[error("range start {start} is after end {end}")]
    InvertedRange {
        /// Encoded start week.
        start: u32,
        /// Encoded end week.
        end: u32,
    },
}

/// An epidemiological week, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EpiWeek(u32);

impl EpiWeek {
    /// Builds a week from its components.
    ///
    /// # Errors
    ///
    /// Returns [`EpiWeekError::InvalidWeek`] if `week` is not in `1..=53`
    /// or `year` is too large to encode.
    pub const fn new(year: u32, week: u32) -> Result<Self, EpiWeekError> {
        if week == 0 || week > MAX_WEEK {
            return Err(EpiWeekError::InvalidWeek { year, week });
        }
        match year.checked_mul(100) {
            Some(base) => match base.checked_add(week) {
                Some(encoded) => Ok(Self(encoded)),
                None => Err(EpiWeekError::InvalidWeek { year, week }),
            },
            None => Err(EpiWeekError::InvalidWeek { year, week }),
        }
    }

    /// Decodes a `year * 100 + week` value.
    ///
    /// # Errors
    ///
    /// Returns [`EpiWeekError::InvalidWeek`] if the week part is invalid.
    pub const fn from_encoded(encoded: u32) -> Result<Self, EpiWeekError> {
        Self::new(encoded / 100, encoded % 100)
    }

    /// The week containing `date`.
    ///
    /// # Errors
    ///
    /// Returns [`EpiWeekError::OutOfRange`] for dates before year 0 or at
    /// the edges of the supported calendar.
    pub fn from_date(date: NaiveDate) -> Result<Self, EpiWeekError> {
        let mut year = date.year();
        if date >= year_start(year + 1)? {
            year += 1;
        } else if date < year_start(year)? {
            year -= 1;
        }

        let start = year_start(year)?;
        let days = (date - start).num_days();
        let week = u32::try_from(days / 7 + 1).map_err(|_| EpiWeekError::OutOfRange)?;
        let year = u32::try_from(year).map_err(|_| EpiWeekError::OutOfRange)?;
        Self::new(year, week)
    }

    /// The encoded `year * 100 + week` value.
    #[must_use]
    pub const fn encoded(self) -> u32 {
        self.0
    }

    /// Epidemiological year.
    #[must_use]
    pub const fn year(self) -> u32 {
        self.0 / 100
    }

    /// Week number within the year.
    #[must_use]
    pub const fn week(self) -> u32 {
        self.0 % 100
    }

    /// The Sunday that opens this week.
    ///
    /// # Errors
    ///
    /// Returns [`EpiWeekError::OutOfRange`] if the year cannot be
    /// represented.
    pub fn start_date(self) -> Result<NaiveDate, EpiWeekError> {
        let year = i32::try_from(self.year()).map_err(|_| EpiWeekError::OutOfRange)?;
        year_start(year)?
            .checked_add_days(Days::new(u64::from(self.week() - 1) * 7))
            .ok_or(EpiWeekError::OutOfRange)
    }
}

impl std::fmt::Display for EpiWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}W{:02}", self.year(), self.week())
    }
}

impl TryFrom<u32> for EpiWeek {
    type Error = EpiWeekError;

    fn try_from(encoded: u32) -> Result<Self, Self::Error> {
        Self::from_encoded(encoded)
    }
}

impl From<EpiWeek> for u32 {
    fn from(week: EpiWeek) -> Self {
        week.0
    }
}

/// First day (a Sunday) of an epidemiological year.
fn year_start(year: i32) -> Result<NaiveDate, EpiWeekError> {
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4).ok_or(EpiWeekError::OutOfRange)?;
    let offset = u64::from(jan4.weekday().num_days_from_sunday());
    jan4.checked_sub_days(Days::new(offset))
        .ok_or(EpiWeekError::OutOfRange)
}

/// An inclusive range of epidemiological weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpiWeekRange {
    /// First week (inclusive).
    pub start: EpiWeek,
    /// Last week (inclusive).
    pub end: EpiWeek,
}

impl EpiWeekRange {
    /// Builds a range.
    ///
    /// # Errors
    ///
    /// Returns [`EpiWeekError::InvertedRange`] if `start > end`.
    pub const fn new(start: EpiWeek, end: EpiWeek) -> Result<Self, EpiWeekError> {
        if start.0 > end.0 {
            return Err(EpiWeekError::InvertedRange {
                start: start.0,
                end: end.0,
            });
        }
        Ok(Self { start, end })
    }

    /// The `weeks` most recent weeks ending with the week containing
    /// `today`. A zero count is treated as one week.
    ///
    /// # Errors
    ///
    /// Returns [`EpiWeekError::OutOfRange`] if the calendar arithmetic
    /// leaves the supported range.
    pub fn trailing(today: NaiveDate, weeks: u32) -> Result<Self, EpiWeekError> {
        let back = u64::from(weeks.max(1) - 1) * 7;
        let first_day = today
            .checked_sub_days(Days::new(back))
            .ok_or(EpiWeekError::OutOfRange)?;
        Self::new(EpiWeek::from_date(first_day)?, EpiWeek::from_date(today)?)
    }

    /// Whether `week` falls inside the range.
    #[must_use]
    pub fn contains(&self, week: EpiWeek) -> bool {
        week >= self.start && week <= self.end
    }
}

impl std::fmt::Display for EpiWeekRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_invalid_week_numbers() {
        assert!(EpiWeek::new(2024, 0).is_err());
        assert!(EpiWeek::new(2024, 54).is_err());
        assert!(EpiWeek::from_encoded(202_400).is_err());
        assert_eq!(EpiWeek::from_encoded(202_453).unwrap().week(), 53);
    }

    #[test]
    fn years_too_large_to_encode_are_rejected() {
        assert_eq!(
            EpiWeek::new(u32::MAX, 1),
            Err(EpiWeekError::InvalidWeek {
                year: u32::MAX,
                week: 1
            })
        );
        assert!(EpiWeek::new(u32::MAX / 100 + 1, 1).is_err());
        assert!(EpiWeek::new(u32::MAX / 100, 53).is_ok());
        assert!(EpiWeek::new(9999, 53).is_ok());
    }

    #[test]
    fn year_starting_on_wednesday_begins_previous_december() {
        // 2025-01-01 is a Wednesday: week 1 starts Sunday 2024-12-29.
        let w = EpiWeek::from_date(date(2024, 12, 29)).unwrap();
        assert_eq!(w.encoded(), 202_501);
        assert_eq!(w.start_date().unwrap(), date(2024, 12, 29));
    }

    #[test]
    fn year_starting_on_thursday_begins_after_new_year() {
        // 2015-01-01 is a Thursday: 2015W01 starts Sunday 2015-01-04 and
        // the days before it close 2014's 53rd week.
        assert_eq!(EpiWeek::from_date(date(2015, 1, 3)).unwrap().encoded(), 201_453);
        assert_eq!(EpiWeek::from_date(date(2015, 1, 4)).unwrap().encoded(), 201_501);
    }

    #[test]
    fn fifty_three_week_years() {
        // 2020 ends with week 53 (2020-12-27 .. 2021-01-02).
        assert_eq!(EpiWeek::from_date(date(2021, 1, 2)).unwrap().encoded(), 202_053);
        assert_eq!(EpiWeek::from_date(date(2021, 1, 3)).unwrap().encoded(), 202_101);
    }

    #[test]
    fn mid_year_week() {
        // 2024W10 runs 2024-03-03 .. 2024-03-09.
        let w = EpiWeek::from_date(date(2024, 3, 6)).unwrap();
        assert_eq!(w.encoded(), 202_410);
        assert_eq!(w.start_date().unwrap(), date(2024, 3, 3));
        assert_eq!(w.to_string(), "2024W10");
    }

    #[test]
    fn trailing_range_spans_year_boundary() {
        let range = EpiWeekRange::trailing(date(2025, 1, 8), 4).unwrap();
        assert_eq!(range.end.encoded(), 202_502);
        assert_eq!(range.start.encoded(), 202_451);
        assert!(range.contains(EpiWeek::from_encoded(202_452).unwrap()));
        assert!(!range.contains(EpiWeek::from_encoded(202_503).unwrap()));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let a = EpiWeek::from_encoded(202_410).unwrap();
        let b = EpiWeek::from_encoded(202_401).unwrap();
        assert!(EpiWeekRange::new(a, b).is_err());
        assert!(EpiWeekRange::new(b, a).is_ok());
    }
}
