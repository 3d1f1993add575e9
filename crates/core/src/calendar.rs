//! Half-open date ranges for stays, blocks and availability windows.
//!
//! A range `[start, end)` covers the *nights* `start, start+1, .., end-1`.
//! The end date is the departure day and is not occupied.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest range accepted anywhere in the system.
pub const MAX_RANGE_NIGHTS: i64 = 366;

/// Errors building a date range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    /// End is on or before start.
    #[error("end date {end} must be after start date {start}")]
    EndNotAfterStart {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Range is longer than [`MAX_RANGE_NIGHTS`].
    #[error("date range of {nights} nights exceeds the maximum of {MAX_RANGE_NIGHTS}")]
    TooLong {
        /// Requested number of nights.
        nights: i64,
    },
}

/// A validated half-open `[start, end)` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange", into = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DateRangeError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl From<DateRange> for RawDateRange {
    fn from(range: DateRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl DateRange {
    /// Creates a range, rejecting `end <= start` and over-long ranges.
    ///
    /// # Errors
    ///
    /// Returns `DateRangeError` when the bounds are invalid.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end <= start {
            return Err(DateRangeError::EndNotAfterStart { start, end });
        }
        let nights = (end - start).num_days();
        if nights > MAX_RANGE_NIGHTS {
            return Err(DateRangeError::TooLong { nights });
        }
        Ok(Self { start, end })
    }

    /// Creates the single-night range starting at `date`.
    #[must_use]
    pub fn single_night(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date + Duration::days(1),
        }
    }

    /// First night (arrival date).
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Departure date (not occupied).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights covered.
    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days()).unwrap_or(0)
    }

    /// Returns true when the night of `date` is inside the range.
    #[must_use]
    pub fn contains_night(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Returns true when the two ranges share at least one night.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Iterates over every night in the range.
    pub fn iter_nights(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d < end)
    }

    /// Nights shared with `other`, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }

    /// Returns true when any night falls on a Friday or Saturday.
    #[must_use]
    pub fn includes_weekend_night(&self) -> bool {
        self.iter_nights()
            .any(|d| matches!(d.weekday(), Weekday::Fri | Weekday::Sat))
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_end_before_or_equal_start() {
        assert!(matches!(
            DateRange::new(date(2025, 2, 4), date(2025, 2, 4)),
            Err(DateRangeError::EndNotAfterStart { .. })
        ));
        assert!(DateRange::new(date(2025, 2, 4), date(2025, 2, 1)).is_err());
    }

    #[test]
    fn test_rejects_overlong_range() {
        assert!(matches!(
            DateRange::new(date(2025, 1, 1), date(2026, 6, 1)),
            Err(DateRangeError::TooLong { .. })
        ));
    }

    #[test]
    fn test_nights_and_iteration() {
        let range = DateRange::new(date(2025, 2, 1), date(2025, 2, 4)).unwrap();
        assert_eq!(range.nights(), 3);
        let nights: Vec<_> = range.iter_nights().collect();
        assert_eq!(nights, vec![date(2025, 2, 1), date(2025, 2, 2), date(2025, 2, 3)]);
        assert!(!range.contains_night(date(2025, 2, 4)));
    }

    #[test]
    fn test_back_to_back_stays_do_not_overlap() {
        let first = DateRange::new(date(2025, 2, 1), date(2025, 2, 4)).unwrap();
        let second = DateRange::new(date(2025, 2, 4), date(2025, 2, 6)).unwrap();
        assert!(!first.overlaps(&second));
        assert!(first.intersection(&second).is_none());
    }

    #[test]
    fn test_intersection() {
        let first = DateRange::new(date(2025, 2, 1), date(2025, 2, 4)).unwrap();
        let second = DateRange::new(date(2025, 2, 2), date(2025, 2, 3)).unwrap();
        assert_eq!(first.intersection(&second), Some(second));
    }

    #[test]
    fn test_weekend_detection() {
        // 2025-02-07 is a Friday.
        let weekend = DateRange::new(date(2025, 2, 7), date(2025, 2, 8)).unwrap();
        let weekdays = DateRange::new(date(2025, 2, 3), date(2025, 2, 6)).unwrap();
        assert!(weekend.includes_weekend_night());
        assert!(!weekdays.includes_weekend_night());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: DateRange =
            serde_json::from_str(r#"{"start":"2025-02-01","end":"2025-02-04"}"#).unwrap();
        assert_eq!(ok.nights(), 3);
        let bad: Result<DateRange, _> =
            serde_json::from_str(r#"{"start":"2025-02-04","end":"2025-02-01"}"#);
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric_and_matches_shared_nights(
            a_start in 0i64..60, a_len in 1i64..15,
            b_start in 0i64..60, b_len in 1i64..15,
        ) {
            let base = date(2025, 1, 1);
            let a = DateRange::new(base + Duration::days(a_start), base + Duration::days(a_start + a_len)).unwrap();
            let b = DateRange::new(base + Duration::days(b_start), base + Duration::days(b_start + b_len)).unwrap();

            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            let shared = a.iter_nights().any(|d| b.contains_night(d));
            prop_assert_eq!(a.overlaps(&b), shared);
        }
    }
}
