use crate::prelude::*;

/// UTC bounds of a calendar day as a half-open range `[start, end)`.
///
/// Solvency checks and daily reports must bucket by the same rule, so both go
/// through here.
pub fn day_bounds(date: Date) -> (DateTime, DateTime) {
  let start = date.and_time(NaiveTime::MIN);
  (start, start + TimeDelta::days(1))
}

pub fn today() -> Date {
  Utc::now().date_naive()
}
