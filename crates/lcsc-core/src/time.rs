//! Clock and time-zone helpers.
//!
//! Nothing in this crate reads the process time zone. Every computation takes
//! an explicit [`Tz`], and "now" comes from a [`Clock`] that is read once per
//! request.

use chrono::{
  DateTime, Datelike as _, Days, Duration, LocalResult, NaiveDate,
  NaiveDateTime, TimeZone as _, Utc,
};
use chrono_tz::Tz;

use crate::{Error, Result};

/// Source of the current instant.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock frozen at one instant; used by tests and for replaying requests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}

/// Parse an IANA zone name such as `America/Vancouver`.
pub fn parse_zone(name: &str) -> Result<Tz> {
  name
    .parse::<Tz>()
    .map_err(|_| Error::UnknownTimeZone(name.to_owned()))
}

/// The Sunday that starts the local week containing `now`.
pub fn reference_week_start(now: DateTime<Utc>, zone: Tz) -> NaiveDate {
  let today = now.with_timezone(&zone).date_naive();
  let back = u64::from(today.weekday().num_days_from_sunday());
  today - Days::new(back)
}

/// Resolve a local wall-clock reading to an instant in `zone`.
///
/// Ambiguous readings (the repeated hour when clocks fall back) resolve to the
/// earlier instant. Readings inside a spring-forward gap do not exist; they
/// resolve to the same wall-clock reading one hour later.
pub fn localize(zone: Tz, local: NaiveDateTime) -> DateTime<Tz> {
  match zone.from_local_datetime(&local) {
    LocalResult::Single(dt) => dt,
    LocalResult::Ambiguous(earliest, _) => earliest,
    LocalResult::None => zone
      .from_local_datetime(&(local + Duration::hours(1)))
      .earliest()
      .unwrap_or_else(|| zone.from_utc_datetime(&local)),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Datelike, NaiveTime, TimeZone, Timelike as _, Weekday};

  use super::*;

  const VANCOUVER: Tz = chrono_tz::America::Vancouver;

  #[test]
  fn reference_week_starts_on_sunday() {
    // Wednesday 2024-06-12 12:00 local.
    let now = Utc.with_ymd_and_hms(2024, 6, 12, 19, 0, 0).unwrap();
    let start = reference_week_start(now, VANCOUVER);
    assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
    assert_eq!(start.weekday(), Weekday::Sun);
  }

  #[test]
  fn reference_week_uses_the_local_date() {
    // 2024-06-16 05:00 UTC is still Saturday evening in Vancouver.
    let now = Utc.with_ymd_and_hms(2024, 6, 16, 5, 0, 0).unwrap();
    assert_eq!(
      reference_week_start(now, VANCOUVER),
      NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
    );
    // ...but already Sunday in UTC.
    assert_eq!(
      reference_week_start(now, Tz::UTC),
      NaiveDate::from_ymd_opt(2024, 6, 16).unwrap()
    );
  }

  #[test]
  fn localize_skips_spring_forward_gap() {
    // 2024-03-10 02:30 does not exist in Vancouver.
    let local = NaiveDate::from_ymd_opt(2024, 3, 10)
      .unwrap()
      .and_time(NaiveTime::from_hms_opt(2, 30, 0).unwrap());
    let dt = localize(VANCOUVER, local);
    assert_eq!(dt.hour(), 3);
    assert_eq!(dt.minute(), 30);
  }

  #[test]
  fn localize_takes_earliest_when_ambiguous() {
    // 2024-11-03 01:30 happens twice in Vancouver; the first is PDT (-07:00).
    let local = NaiveDate::from_ymd_opt(2024, 11, 3)
      .unwrap()
      .and_time(NaiveTime::from_hms_opt(1, 30, 0).unwrap());
    let dt = localize(VANCOUVER, local);
    assert_eq!(dt.with_timezone(&Utc).hour(), 8);
  }

  #[test]
  fn unknown_zone_is_an_error() {
    assert!(matches!(
      parse_zone("Mars/Olympus_Mons"),
      Err(Error::UnknownTimeZone(_))
    ));
    assert_eq!(parse_zone("America/Vancouver").unwrap(), VANCOUVER);
  }
}
