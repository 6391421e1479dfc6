//! Slot aggregator: hourly availability over a multi-week window.
//!
//! Intervals are bucketed once, before any slot is visited. Recurring
//! intervals land in buckets keyed by `(day of week, hour)` and therefore
//! apply to every week of the window. Absolute intervals land in buckets keyed
//! by `(date, hour)` and apply only where they actually happen. The slot pass
//! then does two map lookups per slot.

use std::collections::{HashMap, HashSet};

use chrono::{
  DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike as _,
  Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  normalize::{CanonicalInterval, IntervalKind},
  role::{Role, scope_label},
  store::DateWindow,
  time::localize,
};

pub const DEFAULT_DAY_START_HOUR: u32 = 7;
pub const DEFAULT_DAY_END_HOUR: u32 = 20;

/// Longest window that may be aggregated.
pub const MAX_WEEKS: u32 = 52;

const SECS_PER_HOUR: u32 = 3_600;

// ─── Window ──────────────────────────────────────────────────────────────────

/// The span of days and operating hours an aggregation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  zone:                 Tz,
  reference_week_start: NaiveDate,
  number_of_weeks:      u32,
  day_start_hour:       u32,
  day_end_hour:         u32,
}

impl Window {
  /// Fails with [`Error::InvalidWindow`] unless
  /// `day_start_hour < day_end_hour <= 24` and
  /// `number_of_weeks <= MAX_WEEKS`.
  pub fn new(
    zone: Tz,
    reference_week_start: NaiveDate,
    number_of_weeks: u32,
    day_start_hour: u32,
    day_end_hour: u32,
  ) -> Result<Self> {
    if day_start_hour >= day_end_hour {
      return Err(Error::InvalidWindow(format!(
        "day starts at {day_start_hour}:00 but ends at {day_end_hour}:00"
      )));
    }
    if day_end_hour > 24 {
      return Err(Error::InvalidWindow(format!(
        "day_end_hour {day_end_hour} is past midnight"
      )));
    }
    if number_of_weeks > MAX_WEEKS {
      return Err(Error::InvalidWindow(format!(
        "{number_of_weeks} weeks; at most {MAX_WEEKS} allowed"
      )));
    }
    Ok(Self {
      zone,
      reference_week_start,
      number_of_weeks,
      day_start_hour,
      day_end_hour,
    })
  }

  /// A window with the default 07:00–20:00 operating hours.
  pub fn with_default_hours(
    zone: Tz,
    reference_week_start: NaiveDate,
    number_of_weeks: u32,
  ) -> Result<Self> {
    Self::new(
      zone,
      reference_week_start,
      number_of_weeks,
      DEFAULT_DAY_START_HOUR,
      DEFAULT_DAY_END_HOUR,
    )
  }

  pub fn zone(&self) -> Tz { self.zone }

  pub fn reference_week_start(&self) -> NaiveDate { self.reference_week_start }

  pub fn number_of_weeks(&self) -> u32 { self.number_of_weeks }

  pub fn hours(&self) -> std::ops::Range<u32> {
    self.day_start_hour..self.day_end_hour
  }

  pub fn days(&self) -> u32 { self.number_of_weeks * 7 }

  /// Number of slots [`aggregate`] will produce for this window.
  pub fn slot_count(&self) -> usize {
    self.days() as usize * self.hours().len()
  }

  fn date(&self, day_index: u32) -> NaiveDate {
    self.reference_week_start + Days::new(u64::from(day_index))
  }

  fn last_date(&self) -> Option<NaiveDate> {
    self.days().checked_sub(1).map(|i| self.date(i))
  }

  /// The start instant of the slot at `hour` on `date`.
  fn slot_start(&self, date: NaiveDate, hour: u32) -> DateTime<Tz> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    localize(self.zone, date.and_time(time))
  }

  /// Whole local days covered by the window, as UTC instants; used to fetch
  /// only the temporary events that can matter.
  pub fn date_range(&self) -> DateWindow {
    let first = self.reference_week_start;
    let after = self.date(self.days());
    let midnight =
      |d: NaiveDate| localize(self.zone, d.and_time(NaiveTime::MIN));
    DateWindow {
      from: midnight(first).with_timezone(&Utc),
      to:   midnight(after).with_timezone(&Utc),
    }
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Availability for one hour-long slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
  pub start_date:           DateTime<FixedOffset>,
  pub end_date:             DateTime<FixedOffset>,
  /// Eligible people minus people with a conflicting event. Not clamped: a
  /// negative value means events were counted for people outside the
  /// eligible set.
  pub number_of_people:     i64,
  pub max_people_available: usize,
  /// The role filter this slot was computed for, or `"All"`.
  pub role:                 String,
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Buckets {
  /// `(days since the reference Sunday, hour)` → owners.
  recurring: HashMap<(u32, u32), HashSet<Uuid>>,
  /// `(local date, hour)` → owners.
  absolute:  HashMap<(NaiveDate, u32), HashSet<Uuid>>,
}

impl Buckets {
  fn build(
    intervals: &[CanonicalInterval],
    window: &Window,
    role_filter: Option<Role>,
  ) -> Self {
    let mut buckets = Self::default();
    for interval in intervals.iter().filter(|iv| iv.in_scope(role_filter)) {
      match interval.kind {
        IntervalKind::Recurring { day_of_week, start_time, end_time } => buckets
          .add_recurring(
            interval.owner,
            u32::from(day_of_week),
            start_time,
            end_time,
            window,
          ),
        IntervalKind::Absolute => buckets.add_absolute(interval, window),
      }
    }
    buckets
  }

  /// Recurring intervals are matched on their stored wall-clock times so they
  /// land in the same hour of every week regardless of offset changes.
  fn add_recurring(
    &mut self,
    owner: Uuid,
    weekday: u32,
    start: NaiveTime,
    end: NaiveTime,
    window: &Window,
  ) {
    let start_secs = start.num_seconds_from_midnight();
    let end_secs = end.num_seconds_from_midnight();

    for hour in window.hours() {
      let slot_start = hour * SECS_PER_HOUR;
      let slot_end = slot_start + SECS_PER_HOUR;
      if end_secs > slot_start && start_secs < slot_end {
        self
          .recurring
          .entry((weekday, hour))
          .or_default()
          .insert(owner);
      }
    }
  }

  fn add_absolute(&mut self, interval: &CanonicalInterval, window: &Window) {
    let Some(last) = window.last_date() else { return };
    let first = interval.start.date_naive().max(window.reference_week_start);
    let until = interval.end.date_naive().min(last);

    for date in first.iter_days().take_while(|d| *d <= until) {
      for hour in window.hours() {
        let slot_start = window.slot_start(date, hour);
        if interval.overlaps(slot_start, slot_start + Duration::hours(1)) {
          self
            .absolute
            .entry((date, hour))
            .or_default()
            .insert(interval.owner);
        }
      }
    }
  }

  /// Distinct people busy in the slot at `hour` on day `day_index`.
  fn unavailable(&self, day_index: u32, date: NaiveDate, hour: u32) -> usize {
    let recurring = self.recurring.get(&(day_index % 7, hour));
    let absolute = self.absolute.get(&(date, hour));
    match (recurring, absolute) {
      (None, None) => 0,
      (Some(r), None) => r.len(),
      (None, Some(a)) => a.len(),
      (Some(r), Some(a)) => r.len() + a.iter().filter(|p| !r.contains(p)).count(),
    }
  }
}

/// Compute availability for every slot in `window`.
///
/// `total_eligible` must already be restricted to verified people holding
/// `role_filter` when one is given; only intervals owned by holders of that
/// role are counted against it.
pub fn aggregate(
  intervals: &[CanonicalInterval],
  window: &Window,
  total_eligible: usize,
  role_filter: Option<Role>,
) -> Vec<AvailabilitySlot> {
  let buckets = Buckets::build(intervals, window, role_filter);
  let role = scope_label(role_filter);
  let max = i64::try_from(total_eligible).unwrap_or(i64::MAX);

  let mut slots = Vec::with_capacity(window.slot_count());
  for day_index in 0..window.days() {
    let date = window.date(day_index);
    for hour in window.hours() {
      let start = window.slot_start(date, hour);
      let end = start + Duration::hours(1);
      let busy = buckets.unavailable(day_index, date, hour);
      let available = max - busy as i64;

      if available < 0 {
        tracing::warn!(
          slot_start = %start,
          role = %role,
          eligible = total_eligible,
          unavailable = busy,
          "more people busy than eligible; availability is negative"
        );
      }

      slots.push(AvailabilitySlot {
        start_date: start.fixed_offset(),
        end_date: end.fixed_offset(),
        number_of_people: available,
        max_people_available: total_eligible,
        role: role.clone(),
      });
    }
  }
  slots
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap as Map;

  use chrono::{Datelike as _, TimeZone, Timelike as _, Weekday};

  use super::*;
  use crate::{event::RawEvent, normalize::normalize, role::RoleSet};

  const ZONE: Tz = chrono_tz::America::Vancouver;

  fn sunday() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 9).unwrap() }

  fn window(weeks: u32) -> Window {
    Window::with_default_hours(ZONE, sunday(), weeks).unwrap()
  }

  fn permanent(owner: Uuid, day: i64, start: &str, end: &str) -> RawEvent {
    RawEvent {
      event_id:    Uuid::new_v4(),
      person_id:   owner,
      title:       None,
      event_type:  "Permanent".into(),
      day_of_week: Some(day),
      start_time:  Some(start.into()),
      end_time:    Some(end.into()),
      start_date:  None,
      end_date:    None,
    }
  }

  fn temporary(owner: Uuid, start: &str, end: &str) -> RawEvent {
    RawEvent {
      event_id:    Uuid::new_v4(),
      person_id:   owner,
      title:       None,
      event_type:  "Temporary".into(),
      day_of_week: None,
      start_time:  None,
      end_time:    None,
      start_date:  Some(start.into()),
      end_date:    Some(end.into()),
    }
  }

  fn run(
    events: &[RawEvent],
    roles: &Map<Uuid, RoleSet>,
    w: &Window,
    eligible: usize,
    filter: Option<Role>,
  ) -> Vec<AvailabilitySlot> {
    let intervals = normalize(events, w.reference_week_start(), w.zone(), roles);
    aggregate(&intervals, w, eligible, filter)
  }

  fn slot_at<'a>(
    slots: &'a [AvailabilitySlot],
    y: i32,
    m: u32,
    d: u32,
    h: u32,
  ) -> &'a AvailabilitySlot {
    let start = ZONE.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().fixed_offset();
    slots
      .iter()
      .find(|s| s.start_date == start)
      .unwrap_or_else(|| panic!("no slot at {start}"))
  }

  #[test]
  fn slot_count_matches_window() {
    for weeks in [0, 1, 2, 5] {
      let w = window(weeks);
      let slots = aggregate(&[], &w, 3, None);
      assert_eq!(slots.len(), weeks as usize * 7 * 13);
      assert_eq!(slots.len(), w.slot_count());
    }
  }

  #[test]
  fn zero_weeks_is_empty() {
    assert!(aggregate(&[], &window(0), 10, None).is_empty());
  }

  #[test]
  fn slots_are_ordered_hour_long_and_disjoint() {
    let slots = aggregate(&[], &window(2), 1, None);
    for s in &slots {
      assert_eq!(s.end_date - s.start_date, Duration::hours(1));
    }
    for pair in slots.windows(2) {
      assert!(pair[0].end_date <= pair[1].start_date);
    }
    let first = &slots[0];
    assert_eq!(first.start_date.weekday(), Weekday::Sun);
    assert_eq!(first.start_date.hour(), 7);
    assert_eq!(slots.last().unwrap().start_date.hour(), 19);
  }

  #[test]
  fn custom_hours_are_respected() {
    let w = Window::new(ZONE, sunday(), 1, 9, 12).unwrap();
    let slots = aggregate(&[], &w, 1, None);
    assert_eq!(slots.len(), 21);
    assert!(slots.iter().all(|s| (9..12).contains(&s.start_date.hour())));
  }

  #[test]
  fn invalid_hours_are_rejected() {
    assert!(Window::new(ZONE, sunday(), 1, 20, 7).is_err());
    assert!(Window::new(ZONE, sunday(), 1, 7, 7).is_err());
    assert!(Window::new(ZONE, sunday(), 1, 7, 25).is_err());
    assert!(Window::new(ZONE, sunday(), 1, 0, 24).is_ok());
  }

  #[test]
  fn oversized_windows_are_rejected() {
    assert!(Window::new(ZONE, sunday(), MAX_WEEKS, 7, 20).is_ok());
    let err = Window::new(ZONE, sunday(), MAX_WEEKS + 1, 7, 20).unwrap_err();
    assert!(matches!(err, Error::InvalidWindow(_)));
    assert!(Window::with_default_hours(ZONE, sunday(), u32::MAX).is_err());
  }

  #[test]
  fn permanent_event_repeats_every_week() {
    let a = Uuid::new_v4();
    let slots = run(
      &[permanent(a, 1, "09:00", "10:00")],
      &Map::new(),
      &window(3),
      10,
      None,
    );
    for monday in [10, 17, 24] {
      assert_eq!(slot_at(&slots, 2024, 6, monday, 9).number_of_people, 9);
      assert_eq!(slot_at(&slots, 2024, 6, monday, 10).number_of_people, 10);
      assert_eq!(slot_at(&slots, 2024, 6, monday, 8).number_of_people, 10);
    }
  }

  #[test]
  fn temporary_event_only_affects_its_date() {
    let b = Uuid::new_v4();
    let slots = run(
      &[temporary(b, "2024-06-10T09:00:00-07:00", "2024-06-10T10:00:00-07:00")],
      &Map::new(),
      &window(2),
      10,
      None,
    );
    assert_eq!(slot_at(&slots, 2024, 6, 10, 9).number_of_people, 9);
    assert_eq!(slot_at(&slots, 2024, 6, 17, 9).number_of_people, 10);
    assert_eq!(slots.iter().filter(|s| s.number_of_people == 9).count(), 1);
  }

  #[test]
  fn touching_boundaries_do_not_overlap() {
    let a = Uuid::new_v4();
    let slots = run(
      &[permanent(a, 1, "08:00", "09:00")],
      &Map::new(),
      &window(1),
      5,
      None,
    );
    assert_eq!(slot_at(&slots, 2024, 6, 10, 8).number_of_people, 4);
    assert_eq!(slot_at(&slots, 2024, 6, 10, 9).number_of_people, 5);
  }

  #[test]
  fn partial_hours_count_in_every_touched_slot() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let slots = run(
      &[
        permanent(a, 1, "08:30", "09:30"),
        temporary(b, "2024-06-11T08:30:00-07:00", "2024-06-11T09:30:00-07:00"),
      ],
      &Map::new(),
      &window(1),
      5,
      None,
    );
    for day in [10, 11] {
      assert_eq!(slot_at(&slots, 2024, 6, day, 8).number_of_people, 4);
      assert_eq!(slot_at(&slots, 2024, 6, day, 9).number_of_people, 4);
      assert_eq!(slot_at(&slots, 2024, 6, day, 10).number_of_people, 5);
    }
  }

  #[test]
  fn people_not_events_are_counted() {
    let a = Uuid::new_v4();
    let slots = run(
      &[
        permanent(a, 1, "09:00", "10:00"),
        permanent(a, 1, "09:15", "09:45"),
        temporary(a, "2024-06-10T09:00:00-07:00", "2024-06-10T11:00:00-07:00"),
      ],
      &Map::new(),
      &window(1),
      4,
      None,
    );
    assert_eq!(slot_at(&slots, 2024, 6, 10, 9).number_of_people, 3);
    assert_eq!(slot_at(&slots, 2024, 6, 10, 10).number_of_people, 3);
  }

  #[test]
  fn temporary_spanning_days_is_clipped_to_operating_hours() {
    let a = Uuid::new_v4();
    let slots = run(
      &[temporary(a, "2024-06-11T18:00:00-07:00", "2024-06-13T08:00:00-07:00")],
      &Map::new(),
      &window(1),
      2,
      None,
    );
    assert_eq!(slot_at(&slots, 2024, 6, 11, 17).number_of_people, 2);
    assert_eq!(slot_at(&slots, 2024, 6, 11, 18).number_of_people, 1);
    assert_eq!(slot_at(&slots, 2024, 6, 12, 7).number_of_people, 1);
    assert_eq!(slot_at(&slots, 2024, 6, 12, 19).number_of_people, 1);
    assert_eq!(slot_at(&slots, 2024, 6, 13, 7).number_of_people, 1);
    assert_eq!(slot_at(&slots, 2024, 6, 13, 8).number_of_people, 2);
  }

  #[test]
  fn temporary_outside_the_window_is_ignored() {
    let a = Uuid::new_v4();
    let slots = run(
      &[temporary(a, "2024-05-01T09:00:00-07:00", "2024-05-01T10:00:00-07:00")],
      &Map::new(),
      &window(1),
      2,
      None,
    );
    assert!(slots.iter().all(|s| s.number_of_people == 2));
  }

  #[test]
  fn role_filter_ignores_people_without_the_role() {
    let dev = Uuid::new_v4();
    let media = Uuid::new_v4();
    let roles = Map::from([
      (dev, RoleSet::from([Role::Developer])),
      (media, RoleSet::from([Role::Media])),
    ]);
    let events = [
      permanent(dev, 2, "10:00", "11:00"),
      permanent(media, 2, "12:00", "13:00"),
    ];

    let slots = run(&events, &roles, &window(1), 3, Some(Role::Developer));
    assert_eq!(slot_at(&slots, 2024, 6, 11, 10).number_of_people, 2);
    assert_eq!(slot_at(&slots, 2024, 6, 11, 12).number_of_people, 3);
    assert!(slots.iter().all(|s| s.role == "Developer"));

    let all = run(&events, &roles, &window(1), 5, None);
    assert_eq!(slot_at(&all, 2024, 6, 11, 12).number_of_people, 4);
    assert!(all.iter().all(|s| s.role == "All"));
  }

  #[test]
  fn negative_availability_is_not_clamped() {
    let events: Vec<_> = (0..3)
      .map(|_| permanent(Uuid::new_v4(), 0, "07:00", "08:00"))
      .collect();
    let slots = run(&events, &Map::new(), &window(1), 1, None);
    assert_eq!(slot_at(&slots, 2024, 6, 9, 7).number_of_people, -2);
    assert_eq!(slot_at(&slots, 2024, 6, 9, 7).max_people_available, 1);
  }

  #[test]
  fn aggregation_is_idempotent() {
    let a = Uuid::new_v4();
    let events = [
      permanent(a, 4, "13:00", "16:00"),
      temporary(a, "2024-06-20T10:00:00-07:00", "2024-06-20T12:00:00-07:00"),
    ];
    let w = window(2);
    let first = run(&events, &Map::new(), &w, 7, None);
    let second = run(&events, &Map::new(), &w, 7, None);
    assert_eq!(first, second);
  }

  #[test]
  fn ten_people_two_commitments() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let events = [
      permanent(a, 1, "09:00", "10:00"),
      temporary(b, "2024-06-11T14:00:00-07:00", "2024-06-11T15:00:00-07:00"),
    ];
    let slots = run(&events, &Map::new(), &window(2), 10, None);

    assert_eq!(slot_at(&slots, 2024, 6, 10, 9).number_of_people, 9);
    assert_eq!(slot_at(&slots, 2024, 6, 17, 9).number_of_people, 9);
    assert_eq!(slot_at(&slots, 2024, 6, 11, 14).number_of_people, 9);
    assert_eq!(slot_at(&slots, 2024, 6, 18, 14).number_of_people, 10);

    let reduced = slots.iter().filter(|s| s.number_of_people != 10).count();
    assert_eq!(reduced, 3);
    assert!(slots.iter().all(|s| s.max_people_available == 10));
  }

  #[test]
  fn slots_serialise_in_camel_case() {
    let slots = aggregate(&[], &window(1), 2, Some(Role::Volunteer));
    let json = serde_json::to_value(&slots[0]).unwrap();
    assert_eq!(json["startDate"], "2024-06-09T07:00:00-07:00");
    assert_eq!(json["endDate"], "2024-06-09T08:00:00-07:00");
    assert_eq!(json["numberOfPeople"], 2);
    assert_eq!(json["maxPeopleAvailable"], 2);
    assert_eq!(json["role"], "Volunteer");
  }

  #[test]
  fn date_range_covers_whole_local_days() {
    let range = window(1).date_range();
    assert_eq!(range.from, Utc.with_ymd_and_hms(2024, 6, 9, 7, 0, 0).unwrap());
    assert_eq!(range.to, Utc.with_ymd_and_hms(2024, 6, 16, 7, 0, 0).unwrap());
  }

  // ─── Offset changes ──────────────────────────────────────────────────────

  // Clocks in Vancouver jump from 02:00 to 03:00 on 2024-03-10 and fall back
  // from 02:00 to 01:00 on 2024-11-03.

  fn spring_sunday() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, 10).unwrap() }

  fn local_hour_slots<'a>(
    slots: &'a [AvailabilitySlot],
    date: NaiveDate,
  ) -> Vec<&'a AvailabilitySlot> {
    slots
      .iter()
      .filter(|s| s.start_date.with_timezone(&ZONE).date_naive() == date)
      .collect()
  }

  #[test]
  fn recurring_events_keep_their_hour_when_the_reference_week_springs_forward() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let events = [
      permanent(a, 0, "02:00", "03:00"),
      permanent(b, 0, "01:30", "02:30"),
    ];
    let w = Window::new(ZONE, spring_sunday(), 2, 0, 24).unwrap();
    let slots = run(&events, &Map::new(), &w, 5, None);

    // Second Sunday has no offset change: hour index equals local hour.
    let next_sunday = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
    let next = local_hour_slots(&slots, next_sunday);
    assert_eq!(next.len(), 24);
    assert_eq!(next[1].number_of_people, 4);
    assert_eq!(next[2].number_of_people, 3);
    assert_eq!(next[3].number_of_people, 5);
    // Only hours 01 and 02 of each Sunday are reduced.
    let reduced = slots.iter().filter(|s| s.number_of_people < 5).count();
    assert_eq!(reduced, 4);
  }

  #[test]
  fn nonexistent_hour_repeats_the_following_slot() {
    let w = Window::new(ZONE, spring_sunday(), 1, 0, 24).unwrap();
    let slots = aggregate(&[], &w, 1, None);
    assert_eq!(slots.len(), 7 * 24);

    // Slot 02 does not exist locally and resolves to 03:00, like slot 03.
    let two = &slots[2];
    let three = &slots[3];
    assert_eq!(two.start_date, three.start_date);
    assert_eq!(two.start_date.hour(), 3);
    assert_eq!(two.end_date - two.start_date, Duration::hours(1));
    for pair in slots[3..].windows(2) {
      assert_eq!(pair[0].end_date, pair[1].start_date);
    }
  }

  #[test]
  fn repeated_hour_takes_its_first_occurrence() {
    let fall = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
    let w = Window::new(ZONE, fall, 1, 0, 24).unwrap();
    let slots = aggregate(&[], &w, 1, None);
    assert_eq!(slots.len(), 7 * 24);

    // 01:00 PDT, then 02:00 PST: the 01:00 PST hour is left uncovered.
    assert_eq!(slots[1].start_date.offset().local_minus_utc(), -7 * 3600);
    assert_eq!(slots[2].start_date.offset().local_minus_utc(), -8 * 3600);
    assert_eq!(slots[2].start_date - slots[1].end_date, Duration::hours(1));
  }
}
