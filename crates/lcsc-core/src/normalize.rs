//! Event normaliser: stored rows to canonical intervals.
//!
//! Permanent events are anchored to a concrete date in the reference week so
//! they can be compared with slots like any other interval. The aggregator
//! buckets them by the wall-clock reading kept in [`IntervalKind::Recurring`],
//! not by the anchored instants, which shift when the reference week has an
//! offset change.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::{
  Result,
  event::{EventShape, RawEvent},
  role::{Role, RoleSet},
  time::localize,
};

/// Whether an interval repeats every week or happens once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalKind {
  /// Weekly, at the stored wall-clock times.
  Recurring {
    day_of_week: u8,
    start_time:  NaiveTime,
    end_time:    NaiveTime,
  },
  Absolute,
}

/// One event resolved to concrete instants in the configured zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalInterval {
  pub event_id:    Uuid,
  pub owner:       Uuid,
  pub kind:        IntervalKind,
  pub start:       DateTime<Tz>,
  pub end:         DateTime<Tz>,
  pub owner_roles: RoleSet,
}

impl CanonicalInterval {
  /// Half-open overlap: touching endpoints do not overlap.
  pub fn overlaps(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> bool {
    self.end > start && self.start < end
  }

  /// `true` when the interval should count under `filter`.
  pub fn in_scope(&self, filter: Option<Role>) -> bool {
    filter.is_none_or(|role| self.owner_roles.contains(&role))
  }
}

/// Normalise a single stored event.
pub fn normalize_one(
  raw: &RawEvent,
  reference_week_start: NaiveDate,
  zone: Tz,
  owner_roles: RoleSet,
) -> Result<CanonicalInterval> {
  let (kind, start, end) = match raw.shape()? {
    EventShape::Permanent { day_of_week, start_time, end_time } => {
      let date = reference_week_start + Days::new(u64::from(day_of_week));
      (
        IntervalKind::Recurring { day_of_week, start_time, end_time },
        localize(zone, date.and_time(start_time)),
        localize(zone, date.and_time(end_time)),
      )
    }
    EventShape::Temporary { start_date, end_date } => (
      IntervalKind::Absolute,
      start_date.with_timezone(&zone),
      end_date.with_timezone(&zone),
    ),
  };

  Ok(CanonicalInterval {
    event_id: raw.event_id,
    owner: raw.person_id,
    kind,
    start,
    end,
    owner_roles,
  })
}

/// Normalise every stored event, skipping malformed rows.
///
/// `roles` maps each person to the roles they hold; owners missing from the
/// map are treated as holding none.
pub fn normalize<'a>(
  raw_events: impl IntoIterator<Item = &'a RawEvent>,
  reference_week_start: NaiveDate,
  zone: Tz,
  roles: &HashMap<Uuid, RoleSet>,
) -> Vec<CanonicalInterval> {
  raw_events
    .into_iter()
    .filter_map(|raw| {
      let owner_roles = roles.get(&raw.person_id).cloned().unwrap_or_default();
      match normalize_one(raw, reference_week_start, zone, owner_roles) {
        Ok(interval) => Some(interval),
        Err(e) => {
          tracing::warn!(
            event_id = %raw.event_id,
            person_id = %raw.person_id,
            error = %e,
            "skipping malformed event"
          );
          None
        }
      }
    })
    .collect()
}
