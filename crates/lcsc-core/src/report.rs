//! Availability report: one request's worth of fetching, normalising and
//! aggregating.

use std::collections::HashMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
  Error, Result,
  availability::{
    AvailabilitySlot, DEFAULT_DAY_END_HOUR, DEFAULT_DAY_START_HOUR, Window,
    aggregate,
  },
  normalize::normalize,
  role::Role,
  store::{EventStore, ProfileStore},
  time::{Clock, reference_week_start},
};

pub use crate::availability::MAX_WEEKS;

/// Server-wide defaults for availability queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilitySettings {
  pub zone:           Tz,
  pub weeks:          u32,
  pub day_start_hour: u32,
  pub day_end_hour:   u32,
}

impl AvailabilitySettings {
  pub fn new(zone: Tz) -> Self {
    Self {
      zone,
      weeks: 4,
      day_start_hour: DEFAULT_DAY_START_HOUR,
      day_end_hour: DEFAULT_DAY_END_HOUR,
    }
  }

  /// Check that these settings describe a usable window.
  pub fn validate(&self) -> Result<()> {
    if self.weeks > MAX_WEEKS {
      return Err(Error::InvalidWindow(format!(
        "{} weeks configured; at most {MAX_WEEKS} allowed",
        self.weeks
      )));
    }
    Window::new(
      self.zone,
      NaiveDate::MIN,
      0,
      self.day_start_hour,
      self.day_end_hour,
    )?;
    Ok(())
  }
}

/// Parameters of a single availability query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvailabilityQuery {
  pub role:  Option<Role>,
  /// Overrides [`AvailabilitySettings::weeks`].
  pub weeks: Option<u32>,
}

/// Compute the availability slots for the window starting at the current
/// reference week.
///
/// "Now" is read from `clock` exactly once.
pub async fn availability_report<S, C>(
  store: &S,
  clock: &C,
  settings: &AvailabilitySettings,
  query: AvailabilityQuery,
) -> Result<Vec<AvailabilitySlot>>
where
  S: EventStore + ProfileStore,
  C: Clock + ?Sized,
{
  let weeks = query.weeks.unwrap_or(settings.weeks);
  if weeks > MAX_WEEKS {
    return Err(Error::InvalidWindow(format!(
      "{weeks} weeks requested; at most {MAX_WEEKS} allowed"
    )));
  }

  let now = clock.now();
  let window = Window::new(
    settings.zone,
    reference_week_start(now, settings.zone),
    weeks,
    settings.day_start_hour,
    settings.day_end_hour,
  )?;

  let eligible = store
    .fetch_eligible_people(query.role)
    .await
    .map_err(Error::collaborator)?;
  let people = store.list_people().await.map_err(Error::collaborator)?;
  let events = store
    .fetch_events(None, Some(window.date_range()))
    .await
    .map_err(Error::collaborator)?;

  let roles: HashMap<_, _> = people
    .into_iter()
    .map(|p| (p.person_id, p.roles))
    .collect();
  let intervals = normalize(
    &events,
    window.reference_week_start(),
    settings.zone,
    &roles,
  );

  tracing::debug!(
    reference_week = %window.reference_week_start(),
    weeks,
    role = ?query.role,
    eligible = eligible.len(),
    events = events.len(),
    intervals = intervals.len(),
    "aggregating availability"
  );

  Ok(aggregate(&intervals, &window, eligible.len(), query.role))
}
