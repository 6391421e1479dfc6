//! Weekly removal of temporary events that have already ended.
//!
//! The job runs at Sunday 00:00 in the configured zone and talks to the rest
//! of the system only through [`EventStore::delete_expired`].

use std::sync::Arc;

use chrono::{DateTime, Datelike as _, Days, NaiveTime, Utc};
use chrono_tz::Tz;
use lcsc_core::{
  store::EventStore,
  time::{Clock, localize},
};
use tokio::task::JoinHandle;

/// The first local Sunday midnight strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, zone: Tz) -> DateTime<Utc> {
  let today = now.with_timezone(&zone).date_naive();
  let ahead = (7 - today.weekday().num_days_from_sunday()) % 7;
  let mut date = today + Days::new(u64::from(ahead));
  loop {
    let run = localize(zone, date.and_time(NaiveTime::MIN)).with_timezone(&Utc);
    if run > now {
      return run;
    }
    date = date + Days::new(7);
  }
}

/// Delete every temporary event that ended before `now`, logging the outcome.
pub async fn run_once<S: EventStore>(
  store: &S,
  now: DateTime<Utc>,
) -> Result<usize, S::Error> {
  match store.delete_expired(now).await {
    Ok(deleted) => {
      tracing::info!(deleted, before = %now, "expired events removed");
      Ok(deleted)
    }
    Err(e) => {
      tracing::error!(error = %e, "expired-event cleanup failed");
      Err(e)
    }
  }
}

/// Spawn the weekly cleanup loop onto the current runtime.
pub fn spawn<S>(store: Arc<S>, clock: Arc<dyn Clock>, zone: Tz) -> JoinHandle<()>
where
  S: EventStore + 'static,
{
  tokio::spawn(async move {
    loop {
      let now = clock.now();
      let next = next_run_after(now, zone);
      tracing::debug!(next = %next, "next expired-event cleanup scheduled");
      let wait = (next - now).to_std().unwrap_or_default();
      tokio::time::sleep(wait).await;
      // Failures are logged; the next week retries.
      let _ = run_once(store.as_ref(), clock.now()).await;
    }
  })
}
