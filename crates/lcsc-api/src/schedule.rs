//! Handlers for a person's schedule.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/people/{id}/schedule` | Permanent events plus temporary events not yet ended |
//! | `PUT`  | `/people/{id}/schedule` | Body: array of events; replaces the whole schedule |

use axum::{
  Json,
  extract::{Path, State},
};
use lcsc_core::{
  event::{NewEvent, RawEvent},
  store::{DateWindow, EventStore, ProfileStore},
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Get ──────────────────────────────────────────────────────────────────────

/// `GET /people/{id}/schedule`
pub async fn get_schedule<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<RawEvent>>, ApiError>
where
  S: EventStore + ProfileStore + 'static,
{
  let upcoming = DateWindow::starting_at(state.clock.now());
  let events = state
    .store
    .fetch_events(Some(id), Some(upcoming))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(events))
}

// ─── Replace ──────────────────────────────────────────────────────────────────

/// `PUT /people/{id}/schedule`
///
/// Body:
/// ```json
/// [
///   {"event_type": "Permanent", "day_of_week": 1, "start_time": "09:00", "end_time": "10:00"},
///   {"event_type": "Temporary", "title": "Dentist",
///    "start_date": "2024-06-10T09:00:00-07:00", "end_date": "2024-06-10T10:00:00-07:00"}
/// ]
/// ```
pub async fn put_schedule<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(events): Json<Vec<NewEvent>>,
) -> Result<Json<Vec<RawEvent>>, ApiError>
where
  S: EventStore + ProfileStore + 'static,
{
  for (i, event) in events.iter().enumerate() {
    event
      .shape
      .validate()
      .map_err(|reason| ApiError::BadRequest(format!("event {i}: {reason}")))?;
  }

  state
    .store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;

  let stored = state
    .store
    .replace_schedule(id, events)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(person = %id, events = stored.len(), "schedule replaced");
  Ok(Json(stored))
}
