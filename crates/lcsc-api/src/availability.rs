//! Handler for `GET /availability`.
//!
//! | Query | Notes |
//! |-------|-------|
//! | `role` | Role label; absent, blank, or `All` means every eligible person |
//! | `weeks` | Overrides the configured window length, `0..=52` |

use axum::{
  Json,
  extract::{Query, State},
};
use lcsc_core::{
  availability::AvailabilitySlot,
  report::{AvailabilityQuery, availability_report},
  role::Role,
  store::{EventStore, ProfileStore},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
  pub role:  Option<String>,
  pub weeks: Option<u32>,
}

/// `GET /availability[?role=<label>][&weeks=<n>]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<AvailabilityParams>,
) -> Result<Json<Vec<AvailabilitySlot>>, ApiError>
where
  S: EventStore + ProfileStore + 'static,
{
  let query = AvailabilityQuery {
    role:  Role::parse_filter(params.role.as_deref())?,
    weeks: params.weeks,
  };
  let slots = availability_report(
    state.store.as_ref(),
    state.clock.as_ref(),
    &state.settings,
    query,
  )
  .await?;
  Ok(Json(slots))
}
