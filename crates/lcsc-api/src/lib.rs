//! JSON REST API for LCSC.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`EventStore`] and [`ProfileStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(lcsc_api::api_router(store.clone(), clock, settings))
//! ```

pub mod availability;
pub mod error;
pub mod people;
pub mod schedule;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use lcsc_core::{
  report::AvailabilitySettings,
  store::{EventStore, ProfileStore},
  time::Clock,
};

pub use error::ApiError;

/// State shared by every API handler.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub clock:    Arc<dyn Clock>,
  pub settings: AvailabilitySettings,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      clock:    Arc::clone(&self.clock),
      settings: self.settings,
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(
  store: Arc<S>,
  clock: Arc<dyn Clock>,
  settings: AvailabilitySettings,
) -> Router<()>
where
  S: EventStore + ProfileStore + 'static,
{
  Router::new()
    .route("/availability", get(availability::handler::<S>))
    // People
    .route("/people", post(people::register::<S>))
    .route(
      "/people/{id}/roles",
      get(people::get_roles::<S>).put(people::put_roles::<S>),
    )
    .route("/people/{id}/verified", put(people::put_verified::<S>))
    // Schedules
    .route(
      "/people/{id}/schedule",
      get(schedule::get_schedule::<S>).put(schedule::put_schedule::<S>),
    )
    .with_state(ApiState { store, clock, settings })
}

// ─── Router tests ─────────────────────────────────────────────────────────────
