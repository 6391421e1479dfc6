//! The `EventStore` and `ProfileStore` traits and supporting query types.
//!
//! Both are implemented by storage backends (e.g. `lcsc-store-sqlite`).
//! Higher layers (`lcsc-api`, `lcsc-server`) depend on these abstractions,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  event::{NewEvent, RawEvent},
  person::{NewPerson, Person},
  role::{Role, RoleSet},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// A half-open range of instants, `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
  pub from: DateTime<Utc>,
  pub to:   DateTime<Utc>,
}

impl DateWindow {
  /// Everything from `from` onwards.
  pub fn starting_at(from: DateTime<Utc>) -> Self {
    Self { from, to: DateTime::<Utc>::MAX_UTC }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Abstraction over the store holding people's declared events.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch stored events.
  ///
  /// - `person`: restrict to one owner.
  /// - `window`: restrict temporary events to those overlapping it.
  ///   Permanent events, and rows too malformed to place in time, are always
  ///   returned so the caller can judge them.
  fn fetch_events(
    &self,
    person: Option<Uuid>,
    window: Option<DateWindow>,
  ) -> impl Future<Output = Result<Vec<RawEvent>, Self::Error>> + Send + '_;

  /// Replace every event owned by `person` with `events`, atomically.
  /// Returns the rows as stored.
  fn replace_schedule(
    &self,
    person: Uuid,
    events: Vec<NewEvent>,
  ) -> impl Future<Output = Result<Vec<RawEvent>, Self::Error>> + Send + '_;

  /// Delete temporary events that ended before `before`. Returns the number
  /// of rows removed.
  fn delete_expired(
    &self,
    before: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Abstraction over the store holding people and their roles.
pub trait ProfileStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Verified people, optionally restricted to holders of `role`.
  fn fetch_eligible_people(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Every known person, verified or not.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Create or refresh a person's profile. Existing roles are kept.
  fn register_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Set the verification flag. Returns `None` if the person is unknown.
  fn set_verified(
    &self,
    id: Uuid,
    verified: bool,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Replace the person's roles. Returns `None` if the person is unknown.
  fn set_roles(
    &self,
    id: Uuid,
    roles: RoleSet,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;
}
