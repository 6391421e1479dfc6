//! Error types for `lcsc-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A role label outside the fixed role enum.
  #[error("invalid role: {0:?}")]
  InvalidRole(String),

  /// A stored event whose `event_type` or field group is malformed.
  #[error("invalid event {event_id}: {reason}")]
  InvalidEventKind { event_id: Uuid, reason: String },

  /// Operating hours that cannot describe a day.
  #[error("invalid window: {0}")]
  InvalidWindow(String),

  #[error("unknown time zone: {0:?}")]
  UnknownTimeZone(String),

  /// The events or profiles store could not be reached.
  #[error("collaborator unavailable: {0}")]
  CollaboratorUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a store error as a retryable upstream failure.
  pub fn collaborator<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::CollaboratorUnavailable(Box::new(err))
  }

  pub(crate) fn invalid_event(event_id: Uuid, reason: impl Into<String>) -> Self {
    Self::InvalidEventKind { event_id, reason: reason.into() }
  }

  /// `true` when the failure was caused by the caller's input rather than by
  /// an upstream collaborator.
  pub fn is_client_error(&self) -> bool {
    !matches!(self, Self::CollaboratorUnavailable(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
