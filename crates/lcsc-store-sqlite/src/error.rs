//! Error type for `lcsc-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] lcsc_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A write that should have produced a row returned none.
  #[error("no row returned for {0}")]
  MissingRow(uuid::Uuid),

  /// An event that violates the stored-event invariants was offered for
  /// insertion.
  #[error("refusing to store invalid event: {0}")]
  InvalidEvent(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
