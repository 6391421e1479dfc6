//! Startup errors for the LCSC server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A configuration value that cannot be used as given.
  #[error("invalid configuration: {0}")]
  Config(String),

  #[error(transparent)]
  Core(#[from] lcsc_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
