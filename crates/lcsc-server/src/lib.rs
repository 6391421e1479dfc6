//! HTTP server for LCSC.
//!
//! Wires configuration, the store, and the clock into the JSON API from
//! `lcsc-api`, and owns the background job that prunes expired events.

pub mod cleanup;
pub mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{Router, http::HeaderValue, routing::get};
use lcsc_core::{
  availability::{DEFAULT_DAY_END_HOUR, DEFAULT_DAY_START_HOUR},
  report::AvailabilitySettings,
  store::{EventStore, ProfileStore},
  time::{Clock, parse_zone},
};
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LCSC_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// IANA zone all slots and recurring events are computed in.
  pub timezone:       String,
  /// Default availability window length.
  pub weeks:          u32,
  pub day_start_hour: u32,
  pub day_end_hour:   u32,
  /// Origin allowed by CORS. Any origin when unset.
  pub frontend_url:   Option<String>,
  /// Run the weekly expired-event cleanup.
  pub cleanup:        bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           "127.0.0.1".to_string(),
      port:           8080,
      store_path:     PathBuf::from("lcsc.db"),
      timezone:       "America/Vancouver".to_string(),
      weeks:          4,
      day_start_hour: DEFAULT_DAY_START_HOUR,
      day_end_hour:   DEFAULT_DAY_END_HOUR,
      frontend_url:   None,
      cleanup:        true,
    }
  }
}

impl ServerConfig {
  /// Resolve the availability settings, validating the zone and window.
  pub fn availability_settings(&self) -> Result<AvailabilitySettings> {
    let settings = AvailabilitySettings {
      zone:           parse_zone(&self.timezone)?,
      weeks:          self.weeks,
      day_start_hour: self.day_start_hour,
      day_end_hour:   self.day_end_hour,
    };
    settings.validate()?;
    Ok(settings)
  }

  fn cors(&self) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    Ok(match &self.frontend_url {
      Some(url) => {
        let origin = HeaderValue::from_str(url)
          .map_err(|e| Error::Config(format!("frontend_url {url:?}: {e}")))?;
        layer.allow_origin(origin)
      }
      None => layer.allow_origin(Any),
    })
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router and the cleanup job need.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub clock:    Arc<dyn Clock>,
  pub config:   Arc<ServerConfig>,
  pub settings: AvailabilitySettings,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      clock:    Arc::clone(&self.clock),
      config:   Arc::clone(&self.config),
      settings: self.settings,
    }
  }
}

impl<S> AppState<S> {
  pub fn new(
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: ServerConfig,
  ) -> Result<Self> {
    let settings = config.availability_settings()?;
    Ok(Self { store, clock, config: Arc::new(config), settings })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

const WELCOME: &str = "Welcome to the LCSC scheduler API";

/// Build the full application router: the JSON API, a welcome route at `/`,
/// request tracing, and CORS.
pub fn router<S>(state: AppState<S>) -> Result<Router>
where
  S: EventStore + ProfileStore + 'static,
{
  let cors = state.config.cors()?;
  Ok(
    Router::new()
      .route("/", get(welcome))
      .merge(lcsc_api::api_router(state.store, state.clock, state.settings))
      .layer(TraceLayer::new_for_http())
      .layer(cors),
  )
}

async fn welcome() -> axum::Json<serde_json::Value> {
  axum::Json(serde_json::json!({ "message": WELCOME }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
