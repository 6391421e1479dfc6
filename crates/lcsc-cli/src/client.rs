//! Async HTTP client wrapping the LCSC JSON API.

use anyhow::{Context, Result, anyhow};
use lcsc_core::{availability::AvailabilitySlot, event::RawEvent};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

/// Async HTTP client for the LCSC JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: String) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `GET /availability[?role=<r>][&weeks=<n>]`
  pub async fn availability(
    &self,
    role: Option<&str>,
    weeks: Option<u32>,
  ) -> Result<Vec<AvailabilitySlot>> {
    let mut query = Vec::new();
    if let Some(role) = role {
      query.push(("role", role.to_string()));
    }
    if let Some(weeks) = weeks {
      query.push(("weeks", weeks.to_string()));
    }
    let resp = self
      .client
      .get(self.url("/availability"))
      .query(&query)
      .send()
      .await
      .context("GET /availability failed")?;
    decode(resp, "GET /availability").await
  }

  /// `GET /people/{id}/schedule`
  pub async fn schedule(&self, person: Uuid) -> Result<Vec<RawEvent>> {
    let path = format!("/people/{person}/schedule");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    decode(resp, &format!("GET {path}")).await
  }
}

/// Deserialise a success body, or surface the server's `error` message.
async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if status.is_success() {
    return resp.json().await.with_context(|| format!("deserialising {what}"));
  }
  let body: serde_json::Value = resp.json().await.unwrap_or_default();
  match body.get("error").and_then(|e| e.as_str()) {
    Some(message) => Err(anyhow!("{what} → {status}: {message}")),
    None => Err(anyhow!("{what} → {status}")),
  }
}
