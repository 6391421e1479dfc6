//! Handlers for `/people` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/people` | Body: `{"person_id", "email", "verified"?}`; returns 201 |
//! | `GET`  | `/people/{id}/roles` | Empty roles for unknown people |
//! | `PUT`  | `/people/{id}/roles` | Body: `{"roles": ["Developer", ...]}` |
//! | `PUT`  | `/people/{id}/verified` | Body: `{"verified": true}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lcsc_core::{
  person::{NewPerson, Person},
  role::{Role, RoleSet},
  store::{EventStore, ProfileStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /people`
pub async fn register<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore + ProfileStore + 'static,
{
  let person = state
    .store
    .register_person(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Roles ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct RolesView {
  pub person_id: Uuid,
  pub email:     Option<String>,
  pub roles:     RoleSet,
}

impl From<Person> for RolesView {
  fn from(p: Person) -> Self {
    Self { person_id: p.person_id, email: Some(p.email), roles: p.roles }
  }
}

/// `GET /people/{id}/roles`
pub async fn get_roles<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RolesView>, ApiError>
where
  S: EventStore + ProfileStore + 'static,
{
  let view = match state.store.get_person(id).await.map_err(ApiError::store)? {
    Some(person) => person.into(),
    None => RolesView { person_id: id, email: None, roles: RoleSet::new() },
  };
  Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct RolesBody {
  pub roles: Vec<String>,
}

/// `PUT /people/{id}/roles`
pub async fn put_roles<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RolesBody>,
) -> Result<Json<RolesView>, ApiError>
where
  S: EventStore + ProfileStore + 'static,
{
  let roles = body
    .roles
    .iter()
    .map(|label| Role::parse(label))
    .collect::<lcsc_core::Result<RoleSet>>()?;

  let person = state
    .store
    .set_roles(id, roles)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  tracing::info!(person = %id, roles = ?person.roles, "roles updated");
  Ok(Json(person.into()))
}

// ─── Verification ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifiedBody {
  pub verified: bool,
}

/// `PUT /people/{id}/verified`
pub async fn put_verified<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<VerifiedBody>,
) -> Result<Json<Person>, ApiError>
where
  S: EventStore + ProfileStore + 'static,
{
  let person = state
    .store
    .set_verified(id, body.verified)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}
