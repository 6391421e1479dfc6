//! Person: an identity that can hold availability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::RoleSet;

/// A member of the organisation as known to the profiles store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  Uuid,
  pub email:      String,
  /// Only verified people count toward `maxPeopleAvailable`.
  pub verified:   bool,
  pub roles:      RoleSet,
  pub created_at: DateTime<Utc>,
}

impl Person {
  pub fn has_role(&self, role: crate::role::Role) -> bool {
    self.roles.contains(&role)
  }
}

/// Input to [`crate::store::ProfileStore::register_person`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
  /// Identity assigned by the external auth provider.
  pub person_id: Uuid,
  pub email:     String,
  #[serde(default)]
  pub verified:  bool,
}
