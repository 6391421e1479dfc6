//! Organisational roles.
//!
//! The set of roles is fixed; labels are matched case-sensitively against the
//! variant names, exactly as they are stored and sent over the wire.

use std::{collections::BTreeSet, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

/// A role a person may hold within the organisation.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
pub enum Role {
  Developer,
  Volunteer,
  President,
  Admin,
  Events,
  Media,
}

/// The roles held by one person. Ordered so serialised output is stable.
pub type RoleSet = BTreeSet<Role>;

/// Label used in availability output when no role filter is applied.
pub const ALL_ROLES_LABEL: &str = "All";

impl Role {
  /// Parse a role label, mapping failures to [`Error::InvalidRole`].
  pub fn parse(label: &str) -> Result<Self> {
    Role::from_str(label).map_err(|_| Error::InvalidRole(label.to_owned()))
  }

  /// Parse an optional role filter as sent by clients.
  ///
  /// A missing, blank, or `"All"` value means no filter.
  pub fn parse_filter(label: Option<&str>) -> Result<Option<Self>> {
    match label.map(str::trim) {
      None | Some("") => Ok(None),
      Some(ALL_ROLES_LABEL) => Ok(None),
      Some(other) => Self::parse(other).map(Some),
    }
  }
}

/// The label reported in each slot's `role` field.
pub fn scope_label(filter: Option<Role>) -> String {
  filter.map_or_else(|| ALL_ROLES_LABEL.to_owned(), |r| r.to_string())
}
