//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with whole seconds and a `Z`
//! suffix, so lexical order matches chronological order. Role sets are stored
//! as compact JSON arrays. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use lcsc_core::{
  event::{EventShape, NewEvent, RawEvent, wall_clock},
  person::Person,
  role::RoleSet,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Roles ────────────────────────────────────────────────────────────────────

pub fn encode_roles(roles: &RoleSet) -> Result<String> {
  Ok(serde_json::to_string(roles)?)
}

pub fn decode_roles(s: &str) -> Result<RoleSet> { Ok(serde_json::from_str(s)?) }

// ─── Events ───────────────────────────────────────────────────────────────────

/// Column values for one `events` insert.
pub struct EventRow {
  pub event_id:    String,
  pub person_id:   String,
  pub title:       Option<String>,
  pub event_type:  String,
  pub day_of_week: Option<i64>,
  pub start_time:  Option<String>,
  pub end_time:    Option<String>,
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
  pub created_at:  String,
}

impl EventRow {
  /// Encode a validated event for `person`, assigning it a fresh id.
  pub fn encode(
    person: Uuid,
    event: &NewEvent,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    event.shape.validate().map_err(Error::InvalidEvent)?;

    let mut row = Self {
      event_id:    encode_uuid(Uuid::new_v4()),
      person_id:   encode_uuid(person),
      title:       event.title.clone(),
      event_type:  event.shape.kind().to_string(),
      day_of_week: None,
      start_time:  None,
      end_time:    None,
      start_date:  None,
      end_date:    None,
      created_at:  encode_dt(now),
    };

    match &event.shape {
      EventShape::Permanent { day_of_week, start_time, end_time } => {
        row.day_of_week = Some(i64::from(*day_of_week));
        row.start_time = Some(wall_clock::format(start_time));
        row.end_time = Some(wall_clock::format(end_time));
      }
      EventShape::Temporary { start_date, end_date } => {
        row.start_date = Some(encode_dt(start_date.with_timezone(&Utc)));
        row.end_date = Some(encode_dt(end_date.with_timezone(&Utc)));
      }
    }

    // Columns hold whole seconds; the stored row must still be valid.
    row
      .to_raw()?
      .shape()
      .map_err(|e| Error::InvalidEvent(e.to_string()))?;
    Ok(row)
  }

  /// The row as a reader would see it.
  pub fn to_raw(&self) -> Result<RawEvent> {
    Ok(RawEvent {
      event_id:    decode_uuid(&self.event_id)?,
      person_id:   decode_uuid(&self.person_id)?,
      title:       self.title.clone(),
      event_type:  self.event_type.clone(),
      day_of_week: self.day_of_week,
      start_time:  self.start_time.clone(),
      end_time:    self.end_time.clone(),
      start_date:  self.start_date.clone(),
      end_date:    self.end_date.clone(),
    })
  }
}

/// Raw values read from an `events` row. Only the ids are decoded; the rest
/// is passed through for the normaliser to judge.
pub struct RawEventRow {
  pub event_id:    String,
  pub person_id:   String,
  pub title:       Option<String>,
  pub event_type:  String,
  pub day_of_week: Option<i64>,
  pub start_time:  Option<String>,
  pub end_time:    Option<String>,
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
}

impl RawEventRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      person_id:   row.get(1)?,
      title:       row.get(2)?,
      event_type:  row.get(3)?,
      day_of_week: row.get(4)?,
      start_time:  row.get(5)?,
      end_time:    row.get(6)?,
      start_date:  row.get(7)?,
      end_date:    row.get(8)?,
    })
  }

  pub fn into_raw_event(self) -> Result<RawEvent> {
    Ok(RawEvent {
      event_id:    decode_uuid(&self.event_id)?,
      person_id:   decode_uuid(&self.person_id)?,
      title:       self.title,
      event_type:  self.event_type,
      day_of_week: self.day_of_week,
      start_time:  self.start_time,
      end_time:    self.end_time,
      start_date:  self.start_date,
      end_date:    self.end_date,
    })
  }
}

// ─── People ───────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub person_id:  String,
  pub email:      String,
  pub verified:   bool,
  pub roles:      String,
  pub created_at: String,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:  row.get(0)?,
      email:      row.get(1)?,
      verified:   row.get(2)?,
      roles:      row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:  decode_uuid(&self.person_id)?,
      email:      self.email,
      verified:   self.verified,
      roles:      decode_roles(&self.roles)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
