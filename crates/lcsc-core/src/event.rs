//! Event types: the commitments people declare against their availability.
//!
//! Events are stored loosely typed: a discriminant column plus two optional
//! field groups. [`RawEvent`] mirrors that row shape exactly. Everything that
//! enters the store goes through [`EventShape`], the validated tagged form,
//! and everything read back is decoded into it again before use.

use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Discriminant ────────────────────────────────────────────────────────────

/// The `event_type` discriminant stored with every event.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
pub enum EventKind {
  /// Recurs every week on the same day and wall-clock hours.
  Permanent,
  /// Happens once, between two absolute timestamps.
  Temporary,
}

// ─── Stored row ──────────────────────────────────────────────────────────────

/// An event exactly as read from storage. Nothing here has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
  pub event_id:    Uuid,
  pub person_id:   Uuid,
  pub title:       Option<String>,
  pub event_type:  String,
  /// 0 = Sunday … 6 = Saturday.
  pub day_of_week: Option<i64>,
  /// Wall-clock `HH:MM[:SS]`.
  pub start_time:  Option<String>,
  pub end_time:    Option<String>,
  /// RFC 3339 timestamp.
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
}

impl RawEvent {
  /// Decode the loosely-typed row into its validated [`EventShape`].
  ///
  /// Fails with [`Error::InvalidEventKind`] when the discriminant is unknown
  /// or the field group it requires is missing or malformed.
  pub fn shape(&self) -> Result<EventShape> {
    let kind: EventKind = self.event_type.parse().map_err(|_| {
      Error::invalid_event(
        self.event_id,
        format!("unknown event_type {:?}", self.event_type),
      )
    })?;

    let shape = match kind {
      EventKind::Permanent => {
        let day = self
          .day_of_week
          .ok_or_else(|| self.missing("day_of_week"))?;
        let day_of_week = u8::try_from(day)
          .ok()
          .filter(|d| *d <= 6)
          .ok_or_else(|| {
            let reason = format!("day_of_week {day} out of range");
            Error::invalid_event(self.event_id, reason)
          })?;
        EventShape::Permanent {
          day_of_week,
          start_time: self.wall_clock("start_time", self.start_time.as_deref())?,
          end_time: self.wall_clock("end_time", self.end_time.as_deref())?,
        }
      }
      EventKind::Temporary => EventShape::Temporary {
        start_date: self.timestamp("start_date", self.start_date.as_deref())?,
        end_date:   self.timestamp("end_date", self.end_date.as_deref())?,
      },
    };

    shape
      .validate()
      .map_err(|reason| Error::invalid_event(self.event_id, reason))?;
    Ok(shape)
  }

  fn missing(&self, field: &str) -> Error {
    Error::invalid_event(
      self.event_id,
      format!("{} event is missing {field}", self.event_type),
    )
  }

  fn wall_clock(&self, field: &str, value: Option<&str>) -> Result<NaiveTime> {
    let value = value.ok_or_else(|| self.missing(field))?;
    wall_clock::parse(value).ok_or_else(|| {
      let reason = format!("{field} {value:?} is not a time");
      Error::invalid_event(self.event_id, reason)
    })
  }

  fn timestamp(
    &self,
    field: &str,
    value: Option<&str>,
  ) -> Result<DateTime<FixedOffset>> {
    let value = value.ok_or_else(|| self.missing(field))?;
    DateTime::parse_from_rfc3339(value).map_err(|e| {
      Error::invalid_event(self.event_id, format!("{field} {value:?}: {e}"))
    })
  }
}

// ─── Validated shape ─────────────────────────────────────────────────────────

/// The two shapes an event can take. Serialised with an `event_type` tag so
/// the wire format matches the stored discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum EventShape {
  Permanent {
    /// 0 = Sunday … 6 = Saturday.
    day_of_week: u8,
    #[serde(with = "wall_clock")]
    start_time:  NaiveTime,
    #[serde(with = "wall_clock")]
    end_time:    NaiveTime,
  },
  Temporary {
    start_date: DateTime<FixedOffset>,
    end_date:   DateTime<FixedOffset>,
  },
}

impl EventShape {
  pub fn kind(&self) -> EventKind {
    match self {
      Self::Permanent { .. } => EventKind::Permanent,
      Self::Temporary { .. } => EventKind::Temporary,
    }
  }

  /// Check the invariants a stored event must satisfy: the day is in range
  /// and the event ends strictly after it starts.
  pub fn validate(&self) -> std::result::Result<(), String> {
    match self {
      Self::Permanent { day_of_week, start_time, end_time } => {
        if *day_of_week > 6 {
          return Err(format!("day_of_week {day_of_week} out of range"));
        }
        if end_time <= start_time {
          return Err(format!(
            "end_time {end_time} is not after start_time {start_time}"
          ));
        }
      }
      Self::Temporary { start_date, end_date } => {
        if end_date <= start_date {
          return Err(format!(
            "end_date {end_date} is not after start_date {start_date}"
          ));
        }
      }
    }
    Ok(())
  }
}

/// Input to [`crate::store::EventStore::replace_schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
  #[serde(default)]
  pub title: Option<String>,
  #[serde(flatten)]
  pub shape: EventShape,
}

impl NewEvent {
  pub fn new(shape: EventShape) -> Self { Self { title: None, shape } }
}

/// Wall-clock times travel as `HH:MM`; `HH:MM:SS` is accepted on input.
pub mod wall_clock {
  use chrono::{NaiveTime, Timelike as _};
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub fn parse(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
      .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
      .ok()
  }

  pub fn format(t: &NaiveTime) -> String {
    if t.second() == 0 {
      t.format("%H:%M").to_string()
    } else {
      t.format("%H:%M:%S").to_string()
    }
  }

  pub fn serialize<S: Serializer>(
    t: &NaiveTime,
    s: S,
  ) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format(t))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse(&raw).ok_or_else(|| {
      de::Error::custom(format!("invalid wall-clock time {raw:?}"))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(event_type: &str) -> RawEvent {
    RawEvent {
      event_id:    Uuid::nil(),
      person_id:   Uuid::nil(),
      title:       None,
      event_type:  event_type.into(),
      day_of_week: None,
      start_time:  None,
      end_time:    None,
      start_date:  None,
      end_date:    None,
    }
  }

  #[test]
  fn permanent_row_decodes() {
    let row = RawEvent {
      day_of_week: Some(1),
      start_time: Some("09:00".into()),
      end_time: Some("10:30:00".into()),
      ..raw("Permanent")
    };
    let shape = row.shape().unwrap();
    assert_eq!(shape, EventShape::Permanent {
      day_of_week: 1,
      start_time:  NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
      end_time:    NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
    });
  }

  #[test]
  fn temporary_row_decodes() {
    let row = RawEvent {
      start_date: Some("2024-06-10T09:00:00-07:00".into()),
      end_date: Some("2024-06-10T10:00:00-07:00".into()),
      ..raw("Temporary")
    };
    assert_eq!(row.shape().unwrap().kind(), EventKind::Temporary);
  }

  #[test]
  fn unknown_discriminant_is_rejected() {
    let err = raw("Recurrent").shape().unwrap_err();
    assert!(matches!(err, Error::InvalidEventKind { .. }));
  }

  #[test]
  fn missing_field_group_is_rejected() {
    // Permanent discriminant but only the temporary fields are populated.
    let row = RawEvent {
      start_date: Some("2024-06-10T09:00:00Z".into()),
      end_date: Some("2024-06-10T10:00:00Z".into()),
      ..raw("Permanent")
    };
    assert!(matches!(row.shape(), Err(Error::InvalidEventKind { .. })));
  }

  #[test]
  fn out_of_range_day_is_rejected() {
    let row = RawEvent {
      day_of_week: Some(7),
      start_time: Some("09:00".into()),
      end_time: Some("10:00".into()),
      ..raw("Permanent")
    };
    assert!(row.shape().is_err());
  }

  #[test]
  fn empty_interval_is_rejected() {
    let row = RawEvent {
      start_date: Some("2024-06-10T10:00:00Z".into()),
      end_date: Some("2024-06-10T10:00:00Z".into()),
      ..raw("Temporary")
    };
    assert!(row.shape().is_err());
  }

  #[test]
  fn new_event_json_uses_event_type_tag() {
    let json = serde_json::json!({
      "title": "Lab shift",
      "event_type": "Permanent",
      "day_of_week": 3,
      "start_time": "13:00",
      "end_time": "15:00",
    });
    let ev: NewEvent = serde_json::from_value(json).unwrap();
    assert_eq!(ev.title.as_deref(), Some("Lab shift"));
    assert_eq!(ev.shape.kind(), EventKind::Permanent);

    let back = serde_json::to_value(&ev).unwrap();
    assert_eq!(back["event_type"], "Permanent");
    assert_eq!(back["start_time"], "13:00");
  }
}
