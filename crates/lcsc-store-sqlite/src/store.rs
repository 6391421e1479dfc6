//! [`SqliteStore`], the SQLite implementation of the event and profile
//! stores.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use lcsc_core::{
  event::{EventKind, NewEvent, RawEvent},
  person::{NewPerson, Person},
  role::{Role, RoleSet},
  store::{DateWindow, EventStore, ProfileStore},
};

use crate::{
  Error, Result,
  encode::{EventRow, RawEventRow, RawPerson, encode_dt, encode_roles, encode_uuid},
  schema::SCHEMA,
};

const PERSON_COLUMNS: &str = "person_id, email, verified, roles, created_at";

const EVENT_COLUMNS: &str = "event_id, person_id, title, event_type, day_of_week,
  start_time, end_time, start_date, end_date";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An LCSC store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row `people` statement that ends in
  /// `RETURNING <PERSON_COLUMNS>`.
  async fn person_returning(
    &self,
    sql: String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params_from_iter(params),
              RawPerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  async fn fetch_events(
    &self,
    person: Option<Uuid>,
    window: Option<DateWindow>,
  ) -> Result<Vec<RawEvent>> {
    let person_str = person.map(encode_uuid);
    let from_str = window.map(|w| encode_dt(w.from));
    let to_str = window
      .filter(|w| w.to != DateTime::<Utc>::MAX_UTC)
      .map(|w| encode_dt(w.to));
    let temporary = EventKind::Temporary.to_string();

    let raws: Vec<RawEventRow> = self
      .conn
      .call(move |conn| {
        // Temporary rows with missing dates are returned regardless of the
        // window; the normaliser reports them.
        let sql = format!(
          "SELECT {EVENT_COLUMNS}
           FROM events
           WHERE (?1 IS NULL OR person_id = ?1)
             AND (
               event_type <> ?4
               OR start_date IS NULL OR end_date IS NULL
               OR ((?2 IS NULL OR end_date > ?2) AND (?3 IS NULL OR start_date < ?3))
             )
           ORDER BY rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![person_str, from_str, to_str, temporary],
            RawEventRow::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEventRow::into_raw_event).collect()
  }

  async fn replace_schedule(
    &self,
    person: Uuid,
    events: Vec<NewEvent>,
  ) -> Result<Vec<RawEvent>> {
    let now = Utc::now();
    let rows = events
      .iter()
      .map(|e| EventRow::encode(person, e, now))
      .collect::<Result<Vec<_>>>()?;
    let stored = rows.iter().map(EventRow::to_raw).collect::<Result<Vec<_>>>()?;
    let person_str = encode_uuid(person);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM events WHERE person_id = ?1",
          rusqlite::params![person_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO events (
               event_id, person_id, title, event_type, day_of_week,
               start_time, end_time, start_date, end_date, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.event_id,
              row.person_id,
              row.title,
              row.event_type,
              row.day_of_week,
              row.start_time,
              row.end_time,
              row.start_date,
              row.end_date,
              row.created_at,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(%person, events = stored.len(), "replaced schedule");
    Ok(stored)
  }

  async fn delete_expired(&self, before: DateTime<Utc>) -> Result<usize> {
    let before_str = encode_dt(before);
    let temporary = EventKind::Temporary.to_string();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM events WHERE event_type = ?1 AND end_date < ?2",
          rusqlite::params![temporary, before_str],
        )?)
      })
      .await?;

    Ok(deleted)
  }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = Error;

  async fn fetch_eligible_people(&self, role: Option<Role>) -> Result<Vec<Person>> {
    let role_str = role.map(|r| r.to_string());

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PERSON_COLUMNS}
           FROM people
           WHERE verified = 1
             AND (?1 IS NULL OR EXISTS (
               SELECT 1 FROM json_each(people.roles) WHERE json_each.value = ?1
             ))
           ORDER BY created_at, person_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![role_str], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn list_people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PERSON_COLUMNS} FROM people \
           ORDER BY created_at, person_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    self
      .person_returning(
        format!("SELECT {PERSON_COLUMNS} FROM people WHERE person_id = ?1"),
        vec![encode_uuid(id).into()],
      )
      .await
  }

  async fn register_person(&self, input: NewPerson) -> Result<Person> {
    let id = input.person_id;
    self
      .person_returning(
        format!(
          "INSERT INTO people (person_id, email, verified, roles, created_at)
           VALUES (?1, ?2, ?3, '[]', ?4)
           ON CONFLICT(person_id) DO UPDATE
             SET email = excluded.email, verified = excluded.verified
           RETURNING {PERSON_COLUMNS}"
        ),
        vec![
          encode_uuid(id).into(),
          input.email.into(),
          i64::from(input.verified).into(),
          encode_dt(Utc::now()).into(),
        ],
      )
      .await?
      .ok_or(Error::MissingRow(id))
  }

  async fn set_verified(&self, id: Uuid, verified: bool) -> Result<Option<Person>> {
    self
      .person_returning(
        format!(
          "UPDATE people SET verified = ?2 WHERE person_id = ?1 \
           RETURNING {PERSON_COLUMNS}"
        ),
        vec![encode_uuid(id).into(), i64::from(verified).into()],
      )
      .await
  }

  async fn set_roles(&self, id: Uuid, roles: RoleSet) -> Result<Option<Person>> {
    self
      .person_returning(
        format!(
          "UPDATE people SET roles = ?2 WHERE person_id = ?1 \
           RETURNING {PERSON_COLUMNS}"
        ),
        vec![encode_uuid(id).into(), encode_roles(&roles)?.into()],
      )
      .await
  }
}
