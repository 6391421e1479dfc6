//! SQL schema for the LCSC SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    email       TEXT NOT NULL,
    verified    INTEGER NOT NULL DEFAULT 0,
    roles       TEXT NOT NULL DEFAULT '[]',   -- JSON array of role labels
    created_at  TEXT NOT NULL
);

-- Events are loosely typed: exactly one of the two field groups is meant to
-- be populated, matching event_type. Nothing here enforces that; readers
-- validate every row.
CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    person_id   TEXT NOT NULL,
    title       TEXT,
    event_type  TEXT NOT NULL,   -- 'Permanent' | 'Temporary'
    -- Permanent
    day_of_week INTEGER,         -- 0 = Sunday
    start_time  TEXT,            -- HH:MM[:SS], local wall clock
    end_time    TEXT,
    -- Temporary
    start_date  TEXT,            -- RFC 3339, UTC, whole seconds
    end_date    TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS events_person_idx ON events(person_id);
CREATE INDEX IF NOT EXISTS events_type_end_idx ON events(event_type, end_date);

PRAGMA user_version = 1;
";
