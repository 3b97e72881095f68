//! SQL schema for the Fleetbook SQLite store.
//!
//! [`SCHEMA`] is executed at every connection startup and is idempotent.
//! Link tables created by version 1 lack the optional form columns; those are
//! added by [`LINK_COLUMN_UPGRADES`] when `user_version` is below
//! [`SCHEMA_VERSION`], after which it is set to that version.

/// Normalized schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS vehicles (
    plate            INTEGER PRIMARY KEY,
    brand            TEXT NOT NULL,
    model            TEXT NOT NULL,
    manufacture_date TEXT NOT NULL,   -- dd/mm/yyyy
    purchase_date    TEXT NOT NULL,
    credential       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS workers (
    dni              INTEGER PRIMARY KEY,
    first_name       TEXT NOT NULL,
    last_name        TEXT NOT NULL,
    birth_date       TEXT NOT NULL,
    employment_date  TEXT NOT NULL,
    credential       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS jobs (
    id               INTEGER PRIMARY KEY,
    client           TEXT NOT NULL,
    date             TEXT NOT NULL,
    credential       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vehicle_forms (
    plate            INTEGER NOT NULL REFERENCES vehicles(plate),
    dni              INTEGER NOT NULL REFERENCES workers(dni),
    job_id           INTEGER NOT NULL REFERENCES jobs(id),
    notes            TEXT,
    PRIMARY KEY (plate, dni, job_id)
);

CREATE TABLE IF NOT EXISTS job_forms (
    plate            INTEGER NOT NULL REFERENCES vehicles(plate),
    dni              INTEGER NOT NULL REFERENCES workers(dni),
    job_id           INTEGER NOT NULL REFERENCES jobs(id),
    notes            TEXT,
    PRIMARY KEY (plate, dni, job_id)
);

CREATE INDEX IF NOT EXISTS vehicle_forms_job_idx ON vehicle_forms(job_id);
CREATE INDEX IF NOT EXISTS job_forms_job_idx     ON job_forms(job_id);
";

/// Optional link columns added after the first release, as
/// `(table, column, declared type)`.
pub const LINK_COLUMN_UPGRADES: &[(&str, &str, &str)] = &[
  ("vehicle_forms", "form_date", "TEXT"),
  ("vehicle_forms", "departure_time", "TEXT"),
  ("vehicle_forms", "vehicle_state", "TEXT"),
  ("job_forms", "form_date", "TEXT"),
  ("job_forms", "finish_time", "TEXT"),
  ("job_forms", "hours_worked", "REAL"),
  ("job_forms", "work_place", "TEXT"),
  ("job_forms", "arrival_minutes", "INTEGER"),
];

pub const SCHEMA_VERSION: i64 = 2;

/// DDL of the two denormalized tables the migration retires.
///
/// Nothing in this crate creates them at startup; they are exported so
/// fixtures and import tooling can provision a legacy database.
pub const LEGACY_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vehicle_formularies (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id        INTEGER NOT NULL,
    employee_id       INTEGER NOT NULL,
    employee_name     TEXT NOT NULL,
    job_id            INTEGER NOT NULL,
    job_place         TEXT NOT NULL,
    vehicle_condition TEXT,
    vehicle_clean     TEXT,
    comments          TEXT
);

CREATE TABLE IF NOT EXISTS job_formularies (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id        INTEGER NOT NULL,
    employee_id       INTEGER NOT NULL,
    employee_name     TEXT NOT NULL,
    job_id            INTEGER NOT NULL,
    job_place         TEXT NOT NULL,
    time_to_commute   INTEGER,
    time_of_work      REAL,
    nails_used        INTEGER
);
";
