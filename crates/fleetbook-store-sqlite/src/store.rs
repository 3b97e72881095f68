//! [`SqliteStore`], the SQLite implementation of [`FleetStore`].

use std::path::Path;

use fleetbook_core::{
  entity::{Job, NewJob, NewVehicle, NewWorker, Vehicle, Worker},
  key::{Dni, JobId, Plate},
  legacy::{LegacyJobForm, LegacyTable, LegacyVehicleForm},
  link::{JobFormLink, LinkKey, VehicleFormLink},
  store::FleetStore,
};
use rusqlite::{OptionalExtension as _, Row};

use crate::{
  Result,
  encode::{
    JOB_COLUMNS, JOB_FORM_COLUMNS, LEGACY_JOB_FORM_COLUMNS,
    LEGACY_VEHICLE_FORM_COLUMNS, VEHICLE_COLUMNS, VEHICLE_FORM_COLUMNS,
    WORKER_COLUMNS, job_form_from_row, job_from_row, legacy_job_form_from_row,
    legacy_vehicle_form_from_row, vehicle_form_from_row, vehicle_from_row,
    worker_from_row,
  },
  schema::{LINK_COLUMN_UPGRADES, SCHEMA, SCHEMA_VERSION},
};

type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Fleetbook store backed by a single SQLite file.
///
/// Cloning is cheap and clones share the session, including any open batch.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    let added = self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(upgrade_link_columns(conn)?)
      })
      .await?;
    if added > 0 {
      tracing::info!(added, version = SCHEMA_VERSION, "upgraded link table columns");
    }
    Ok(())
  }

  /// Run an arbitrary SQL batch on this session.
  ///
  /// Used to provision fixtures (see [`crate::schema::LEGACY_SCHEMA`]) and
  /// for one-off maintenance.
  pub async fn execute_script(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_all<T: Send + 'static>(
    &self,
    sql: String,
    map: RowMapper<T>,
  ) -> Result<Vec<T>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn fetch_optional<T: Send + 'static>(
    &self,
    sql: String,
    keys: Vec<i64>,
    map: RowMapper<T>,
  ) -> Result<Option<T>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(keys), map)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  async fn run_batch(&self, statement: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(statement)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Add any optional link column missing from a table created by an older
/// schema. Returns how many columns were added; a store already at
/// [`SCHEMA_VERSION`] is left untouched.
fn upgrade_link_columns(conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
  let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
  if version >= SCHEMA_VERSION {
    return Ok(0);
  }

  let mut added = 0;
  for (table, column, decl) in LINK_COLUMN_UPGRADES {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let present = stmt
      .query_map([], |row| row.get::<_, String>(1))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    if !present.iter().any(|c| c == column) {
      conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"))?;
      added += 1;
    }
  }
  conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
  Ok(added)
}

// ─── FleetStore impl ─────────────────────────────────────────────────────────

impl FleetStore for SqliteStore {
  type Error = crate::Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn has_table(&self, name: &str) -> Result<bool> {
    let name = name.to_owned();
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
              rusqlite::params![name],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn drop_legacy_table(&self, table: LegacyTable) -> Result<()> {
    let sql = format!("DROP TABLE IF EXISTS {}", table.table_name());
    self.execute_script(sql).await
  }

  // ── Batches ───────────────────────────────────────────────────────────────

  async fn begin(&self) -> Result<()> { self.run_batch("BEGIN").await }

  async fn commit(&self) -> Result<()> { self.run_batch("COMMIT").await }

  async fn rollback(&self) -> Result<()> { self.run_batch("ROLLBACK").await }

  // ── Legacy reads ──────────────────────────────────────────────────────────

  async fn read_legacy_vehicle_forms(&self) -> Result<Vec<LegacyVehicleForm>> {
    let sql = format!(
      "SELECT {LEGACY_VEHICLE_FORM_COLUMNS} FROM {} ORDER BY rowid",
      LegacyTable::VehicleFormularies.table_name()
    );
    self.fetch_all(sql, legacy_vehicle_form_from_row).await
  }

  async fn read_legacy_job_forms(&self) -> Result<Vec<LegacyJobForm>> {
    let sql = format!(
      "SELECT {LEGACY_JOB_FORM_COLUMNS} FROM {} ORDER BY rowid",
      LegacyTable::JobFormularies.table_name()
    );
    self.fetch_all(sql, legacy_job_form_from_row).await
  }

  // ── Entities ──────────────────────────────────────────────────────────────

  async fn get_vehicle(&self, plate: Plate) -> Result<Option<Vehicle>> {
    let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE plate = ?1");
    self.fetch_optional(sql, vec![plate.0], vehicle_from_row).await
  }

  async fn get_worker(&self, dni: Dni) -> Result<Option<Worker>> {
    let sql = format!("SELECT {WORKER_COLUMNS} FROM workers WHERE dni = ?1");
    self.fetch_optional(sql, vec![dni.0], worker_from_row).await
  }

  async fn get_job(&self, id: JobId) -> Result<Option<Job>> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1");
    self.fetch_optional(sql, vec![id.0], job_from_row).await
  }

  async fn insert_vehicle(&self, input: NewVehicle) -> Result<()> {
    let NewVehicle { vehicle: v, credential } = input;
    let secret = credential.expose().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO vehicles (
             plate, brand, model, manufacture_date, purchase_date, credential
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            v.plate.0,
            v.brand,
            v.model,
            v.manufacture_date,
            v.purchase_date,
            secret,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_worker(&self, input: NewWorker) -> Result<()> {
    let NewWorker { worker: w, credential } = input;
    let secret = credential.expose().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO workers (
             dni, first_name, last_name, birth_date, employment_date, credential
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            w.dni.0,
            w.first_name,
            w.last_name,
            w.birth_date,
            w.employment_date,
            secret,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_job(&self, input: NewJob) -> Result<()> {
    let NewJob { job: j, credential } = input;
    let secret = credential.expose().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO jobs (id, client, date, credential) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![j.id.0, j.client, j.date, secret],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
    let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY plate");
    self.fetch_all(sql, vehicle_from_row).await
  }

  async fn list_workers(&self) -> Result<Vec<Worker>> {
    let sql = format!("SELECT {WORKER_COLUMNS} FROM workers ORDER BY dni");
    self.fetch_all(sql, worker_from_row).await
  }

  async fn list_jobs(&self) -> Result<Vec<Job>> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id");
    self.fetch_all(sql, job_from_row).await
  }

  // ── Links ─────────────────────────────────────────────────────────────────

  async fn get_vehicle_form(&self, key: LinkKey) -> Result<Option<VehicleFormLink>> {
    let sql = format!(
      "SELECT {VEHICLE_FORM_COLUMNS} FROM vehicle_forms
       WHERE plate = ?1 AND dni = ?2 AND job_id = ?3"
    );
    let keys = vec![key.plate.0, key.dni.0, key.job_id.0];
    self.fetch_optional(sql, keys, vehicle_form_from_row).await
  }

  async fn get_job_form(&self, key: LinkKey) -> Result<Option<JobFormLink>> {
    let sql = format!(
      "SELECT {JOB_FORM_COLUMNS} FROM job_forms
       WHERE plate = ?1 AND dni = ?2 AND job_id = ?3"
    );
    let keys = vec![key.plate.0, key.dni.0, key.job_id.0];
    self.fetch_optional(sql, keys, job_form_from_row).await
  }

  async fn insert_vehicle_form(&self, link: VehicleFormLink) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO vehicle_forms (
             plate, dni, job_id, notes, form_date, departure_time, vehicle_state
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            link.key.plate.0,
            link.key.dni.0,
            link.key.job_id.0,
            link.notes,
            link.form_date,
            link.departure_time,
            link.vehicle_state,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_job_form(&self, link: JobFormLink) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO job_forms (
             plate, dni, job_id, notes, form_date, finish_time,
             hours_worked, work_place, arrival_minutes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            link.key.plate.0,
            link.key.dni.0,
            link.key.job_id.0,
            link.notes,
            link.form_date,
            link.finish_time,
            link.hours_worked,
            link.work_place,
            link.arrival_minutes,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_vehicle_forms(&self) -> Result<Vec<VehicleFormLink>> {
    let sql = format!(
      "SELECT {VEHICLE_FORM_COLUMNS} FROM vehicle_forms ORDER BY plate, dni, job_id"
    );
    self.fetch_all(sql, vehicle_form_from_row).await
  }

  async fn list_job_forms(&self) -> Result<Vec<JobFormLink>> {
    let sql =
      format!("SELECT {JOB_FORM_COLUMNS} FROM job_forms ORDER BY plate, dni, job_id");
    self.fetch_all(sql, job_form_from_row).await
  }
}
