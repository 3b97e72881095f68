//! End-to-end migration tests against an in-memory `SqliteStore`.

use fleetbook_core::{
  entity::{Credential, Job, NewJob, NewVehicle, NewWorker, Vehicle, Worker},
  key::{Dni, JobId, Plate},
  legacy::{LegacyJobForm, LegacyTable, LegacyVehicleForm},
  link::{JobFormLink, LinkKey, VehicleFormLink},
  store::FleetStore,
};
use fleetbook_store_sqlite::{SqliteStore, schema::LEGACY_SCHEMA};
use thiserror::Error;

use crate::{MigrationOutcome, MigrationState, migrate, upsert::MIGRATED_BRAND};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn create_legacy_tables(s: &SqliteStore) {
  s.execute_script(LEGACY_SCHEMA).await.unwrap();
}

async fn legacy_vehicle_row(
  s: &SqliteStore,
  plate: i64,
  dni: i64,
  name: &str,
  job: i64,
  place: &str,
) {
  s.execute_script(format!(
    "INSERT INTO vehicle_formularies
       (vehicle_id, employee_id, employee_name, job_id, job_place,
        vehicle_condition, vehicle_clean, comments)
     VALUES ({plate}, {dni}, '{name}', {job}, '{place}', 'good', 'clean', 'ok');"
  ))
  .await
  .unwrap();
}

async fn legacy_job_row(
  s: &SqliteStore,
  plate: i64,
  dni: i64,
  name: &str,
  job: i64,
  place: &str,
) {
  s.execute_script(format!(
    "INSERT INTO job_formularies
       (vehicle_id, employee_id, employee_name, job_id, job_place,
        time_to_commute, time_of_work, nails_used)
     VALUES ({plate}, {dni}, '{name}', {job}, '{place}', 20, 4.5, 300);"
  ))
  .await
  .unwrap();
}

/// The two-row vehicle formulary scenario: same vehicle and worker, two jobs.
async fn seed_ana_scenario(s: &SqliteStore) {
  create_legacy_tables(s).await;
  legacy_vehicle_row(s, 10, 5, "Ana Ruiz", 1, "Madrid").await;
  legacy_vehicle_row(s, 10, 5, "Ana Ruiz", 2, "Toledo").await;
}

struct Counts {
  vehicles:      usize,
  workers:       usize,
  jobs:          usize,
  vehicle_forms: usize,
  job_forms:     usize,
}

async fn counts<S: FleetStore>(s: &S) -> Counts {
  Counts {
    vehicles:      s.list_vehicles().await.unwrap().len(),
    workers:       s.list_workers().await.unwrap().len(),
    jobs:          s.list_jobs().await.unwrap().len(),
    vehicle_forms: s.list_vehicle_forms().await.unwrap().len(),
    job_forms:     s.list_job_forms().await.unwrap().len(),
  }
}

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_jobs_one_vehicle_one_worker() {
  let s = store().await;
  seed_ana_scenario(&s).await;

  let outcome = migrate(&s).await;
  assert!(matches!(outcome, MigrationOutcome::Completed(_)), "{outcome:?}");

  let vehicles = s.list_vehicles().await.unwrap();
  assert_eq!(vehicles.len(), 1);
  assert_eq!(vehicles[0].plate, Plate(10));
  assert_eq!(vehicles[0].brand, MIGRATED_BRAND);

  let workers = s.list_workers().await.unwrap();
  assert_eq!(workers.len(), 1);
  assert_eq!(workers[0].dni, Dni(5));
  assert_eq!(workers[0].first_name, "Ana");
  assert_eq!(workers[0].last_name, "Ruiz");

  let jobs = s.list_jobs().await.unwrap();
  assert_eq!(
    jobs.iter().map(|j| j.id).collect::<Vec<_>>(),
    vec![JobId(1), JobId(2)]
  );
  assert_eq!(jobs[0].client, "Madrid");

  let forms = s.list_vehicle_forms().await.unwrap();
  assert_eq!(
    forms.iter().map(|f| f.key).collect::<Vec<_>>(),
    vec![
      LinkKey::new(Plate(10), Dni(5), JobId(1)),
      LinkKey::new(Plate(10), Dni(5), JobId(2)),
    ]
  );
  for form in &forms {
    let notes = form.notes.as_deref().unwrap_or_default();
    assert!(notes.contains("Condition: good"), "{notes}");
    assert!(notes.contains("Cleanliness: clean"), "{notes}");
    assert!(notes.contains("Comments: ok"), "{notes}");
  }
  assert!(s.list_job_forms().await.unwrap().is_empty());
}

#[tokio::test]
async fn report_counts_and_drops() {
  let s = store().await;
  seed_ana_scenario(&s).await;
  legacy_job_row(&s, 11, 6, "Luis", 2, "Toledo").await;

  let outcome = migrate(&s).await;
  let report = outcome.report();
  assert_eq!(report.final_state, MigrationState::Done);
  assert!(report.finished_at.is_some());
  assert_eq!(report.vehicles.created, 2);
  assert_eq!(report.workers.created, 2);
  assert_eq!(report.jobs.created, 2);
  assert_eq!(report.vehicle_forms.created, 2);
  assert_eq!(report.job_forms.created, 1);
  assert_eq!(
    report.dropped,
    vec![LegacyTable::VehicleFormularies, LegacyTable::JobFormularies]
  );
  assert!(report.legacy_tables.iter().all(|t| t.present));
  assert_eq!(report.legacy_tables[0].rows, 2);
  assert_eq!(report.legacy_tables[1].rows, 1);

  let job_form = s
    .get_job_form(LinkKey::new(Plate(11), Dni(6), JobId(2)))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(
    job_form.notes.as_deref(),
    Some("Commute time: 20, Work time: 4.5, Nails used: 300")
  );
  assert_eq!(job_form.hours_worked, None);
}

#[tokio::test]
async fn every_legacy_vehicle_gets_exactly_one_entity() {
  let s = store().await;
  create_legacy_tables(&s).await;
  legacy_vehicle_row(&s, 10, 5, "Ana Ruiz", 1, "Madrid").await;
  legacy_vehicle_row(&s, 12, 5, "Ana Ruiz", 1, "Madrid").await;
  legacy_job_row(&s, 12, 5, "Ana Ruiz", 3, "Avila").await;
  legacy_job_row(&s, 14, 7, "Eva", 3, "Avila").await;

  migrate(&s).await;

  let plates: Vec<_> = s
    .list_vehicles()
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.plate)
    .collect();
  assert_eq!(plates, vec![Plate(10), Plate(12), Plate(14)]);

  let eva = s.get_worker(Dni(7)).await.unwrap().unwrap();
  assert_eq!(eva.first_name, "Eva");
  assert_eq!(eva.last_name, "");
}

#[tokio::test]
async fn repeated_triple_yields_one_link() {
  let s = store().await;
  create_legacy_tables(&s).await;
  for _ in 0..3 {
    legacy_job_row(&s, 10, 5, "Ana Ruiz", 1, "Madrid").await;
  }

  let outcome = migrate(&s).await;
  assert_eq!(outcome.report().job_forms.created, 1);
  assert_eq!(outcome.report().job_forms.skipped, 2);
  assert_eq!(s.list_job_forms().await.unwrap().len(), 1);
}

#[tokio::test]
async fn first_name_wins_for_a_reused_worker_id() {
  let s = store().await;
  create_legacy_tables(&s).await;
  legacy_vehicle_row(&s, 10, 5, "Ana Ruiz", 1, "Madrid").await;
  legacy_job_row(&s, 10, 5, "Anabel Ruiz", 1, "Madrid").await;

  let outcome = migrate(&s).await;
  assert_eq!(outcome.report().workers.created, 1);
  assert_eq!(outcome.report().workers.skipped, 1);

  let worker = s.get_worker(Dni(5)).await.unwrap().unwrap();
  assert_eq!(worker.first_name, "Ana");
}

#[tokio::test]
async fn existing_entities_are_not_overwritten() {
  let s = store().await;
  s.insert_vehicle(NewVehicle {
    vehicle:    Vehicle {
      plate:            Plate(10),
      brand:            "Renault".into(),
      model:            "Kangoo".into(),
      manufacture_date: "05/06/2018".into(),
      purchase_date:    "07/08/2019".into(),
    },
    credential: Credential::new("keepmeplz!"),
  })
  .await
  .unwrap();
  seed_ana_scenario(&s).await;

  let outcome = migrate(&s).await;
  assert_eq!(outcome.report().vehicles.created, 0);
  assert_eq!(outcome.report().vehicles.skipped, 1);

  let v = s.get_vehicle(Plate(10)).await.unwrap().unwrap();
  assert_eq!(v.brand, "Renault");
}

#[tokio::test]
async fn empty_legacy_tables_are_still_dropped() {
  let s = store().await;
  create_legacy_tables(&s).await;

  let outcome = migrate(&s).await;
  assert!(matches!(outcome, MigrationOutcome::Completed(_)));
  assert!(!s.has_table("vehicle_formularies").await.unwrap());
  assert!(!s.has_table("job_formularies").await.unwrap());
}

#[tokio::test]
async fn only_present_tables_are_dropped() {
  let s = store().await;
  s.execute_script(
    "CREATE TABLE job_formularies (
       vehicle_id INTEGER, employee_id INTEGER, employee_name TEXT,
       job_id INTEGER, job_place TEXT, time_to_commute INTEGER,
       time_of_work REAL, nails_used INTEGER
     );",
  )
  .await
  .unwrap();
  legacy_job_row(&s, 10, 5, "Ana Ruiz", 1, "Madrid").await;

  let outcome = migrate(&s).await;
  assert_eq!(outcome.report().dropped, vec![LegacyTable::JobFormularies]);
  assert!(!outcome.report().legacy_tables[0].present);
  assert_eq!(counts(&s).await.job_forms, 1);
}

#[tokio::test]
async fn unreadable_table_is_kept_and_counts_as_absent() {
  let s = store().await;
  create_legacy_tables(&s).await;
  s.execute_script(
    "INSERT INTO vehicle_formularies
       (vehicle_id, employee_id, employee_name, job_id, job_place,
        vehicle_condition, vehicle_clean, comments)
     VALUES ('ABC', 5, 'Ana Ruiz', 1, 'Madrid', 'good', 'clean', 'ok');",
  )
  .await
  .unwrap();
  legacy_job_row(&s, 10, 5, "Ana Ruiz", 1, "Madrid").await;

  let outcome = migrate(&s).await;
  assert!(matches!(outcome, MigrationOutcome::Completed(_)), "{outcome:?}");
  assert_eq!(outcome.report().dropped, vec![LegacyTable::JobFormularies]);
  assert!(!outcome.report().legacy_tables[0].present);
  assert!(s.has_table("vehicle_formularies").await.unwrap());
  assert!(!s.has_table("job_formularies").await.unwrap());

  let c = counts(&s).await;
  assert_eq!((c.vehicle_forms, c.job_forms), (0, 1));
}

#[tokio::test]
async fn null_worker_name_keeps_table_and_creates_no_blank_entities() {
  let s = store().await;
  s.execute_script(
    "CREATE TABLE job_formularies (
       vehicle_id INTEGER, employee_id INTEGER, employee_name TEXT,
       job_id INTEGER, job_place TEXT, time_to_commute INTEGER,
       time_of_work REAL, nails_used INTEGER
     );
     INSERT INTO job_formularies
       (vehicle_id, employee_id, employee_name, job_id, job_place,
        time_to_commute, time_of_work, nails_used)
     VALUES (1, 5, NULL, 1, NULL, 20, 4.5, 300);",
  )
  .await
  .unwrap();
  create_legacy_tables(&s).await;
  legacy_vehicle_row(&s, 10, 6, "Luis Gil", 2, "Toledo").await;

  let outcome = migrate(&s).await;
  assert!(matches!(outcome, MigrationOutcome::Completed(_)), "{outcome:?}");
  assert_eq!(outcome.report().dropped, vec![LegacyTable::VehicleFormularies]);
  assert!(s.has_table("job_formularies").await.unwrap());

  let workers = s.list_workers().await.unwrap();
  assert_eq!(workers.iter().map(|w| w.dni).collect::<Vec<_>>(), vec![Dni(6)]);
  assert_eq!(workers[0].first_name, "Luis");
  let jobs = s.list_jobs().await.unwrap();
  assert_eq!(jobs.iter().map(|j| j.id).collect::<Vec<_>>(), vec![JobId(2)]);
  assert!(jobs.iter().all(|j| !j.client.is_empty()));
}

// ─── Vacuous case and idempotence ────────────────────────────────────────────

#[tokio::test]
async fn no_legacy_tables_is_vacuous() {
  let s = store().await;

  let outcome = migrate(&s).await;
  assert!(matches!(outcome, MigrationOutcome::NothingToMigrate(_)));
  assert_eq!(outcome.report().final_state, MigrationState::Done);

  let c = counts(&s).await;
  assert_eq!(c.vehicles + c.workers + c.jobs + c.vehicle_forms + c.job_forms, 0);
}

#[tokio::test]
async fn only_unreadable_tables_is_vacuous() {
  let s = store().await;
  create_legacy_tables(&s).await;
  s.execute_script(
    "INSERT INTO vehicle_formularies
       (vehicle_id, employee_id, employee_name, job_id, job_place,
        vehicle_condition, vehicle_clean, comments)
     VALUES ('ABC', 5, 'Ana Ruiz', 1, 'Madrid', 'good', 'clean', 'ok');
     INSERT INTO job_formularies
       (vehicle_id, employee_id, employee_name, job_id, job_place,
        time_to_commute, time_of_work, nails_used)
     VALUES (10, 'XYZ', 'Ana Ruiz', 1, 'Madrid', 20, 4.5, 300);",
  )
  .await
  .unwrap();

  let outcome = migrate(&s).await;
  assert!(matches!(outcome, MigrationOutcome::NothingToMigrate(_)), "{outcome:?}");
  assert!(outcome.report().dropped.is_empty());
  assert!(outcome.report().legacy_tables.iter().all(|t| !t.present));
  assert!(s.has_table("vehicle_formularies").await.unwrap());
  assert!(s.has_table("job_formularies").await.unwrap());
}

#[tokio::test]
async fn rerun_after_success_is_vacuous() {
  let s = store().await;
  seed_ana_scenario(&s).await;

  assert!(matches!(migrate(&s).await, MigrationOutcome::Completed(_)));
  assert!(!s.has_table("vehicle_formularies").await.unwrap());
  assert!(matches!(migrate(&s).await, MigrationOutcome::NothingToMigrate(_)));
}

#[tokio::test]
async fn rerun_against_same_legacy_data_adds_nothing() {
  let s = store().await;
  seed_ana_scenario(&s).await;
  legacy_job_row(&s, 10, 5, "Ana Ruiz", 2, "Toledo").await;
  migrate(&s).await;
  let first = counts(&s).await;

  seed_ana_scenario(&s).await;
  legacy_job_row(&s, 10, 5, "Ana Ruiz", 2, "Toledo").await;
  let outcome = migrate(&s).await;
  let second = counts(&s).await;

  assert!(matches!(outcome, MigrationOutcome::Completed(_)));
  assert_eq!(outcome.report().vehicles.created, 0);
  assert_eq!(outcome.report().vehicle_forms.skipped, 2);
  assert_eq!(first.vehicles, second.vehicles);
  assert_eq!(first.workers, second.workers);
  assert_eq!(first.jobs, second.jobs);
  assert_eq!(first.vehicle_forms, second.vehicle_forms);
  assert_eq!(first.job_forms, second.job_forms);
}

// ─── Failure handling ────────────────────────────────────────────────────────

/// Where [`FaultyStore`] injects its failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
  InsertJob,
  InsertJobForm,
  DropTable,
}

#[derive(Debug, Error)]
enum FaultyError {
  #[error("injected fault")]
  Injected,
  #[error(transparent)]
  Store(#[from] fleetbook_store_sqlite::Error),
}

/// Delegates to a `SqliteStore`, failing one kind of write.
struct FaultyStore {
  inner: SqliteStore,
  fault: Fault,
}

impl FaultyStore {
  fn check(&self, at: Fault) -> Result<(), FaultyError> {
    if self.fault == at { Err(FaultyError::Injected) } else { Ok(()) }
  }
}

impl FleetStore for FaultyStore {
  type Error = FaultyError;

  async fn has_table(&self, name: &str) -> Result<bool, FaultyError> {
    Ok(self.inner.has_table(name).await?)
  }

  async fn drop_legacy_table(&self, table: LegacyTable) -> Result<(), FaultyError> {
    self.inner.drop_legacy_table(table).await?;
    self.check(Fault::DropTable)
  }

  async fn begin(&self) -> Result<(), FaultyError> { Ok(self.inner.begin().await?) }

  async fn commit(&self) -> Result<(), FaultyError> { Ok(self.inner.commit().await?) }

  async fn rollback(&self) -> Result<(), FaultyError> { Ok(self.inner.rollback().await?) }

  async fn read_legacy_vehicle_forms(&self) -> Result<Vec<LegacyVehicleForm>, FaultyError> {
    Ok(self.inner.read_legacy_vehicle_forms().await?)
  }

  async fn read_legacy_job_forms(&self) -> Result<Vec<LegacyJobForm>, FaultyError> {
    Ok(self.inner.read_legacy_job_forms().await?)
  }

  async fn get_vehicle(&self, plate: Plate) -> Result<Option<Vehicle>, FaultyError> {
    Ok(self.inner.get_vehicle(plate).await?)
  }

  async fn get_worker(&self, dni: Dni) -> Result<Option<Worker>, FaultyError> {
    Ok(self.inner.get_worker(dni).await?)
  }

  async fn get_job(&self, id: JobId) -> Result<Option<Job>, FaultyError> {
    Ok(self.inner.get_job(id).await?)
  }

  async fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<(), FaultyError> {
    Ok(self.inner.insert_vehicle(vehicle).await?)
  }

  async fn insert_worker(&self, worker: NewWorker) -> Result<(), FaultyError> {
    Ok(self.inner.insert_worker(worker).await?)
  }

  async fn insert_job(&self, job: NewJob) -> Result<(), FaultyError> {
    self.check(Fault::InsertJob)?;
    Ok(self.inner.insert_job(job).await?)
  }

  async fn list_vehicles(&self) -> Result<Vec<Vehicle>, FaultyError> {
    Ok(self.inner.list_vehicles().await?)
  }

  async fn list_workers(&self) -> Result<Vec<Worker>, FaultyError> {
    Ok(self.inner.list_workers().await?)
  }

  async fn list_jobs(&self) -> Result<Vec<Job>, FaultyError> {
    Ok(self.inner.list_jobs().await?)
  }

  async fn get_vehicle_form(&self, key: LinkKey) -> Result<Option<VehicleFormLink>, FaultyError> {
    Ok(self.inner.get_vehicle_form(key).await?)
  }

  async fn get_job_form(&self, key: LinkKey) -> Result<Option<JobFormLink>, FaultyError> {
    Ok(self.inner.get_job_form(key).await?)
  }

  async fn insert_vehicle_form(&self, link: VehicleFormLink) -> Result<(), FaultyError> {
    Ok(self.inner.insert_vehicle_form(link).await?)
  }

  async fn insert_job_form(&self, link: JobFormLink) -> Result<(), FaultyError> {
    self.check(Fault::InsertJobForm)?;
    Ok(self.inner.insert_job_form(link).await?)
  }

  async fn list_vehicle_forms(&self) -> Result<Vec<VehicleFormLink>, FaultyError> {
    Ok(self.inner.list_vehicle_forms().await?)
  }

  async fn list_job_forms(&self) -> Result<Vec<JobFormLink>, FaultyError> {
    Ok(self.inner.list_job_forms().await?)
  }
}

async fn faulty(fault: Fault) -> FaultyStore {
  let inner = store().await;
  seed_ana_scenario(&inner).await;
  legacy_job_row(&inner, 10, 5, "Ana Ruiz", 1, "Madrid").await;
  FaultyStore { inner, fault }
}

#[tokio::test]
async fn entity_phase_failure_rolls_back_every_entity() {
  let s = faulty(Fault::InsertJob).await;

  let (last_state, report) = match migrate(&s).await {
    MigrationOutcome::Aborted { last_state, report, .. } => (last_state, report),
    other => panic!("expected abort, got {other:?}"),
  };
  assert_eq!(last_state, MigrationState::LegacyRead);
  assert_eq!(report.final_state, MigrationState::Aborted);
  assert_eq!(report.vehicles.created, 0);

  let c = counts(&s.inner).await;
  assert_eq!(c.vehicles + c.workers + c.jobs, 0);
  assert!(s.inner.has_table("vehicle_formularies").await.unwrap());
}

#[tokio::test]
async fn link_phase_failure_keeps_committed_entities() {
  let s = faulty(Fault::InsertJobForm).await;

  let (last_state, report) = match migrate(&s).await {
    MigrationOutcome::Aborted { last_state, report, .. } => (last_state, report),
    other => panic!("expected abort, got {other:?}"),
  };
  assert_eq!(last_state, MigrationState::EntitiesCommitted);
  assert_eq!(report.vehicles.created, 1);
  assert_eq!(report.vehicle_forms.created, 0);

  let c = counts(&s.inner).await;
  assert_eq!((c.vehicles, c.workers, c.jobs), (1, 1, 2));
  assert_eq!(c.vehicle_forms + c.job_forms, 0, "link batch rolled back");
  assert!(s.inner.has_table("vehicle_formularies").await.unwrap());
  assert!(s.inner.has_table("job_formularies").await.unwrap());

  // A healthy re-run completes the links without duplicating entities.
  let outcome = migrate(&s.inner).await;
  assert!(matches!(outcome, MigrationOutcome::Completed(_)), "{outcome:?}");
  assert_eq!(outcome.report().vehicles.created, 0);
  let c = counts(&s.inner).await;
  assert_eq!((c.vehicles, c.vehicle_forms, c.job_forms), (1, 2, 1));
}

#[tokio::test]
async fn drop_phase_failure_restores_legacy_tables() {
  let s = faulty(Fault::DropTable).await;

  let (last_state, report) = match migrate(&s).await {
    MigrationOutcome::Aborted { last_state, report, .. } => (last_state, report),
    other => panic!("expected abort, got {other:?}"),
  };
  assert_eq!(last_state, MigrationState::LinksCommitted);
  assert!(report.dropped.is_empty());
  assert!(s.inner.has_table("vehicle_formularies").await.unwrap());
  assert_eq!(counts(&s.inner).await.vehicle_forms, 2);
}
