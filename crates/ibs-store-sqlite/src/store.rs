//! [`SqliteStore`]: the SQLite implementation of [`DirectoryStore`].

use std::path::Path;

use ibs_core::{
  company::{Company, CompanyDetail, CompanyRow, NewCompany},
  directory::{CopyYear, DirectoryChange, DirectoryMembership, DirectoryYear},
  field_worker::{FieldWorker, FieldWorkerRow, NewFieldWorker},
  history::{NewSurveyHistory, NewSurveyHistoryGroup, SurveyHistory, SurveyHistoryRow},
  import::{CommitMode, DuplicateRow, ImportRecords, ImportSummary, ParsedImport, Resolution},
  lookup::{Desa, Kecamatan, LookupEntry, LookupTable, RegionRow},
  query::{ListQuery, Paginated},
  store::DirectoryStore,
  survey::{NewSurvey, Survey, SurveyRow},
};
use rusqlite::Connection;

use crate::{
  Error, Result, company, directory, field_worker, history, import, integrity, lookup,
  schema::{SCHEMA, register_functions},
  survey,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A directory store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
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

  /// Open an in-memory store, for tests.
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
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the database thread.
  async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Lookups ───────────────────────────────────────────────────────────

  async fn lookup(&self, table: LookupTable) -> Result<Vec<LookupEntry>> {
    self.with_conn(move |conn| lookup::entries(conn, table)).await
  }

  async fn list_kecamatan(&self) -> Result<Vec<Kecamatan>> {
    self.with_conn(|conn| lookup::kecamatan(conn)).await
  }

  async fn list_desa(&self, kd_kec: Option<String>) -> Result<Vec<Desa>> {
    self
      .with_conn(move |conn| lookup::desa(conn, kd_kec.as_deref()))
      .await
  }

  async fn load_regions(&self, rows: Vec<RegionRow>) -> Result<u64> {
    let written = self
      .with_conn(move |conn| lookup::load_regions(conn, &rows))
      .await?;
    tracing::info!(written, "loaded region reference data");
    Ok(written)
  }

  // ── Field workers ─────────────────────────────────────────────────────

  async fn list_field_workers(&self, query: &ListQuery) -> Result<Paginated<FieldWorkerRow>> {
    let query = query.clone();
    self
      .with_conn(move |conn| field_worker::list(conn, &query))
      .await
  }

  async fn export_field_workers(&self, query: &ListQuery) -> Result<Vec<FieldWorkerRow>> {
    let query = query.clone();
    self
      .with_conn(move |conn| field_worker::export(conn, &query))
      .await
  }

  async fn get_field_worker(&self, id: i64) -> Result<Option<FieldWorkerRow>> {
    self.with_conn(move |conn| field_worker::get(conn, id)).await
  }

  async fn create_field_worker(&self, input: NewFieldWorker) -> Result<FieldWorker> {
    self
      .with_conn(move |conn| field_worker::create(conn, input))
      .await
  }

  async fn update_field_worker(&self, id: i64, input: NewFieldWorker) -> Result<FieldWorker> {
    self
      .with_conn(move |conn| field_worker::update(conn, id, input))
      .await
  }

  async fn delete_field_workers(&self, ids: Vec<i64>) -> Result<u64> {
    self
      .with_conn(move |conn| integrity::FIELD_WORKERS.delete_all(conn, &ids))
      .await
  }

  // ── Surveys ───────────────────────────────────────────────────────────

  async fn list_surveys(&self, query: &ListQuery) -> Result<Paginated<SurveyRow>> {
    let query = query.clone();
    self.with_conn(move |conn| survey::list(conn, &query)).await
  }

  async fn export_surveys(&self, query: &ListQuery) -> Result<Vec<SurveyRow>> {
    let query = query.clone();
    self.with_conn(move |conn| survey::export(conn, &query)).await
  }

  async fn get_survey(&self, id: i64) -> Result<Option<SurveyRow>> {
    self.with_conn(move |conn| survey::get(conn, id)).await
  }

  async fn create_survey(&self, input: NewSurvey) -> Result<Survey> {
    self.with_conn(move |conn| survey::create(conn, input)).await
  }

  async fn update_survey(&self, id: i64, input: NewSurvey) -> Result<Survey> {
    self
      .with_conn(move |conn| survey::update(conn, id, input))
      .await
  }

  async fn delete_surveys(&self, ids: Vec<i64>) -> Result<u64> {
    self
      .with_conn(move |conn| integrity::SURVEYS.delete_all(conn, &ids))
      .await
  }

  // ── Survey history ────────────────────────────────────────────────────

  async fn list_history(&self, query: &ListQuery) -> Result<Paginated<SurveyHistoryRow>> {
    let query = query.clone();
    self.with_conn(move |conn| history::list(conn, &query)).await
  }

  async fn export_history(&self, query: &ListQuery) -> Result<Vec<SurveyHistoryRow>> {
    let query = query.clone();
    self.with_conn(move |conn| history::export(conn, &query)).await
  }

  async fn get_history(&self, id: i64) -> Result<Option<SurveyHistoryRow>> {
    self.with_conn(move |conn| history::get(conn, id)).await
  }

  async fn create_history(&self, input: NewSurveyHistoryGroup) -> Result<Vec<SurveyHistory>> {
    self.with_conn(move |conn| history::create(conn, input)).await
  }

  async fn update_history(&self, id: i64, input: NewSurveyHistory) -> Result<SurveyHistory> {
    self
      .with_conn(move |conn| history::update(conn, id, input))
      .await
  }

  async fn delete_history(&self, ids: Vec<i64>) -> Result<u64> {
    self
      .with_conn(move |conn| integrity::HISTORY.delete_all(conn, &ids))
      .await
  }

  // ── Companies ─────────────────────────────────────────────────────────

  async fn list_companies(&self, query: &ListQuery) -> Result<Paginated<CompanyRow>> {
    let query = query.clone();
    self.with_conn(move |conn| company::list(conn, &query)).await
  }

  async fn export_companies(&self, query: &ListQuery) -> Result<Vec<CompanyRow>> {
    let query = query.clone();
    self.with_conn(move |conn| company::export(conn, &query)).await
  }

  async fn get_company(&self, id: i64) -> Result<Option<CompanyDetail>> {
    self.with_conn(move |conn| company::get(conn, id)).await
  }

  async fn create_company(&self, input: NewCompany, tahun_direktori: Vec<i64>) -> Result<Company> {
    self
      .with_conn(move |conn| company::create(conn, input, tahun_direktori))
      .await
  }

  async fn update_company(
    &self,
    id: i64,
    input: NewCompany,
    tahun_direktori: Option<Vec<i64>>,
  ) -> Result<Company> {
    self
      .with_conn(move |conn| company::update(conn, id, input, tahun_direktori))
      .await
  }

  async fn delete_companies(&self, ids: Vec<i64>) -> Result<u64> {
    self
      .with_conn(move |conn| integrity::COMPANIES.delete_all(conn, &ids))
      .await
  }

  // ── Directory years ───────────────────────────────────────────────────

  async fn list_directory_years(&self) -> Result<Vec<DirectoryYear>> {
    self.with_conn(|conn| directory::years(conn)).await
  }

  async fn add_to_directory(&self, input: DirectoryMembership) -> Result<DirectoryChange> {
    self.with_conn(move |conn| directory::add(conn, input)).await
  }

  async fn remove_from_directory(&self, input: DirectoryMembership) -> Result<DirectoryChange> {
    self
      .with_conn(move |conn| directory::remove(conn, input))
      .await
  }

  async fn copy_directory_year(&self, input: CopyYear) -> Result<DirectoryChange> {
    self.with_conn(move |conn| directory::copy(conn, input)).await
  }

  // ── Import ────────────────────────────────────────────────────────────

  async fn resolve_import(&self, parsed: ParsedImport) -> Result<Resolution> {
    self.with_conn(move |conn| import::resolve(conn, parsed)).await
  }

  async fn find_duplicates(&self, records: &ImportRecords) -> Result<Vec<DuplicateRow>> {
    let records = records.clone();
    self
      .with_conn(move |conn| import::duplicates(conn, &records))
      .await
  }

  async fn commit_import(&self, records: ImportRecords, mode: CommitMode) -> Result<ImportSummary> {
    let kind = records.kind();
    let rows = records.len();
    let summary = self
      .with_conn(move |conn| import::commit(conn, records, mode))
      .await?;
    tracing::info!(
      ?kind,
      rows,
      inserted = summary.inserted,
      updated = summary.updated,
      skipped = summary.skipped,
      "import committed"
    );
    Ok(summary)
  }
}
