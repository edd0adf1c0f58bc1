//! The `DirectoryStore` trait.
//!
//! Implemented by storage backends (e.g. `ibs-store-sqlite`). The HTTP layer
//! depends on this abstraction only.

use std::future::Future;

use crate::{
  company::{Company, CompanyDetail, CompanyRow, NewCompany},
  directory::{CopyYear, DirectoryChange, DirectoryMembership, DirectoryYear},
  field_worker::{FieldWorker, FieldWorkerRow, NewFieldWorker},
  history::{NewSurveyHistory, NewSurveyHistoryGroup, SurveyHistory, SurveyHistoryRow},
  import::{CommitMode, DuplicateRow, ImportRecords, ImportSummary, ParsedImport, Resolution},
  lookup::{Desa, Kecamatan, LookupEntry, LookupTable, RegionRow},
  query::{ListQuery, Paginated},
  survey::{NewSurvey, Survey, SurveyRow},
};

/// Abstraction over a directory storage backend.
///
/// Every write validates its input and checks uniqueness keys before
/// touching the database; failures surface as [`crate::Error`] variants once
/// converted. Deletes take a set of ids and are all-or-nothing: if any id is
/// missing or still referenced, nothing is deleted.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Lookups ───────────────────────────────────────────────────────────

  fn lookup(
    &self,
    table: LookupTable,
  ) -> impl Future<Output = Result<Vec<LookupEntry>, Self::Error>> + Send + '_;

  fn list_kecamatan(
    &self,
  ) -> impl Future<Output = Result<Vec<Kecamatan>, Self::Error>> + Send + '_;

  /// Villages, optionally restricted to one sub-district.
  fn list_desa(
    &self,
    kd_kec: Option<String>,
  ) -> impl Future<Output = Result<Vec<Desa>, Self::Error>> + Send + '_;

  /// Upsert sub-districts and villages. Returns the number of villages
  /// written.
  fn load_regions(
    &self,
    rows: Vec<RegionRow>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Field workers ─────────────────────────────────────────────────────

  fn list_field_workers<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Paginated<FieldWorkerRow>, Self::Error>> + Send + 'a;

  /// Every row matching `query`'s filters, in its sort order, unpaginated.
  fn export_field_workers<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Vec<FieldWorkerRow>, Self::Error>> + Send + 'a;

  fn get_field_worker(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<FieldWorkerRow>, Self::Error>> + Send + '_;

  fn create_field_worker(
    &self,
    input: NewFieldWorker,
  ) -> impl Future<Output = Result<FieldWorker, Self::Error>> + Send + '_;

  fn update_field_worker(
    &self,
    id: i64,
    input: NewFieldWorker,
  ) -> impl Future<Output = Result<FieldWorker, Self::Error>> + Send + '_;

  /// Blocked while survey history or a company's primary worker references
  /// any of the ids.
  fn delete_field_workers(
    &self,
    ids: Vec<i64>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Surveys ───────────────────────────────────────────────────────────

  fn list_surveys<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Paginated<SurveyRow>, Self::Error>> + Send + 'a;

  fn export_surveys<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Vec<SurveyRow>, Self::Error>> + Send + 'a;

  fn get_survey(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<SurveyRow>, Self::Error>> + Send + '_;

  fn create_survey(
    &self,
    input: NewSurvey,
  ) -> impl Future<Output = Result<Survey, Self::Error>> + Send + '_;

  fn update_survey(
    &self,
    id: i64,
    input: NewSurvey,
  ) -> impl Future<Output = Result<Survey, Self::Error>> + Send + '_;

  /// Blocked while survey history references any of the ids.
  fn delete_surveys(
    &self,
    ids: Vec<i64>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Survey history ────────────────────────────────────────────────────

  fn list_history<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Paginated<SurveyHistoryRow>, Self::Error>> + Send + 'a;

  fn export_history<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Vec<SurveyHistoryRow>, Self::Error>> + Send + 'a;

  fn get_history(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<SurveyHistoryRow>, Self::Error>> + Send + '_;

  /// Assign one survey to several companies. If any company already has
  /// the survey, nothing is written and every collision is reported.
  fn create_history(
    &self,
    input: NewSurveyHistoryGroup,
  ) -> impl Future<Output = Result<Vec<SurveyHistory>, Self::Error>> + Send + '_;

  fn update_history(
    &self,
    id: i64,
    input: NewSurveyHistory,
  ) -> impl Future<Output = Result<SurveyHistory, Self::Error>> + Send + '_;

  fn delete_history(
    &self,
    ids: Vec<i64>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Companies ─────────────────────────────────────────────────────────

  fn list_companies<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Paginated<CompanyRow>, Self::Error>> + Send + 'a;

  fn export_companies<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Vec<CompanyRow>, Self::Error>> + Send + 'a;

  /// The company with its directory years and survey history.
  fn get_company(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<CompanyDetail>, Self::Error>> + Send + '_;

  fn create_company(
    &self,
    input: NewCompany,
    tahun_direktori: Vec<i64>,
  ) -> impl Future<Output = Result<Company, Self::Error>> + Send + '_;

  /// `tahun_direktori`, when given, replaces the company's directory years.
  fn update_company(
    &self,
    id: i64,
    input: NewCompany,
    tahun_direktori: Option<Vec<i64>>,
  ) -> impl Future<Output = Result<Company, Self::Error>> + Send + '_;

  /// Blocked while survey history references any of the ids. Directory
  /// memberships go with the company.
  fn delete_companies(
    &self,
    ids: Vec<i64>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Directory years ───────────────────────────────────────────────────

  fn list_directory_years(
    &self,
  ) -> impl Future<Output = Result<Vec<DirectoryYear>, Self::Error>> + Send + '_;

  fn add_to_directory(
    &self,
    input: DirectoryMembership,
  ) -> impl Future<Output = Result<DirectoryChange, Self::Error>> + Send + '_;

  fn remove_from_directory(
    &self,
    input: DirectoryMembership,
  ) -> impl Future<Output = Result<DirectoryChange, Self::Error>> + Send + '_;

  fn copy_directory_year(
    &self,
    input: CopyYear,
  ) -> impl Future<Output = Result<DirectoryChange, Self::Error>> + Send + '_;

  // ── Import ────────────────────────────────────────────────────────────

  /// Resolve names to ids. Rows that fail are dropped with an error each.
  fn resolve_import(
    &self,
    parsed: ParsedImport,
  ) -> impl Future<Output = Result<Resolution, Self::Error>> + Send + '_;

  /// Resolved rows whose key already exists.
  fn find_duplicates<'a>(
    &'a self,
    records: &'a ImportRecords,
  ) -> impl Future<Output = Result<Vec<DuplicateRow>, Self::Error>> + Send + 'a;

  /// Write a batch in one transaction. Keys are re-checked inside it.
  fn commit_import(
    &self,
    records: ImportRecords,
    mode: CommitMode,
  ) -> impl Future<Output = Result<ImportSummary, Self::Error>> + Send + '_;
}
