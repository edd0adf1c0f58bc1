//! Spreadsheet import: schemas, header mapping, row validation and the types
//! exchanged with the store while a batch is resolved and committed.
//!
//! An import runs in four steps:
//!
//! 1. [`parse`] maps the header row through each field's aliases and checks
//!    every cell. Any error rejects the whole file.
//! 2. The store resolves names (KIP, survey name, field-worker name, lookup
//!    labels) to ids, producing [`ImportRecords`] plus per-row errors for
//!    rows it had to skip.
//! 3. In append mode the store reports rows whose key already exists as
//!    [`DuplicateRow`]s, and the batch waits for a [`DuplicateAction`].
//! 4. The store commits the batch in one transaction.

use std::{collections::HashMap, hash::Hash, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Error, Result,
  company::{self, CompanyImport, CompanyImportRow, NewCompany},
  field_worker::{self, FieldWorkerStatus, NewFieldWorker},
  history::{self, Completion, HistoryImportRow, NewSurveyHistory},
  sheet::{self, Sheet},
  survey::{self, NewSurvey},
  unique::Keyed,
  validate::{FieldRule, RowError, normalize_key, parse_years},
};

/// Spreadsheet row number of the data row at `index` (header is row 1).
pub fn row_number(index: usize) -> usize { index + 2 }

// ─── Modes ───────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImportMode {
  #[default]
  Append,
  Replace,
}

/// What to do with rows whose key already exists.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DuplicateAction {
  /// Overwrite the existing row.
  Replace,
  Skip,
}

/// How the store should write a resolved batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
  /// Insert everything; a key collision aborts the batch.
  Append,
  /// Insert new rows and apply the action to colliding ones.
  Resolve(DuplicateAction),
  /// Delete every row of the resource first.
  Replace,
}

// ─── Schemas ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
  FieldWorkers,
  Surveys,
  SurveyHistory,
  Companies,
}

impl ImportKind {
  pub fn schema(self) -> ImportSchema {
    match self {
      Self::FieldWorkers => ImportSchema { sheet: "Data", fields: field_worker::RULES },
      Self::Surveys => ImportSchema { sheet: "Data", fields: survey::RULES },
      Self::SurveyHistory => ImportSchema { sheet: "Data", fields: history::IMPORT_RULES },
      Self::Companies => ImportSchema { sheet: "Data", fields: company::IMPORT_RULES },
    }
  }

  /// File-name prefix for templates and exports.
  pub fn slug(self) -> &'static str {
    match self {
      Self::FieldWorkers => "pcl",
      Self::Surveys => "survei",
      Self::SurveyHistory => "riwayat_survei",
      Self::Companies => "perusahaan",
    }
  }
}

/// The columns an import accepts, in template order.
#[derive(Debug, Clone, Copy)]
pub struct ImportSchema {
  pub sheet:  &'static str,
  pub fields: &'static [FieldRule],
}

impl ImportSchema {
  pub fn headers(&self) -> Vec<String> {
    self.fields.iter().map(|f| f.label.to_owned()).collect()
  }

  /// Example workbook: a data sheet with one sample row and a rules sheet.
  pub fn template(&self) -> Vec<Sheet> {
    let mut data = Sheet::new(self.sheet, self.headers());
    data.push(self.fields.iter().map(|f| f.example.to_owned()).collect());

    let mut rules = Sheet::new(
      "Aturan",
      ["Kolom", "Wajib", "Aturan", "Contoh"]
        .into_iter()
        .map(str::to_owned)
        .collect(),
    );
    for field in self.fields {
      rules.push(vec![
        field.label.to_owned(),
        (if field.required { "Ya" } else { "Tidak" }).to_owned(),
        field.describe(),
        field.example.to_owned(),
      ]);
    }
    vec![data, rules]
  }

  /// Column index per field, found by label, field name or alias.
  fn columns(&self, sheet: &Sheet) -> Vec<Option<usize>> {
    self
      .fields
      .iter()
      .map(|f| {
        let mut names = vec![f.label, f.field];
        names.extend_from_slice(f.aliases);
        sheet.column(&names)
      })
      .collect()
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A record tagged with its spreadsheet row number.
#[derive(Debug, Clone, PartialEq)]
pub struct Numbered<T> {
  pub row:    usize,
  pub record: T,
}

/// Validated rows, still carrying human-readable references.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedImport {
  FieldWorkers(Vec<Numbered<NewFieldWorker>>),
  Surveys(Vec<Numbered<NewSurvey>>),
  SurveyHistory(Vec<Numbered<HistoryImportRow>>),
  Companies(Vec<Numbered<CompanyImportRow>>),
}

/// Rows with every reference resolved to an id.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportRecords {
  FieldWorkers(Vec<Numbered<NewFieldWorker>>),
  Surveys(Vec<Numbered<NewSurvey>>),
  SurveyHistory(Vec<Numbered<NewSurveyHistory>>),
  Companies(Vec<Numbered<CompanyImport>>),
}

impl ImportRecords {
  pub fn kind(&self) -> ImportKind {
    match self {
      Self::FieldWorkers(_) => ImportKind::FieldWorkers,
      Self::Surveys(_) => ImportKind::Surveys,
      Self::SurveyHistory(_) => ImportKind::SurveyHistory,
      Self::Companies(_) => ImportKind::Companies,
    }
  }

  pub fn len(&self) -> usize {
    match self {
      Self::FieldWorkers(r) => r.len(),
      Self::Surveys(r) => r.len(),
      Self::SurveyHistory(r) => r.len(),
      Self::Companies(r) => r.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Output of name resolution: the rows that resolved, and an error for each
/// row that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
  pub records: ImportRecords,
  pub errors:  Vec<RowError>,
}

/// A resolved row whose key matches an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRow {
  pub row:         usize,
  pub existing_id: i64,
  pub key:         String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
  pub inserted: u64,
  pub updated:  u64,
  pub skipped:  u64,
}

/// Up to three candidates containing `needle`, case-insensitively.
pub fn suggestions<'a, I>(needle: &str, candidates: I) -> Vec<String>
where
  I: IntoIterator<Item = &'a str>,
{
  let needle = normalize_key(needle);
  if needle.is_empty() {
    return Vec::new();
  }
  let mut found: Vec<String> = Vec::new();
  for candidate in candidates {
    let folded = normalize_key(candidate);
    if (folded.contains(&needle) || needle.contains(&folded))
      && !folded.is_empty()
      && !found.iter().any(|f| f == candidate)
    {
      found.push(candidate.to_owned());
      if found.len() == 3 {
        break;
      }
    }
  }
  found
}

/// `"X not found"`, with suggestions appended when there are any.
pub fn not_found_message(what: &str, value: &str, suggestions: &[String]) -> String {
  if suggestions.is_empty() {
    format!("{what} \"{value}\" not found")
  } else {
    format!("{what} \"{value}\" not found; did you mean: {}?", suggestions.join(", "))
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Checked cell values of one row, by field name.
struct RowValues(HashMap<&'static str, String>);

impl RowValues {
  fn text(&self, field: &str) -> Option<String> { self.0.get(field).cloned() }

  fn required(&self, field: &str) -> String { self.text(field).unwrap_or_default() }

  fn parsed<T: FromStr>(&self, field: &str) -> Option<T> {
    self.0.get(field).and_then(|v| v.parse().ok())
  }
}

/// Validate every row of `sheet` against `kind`'s schema.
///
/// Blank rows are ignored. All errors are collected; if there are any the
/// result is [`Error::Validation`] and nothing should be written.
pub fn parse(kind: ImportKind, sheet: &Sheet) -> Result<ParsedImport> {
  let schema = kind.schema();
  let columns = schema.columns(sheet);

  let mut errors: Vec<RowError> = schema
    .fields
    .iter()
    .zip(&columns)
    .filter(|(f, c)| f.required && c.is_none())
    .map(|(f, _)| RowError::field(f.field, format!("column \"{}\" is missing", f.label)))
    .collect();
  if !errors.is_empty() {
    return Err(Error::Validation(errors));
  }

  let mut rows = Vec::new();
  for (index, cells) in sheet.rows.iter().enumerate() {
    if sheet::is_blank(cells) {
      continue;
    }
    let row = row_number(index);
    let mut values = HashMap::new();
    let mut ok = true;
    for (field, column) in schema.fields.iter().zip(&columns) {
      let raw = column.map(|c| Sheet::cell(cells, c));
      match field.check(raw) {
        Ok(Some(v)) => {
          values.insert(field.field, v);
        }
        Ok(None) => {}
        Err(message) => {
          ok = false;
          errors.push(RowError::field(field.field, message).at_row(row));
        }
      }
    }
    if ok {
      rows.push((row, RowValues(values)));
    }
  }

  let parsed = match kind {
    ImportKind::FieldWorkers => {
      let records = numbered(rows, field_worker_row);
      flag_repeats(&records, |r| r.normalized_key(), "nama_pcl", &mut errors);
      ParsedImport::FieldWorkers(records)
    }
    ImportKind::Surveys => {
      let records = numbered(rows, survey_row);
      flag_repeats(&records, |r| r.normalized_key(), "nama_survei", &mut errors);
      ParsedImport::Surveys(records)
    }
    ImportKind::SurveyHistory => {
      let records = numbered(rows, history_row);
      flag_repeats(
        &records,
        |r| {
          (
            normalize_key(&r.kip),
            normalize_key(&r.nama_survei),
            r.fungsi.as_deref().map(normalize_key),
            r.periode.as_deref().map(normalize_key),
            r.tahun,
          )
        },
        "kip",
        &mut errors,
      );
      ParsedImport::SurveyHistory(records)
    }
    ImportKind::Companies => {
      let records = numbered(rows, company_row);
      flag_repeats(&records, |r| normalize_key(&r.fields.kip), "kip", &mut errors);
      ParsedImport::Companies(records)
    }
  };

  if errors.is_empty() {
    Ok(parsed)
  } else {
    errors.sort_by_key(|e| e.row);
    Err(Error::Validation(errors))
  }
}

fn numbered<T>(
  rows: Vec<(usize, RowValues)>,
  build: impl Fn(&RowValues) -> Option<T>,
) -> Vec<Numbered<T>> {
  rows
    .into_iter()
    .filter_map(|(row, values)| build(&values).map(|record| Numbered { row, record }))
    .collect()
}

/// A later row repeating an earlier row's key is an error.
fn flag_repeats<T, K: Eq + Hash>(
  records: &[Numbered<T>],
  key: impl Fn(&T) -> K,
  field: &str,
  errors: &mut Vec<RowError>,
) {
  let mut first_seen: HashMap<K, usize> = HashMap::new();
  for record in records {
    if let Some(first) = first_seen.get(&key(&record.record)) {
      errors.push(
        RowError::field(field, format!("duplicates row {first} in this file"))
          .at_row(record.row),
      );
    } else {
      first_seen.insert(key(&record.record), record.row);
    }
  }
}

fn field_worker_row(v: &RowValues) -> Option<NewFieldWorker> {
  Some(NewFieldWorker {
    nama_pcl:   v.required("nama_pcl"),
    status_pcl: v.parsed::<FieldWorkerStatus>("status_pcl")?,
    telp_pcl:   v.text("telp_pcl"),
  })
}

fn survey_row(v: &RowValues) -> Option<NewSurvey> {
  Some(NewSurvey {
    nama_survei: v.required("nama_survei"),
    fungsi:      v.required("fungsi"),
    periode:     v.required("periode"),
    tahun:       v.parsed("tahun")?,
  })
}

fn history_row(v: &RowValues) -> Option<HistoryImportRow> {
  Some(HistoryImportRow {
    kip:         v.required("kip"),
    nama_survei: v.required("nama_survei"),
    fungsi:      v.text("fungsi"),
    periode:     v.text("periode"),
    tahun:       v.parsed("tahun")?,
    nama_pcl:    v.text("nama_pcl"),
    selesai:     v.parsed::<Completion>("selesai")?,
    ket_survei:  v.text("ket_survei"),
  })
}

fn company_row(v: &RowValues) -> Option<CompanyImportRow> {
  Some(CompanyImportRow {
    fields:          NewCompany {
      kip: v.required("kip"),
      nama_perusahaan: v.required("nama_perusahaan"),
      alamat: v.text("alamat"),
      kode_pos: v.text("kode_pos"),
      latitude: v.parsed("latitude"),
      longitude: v.parsed("longitude"),
      jarak: v.parsed("jarak"),
      nama_cp: v.text("nama_cp"),
      jabatan_cp: v.text("jabatan_cp"),
      telp_perusahaan: v.text("telp_perusahaan"),
      email_perusahaan: v.text("email_perusahaan"),
      website: v.text("website"),
      produk: v.text("produk"),
      kbli: v.text("kbli"),
      keterangan: v.text("keterangan"),
      ..NewCompany::default()
    },
    badan_usaha:     v.text("badan_usaha"),
    kecamatan:       v.text("kecamatan"),
    desa:            v.text("desa"),
    lokasi:          v.text("lokasi"),
    tenaga_kerja:    v.text("tenaga_kerja"),
    investasi:       v.text("investasi"),
    omset:           v.text("omset"),
    nama_pcl:        v.text("pcl_utama"),
    tahun_direktori: v
      .text("tahun_direktori")
      .and_then(|y| parse_years(&y))
      .unwrap_or_default(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sheet(headers: &[&str], rows: &[&[&str]]) -> Sheet {
    Sheet {
      name:    "Data".into(),
      headers: headers.iter().map(|h| (*h).to_owned()).collect(),
      rows:    rows
        .iter()
        .map(|r| r.iter().map(|c| (*c).to_owned()).collect())
        .collect(),
    }
  }

  fn validation_errors(result: Result<ParsedImport>) -> Vec<RowError> {
    match result {
      Err(Error::Validation(errors)) => errors,
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn field_workers_parse_with_aliases() {
    let s = sheet(&["NAMA", "status pcl", "Telepon"], &[
      &["Budi", "mitra", "08123"],
      &["", "", ""],
      &["Sari", "STAFF", ""],
    ]);
    let ParsedImport::FieldWorkers(rows) = parse(ImportKind::FieldWorkers, &s).unwrap() else {
      panic!("wrong kind");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].row, 2);
    assert_eq!(rows[0].record.status_pcl, FieldWorkerStatus::Mitra);
    assert_eq!(rows[1].row, 4);
    assert_eq!(rows[1].record.telp_pcl, None);
  }

  #[test]
  fn every_row_error_is_reported() {
    let s = sheet(&["Nama PCL", "Status", "No. Telepon"], &[
      &["Budi", "Pegawai", "08123"],
      &["Sari", "Mitra", "08-12"],
      &["Ok", "Mitra", ""],
    ]);
    let errors = validation_errors(parse(ImportKind::FieldWorkers, &s));
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].row, Some(2));
    assert_eq!(errors[0].field.as_deref(), Some("status_pcl"));
    assert_eq!(errors[1].row, Some(3));
  }

  #[test]
  fn missing_required_column_fails_early() {
    let s = sheet(&["Nama PCL"], &[&["Budi"]]);
    let errors = validation_errors(parse(ImportKind::FieldWorkers, &s));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row, None);
    assert_eq!(errors[0].field.as_deref(), Some("status_pcl"));
  }

  #[test]
  fn repeated_key_in_file_is_rejected() {
    let s = sheet(&["Nama PCL", "Status"], &[&["Budi", "Mitra"], &[" budi ", "mitra"]]);
    let errors = validation_errors(parse(ImportKind::FieldWorkers, &s));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row, Some(3));
    assert!(errors[0].message.contains("row 2"));
  }

  #[test]
  fn company_rows_carry_years_and_references() {
    let s = sheet(&["KIP", "Nama Perusahaan", "Kecamatan", "PCL Utama", "Tahun Direktori"], &[
      &["001", "PT Satu", "Cibinong", "Budi", "2024, 2023"],
    ]);
    let ParsedImport::Companies(rows) = parse(ImportKind::Companies, &s).unwrap() else {
      panic!("wrong kind");
    };
    let row = &rows[0].record;
    assert_eq!(row.kecamatan.as_deref(), Some("Cibinong"));
    assert_eq!(row.nama_pcl.as_deref(), Some("Budi"));
    assert_eq!(row.tahun_direktori, vec![2023, 2024]);
  }

  #[test]
  fn template_has_data_and_rules() {
    let sheets = ImportKind::Surveys.schema().template();
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0].headers, vec!["Nama Survei", "Fungsi", "Periode", "Tahun"]);
    assert_eq!(sheets[0].rows.len(), 1);
    assert_eq!(sheets[1].name, "Aturan");
    assert_eq!(sheets[1].rows.len(), 4);
  }

  #[test]
  fn template_sample_row_parses() {
    for kind in [
      ImportKind::FieldWorkers,
      ImportKind::Surveys,
      ImportKind::SurveyHistory,
      ImportKind::Companies,
    ] {
      let sheets = kind.schema().template();
      assert!(parse(kind, &sheets[0]).is_ok(), "{kind:?} template does not parse");
    }
  }

  #[test]
  fn suggestions_are_substring_matches() {
    let names = ["Budi Santoso", "Budiman", "Sari", "Budi Utomo", "Abu Budi"];
    assert_eq!(suggestions("budi", names), vec!["Budi Santoso", "Budiman", "Budi Utomo"]);
    assert!(suggestions("zzz", names).is_empty());
  }
}
