//! Fixed export layouts.
//!
//! Headers reuse the import labels, so an exported workbook imports back
//! unchanged. Trailing read-only columns (counts, completion) carry headers no
//! import schema recognises and are ignored on the way back in.

use chrono::NaiveDateTime;

use crate::{
  company::{self, CompanyRow},
  field_worker::{self, FieldWorkerRow},
  history::{self, SurveyHistoryRow},
  query::ListQuery,
  sheet::Sheet,
  survey::{self, SurveyRow},
};

/// Longest filter signature kept in a file name.
pub const MAX_SIGNATURE_LEN: usize = 60;

/// A list row that can be written as one spreadsheet line.
pub trait ExportRow {
  fn headers() -> Vec<&'static str>;
  fn cells(&self) -> Vec<String>;
}

/// Write rows under their fixed headers.
pub fn to_sheet<T: ExportRow>(name: &str, rows: &[T]) -> Sheet {
  let mut sheet = Sheet::new(name, T::headers().into_iter().map(str::to_owned).collect());
  for row in rows {
    sheet.push(row.cells());
  }
  sheet
}

/// `<resource>_<YYYYMMDD_HHMMSS>_<signature>.xlsx`.
pub fn file_name(resource: &str, query: &ListQuery, at: NaiveDateTime) -> String {
  format!(
    "{resource}_{}_{}.xlsx",
    at.format("%Y%m%d_%H%M%S"),
    filter_signature(query)
  )
}

/// Active filters (and the search term) as `key-value` joined by `_`, or
/// `semua` when nothing narrows the list.
pub fn filter_signature(query: &ListQuery) -> String {
  let mut parts: Vec<String> = query
    .active_filters()
    .map(|(k, v)| format!("{k}-{v}"))
    .collect();
  if let Some(term) = query.search_term() {
    parts.push(format!("cari-{term}"));
  }
  if parts.is_empty() {
    return "semua".to_owned();
  }

  let mut signature: String = parts
    .join("_")
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
    .collect();
  signature.truncate(MAX_SIGNATURE_LEN);
  signature
}

fn opt(value: &Option<String>) -> String { value.clone().unwrap_or_default() }

fn num(value: Option<f64>) -> String { value.map(|n| n.to_string()).unwrap_or_default() }

// ─── Layouts ─────────────────────────────────────────────────────────────────

impl ExportRow for FieldWorkerRow {
  fn headers() -> Vec<&'static str> {
    vec![
      field_worker::NAMA_PCL.label,
      field_worker::STATUS_PCL.label,
      field_worker::TELP_PCL.label,
      "Jumlah Survei",
    ]
  }

  fn cells(&self) -> Vec<String> {
    vec![
      self.worker.nama_pcl.clone(),
      self.worker.status_pcl.to_string(),
      opt(&self.worker.telp_pcl),
      self.jumlah_survei.to_string(),
    ]
  }
}

impl ExportRow for SurveyRow {
  fn headers() -> Vec<&'static str> {
    vec![
      survey::NAMA_SURVEI.label,
      survey::FUNGSI.label,
      survey::PERIODE.label,
      survey::TAHUN.label,
      "Jumlah Perusahaan",
      "Jumlah Selesai",
    ]
  }

  fn cells(&self) -> Vec<String> {
    vec![
      self.survey.nama_survei.clone(),
      self.survey.fungsi.clone(),
      self.survey.periode.clone(),
      self.survey.tahun.to_string(),
      self.jumlah_perusahaan.to_string(),
      self.jumlah_selesai.to_string(),
    ]
  }
}

impl ExportRow for SurveyHistoryRow {
  fn headers() -> Vec<&'static str> {
    history::IMPORT_RULES.iter().map(|f| f.label).collect()
  }

  fn cells(&self) -> Vec<String> {
    vec![
      self.kip.clone(),
      self.nama_perusahaan.clone(),
      self.nama_survei.clone(),
      self.fungsi.clone(),
      self.periode.clone(),
      self.tahun.to_string(),
      opt(&self.nama_pcl),
      self.history.selesai.to_string(),
      opt(&self.history.ket_survei),
    ]
  }
}

impl ExportRow for CompanyRow {
  fn headers() -> Vec<&'static str> {
    let mut headers: Vec<&'static str> =
      company::IMPORT_RULES.iter().map(|f| f.label).collect();
    headers.extend(["Jumlah Survei", "Survei Selesai", "Status Survei"]);
    headers
  }

  /// Lookup references are written as labels, which the importer resolves
  /// back to codes.
  fn cells(&self) -> Vec<String> {
    let c = &self.company.fields;
    vec![
      c.kip.clone(),
      c.nama_perusahaan.clone(),
      self.ket_badan_usaha.clone().or_else(|| c.kd_badan_usaha.clone()).unwrap_or_default(),
      opt(&c.alamat),
      self.nm_kec.clone().or_else(|| c.kd_kec.clone()).unwrap_or_default(),
      self.nm_desa.clone().or_else(|| c.kd_desa.clone()).unwrap_or_default(),
      opt(&c.kode_pos),
      num(c.latitude),
      num(c.longitude),
      num(c.jarak),
      self.ket_lok.clone().or_else(|| c.kd_lok.clone()).unwrap_or_default(),
      self.ket_tkerja.clone().or_else(|| c.kd_tkerja.clone()).unwrap_or_default(),
      self.ket_investasi.clone().or_else(|| c.kd_investasi.clone()).unwrap_or_default(),
      self.ket_omset.clone().or_else(|| c.kd_omset.clone()).unwrap_or_default(),
      opt(&c.nama_cp),
      opt(&c.jabatan_cp),
      opt(&c.telp_perusahaan),
      opt(&c.email_perusahaan),
      opt(&c.website),
      opt(&c.produk),
      opt(&c.kbli),
      opt(&c.keterangan),
      opt(&self.nama_pcl),
      self
        .tahun_direktori
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(","),
      self.jumlah_survei.to_string(),
      self.survei_selesai.to_string(),
      self.status_survei.to_string(),
    ]
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::field_worker::{FieldWorker, FieldWorkerStatus};

  fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
      .and_then(|d| d.and_hms_opt(14, 5, 7))
      .unwrap()
  }

  #[test]
  fn unfiltered_export_is_semua() {
    let q = ListQuery::default().with_filter("status", "all");
    assert_eq!(file_name("pcl", &q, at()), "pcl_20240309_140507_semua.xlsx");
  }

  #[test]
  fn signature_is_sanitised_and_truncated() {
    let q = ListQuery::default()
      .with_filter("kec", "010")
      .with_filter("pcl", "Budi Santoso/../x");
    assert_eq!(filter_signature(&q), "kec-010_pcl-Budi-Santoso----x");

    let q = ListQuery::default().with_filter("search_like", "x".repeat(200));
    assert_eq!(filter_signature(&q).len(), MAX_SIGNATURE_LEN);
  }

  #[test]
  fn cells_line_up_with_headers() {
    let row = FieldWorkerRow {
      worker:        FieldWorker {
        id_pcl:     1,
        nama_pcl:   "Budi".into(),
        status_pcl: FieldWorkerStatus::Mitra,
        telp_pcl:   None,
      },
      jumlah_survei: 3,
    };
    let sheet = to_sheet("PCL", &[row]);
    assert_eq!(sheet.headers.len(), sheet.rows[0].len());
    assert_eq!(sheet.rows[0], vec!["Budi", "Mitra", "", "3"]);
    assert_eq!(
      CompanyRow::headers().len(),
      company::IMPORT_RULES.len() + 3
    );
  }
}
