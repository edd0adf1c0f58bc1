//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Enums are stored in their canonical spelling (`Mitra`, `Iya`). Directory
//! years come back from `GROUP_CONCAT` as a comma-separated string.

use std::str::FromStr;

use ibs_core::{
  company::{Company, CompanyRow, CompletionLevel, NewCompany, completion_percent},
  field_worker::{FieldWorker, FieldWorkerRow, FieldWorkerStatus},
  history::{Completion, SurveyHistory, SurveyHistoryRow},
  survey::{Survey, SurveyRow},
};
use rusqlite::types::Value;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(what: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

pub fn decode_status(s: &str) -> Result<FieldWorkerStatus> { decode_enum("field worker status", s) }

pub fn decode_completion(s: &str) -> Result<Completion> { decode_enum("completion", s) }

/// `"2024,2023"` → `[2023, 2024]`.
pub fn decode_years(s: Option<&str>) -> Vec<i64> {
  let mut years: Vec<i64> = s
    .unwrap_or_default()
    .split(',')
    .filter_map(|y| y.trim().parse().ok())
    .collect();
  years.sort_unstable();
  years.dedup();
  years
}

/// `?, ?, ?` for an `IN (...)` list.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

pub fn id_values(ids: &[i64]) -> Vec<Value> { ids.iter().copied().map(Value::Integer).collect() }

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub struct RawFieldWorker {
  pub id_pcl:        i64,
  pub nama_pcl:      String,
  pub status_pcl:    String,
  pub telp_pcl:      Option<String>,
  pub jumlah_survei: i64,
}

impl RawFieldWorker {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id_pcl:        row.get(0)?,
      nama_pcl:      row.get(1)?,
      status_pcl:    row.get(2)?,
      telp_pcl:      row.get(3)?,
      jumlah_survei: row.get(4)?,
    })
  }

  pub fn into_worker(self) -> Result<FieldWorker> {
    Ok(FieldWorker {
      id_pcl:     self.id_pcl,
      nama_pcl:   self.nama_pcl,
      status_pcl: decode_status(&self.status_pcl)?,
      telp_pcl:   self.telp_pcl,
    })
  }

  pub fn into_row(self) -> Result<FieldWorkerRow> {
    let jumlah_survei = self.jumlah_survei;
    Ok(FieldWorkerRow { worker: self.into_worker()?, jumlah_survei })
  }
}

pub struct RawSurvey {
  pub survey:            Survey,
  pub jumlah_perusahaan: i64,
  pub jumlah_selesai:    i64,
}

impl RawSurvey {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      survey:            Survey {
        id_survei:   row.get(0)?,
        nama_survei: row.get(1)?,
        fungsi:      row.get(2)?,
        periode:     row.get(3)?,
        tahun:       row.get(4)?,
      },
      jumlah_perusahaan: row.get(5)?,
      jumlah_selesai:    row.get(6)?,
    })
  }

  pub fn into_row(self) -> SurveyRow {
    SurveyRow {
      survey:            self.survey,
      jumlah_perusahaan: self.jumlah_perusahaan,
      jumlah_selesai:    self.jumlah_selesai,
    }
  }
}

pub struct RawHistory {
  pub id_riwayat:      i64,
  pub id_survei:       i64,
  pub id_perusahaan:   i64,
  pub id_pcl:          Option<i64>,
  pub selesai:         String,
  pub ket_survei:      Option<String>,
  pub nama_survei:     String,
  pub fungsi:          String,
  pub periode:         String,
  pub tahun:           i64,
  pub kip:             String,
  pub nama_perusahaan: String,
  pub nama_pcl:        Option<String>,
}

impl RawHistory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id_riwayat:      row.get(0)?,
      id_survei:       row.get(1)?,
      id_perusahaan:   row.get(2)?,
      id_pcl:          row.get(3)?,
      selesai:         row.get(4)?,
      ket_survei:      row.get(5)?,
      nama_survei:     row.get(6)?,
      fungsi:          row.get(7)?,
      periode:         row.get(8)?,
      tahun:           row.get(9)?,
      kip:             row.get(10)?,
      nama_perusahaan: row.get(11)?,
      nama_pcl:        row.get(12)?,
    })
  }

  pub fn into_row(self) -> Result<SurveyHistoryRow> {
    Ok(SurveyHistoryRow {
      history:         SurveyHistory {
        id_riwayat:    self.id_riwayat,
        id_survei:     self.id_survei,
        id_perusahaan: self.id_perusahaan,
        id_pcl:        self.id_pcl,
        selesai:       decode_completion(&self.selesai)?,
        ket_survei:    self.ket_survei,
      },
      nama_survei:     self.nama_survei,
      fungsi:          self.fungsi,
      periode:         self.periode,
      tahun:           self.tahun,
      kip:             self.kip,
      nama_perusahaan: self.nama_perusahaan,
      nama_pcl:        self.nama_pcl,
    })
  }
}

/// Company columns in [`NewCompany`] field order, prefixed by the id. A
/// macro so the list query can `concat!` onto it.
macro_rules! company_columns {
  () => {
    "p.id_perusahaan, p.kip, p.nama_perusahaan, p.kd_badan_usaha, p.alamat, \
     p.kd_kec, p.kd_desa, p.kode_pos, p.latitude, p.longitude, p.jarak, p.kd_lok, \
     p.kd_tkerja, p.kd_investasi, p.kd_omset, p.nama_cp, p.jabatan_cp, \
     p.telp_perusahaan, p.email_perusahaan, p.website, p.produk, p.kbli, \
     p.keterangan, p.pcl_utama"
  };
}
pub(crate) use company_columns;

/// Number of columns in `company_columns!()`.
const COMPANY_WIDTH: usize = 24;

pub fn company_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
  Ok(Company {
    id_perusahaan: row.get(0)?,
    fields:        NewCompany {
      kip:              row.get(1)?,
      nama_perusahaan:  row.get(2)?,
      kd_badan_usaha:   row.get(3)?,
      alamat:           row.get(4)?,
      kd_kec:           row.get(5)?,
      kd_desa:          row.get(6)?,
      kode_pos:         row.get(7)?,
      latitude:         row.get(8)?,
      longitude:        row.get(9)?,
      jarak:            row.get(10)?,
      kd_lok:           row.get(11)?,
      kd_tkerja:        row.get(12)?,
      kd_investasi:     row.get(13)?,
      kd_omset:         row.get(14)?,
      nama_cp:          row.get(15)?,
      jabatan_cp:       row.get(16)?,
      telp_perusahaan:  row.get(17)?,
      email_perusahaan: row.get(18)?,
      website:          row.get(19)?,
      produk:           row.get(20)?,
      kbli:             row.get(21)?,
      keterangan:       row.get(22)?,
      pcl_utama:        row.get(23)?,
    },
  })
}

/// A company list row: `company_columns!()` followed by labels, the
/// directory-year list and the survey counts.
pub fn company_row_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CompanyRow> {
  let n = COMPANY_WIDTH;
  let years: Option<String> = row.get(n + 8)?;
  let jumlah_survei: i64 = row.get(n + 9)?;
  let survei_selesai: i64 = row.get(n + 10)?;
  Ok(CompanyRow {
    company: company_from_row(row)?,
    nm_kec: row.get(n)?,
    nm_desa: row.get(n + 1)?,
    ket_badan_usaha: row.get(n + 2)?,
    ket_lok: row.get(n + 3)?,
    ket_tkerja: row.get(n + 4)?,
    ket_investasi: row.get(n + 5)?,
    ket_omset: row.get(n + 6)?,
    nama_pcl: row.get(n + 7)?,
    tahun_direktori: decode_years(years.as_deref()),
    jumlah_survei,
    survei_selesai,
    persen_selesai: completion_percent(survei_selesai, jumlah_survei),
    status_survei: CompletionLevel::from_counts(survei_selesai, jumlah_survei),
  })
}

/// Bind values for [`NewCompany`] in column order (without the id).
pub fn company_values(c: &NewCompany) -> Vec<Value> {
  fn text(v: &Option<String>) -> Value { v.clone().map_or(Value::Null, Value::Text) }
  fn real(v: Option<f64>) -> Value { v.map_or(Value::Null, Value::Real) }

  vec![
    Value::Text(c.kip.clone()),
    Value::Text(c.nama_perusahaan.clone()),
    text(&c.kd_badan_usaha),
    text(&c.alamat),
    text(&c.kd_kec),
    text(&c.kd_desa),
    text(&c.kode_pos),
    real(c.latitude),
    real(c.longitude),
    real(c.jarak),
    text(&c.kd_lok),
    text(&c.kd_tkerja),
    text(&c.kd_investasi),
    text(&c.kd_omset),
    text(&c.nama_cp),
    text(&c.jabatan_cp),
    text(&c.telp_perusahaan),
    text(&c.email_perusahaan),
    text(&c.website),
    text(&c.produk),
    text(&c.kbli),
    text(&c.keterangan),
    c.pcl_utama.map_or(Value::Null, Value::Integer),
  ]
}

/// Column names matching [`company_values`].
pub const COMPANY_WRITE_COLUMNS: &[&str] = &[
  "kip",
  "nama_perusahaan",
  "kd_badan_usaha",
  "alamat",
  "kd_kec",
  "kd_desa",
  "kode_pos",
  "latitude",
  "longitude",
  "jarak",
  "kd_lok",
  "kd_tkerja",
  "kd_investasi",
  "kd_omset",
  "nama_cp",
  "jabatan_cp",
  "telp_perusahaan",
  "email_perusahaan",
  "website",
  "produk",
  "kbli",
  "keterangan",
  "pcl_utama",
];
