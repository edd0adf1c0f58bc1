//! Survey history: which survey was (or was not) completed for which company,
//! and by which field worker.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantNames};

use crate::{
  unique::{HISTORY_KEY, KeyValue, Keyed, UniqueKey},
  validate::{FieldRule, MAX_YEAR, MIN_YEAR, Rule, RowError, Validate},
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
  VariantNames,
)]
#[strum(ascii_case_insensitive)]
pub enum Completion {
  Iya,
  Tidak,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyHistory {
  pub id_riwayat:    i64,
  pub id_survei:     i64,
  pub id_perusahaan: i64,
  pub id_pcl:        Option<i64>,
  pub selesai:       Completion,
  pub ket_survei:    Option<String>,
}

/// Input for update and import: one (survey, company) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSurveyHistory {
  pub id_survei:     i64,
  pub id_perusahaan: i64,
  #[serde(default)]
  pub id_pcl:        Option<i64>,
  pub selesai:       Completion,
  #[serde(default)]
  pub ket_survei:    Option<String>,
}

/// Create input: one survey assigned to a group of companies at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSurveyHistoryGroup {
  pub id_survei:     i64,
  pub id_perusahaan: Vec<i64>,
  #[serde(default)]
  pub id_pcl:        Option<i64>,
  pub selesai:       Completion,
  #[serde(default)]
  pub ket_survei:    Option<String>,
}

impl NewSurveyHistoryGroup {
  /// Expand into one record per distinct company, in request order.
  pub fn records(&self) -> Vec<NewSurveyHistory> {
    let mut seen = std::collections::HashSet::new();
    self
      .id_perusahaan
      .iter()
      .filter(|id| seen.insert(**id))
      .map(|&id_perusahaan| NewSurveyHistory {
        id_survei: self.id_survei,
        id_perusahaan,
        id_pcl: self.id_pcl,
        selesai: self.selesai,
        ket_survei: self.ket_survei.clone(),
      })
      .collect()
  }
}

/// Denormalised list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyHistoryRow {
  #[serde(flatten)]
  pub history:         SurveyHistory,
  pub nama_survei:     String,
  pub fungsi:          String,
  pub periode:         String,
  pub tahun:           i64,
  pub kip:             String,
  pub nama_perusahaan: String,
  pub nama_pcl:        Option<String>,
}

/// One spreadsheet row before its names are resolved to ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryImportRow {
  pub kip:         String,
  pub nama_survei: String,
  pub fungsi:      Option<String>,
  pub periode:     Option<String>,
  pub tahun:       i64,
  pub nama_pcl:    Option<String>,
  pub selesai:     Completion,
  pub ket_survei:  Option<String>,
}

// ─── Rules ───────────────────────────────────────────────────────────────────

pub const SELESAI: FieldRule = FieldRule {
  field:    "selesai",
  label:    "Selesai",
  aliases:  &["status selesai", "status"],
  required: true,
  rule:     Rule::Choice(Completion::VARIANTS),
  example:  "Iya",
};

pub const KET_SURVEI: FieldRule = FieldRule {
  field:    "ket_survei",
  label:    "Keterangan",
  aliases:  &["ket_survei", "ket", "catatan"],
  required: false,
  rule:     Rule::Text { min: 1, max: 500, identity: false },
  example:  "Responden kooperatif",
};

pub const IMPORT_KIP: FieldRule = FieldRule {
  field:    "kip",
  label:    "KIP",
  aliases:  &["kode kip", "kode perusahaan"],
  required: true,
  rule:     Rule::Text { min: 1, max: 30, identity: true },
  example:  "3201001",
};

pub const IMPORT_NAMA_PERUSAHAAN: FieldRule = FieldRule {
  field:    "nama_perusahaan",
  label:    "Nama Perusahaan",
  aliases:  &["nama_perusahaan", "perusahaan"],
  required: false,
  rule:     Rule::Text { min: 1, max: 200, identity: false },
  example:  "PT Maju Jaya",
};

pub const IMPORT_NAMA_SURVEI: FieldRule = FieldRule {
  field:    "nama_survei",
  label:    "Nama Survei",
  aliases:  &["nama_survei", "survei"],
  required: true,
  rule:     Rule::Text { min: 2, max: 150, identity: true },
  example:  "Survei Industri Besar Sedang",
};

pub const IMPORT_FUNGSI: FieldRule = FieldRule {
  field:    "fungsi",
  label:    "Fungsi",
  aliases:  &["fungsi survei"],
  required: false,
  rule:     Rule::Text { min: 2, max: 100, identity: true },
  example:  "Statistik Produksi",
};

pub const IMPORT_PERIODE: FieldRule = FieldRule {
  field:    "periode",
  label:    "Periode",
  aliases:  &["periodisitas"],
  required: false,
  rule:     Rule::Text { min: 2, max: 50, identity: true },
  example:  "Tahunan",
};

pub const IMPORT_TAHUN: FieldRule = FieldRule {
  field:    "tahun",
  label:    "Tahun",
  aliases:  &["tahun survei", "thn"],
  required: true,
  rule:     Rule::Integer { min: MIN_YEAR, max: MAX_YEAR },
  example:  "2024",
};

pub const IMPORT_NAMA_PCL: FieldRule = FieldRule {
  field:    "nama_pcl",
  label:    "Nama PCL",
  aliases:  &["nama_pcl", "pcl", "petugas"],
  required: false,
  rule:     Rule::Text { min: 2, max: 100, identity: true },
  example:  "Budi Santoso",
};

pub const IMPORT_RULES: &[FieldRule] = &[
  IMPORT_KIP,
  IMPORT_NAMA_PERUSAHAAN,
  IMPORT_NAMA_SURVEI,
  IMPORT_FUNGSI,
  IMPORT_PERIODE,
  IMPORT_TAHUN,
  IMPORT_NAMA_PCL,
  SELESAI,
  KET_SURVEI,
];

impl Validate for NewSurveyHistory {
  fn errors(&self) -> Vec<RowError> {
    let mut errors = Vec::new();
    KET_SURVEI.check_into(self.ket_survei.as_deref(), &mut errors);
    errors
  }
}

impl Validate for NewSurveyHistoryGroup {
  fn errors(&self) -> Vec<RowError> {
    let mut errors = Vec::new();
    if self.id_perusahaan.is_empty() {
      errors.push(RowError::field("id_perusahaan", "select at least one company"));
    }
    KET_SURVEI.check_into(self.ket_survei.as_deref(), &mut errors);
    errors
  }
}

impl Keyed for NewSurveyHistory {
  const KEY: &'static UniqueKey = &HISTORY_KEY;

  fn key_values(&self) -> Vec<KeyValue> {
    vec![self.id_survei.into(), self.id_perusahaan.into()]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn group_expands_distinct_companies_in_order() {
    let group = NewSurveyHistoryGroup {
      id_survei:     7,
      id_perusahaan: vec![3, 1, 3, 2],
      id_pcl:        Some(4),
      selesai:       Completion::Tidak,
      ket_survei:    None,
    };
    let ids: Vec<i64> = group.records().iter().map(|r| r.id_perusahaan).collect();
    assert_eq!(ids, vec![3, 1, 2]);
  }

  #[test]
  fn empty_group_is_invalid() {
    let group = NewSurveyHistoryGroup {
      id_survei:     1,
      id_perusahaan: vec![],
      id_pcl:        None,
      selesai:       Completion::Iya,
      ket_survei:    None,
    };
    assert!(group.validate().is_err());
  }
}
