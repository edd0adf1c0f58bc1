//! Surveys run against directory companies.

use serde::{Deserialize, Serialize};

use crate::{
  unique::{KeyValue, Keyed, SURVEY_KEY, UniqueKey},
  validate::{FieldRule, MAX_YEAR, MIN_YEAR, Rule, RowError, Validate},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
  pub id_survei:   i64,
  pub nama_survei: String,
  pub fungsi:      String,
  pub periode:     String,
  pub tahun:       i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSurvey {
  pub nama_survei: String,
  pub fungsi:      String,
  pub periode:     String,
  pub tahun:       i64,
}

impl NewSurvey {
  pub fn normalized(self) -> Self {
    Self {
      nama_survei: self.nama_survei.trim().to_owned(),
      fungsi:      self.fungsi.trim().to_owned(),
      periode:     self.periode.trim().to_owned(),
      tahun:       self.tahun,
    }
  }
}

/// List row with how many companies the survey covers and how many are done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRow {
  #[serde(flatten)]
  pub survey:            Survey,
  pub jumlah_perusahaan: i64,
  pub jumlah_selesai:    i64,
}

// ─── Rules ───────────────────────────────────────────────────────────────────

pub const NAMA_SURVEI: FieldRule = FieldRule {
  field:    "nama_survei",
  label:    "Nama Survei",
  aliases:  &["nama_survei", "survei", "nama"],
  required: true,
  rule:     Rule::Text { min: 2, max: 150, identity: true },
  example:  "Survei Industri Besar Sedang",
};

pub const FUNGSI: FieldRule = FieldRule {
  field:    "fungsi",
  label:    "Fungsi",
  aliases:  &["fungsi survei", "tim"],
  required: true,
  rule:     Rule::Text { min: 2, max: 100, identity: true },
  example:  "Statistik Produksi",
};

pub const PERIODE: FieldRule = FieldRule {
  field:    "periode",
  label:    "Periode",
  aliases:  &["periodisitas", "periode survei"],
  required: true,
  rule:     Rule::Text { min: 2, max: 50, identity: true },
  example:  "Tahunan",
};

pub const TAHUN: FieldRule = FieldRule {
  field:    "tahun",
  label:    "Tahun",
  aliases:  &["tahun survei", "thn"],
  required: true,
  rule:     Rule::Integer { min: MIN_YEAR, max: MAX_YEAR },
  example:  "2024",
};

pub const RULES: &[FieldRule] = &[NAMA_SURVEI, FUNGSI, PERIODE, TAHUN];

impl Validate for NewSurvey {
  fn errors(&self) -> Vec<RowError> {
    let mut errors = Vec::new();
    NAMA_SURVEI.check_into(Some(&self.nama_survei), &mut errors);
    FUNGSI.check_into(Some(&self.fungsi), &mut errors);
    PERIODE.check_into(Some(&self.periode), &mut errors);
    TAHUN.check_into(Some(&self.tahun.to_string()), &mut errors);
    errors
  }
}

impl Keyed for NewSurvey {
  const KEY: &'static UniqueKey = &SURVEY_KEY;

  fn key_values(&self) -> Vec<KeyValue> {
    vec![
      self.nama_survei.as_str().into(),
      self.fungsi.as_str().into(),
      self.periode.as_str().into(),
      self.tahun.into(),
    ]
  }
}
