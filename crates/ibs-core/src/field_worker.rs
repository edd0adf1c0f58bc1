//! Field workers (PCL, "Petugas Pencacah Lapangan").

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantNames};

use crate::{
  unique::{FIELD_WORKER_KEY, KeyValue, Keyed, UniqueKey},
  validate::{FieldRule, Rule, RowError, Validate},
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
  VariantNames,
)]
#[strum(ascii_case_insensitive)]
pub enum FieldWorkerStatus {
  Mitra,
  Staff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWorker {
  pub id_pcl:     i64,
  pub nama_pcl:   String,
  pub status_pcl: FieldWorkerStatus,
  pub telp_pcl:   Option<String>,
}

/// Input for create, update and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFieldWorker {
  pub nama_pcl:   String,
  pub status_pcl: FieldWorkerStatus,
  #[serde(default)]
  pub telp_pcl:   Option<String>,
}

impl NewFieldWorker {
  /// Trim text fields and blank out an empty phone number.
  pub fn normalized(self) -> Self {
    Self {
      nama_pcl:   self.nama_pcl.trim().to_owned(),
      status_pcl: self.status_pcl,
      telp_pcl:   self
        .telp_pcl
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty()),
    }
  }
}

/// List row: the worker plus how many survey-history rows name them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWorkerRow {
  #[serde(flatten)]
  pub worker:        FieldWorker,
  pub jumlah_survei: i64,
}

// ─── Rules ───────────────────────────────────────────────────────────────────

pub const NAMA_PCL: FieldRule = FieldRule {
  field:    "nama_pcl",
  label:    "Nama PCL",
  aliases:  &["nama_pcl", "nama", "nama petugas"],
  required: true,
  rule:     Rule::Text { min: 2, max: 100, identity: true },
  example:  "Budi Santoso",
};

pub const STATUS_PCL: FieldRule = FieldRule {
  field:    "status_pcl",
  label:    "Status",
  aliases:  &["status_pcl", "status pcl"],
  required: true,
  rule:     Rule::Choice(FieldWorkerStatus::VARIANTS),
  example:  "Mitra",
};

pub const TELP_PCL: FieldRule = FieldRule {
  field:    "telp_pcl",
  label:    "No. Telepon",
  aliases:  &["telp_pcl", "telepon", "telp", "no telp", "no hp"],
  required: false,
  rule:     Rule::Digits { max: 15 },
  example:  "081234567890",
};

pub const RULES: &[FieldRule] = &[NAMA_PCL, STATUS_PCL, TELP_PCL];

impl Validate for NewFieldWorker {
  fn errors(&self) -> Vec<RowError> {
    let mut errors = Vec::new();
    NAMA_PCL.check_into(Some(&self.nama_pcl), &mut errors);
    TELP_PCL.check_into(self.telp_pcl.as_deref(), &mut errors);
    errors
  }
}

impl Keyed for NewFieldWorker {
  const KEY: &'static UniqueKey = &FIELD_WORKER_KEY;

  fn key_values(&self) -> Vec<KeyValue> {
    vec![
      self.nama_pcl.as_str().into(),
      self.status_pcl.as_ref().into(),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parses_case_insensitively() {
    assert_eq!("mitra".parse::<FieldWorkerStatus>().unwrap(), FieldWorkerStatus::Mitra);
    assert_eq!(FieldWorkerStatus::Staff.to_string(), "Staff");
  }

  #[test]
  fn validation_reports_every_field() {
    let worker = NewFieldWorker {
      nama_pcl:   "<x>".into(),
      status_pcl: FieldWorkerStatus::Mitra,
      telp_pcl:   Some("08-12".into()),
    };
    let errors = worker.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].field.as_deref(), Some("nama_pcl"));
    assert_eq!(errors[1].field.as_deref(), Some("telp_pcl"));
  }

  #[test]
  fn normalized_trims_and_drops_blank_phone() {
    let worker = NewFieldWorker {
      nama_pcl:   "  Budi ".into(),
      status_pcl: FieldWorkerStatus::Staff,
      telp_pcl:   Some("  ".into()),
    }
    .normalized();
    assert_eq!(worker.nama_pcl, "Budi");
    assert_eq!(worker.telp_pcl, None);
  }
}
