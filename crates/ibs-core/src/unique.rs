//! Declarative uniqueness keys.
//!
//! Each entity with a natural key declares one [`UniqueKey`]: the table, its
//! id column and the ordered key fields with their normalisation. A single
//! duplicate checker in the storage backend consumes these descriptors.

use std::fmt;

use crate::validate::normalize_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
  /// Trim + case-fold before comparing.
  Text,
  /// Compare as stored.
  Exact,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyField {
  pub column:    &'static str,
  pub normalize: Normalize,
}

#[derive(Debug)]
pub struct UniqueKey {
  pub entity:    &'static str,
  pub table:     &'static str,
  pub id_column: &'static str,
  pub fields:    &'static [KeyField],
}

impl UniqueKey {
  pub fn field_names(&self) -> Vec<String> {
    self.fields.iter().map(|f| f.column.to_owned()).collect()
  }

  /// Conflict message naming the key combination.
  pub fn conflict_message(&self) -> String {
    format!(
      "{} with the same {} already exists",
      self.entity,
      self.field_names().join(" + ")
    )
  }
}

/// A key component value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
  Text(String),
  Integer(i64),
}

impl KeyValue {
  pub fn normalized(&self, normalize: Normalize) -> Self {
    match (self, normalize) {
      (Self::Text(s), Normalize::Text) => Self::Text(normalize_key(s)),
      (other, _) => other.clone(),
    }
  }
}

impl fmt::Display for KeyValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text(s) => f.write_str(s),
      Self::Integer(n) => write!(f, "{n}"),
    }
  }
}

impl From<&str> for KeyValue {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<i64> for KeyValue {
  fn from(n: i64) -> Self { Self::Integer(n) }
}

/// Records carrying a natural key.
pub trait Keyed {
  const KEY: &'static UniqueKey;

  /// Key values in [`UniqueKey::fields`] order, not yet normalised.
  fn key_values(&self) -> Vec<KeyValue>;

  /// Normalised key, suitable for in-memory comparison.
  fn normalized_key(&self) -> Vec<KeyValue> {
    self
      .key_values()
      .iter()
      .zip(Self::KEY.fields)
      .map(|(v, f)| v.normalized(f.normalize))
      .collect()
  }

  /// `"Budi / Mitra"`, for duplicate reports.
  fn key_label(&self) -> String {
    self
      .key_values()
      .iter()
      .map(|v| v.to_string().trim().to_owned())
      .collect::<Vec<_>>()
      .join(" / ")
  }
}

// ─── Descriptors ─────────────────────────────────────────────────────────────

pub const FIELD_WORKER_KEY: UniqueKey = UniqueKey {
  entity:    "field worker",
  table:     "pcl",
  id_column: "id_pcl",
  fields:    &[
    KeyField { column: "nama_pcl", normalize: Normalize::Text },
    KeyField { column: "status_pcl", normalize: Normalize::Text },
  ],
};

pub const SURVEY_KEY: UniqueKey = UniqueKey {
  entity:    "survey",
  table:     "survei",
  id_column: "id_survei",
  fields:    &[
    KeyField { column: "nama_survei", normalize: Normalize::Text },
    KeyField { column: "fungsi", normalize: Normalize::Text },
    KeyField { column: "periode", normalize: Normalize::Text },
    KeyField { column: "tahun", normalize: Normalize::Exact },
  ],
};

pub const HISTORY_KEY: UniqueKey = UniqueKey {
  entity:    "survey history",
  table:     "riwayat_survei",
  id_column: "id_riwayat",
  fields:    &[
    KeyField { column: "id_survei", normalize: Normalize::Exact },
    KeyField { column: "id_perusahaan", normalize: Normalize::Exact },
  ],
};

pub const COMPANY_KEY: UniqueKey = UniqueKey {
  entity:    "company",
  table:     "perusahaan",
  id_column: "id_perusahaan",
  fields:    &[KeyField { column: "kip", normalize: Normalize::Text }],
};

pub const DIRECTORY_KEY: UniqueKey = UniqueKey {
  entity:    "directory entry",
  table:     "direktori",
  id_column: "id_direktori",
  fields:    &[
    KeyField { column: "id_perusahaan", normalize: Normalize::Exact },
    KeyField { column: "thn_direktori", normalize: Normalize::Exact },
  ],
};

#[cfg(test)]
mod tests {
  use super::*;

  struct Worker(&'static str, &'static str);

  impl Keyed for Worker {
    const KEY: &'static UniqueKey = &FIELD_WORKER_KEY;

    fn key_values(&self) -> Vec<KeyValue> {
      vec![self.0.into(), self.1.into()]
    }
  }

  #[test]
  fn normalized_keys_ignore_case_and_padding() {
    assert_eq!(
      Worker("Budi", "Mitra").normalized_key(),
      Worker(" budi ", "mitra").normalized_key()
    );
    assert_ne!(
      Worker("Budi", "Mitra").normalized_key(),
      Worker("Budi", "Staff").normalized_key()
    );
  }

  #[test]
  fn exact_fields_are_not_folded() {
    let v = KeyValue::Integer(2024).normalized(Normalize::Text);
    assert_eq!(v, KeyValue::Integer(2024));
  }

  #[test]
  fn conflict_message_names_fields() {
    assert_eq!(
      FIELD_WORKER_KEY.conflict_message(),
      "field worker with the same nama_pcl + status_pcl already exists"
    );
  }
}
