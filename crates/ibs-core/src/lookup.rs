//! Read-only reference tables: sub-districts, villages and the code → label
//! brackets used to classify companies.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// The code → label bracket tables. Path segments use the kebab-case form.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LookupTable {
  BadanUsaha,
  Lokasi,
  TenagaKerja,
  Investasi,
  Omset,
}

impl LookupTable {
  pub fn table(self) -> &'static str {
    match self {
      Self::BadanUsaha => "badan_usaha",
      Self::Lokasi => "lokasi",
      Self::TenagaKerja => "tenaga_kerja",
      Self::Investasi => "investasi",
      Self::Omset => "omset",
    }
  }

  pub fn code_column(self) -> &'static str {
    match self {
      Self::BadanUsaha => "kd_badan_usaha",
      Self::Lokasi => "kd_lok",
      Self::TenagaKerja => "kd_tkerja",
      Self::Investasi => "kd_investasi",
      Self::Omset => "kd_omset",
    }
  }

  pub fn label_column(self) -> &'static str {
    match self {
      Self::BadanUsaha => "ket_badan_usaha",
      Self::Lokasi => "ket_lok",
      Self::TenagaKerja => "ket_tkerja",
      Self::Investasi => "ket_investasi",
      Self::Omset => "ket_omset",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
  pub kode:       String,
  pub keterangan: String,
}

/// Sub-district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kecamatan {
  pub kd_kec: String,
  pub nm_kec: String,
}

/// Village, keyed by (sub-district, village) code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desa {
  pub kd_kec:  String,
  pub kd_desa: String,
  pub nm_desa: String,
}

/// One line of the region seed file (`kd_kec,nm_kec,kd_desa,nm_desa`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRow {
  pub kd_kec:  String,
  pub nm_kec:  String,
  pub kd_desa: String,
  pub nm_desa: String,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn path_names_are_kebab_case() {
    assert_eq!(LookupTable::from_str("tenaga-kerja").unwrap(), LookupTable::TenagaKerja);
    assert_eq!(LookupTable::BadanUsaha.as_ref(), "badan-usaha");
    assert!(LookupTable::from_str("kecamatan").is_err());
  }
}
