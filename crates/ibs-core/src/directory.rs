//! Yearly directory membership.

use serde::{Deserialize, Serialize};

use crate::validate::{MAX_YEAR, MIN_YEAR, RowError, Validate};

/// A directory year and how many companies it lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryYear {
  pub tahun:             i64,
  pub jumlah_perusahaan: i64,
}

/// Add or remove a set of companies for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMembership {
  pub tahun:         i64,
  pub id_perusahaan: Vec<i64>,
}

/// Copy every membership of `dari` into `ke`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyYear {
  pub dari: i64,
  pub ke:   i64,
}

/// Outcome of a membership change. Pairs that were already in the requested
/// state count as skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryChange {
  pub changed: u64,
  pub skipped: u64,
}

fn check_year(field: &str, year: i64, errors: &mut Vec<RowError>) {
  if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
    errors.push(RowError::field(
      field,
      format!("year must be between {MIN_YEAR} and {MAX_YEAR}"),
    ));
  }
}

impl Validate for DirectoryMembership {
  fn errors(&self) -> Vec<RowError> {
    let mut errors = Vec::new();
    check_year("tahun", self.tahun, &mut errors);
    if self.id_perusahaan.is_empty() {
      errors.push(RowError::field("id_perusahaan", "select at least one company"));
    }
    errors
  }
}

impl Validate for CopyYear {
  fn errors(&self) -> Vec<RowError> {
    let mut errors = Vec::new();
    check_year("dari", self.dari, &mut errors);
    check_year("ke", self.ke, &mut errors);
    if self.dari == self.ke {
      errors.push(RowError::field("ke", "target year must differ from source year"));
    }
    errors
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn copy_to_same_year_is_rejected() {
    assert!(CopyYear { dari: 2024, ke: 2024 }.validate().is_err());
    assert!(CopyYear { dari: 2023, ke: 2024 }.validate().is_ok());
  }

  #[test]
  fn membership_needs_companies_and_a_sane_year() {
    let m = DirectoryMembership { tahun: 1999, id_perusahaan: vec![] };
    assert_eq!(m.errors().len(), 2);
  }
}
