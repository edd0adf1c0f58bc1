//! Directory-year membership.

use ibs_core::{
  Error as CoreError,
  directory::{CopyYear, DirectoryChange, DirectoryMembership, DirectoryYear},
  validate::{RowError, Validate},
};
use rusqlite::Connection;

use crate::{Result, company::add_years, integrity};

pub fn years(conn: &Connection) -> Result<Vec<DirectoryYear>> {
  let mut stmt = conn.prepare(
    "SELECT thn_direktori, COUNT(*) FROM direktori
     GROUP BY thn_direktori ORDER BY thn_direktori DESC",
  )?;
  let rows = stmt
    .query_map([], |row| {
      Ok(DirectoryYear { tahun: row.get(0)?, jumlah_perusahaan: row.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn distinct(ids: &[i64]) -> Vec<i64> {
  let mut ids = ids.to_vec();
  ids.sort_unstable();
  ids.dedup();
  ids
}

pub fn add(conn: &mut Connection, input: DirectoryMembership) -> Result<DirectoryChange> {
  input.validate()?;
  let ids = distinct(&input.id_perusahaan);

  let tx = conn.transaction()?;
  let unknown: Vec<RowError> = ids
    .iter()
    .filter(|id| integrity::COMPANIES.ensure_exists(&tx, **id).is_err())
    .map(|id| RowError::field("id_perusahaan", format!("unknown company {id}")))
    .collect();
  if !unknown.is_empty() {
    return Err(CoreError::Validation(unknown).into());
  }

  let mut changed = 0;
  for id in &ids {
    changed += add_years(&tx, *id, &[input.tahun])?;
  }
  tx.commit()?;
  Ok(DirectoryChange { changed, skipped: ids.len() as u64 - changed })
}

pub fn remove(conn: &mut Connection, input: DirectoryMembership) -> Result<DirectoryChange> {
  input.validate()?;
  let ids = distinct(&input.id_perusahaan);

  let tx = conn.transaction()?;
  let mut changed = 0;
  {
    let mut stmt = tx.prepare(
      "DELETE FROM direktori WHERE id_perusahaan = ?1 AND thn_direktori = ?2",
    )?;
    for id in &ids {
      changed += stmt.execute([*id, input.tahun])? as u64;
    }
  }
  tx.commit()?;
  Ok(DirectoryChange { changed, skipped: ids.len() as u64 - changed })
}

/// Copy every membership of one year into another, skipping pairs that are
/// already there.
pub fn copy(conn: &mut Connection, input: CopyYear) -> Result<DirectoryChange> {
  input.validate()?;

  let tx = conn.transaction()?;
  let source: i64 = tx.query_row(
    "SELECT COUNT(*) FROM direktori WHERE thn_direktori = ?1",
    [input.dari],
    |row| row.get(0),
  )?;
  let changed = tx.execute(
    "INSERT OR IGNORE INTO direktori (id_perusahaan, thn_direktori)
     SELECT id_perusahaan, ?2 FROM direktori WHERE thn_direktori = ?1",
    [input.dari, input.ke],
  )? as u64;
  tx.commit()?;
  Ok(DirectoryChange {
    changed,
    skipped: u64::try_from(source).unwrap_or(0).saturating_sub(changed),
  })
}
