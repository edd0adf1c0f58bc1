//! Reference tables: reads, region loading, and code/label resolution for
//! company writes and imports.

use ibs_core::{
  company::NewCompany,
  import::{not_found_message, suggestions},
  lookup::{Desa, Kecamatan, LookupEntry, LookupTable, RegionRow},
  validate::{RowError, normalize_key},
};
use rusqlite::{Connection, OptionalExtension as _};
use strum::IntoEnumIterator as _;

use crate::Result;

pub fn entries(conn: &Connection, table: LookupTable) -> Result<Vec<LookupEntry>> {
  let sql = format!(
    "SELECT {code}, {label} FROM {table} ORDER BY {code}",
    code = table.code_column(),
    label = table.label_column(),
    table = table.table(),
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map([], |row| {
      Ok(LookupEntry { kode: row.get(0)?, keterangan: row.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn kecamatan(conn: &Connection) -> Result<Vec<Kecamatan>> {
  let mut stmt = conn.prepare("SELECT kd_kec, nm_kec FROM kecamatan ORDER BY kd_kec")?;
  let rows = stmt
    .query_map([], |row| Ok(Kecamatan { kd_kec: row.get(0)?, nm_kec: row.get(1)? }))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn desa(conn: &Connection, kd_kec: Option<&str>) -> Result<Vec<Desa>> {
  let mut stmt = conn.prepare(
    "SELECT kd_kec, kd_desa, nm_desa FROM desa
     WHERE ?1 IS NULL OR kd_kec = ?1
     ORDER BY kd_kec, kd_desa",
  )?;
  let rows = stmt
    .query_map([kd_kec], |row| {
      Ok(Desa { kd_kec: row.get(0)?, kd_desa: row.get(1)?, nm_desa: row.get(2)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Upsert sub-districts and villages in one transaction.
pub fn load_regions(conn: &mut Connection, rows: &[RegionRow]) -> Result<u64> {
  let tx = conn.transaction()?;
  {
    let mut kec = tx.prepare(
      "INSERT INTO kecamatan (kd_kec, nm_kec) VALUES (?1, ?2)
       ON CONFLICT (kd_kec) DO UPDATE SET nm_kec = excluded.nm_kec",
    )?;
    let mut desa = tx.prepare(
      "INSERT INTO desa (kd_kec, kd_desa, nm_desa) VALUES (?1, ?2, ?3)
       ON CONFLICT (kd_kec, kd_desa) DO UPDATE SET nm_desa = excluded.nm_desa",
    )?;
    for row in rows {
      kec.execute(rusqlite::params![row.kd_kec.trim(), row.nm_kec.trim()])?;
      desa.execute(rusqlite::params![
        row.kd_kec.trim(),
        row.kd_desa.trim(),
        row.nm_desa.trim()
      ])?;
    }
  }
  tx.commit()?;
  Ok(rows.len() as u64)
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Outcome of matching a code-or-label against a reference table.
pub enum Match {
  Found(String),
  /// Nothing matched; up to three near candidates.
  Missing(Vec<String>),
}

/// Match `value` against `(code, label)` pairs: exact code first, then the
/// label, case-insensitively.
fn match_pairs(pairs: &[(String, String)], value: &str) -> Match {
  let value = value.trim();
  if let Some((code, _)) = pairs.iter().find(|(code, _)| code == value) {
    return Match::Found(code.clone());
  }
  let folded = normalize_key(value);
  if let Some((code, _)) = pairs
    .iter()
    .find(|(_, label)| normalize_key(label) == folded)
  {
    return Match::Found(code.clone());
  }
  Match::Missing(suggestions(value, pairs.iter().map(|(_, label)| label.as_str())))
}

/// In-memory copy of every reference table, taken once per import or write.
pub struct References {
  brackets:  Vec<(LookupTable, Vec<(String, String)>)>,
  kecamatan: Vec<(String, String)>,
  desa:      Vec<Desa>,
  pcl:       Vec<PclRef>,
}

struct PclRef {
  id:     i64,
  name:   String,
  status: String,
}

impl References {
  pub fn load(conn: &Connection) -> Result<Self> {
    let mut brackets = Vec::new();
    for table in LookupTable::iter() {
      let pairs = entries(conn, table)?
        .into_iter()
        .map(|e| (e.kode, e.keterangan))
        .collect();
      brackets.push((table, pairs));
    }
    let kecamatan = kecamatan(conn)?
      .into_iter()
      .map(|k| (k.kd_kec, k.nm_kec))
      .collect();
    let desa = desa(conn, None)?;

    let mut stmt =
      conn.prepare("SELECT id_pcl, nama_pcl, status_pcl FROM pcl ORDER BY id_pcl")?;
    let pcl = stmt
      .query_map([], |row| {
        Ok(PclRef { id: row.get(0)?, name: row.get(1)?, status: row.get(2)? })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Self { brackets, kecamatan, desa, pcl })
  }

  fn bracket(&self, table: LookupTable) -> &[(String, String)] {
    self
      .brackets
      .iter()
      .find(|(t, _)| *t == table)
      .map(|(_, pairs)| pairs.as_slice())
      .unwrap_or_default()
  }

  pub fn resolve_bracket(&self, table: LookupTable, value: &str) -> Match {
    match_pairs(self.bracket(table), value)
  }

  pub fn resolve_kecamatan(&self, value: &str) -> Match { match_pairs(&self.kecamatan, value) }

  pub fn resolve_desa(&self, kd_kec: &str, value: &str) -> Match {
    let pairs: Vec<(String, String)> = self
      .desa
      .iter()
      .filter(|d| d.kd_kec == kd_kec)
      .map(|d| (d.kd_desa.clone(), d.nm_desa.clone()))
      .collect();
    match_pairs(&pairs, value)
  }

  /// A field worker by name, trim + case-insensitive. A name shared by
  /// several workers is reported against `field` instead of guessed.
  pub fn resolve_pcl(&self, field: &str, name: &str) -> Result<i64, RowError> {
    let wanted = normalize_key(name);
    let found: Vec<&PclRef> = self
      .pcl
      .iter()
      .filter(|p| normalize_key(&p.name) == wanted)
      .collect();
    match found.as_slice() {
      [one] => Ok(one.id),
      [] => {
        let hints = suggestions(name, self.pcl.iter().map(|p| p.name.as_str()));
        Err(RowError::field(field, not_found_message("field worker", name, &hints)))
      }
      many => {
        let statuses: Vec<&str> = many.iter().map(|p| p.status.as_str()).collect();
        Err(RowError::field(
          field,
          format!(
            "\"{}\" matches {} field workers ({}); rename one so the name is unique",
            name.trim(),
            many.len(),
            statuses.join(", ")
          ),
        ))
      }
    }
  }

  /// Codes on a company form that point nowhere.
  pub fn company_errors(&self, company: &NewCompany) -> Vec<RowError> {
    let mut errors = Vec::new();
    let known = |pairs: &[(String, String)], code: &str| pairs.iter().any(|(c, _)| c == code);

    let brackets = [
      ("kd_badan_usaha", LookupTable::BadanUsaha, &company.kd_badan_usaha),
      ("kd_lok", LookupTable::Lokasi, &company.kd_lok),
      ("kd_tkerja", LookupTable::TenagaKerja, &company.kd_tkerja),
      ("kd_investasi", LookupTable::Investasi, &company.kd_investasi),
      ("kd_omset", LookupTable::Omset, &company.kd_omset),
    ];
    for (field, table, code) in brackets {
      if let Some(code) = code {
        if !known(self.bracket(table), code) {
          errors.push(RowError::field(field, format!("unknown code \"{code}\"")));
        }
      }
    }

    match (&company.kd_kec, &company.kd_desa) {
      (Some(kec), desa) => {
        if !known(&self.kecamatan, kec) {
          errors.push(RowError::field("kd_kec", format!("unknown sub-district \"{kec}\"")));
        } else if let Some(desa) = desa {
          if !self.desa.iter().any(|d| &d.kd_kec == kec && &d.kd_desa == desa) {
            errors.push(RowError::field("kd_desa", format!("unknown village \"{desa}\"")));
          }
        }
      }
      (None, Some(_)) => {
        errors.push(RowError::field("kd_desa", "a village needs a sub-district"));
      }
      (None, None) => {}
    }

    if let Some(id) = company.pcl_utama {
      if !self.pcl.iter().any(|p| p.id == id) {
        errors.push(RowError::field("pcl_utama", format!("unknown field worker {id}")));
      }
    }
    errors
  }
}

/// A single field worker id exists.
pub fn pcl_exists(conn: &Connection, id: i64) -> Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM pcl WHERE id_pcl = ?1", [id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}
