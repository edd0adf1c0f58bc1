//! Duplicate and referential checks run before every write.
//!
//! Uniqueness is driven by the [`UniqueKey`] descriptors declared in
//! `ibs-core`; dependents by the [`Table`] descriptors below.

use ibs_core::{
  Error as CoreError,
  error::Dependent,
  unique::{KeyValue, Keyed, Normalize, UniqueKey},
  validate::normalize_key,
};
use rusqlite::{Connection, OptionalExtension as _, types::Value};

use crate::{
  Result,
  encode::{id_values, placeholders},
};

// ─── Uniqueness ──────────────────────────────────────────────────────────────

/// Id of a row whose key equals `values`, ignoring `exclude`.
pub fn find_conflict(
  conn: &Connection,
  key: &UniqueKey,
  values: &[KeyValue],
  exclude: Option<i64>,
) -> Result<Option<i64>> {
  let mut conds = Vec::with_capacity(key.fields.len() + 1);
  let mut params: Vec<Value> = Vec::with_capacity(key.fields.len() + 1);

  for (field, value) in key.fields.iter().zip(values) {
    match (field.normalize, value) {
      (Normalize::Text, KeyValue::Text(s)) => {
        conds.push(format!("fold({}) = ?", field.column));
        params.push(Value::Text(normalize_key(s)));
      }
      (_, KeyValue::Text(s)) => {
        conds.push(format!("{} = ?", field.column));
        params.push(Value::Text(s.clone()));
      }
      (_, KeyValue::Integer(n)) => {
        conds.push(format!("{} = ?", field.column));
        params.push(Value::Integer(*n));
      }
    }
  }
  if let Some(id) = exclude {
    conds.push(format!("{} <> ?", key.id_column));
    params.push(Value::Integer(id));
  }

  let sql = format!(
    "SELECT {} FROM {} WHERE {} LIMIT 1",
    key.id_column,
    key.table,
    conds.join(" AND ")
  );
  Ok(
    conn
      .query_row(&sql, rusqlite::params_from_iter(params.iter()), |row| row.get(0))
      .optional()?,
  )
}

/// Reject `record` with a conflict naming its key fields if its key is taken.
pub fn ensure_unique<T: Keyed>(conn: &Connection, record: &T, exclude: Option<i64>) -> Result<()> {
  match find_conflict(conn, T::KEY, &record.key_values(), exclude)? {
    Some(_) => Err(
      CoreError::Conflict {
        message: T::KEY.conflict_message(),
        fields:  T::KEY.field_names(),
      }
      .into(),
    ),
    None => Ok(()),
  }
}

// ─── References ──────────────────────────────────────────────────────────────

/// A column in another table pointing at an entity's id.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
  pub table:  &'static str,
  pub column: &'static str,
}

/// Delete rules for one entity table.
#[derive(Debug)]
pub struct Table {
  pub entity:     &'static str,
  pub name:       &'static str,
  pub id_column:  &'static str,
  /// Rows that block a delete.
  pub references: &'static [Reference],
  /// Rows removed together with the entity.
  pub owned:      &'static [Reference],
}

pub const FIELD_WORKERS: Table = Table {
  entity:     "field worker",
  name:       "pcl",
  id_column:  "id_pcl",
  references: &[
    Reference { table: "riwayat_survei", column: "id_pcl" },
    Reference { table: "perusahaan", column: "pcl_utama" },
  ],
  owned:      &[],
};

pub const SURVEYS: Table = Table {
  entity:     "survey",
  name:       "survei",
  id_column:  "id_survei",
  references: &[Reference { table: "riwayat_survei", column: "id_survei" }],
  owned:      &[],
};

pub const HISTORY: Table = Table {
  entity:     "survey history",
  name:       "riwayat_survei",
  id_column:  "id_riwayat",
  references: &[],
  owned:      &[],
};

pub const COMPANIES: Table = Table {
  entity:     "company",
  name:       "perusahaan",
  id_column:  "id_perusahaan",
  references: &[Reference { table: "riwayat_survei", column: "id_perusahaan" }],
  owned:      &[Reference { table: "direktori", column: "id_perusahaan" }],
};

impl Table {
  /// Rows elsewhere that reference `ids`, or any row of this table when
  /// `ids` is `None`. Tables with no such rows are left out.
  pub fn dependents(&self, conn: &Connection, ids: Option<&[i64]>) -> Result<Vec<Dependent>> {
    let mut found = Vec::new();
    for reference in self.references {
      let (predicate, params) = match ids {
        Some(ids) => (
          format!("{} IN ({})", reference.column, placeholders(ids.len())),
          id_values(ids),
        ),
        None => (format!("{} IS NOT NULL", reference.column), Vec::new()),
      };
      let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE {predicate}", reference.table),
        rusqlite::params_from_iter(params.iter()),
        |row| row.get(0),
      )?;
      if count > 0 {
        found.push(Dependent { table: reference.table, count });
      }
    }
    Ok(found)
  }

  /// Fail with not-found unless the row exists.
  pub fn ensure_exists(&self, conn: &Connection, id: i64) -> Result<()> {
    let exists = conn
      .query_row(
        &format!("SELECT 1 FROM {} WHERE {} = ?1", self.name, self.id_column),
        [id],
        |_| Ok(()),
      )
      .optional()?
      .is_some();
    if exists {
      Ok(())
    } else {
      Err(CoreError::NotFound { entity: self.entity, id }.into())
    }
  }

  /// Delete every id or none: a missing id is not-found, any dependent row
  /// blocks the whole batch. Owned rows go first.
  pub fn delete_all(&self, conn: &mut Connection, ids: &[i64]) -> Result<u64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
      return Ok(0);
    }

    let tx = conn.transaction()?;
    for id in &ids {
      self.ensure_exists(&tx, *id)?;
    }

    let dependents = self.dependents(&tx, Some(&ids))?;
    if !dependents.is_empty() {
      return Err(
        CoreError::InUse { entity: self.entity, ids, dependents }.into(),
      );
    }

    let params = id_values(&ids);
    for owned in self.owned {
      tx.execute(
        &format!(
          "DELETE FROM {} WHERE {} IN ({})",
          owned.table,
          owned.column,
          placeholders(ids.len())
        ),
        rusqlite::params_from_iter(params.iter()),
      )?;
    }
    let deleted = tx.execute(
      &format!(
        "DELETE FROM {} WHERE {} IN ({})",
        self.name,
        self.id_column,
        placeholders(ids.len())
      ),
      rusqlite::params_from_iter(params.iter()),
    )?;
    tx.commit()?;
    Ok(deleted as u64)
  }

  /// Empty the table for a replace-mode import. Refused while other tables
  /// still reference any of its rows.
  pub fn clear(&self, conn: &Connection) -> Result<u64> {
    let dependents = self.dependents(conn, None)?;
    if !dependents.is_empty() {
      return Err(
        CoreError::InUse { entity: self.entity, ids: Vec::new(), dependents }.into(),
      );
    }
    for owned in self.owned {
      conn.execute(&format!("DELETE FROM {}", owned.table), [])?;
    }
    Ok(conn.execute(&format!("DELETE FROM {}", self.name), [])? as u64)
  }
}
