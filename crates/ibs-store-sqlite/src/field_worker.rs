//! Field-worker reads and writes.

use ibs_core::{
  field_worker::{FieldWorker, FieldWorkerRow, NewFieldWorker},
  query::{ListQuery, Paginated},
  validate::Validate,
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Result,
  encode::RawFieldWorker,
  integrity::{self, ensure_unique},
  query::FIELD_WORKERS,
};

pub fn list(conn: &Connection, query: &ListQuery) -> Result<Paginated<FieldWorkerRow>> {
  let raws = FIELD_WORKERS.select(query, true).query(conn, RawFieldWorker::from_row)?;
  let total = FIELD_WORKERS.count(query).count(conn)?;
  let data = raws
    .into_iter()
    .map(RawFieldWorker::into_row)
    .collect::<Result<_>>()?;
  Ok(Paginated::new(data, total, query))
}

pub fn export(conn: &Connection, query: &ListQuery) -> Result<Vec<FieldWorkerRow>> {
  FIELD_WORKERS
    .select(query, false)
    .query(conn, RawFieldWorker::from_row)?
    .into_iter()
    .map(RawFieldWorker::into_row)
    .collect()
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<FieldWorkerRow>> {
  conn
    .query_row(
      &FIELD_WORKERS.by_id(id).sql,
      [id],
      RawFieldWorker::from_row,
    )
    .optional()?
    .map(RawFieldWorker::into_row)
    .transpose()
}

/// Insert without checks; callers validate and check keys first.
pub fn insert(conn: &Connection, worker: &NewFieldWorker) -> Result<FieldWorker> {
  conn.execute(
    "INSERT INTO pcl (nama_pcl, status_pcl, telp_pcl) VALUES (?1, ?2, ?3)",
    rusqlite::params![worker.nama_pcl, worker.status_pcl.as_ref(), worker.telp_pcl],
  )?;
  Ok(FieldWorker {
    id_pcl:     conn.last_insert_rowid(),
    nama_pcl:   worker.nama_pcl.clone(),
    status_pcl: worker.status_pcl,
    telp_pcl:   worker.telp_pcl.clone(),
  })
}

/// Overwrite without checks.
pub fn overwrite(conn: &Connection, id: i64, worker: &NewFieldWorker) -> Result<FieldWorker> {
  conn.execute(
    "UPDATE pcl SET nama_pcl = ?1, status_pcl = ?2, telp_pcl = ?3 WHERE id_pcl = ?4",
    rusqlite::params![worker.nama_pcl, worker.status_pcl.as_ref(), worker.telp_pcl, id],
  )?;
  Ok(FieldWorker {
    id_pcl:     id,
    nama_pcl:   worker.nama_pcl.clone(),
    status_pcl: worker.status_pcl,
    telp_pcl:   worker.telp_pcl.clone(),
  })
}

pub fn create(conn: &mut Connection, input: NewFieldWorker) -> Result<FieldWorker> {
  let input = input.normalized();
  input.validate()?;

  let tx = conn.transaction()?;
  ensure_unique(&tx, &input, None)?;
  let worker = insert(&tx, &input)?;
  tx.commit()?;
  Ok(worker)
}

pub fn update(conn: &mut Connection, id: i64, input: NewFieldWorker) -> Result<FieldWorker> {
  let input = input.normalized();
  input.validate()?;

  let tx = conn.transaction()?;
  integrity::FIELD_WORKERS.ensure_exists(&tx, id)?;
  ensure_unique(&tx, &input, Some(id))?;
  let worker = overwrite(&tx, id, &input)?;
  tx.commit()?;
  Ok(worker)
}
