//! Survey-history reads and writes.

use ibs_core::{
  Error as CoreError,
  history::{NewSurveyHistory, NewSurveyHistoryGroup, SurveyHistory, SurveyHistoryRow},
  query::{ListQuery, Paginated},
  unique::{HISTORY_KEY, Keyed as _},
  validate::{RowError, Validate},
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Result,
  encode::RawHistory,
  integrity::{self, ensure_unique, find_conflict},
  lookup::pcl_exists,
  query::HISTORY,
};

pub fn list(conn: &Connection, query: &ListQuery) -> Result<Paginated<SurveyHistoryRow>> {
  let data = HISTORY
    .select(query, true)
    .query(conn, RawHistory::from_row)?
    .into_iter()
    .map(RawHistory::into_row)
    .collect::<Result<_>>()?;
  let total = HISTORY.count(query).count(conn)?;
  Ok(Paginated::new(data, total, query))
}

pub fn export(conn: &Connection, query: &ListQuery) -> Result<Vec<SurveyHistoryRow>> {
  HISTORY
    .select(query, false)
    .query(conn, RawHistory::from_row)?
    .into_iter()
    .map(RawHistory::into_row)
    .collect()
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<SurveyHistoryRow>> {
  conn
    .query_row(&HISTORY.by_id(id).sql, [id], RawHistory::from_row)
    .optional()?
    .map(RawHistory::into_row)
    .transpose()
}

/// Every history row of one company, newest survey first.
pub fn for_company(conn: &Connection, id_perusahaan: i64) -> Result<Vec<SurveyHistoryRow>> {
  let query = ListQuery::default().with_filter("perusahaan", id_perusahaan.to_string());
  export(conn, &query)
}

pub fn insert(conn: &Connection, record: &NewSurveyHistory) -> Result<SurveyHistory> {
  conn.execute(
    "INSERT INTO riwayat_survei (id_survei, id_perusahaan, id_pcl, selesai, ket_survei)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      record.id_survei,
      record.id_perusahaan,
      record.id_pcl,
      record.selesai.as_ref(),
      record.ket_survei,
    ],
  )?;
  Ok(with_id(conn.last_insert_rowid(), record))
}

pub fn overwrite(conn: &Connection, id: i64, record: &NewSurveyHistory) -> Result<SurveyHistory> {
  conn.execute(
    "UPDATE riwayat_survei
     SET id_survei = ?1, id_perusahaan = ?2, id_pcl = ?3, selesai = ?4, ket_survei = ?5
     WHERE id_riwayat = ?6",
    rusqlite::params![
      record.id_survei,
      record.id_perusahaan,
      record.id_pcl,
      record.selesai.as_ref(),
      record.ket_survei,
      id,
    ],
  )?;
  Ok(with_id(id, record))
}

fn with_id(id_riwayat: i64, record: &NewSurveyHistory) -> SurveyHistory {
  SurveyHistory {
    id_riwayat,
    id_survei: record.id_survei,
    id_perusahaan: record.id_perusahaan,
    id_pcl: record.id_pcl,
    selesai: record.selesai,
    ket_survei: record.ket_survei.clone(),
  }
}

fn tidy(mut record: NewSurveyHistory) -> NewSurveyHistory {
  record.ket_survei = record
    .ket_survei
    .map(|k| k.trim().to_owned())
    .filter(|k| !k.is_empty());
  record
}

/// Survey, companies and field worker must all exist.
fn check_references(
  conn: &Connection,
  id_survei: i64,
  companies: &[i64],
  id_pcl: Option<i64>,
) -> Result<()> {
  let mut errors = Vec::new();
  if integrity::SURVEYS.ensure_exists(conn, id_survei).is_err() {
    errors.push(RowError::field("id_survei", format!("unknown survey {id_survei}")));
  }
  for id in companies {
    if integrity::COMPANIES.ensure_exists(conn, *id).is_err() {
      errors.push(RowError::field("id_perusahaan", format!("unknown company {id}")));
    }
  }
  if let Some(id) = id_pcl {
    if !pcl_exists(conn, id)? {
      errors.push(RowError::field("id_pcl", format!("unknown field worker {id}")));
    }
  }
  if errors.is_empty() {
    Ok(())
  } else {
    Err(CoreError::Validation(errors).into())
  }
}

/// One row per company; a collision on any company blocks them all.
pub fn create(conn: &mut Connection, input: NewSurveyHistoryGroup) -> Result<Vec<SurveyHistory>> {
  input.validate()?;
  let records: Vec<NewSurveyHistory> = input.records().into_iter().map(tidy).collect();

  let tx = conn.transaction()?;
  check_references(&tx, input.id_survei, &input.id_perusahaan, input.id_pcl)?;

  let mut taken = Vec::new();
  for record in &records {
    if find_conflict(&tx, &HISTORY_KEY, &record.key_values(), None)?.is_some() {
      taken.push(record.id_perusahaan.to_string());
    }
  }
  if !taken.is_empty() {
    return Err(
      CoreError::Conflict {
        message: format!(
          "{} (id_perusahaan: {})",
          HISTORY_KEY.conflict_message(),
          taken.join(", ")
        ),
        fields:  HISTORY_KEY.field_names(),
      }
      .into(),
    );
  }

  let created = records
    .iter()
    .map(|r| insert(&tx, r))
    .collect::<Result<Vec<_>>>()?;
  tx.commit()?;
  Ok(created)
}

pub fn update(conn: &mut Connection, id: i64, input: NewSurveyHistory) -> Result<SurveyHistory> {
  let input = tidy(input);
  input.validate()?;

  let tx = conn.transaction()?;
  integrity::HISTORY.ensure_exists(&tx, id)?;
  check_references(&tx, input.id_survei, &[input.id_perusahaan], input.id_pcl)?;
  ensure_unique(&tx, &input, Some(id))?;
  let record = overwrite(&tx, id, &input)?;
  tx.commit()?;
  Ok(record)
}
