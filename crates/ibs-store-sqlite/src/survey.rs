//! Survey reads and writes.

use ibs_core::{
  query::{ListQuery, Paginated},
  survey::{NewSurvey, Survey, SurveyRow},
  validate::Validate,
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Result,
  encode::RawSurvey,
  integrity::{self, ensure_unique},
  query::SURVEYS,
};

pub fn list(conn: &Connection, query: &ListQuery) -> Result<Paginated<SurveyRow>> {
  let data = SURVEYS
    .select(query, true)
    .query(conn, RawSurvey::from_row)?
    .into_iter()
    .map(RawSurvey::into_row)
    .collect();
  let total = SURVEYS.count(query).count(conn)?;
  Ok(Paginated::new(data, total, query))
}

pub fn export(conn: &Connection, query: &ListQuery) -> Result<Vec<SurveyRow>> {
  Ok(
    SURVEYS
      .select(query, false)
      .query(conn, RawSurvey::from_row)?
      .into_iter()
      .map(RawSurvey::into_row)
      .collect(),
  )
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<SurveyRow>> {
  Ok(
    conn
      .query_row(&SURVEYS.by_id(id).sql, [id], RawSurvey::from_row)
      .optional()?
      .map(RawSurvey::into_row),
  )
}

pub fn insert(conn: &Connection, survey: &NewSurvey) -> Result<Survey> {
  conn.execute(
    "INSERT INTO survei (nama_survei, fungsi, periode, tahun) VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![survey.nama_survei, survey.fungsi, survey.periode, survey.tahun],
  )?;
  Ok(with_id(conn.last_insert_rowid(), survey))
}

pub fn overwrite(conn: &Connection, id: i64, survey: &NewSurvey) -> Result<Survey> {
  conn.execute(
    "UPDATE survei SET nama_survei = ?1, fungsi = ?2, periode = ?3, tahun = ?4
     WHERE id_survei = ?5",
    rusqlite::params![survey.nama_survei, survey.fungsi, survey.periode, survey.tahun, id],
  )?;
  Ok(with_id(id, survey))
}

fn with_id(id_survei: i64, survey: &NewSurvey) -> Survey {
  Survey {
    id_survei,
    nama_survei: survey.nama_survei.clone(),
    fungsi: survey.fungsi.clone(),
    periode: survey.periode.clone(),
    tahun: survey.tahun,
  }
}

pub fn create(conn: &mut Connection, input: NewSurvey) -> Result<Survey> {
  let input = input.normalized();
  input.validate()?;

  let tx = conn.transaction()?;
  ensure_unique(&tx, &input, None)?;
  let survey = insert(&tx, &input)?;
  tx.commit()?;
  Ok(survey)
}

pub fn update(conn: &mut Connection, id: i64, input: NewSurvey) -> Result<Survey> {
  let input = input.normalized();
  input.validate()?;

  let tx = conn.transaction()?;
  integrity::SURVEYS.ensure_exists(&tx, id)?;
  ensure_unique(&tx, &input, Some(id))?;
  let survey = overwrite(&tx, id, &input)?;
  tx.commit()?;
  Ok(survey)
}
