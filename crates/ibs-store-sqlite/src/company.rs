//! Company reads and writes.

use ibs_core::{
  Error as CoreError,
  company::{Company, CompanyDetail, CompanyRow, NewCompany},
  query::{ListQuery, Paginated},
  validate::{MAX_YEAR, MIN_YEAR, RowError, Validate},
};
use rusqlite::{Connection, OptionalExtension as _, types::Value};

use crate::{
  Result,
  encode::{COMPANY_WRITE_COLUMNS, company_row_from_row, company_values, placeholders},
  history,
  integrity::{self, ensure_unique},
  lookup::References,
  query::COMPANIES,
};

pub fn list(conn: &Connection, query: &ListQuery) -> Result<Paginated<CompanyRow>> {
  let data = COMPANIES.select(query, true).query(conn, company_row_from_row)?;
  let total = COMPANIES.count(query).count(conn)?;
  Ok(Paginated::new(data, total, query))
}

pub fn export(conn: &Connection, query: &ListQuery) -> Result<Vec<CompanyRow>> {
  COMPANIES.select(query, false).query(conn, company_row_from_row)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<CompanyDetail>> {
  let Some(company) = conn
    .query_row(&COMPANIES.by_id(id).sql, [id], company_row_from_row)
    .optional()?
  else {
    return Ok(None);
  };
  let riwayat = history::for_company(conn, id)?;
  Ok(Some(CompanyDetail { company, riwayat }))
}

pub fn insert(conn: &Connection, company: &NewCompany) -> Result<Company> {
  conn.execute(
    &format!(
      "INSERT INTO perusahaan ({}) VALUES ({})",
      COMPANY_WRITE_COLUMNS.join(", "),
      placeholders(COMPANY_WRITE_COLUMNS.len())
    ),
    rusqlite::params_from_iter(company_values(company)),
  )?;
  Ok(Company { id_perusahaan: conn.last_insert_rowid(), fields: company.clone() })
}

pub fn overwrite(conn: &Connection, id: i64, company: &NewCompany) -> Result<Company> {
  let assignments: Vec<String> = COMPANY_WRITE_COLUMNS
    .iter()
    .map(|c| format!("{c} = ?"))
    .collect();
  let mut params = company_values(company);
  params.push(Value::Integer(id));
  conn.execute(
    &format!(
      "UPDATE perusahaan SET {} WHERE id_perusahaan = ?",
      assignments.join(", ")
    ),
    rusqlite::params_from_iter(params),
  )?;
  Ok(Company { id_perusahaan: id, fields: company.clone() })
}

/// Add directory years; existing pairs are left alone. Returns how many were
/// new.
pub fn add_years(conn: &Connection, id: i64, years: &[i64]) -> Result<u64> {
  let mut stmt = conn.prepare(
    "INSERT OR IGNORE INTO direktori (id_perusahaan, thn_direktori) VALUES (?1, ?2)",
  )?;
  let mut added = 0;
  for year in years {
    added += stmt.execute([id, *year])? as u64;
  }
  Ok(added)
}

fn replace_years(conn: &Connection, id: i64, years: &[i64]) -> Result<()> {
  conn.execute("DELETE FROM direktori WHERE id_perusahaan = ?1", [id])?;
  add_years(conn, id, years)?;
  Ok(())
}

fn year_errors(years: &[i64]) -> Vec<RowError> {
  years
    .iter()
    .filter(|y| !(MIN_YEAR..=MAX_YEAR).contains(*y))
    .map(|y| {
      RowError::field(
        "tahun_direktori",
        format!("{y} is outside {MIN_YEAR}-{MAX_YEAR}"),
      )
    })
    .collect()
}

/// Field rules, reference codes and directory years, all reported together.
fn check(conn: &Connection, company: &NewCompany, years: &[i64]) -> Result<()> {
  let mut errors = company.errors();
  errors.extend(References::load(conn)?.company_errors(company));
  errors.extend(year_errors(years));
  if errors.is_empty() {
    Ok(())
  } else {
    Err(CoreError::Validation(errors).into())
  }
}

pub fn create(conn: &mut Connection, input: NewCompany, years: Vec<i64>) -> Result<Company> {
  let input = input.normalized();

  let tx = conn.transaction()?;
  check(&tx, &input, &years)?;
  ensure_unique(&tx, &input, None)?;
  let company = insert(&tx, &input)?;
  add_years(&tx, company.id_perusahaan, &years)?;
  tx.commit()?;
  Ok(company)
}

pub fn update(
  conn: &mut Connection,
  id: i64,
  input: NewCompany,
  years: Option<Vec<i64>>,
) -> Result<Company> {
  let input = input.normalized();

  let tx = conn.transaction()?;
  integrity::COMPANIES.ensure_exists(&tx, id)?;
  check(&tx, &input, years.as_deref().unwrap_or_default())?;
  ensure_unique(&tx, &input, Some(id))?;
  let company = overwrite(&tx, id, &input)?;
  if let Some(years) = years {
    replace_years(&tx, id, &years)?;
  }
  tx.commit()?;
  Ok(company)
}
