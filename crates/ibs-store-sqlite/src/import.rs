//! Import reconciliation: resolve names to ids, find existing keys, commit.

use ibs_core::{
  Error as CoreError,
  company::{CompanyImport, CompanyImportRow},
  history::{HistoryImportRow, NewSurveyHistory},
  import::{
    CommitMode, DuplicateAction, DuplicateRow, ImportRecords, ImportSummary, Numbered,
    ParsedImport, Resolution, not_found_message, suggestions,
  },
  lookup::LookupTable,
  unique::Keyed,
  validate::{RowError, normalize_key},
};
use rusqlite::Connection;

use crate::{
  Result, company, field_worker, history,
  integrity::{self, Table, find_conflict},
  lookup::{Match, References},
  survey,
};

// ─── Resolve ─────────────────────────────────────────────────────────────────

pub fn resolve(conn: &Connection, parsed: ParsedImport) -> Result<Resolution> {
  let resolution = match parsed {
    ParsedImport::FieldWorkers(rows) => Resolution {
      records: ImportRecords::FieldWorkers(
        rows
          .into_iter()
          .map(|n| Numbered { row: n.row, record: n.record.normalized() })
          .collect(),
      ),
      errors:  Vec::new(),
    },
    ParsedImport::Surveys(rows) => Resolution {
      records: ImportRecords::Surveys(
        rows
          .into_iter()
          .map(|n| Numbered { row: n.row, record: n.record.normalized() })
          .collect(),
      ),
      errors:  Vec::new(),
    },
    ParsedImport::SurveyHistory(rows) => resolve_history(conn, rows)?,
    ParsedImport::Companies(rows) => resolve_companies(conn, rows)?,
  };
  Ok(resolution)
}

struct SurveyRef {
  id:      i64,
  nama:    String,
  fungsi:  String,
  periode: String,
  tahun:   i64,
}

fn resolve_history(conn: &Connection, rows: Vec<Numbered<HistoryImportRow>>) -> Result<Resolution> {
  let refs = References::load(conn)?;

  let mut stmt = conn.prepare("SELECT id_perusahaan, kip FROM perusahaan ORDER BY id_perusahaan")?;
  let companies: Vec<(i64, String)> = stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<_>>()?;

  let mut stmt =
    conn.prepare("SELECT id_survei, nama_survei, fungsi, periode, tahun FROM survei ORDER BY id_survei")?;
  let surveys: Vec<SurveyRef> = stmt
    .query_map([], |row| {
      Ok(SurveyRef {
        id:      row.get(0)?,
        nama:    row.get(1)?,
        fungsi:  row.get(2)?,
        periode: row.get(3)?,
        tahun:   row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<_>>()?;

  let mut records = Vec::new();
  let mut errors = Vec::new();

  for Numbered { row, record } in rows {
    let mut row_errors = Vec::new();

    let kip = normalize_key(&record.kip);
    let id_perusahaan = companies
      .iter()
      .find(|(_, k)| normalize_key(k) == kip)
      .map(|(id, _)| *id);
    if id_perusahaan.is_none() {
      let hints = suggestions(&record.kip, companies.iter().map(|(_, k)| k.as_str()));
      row_errors.push(RowError::field("kip", not_found_message("KIP", &record.kip, &hints)));
    }

    let nama = normalize_key(&record.nama_survei);
    let fungsi = record.fungsi.as_deref().map(normalize_key);
    let periode = record.periode.as_deref().map(normalize_key);
    let matches: Vec<&SurveyRef> = surveys
      .iter()
      .filter(|s| {
        normalize_key(&s.nama) == nama
          && s.tahun == record.tahun
          && fungsi.as_ref().is_none_or(|f| normalize_key(&s.fungsi) == *f)
          && periode.as_ref().is_none_or(|p| normalize_key(&s.periode) == *p)
      })
      .collect();
    let id_survei = match matches.as_slice() {
      [one] => Some(one.id),
      [] => {
        let hints = suggestions(&record.nama_survei, surveys.iter().map(|s| s.nama.as_str()));
        let what = format!("{} {}", record.nama_survei, record.tahun);
        row_errors.push(RowError::field(
          "nama_survei",
          not_found_message("survey", &what, &hints),
        ));
        None
      }
      many => {
        row_errors.push(RowError::field(
          "nama_survei",
          format!(
            "\"{}\" {} matches {} surveys; add Fungsi and Periode",
            record.nama_survei,
            record.tahun,
            many.len()
          ),
        ));
        None
      }
    };

    let id_pcl = match record.nama_pcl.as_deref() {
      None => None,
      Some(name) => match refs.resolve_pcl("nama_pcl", name) {
        Ok(id) => Some(id),
        Err(error) => {
          row_errors.push(error);
          None
        }
      },
    };

    match (id_survei, id_perusahaan) {
      (Some(id_survei), Some(id_perusahaan)) if row_errors.is_empty() => {
        records.push(Numbered {
          row,
          record: NewSurveyHistory {
            id_survei,
            id_perusahaan,
            id_pcl,
            selesai: record.selesai,
            ket_survei: record.ket_survei,
          },
        });
      }
      _ => errors.extend(row_errors.into_iter().map(|e| e.at_row(row))),
    }
  }

  Ok(Resolution { records: ImportRecords::SurveyHistory(records), errors })
}

fn resolve_companies(conn: &Connection, rows: Vec<Numbered<CompanyImportRow>>) -> Result<Resolution> {
  let refs = References::load(conn)?;
  let mut records = Vec::new();
  let mut errors = Vec::new();

  for Numbered { row, record } in rows {
    let mut company = record.fields.normalized();
    let mut row_errors = Vec::new();

    let brackets = [
      ("badan_usaha", LookupTable::BadanUsaha, &record.badan_usaha, &mut company.kd_badan_usaha),
      ("lokasi", LookupTable::Lokasi, &record.lokasi, &mut company.kd_lok),
      ("tenaga_kerja", LookupTable::TenagaKerja, &record.tenaga_kerja, &mut company.kd_tkerja),
      ("investasi", LookupTable::Investasi, &record.investasi, &mut company.kd_investasi),
      ("omset", LookupTable::Omset, &record.omset, &mut company.kd_omset),
    ];
    for (field, table, value, target) in brackets {
      let Some(value) = value else { continue };
      match refs.resolve_bracket(table, value) {
        Match::Found(code) => *target = Some(code),
        Match::Missing(hints) => {
          row_errors.push(RowError::field(field, not_found_message(field, value, &hints)));
        }
      }
    }

    if let Some(kec) = &record.kecamatan {
      match refs.resolve_kecamatan(kec) {
        Match::Found(code) => company.kd_kec = Some(code),
        Match::Missing(hints) => {
          row_errors.push(RowError::field(
            "kecamatan",
            not_found_message("sub-district", kec, &hints),
          ));
        }
      }
    }
    if let Some(desa) = &record.desa {
      match company.kd_kec.as_deref().map(|kec| refs.resolve_desa(kec, desa)) {
        Some(Match::Found(code)) => company.kd_desa = Some(code),
        Some(Match::Missing(hints)) => {
          row_errors.push(RowError::field("desa", not_found_message("village", desa, &hints)));
        }
        None => row_errors.push(RowError::field("desa", "a village needs a sub-district")),
      }
    }

    if let Some(name) = &record.nama_pcl {
      match refs.resolve_pcl("pcl_utama", name) {
        Ok(id) => company.pcl_utama = Some(id),
        Err(error) => row_errors.push(error),
      }
    }

    if row_errors.is_empty() {
      records.push(Numbered {
        row,
        record: CompanyImport { company, tahun_direktori: record.tahun_direktori },
      });
    } else {
      errors.extend(row_errors.into_iter().map(|e| e.at_row(row)));
    }
  }

  Ok(Resolution { records: ImportRecords::Companies(records), errors })
}

// ─── Duplicates ──────────────────────────────────────────────────────────────

fn duplicates_of<T: Keyed>(conn: &Connection, rows: &[Numbered<T>]) -> Result<Vec<DuplicateRow>> {
  let mut found = Vec::new();
  for n in rows {
    if let Some(existing_id) = find_conflict(conn, T::KEY, &n.record.key_values(), None)? {
      found.push(DuplicateRow { row: n.row, existing_id, key: n.record.key_label() });
    }
  }
  Ok(found)
}

pub fn duplicates(conn: &Connection, records: &ImportRecords) -> Result<Vec<DuplicateRow>> {
  match records {
    ImportRecords::FieldWorkers(rows) => duplicates_of(conn, rows),
    ImportRecords::Surveys(rows) => duplicates_of(conn, rows),
    ImportRecords::SurveyHistory(rows) => duplicates_of(conn, rows),
    ImportRecords::Companies(rows) => duplicates_of(conn, rows),
  }
}

// ─── Commit ──────────────────────────────────────────────────────────────────

/// Write every row, re-checking keys against the live table. `write` inserts
/// when given `None` and overwrites the given id otherwise, returning the
/// row id.
fn write_rows<T: Keyed>(
  conn: &Connection,
  rows: &[Numbered<T>],
  mode: CommitMode,
  mut write: impl FnMut(&Connection, Option<i64>, &T) -> Result<i64>,
) -> Result<ImportSummary> {
  let mut summary = ImportSummary::default();
  for n in rows {
    match find_conflict(conn, T::KEY, &n.record.key_values(), None)? {
      None => {
        write(conn, None, &n.record)?;
        summary.inserted += 1;
      }
      Some(id) => match mode {
        CommitMode::Resolve(DuplicateAction::Replace) => {
          write(conn, Some(id), &n.record)?;
          summary.updated += 1;
        }
        CommitMode::Resolve(DuplicateAction::Skip) => summary.skipped += 1,
        CommitMode::Append | CommitMode::Replace => {
          return Err(
            CoreError::Conflict {
              message: format!("row {}: {}", n.row, T::KEY.conflict_message()),
              fields:  T::KEY.field_names(),
            }
            .into(),
          );
        }
      },
    }
  }
  Ok(summary)
}

fn table_of(records: &ImportRecords) -> &'static Table {
  match records {
    ImportRecords::FieldWorkers(_) => &integrity::FIELD_WORKERS,
    ImportRecords::Surveys(_) => &integrity::SURVEYS,
    ImportRecords::SurveyHistory(_) => &integrity::HISTORY,
    ImportRecords::Companies(_) => &integrity::COMPANIES,
  }
}

/// One transaction: optionally clear the table, then write every row.
pub fn commit(conn: &mut Connection, records: ImportRecords, mode: CommitMode) -> Result<ImportSummary> {
  let tx = conn.transaction()?;
  if mode == CommitMode::Replace {
    let cleared = table_of(&records).clear(&tx)?;
    tracing::debug!(cleared, kind = ?records.kind(), "cleared table for replace import");
  }

  let summary = match &records {
    ImportRecords::FieldWorkers(rows) => write_rows(&tx, rows, mode, |c, id, r| {
      Ok(match id {
        None => field_worker::insert(c, r)?.id_pcl,
        Some(id) => field_worker::overwrite(c, id, r)?.id_pcl,
      })
    })?,
    ImportRecords::Surveys(rows) => write_rows(&tx, rows, mode, |c, id, r| {
      Ok(match id {
        None => survey::insert(c, r)?.id_survei,
        Some(id) => survey::overwrite(c, id, r)?.id_survei,
      })
    })?,
    ImportRecords::SurveyHistory(rows) => write_rows(&tx, rows, mode, |c, id, r| {
      Ok(match id {
        None => history::insert(c, r)?.id_riwayat,
        Some(id) => history::overwrite(c, id, r)?.id_riwayat,
      })
    })?,
    ImportRecords::Companies(rows) => write_rows(&tx, rows, mode, |c, id, r| {
      let id = match id {
        None => company::insert(c, &r.company)?.id_perusahaan,
        Some(id) => company::overwrite(c, id, &r.company)?.id_perusahaan,
      };
      company::add_years(c, id, &r.tahun_direktori)?;
      Ok(id)
    })?,
  };

  tx.commit()?;
  Ok(summary)
}
