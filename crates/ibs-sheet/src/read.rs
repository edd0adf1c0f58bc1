//! Uploaded file → [`Sheet`].

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use ibs_core::sheet::Sheet;

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Largest float that still prints exactly as an integer.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Text of one cell. Whole-number floats lose their `.0`, so a year typed
/// into Excel reads as `2024`.
fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.trim().to_owned(),
    Data::Int(n) => n.to_string(),
    Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT => {
      format!("{}", *f as i64)
    }
    Data::Float(f) => f.to_string(),
    other => other.to_string().trim().to_owned(),
  }
}

fn header_row(cells: Vec<String>) -> Result<Vec<String>> {
  if cells.iter().all(|c| c.is_empty()) {
    return Err(Error::MissingHeader);
  }
  Ok(cells)
}

pub(crate) fn read_xlsx(bytes: &[u8]) -> Result<Sheet> {
  let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
  let name = workbook
    .sheet_names()
    .first()
    .cloned()
    .ok_or(Error::NoWorksheet)?;
  let range = workbook.worksheet_range_at(0).ok_or(Error::NoWorksheet)??;

  let mut rows = range.rows();
  let headers = header_row(
    rows
      .next()
      .ok_or(Error::MissingHeader)?
      .iter()
      .map(cell_text)
      .collect(),
  )?;
  let mut sheet = Sheet::new(name, headers);
  for row in rows {
    sheet.push(row.iter().map(cell_text).collect());
  }
  Ok(sheet)
}

/// `;` when the header line has more semicolons than commas, as written by
/// spreadsheet apps in locales with a decimal comma.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
  let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
  let count = |d: u8| first_line.iter().filter(|b| **b == d).count();
  if count(b';') > count(b',') { b';' } else { b',' }
}

pub(crate) fn read_csv(bytes: &[u8]) -> Result<Sheet> {
  let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .trim(csv::Trim::All)
    .delimiter(sniff_delimiter(bytes))
    .from_reader(bytes);

  let mut records = reader.records();
  let headers = header_row(
    records
      .next()
      .ok_or(Error::MissingHeader)??
      .iter()
      .map(str::to_owned)
      .collect(),
  )?;
  let mut sheet = Sheet::new("Data", headers);
  for record in records {
    sheet.push(record?.iter().map(str::to_owned).collect());
  }
  Ok(sheet)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn whole_floats_read_as_integers() {
    assert_eq!(cell_text(&Data::Float(2024.0)), "2024");
    assert_eq!(cell_text(&Data::Float(-6.5971)), "-6.5971");
    assert_eq!(cell_text(&Data::Int(16710)), "16710");
    assert_eq!(cell_text(&Data::String("  Budi ".into())), "Budi");
    assert_eq!(cell_text(&Data::Empty), "");
  }

  #[test]
  fn csv_with_bom_and_semicolons() {
    let input = "\u{FEFF}Nama PCL;Status;No. Telepon\nBudi;Mitra;08123\n;;\nSari ; staff\n";
    let sheet = read_csv(input.as_bytes()).unwrap();
    assert_eq!(sheet.headers, vec!["Nama PCL", "Status", "No. Telepon"]);
    assert_eq!(sheet.rows.len(), 3);
    assert_eq!(sheet.rows[0], vec!["Budi", "Mitra", "08123"]);
    assert_eq!(sheet.rows[2], vec!["Sari", "staff"]);
    assert_eq!(Sheet::cell(&sheet.rows[2], 2), "");
  }

  #[test]
  fn csv_quoted_commas_survive() {
    let input = "KIP,Alamat\n001,\"Jl. Raya, No. 5\"\n";
    let sheet = read_csv(input.as_bytes()).unwrap();
    assert_eq!(sheet.rows[0][1], "Jl. Raya, No. 5");
  }

  #[test]
  fn empty_file_has_no_header() {
    assert!(matches!(read_csv(b""), Err(Error::MissingHeader)));
    assert!(matches!(read_csv(b",,\n"), Err(Error::MissingHeader)));
  }
}
