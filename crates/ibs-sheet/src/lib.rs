//! Spreadsheet codec for Direktori IBS.
//!
//! Reads an uploaded `.xlsx` or `.csv` file into an [`ibs_core::sheet::Sheet`]
//! and writes sheets back out as an `.xlsx` workbook. Pure synchronous; no
//! HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use ibs_sheet::{FileFormat, read};
//!
//! let bytes = std::fs::read("pcl.xlsx").unwrap();
//! let format = FileFormat::from_file_name("pcl.xlsx").unwrap();
//! let sheet = read(&bytes, format).unwrap();
//! println!("{} columns, {} rows", sheet.headers.len(), sheet.rows.len());
//! ```

pub mod error;
mod read;
mod write;

pub use error::{Error, Result};
use ibs_core::sheet::Sheet;

/// MIME type of the workbooks produced by [`write_xlsx`].
pub const XLSX_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
  Xlsx,
  Csv,
}

impl FileFormat {
  /// Pick the format from an uploaded file's name.
  pub fn from_file_name(name: &str) -> Result<Self> {
    let extension = name
      .rsplit_once('.')
      .map(|(_, ext)| ext.trim().to_ascii_lowercase())
      .unwrap_or_default();
    match extension.as_str() {
      "xlsx" => Ok(Self::Xlsx),
      "csv" => Ok(Self::Csv),
      _ => Err(Error::UnsupportedFormat(name.to_owned())),
    }
  }
}

/// Read the first worksheet (or the whole CSV file). The first row is the
/// header; every cell comes back as trimmed text.
pub fn read(bytes: &[u8], format: FileFormat) -> Result<Sheet> {
  match format {
    FileFormat::Xlsx => read::read_xlsx(bytes),
    FileFormat::Csv => read::read_csv(bytes),
  }
}

/// Write `sheets` as one workbook, one worksheet each, in order.
pub fn write_xlsx(sheets: &[Sheet]) -> Result<Vec<u8>> { write::write_xlsx(sheets) }

#[cfg(test)]
mod roundtrip_tests {
  use super::*;

  #[test]
  fn workbook_reads_back() {
    let mut data = Sheet::new("Data", vec!["KIP".into(), "Nama Perusahaan".into(), "Kode Pos".into()]);
    data.push(vec!["0032".into(), "PT Satu".into(), "16710".into()]);
    data.push(vec!["0033".into(), "PT Dua".into(), String::new()]);
    let mut rules = Sheet::new("Aturan", vec!["Kolom".into()]);
    rules.push(vec!["KIP".into()]);

    let bytes = write_xlsx(&[data.clone(), rules]).unwrap();
    let read_back = read(&bytes, FileFormat::Xlsx).unwrap();

    assert_eq!(read_back.name, "Data");
    assert_eq!(read_back.headers, data.headers);
    assert_eq!(read_back.rows[0], data.rows[0]);
    assert_eq!(Sheet::cell(&read_back.rows[1], 2), "");
  }

  #[test]
  fn format_follows_extension() {
    assert_eq!(FileFormat::from_file_name("Data PCL.XLSX").unwrap(), FileFormat::Xlsx);
    assert_eq!(FileFormat::from_file_name("riwayat.csv").unwrap(), FileFormat::Csv);
    assert!(matches!(
      FileFormat::from_file_name("foto.png"),
      Err(Error::UnsupportedFormat(_))
    ));
    assert!(FileFormat::from_file_name("README").is_err());
  }
}
