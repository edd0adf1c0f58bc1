//! Error types for the ibs-sheet codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported file type: {0} (expected .xlsx or .csv)")]
  UnsupportedFormat(String),

  #[error("workbook has no worksheets")]
  NoWorksheet,

  #[error("file has no header row")]
  MissingHeader,

  #[error("xlsx read error: {0}")]
  Xlsx(#[from] calamine::XlsxError),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("xlsx write error: {0}")]
  Write(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
