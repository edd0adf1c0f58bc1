//! Error type for `ibs-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ibs_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  /// A stored value that does not decode into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for ibs_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(inner) => inner,
      other => ibs_core::Error::Backend(Box::new(other)),
    }
  }
}
