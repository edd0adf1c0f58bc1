//! Error types for `ibs-core`.
//!
//! Storage backends convert their own errors into [`Error`] so the HTTP layer
//! can classify a failure without knowing which backend produced it.

use serde::Serialize;
use thiserror::Error;

use crate::validate::RowError;

/// A table that still holds rows referencing the entity being deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependent {
  pub table: &'static str,
  pub count: i64,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: i64 },

  /// A uniqueness key collided with an existing row.
  #[error("{message}")]
  Conflict { message: String, fields: Vec<String> },

  /// A delete (or a replace-mode import) was blocked by dependent rows.
  /// `ids` is empty when the whole table was to be replaced.
  #[error("{entity} is still referenced by other records")]
  InUse {
    entity:     &'static str,
    ids:        Vec<i64>,
    dependents: Vec<Dependent>,
  },

  #[error("validation failed with {} error(s)", .0.len())]
  Validation(Vec<RowError>),

  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
