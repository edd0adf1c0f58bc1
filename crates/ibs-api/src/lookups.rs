//! Read-only reference data for form dropdowns.
//!
//! | Path                     | Returns |
//! |--------------------------|---------|
//! | `/lookup/kecamatan`      | every sub-district |
//! | `/lookup/desa?kec=010`   | villages, optionally of one sub-district |
//! | `/lookup/{table}`        | `badan-usaha`, `lokasi`, `tenaga-kerja`, `investasi`, `omset` |

use std::str::FromStr;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use ibs_core::{
  lookup::{Desa, Kecamatan, LookupEntry, LookupTable},
  store::DirectoryStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DesaParams {
  pub kec: Option<String>,
}

pub async fn kecamatan<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Kecamatan>>, ApiError>
where
  S: DirectoryStore,
{
  let rows = state
    .store
    .list_kecamatan()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

pub async fn desa<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<DesaParams>,
) -> Result<Json<Vec<Desa>>, ApiError>
where
  S: DirectoryStore,
{
  let kec = params.kec.filter(|k| !k.trim().is_empty());
  let rows = state
    .store
    .list_desa(kec)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

pub async fn brackets<S>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
) -> Result<Json<Vec<LookupEntry>>, ApiError>
where
  S: DirectoryStore,
{
  let table = LookupTable::from_str(&name)
    .map_err(|_| ApiError::NotFound(format!("unknown lookup table {name:?}")))?;
  let rows = state
    .store
    .lookup(table)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}
