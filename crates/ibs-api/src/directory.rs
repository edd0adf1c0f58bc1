//! Handlers for `/direktori` (yearly directory membership).

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use ibs_core::{
  directory::{CopyYear, DirectoryChange, DirectoryMembership, DirectoryYear},
  store::DirectoryStore,
};

use crate::{AppState, error::ApiError};

/// `GET /direktori`: every year with its company count, newest first.
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<DirectoryYear>>, ApiError>
where
  S: DirectoryStore,
{
  let years = state
    .store
    .list_directory_years()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(years))
}

/// `POST /direktori` with `{"tahun": .., "id_perusahaan": [..]}`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<DirectoryMembership>, JsonRejection>,
) -> Result<Json<DirectoryChange>, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let tahun = input.tahun;
  let change = state
    .store
    .add_to_directory(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(tahun, added = change.changed, skipped = change.skipped, "directory updated");
  Ok(Json(change))
}

/// `DELETE /direktori` with the same body as `POST`.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<DirectoryMembership>, JsonRejection>,
) -> Result<Json<DirectoryChange>, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let tahun = input.tahun;
  let change = state
    .store
    .remove_from_directory(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(tahun, removed = change.changed, "directory updated");
  Ok(Json(change))
}

/// `POST /direktori/salin` with `{"dari": .., "ke": ..}`
pub async fn copy<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<CopyYear>, JsonRejection>,
) -> Result<Json<DirectoryChange>, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let CopyYear { dari, ke } = input;
  let change = state
    .store
    .copy_directory_year(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(dari, ke, copied = change.changed, "directory year copied");
  Ok(Json(change))
}
