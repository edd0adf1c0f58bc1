//! Handlers for `/riwayat-survei` (survey history) endpoints.
//!
//! `POST` assigns one survey to several companies at once; if any of them
//! already has the survey nothing is written and the response is 409.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use ibs_core::{
  history::{NewSurveyHistory, NewSurveyHistoryGroup, SurveyHistory, SurveyHistoryRow},
  query::Paginated,
  store::DirectoryStore,
};

use crate::{AppState, Deleted, IdList, ListParams, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /riwayat-survei`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: ListParams,
) -> Result<Json<Paginated<SurveyHistoryRow>>, ApiError>
where
  S: DirectoryStore,
{
  let query = state.list_query(params.0);
  let page = state
    .store
    .list_history(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /riwayat-survei/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<SurveyHistoryRow>, ApiError>
where
  S: DirectoryStore,
{
  let record = state
    .store
    .get_history(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("survey history {id} not found")))?;
  Ok(Json(record))
}

// ─── Write ────────────────────────────────────────────────────────────────────

/// `POST /riwayat-survei`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<NewSurveyHistoryGroup>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let created = state
    .store
    .create_history(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(rows = created.len(), "survey history created");
  Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /riwayat-survei/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  body: Result<Json<NewSurveyHistory>, JsonRejection>,
) -> Result<Json<SurveyHistory>, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let record = state
    .store
    .update_history(id, input)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /riwayat-survei/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError>
where
  S: DirectoryStore,
{
  let deleted = state
    .store
    .delete_history(vec![id])
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Deleted { deleted }))
}

/// `DELETE /riwayat-survei` with `{"ids": [..]}`
pub async fn delete_many<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<IdList>, JsonRejection>,
) -> Result<Json<Deleted>, ApiError>
where
  S: DirectoryStore,
{
  let Json(IdList { ids }) = body?;
  let deleted = state
    .store
    .delete_history(ids)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(deleted, "survey history deleted");
  Ok(Json(Deleted { deleted }))
}
