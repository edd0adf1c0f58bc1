//! Handlers for `/pcl` (field worker) endpoints.
//!
//! | Method   | Path        | Notes |
//! |----------|-------------|-------|
//! | `GET`    | `/pcl`      | `?search`, `?status=mitra\|staff`, paging, `sort[i][..]` |
//! | `POST`   | `/pcl`      | Body: [`NewFieldWorker`]; 201 |
//! | `DELETE` | `/pcl`      | Body: `{"ids":[..]}`; all or nothing |
//! | `GET`    | `/pcl/{id}` | 404 if not found |
//! | `PUT`    | `/pcl/{id}` | Body: [`NewFieldWorker`] |
//! | `DELETE` | `/pcl/{id}` | 409 while referenced |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use ibs_core::{
  field_worker::{FieldWorker, FieldWorkerRow, NewFieldWorker},
  query::Paginated,
  store::DirectoryStore,
};

use crate::{AppState, Deleted, IdList, ListParams, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /pcl`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: ListParams,
) -> Result<Json<Paginated<FieldWorkerRow>>, ApiError>
where
  S: DirectoryStore,
{
  let query = state.list_query(params.0);
  let page = state
    .store
    .list_field_workers(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /pcl/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<FieldWorkerRow>, ApiError>
where
  S: DirectoryStore,
{
  let worker = state
    .store
    .get_field_worker(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("field worker {id} not found")))?;
  Ok(Json(worker))
}

// ─── Write ────────────────────────────────────────────────────────────────────

/// `POST /pcl`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<NewFieldWorker>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let worker = state
    .store
    .create_field_worker(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = worker.id_pcl, "field worker created");
  Ok((StatusCode::CREATED, Json(worker)))
}

/// `PUT /pcl/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  body: Result<Json<NewFieldWorker>, JsonRejection>,
) -> Result<Json<FieldWorker>, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let worker = state
    .store
    .update_field_worker(id, input)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(worker))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /pcl/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError>
where
  S: DirectoryStore,
{
  let deleted = state
    .store
    .delete_field_workers(vec![id])
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Deleted { deleted }))
}

/// `DELETE /pcl` with `{"ids": [..]}`
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
    .delete_field_workers(ids)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(deleted, "field workers deleted");
  Ok(Json(Deleted { deleted }))
}
