//! Handlers for `/perusahaan` (company) endpoints.
//!
//! | Method   | Path               | Notes |
//! |----------|--------------------|-------|
//! | `GET`    | `/perusahaan`      | `?search`, `?kec`, `?desa`, `?tahun`, `?pcl`, `?status`, bracket codes |
//! | `POST`   | `/perusahaan`      | Body: [`CompanyBody`]; 201 |
//! | `DELETE` | `/perusahaan`      | Body: `{"ids":[..]}`; all or nothing |
//! | `GET`    | `/perusahaan/{id}` | Company plus its survey history |
//! | `PUT`    | `/perusahaan/{id}` | Omitting `tahun_direktori` keeps the current years |
//! | `DELETE` | `/perusahaan/{id}` | Directory rows go with it; 409 while surveyed |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use ibs_core::{
  company::{Company, CompanyDetail, CompanyRow, NewCompany},
  query::Paginated,
  store::DirectoryStore,
};
use serde::Deserialize;

use crate::{AppState, Deleted, IdList, ListParams, error::ApiError};

/// Company fields plus the directory years it should be listed in.
#[derive(Debug, Deserialize)]
pub struct CompanyBody {
  #[serde(flatten)]
  pub company:         NewCompany,
  #[serde(default)]
  pub tahun_direktori: Option<Vec<i64>>,
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /perusahaan`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: ListParams,
) -> Result<Json<Paginated<CompanyRow>>, ApiError>
where
  S: DirectoryStore,
{
  let query = state.list_query(params.0);
  let page = state
    .store
    .list_companies(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

/// `GET /perusahaan/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<CompanyDetail>, ApiError>
where
  S: DirectoryStore,
{
  let detail = state
    .store
    .get_company(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("company {id} not found")))?;
  Ok(Json(detail))
}

// ─── Write ────────────────────────────────────────────────────────────────────

/// `POST /perusahaan`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<CompanyBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
{
  let Json(CompanyBody { company, tahun_direktori }) = body?;
  let created = state
    .store
    .create_company(company, tahun_direktori.unwrap_or_default())
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = created.id_perusahaan, kip = %created.fields.kip, "company created");
  Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /perusahaan/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  body: Result<Json<CompanyBody>, JsonRejection>,
) -> Result<Json<Company>, ApiError>
where
  S: DirectoryStore,
{
  let Json(CompanyBody { company, tahun_direktori }) = body?;
  let updated = state
    .store
    .update_company(id, company, tahun_direktori)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /perusahaan/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError>
where
  S: DirectoryStore,
{
  let deleted = state
    .store
    .delete_companies(vec![id])
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Deleted { deleted }))
}

/// `DELETE /perusahaan` with `{"ids": [..]}`
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
    .delete_companies(ids)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(deleted, "companies deleted");
  Ok(Json(Deleted { deleted }))
}
