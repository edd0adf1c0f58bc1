//! Handlers for `/survei` endpoints.
//!
//! | Method   | Path           | Notes |
//! |----------|----------------|-------|
//! | `GET`    | `/survei`      | `?search`, `?fungsi`, `?periode`, `?tahun`, paging, sorting |
//! | `POST`   | `/survei`      | Body: [`NewSurvey`]; 201 |
//! | `DELETE` | `/survei`      | Body: `{"ids":[..]}` |
//! | `GET`    | `/survei/{id}` | Includes company counts |
//! | `PUT`    | `/survei/{id}` | Body: [`NewSurvey`] |
//! | `DELETE` | `/survei/{id}` | 409 while survey history references it |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use ibs_core::{
  query::Paginated,
  store::DirectoryStore,
  survey::{NewSurvey, Survey, SurveyRow},
};

use crate::{AppState, Deleted, IdList, ListParams, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /survei`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: ListParams,
) -> Result<Json<Paginated<SurveyRow>>, ApiError>
where
  S: DirectoryStore,
{
  let query = state.list_query(params.0);
  let page = state
    .store
    .list_surveys(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /survei/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<SurveyRow>, ApiError>
where
  S: DirectoryStore,
{
  let survey = state
    .store
    .get_survey(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("survey {id} not found")))?;
  Ok(Json(survey))
}

// ─── Write ────────────────────────────────────────────────────────────────────

/// `POST /survei`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<NewSurvey>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let survey = state
    .store
    .create_survey(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = survey.id_survei, "survey created");
  Ok((StatusCode::CREATED, Json(survey)))
}

/// `PUT /survei/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  body: Result<Json<NewSurvey>, JsonRejection>,
) -> Result<Json<Survey>, ApiError>
where
  S: DirectoryStore,
{
  let Json(input) = body?;
  let survey = state
    .store
    .update_survey(id, input)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(survey))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /survei/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError>
where
  S: DirectoryStore,
{
  let deleted = state
    .store
    .delete_surveys(vec![id])
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Deleted { deleted }))
}

/// `DELETE /survei` with `{"ids": [..]}`
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
    .delete_surveys(ids)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(deleted, "surveys deleted");
  Ok(Json(Deleted { deleted }))
}
