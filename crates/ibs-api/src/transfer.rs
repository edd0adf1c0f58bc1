//! Spreadsheet export, import and template endpoints.
//!
//! Mounted under each resource base (`/pcl`, `/survei`, `/riwayat-survei`,
//! `/perusahaan`):
//!
//! | Method | Path                     | Notes |
//! |--------|--------------------------|-------|
//! | `GET`  | `{base}/export`          | List filters and sort, no paging; `.xlsx` attachment |
//! | `POST` | `{base}/import`          | Multipart `file` (`.xlsx`/`.csv`) and `mode` (`append`\|`replace`) |
//! | `POST` | `{base}/import/resolve`  | `{"token": .., "duplicateAction": "replace"\|"skip"}` |
//! | `GET`  | `{base}/template`        | Empty workbook with a sample row and the column rules |
//!
//! An append-mode import whose rows collide with existing keys writes
//! nothing. The resolved batch is staged and the response carries a token;
//! the resolve call commits it with the chosen action.

use std::str::FromStr;

use axum::{
  Json,
  extract::{Multipart, State, rejection::JsonRejection},
  http::header,
  response::{IntoResponse, Response},
};
use ibs_core::{
  export::{file_name, to_sheet},
  import::{
    self, CommitMode, DuplicateAction, DuplicateRow, ImportKind, ImportMode, ImportSummary,
  },
  store::DirectoryStore,
  validate::RowError,
};
use bytes::Bytes;
use ibs_sheet::{FileFormat, XLSX_CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, ListParams, error::ApiError};

const EXPORT_SHEET: &str = "Data";

// ─── Bodies ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBody {
  pub token:            Uuid,
  pub duplicate_action: DuplicateAction,
}

/// Result of an import request.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
  /// Rows were written. `errors` lists rows skipped during resolution.
  Committed {
    summary: ImportSummary,
    errors:  Vec<RowError>,
  },
  /// Nothing was written; resend with the token and a duplicate action.
  NeedsResolution {
    token:      Uuid,
    duplicates: Vec<DuplicateRow>,
    errors:     Vec<RowError>,
  },
}

fn attachment(name: &str, bytes: Vec<u8>) -> Response {
  (
    [
      (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
    ],
    bytes,
  )
    .into_response()
}

// ─── Export ───────────────────────────────────────────────────────────────────

pub async fn export<S>(
  State(state): State<AppState<S>>,
  params: ListParams,
  kind: ImportKind,
) -> Result<Response, ApiError>
where
  S: DirectoryStore,
{
  let query = state.list_query(params.0);
  let store = &state.store;
  let sheet = match kind {
    ImportKind::FieldWorkers => to_sheet(
      EXPORT_SHEET,
      &store.export_field_workers(&query).await.map_err(ApiError::store)?,
    ),
    ImportKind::Surveys => to_sheet(
      EXPORT_SHEET,
      &store.export_surveys(&query).await.map_err(ApiError::store)?,
    ),
    ImportKind::SurveyHistory => to_sheet(
      EXPORT_SHEET,
      &store.export_history(&query).await.map_err(ApiError::store)?,
    ),
    ImportKind::Companies => to_sheet(
      EXPORT_SHEET,
      &store.export_companies(&query).await.map_err(ApiError::store)?,
    ),
  };

  let name = file_name(kind.slug(), &query, chrono::Local::now().naive_local());
  let bytes = ibs_sheet::write_xlsx(std::slice::from_ref(&sheet))?;
  tracing::info!(file = %name, rows = sheet.rows.len(), "export written");
  Ok(attachment(&name, bytes))
}

// ─── Template ─────────────────────────────────────────────────────────────────

pub async fn template(kind: ImportKind) -> Result<Response, ApiError> {
  let bytes = ibs_sheet::write_xlsx(&kind.schema().template())?;
  Ok(attachment(&format!("template_{}.xlsx", kind.slug()), bytes))
}

// ─── Import ───────────────────────────────────────────────────────────────────

struct Upload {
  file_name: String,
  bytes:     Bytes,
  mode:      ImportMode,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
  let mut file = None;
  let mut mode = ImportMode::default();

  while let Some(field) = multipart.next_field().await? {
    let name = field.name().unwrap_or_default().to_owned();
    match name.as_str() {
      "file" => {
        let name = field.file_name().unwrap_or_default().to_owned();
        file = Some((name, field.bytes().await?));
      }
      "mode" => {
        let text = field.text().await?;
        let text = text.trim();
        if !text.is_empty() {
          mode = ImportMode::from_str(text).map_err(|_| {
            ApiError::BadRequest(format!("mode must be append or replace, got {text:?}"))
          })?;
        }
      }
      _ => {}
    }
  }

  let (file_name, bytes) =
    file.ok_or_else(|| ApiError::BadRequest("multipart field \"file\" is required".into()))?;
  Ok(Upload { file_name, bytes, mode })
}

pub async fn import<S>(
  State(state): State<AppState<S>>,
  multipart: Multipart,
  kind: ImportKind,
) -> Result<Json<ImportOutcome>, ApiError>
where
  S: DirectoryStore,
{
  let upload = read_upload(multipart).await?;
  let format = FileFormat::from_file_name(&upload.file_name)?;
  let sheet = ibs_sheet::read(&upload.bytes, format)?;
  let parsed = import::parse(kind, &sheet)?;

  let resolution = state
    .store
    .resolve_import(parsed)
    .await
    .map_err(ApiError::store)?;
  let records = resolution.records;
  let errors = resolution.errors;
  tracing::debug!(
    ?kind,
    mode = %upload.mode,
    rows = records.len(),
    skipped = errors.len(),
    "import resolved"
  );

  if upload.mode == ImportMode::Replace {
    let summary = state
      .store
      .commit_import(records, CommitMode::Replace)
      .await
      .map_err(ApiError::store)?;
    return Ok(Json(ImportOutcome::Committed { summary, errors }));
  }

  let duplicates = state
    .store
    .find_duplicates(&records)
    .await
    .map_err(ApiError::store)?;
  if duplicates.is_empty() {
    let summary = state
      .store
      .commit_import(records, CommitMode::Append)
      .await
      .map_err(ApiError::store)?;
    return Ok(Json(ImportOutcome::Committed { summary, errors }));
  }

  let token = state.staging.stage(records).await;
  tracing::info!(?kind, %token, duplicates = duplicates.len(), "import staged");
  Ok(Json(ImportOutcome::NeedsResolution { token, duplicates, errors }))
}

pub async fn resolve<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<ResolveBody>, JsonRejection>,
  kind: ImportKind,
) -> Result<Json<ImportOutcome>, ApiError>
where
  S: DirectoryStore,
{
  let Json(ResolveBody { token, duplicate_action }) = body?;
  let records = state
    .staging
    .take(token, kind)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("import batch {token} not found or expired")))?;

  let summary = state
    .store
    .commit_import(records, CommitMode::Resolve(duplicate_action))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ImportOutcome::Committed { summary, errors: Vec::new() }))
}
