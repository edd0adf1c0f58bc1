//! JSON REST API for Direktori IBS.
//!
//! Exposes an axum [`Router`] backed by any [`DirectoryStore`]. Auth, TLS
//! and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = ibs_api::app(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod companies;
pub mod directory;
pub mod error;
pub mod field_workers;
pub mod history;
pub mod lookups;
pub mod staging;
pub mod surveys;
pub mod transfer;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Json, Router,
  extract::{DefaultBodyLimit, Multipart, Query, State},
  routing::{get, post},
};
use ibs_core::{import::ImportKind, query::ListQuery, store::DirectoryStore};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
use staging::Staging;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `IBS_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub database_path:    PathBuf,
  /// Optional `kd_kec,nm_kec,kd_desa,nm_desa` CSV loaded at start-up.
  pub regions_path:     Option<PathBuf>,
  pub max_page_size:    u32,
  pub max_upload_bytes: usize,
  pub staging_ttl_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_owned(),
      port:             8080,
      database_path:    PathBuf::from("direktori.db"),
      regions_path:     None,
      max_page_size:    100,
      max_upload_bytes: 10 * 1024 * 1024,
      staging_ttl_secs: 30 * 60,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:   Arc<S>,
  pub staging: Arc<Staging>,
  pub config:  Arc<ServerConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:   Arc::new(store),
      staging: Arc::new(Staging::new(Duration::from_secs(config.staging_ttl_secs))),
      config:  Arc::new(config),
    }
  }

  /// Parse list parameters, capping `limit` at the configured page size.
  pub fn list_query(&self, pairs: Vec<(String, String)>) -> ListQuery {
    ListQuery::from_pairs(pairs, self.config.max_page_size)
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      staging: Arc::clone(&self.staging),
      config:  Arc::clone(&self.config),
    }
  }
}

// ─── Shared bodies ────────────────────────────────────────────────────────────

/// `{"ids": [..]}` for batch deletes.
#[derive(Debug, Deserialize)]
pub struct IdList {
  pub ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub deleted: u64,
}

/// Raw list parameters; [`AppState::list_query`] gives them meaning.
pub type ListParams = Query<Vec<(String, String)>>;

// ─── Router ───────────────────────────────────────────────────────────────────

/// Export, import, import-resolve and template routes under `base`.
fn transfer_routes<S>(router: Router<AppState<S>>, base: &str, kind: ImportKind) -> Router<AppState<S>>
where
  S: DirectoryStore + 'static,
{
  router
    .route(
      &format!("{base}/export"),
      get(move |state: State<AppState<S>>, params: ListParams| {
        transfer::export(state, params, kind)
      }),
    )
    .route(
      &format!("{base}/import"),
      post(move |state: State<AppState<S>>, upload: Multipart| {
        transfer::import(state, upload, kind)
      }),
    )
    .route(
      &format!("{base}/import/resolve"),
      post(
        move |state: State<AppState<S>>,
              body: Result<Json<transfer::ResolveBody>, axum::extract::rejection::JsonRejection>| {
          transfer::resolve(state, body, kind)
        },
      ),
    )
    .route(
      &format!("{base}/template"),
      get(move || transfer::template(kind)),
    )
}

/// Build the API routes for `state`, relative to wherever they are mounted.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: DirectoryStore + 'static,
{
  let router = Router::new()
    // Field workers
    .route(
      "/pcl",
      get(field_workers::list::<S>)
        .post(field_workers::create::<S>)
        .delete(field_workers::delete_many::<S>),
    )
    .route(
      "/pcl/{id}",
      get(field_workers::get_one::<S>)
        .put(field_workers::update::<S>)
        .delete(field_workers::delete_one::<S>),
    )
    // Surveys
    .route(
      "/survei",
      get(surveys::list::<S>)
        .post(surveys::create::<S>)
        .delete(surveys::delete_many::<S>),
    )
    .route(
      "/survei/{id}",
      get(surveys::get_one::<S>)
        .put(surveys::update::<S>)
        .delete(surveys::delete_one::<S>),
    )
    // Survey history
    .route(
      "/riwayat-survei",
      get(history::list::<S>)
        .post(history::create::<S>)
        .delete(history::delete_many::<S>),
    )
    .route(
      "/riwayat-survei/{id}",
      get(history::get_one::<S>)
        .put(history::update::<S>)
        .delete(history::delete_one::<S>),
    )
    // Companies
    .route(
      "/perusahaan",
      get(companies::list::<S>)
        .post(companies::create::<S>)
        .delete(companies::delete_many::<S>),
    )
    .route(
      "/perusahaan/{id}",
      get(companies::get_one::<S>)
        .put(companies::update::<S>)
        .delete(companies::delete_one::<S>),
    )
    // Directory years
    .route(
      "/direktori",
      get(directory::list::<S>)
        .post(directory::add::<S>)
        .delete(directory::remove::<S>),
    )
    .route("/direktori/salin", post(directory::copy::<S>))
    // Lookups
    .route("/lookup/kecamatan", get(lookups::kecamatan::<S>))
    .route("/lookup/desa", get(lookups::desa::<S>))
    .route("/lookup/{table}", get(lookups::brackets::<S>));

  let router = transfer_routes(router, "/pcl", ImportKind::FieldWorkers);
  let router = transfer_routes(router, "/survei", ImportKind::Surveys);
  let router = transfer_routes(router, "/riwayat-survei", ImportKind::SurveyHistory);
  let router = transfer_routes(router, "/perusahaan", ImportKind::Companies);

  let upload_limit = state.config.max_upload_bytes;
  router
    .layer(DefaultBodyLimit::max(upload_limit))
    .with_state(state)
}

/// The full application: API routes under `/api`, with request tracing.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: DirectoryStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
