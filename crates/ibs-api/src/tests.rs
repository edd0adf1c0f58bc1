//! Router tests against an in-memory SQLite store.

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use ibs_core::import::ImportKind;
use ibs_sheet::FileFormat;
use ibs_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, ServerConfig, app};

const BOUNDARY: &str = "ibs-test-boundary";

async fn router() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  app(AppState::new(store, ServerConfig::default()))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = router.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// GET a binary download; returns the `Content-Disposition` header and body.
async fn download(router: &Router, uri: &str) -> (StatusCode, String, Vec<u8>) {
  let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
  let resp = router.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let disposition = resp
    .headers()
    .get(header::CONTENT_DISPOSITION)
    .map(|v| v.to_str().unwrap().to_owned())
    .unwrap_or_default();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  (status, disposition, bytes.to_vec())
}

async fn upload(router: &Router, uri: &str, mode: &str, file_name: &str, csv: &str) -> (StatusCode, Value) {
  let body = format!(
    "--{BOUNDARY}\r\n\
     Content-Disposition: form-data; name=\"mode\"\r\n\r\n\
     {mode}\r\n\
     --{BOUNDARY}\r\n\
     Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
     Content-Type: text/csv\r\n\r\n\
     {csv}\r\n\
     --{BOUNDARY}--\r\n"
  );
  let req = Request::builder()
    .method(Method::POST)
    .uri(uri)
    .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
    .body(Body::from(body))
    .unwrap();
  let resp = router.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_worker(router: &Router, name: &str, status: &str) -> i64 {
  let (code, body) = send(
    router,
    Method::POST,
    "/api/pcl",
    Some(json!({ "nama_pcl": name, "status_pcl": status })),
  )
  .await;
  assert_eq!(code, StatusCode::CREATED, "{body}");
  body["id_pcl"].as_i64().unwrap()
}

// ─── CRUD ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_reports_pagination() {
  let router = router().await;
  for i in 1..=5 {
    create_worker(&router, &format!("Petugas {i}"), "Mitra").await;
  }

  let (code, body) = send(&router, Method::GET, "/api/pcl?page=2&limit=2", None).await;
  assert_eq!(code, StatusCode::OK);
  assert_eq!(body["data"].as_array().unwrap().len(), 2);
  assert_eq!(body["pagination"]["total"], 5);
  assert_eq!(body["pagination"]["totalPages"], 3);
  assert_eq!(body["data"][0]["jumlah_survei"], 0);
}

#[tokio::test]
async fn invalid_input_is_a_bad_request() {
  let router = router().await;

  let (code, body) = send(
    &router,
    Method::POST,
    "/api/pcl",
    Some(json!({ "nama_pcl": "A", "status_pcl": "Mitra" })),
  )
  .await;
  assert_eq!(code, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["field"], "nama_pcl");

  let (code, _) = send(
    &router,
    Method::POST,
    "/api/pcl",
    Some(json!({ "nama_pcl": "Budi", "status_pcl": "Boss" })),
  )
  .await;
  assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_key_is_a_conflict() {
  let router = router().await;
  create_worker(&router, "Budi", "Mitra").await;

  let (code, body) = send(
    &router,
    Method::POST,
    "/api/pcl",
    Some(json!({ "nama_pcl": " budi ", "status_pcl": "Mitra" })),
  )
  .await;
  assert_eq!(code, StatusCode::CONFLICT);
  assert_eq!(body["fields"], json!(["nama_pcl", "status_pcl"]));
}

#[tokio::test]
async fn missing_records_are_not_found() {
  let router = router().await;
  let (code, body) = send(&router, Method::GET, "/api/survei/42", None).await;
  assert_eq!(code, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("42"));

  let (code, _) = send(&router, Method::DELETE, "/api/pcl/42", None).await;
  assert_eq!(code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referenced_survey_cannot_be_deleted() {
  let router = router().await;
  let (_, survey) = send(
    &router,
    Method::POST,
    "/api/survei",
    Some(json!({
      "nama_survei": "Survei IBS",
      "fungsi": "Statistik Produksi",
      "periode": "Tahunan",
      "tahun": 2024
    })),
  )
  .await;
  let id_survei = survey["id_survei"].as_i64().unwrap();

  let (code, company) = send(
    &router,
    Method::POST,
    "/api/perusahaan",
    Some(json!({ "kip": "3201001", "nama_perusahaan": "PT Maju" })),
  )
  .await;
  assert_eq!(code, StatusCode::CREATED, "{company}");
  let id_perusahaan = company["id_perusahaan"].as_i64().unwrap();

  let (code, created) = send(
    &router,
    Method::POST,
    "/api/riwayat-survei",
    Some(json!({
      "id_survei": id_survei,
      "id_perusahaan": [id_perusahaan],
      "selesai": "Iya"
    })),
  )
  .await;
  assert_eq!(code, StatusCode::CREATED, "{created}");
  assert_eq!(created.as_array().unwrap().len(), 1);

  let (code, body) = send(&router, Method::DELETE, &format!("/api/survei/{id_survei}"), None).await;
  assert_eq!(code, StatusCode::CONFLICT);
  assert_eq!(body["dependents"][0]["table"], "riwayat_survei");
  assert_eq!(body["dependents"][0]["count"], 1);

  let (code, detail) = send(&router, Method::GET, &format!("/api/perusahaan/{id_perusahaan}"), None).await;
  assert_eq!(code, StatusCode::OK);
  assert_eq!(detail["riwayat"][0]["nama_survei"], "Survei IBS");
}

#[tokio::test]
async fn directory_membership_is_counted() {
  let router = router().await;
  let (_, company) = send(
    &router,
    Method::POST,
    "/api/perusahaan",
    Some(json!({ "kip": "3201002", "nama_perusahaan": "CV Sejahtera" })),
  )
  .await;
  let id = company["id_perusahaan"].as_i64().unwrap();

  let (code, change) = send(
    &router,
    Method::POST,
    "/api/direktori",
    Some(json!({ "tahun": 2024, "id_perusahaan": [id] })),
  )
  .await;
  assert_eq!(code, StatusCode::OK);
  assert_eq!(change["changed"], 1);

  let (_, years) = send(&router, Method::GET, "/api/direktori", None).await;
  assert_eq!(years, json!([{ "tahun": 2024, "jumlah_perusahaan": 1 }]));
}

#[tokio::test]
async fn lookup_tables_by_path_name() {
  let router = router().await;
  let (code, body) = send(&router, Method::GET, "/api/lookup/badan-usaha", None).await;
  assert_eq!(code, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 8);

  let (code, _) = send(&router, Method::GET, "/api/lookup/pajak", None).await;
  assert_eq!(code, StatusCode::NOT_FOUND);
}

// ─── Import / export ─────────────────────────────────────────────────────────

#[tokio::test]
async fn import_stages_duplicates_until_resolved() {
  let router = router().await;
  let csv = "Nama PCL,Status,No. Telepon\nBudi,Mitra,0812\n";
  let (code, body) = upload(&router, "/api/pcl/import", "append", "pcl.csv", csv).await;
  assert_eq!(code, StatusCode::OK, "{body}");
  assert_eq!(body["status"], "committed");
  assert_eq!(body["summary"]["inserted"], 1);

  let csv = "Nama PCL,Status,No. Telepon\nBudi,Mitra,0813\nSari,Staff,\n";
  let (code, body) = upload(&router, "/api/pcl/import", "append", "pcl.csv", csv).await;
  assert_eq!(code, StatusCode::OK, "{body}");
  assert_eq!(body["status"], "needs_resolution");
  assert_eq!(body["duplicates"].as_array().unwrap().len(), 1);
  assert_eq!(body["duplicates"][0]["row"], 2);
  let token = body["token"].as_str().unwrap().to_owned();

  // Nothing is written while the batch waits.
  let (_, list) = send(&router, Method::GET, "/api/pcl", None).await;
  assert_eq!(list["pagination"]["total"], 1);

  let resolve = json!({ "token": token, "duplicateAction": "skip" });
  let (code, body) = send(&router, Method::POST, "/api/pcl/import/resolve", Some(resolve.clone())).await;
  assert_eq!(code, StatusCode::OK, "{body}");
  assert_eq!(body["summary"]["inserted"], 1);
  assert_eq!(body["summary"]["skipped"], 1);

  let (code, _) = send(&router, Method::POST, "/api/pcl/import/resolve", Some(resolve)).await;
  assert_eq!(code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn import_rejects_invalid_rows_and_files() {
  let router = router().await;
  let csv = "Nama PCL,Status\nBudi,Mitra\nSari,Honorer\n";
  let (code, body) = upload(&router, "/api/pcl/import", "append", "pcl.csv", csv).await;
  assert_eq!(code, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["row"], 3);
  assert_eq!(body["errors"][0]["field"], "status_pcl");

  let (_, list) = send(&router, Method::GET, "/api/pcl", None).await;
  assert_eq!(list["pagination"]["total"], 0);

  let (code, _) = upload(&router, "/api/pcl/import", "append", "pcl.pdf", csv).await;
  assert_eq!(code, StatusCode::BAD_REQUEST);

  let (code, _) = upload(&router, "/api/pcl/import", "merge", "pcl.csv", csv).await;
  assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_is_filtered_and_named_after_filters() {
  let router = router().await;
  create_worker(&router, "Budi", "Mitra").await;
  create_worker(&router, "Sari", "Staff").await;

  let (code, disposition, bytes) = download(&router, "/api/pcl/export?status=Mitra").await;
  assert_eq!(code, StatusCode::OK);
  assert!(disposition.contains("filename=\"pcl_"), "{disposition}");
  assert!(disposition.ends_with("_status-Mitra.xlsx\""), "{disposition}");

  let sheet = ibs_sheet::read(&bytes, FileFormat::Xlsx).unwrap();
  assert_eq!(sheet.headers[0], "Nama PCL");
  assert_eq!(sheet.rows.len(), 1);
  assert_eq!(sheet.rows[0][0], "Budi");
}

#[tokio::test]
async fn template_lists_import_columns() {
  let router = router().await;
  let (code, disposition, bytes) = download(&router, "/api/perusahaan/template").await;
  assert_eq!(code, StatusCode::OK);
  assert!(disposition.contains("template_perusahaan.xlsx"));

  let sheet = ibs_sheet::read(&bytes, FileFormat::Xlsx).unwrap();
  assert_eq!(sheet.headers, ImportKind::Companies.schema().headers());
  assert_eq!(sheet.rows.len(), 1);
}
