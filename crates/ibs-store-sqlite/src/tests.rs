//! Integration tests for `SqliteStore` against an in-memory database.

use ibs_core::{
  Error as CoreError,
  company::{CompletionLevel, NewCompany},
  directory::{CopyYear, DirectoryMembership},
  export::to_sheet,
  field_worker::{FieldWorkerStatus, NewFieldWorker},
  history::{Completion, NewSurveyHistoryGroup},
  import::{CommitMode, DuplicateAction, ImportKind, ImportRecords, Numbered, parse},
  lookup::{LookupTable, RegionRow},
  query::{ListQuery, SortDirection},
  sheet::Sheet,
  store::DirectoryStore,
  survey::NewSurvey,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  let region = |kd_kec: &str, nm_kec: &str, kd_desa: &str, nm_desa: &str| RegionRow {
    kd_kec:  kd_kec.into(),
    nm_kec:  nm_kec.into(),
    kd_desa: kd_desa.into(),
    nm_desa: nm_desa.into(),
  };
  s.load_regions(vec![
    region("010", "Cibinong", "001", "Pakansari"),
    region("010", "Cibinong", "002", "Tengah"),
    region("020", "Citeureup", "001", "Puspanegara"),
  ])
  .await
  .expect("regions");
  s
}

fn core(err: Error) -> CoreError { err.into() }

fn worker(name: &str) -> NewFieldWorker {
  NewFieldWorker {
    nama_pcl:   name.into(),
    status_pcl: FieldWorkerStatus::Mitra,
    telp_pcl:   None,
  }
}

fn survey(name: &str) -> NewSurvey {
  NewSurvey {
    nama_survei: name.into(),
    fungsi:      "Statistik Produksi".into(),
    periode:     "Tahunan".into(),
    tahun:       2024,
  }
}

fn company(kip: &str, name: &str) -> NewCompany {
  NewCompany {
    kip: kip.into(),
    nama_perusahaan: name.into(),
    ..NewCompany::default()
  }
}

fn sheet(headers: &[&str], rows: &[&[&str]]) -> Sheet {
  let mut s = Sheet::new("Data", headers.iter().map(|h| (*h).to_owned()).collect());
  for row in rows {
    s.push(row.iter().map(|c| (*c).to_owned()).collect());
  }
  s
}

async fn assign(s: &SqliteStore, id_survei: i64, id_perusahaan: i64, done: bool) {
  s.create_history(NewSurveyHistoryGroup {
    id_survei,
    id_perusahaan: vec![id_perusahaan],
    id_pcl: None,
    selesai: if done { Completion::Iya } else { Completion::Tidak },
    ket_survei: None,
  })
  .await
  .unwrap();
}

async fn company_ids(s: &SqliteStore, query: ListQuery) -> Vec<i64> {
  s.list_companies(&query)
    .await
    .unwrap()
    .data
    .into_iter()
    .map(|r| r.company.id_perusahaan)
    .collect()
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pages_cover_every_row_once() {
  let s = store().await;
  for i in 1..=7 {
    s.create_field_worker(worker(&format!("Petugas {i}"))).await.unwrap();
  }

  let mut seen = Vec::new();
  for page in 1..=3 {
    let query = ListQuery { page, limit: 3, ..ListQuery::default() };
    let result = s.list_field_workers(&query).await.unwrap();
    assert_eq!(result.pagination.total, 7);
    assert_eq!(result.pagination.total_pages, 3);
    seen.extend(result.data.into_iter().map(|r| r.worker.id_pcl));
  }
  seen.sort_unstable();
  seen.dedup();
  assert_eq!(seen.len(), 7);

  let past_end = ListQuery { page: 4, limit: 3, ..ListQuery::default() };
  assert!(s.list_field_workers(&past_end).await.unwrap().data.is_empty());
}

#[tokio::test]
async fn unknown_sort_columns_are_ignored() {
  let s = store().await;
  s.create_field_worker(worker("Sari")).await.unwrap();
  s.create_field_worker(worker("Budi")).await.unwrap();

  let names = |rows: Vec<ibs_core::field_worker::FieldWorkerRow>| {
    rows.into_iter().map(|r| r.worker.nama_pcl).collect::<Vec<_>>()
  };

  let hostile =
    ListQuery::default().with_sort("nama_pcl; DROP TABLE pcl", SortDirection::Descending);
  let rows = s.list_field_workers(&hostile).await.unwrap().data;
  assert_eq!(names(rows), vec!["Budi", "Sari"]);

  let desc = ListQuery::default().with_sort("nama_pcl", SortDirection::Descending);
  let rows = s.list_field_workers(&desc).await.unwrap().data;
  assert_eq!(names(rows), vec!["Sari", "Budi"]);
}

#[tokio::test]
async fn search_and_filters_combine() {
  let s = store().await;
  s.create_survey(survey("Survei Industri")).await.unwrap();
  s.create_survey(survey("Survei Upah")).await.unwrap();
  s.create_survey(NewSurvey { tahun: 2023, ..survey("Survei Industri") })
    .await
    .unwrap();

  let query = ListQuery {
    search: Some("industri".into()),
    ..ListQuery::default()
  }
  .with_filter("tahun", "2024");
  let rows = s.list_surveys(&query).await.unwrap();
  assert_eq!(rows.pagination.total, 1);
  assert_eq!(rows.data[0].survey.tahun, 2024);

  let all = ListQuery::default().with_filter("tahun", "all");
  assert_eq!(s.list_surveys(&all).await.unwrap().pagination.total, 3);
}

// ─── Integrity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_worker_ignores_case_and_padding() {
  let s = store().await;
  s.create_field_worker(worker("Budi")).await.unwrap();

  let err = core(s.create_field_worker(worker(" budi ")).await.unwrap_err());
  match err {
    CoreError::Conflict { fields, .. } => {
      assert_eq!(fields, vec!["nama_pcl", "status_pcl"]);
    }
    other => panic!("expected conflict, got {other:?}"),
  }

  let staff = NewFieldWorker { status_pcl: FieldWorkerStatus::Staff, ..worker("Budi") };
  assert!(s.create_field_worker(staff).await.is_ok());
}

#[tokio::test]
async fn non_ascii_names_fold_like_ascii_ones() {
  let s = store().await;
  s.create_field_worker(worker("Émile")).await.unwrap();

  for term in ["Émile", "émile", "ÉMI"] {
    let query = ListQuery { search: Some(term.into()), ..ListQuery::default() };
    let total = s.list_field_workers(&query).await.unwrap().pagination.total;
    assert_eq!(total, 1, "search {term:?}");
  }

  let err = core(s.create_field_worker(worker("émile")).await.unwrap_err());
  assert!(matches!(err, CoreError::Conflict { .. }), "got {err:?}");

  let file = sheet(&["Nama PCL", "Status"], &[&["ÉMILE", "Mitra"]]);
  let parsed = parse(ImportKind::FieldWorkers, &file).unwrap();
  let resolution = s.resolve_import(parsed).await.unwrap();
  let duplicates = s.find_duplicates(&resolution.records).await.unwrap();
  assert_eq!(duplicates.len(), 1);
}

#[tokio::test]
async fn shared_worker_name_is_not_guessed() {
  let s = store().await;
  s.create_field_worker(worker("Budi")).await.unwrap();
  let staff = NewFieldWorker { status_pcl: FieldWorkerStatus::Staff, ..worker("Budi") };
  s.create_field_worker(staff).await.unwrap();
  s.create_survey(survey("Survei Industri")).await.unwrap();
  s.create_company(company("001", "PT Satu"), vec![]).await.unwrap();

  let file = sheet(&["KIP", "Nama Survei", "Tahun", "Nama PCL", "Selesai"], &[&[
    "001",
    "Survei Industri",
    "2024",
    "budi",
    "Iya",
  ]]);
  let parsed = parse(ImportKind::SurveyHistory, &file).unwrap();
  let resolution = s.resolve_import(parsed).await.unwrap();

  assert!(resolution.records.is_empty());
  assert_eq!(resolution.errors.len(), 1);
  assert_eq!(resolution.errors[0].row, Some(2));
  assert_eq!(resolution.errors[0].field.as_deref(), Some("nama_pcl"));
  assert!(resolution.errors[0].message.contains("2 field workers"));
}

#[tokio::test]
async fn update_may_keep_its_own_key() {
  let s = store().await;
  let budi = s.create_field_worker(worker("Budi")).await.unwrap();
  let sari = s.create_field_worker(worker("Sari")).await.unwrap();

  let renamed = NewFieldWorker { telp_pcl: Some("0812".into()), ..worker("BUDI") };
  assert!(s.update_field_worker(budi.id_pcl, renamed).await.is_ok());

  let err = core(s.update_field_worker(sari.id_pcl, worker("budi")).await.unwrap_err());
  assert!(matches!(err, CoreError::Conflict { .. }));

  let err = core(s.update_field_worker(9999, worker("Tono")).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound { id: 9999, .. }));
}

#[tokio::test]
async fn survey_delete_blocked_by_history() {
  let s = store().await;
  let sv = s.create_survey(survey("Survei Industri")).await.unwrap();
  let co = s.create_company(company("001", "PT Satu"), vec![]).await.unwrap();
  assign(&s, sv.id_survei, co.id_perusahaan, true).await;

  let err = core(s.delete_surveys(vec![sv.id_survei]).await.unwrap_err());
  match err {
    CoreError::InUse { ids, dependents, .. } => {
      assert_eq!(ids, vec![sv.id_survei]);
      assert_eq!(dependents.len(), 1);
      assert_eq!(dependents[0].table, "riwayat_survei");
      assert_eq!(dependents[0].count, 1);
    }
    other => panic!("expected in-use, got {other:?}"),
  }
  assert!(s.get_survey(sv.id_survei).await.unwrap().is_some());

  let history = s.list_history(&ListQuery::default()).await.unwrap();
  let ids = history.data.iter().map(|r| r.history.id_riwayat).collect();
  assert_eq!(s.delete_history(ids).await.unwrap(), 1);
  assert_eq!(s.delete_surveys(vec![sv.id_survei]).await.unwrap(), 1);
}

#[tokio::test]
async fn batch_delete_is_all_or_nothing() {
  let s = store().await;
  let a = s.create_field_worker(worker("Budi")).await.unwrap();
  let b = s.create_field_worker(worker("Sari")).await.unwrap();

  let err = core(s.delete_field_workers(vec![a.id_pcl, 9999]).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound { id: 9999, .. }));
  assert!(s.get_field_worker(a.id_pcl).await.unwrap().is_some());

  let mut co = company("001", "PT Satu");
  co.pcl_utama = Some(b.id_pcl);
  s.create_company(co, vec![]).await.unwrap();
  let err = core(s.delete_field_workers(vec![a.id_pcl, b.id_pcl]).await.unwrap_err());
  assert!(matches!(err, CoreError::InUse { .. }));
  assert!(s.get_field_worker(a.id_pcl).await.unwrap().is_some());

  assert_eq!(s.delete_field_workers(vec![a.id_pcl, a.id_pcl]).await.unwrap(), 1);
}

#[tokio::test]
async fn company_validation_reports_everything() {
  let s = store().await;
  let bad = NewCompany {
    kode_pos: Some("16a".into()),
    kd_kec: Some("999".into()),
    kd_badan_usaha: Some("42".into()),
    ..company("", "PT Satu")
  };
  let err = core(s.create_company(bad, vec![1999]).await.unwrap_err());
  let CoreError::Validation(errors) = err else {
    panic!("expected validation error");
  };
  let fields: Vec<_> = errors.iter().filter_map(|e| e.field.as_deref()).collect();
  for field in ["kip", "kode_pos", "kd_kec", "kd_badan_usaha", "tahun_direktori"] {
    assert!(fields.contains(&field), "{field} missing from {fields:?}");
  }
  assert!(s.list_companies(&ListQuery::default()).await.unwrap().data.is_empty());
}

#[tokio::test]
async fn group_history_conflict_blocks_all() {
  let s = store().await;
  let sv = s.create_survey(survey("Survei Industri")).await.unwrap();
  let a = s.create_company(company("001", "PT Satu"), vec![]).await.unwrap();
  let b = s.create_company(company("002", "PT Dua"), vec![]).await.unwrap();
  assign(&s, sv.id_survei, a.id_perusahaan, false).await;

  let err = core(
    s.create_history(NewSurveyHistoryGroup {
      id_survei:     sv.id_survei,
      id_perusahaan: vec![a.id_perusahaan, b.id_perusahaan],
      id_pcl:        None,
      selesai:       Completion::Iya,
      ket_survei:    None,
    })
    .await
    .unwrap_err(),
  );
  let CoreError::Conflict { message, .. } = err else {
    panic!("expected conflict");
  };
  assert!(message.contains(&a.id_perusahaan.to_string()));

  let history = s.list_history(&ListQuery::default()).await.unwrap();
  assert_eq!(history.pagination.total, 1);
}

// ─── Companies ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn completion_status_uses_exact_thresholds() {
  let s = store().await;
  let mut surveys = Vec::new();
  for i in 1..=5 {
    surveys.push(s.create_survey(survey(&format!("Survei {i}"))).await.unwrap().id_survei);
  }
  let high = s.create_company(company("001", "PT Tinggi"), vec![]).await.unwrap();
  let mid = s.create_company(company("002", "PT Sedang"), vec![]).await.unwrap();
  let low = s.create_company(company("003", "PT Rendah"), vec![]).await.unwrap();
  let none = s.create_company(company("004", "PT Belum"), vec![]).await.unwrap();

  // 4 of 5 is exactly 80%, 3 of 4 is 75%.
  for (i, sv) in surveys.iter().enumerate() {
    assign(&s, *sv, high.id_perusahaan, i < 4).await;
  }
  for (i, sv) in surveys.iter().take(4).enumerate() {
    assign(&s, *sv, mid.id_perusahaan, i < 3).await;
  }
  assign(&s, surveys[0], low.id_perusahaan, false).await;

  let by_status = |status: &str| ListQuery::default().with_filter("status", status);
  assert_eq!(company_ids(&s, by_status("tinggi")).await, vec![high.id_perusahaan]);
  assert_eq!(company_ids(&s, by_status("sedang")).await, vec![mid.id_perusahaan]);
  assert_eq!(company_ids(&s, by_status("rendah")).await, vec![low.id_perusahaan]);
  assert_eq!(company_ids(&s, by_status("belum")).await, vec![none.id_perusahaan]);

  let detail = s.get_company(mid.id_perusahaan).await.unwrap().unwrap();
  assert_eq!(detail.company.jumlah_survei, 4);
  assert_eq!(detail.company.survei_selesai, 3);
  assert_eq!(detail.company.persen_selesai, Some(75.0));
  assert_eq!(detail.company.status_survei, CompletionLevel::Sedang);
  assert_eq!(detail.riwayat.len(), 4);
}

#[tokio::test]
async fn pcl_filter_matches_primary_worker_by_name() {
  let s = store().await;
  let budi = s.create_field_worker(worker("Budi")).await.unwrap();
  let mut with_pcl = company("001", "PT Satu");
  with_pcl.pcl_utama = Some(budi.id_pcl);
  let a = s.create_company(with_pcl, vec![]).await.unwrap();
  s.create_company(company("002", "PT Dua"), vec![]).await.unwrap();

  let query = ListQuery::default().with_filter("pcl", " budi ");
  assert_eq!(company_ids(&s, query).await, vec![a.id_perusahaan]);
}

#[tokio::test]
async fn company_rows_carry_lookup_labels() {
  let s = store().await;
  let input = NewCompany {
    kd_kec: Some("010".into()),
    kd_desa: Some("002".into()),
    kd_badan_usaha: Some("1".into()),
    ..company("001", "PT Satu")
  };
  let created = s.create_company(input, vec![2024, 2023]).await.unwrap();
  let row = s
    .get_company(created.id_perusahaan)
    .await
    .unwrap()
    .unwrap()
    .company;
  assert_eq!(row.nm_kec.as_deref(), Some("Cibinong"));
  assert_eq!(row.nm_desa.as_deref(), Some("Tengah"));
  assert_eq!(row.ket_badan_usaha.as_deref(), Some("Perseroan Terbatas (PT)"));
  assert_eq!(row.tahun_direktori, vec![2023, 2024]);
  assert_eq!(row.status_survei, CompletionLevel::Belum);

  let lookups = s.lookup(LookupTable::BadanUsaha).await.unwrap();
  assert_eq!(lookups[0].kode, "1");
  assert_eq!(s.list_desa(Some("010".into())).await.unwrap().len(), 2);
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn directory_add_copy_remove() {
  let s = store().await;
  let a = s.create_company(company("001", "PT Satu"), vec![]).await.unwrap();
  let b = s.create_company(company("002", "PT Dua"), vec![]).await.unwrap();
  let ids = vec![a.id_perusahaan, b.id_perusahaan];

  let added = s
    .add_to_directory(DirectoryMembership { tahun: 2023, id_perusahaan: ids.clone() })
    .await
    .unwrap();
  assert_eq!((added.changed, added.skipped), (2, 0));

  let again = s
    .add_to_directory(DirectoryMembership { tahun: 2023, id_perusahaan: vec![a.id_perusahaan] })
    .await
    .unwrap();
  assert_eq!((again.changed, again.skipped), (0, 1));

  let copied = s.copy_directory_year(CopyYear { dari: 2023, ke: 2024 }).await.unwrap();
  assert_eq!(copied.changed, 2);

  let years = s.list_directory_years().await.unwrap();
  assert_eq!(years.len(), 2);
  assert_eq!((years[0].tahun, years[0].jumlah_perusahaan), (2024, 2));

  s.remove_from_directory(DirectoryMembership { tahun: 2023, id_perusahaan: vec![a.id_perusahaan] })
    .await
    .unwrap();
  let in_2023 = ListQuery::default().with_filter("tahun", "2023");
  assert_eq!(company_ids(&s, in_2023).await, vec![b.id_perusahaan]);

  s.delete_companies(vec![a.id_perusahaan]).await.unwrap();
  let years = s.list_directory_years().await.unwrap();
  assert!(years.iter().all(|y| y.jumlah_perusahaan == 1));

  let err = core(
    s.add_to_directory(DirectoryMembership { tahun: 2024, id_perusahaan: vec![9999] })
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::Validation(_)));
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_duplicates_wait_for_a_decision() {
  let s = store().await;
  let budi = s.create_field_worker(worker("Budi")).await.unwrap();

  let file = sheet(&["Nama PCL", "Status"], &[&[" budi ", "mitra"], &["Sari", "Mitra"]]);
  let parsed = parse(ImportKind::FieldWorkers, &file).unwrap();
  let resolution = s.resolve_import(parsed).await.unwrap();
  assert!(resolution.errors.is_empty());

  let duplicates = s.find_duplicates(&resolution.records).await.unwrap();
  assert_eq!(duplicates.len(), 1);
  assert_eq!(duplicates[0].row, 2);
  assert_eq!(duplicates[0].existing_id, budi.id_pcl);

  let err = core(
    s.commit_import(resolution.records.clone(), CommitMode::Append)
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::Conflict { .. }));
  assert_eq!(s.list_field_workers(&ListQuery::default()).await.unwrap().pagination.total, 1);

  let summary = s
    .commit_import(resolution.records, CommitMode::Resolve(DuplicateAction::Skip))
    .await
    .unwrap();
  assert_eq!((summary.inserted, summary.updated, summary.skipped), (1, 0, 1));
}

#[tokio::test]
async fn import_replace_overwrites_existing_rows() {
  let s = store().await;
  let budi = s.create_field_worker(worker("Budi")).await.unwrap();

  let records = ImportRecords::FieldWorkers(vec![Numbered {
    row:    2,
    record: NewFieldWorker { telp_pcl: Some("0812".into()), ..worker("BUDI") },
  }]);
  let summary = s
    .commit_import(records, CommitMode::Resolve(DuplicateAction::Replace))
    .await
    .unwrap();
  assert_eq!(summary.updated, 1);

  let row = s.get_field_worker(budi.id_pcl).await.unwrap().unwrap();
  assert_eq!(row.worker.telp_pcl.as_deref(), Some("0812"));
}

#[tokio::test]
async fn replace_mode_refused_while_referenced() {
  let s = store().await;
  let sv = s.create_survey(survey("Survei Industri")).await.unwrap();
  s.create_survey(survey("Survei Upah")).await.unwrap();
  let co = s.create_company(company("001", "PT Satu"), vec![]).await.unwrap();
  assign(&s, sv.id_survei, co.id_perusahaan, true).await;

  let records = ImportRecords::Surveys(vec![Numbered { row: 2, record: survey("Survei Baru") }]);
  let err = core(
    s.commit_import(records.clone(), CommitMode::Replace)
      .await
      .unwrap_err(),
  );
  let CoreError::InUse { ids, .. } = err else {
    panic!("expected in-use");
  };
  assert!(ids.is_empty());
  assert_eq!(s.list_surveys(&ListQuery::default()).await.unwrap().pagination.total, 2);

  let history = s.list_history(&ListQuery::default()).await.unwrap();
  s.delete_history(history.data.iter().map(|r| r.history.id_riwayat).collect())
    .await
    .unwrap();
  let summary = s.commit_import(records, CommitMode::Replace).await.unwrap();
  assert_eq!(summary.inserted, 1);
  let left = s.list_surveys(&ListQuery::default()).await.unwrap();
  assert_eq!(left.pagination.total, 1);
  assert_eq!(left.data[0].survey.nama_survei, "Survei Baru");
}

#[tokio::test]
async fn history_import_resolves_names() {
  let s = store().await;
  s.create_field_worker(worker("Budi")).await.unwrap();
  s.create_survey(survey("Survei Industri")).await.unwrap();
  s.create_company(company("001", "PT Satu"), vec![]).await.unwrap();

  let file = sheet(&["KIP", "Nama Survei", "Tahun", "Nama PCL", "Selesai"], &[
    &["001", "survei industri", "2024", "budi", "Iya"],
    &["00l", "Survei Industri", "2024", "", "Tidak"],
    &["001", "Survei Upah", "2024", "", "Tidak"],
  ]);
  let parsed = parse(ImportKind::SurveyHistory, &file).unwrap();
  let resolution = s.resolve_import(parsed).await.unwrap();

  assert_eq!(resolution.records.len(), 1);
  assert_eq!(resolution.errors.len(), 2);
  assert_eq!(resolution.errors[0].row, Some(3));
  assert_eq!(resolution.errors[0].field.as_deref(), Some("kip"));
  assert_eq!(resolution.errors[1].row, Some(4));
  assert_eq!(resolution.errors[1].field.as_deref(), Some("nama_survei"));

  let summary = s
    .commit_import(resolution.records, CommitMode::Append)
    .await
    .unwrap();
  assert_eq!(summary.inserted, 1);
  let row = &s.list_history(&ListQuery::default()).await.unwrap().data[0];
  assert_eq!(row.nama_pcl.as_deref(), Some("Budi"));
}

#[tokio::test]
async fn company_export_imports_back() {
  let source = store().await;
  let budi = source.create_field_worker(worker("Budi")).await.unwrap();
  let input = NewCompany {
    kd_kec: Some("010".into()),
    kd_desa: Some("001".into()),
    kd_badan_usaha: Some("1".into()),
    kd_tkerja: Some("2".into()),
    kode_pos: Some("16710".into()),
    pcl_utama: Some(budi.id_pcl),
    ..company("3201001", "PT Maju Jaya")
  };
  source.create_company(input, vec![2023, 2024]).await.unwrap();
  let exported = source.export_companies(&ListQuery::default()).await.unwrap();
  let file = to_sheet("Data", &exported);

  let target = store().await;
  target.create_field_worker(worker("Budi")).await.unwrap();
  let parsed = parse(ImportKind::Companies, &file).unwrap();
  let resolution = target.resolve_import(parsed).await.unwrap();
  assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
  let summary = target
    .commit_import(resolution.records, CommitMode::Append)
    .await
    .unwrap();
  assert_eq!(summary.inserted, 1);

  let rows = target.export_companies(&ListQuery::default()).await.unwrap();
  let c = &rows[0];
  assert_eq!(c.company.fields.kip, "3201001");
  assert_eq!(c.company.fields.kd_kec.as_deref(), Some("010"));
  assert_eq!(c.company.fields.kd_desa.as_deref(), Some("001"));
  assert_eq!(c.company.fields.kd_badan_usaha.as_deref(), Some("1"));
  assert_eq!(c.company.fields.kd_tkerja.as_deref(), Some("2"));
  assert_eq!(c.company.fields.kode_pos.as_deref(), Some("16710"));
  assert_eq!(c.nama_pcl.as_deref(), Some("Budi"));
  assert_eq!(c.tahun_direktori, vec![2023, 2024]);
}
