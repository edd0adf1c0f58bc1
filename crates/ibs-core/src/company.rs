//! Companies: the directory's master records.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  history::SurveyHistoryRow,
  unique::{COMPANY_KEY, KeyValue, Keyed, UniqueKey},
  validate::{FieldRule, Rule, RowError, Validate},
};

/// Company fields as submitted by forms and imports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewCompany {
  pub kip:              String,
  pub nama_perusahaan:  String,
  pub kd_badan_usaha:   Option<String>,
  pub alamat:           Option<String>,
  pub kd_kec:           Option<String>,
  pub kd_desa:          Option<String>,
  pub kode_pos:         Option<String>,
  pub latitude:         Option<f64>,
  pub longitude:        Option<f64>,
  /// Distance to the statistics office, in km.
  pub jarak:            Option<f64>,
  pub kd_lok:           Option<String>,
  pub kd_tkerja:        Option<String>,
  pub kd_investasi:     Option<String>,
  pub kd_omset:         Option<String>,
  pub nama_cp:          Option<String>,
  pub jabatan_cp:       Option<String>,
  pub telp_perusahaan:  Option<String>,
  pub email_perusahaan: Option<String>,
  pub website:          Option<String>,
  pub produk:           Option<String>,
  pub kbli:             Option<String>,
  pub keterangan:       Option<String>,
  /// Primary field worker.
  pub pcl_utama:        Option<i64>,
}

fn tidy(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl NewCompany {
  /// Trim every text field and blank out empty ones.
  pub fn normalized(self) -> Self {
    Self {
      kip:              self.kip.trim().to_owned(),
      nama_perusahaan:  self.nama_perusahaan.trim().to_owned(),
      kd_badan_usaha:   tidy(self.kd_badan_usaha),
      alamat:           tidy(self.alamat),
      kd_kec:           tidy(self.kd_kec),
      kd_desa:          tidy(self.kd_desa),
      kode_pos:         tidy(self.kode_pos),
      latitude:         self.latitude,
      longitude:        self.longitude,
      jarak:            self.jarak,
      kd_lok:           tidy(self.kd_lok),
      kd_tkerja:        tidy(self.kd_tkerja),
      kd_investasi:     tidy(self.kd_investasi),
      kd_omset:         tidy(self.kd_omset),
      nama_cp:          tidy(self.nama_cp),
      jabatan_cp:       tidy(self.jabatan_cp),
      telp_perusahaan:  tidy(self.telp_perusahaan),
      email_perusahaan: tidy(self.email_perusahaan),
      website:          tidy(self.website),
      produk:           tidy(self.produk),
      kbli:             tidy(self.kbli),
      keterangan:       tidy(self.keterangan),
      pcl_utama:        self.pcl_utama,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
  pub id_perusahaan: i64,
  #[serde(flatten)]
  pub fields:        NewCompany,
}

// ─── Survey completion ───────────────────────────────────────────────────────

/// Completion level over a company's survey-history rows.
///
/// `Tinggi` ≥ 80 %, `Sedang` 50–80 %, `Rendah` < 50 %, `Belum` = no rows.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CompletionLevel {
  Tinggi,
  Sedang,
  Rendah,
  Belum,
}

impl CompletionLevel {
  pub const HIGH_PERCENT: i64 = 80;
  pub const MEDIUM_PERCENT: i64 = 50;

  /// Integer arithmetic only, so exactly 80 % lands in `Tinggi`.
  pub fn from_counts(done: i64, total: i64) -> Self {
    if total <= 0 {
      Self::Belum
    } else if done * 100 >= total * Self::HIGH_PERCENT {
      Self::Tinggi
    } else if done * 100 >= total * Self::MEDIUM_PERCENT {
      Self::Sedang
    } else {
      Self::Rendah
    }
  }
}

/// Denormalised list row: the company, its lookup labels, directory years and
/// survey completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRow {
  #[serde(flatten)]
  pub company:         Company,
  pub nm_kec:          Option<String>,
  pub nm_desa:         Option<String>,
  pub ket_badan_usaha: Option<String>,
  pub ket_lok:         Option<String>,
  pub ket_tkerja:      Option<String>,
  pub ket_investasi:   Option<String>,
  pub ket_omset:       Option<String>,
  pub nama_pcl:        Option<String>,
  pub tahun_direktori: Vec<i64>,
  pub jumlah_survei:   i64,
  pub survei_selesai:  i64,
  pub persen_selesai:  Option<f64>,
  pub status_survei:   CompletionLevel,
}

/// Percentage of completed rows, `None` without any rows.
pub fn completion_percent(done: i64, total: i64) -> Option<f64> {
  (total > 0).then(|| done as f64 * 100.0 / total as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
  #[serde(flatten)]
  pub company: CompanyRow,
  pub riwayat: Vec<SurveyHistoryRow>,
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// One spreadsheet row; lookups are still codes-or-labels and the field
/// worker is still a name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyImportRow {
  pub fields:          NewCompany,
  pub badan_usaha:     Option<String>,
  pub kecamatan:       Option<String>,
  pub desa:            Option<String>,
  pub lokasi:          Option<String>,
  pub tenaga_kerja:    Option<String>,
  pub investasi:       Option<String>,
  pub omset:           Option<String>,
  pub nama_pcl:        Option<String>,
  pub tahun_direktori: Vec<i64>,
}

/// A resolved company import row.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyImport {
  pub company:         NewCompany,
  pub tahun_direktori: Vec<i64>,
}

// ─── Rules ───────────────────────────────────────────────────────────────────

macro_rules! text_rule {
  ($name:ident, $field:literal, $label:literal, [$($alias:literal),*], $max:literal, $example:literal) => {
    pub const $name: FieldRule = FieldRule {
      field:    $field,
      label:    $label,
      aliases:  &[$($alias),*],
      required: false,
      rule:     Rule::Text { min: 1, max: $max, identity: false },
      example:  $example,
    };
  };
}

pub const KIP: FieldRule = FieldRule {
  field:    "kip",
  label:    "KIP",
  aliases:  &["kode kip", "kode perusahaan"],
  required: true,
  rule:     Rule::Text { min: 1, max: 30, identity: true },
  example:  "3201001",
};

pub const NAMA_PERUSAHAAN: FieldRule = FieldRule {
  field:    "nama_perusahaan",
  label:    "Nama Perusahaan",
  aliases:  &["nama_perusahaan", "perusahaan", "nama"],
  required: true,
  rule:     Rule::Text { min: 2, max: 200, identity: true },
  example:  "PT Maju Jaya",
};

text_rule!(BADAN_USAHA, "badan_usaha", "Badan Usaha", ["kd_badan_usaha", "bentuk badan usaha"], 100, "Perseroan Terbatas (PT)");
text_rule!(ALAMAT, "alamat", "Alamat", ["alamat perusahaan"], 300, "Jl. Raya Industri No. 5");
text_rule!(KECAMATAN, "kecamatan", "Kecamatan", ["kd_kec", "nm_kec", "kode kecamatan"], 100, "010");
text_rule!(DESA, "desa", "Desa", ["kd_desa", "nm_desa", "kelurahan", "desa/kelurahan"], 100, "001");
text_rule!(LOKASI, "lokasi", "Lokasi", ["kd_lok", "lokasi perusahaan"], 100, "Kawasan Industri");
text_rule!(TENAGA_KERJA, "tenaga_kerja", "Tenaga Kerja", ["kd_tkerja", "tkerja"], 100, "20-99 orang");
text_rule!(INVESTASI, "investasi", "Investasi", ["kd_investasi"], 100, "1-5 Miliar");
text_rule!(OMSET, "omset", "Omset", ["kd_omset", "omzet"], 100, "2-50 Miliar");
text_rule!(NAMA_CP, "nama_cp", "Nama CP", ["contact person", "cp"], 100, "Siti Aminah");
text_rule!(JABATAN_CP, "jabatan_cp", "Jabatan CP", ["jabatan"], 100, "Manajer HRD");
text_rule!(WEBSITE, "website", "Website", ["web", "situs"], 200, "www.majujaya.co.id");
text_rule!(PRODUK, "produk", "Produk", ["produk utama"], 300, "Tekstil");
text_rule!(KBLI, "kbli", "KBLI", ["kode kbli"], 20, "13111");
text_rule!(KETERANGAN, "keterangan", "Keterangan", ["catatan", "ket"], 500, "Aktif");

pub const KODE_POS: FieldRule = FieldRule {
  field:    "kode_pos",
  label:    "Kode Pos",
  aliases:  &["kodepos"],
  required: false,
  rule:     Rule::Digits { max: 5 },
  example:  "16710",
};

pub const LATITUDE: FieldRule = FieldRule {
  field:    "latitude",
  label:    "Latitude",
  aliases:  &["lat"],
  required: false,
  rule:     Rule::Decimal { min: -90.0, max: 90.0 },
  example:  "-6.5971",
};

pub const LONGITUDE: FieldRule = FieldRule {
  field:    "longitude",
  label:    "Longitude",
  aliases:  &["lon", "lng"],
  required: false,
  rule:     Rule::Decimal { min: -180.0, max: 180.0 },
  example:  "106.8060",
};

pub const JARAK: FieldRule = FieldRule {
  field:    "jarak",
  label:    "Jarak (km)",
  aliases:  &["jarak", "jarak km"],
  required: false,
  rule:     Rule::Decimal { min: 0.0, max: 10_000.0 },
  example:  "12.5",
};

pub const TELP_PERUSAHAAN: FieldRule = FieldRule {
  field:    "telp_perusahaan",
  label:    "Telepon",
  aliases:  &["telp_perusahaan", "telp", "no telp"],
  required: false,
  rule:     Rule::Digits { max: 15 },
  example:  "0251234567",
};

pub const EMAIL_PERUSAHAAN: FieldRule = FieldRule {
  field:    "email_perusahaan",
  label:    "Email",
  aliases:  &["email_perusahaan", "e-mail"],
  required: false,
  rule:     Rule::Email,
  example:  "info@majujaya.co.id",
};

pub const PCL_UTAMA: FieldRule = FieldRule {
  field:    "pcl_utama",
  label:    "PCL Utama",
  aliases:  &["nama pcl", "pcl"],
  required: false,
  rule:     Rule::Text { min: 2, max: 100, identity: true },
  example:  "Budi Santoso",
};

pub const TAHUN_DIREKTORI: FieldRule = FieldRule {
  field:    "tahun_direktori",
  label:    "Tahun Direktori",
  aliases:  &["tahun", "direktori"],
  required: false,
  rule:     Rule::Years,
  example:  "2023,2024",
};

pub const IMPORT_RULES: &[FieldRule] = &[
  KIP,
  NAMA_PERUSAHAAN,
  BADAN_USAHA,
  ALAMAT,
  KECAMATAN,
  DESA,
  KODE_POS,
  LATITUDE,
  LONGITUDE,
  JARAK,
  LOKASI,
  TENAGA_KERJA,
  INVESTASI,
  OMSET,
  NAMA_CP,
  JABATAN_CP,
  TELP_PERUSAHAAN,
  EMAIL_PERUSAHAAN,
  WEBSITE,
  PRODUK,
  KBLI,
  KETERANGAN,
  PCL_UTAMA,
  TAHUN_DIREKTORI,
];

impl Validate for NewCompany {
  fn errors(&self) -> Vec<RowError> {
    let mut errors = Vec::new();
    let decimal = |v: Option<f64>| v.map(|n| n.to_string());

    KIP.check_into(Some(&self.kip), &mut errors);
    NAMA_PERUSAHAAN.check_into(Some(&self.nama_perusahaan), &mut errors);
    ALAMAT.check_into(self.alamat.as_deref(), &mut errors);
    KODE_POS.check_into(self.kode_pos.as_deref(), &mut errors);
    LATITUDE.check_into(decimal(self.latitude).as_deref(), &mut errors);
    LONGITUDE.check_into(decimal(self.longitude).as_deref(), &mut errors);
    JARAK.check_into(decimal(self.jarak).as_deref(), &mut errors);
    NAMA_CP.check_into(self.nama_cp.as_deref(), &mut errors);
    JABATAN_CP.check_into(self.jabatan_cp.as_deref(), &mut errors);
    TELP_PERUSAHAAN.check_into(self.telp_perusahaan.as_deref(), &mut errors);
    EMAIL_PERUSAHAAN.check_into(self.email_perusahaan.as_deref(), &mut errors);
    WEBSITE.check_into(self.website.as_deref(), &mut errors);
    PRODUK.check_into(self.produk.as_deref(), &mut errors);
    KBLI.check_into(self.kbli.as_deref(), &mut errors);
    KETERANGAN.check_into(self.keterangan.as_deref(), &mut errors);
    errors
  }
}

impl Keyed for NewCompany {
  const KEY: &'static UniqueKey = &COMPANY_KEY;

  fn key_values(&self) -> Vec<KeyValue> { vec![self.kip.as_str().into()] }
}

impl Keyed for CompanyImport {
  const KEY: &'static UniqueKey = &COMPANY_KEY;

  fn key_values(&self) -> Vec<KeyValue> { self.company.key_values() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn completion_boundaries() {
    assert_eq!(CompletionLevel::from_counts(0, 0), CompletionLevel::Belum);
    assert_eq!(CompletionLevel::from_counts(4, 5), CompletionLevel::Tinggi);
    assert_eq!(CompletionLevel::from_counts(5, 5), CompletionLevel::Tinggi);
    // 79.999 %
    assert_eq!(CompletionLevel::from_counts(79_999, 100_000), CompletionLevel::Sedang);
    assert_eq!(CompletionLevel::from_counts(1, 2), CompletionLevel::Sedang);
    assert_eq!(CompletionLevel::from_counts(0, 3), CompletionLevel::Rendah);
  }

  #[test]
  fn completion_level_names() {
    assert_eq!(CompletionLevel::Tinggi.as_ref(), "tinggi");
    assert_eq!("TINGGI".parse::<CompletionLevel>().unwrap(), CompletionLevel::Tinggi);
  }

  #[test]
  fn company_validation_collects_all_errors() {
    let company = NewCompany {
      kip: String::new(),
      nama_perusahaan: "CV <script>".into(),
      email_perusahaan: Some("not-an-email".into()),
      latitude: Some(123.0),
      ..NewCompany::default()
    };
    let fields: Vec<_> = company
      .errors()
      .into_iter()
      .filter_map(|e| e.field)
      .collect();
    assert_eq!(fields, vec!["kip", "nama_perusahaan", "latitude", "email_perusahaan"]);
  }
}
