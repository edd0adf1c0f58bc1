//! SQL schema for the Direktori IBS SQLite store.
//!
//! Executed once at connection startup. Bracket lookup tables are seeded
//! here; sub-districts and villages are loaded separately from the region
//! file.

use ibs_core::validate::normalize_key;
use rusqlite::{Connection, functions::FunctionFlags, types::ValueRef};

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` and
/// `INSERT OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS kecamatan (
    kd_kec TEXT PRIMARY KEY,
    nm_kec TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS desa (
    kd_kec  TEXT NOT NULL,
    kd_desa TEXT NOT NULL,
    nm_desa TEXT NOT NULL,
    PRIMARY KEY (kd_kec, kd_desa)
);

CREATE TABLE IF NOT EXISTS badan_usaha (
    kd_badan_usaha  TEXT PRIMARY KEY,
    ket_badan_usaha TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lokasi (
    kd_lok  TEXT PRIMARY KEY,
    ket_lok TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tenaga_kerja (
    kd_tkerja  TEXT PRIMARY KEY,
    ket_tkerja TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS investasi (
    kd_investasi  TEXT PRIMARY KEY,
    ket_investasi TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS omset (
    kd_omset  TEXT PRIMARY KEY,
    ket_omset TEXT NOT NULL
);

-- Field workers. (nama_pcl, status_pcl) is unique after trim + case-fold,
-- enforced by the store.
CREATE TABLE IF NOT EXISTS pcl (
    id_pcl     INTEGER PRIMARY KEY AUTOINCREMENT,
    nama_pcl   TEXT NOT NULL,
    status_pcl TEXT NOT NULL,   -- 'Mitra' | 'Staff'
    telp_pcl   TEXT
);

CREATE TABLE IF NOT EXISTS survei (
    id_survei   INTEGER PRIMARY KEY AUTOINCREMENT,
    nama_survei TEXT NOT NULL,
    fungsi      TEXT NOT NULL,
    periode     TEXT NOT NULL,
    tahun       INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS perusahaan (
    id_perusahaan    INTEGER PRIMARY KEY AUTOINCREMENT,
    kip              TEXT NOT NULL,
    nama_perusahaan  TEXT NOT NULL,
    kd_badan_usaha   TEXT,
    alamat           TEXT,
    kd_kec           TEXT,
    kd_desa          TEXT,
    kode_pos         TEXT,
    latitude         REAL,
    longitude        REAL,
    jarak            REAL,              -- km to the statistics office
    kd_lok           TEXT,
    kd_tkerja        TEXT,
    kd_investasi     TEXT,
    kd_omset         TEXT,
    nama_cp          TEXT,
    jabatan_cp       TEXT,
    telp_perusahaan  TEXT,
    email_perusahaan TEXT,
    website          TEXT,
    produk           TEXT,
    kbli             TEXT,
    keterangan       TEXT,
    pcl_utama        INTEGER REFERENCES pcl(id_pcl)
);

-- Directory membership is owned by the company.
CREATE TABLE IF NOT EXISTS direktori (
    id_direktori  INTEGER PRIMARY KEY AUTOINCREMENT,
    id_perusahaan INTEGER NOT NULL REFERENCES perusahaan(id_perusahaan) ON DELETE CASCADE,
    thn_direktori INTEGER NOT NULL,
    UNIQUE (id_perusahaan, thn_direktori)
);

CREATE TABLE IF NOT EXISTS riwayat_survei (
    id_riwayat    INTEGER PRIMARY KEY AUTOINCREMENT,
    id_survei     INTEGER NOT NULL REFERENCES survei(id_survei),
    id_perusahaan INTEGER NOT NULL REFERENCES perusahaan(id_perusahaan),
    id_pcl        INTEGER REFERENCES pcl(id_pcl),
    selesai       TEXT NOT NULL,   -- 'Iya' | 'Tidak'
    ket_survei    TEXT
);

CREATE INDEX IF NOT EXISTS perusahaan_kip_idx    ON perusahaan(kip);
CREATE INDEX IF NOT EXISTS perusahaan_kec_idx    ON perusahaan(kd_kec, kd_desa);
CREATE INDEX IF NOT EXISTS perusahaan_pcl_idx    ON perusahaan(pcl_utama);
CREATE INDEX IF NOT EXISTS direktori_tahun_idx   ON direktori(thn_direktori);
CREATE INDEX IF NOT EXISTS riwayat_survei_idx    ON riwayat_survei(id_survei, id_perusahaan);
CREATE INDEX IF NOT EXISTS riwayat_perusahaan_idx ON riwayat_survei(id_perusahaan);
CREATE INDEX IF NOT EXISTS riwayat_pcl_idx       ON riwayat_survei(id_pcl);

INSERT OR IGNORE INTO badan_usaha (kd_badan_usaha, ket_badan_usaha) VALUES
    ('1', 'Perseroan Terbatas (PT)'),
    ('2', 'Persekutuan Komanditer (CV)'),
    ('3', 'Firma'),
    ('4', 'Koperasi'),
    ('5', 'Yayasan'),
    ('6', 'BUMN/BUMD'),
    ('7', 'Perorangan'),
    ('8', 'Lainnya');

INSERT OR IGNORE INTO lokasi (kd_lok, ket_lok) VALUES
    ('1', 'Kawasan Industri'),
    ('2', 'Luar Kawasan Industri');

INSERT OR IGNORE INTO tenaga_kerja (kd_tkerja, ket_tkerja) VALUES
    ('1', '20-99 orang'),
    ('2', '100-499 orang'),
    ('3', '500 orang atau lebih');

INSERT OR IGNORE INTO investasi (kd_investasi, ket_investasi) VALUES
    ('1', 'Kurang dari 1 Miliar'),
    ('2', '1-5 Miliar'),
    ('3', '5-10 Miliar'),
    ('4', 'Lebih dari 10 Miliar');

INSERT OR IGNORE INTO omset (kd_omset, ket_omset) VALUES
    ('1', 'Kurang dari 2 Miliar'),
    ('2', '2-50 Miliar'),
    ('3', 'Lebih dari 50 Miliar');

PRAGMA user_version = 1;
";

/// Register `fold(x)`: trim plus Unicode lowercase, the normalisation key
/// values get on the Rust side. SQLite's `LOWER` and `TRIM` only handle ASCII
/// letters and spaces, so every case-insensitive comparison goes through this.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "fold",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      Ok(match ctx.get_raw(0) {
        ValueRef::Text(bytes) => Some(normalize_key(&String::from_utf8_lossy(bytes))),
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
      })
    },
  )
}
