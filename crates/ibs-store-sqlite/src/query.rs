//! The list query builder.
//!
//! Each resource declares one static [`Resource`] table: its select list, its
//! denormalised `FROM`, and the search columns, filters and sort keys it
//! honours. A [`ListQuery`] is turned into a data statement and a count
//! statement that share the same `WHERE` clause and bound values. Column and
//! direction tokens only ever come from these tables.

use ibs_core::{query::ListQuery, validate::normalize_key};
use rusqlite::{Connection, Row, types::Value};

use crate::{Result, encode::company_columns};

/// How a named filter becomes a predicate.
pub enum Filter {
  /// `expr = ?`
  Eq(&'static str),
  /// Equality after trim + case-fold on both sides.
  Folded(&'static str),
  /// `expr IN (...)` over a comma-separated value.
  In(&'static str),
  /// Integer equality; a non-numeric value matches nothing.
  Int(&'static str),
  /// A predicate with a single `?` bound to the value.
  Predicate(&'static str),
  /// Fixed predicates selected by value; an unknown value matches nothing.
  Choice(&'static [(&'static str, &'static str)]),
}

pub struct Resource {
  pub columns:      &'static str,
  pub from:         &'static str,
  pub id_column:    &'static str,
  pub search:       &'static [&'static str],
  pub filters:      &'static [(&'static str, Filter)],
  pub sorts:        &'static [(&'static str, &'static str)],
  pub default_sort: &'static str,
}

/// SQL text plus its positional parameters.
#[derive(Debug)]
pub struct Statement {
  pub sql:    String,
  pub params: Vec<Value>,
}

const NOTHING: &str = "1 = 0";

/// Fold `term` and escape `%`, `_` and `\` for a `LIKE … ESCAPE '\'`
/// pattern matched against `fold(column)`.
pub fn like_pattern(term: &str) -> String {
  let mut escaped = String::with_capacity(term.len() + 2);
  escaped.push('%');
  for c in normalize_key(term).chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

impl Resource {
  fn where_clause(&self, query: &ListQuery) -> (String, Vec<Value>) {
    let mut conds: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(term) = query.search_term() {
      let pattern = like_pattern(term);
      let ors: Vec<String> = self
        .search
        .iter()
        .map(|col| {
          params.push(Value::Text(pattern.clone()));
          format!("fold(COALESCE({col}, '')) LIKE ? ESCAPE '\\'")
        })
        .collect();
      conds.push(format!("({})", ors.join(" OR ")));
    }

    for (name, filter) in self.filters {
      let Some(value) = query.filter(name) else {
        continue;
      };
      match filter {
        Filter::Eq(expr) => {
          conds.push(format!("{expr} = ?"));
          params.push(Value::Text(value.to_owned()));
        }
        Filter::Folded(expr) => {
          conds.push(format!("fold({expr}) = ?"));
          params.push(Value::Text(normalize_key(value)));
        }
        Filter::In(expr) => {
          let values: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
          if values.is_empty() {
            continue;
          }
          conds.push(format!(
            "{expr} IN ({})",
            crate::encode::placeholders(values.len())
          ));
          params.extend(values.into_iter().map(|v| Value::Text(v.to_owned())));
        }
        Filter::Int(expr) => match value.parse::<i64>() {
          Ok(n) => {
            conds.push(format!("{expr} = ?"));
            params.push(Value::Integer(n));
          }
          Err(_) => conds.push(NOTHING.to_owned()),
        },
        Filter::Predicate(sql) => {
          conds.push(format!("({sql})"));
          params.push(Value::Text(value.to_owned()));
        }
        Filter::Choice(options) => {
          let predicate = options
            .iter()
            .find(|(v, _)| v.eq_ignore_ascii_case(value))
            .map_or(NOTHING, |(_, sql)| *sql);
          conds.push(format!("({predicate})"));
        }
      }
    }

    let clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    (clause, params)
  }

  /// Requested sorts that name a known key, then the default order, then the
  /// primary key so every page boundary is stable.
  fn order_by(&self, query: &ListQuery) -> String {
    let keys: Vec<String> = query
      .sorts
      .iter()
      .filter_map(|s| {
        self
          .sorts
          .iter()
          .find(|(name, _)| *name == s.column)
          .map(|(_, expr)| format!("{expr} {}", s.direction.as_sql()))
      })
      .collect();

    let primary = if keys.is_empty() {
      self.default_sort.to_owned()
    } else {
      keys.join(", ")
    };
    format!("ORDER BY {primary}, {} ASC", self.id_column)
  }

  /// Data statement; `paged` adds `LIMIT`/`OFFSET`.
  pub fn select(&self, query: &ListQuery, paged: bool) -> Statement {
    let (clause, mut params) = self.where_clause(query);
    let mut sql = format!(
      "SELECT {} FROM {} {clause} {}",
      self.columns,
      self.from,
      self.order_by(query)
    );
    if paged {
      sql.push_str(" LIMIT ? OFFSET ?");
      params.push(Value::Integer(i64::from(query.limit)));
      params.push(Value::Integer(i64::try_from(query.offset()).unwrap_or(i64::MAX)));
    }
    Statement { sql, params }
  }

  /// Count over the same `WHERE` as [`Resource::select`].
  pub fn count(&self, query: &ListQuery) -> Statement {
    let (clause, params) = self.where_clause(query);
    Statement {
      sql: format!("SELECT COUNT(*) FROM {} {clause}", self.from),
      params,
    }
  }

  /// One row by primary key.
  pub fn by_id(&self, id: i64) -> Statement {
    Statement {
      sql:    format!(
        "SELECT {} FROM {} WHERE {} = ?",
        self.columns, self.from, self.id_column
      ),
      params: vec![Value::Integer(id)],
    }
  }
}

impl Statement {
  pub fn query<T>(
    &self,
    conn: &Connection,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(&self.sql)?;
    let rows = stmt
      .query_map(rusqlite::params_from_iter(self.params.iter()), map)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  pub fn count(&self, conn: &Connection) -> Result<u64> {
    let n: i64 = conn.query_row(
      &self.sql,
      rusqlite::params_from_iter(self.params.iter()),
      |row| row.get(0),
    )?;
    Ok(u64::try_from(n).unwrap_or(0))
  }
}

// ─── Resources ───────────────────────────────────────────────────────────────

pub static FIELD_WORKERS: Resource = Resource {
  columns:      "pc.id_pcl, pc.nama_pcl, pc.status_pcl, pc.telp_pcl, COALESCE(rc.jumlah, 0)",
  from:         "pcl pc
    LEFT JOIN (SELECT id_pcl, COUNT(*) AS jumlah FROM riwayat_survei
               WHERE id_pcl IS NOT NULL GROUP BY id_pcl) rc ON rc.id_pcl = pc.id_pcl",
  id_column:    "pc.id_pcl",
  search:       &["pc.nama_pcl", "pc.telp_pcl"],
  filters:      &[("status", Filter::Folded("pc.status_pcl"))],
  sorts:        &[
    ("nama_pcl", "pc.nama_pcl COLLATE NOCASE"),
    ("status_pcl", "pc.status_pcl"),
    ("telp_pcl", "pc.telp_pcl"),
    ("jumlah_survei", "COALESCE(rc.jumlah, 0)"),
  ],
  default_sort: "pc.nama_pcl COLLATE NOCASE ASC",
};

pub static SURVEYS: Resource = Resource {
  columns:      "s.id_survei, s.nama_survei, s.fungsi, s.periode, s.tahun, \
                 COALESCE(rc.jumlah, 0), COALESCE(rc.selesai, 0)",
  from:         "survei s
    LEFT JOIN (SELECT id_survei, COUNT(*) AS jumlah, SUM(selesai = 'Iya') AS selesai
               FROM riwayat_survei GROUP BY id_survei) rc ON rc.id_survei = s.id_survei",
  id_column:    "s.id_survei",
  search:       &["s.nama_survei", "s.fungsi", "s.periode"],
  filters:      &[
    ("fungsi", Filter::Folded("s.fungsi")),
    ("periode", Filter::Folded("s.periode")),
    ("tahun", Filter::Int("s.tahun")),
  ],
  sorts:        &[
    ("nama_survei", "s.nama_survei COLLATE NOCASE"),
    ("fungsi", "s.fungsi COLLATE NOCASE"),
    ("periode", "s.periode COLLATE NOCASE"),
    ("tahun", "s.tahun"),
    ("jumlah_perusahaan", "COALESCE(rc.jumlah, 0)"),
  ],
  default_sort: "s.tahun DESC, s.nama_survei COLLATE NOCASE ASC",
};

pub static HISTORY: Resource = Resource {
  columns:      "r.id_riwayat, r.id_survei, r.id_perusahaan, r.id_pcl, r.selesai, \
                 r.ket_survei, s.nama_survei, s.fungsi, s.periode, s.tahun, p.kip, \
                 p.nama_perusahaan, pc.nama_pcl",
  from:         "riwayat_survei r
    JOIN survei s ON s.id_survei = r.id_survei
    JOIN perusahaan p ON p.id_perusahaan = r.id_perusahaan
    LEFT JOIN pcl pc ON pc.id_pcl = r.id_pcl",
  id_column:    "r.id_riwayat",
  search:       &["p.kip", "p.nama_perusahaan", "s.nama_survei", "pc.nama_pcl", "r.ket_survei"],
  filters:      &[
    ("survei", Filter::Int("r.id_survei")),
    ("perusahaan", Filter::Int("r.id_perusahaan")),
    ("tahun", Filter::Int("s.tahun")),
    ("selesai", Filter::Folded("r.selesai")),
    ("pcl", Filter::Folded("pc.nama_pcl")),
    ("fungsi", Filter::Folded("s.fungsi")),
  ],
  sorts:        &[
    ("nama_survei", "s.nama_survei COLLATE NOCASE"),
    ("tahun", "s.tahun"),
    ("kip", "p.kip"),
    ("nama_perusahaan", "p.nama_perusahaan COLLATE NOCASE"),
    ("nama_pcl", "pc.nama_pcl COLLATE NOCASE"),
    ("selesai", "r.selesai"),
  ],
  default_sort: "s.tahun DESC, p.nama_perusahaan COLLATE NOCASE ASC",
};

/// Survey completion over a company's history rows, as computed in the
/// `rs` subquery of [`COMPANIES`].
const COMPANY_STATUS: &[(&str, &str)] = &[
  ("tinggi", "rs.total > 0 AND rs.selesai * 100 >= rs.total * 80"),
  (
    "sedang",
    "rs.total > 0 AND rs.selesai * 100 >= rs.total * 50 AND rs.selesai * 100 < rs.total * 80",
  ),
  ("rendah", "rs.total > 0 AND rs.selesai * 100 < rs.total * 50"),
  ("belum", "rs.total IS NULL"),
];

pub static COMPANIES: Resource = Resource {
  columns:      concat!(
    company_columns!(),
    ", k.nm_kec, d.nm_desa, bu.ket_badan_usaha, l.ket_lok, tk.ket_tkerja, \
     i.ket_investasi, o.ket_omset, pc.nama_pcl, dy.tahun, \
     COALESCE(rs.total, 0), COALESCE(rs.selesai, 0)"
  ),
  from:         "perusahaan p
    LEFT JOIN kecamatan k     ON k.kd_kec = p.kd_kec
    LEFT JOIN desa d          ON d.kd_kec = p.kd_kec AND d.kd_desa = p.kd_desa
    LEFT JOIN badan_usaha bu  ON bu.kd_badan_usaha = p.kd_badan_usaha
    LEFT JOIN lokasi l        ON l.kd_lok = p.kd_lok
    LEFT JOIN tenaga_kerja tk ON tk.kd_tkerja = p.kd_tkerja
    LEFT JOIN investasi i     ON i.kd_investasi = p.kd_investasi
    LEFT JOIN omset o         ON o.kd_omset = p.kd_omset
    LEFT JOIN pcl pc          ON pc.id_pcl = p.pcl_utama
    LEFT JOIN (SELECT id_perusahaan, COUNT(*) AS total, SUM(selesai = 'Iya') AS selesai
               FROM riwayat_survei GROUP BY id_perusahaan) rs
           ON rs.id_perusahaan = p.id_perusahaan
    LEFT JOIN (SELECT id_perusahaan, GROUP_CONCAT(thn_direktori) AS tahun
               FROM direktori GROUP BY id_perusahaan) dy
           ON dy.id_perusahaan = p.id_perusahaan",
  id_column:    "p.id_perusahaan",
  search:       &[
    "p.kip",
    "p.nama_perusahaan",
    "p.alamat",
    "k.nm_kec",
    "d.nm_desa",
    "p.produk",
  ],
  filters:      &[
    ("kec", Filter::Eq("p.kd_kec")),
    ("desa", Filter::Eq("p.kd_desa")),
    ("badan_usaha", Filter::In("p.kd_badan_usaha")),
    ("lok", Filter::In("p.kd_lok")),
    ("tkerja", Filter::In("p.kd_tkerja")),
    ("investasi", Filter::In("p.kd_investasi")),
    ("omset", Filter::In("p.kd_omset")),
    (
      "pcl",
      Filter::Predicate(
        "p.pcl_utama IN (SELECT id_pcl FROM pcl WHERE fold(nama_pcl) = fold(?))",
      ),
    ),
    (
      "tahun",
      Filter::Predicate(
        "EXISTS (SELECT 1 FROM direktori dr WHERE dr.id_perusahaan = p.id_perusahaan \
         AND dr.thn_direktori = CAST(? AS INTEGER))",
      ),
    ),
    ("status", Filter::Choice(COMPANY_STATUS)),
  ],
  sorts:        &[
    ("kip", "p.kip"),
    ("nama_perusahaan", "p.nama_perusahaan COLLATE NOCASE"),
    ("kecamatan", "k.nm_kec COLLATE NOCASE"),
    ("desa", "d.nm_desa COLLATE NOCASE"),
    ("badan_usaha", "bu.ket_badan_usaha"),
    ("tkerja", "p.kd_tkerja"),
    ("pcl", "pc.nama_pcl COLLATE NOCASE"),
    (
      "persen_selesai",
      "CASE WHEN rs.total > 0 THEN rs.selesai * 1.0 / rs.total END",
    ),
    ("jumlah_survei", "COALESCE(rs.total, 0)"),
  ],
  default_sort: "p.nama_perusahaan COLLATE NOCASE ASC",
};
