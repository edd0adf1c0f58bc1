//! List-query parameters shared by every list and export endpoint.
//!
//! A [`ListQuery`] is backend-neutral: it carries raw filter values and sort
//! directives exactly as the client sent them. Backends decide which filter
//! names and sort columns they honour.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Filter value meaning "no filter".
pub const ALL: &str = "all";

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Ascending,
  Descending,
}

impl SortDirection {
  /// Lenient parse: `descending`/`desc` (any case) is descending, anything
  /// else is ascending.
  pub fn parse(s: &str) -> Self {
    match s.trim().to_ascii_lowercase().as_str() {
      "descending" | "desc" => Self::Descending,
      _ => Self::Ascending,
    }
  }

  pub fn as_sql(self) -> &'static str {
    match self {
      Self::Ascending => "ASC",
      Self::Descending => "DESC",
    }
  }
}

/// One `sort[i][column]` / `sort[i][direction]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
  pub column:    String,
  pub direction: SortDirection,
}

impl SortSpec {
  pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
    Self { column: column.into(), direction }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
  pub search:  Option<String>,
  pub filters: BTreeMap<String, String>,
  pub sorts:   Vec<SortSpec>,
  pub page:    u32,
  pub limit:   u32,
}

impl Default for ListQuery {
  fn default() -> Self {
    Self {
      search:  None,
      filters: BTreeMap::new(),
      sorts:   Vec::new(),
      page:    DEFAULT_PAGE,
      limit:   DEFAULT_LIMIT,
    }
  }
}

impl ListQuery {
  /// Build a query from decoded query-string pairs.
  ///
  /// `search`, `page` and `limit` are reserved; `sort[i][column]` and
  /// `sort[i][direction]` are collected in index order; every other pair is a
  /// named filter. `limit` is capped at `max_limit`.
  pub fn from_pairs<I>(pairs: I, max_limit: u32) -> Self
  where
    I: IntoIterator<Item = (String, String)>,
  {
    let mut query = Self::default();
    let mut sorts: BTreeMap<usize, (Option<String>, Option<String>)> =
      BTreeMap::new();

    for (key, value) in pairs {
      match key.as_str() {
        "search" => {
          let term = value.trim();
          query.search = (!term.is_empty()).then(|| term.to_owned());
        }
        "page" => query.page = positive_or(&value, DEFAULT_PAGE),
        "limit" => query.limit = positive_or(&value, DEFAULT_LIMIT),
        _ => {
          if let Some((index, attr)) = parse_sort_key(&key) {
            let slot = sorts.entry(index).or_default();
            match attr {
              "column" => slot.0 = Some(value),
              "direction" => slot.1 = Some(value),
              _ => {}
            }
          } else {
            query.filters.insert(key, value);
          }
        }
      }
    }

    query.limit = query.limit.min(max_limit.max(1));
    query.sorts = sorts
      .into_values()
      .filter_map(|(column, direction)| {
        let column = column?.trim().to_owned();
        if column.is_empty() {
          return None;
        }
        let direction = direction
          .as_deref()
          .map(SortDirection::parse)
          .unwrap_or_default();
        Some(SortSpec { column, direction })
      })
      .collect();
    query
  }

  /// The trimmed search term, if any.
  pub fn search_term(&self) -> Option<&str> {
    self
      .search
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
  }

  /// A filter value, or `None` when absent, blank or [`ALL`].
  pub fn filter(&self, name: &str) -> Option<&str> {
    self
      .filters
      .get(name)
      .map(|v| v.trim())
      .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
  }

  /// Active filters in name order, skipping blanks and [`ALL`].
  pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .filters
      .keys()
      .filter_map(|k| self.filter(k).map(|v| (k.as_str(), v)))
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
  }

  pub fn with_filter(mut self, name: &str, value: impl Into<String>) -> Self {
    self.filters.insert(name.to_owned(), value.into());
    self
  }

  pub fn with_sort(mut self, column: &str, direction: SortDirection) -> Self {
    self.sorts.push(SortSpec::new(column, direction));
    self
  }
}

fn positive_or(value: &str, default: u32) -> u32 {
  value
    .trim()
    .parse::<u32>()
    .ok()
    .filter(|v| *v >= 1)
    .unwrap_or(default)
}

/// `sort[3][column]` → `(3, "column")`.
fn parse_sort_key(key: &str) -> Option<(usize, &str)> {
  let rest = key.strip_prefix("sort[")?;
  let (index, rest) = rest.split_once("][")?;
  let attr = rest.strip_suffix(']')?;
  Some((index.parse().ok()?, attr))
}

// ─── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  pub page:        u32,
  pub limit:       u32,
  pub total:       u64,
  #[serde(rename = "totalPages")]
  pub total_pages: u64,
}

/// One page of list results plus the unpaginated total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
  pub data:       Vec<T>,
  pub pagination: Pagination,
}

impl<T> Paginated<T> {
  pub fn new(data: Vec<T>, total: u64, query: &ListQuery) -> Self {
    let limit = u64::from(query.limit.max(1));
    Self {
      data,
      pagination: Pagination {
        page:        query.page,
        limit:       query.limit,
        total,
        total_pages: total.div_ceil(limit),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
      .iter()
      .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
      .collect()
  }

  #[test]
  fn defaults_apply_for_missing_or_bad_paging() {
    let q = ListQuery::from_pairs(pairs(&[("page", "0"), ("limit", "abc")]), 100);
    assert_eq!(q.page, 1);
    assert_eq!(q.limit, 10);
    assert_eq!(q.offset(), 0);

    let q = ListQuery::from_pairs(pairs(&[("page", "-3")]), 100);
    assert_eq!(q.page, 1);
  }

  #[test]
  fn limit_is_capped() {
    let q = ListQuery::from_pairs(pairs(&[("limit", "5000")]), 100);
    assert_eq!(q.limit, 100);
  }

  #[test]
  fn sorts_follow_index_order() {
    let q = ListQuery::from_pairs(
      pairs(&[
        ("sort[1][column]", "kip"),
        ("sort[0][column]", "nama_perusahaan"),
        ("sort[0][direction]", "descending"),
        ("sort[1][direction]", "sideways"),
      ]),
      100,
    );
    assert_eq!(q.sorts, vec![
      SortSpec::new("nama_perusahaan", SortDirection::Descending),
      SortSpec::new("kip", SortDirection::Ascending),
    ]);
  }

  #[test]
  fn sort_without_column_is_dropped() {
    let q = ListQuery::from_pairs(pairs(&[("sort[0][direction]", "desc")]), 100);
    assert!(q.sorts.is_empty());
  }

  #[test]
  fn all_and_blank_filters_are_inactive() {
    let q = ListQuery::from_pairs(
      pairs(&[("status", "all"), ("kec", " "), ("tahun", "2024")]),
      100,
    );
    assert_eq!(q.filter("status"), None);
    assert_eq!(q.filter("kec"), None);
    assert_eq!(q.filter("tahun"), Some("2024"));
    assert_eq!(q.active_filters().collect::<Vec<_>>(), vec![("tahun", "2024")]);
  }

  #[test]
  fn offset_uses_page_and_limit() {
    let q = ListQuery { page: 3, limit: 25, ..ListQuery::default() };
    assert_eq!(q.offset(), 50);
  }

  #[test]
  fn total_pages_rounds_up() {
    let q = ListQuery { limit: 10, ..ListQuery::default() };
    let p = Paginated::new(Vec::<()>::new(), 21, &q);
    assert_eq!(p.pagination.total_pages, 3);
    let p = Paginated::new(Vec::<()>::new(), 0, &q);
    assert_eq!(p.pagination.total_pages, 0);

    let json = serde_json::to_value(&p.pagination).unwrap();
    assert!(json.get("totalPages").is_some());
  }
}
