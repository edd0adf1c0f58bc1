//! A codec-neutral worksheet: a name, a header row and text cells.

use crate::validate::normalize_key;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
  pub name:    String,
  pub headers: Vec<String>,
  pub rows:    Vec<Vec<String>>,
}

impl Sheet {
  pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
    Self { name: name.into(), headers, rows: Vec::new() }
  }

  pub fn push(&mut self, row: Vec<String>) { self.rows.push(row); }

  /// Index of the first header matching any of `names`, compared with
  /// [`normalize_header`].
  pub fn column(&self, names: &[&str]) -> Option<usize> {
    let wanted: Vec<String> = names.iter().map(|n| normalize_header(n)).collect();
    self
      .headers
      .iter()
      .position(|h| wanted.contains(&normalize_header(h)))
  }

  /// Cell text, empty for short rows.
  pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
  }
}

/// Header comparison form: case-folded, inner whitespace and underscores
/// collapsed to single spaces.
pub fn normalize_header(header: &str) -> String {
  normalize_key(header)
    .split(|c: char| c.is_whitespace() || c == '_')
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// A row with no non-blank cell.
pub fn is_blank(row: &[String]) -> bool { row.iter().all(|c| c.trim().is_empty()) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn headers_match_loosely() {
    let sheet = Sheet::new("Data", vec!["No".into(), "  NAMA   PCL ".into()]);
    assert_eq!(sheet.column(&["nama_pcl"]), Some(1));
    assert_eq!(sheet.column(&["Nama PCL"]), Some(1));
    assert_eq!(sheet.column(&["status"]), None);
  }

  #[test]
  fn short_rows_read_as_blank() {
    let row = vec!["a".to_owned()];
    assert_eq!(Sheet::cell(&row, 3), "");
    assert!(is_blank(&["".into(), "  ".into()]));
  }
}
