//! Field rules shared by form submissions and spreadsheet imports.
//!
//! A [`FieldRule`] checks one raw text value and returns its normalised form
//! (trimmed; enum values in canonical spelling). Errors are reported as
//! [`RowError`]s, which carry the spreadsheet row number when the value came
//! from an import.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Characters rejected in identity fields such as names.
pub const DANGEROUS_CHARS: &[char] =
  &['<', '>', '"', '\'', '&', ';', '(', ')', '{', '}', '[', ']'];

/// Trim and case-fold a key value before comparison.
pub fn normalize_key(s: &str) -> String { s.trim().to_lowercase() }

// ─── Errors ──────────────────────────────────────────────────────────────────

/// One failed check: which row (for imports), which field, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub row:     Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field:   Option<String>,
  pub message: String,
}

impl RowError {
  pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { row: None, field: Some(field.into()), message: message.into() }
  }

  pub fn at_row(mut self, row: usize) -> Self {
    self.row = Some(row);
    self
  }
}

/// Records that can check themselves before a write.
pub trait Validate {
  fn errors(&self) -> Vec<RowError>;

  fn validate(&self) -> Result<()> {
    let errors = self.errors();
    if errors.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation(errors))
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum Rule {
  /// Free text with length bounds (in characters). `identity` fields also
  /// reject [`DANGEROUS_CHARS`].
  Text { min: usize, max: usize, identity: bool },
  /// Digits only, at most `max` of them.
  Digits { max: usize },
  /// One of a fixed set, matched case-insensitively.
  Choice(&'static [&'static str]),
  Integer { min: i64, max: i64 },
  Decimal { min: f64, max: f64 },
  Email,
  /// Comma-separated list of years.
  Years,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
  /// Canonical field name (also the JSON / column name).
  pub field:    &'static str,
  /// Spreadsheet header label.
  pub label:    &'static str,
  /// Extra header spellings accepted on import.
  pub aliases:  &'static [&'static str],
  pub required: bool,
  pub rule:     Rule,
  pub example:  &'static str,
}

pub const MIN_YEAR: i64 = 2000;
pub const MAX_YEAR: i64 = 2100;

impl FieldRule {
  /// Check a raw value. Returns the normalised value, `None` for an allowed
  /// blank, or a human-readable message.
  pub fn check(&self, raw: Option<&str>) -> std::result::Result<Option<String>, String> {
    let value = match raw.map(str::trim).filter(|s| !s.is_empty()) {
      Some(v) => v,
      None if self.required => return Err(format!("{} is required", self.label)),
      None => return Ok(None),
    };

    match self.rule {
      Rule::Text { min, max, identity } => {
        let len = value.chars().count();
        if len < min || len > max {
          return Err(format!(
            "{} must be between {min} and {max} characters",
            self.label
          ));
        }
        if identity && value.contains(DANGEROUS_CHARS) {
          return Err(format!(
            "{} contains forbidden characters (< > \" ' & ; ( ) {{ }} [ ])",
            self.label
          ));
        }
        Ok(Some(value.to_owned()))
      }
      Rule::Digits { max } => {
        if !value.chars().all(|c| c.is_ascii_digit()) {
          return Err(format!("{} must contain digits only", self.label));
        }
        if value.len() > max {
          return Err(format!("{} must be at most {max} digits", self.label));
        }
        Ok(Some(value.to_owned()))
      }
      Rule::Choice(options) => options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(value))
        .map(|o| Some((*o).to_owned()))
        .ok_or_else(|| {
          format!("{} must be one of: {}", self.label, options.join(", "))
        }),
      Rule::Integer { min, max } => match value.parse::<i64>() {
        Ok(n) if (min..=max).contains(&n) => Ok(Some(n.to_string())),
        Ok(_) => Err(format!("{} must be between {min} and {max}", self.label)),
        Err(_) => Err(format!("{} must be a whole number", self.label)),
      },
      Rule::Decimal { min, max } => match value.replace(',', ".").parse::<f64>() {
        Ok(n) if n.is_finite() && n >= min && n <= max => Ok(Some(n.to_string())),
        Ok(_) => Err(format!("{} must be between {min} and {max}", self.label)),
        Err(_) => Err(format!("{} must be a number", self.label)),
      },
      Rule::Email => {
        let valid = value.split_once('@').is_some_and(|(local, domain)| {
          !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
        }) && !value.contains(char::is_whitespace);
        if valid {
          Ok(Some(value.to_owned()))
        } else {
          Err(format!("{} is not a valid email address", self.label))
        }
      }
      Rule::Years => {
        let years = parse_years(value)
          .ok_or_else(|| format!("{} must be a comma-separated list of years", self.label))?;
        if let Some(y) = years.iter().find(|y| !(MIN_YEAR..=MAX_YEAR).contains(*y)) {
          return Err(format!(
            "{} contains {y}, outside {MIN_YEAR}-{MAX_YEAR}",
            self.label
          ));
        }
        Ok(Some(
          years
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(","),
        ))
      }
    }
  }

  /// Check a value and turn a failure into a [`RowError`] on this field.
  pub fn check_into(&self, raw: Option<&str>, errors: &mut Vec<RowError>) {
    if let Err(message) = self.check(raw) {
      errors.push(RowError::field(self.field, message));
    }
  }

  /// Short human description for the template's rules sheet.
  pub fn describe(&self) -> String {
    match self.rule {
      Rule::Text { min, max, identity: true } => {
        format!("Text, {min}-{max} characters, no < > \" ' & ; ( ) {{ }} [ ]")
      }
      Rule::Text { min, max, identity: false } => {
        format!("Text, {min}-{max} characters")
      }
      Rule::Digits { max } => format!("Digits only, max {max}"),
      Rule::Choice(options) => format!("One of: {}", options.join(", ")),
      Rule::Integer { min, max } => format!("Whole number {min}-{max}"),
      Rule::Decimal { min, max } => format!("Number {min} to {max}"),
      Rule::Email => "Email address".to_owned(),
      Rule::Years => "Years separated by commas, e.g. 2023,2024".to_owned(),
    }
  }
}

/// Parse `"2023, 2024"` into sorted, de-duplicated years.
pub fn parse_years(value: &str) -> Option<Vec<i64>> {
  let mut years = value
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| s.parse::<i64>().ok())
    .collect::<Option<Vec<_>>>()?;
  years.sort_unstable();
  years.dedup();
  Some(years)
}
