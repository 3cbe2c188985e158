//! Field-level validation helpers shared by the form types.
//!
//! Form structs derive [`validator::Validate`]; the custom rules the derive
//! cannot express live here, together with the sanitising helpers every save
//! path applies.

use std::{borrow::Cow, collections::BTreeMap, fmt};

use serde::Serialize;
use url::Url;
use validator::ValidationError;

/// Maximum length of a single tag name.
pub const MAX_TAG_LEN: usize = 50;

// ─── Field errors ────────────────────────────────────────────────────────────

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::default();
    errors.push(field, message);
    errors
  }

  pub fn push(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_owned()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

  pub fn fields(&self) -> impl Iterator<Item = &str> { self.0.keys().map(String::as_str) }

  /// Merge `other` into `self`, keeping messages from both.
  pub fn merge(&mut self, other: FieldErrors) {
    for (field, messages) in other.0 {
      self.0.entry(field).or_default().extend(messages);
    }
  }

  /// `Ok(())` when empty, otherwise the collected errors.
  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let fields: Vec<&str> = self.fields().collect();
    write!(f, "invalid fields: {}", fields.join(", "))
  }
}

impl From<validator::ValidationErrors> for FieldErrors {
  fn from(e: validator::ValidationErrors) -> Self {
    let mut out = FieldErrors::default();
    for (field, errors) in e.field_errors() {
      for error in errors.iter() {
        let message = error
          .message
          .as_ref()
          .map(|m| m.to_string())
          .unwrap_or_else(|| format!("{field} is invalid"));
        out.push(field, message);
      }
    }
    out
  }
}

// ─── Custom rules ────────────────────────────────────────────────────────────

fn rule(code: &'static str, message: &'static str) -> ValidationError {
  ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// A GitHub URL must be an `http(s)` URL whose host is `github.com` or
/// `www.github.com`.
pub fn github_url(value: &str) -> Result<(), ValidationError> {
  let invalid = || rule("github_url", "Invalid GitHub URL");
  let url = Url::parse(value).map_err(|_| invalid())?;
  if !matches!(url.scheme(), "http" | "https") {
    return Err(invalid());
  }
  match url.host_str() {
    Some("github.com" | "www.github.com") => Ok(()),
    _ => Err(invalid()),
  }
}

/// Every tag in a list must be non-empty and at most [`MAX_TAG_LEN`] chars.
pub fn tag_list(tags: &[String]) -> Result<(), ValidationError> {
  if tags.iter().any(|t| t.trim().is_empty()) {
    return Err(rule("tag_empty", "Tags cannot be empty"));
  }
  if tags.iter().any(|t| t.chars().count() > MAX_TAG_LEN) {
    return Err(rule("tag_length", "Tags must be at most 50 characters"));
  }
  Ok(())
}

// ─── Sanitising ──────────────────────────────────────────────────────────────

/// Trim and collapse internal runs of whitespace to a single space.
pub fn collapse_whitespace(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim an optional field; blank values become `None`.
pub fn optional(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// Normalise a tag list: collapse whitespace, drop blanks and drop
/// case-insensitive repeats (first spelling wins).
pub fn tag_set(tags: Vec<String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(tags.len());
  for tag in tags {
    let tag = collapse_whitespace(&tag);
    if tag.is_empty() {
      continue;
    }
    let key = tag.to_lowercase();
    if !out.iter().any(|t| t.to_lowercase() == key) {
      out.push(tag);
    }
  }
  out
}
