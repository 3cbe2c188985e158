//! The `BlobStore` trait: the object-storage half of the backend.
//!
//! Objects live in flat folders under string keys. The portal never stores
//! binary data in the document store, only the [`BlobRef`] keys.

use std::{fmt, future::Future};

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Folder holding submission screenshots.
pub const SCREENSHOT_FOLDER: &str = "screenshots";
/// Folder holding mentor resumes, one sub-folder per user.
pub const MENTOR_FOLDER: &str = "mentors";

/// A reference to a stored object: its key within the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(pub String);

impl BlobRef {
  pub fn key(&self) -> &str { &self.0 }
}

impl fmt::Display for BlobRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Abstraction over an object store.
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Write `data` under `key`, replacing anything already there.
  fn put(
    &self,
    key: String,
    data: Bytes,
  ) -> impl Future<Output = Result<BlobRef, Self::Error>> + Send + '_;

  /// Read the object at `key`. Returns `None` if absent.
  fn get(
    &self,
    key: String,
  ) -> impl Future<Output = Result<Option<Bytes>, Self::Error>> + Send + '_;

  /// Delete the object at `key`. Deleting a missing object is an error.
  fn delete(
    &self,
    key: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Key naming ──────────────────────────────────────────────────────────────

/// Reduce a client-supplied file name to a safe single path segment.
pub fn sanitize_file_name(name: &str) -> String {
  let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
  let cleaned: String = base
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' }
    })
    .collect();
  let cleaned = cleaned.trim_start_matches('.');
  if cleaned.is_empty() { "upload".to_owned() } else { cleaned.to_owned() }
}

/// `screenshots/{millis}_{nonce}_{name}`, where `nonce` is eight hex digits
/// of a fresh v4 UUID so same-name uploads in one millisecond stay apart.
pub fn screenshot_key(file_name: &str) -> String {
  let nonce = Uuid::new_v4().simple().to_string();
  format!(
    "{SCREENSHOT_FOLDER}/{}_{}_{}",
    Utc::now().timestamp_millis(),
    &nonce[..8],
    sanitize_file_name(file_name)
  )
}

/// `mentors/{user_id}/resume_{millis}.{ext}`
pub fn resume_key(user_id: Uuid, file_name: &str) -> String {
  let ext = sanitize_file_name(file_name)
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .unwrap_or_else(|| "bin".to_owned());
  format!(
    "{MENTOR_FOLDER}/{user_id}/resume_{}.{ext}",
    Utc::now().timestamp_millis()
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_names_are_flattened() {
    assert_eq!(sanitize_file_name("shot 1.png"), "shot_1.png");
    assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_file_name("C:\\Users\\me\\pic.JPG"), "pic.JPG");
    assert_eq!(sanitize_file_name(".."), "upload");
    assert_eq!(sanitize_file_name(""), "upload");
  }

  #[test]
  fn screenshot_keys_are_timestamp_prefixed() {
    let key = screenshot_key("demo_v2.png");
    let rest = key.strip_prefix("screenshots/").unwrap();
    let mut parts = rest.splitn(3, '_');
    assert!(parts.next().unwrap().parse::<i64>().is_ok());
    let nonce = parts.next().unwrap();
    assert_eq!(nonce.len(), 8);
    assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(parts.next().unwrap(), "demo_v2.png");
  }

  #[test]
  fn same_name_screenshots_get_distinct_keys() {
    assert_ne!(screenshot_key("image.png"), screenshot_key("image.png"));
  }

  #[test]
  fn resume_keys_keep_extension() {
    let id = Uuid::new_v4();
    let key = resume_key(id, "My CV.PDF");
    assert!(key.starts_with(&format!("mentors/{id}/resume_")));
    assert!(key.ends_with(".pdf"));
  }
}
