//! Filesystem implementation of [`BlobStore`].
//!
//! Keys map one-to-one onto paths below a root directory, so
//! `screenshots/1714557600000_demo.png` lives at
//! `<root>/screenshots/1714557600000_demo.png`.

use std::{
  io::ErrorKind,
  path::{Component, Path, PathBuf},
};

use bytes::Bytes;
use showcase_core::blob::{BlobRef, BlobStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid blob key: {0:?}")]
  InvalidKey(String),

  #[error("no object stored under {0:?}")]
  Missing(String),
}

/// Objects stored as plain files under `root`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
  root: PathBuf,
}

impl FsBlobStore {
  /// Open the store, creating `root` if it does not exist.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self, BlobError> {
    let root = root.into();
    tokio::fs::create_dir_all(&root).await?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Resolve `key` below the root. Only plain relative segments are allowed.
  fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
    let relative = Path::new(key);
    let plain = !key.is_empty()
      && !key.contains('\\')
      && relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
      return Err(BlobError::InvalidKey(key.to_owned()));
    }
    Ok(self.root.join(relative))
  }
}

impl BlobStore for FsBlobStore {
  type Error = BlobError;

  async fn put(&self, key: String, data: Bytes) -> Result<BlobRef, BlobError> {
    let path = self.path_for(&key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &data).await?;
    tracing::debug!(%key, bytes = data.len(), "blob written");
    Ok(BlobRef(key))
  }

  async fn get(&self, key: String) -> Result<Option<Bytes>, BlobError> {
    let path = self.path_for(&key)?;
    match tokio::fs::read(&path).await {
      Ok(data) => Ok(Some(Bytes::from(data))),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn delete(&self, key: String) -> Result<(), BlobError> {
    let path = self.path_for(&key)?;
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::Missing(key)),
      Err(e) => Err(e.into()),
    }
  }
}
