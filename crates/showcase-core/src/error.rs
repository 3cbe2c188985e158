//! Error types for `showcase-core`.

use thiserror::Error;

use crate::{application::ApplicationKind, tag::TagCategory, validate::FieldErrors};

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected before any store or blob call was made.
  #[error("validation failed: {0}")]
  Validation(FieldErrors),

  #[error("tag {name:?} already exists in {category}")]
  DuplicateTag { category: TagCategory, name: String },

  #[error("an account already exists for {0}")]
  EmailTaken(String),

  #[error("a {0} application has already been filed by this user")]
  AlreadyApplied(ApplicationKind),

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("{0} not found")]
  NotFound(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("blob storage error: {0}")]
  Blob(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend document-store error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Wrap a backend object-store error.
  pub fn blob<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Blob(Box::new(e))
  }

  /// Shorthand for a single-field validation failure.
  pub fn invalid(field: &str, message: impl Into<String>) -> Self {
    Self::Validation(FieldErrors::single(field, message))
  }

  /// `true` for errors caught before any backend call.
  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}

impl From<validator::ValidationErrors> for Error {
  fn from(e: validator::ValidationErrors) -> Self { Self::Validation(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
