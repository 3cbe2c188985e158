//! Session extractors and the credential parsers behind them.
//!
//! Every request is resolved to an optional [`Session`] from its
//! `Authorization: Bearer` header. [`RequireUser`] and [`RequireAdmin`] run
//! the role guard before the handler body, so a turned-away caller is
//! redirected without any protected data being read.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use showcase_core::{
  accounts,
  blob::BlobStore,
  session::{Access, Session, authorize},
  store::PortalStore,
};

use crate::{AppState, error::ApiError};

/// The bearer token presented with the request, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

/// Decode `Authorization: Basic` into `(email, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

/// The caller's session, or `None` for anonymous requests.
pub struct CurrentSession(pub Option<Session>);

/// A signed-in caller of any role.
pub struct RequireUser(pub Session);

/// A signed-in caller whose role is admin.
pub struct RequireAdmin(pub Session);

async fn resolve<S, B>(parts: &Parts, state: &AppState<S, B>) -> Result<Option<Session>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  match bearer_token(&parts.headers) {
    Some(token) => Ok(accounts::resolve_session(state.store.as_ref(), token).await?),
    None => Ok(None),
  }
}

async fn guarded<S, B>(
  parts: &Parts,
  state: &AppState<S, B>,
  access: Access,
) -> Result<Session, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let session = resolve(parts, state).await?;
  if let Err(denied) = authorize(session.as_ref(), access) {
    tracing::debug!(?denied, path = %parts.uri.path(), "access denied");
    return Err(ApiError::Redirect);
  }
  session.ok_or(ApiError::Redirect)
}

impl<S, B> FromRequestParts<AppState<S, B>> for CurrentSession
where
  S: PortalStore + 'static,
  B: BlobStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    Ok(CurrentSession(resolve(parts, state).await?))
  }
}

impl<S, B> FromRequestParts<AppState<S, B>> for RequireUser
where
  S: PortalStore + 'static,
  B: BlobStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    guarded(parts, state, Access::Authenticated).await.map(RequireUser)
  }
}

impl<S, B> FromRequestParts<AppState<S, B>> for RequireAdmin
where
  S: PortalStore + 'static,
  B: BlobStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    guarded(parts, state, Access::Admin).await.map(RequireAdmin)
  }
}
