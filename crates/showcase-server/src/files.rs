//! Blob downloads: `GET /files/{*key}`.
//!
//! Screenshots are public. A resume under `mentors/{user_id}/` is served only
//! to an admin or to that user; anyone else gets the same 404 as a missing
//! object.

use axum::{
  extract::{Path, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use showcase_api::{AppState, ApiError, auth::CurrentSession};
use showcase_core::{
  blob::{BlobStore, MENTOR_FOLDER, SCREENSHOT_FOLDER},
  session::Session,
  store::PortalStore,
};

/// Strong ETag over the object bytes.
pub fn content_etag(data: &[u8]) -> String {
  format!("\"{}\"", hex::encode(Sha256::digest(data)))
}

/// Whether `session` may read the object at `key`.
pub fn may_read(key: &str, session: Option<&Session>) -> bool {
  let Some((folder, rest)) = key.split_once('/') else {
    return false;
  };
  match folder {
    SCREENSHOT_FOLDER => true,
    MENTOR_FOLDER => session.is_some_and(|s| {
      s.is_admin()
        || rest
          .split_once('/')
          .is_some_and(|(owner, _)| owner == s.user_id().to_string())
    }),
    _ => false,
  }
}

pub async fn download<S, B>(
  State(state): State<AppState<S, B>>,
  CurrentSession(session): CurrentSession,
  Path(key): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  if !may_read(&key, session.as_ref()) {
    tracing::debug!(%key, "download refused");
    return Err(ApiError::NotFound(format!("file {key} not found")));
  }

  let data = state
    .blobs
    .get(key.clone())
    .await
    .map_err(|e| {
      tracing::debug!(%key, error = %e, "blob lookup failed");
      ApiError::NotFound(format!("file {key} not found"))
    })?
    .ok_or_else(|| ApiError::NotFound(format!("file {key} not found")))?;

  let etag = content_etag(&data);
  let unchanged = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v == etag);
  if unchanged {
    return Ok(StatusCode::NOT_MODIFIED.into_response());
  }

  let mime = mime_guess::from_path(&key).first_or_octet_stream();
  let mut res = data.into_response();
  let res_headers = res.headers_mut();
  if let Ok(v) = HeaderValue::from_str(mime.as_ref()) {
    res_headers.insert(header::CONTENT_TYPE, v);
  }
  if let Ok(v) = HeaderValue::from_str(&etag) {
    res_headers.insert(header::ETAG, v);
  }
  Ok(res)
}
