//! Handler for filing mentor and mentee applications.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/applications/{kind}` | `mentor` or `mentee`. Multipart: `application` JSON part + optional `resume` file |

use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use showcase_core::{
  application::{self, ApplicationForm, ApplicationKind},
  blob::BlobStore,
  store::PortalStore,
};

use crate::{AppState, auth::RequireUser, error::ApiError, multipart::read_form};

/// `POST /applications/{kind}`
pub async fn file<S, B>(
  State(state): State<AppState<S, B>>,
  RequireUser(session): RequireUser,
  Path(kind): Path<ApplicationKind>,
  multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let (form, mut files): (ApplicationForm, _) = read_form(multipart, "application", "resume").await?;
  if files.len() > 1 {
    return Err(ApiError::BadRequest("only one resume may be attached".to_owned()));
  }
  let filed = application::file_application(
    state.store.as_ref(),
    state.blobs.as_ref(),
    &session.profile,
    kind,
    form,
    files.pop(),
  )
  .await?;
  Ok((StatusCode::CREATED, Json(filed)))
}
