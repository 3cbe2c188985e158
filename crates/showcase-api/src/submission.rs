//! Handlers for the caller's own submission.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/submission` | 404 if the caller has not saved one yet |
//! | `PUT`  | `/submission` | Multipart: `submission` JSON part + `screenshots` files |
//!
//! The `submission` part is a [`SaveBody`]: the form fields plus a `status`
//! of `draft` or `submitted`. Its `screenshots` array lists the previously
//! stored references to keep.

use axum::{
  Json,
  extract::{Multipart, State},
};
use serde::Deserialize;
use showcase_core::{
  blob::BlobStore,
  lifecycle,
  store::PortalStore,
  submission::{Submission, SubmissionForm, SubmissionStatus},
};

use crate::{AppState, auth::RequireUser, error::ApiError, multipart::read_form};

/// `GET /submission`
pub async fn get_own<S, B>(
  State(state): State<AppState<S, B>>,
  RequireUser(session): RequireUser,
) -> Result<Json<Submission>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  lifecycle::get_own_submission(state.store.as_ref(), &session.profile)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("no submission saved yet".to_owned()))
}

#[derive(Debug, Deserialize)]
pub struct SaveBody {
  #[serde(default)]
  pub status: SubmissionStatus,
  #[serde(flatten)]
  pub form:   SubmissionForm,
}

/// `PUT /submission`
pub async fn save<S, B>(
  State(state): State<AppState<S, B>>,
  RequireUser(session): RequireUser,
  multipart: Multipart,
) -> Result<Json<Submission>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let (body, uploads): (SaveBody, _) = read_form(multipart, "submission", "screenshots").await?;
  let saved = lifecycle::save_submission(
    state.store.as_ref(),
    state.blobs.as_ref(),
    &session.profile,
    body.status,
    body.form,
    uploads,
  )
  .await?;
  Ok(Json(saved))
}
