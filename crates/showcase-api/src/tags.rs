//! Handlers for the public tag vocabulary.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tags/{category}` | `interests`, `expertise` or `tech_stack`; sorted by name |
//! | `POST` | `/tags/{category}` | Body: [`CreateTagBody`]; 409 on a case-insensitive duplicate |
//!
//! Renaming and deleting tags are admin operations, see [`crate::admin`].

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use showcase_core::{
  blob::BlobStore,
  picker::{TagAdded, TagPicker},
  store::PortalStore,
  tag::{self, Tag, TagCategory},
};

use crate::{AppState, auth::RequireUser, error::ApiError};

/// `GET /tags/{category}`
pub async fn list<S, B>(
  State(state): State<AppState<S, B>>,
  Path(category): Path<TagCategory>,
) -> Result<Json<Vec<Tag>>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  Ok(Json(tag::list_tags(state.store.as_ref(), category).await?))
}

/// A tag typed into the form, with the tags the form currently has selected.
#[derive(Debug, Deserialize)]
pub struct CreateTagBody {
  pub name:     String,
  #[serde(default)]
  pub selected: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedTag {
  #[serde(flatten)]
  pub added:    TagAdded,
  /// The form's selection with the new tag appended.
  pub selected: Vec<String>,
}

/// `POST /tags/{category}`
///
/// The name is checked against both the stored vocabulary and the caller's
/// selection. If the store write fails the tag is still returned as selected,
/// with `persisted: false`.
pub async fn create<S, B>(
  State(state): State<AppState<S, B>>,
  RequireUser(session): RequireUser,
  Path(category): Path<TagCategory>,
  Json(body): Json<CreateTagBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let mut picker = TagPicker::new(category, body.selected);
  picker.load(state.store.as_ref()).await;
  let added = picker.create(state.store.as_ref(), &body.name).await?;
  tracing::debug!(
    user_id = %session.user_id(),
    %category,
    persisted = added.persisted,
    "tag added from form"
  );
  let created = CreatedTag { added, selected: picker.into_selected() };
  Ok((StatusCode::CREATED, Json(created)))
}
