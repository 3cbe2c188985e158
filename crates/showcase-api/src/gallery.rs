//! Handler for the public gallery.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/gallery` | Submitted entries only, newest first |

use axum::{Json, extract::State};
use showcase_core::{blob::BlobStore, lifecycle, store::PortalStore, submission::Submission};

use crate::{AppState, error::ApiError};

/// `GET /gallery`
pub async fn list<S, B>(State(state): State<AppState<S, B>>) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let submissions = lifecycle::list_gallery(state.store.as_ref()).await?;
  Ok(Json(submissions))
}
