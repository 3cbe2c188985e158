//! The submission lifecycle and admin review operations.
//!
//! A save is ordered so that nothing touches the backend until the input has
//! been checked: sanitise, check the new files, validate (for `submitted`
//! only), then upload, then write the record.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
  Error, Result,
  blob::{BlobRef, BlobStore, screenshot_key},
  profile::UserProfile,
  store::PortalStore,
  submission::{
    Placement, ReviewSummary, Submission, SubmissionForm, SubmissionQuery, SubmissionStatus,
    newest_first,
  },
  tag::{TagCategory, record_usage},
  upload::{Upload, check_screenshots},
  validate::FieldErrors,
};

/// Outcome of [`delete_submission`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
  pub images_deleted: usize,
  pub images_failed:  usize,
}

fn check_submitted(form: &SubmissionForm, uploads: &[Upload]) -> Result<(), FieldErrors> {
  let mut errors: FieldErrors = match form.validate() {
    Ok(()) => FieldErrors::default(),
    Err(e) => e.into(),
  };
  if form.screenshots.is_empty() && uploads.is_empty() {
    errors.push("screenshots", "Please upload at least one screenshot");
  }
  errors.into_result()
}

/// Create or update `owner`'s submission.
///
/// Drafts skip the required-field rules; file type and size are checked for
/// every save. New screenshots are uploaded one at a time and the first
/// failure aborts the save, leaving the stored record as it was. Retained
/// references the previous record does not hold are dropped.
pub async fn save_submission<S, B>(
  store: &S,
  blobs: &B,
  owner: &UserProfile,
  status: SubmissionStatus,
  form: SubmissionForm,
  uploads: Vec<Upload>,
) -> Result<Submission>
where
  S: PortalStore,
  B: BlobStore,
{
  let form = form.sanitized();
  check_screenshots(&uploads).map_err(Error::Validation)?;
  if status == SubmissionStatus::Submitted {
    check_submitted(&form, &uploads).map_err(Error::Validation)?;
  }

  let previous = store
    .find_submission_by_owner(owner.user_id)
    .await
    .map_err(Error::store)?;

  let mut screenshots: Vec<BlobRef> = match &previous {
    Some(prev) => form
      .screenshots
      .iter()
      .filter(|r| prev.screenshots.contains(r))
      .cloned()
      .collect(),
    None => Vec::new(),
  };
  if status == SubmissionStatus::Submitted && screenshots.is_empty() && uploads.is_empty() {
    return Err(Error::invalid("screenshots", "Please upload at least one screenshot"));
  }

  for upload in uploads {
    let blob = blobs
      .put(screenshot_key(&upload.file_name), upload.data)
      .await
      .map_err(Error::blob)?;
    tracing::debug!(key = %blob, "screenshot uploaded");
    screenshots.push(blob);
  }

  let now = Utc::now();
  let was_submitted = previous.as_ref().is_some_and(Submission::is_submitted);
  let (submission_id, created_at) = match &previous {
    Some(prev) => (prev.submission_id, prev.created_at),
    None => (Uuid::new_v4(), now),
  };

  let submission = Submission {
    submission_id,
    owner_id: owner.user_id,
    owner_email: owner.email.clone(),
    full_name: form.full_name,
    email: form.email,
    github_url: form.github_url,
    app_purpose: form.app_purpose,
    linkedin_url: form.linkedin_url,
    twitter_url: form.twitter_url,
    facebook_url: form.facebook_url,
    instagram_url: form.instagram_url,
    website_url: form.website_url,
    screenshots,
    interests: form.interests,
    expertise: form.expertise,
    tech_stack: form.tech_stack,
    status,
    placement: None,
    created_at,
    updated_at: now,
  };
  store
    .upsert_submission(submission.clone())
    .await
    .map_err(Error::store)?;

  if submission.is_submitted() && !was_submitted {
    for category in TagCategory::all() {
      record_usage(store, category, submission.tags(category)).await;
    }
  }

  tracing::info!(
    submission_id = %submission.submission_id,
    owner = %owner.user_id,
    %status,
    screenshots = submission.screenshots.len(),
    "submission saved"
  );
  Ok(submission)
}

/// The caller's own submission, if any.
pub async fn get_own_submission<S: PortalStore>(
  store: &S,
  owner: &UserProfile,
) -> Result<Option<Submission>> {
  store
    .find_submission_by_owner(owner.user_id)
    .await
    .map_err(Error::store)
}

/// Submitted entries only, newest first.
pub async fn list_gallery<S: PortalStore>(store: &S) -> Result<Vec<Submission>> {
  let mut submissions = store
    .list_submissions(SubmissionQuery::submitted())
    .await
    .map_err(Error::store)?;
  submissions.retain(Submission::is_submitted);
  newest_first(&mut submissions);
  Ok(submissions)
}

/// Every submission regardless of status, newest first.
pub async fn list_all_submissions<S: PortalStore>(store: &S) -> Result<Vec<Submission>> {
  let mut submissions = store
    .list_submissions(SubmissionQuery::default())
    .await
    .map_err(Error::store)?;
  newest_first(&mut submissions);
  Ok(submissions)
}

pub async fn review_summary<S: PortalStore>(store: &S) -> Result<ReviewSummary> {
  let submissions = list_all_submissions(store).await?;
  Ok(ReviewSummary::from_sorted(&submissions))
}

/// Set or clear the placement of one submission. Other submissions holding
/// the same placement keep it.
pub async fn set_placement<S: PortalStore>(
  store: &S,
  submission_id: Uuid,
  placement: Option<Placement>,
) -> Result<Submission> {
  let submission = store
    .set_placement(submission_id, placement)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("submission {submission_id}")))?;
  tracing::info!(
    %submission_id,
    placement = placement.map(|p| p.to_string()).as_deref().unwrap_or("none"),
    "placement updated"
  );
  Ok(submission)
}

/// Delete a submission and its screenshots.
///
/// Every image deletion is attempted; failures are logged and counted. The
/// record deletion is attempted afterwards no matter how many images failed.
pub async fn delete_submission<S, B>(
  store: &S,
  blobs: &B,
  submission_id: Uuid,
) -> Result<DeleteReport>
where
  S: PortalStore,
  B: BlobStore,
{
  let submission = store
    .get_submission(submission_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("submission {submission_id}")))?;

  let mut report = DeleteReport::default();
  for shot in &submission.screenshots {
    match blobs.delete(shot.key().to_owned()).await {
      Ok(()) => report.images_deleted += 1,
      Err(e) => {
        tracing::warn!(%submission_id, key = %shot, error = %e, "failed to delete screenshot");
        report.images_failed += 1;
      }
    }
  }

  store
    .delete_submission(submission_id)
    .await
    .map_err(Error::store)?;

  tracing::info!(
    %submission_id,
    images_deleted = report.images_deleted,
    images_failed = report.images_failed,
    "submission deleted"
  );
  Ok(report)
}
