//! Mentor and mentee applications.
//!
//! Each user may file one application of each kind. Mentors must attach a
//! resume, which is stored under `mentors/{user_id}/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;
use validator::Validate;

use crate::{
  Error, Result,
  blob::{BlobRef, BlobStore, resume_key},
  profile::UserProfile,
  store::PortalStore,
  upload::{Upload, check_resume},
  validate::{FieldErrors, collapse_whitespace, optional, tag_set},
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationKind {
  Mentor,
  Mentee,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  Pending,
}

/// Form fields shared by both application kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ApplicationForm {
  #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
  #[serde(default)]
  pub name:           String,
  #[validate(email(message = "Invalid email address"), length(max = 100))]
  #[serde(default)]
  pub email:          String,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub linkedin_url:   Option<String>,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub twitter_url:    Option<String>,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub facebook_url:   Option<String>,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub instagram_url:  Option<String>,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub website_url:    Option<String>,
  #[validate(length(max = 200))]
  pub portfolio:      Option<String>,
  #[validate(length(max = 2000, message = "Must be at most 2000 characters"))]
  pub why_join:       Option<String>,
  #[validate(length(max = 50))]
  pub hours_per_week: Option<String>,
  /// Mentor only.
  #[validate(length(max = 100))]
  pub company_name:   Option<String>,
  /// Mentor only.
  #[validate(length(max = 100))]
  pub job_title:      Option<String>,
  #[validate(
    length(min = 1, max = 10, message = "Please select at least one interest"),
    custom(function = "crate::validate::tag_list")
  )]
  #[serde(default)]
  pub interests:      Vec<String>,
  #[validate(
    length(min = 1, max = 10, message = "Please select at least one area of expertise"),
    custom(function = "crate::validate::tag_list")
  )]
  #[serde(default)]
  pub expertise:      Vec<String>,
  #[validate(
    length(min = 1, max = 10, message = "Please select at least one technology"),
    custom(function = "crate::validate::tag_list")
  )]
  #[serde(default)]
  pub tech_stack:     Vec<String>,
}

impl ApplicationForm {
  pub fn sanitized(self) -> Self {
    Self {
      name:           collapse_whitespace(&self.name),
      email:          self.email.trim().to_owned(),
      linkedin_url:   optional(self.linkedin_url),
      twitter_url:    optional(self.twitter_url),
      facebook_url:   optional(self.facebook_url),
      instagram_url:  optional(self.instagram_url),
      website_url:    optional(self.website_url),
      portfolio:      optional(self.portfolio),
      why_join:       optional(self.why_join),
      hours_per_week: optional(self.hours_per_week),
      company_name:   optional(self.company_name),
      job_title:      optional(self.job_title),
      interests:      tag_set(self.interests),
      expertise:      tag_set(self.expertise),
      tech_stack:     tag_set(self.tech_stack),
    }
  }
}

/// A persisted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
  pub application_id: Uuid,
  pub kind:           ApplicationKind,
  pub owner_id:       Uuid,
  pub owner_email:    String,
  /// The sanitised form as filed.
  pub details:        ApplicationForm,
  pub resume:         Option<BlobRef>,
  pub status:         ApplicationStatus,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// File a mentor or mentee application for `owner`.
///
/// Validation and the one-per-kind check both run before the resume upload.
pub async fn file_application<S, B>(
  store: &S,
  blobs: &B,
  owner: &UserProfile,
  kind: ApplicationKind,
  form: ApplicationForm,
  resume: Option<Upload>,
) -> Result<Application>
where
  S: PortalStore,
  B: BlobStore,
{
  let form = form.sanitized();
  let mut errors: FieldErrors = match form.validate() {
    Ok(()) => FieldErrors::default(),
    Err(e) => e.into(),
  };
  match (kind, &resume) {
    (ApplicationKind::Mentor, None) => errors.push("resume", "Please upload your resume"),
    (ApplicationKind::Mentor, Some(upload)) => {
      if let Err(e) = check_resume(upload) {
        errors.merge(e);
      }
    }
    (ApplicationKind::Mentee, Some(_)) => {
      errors.push("resume", "Mentee applications do not take a resume")
    }
    (ApplicationKind::Mentee, None) => {}
  }
  errors.into_result().map_err(Error::Validation)?;

  if store
    .find_application(kind, owner.user_id)
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(Error::AlreadyApplied(kind));
  }

  let resume = match resume {
    Some(upload) => Some(
      blobs
        .put(resume_key(owner.user_id, &upload.file_name), upload.data)
        .await
        .map_err(Error::blob)?,
    ),
    None => None,
  };

  let now = Utc::now();
  let application = Application {
    application_id: Uuid::new_v4(),
    kind,
    owner_id: owner.user_id,
    owner_email: owner.email.clone(),
    details: form,
    resume,
    status: ApplicationStatus::Pending,
    created_at: now,
    updated_at: now,
  };
  store
    .insert_application(application.clone())
    .await
    .map_err(Error::store)?;

  tracing::info!(%kind, owner = %owner.user_id, "application filed");
  Ok(application)
}

/// Every filed application, newest first, optionally of one kind.
pub async fn list_applications<S: PortalStore>(
  store: &S,
  kind: Option<ApplicationKind>,
) -> Result<Vec<Application>> {
  let mut applications = store.list_applications(kind).await.map_err(Error::store)?;
  applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  Ok(applications)
}
