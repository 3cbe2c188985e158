//! Submissions: a user's competition entry and the form that produces it.
//!
//! A user owns at most one submission. Saving as a draft stores whatever the
//! form holds; saving as submitted requires the full form to validate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;
use validator::Validate;

use crate::{
  blob::BlobRef,
  tag::TagCategory,
  validate::{collapse_whitespace, optional, tag_set},
};

// ─── Status and placement ────────────────────────────────────────────────────

/// Lifecycle status. Only `Submitted` records appear in the gallery.
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
pub enum SubmissionStatus {
  #[default]
  Draft,
  Submitted,
}

/// Admin-assigned rank. Nothing prevents two submissions sharing one.
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
pub enum Placement {
  First,
  Second,
  Third,
}

impl Placement {
  pub const ALL: [Placement; 3] = [Self::First, Self::Second, Self::Third];
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A persisted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
  pub submission_id: Uuid,
  pub owner_id:      Uuid,
  pub owner_email:   String,
  pub full_name:     String,
  pub email:         String,
  pub github_url:    String,
  pub app_purpose:   String,
  pub linkedin_url:  Option<String>,
  pub twitter_url:   Option<String>,
  pub facebook_url:  Option<String>,
  pub instagram_url: Option<String>,
  pub website_url:   Option<String>,
  pub screenshots:   Vec<BlobRef>,
  pub interests:     Vec<String>,
  pub expertise:     Vec<String>,
  pub tech_stack:    Vec<String>,
  pub status:        SubmissionStatus,
  pub placement:     Option<Placement>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Submission {
  pub fn is_submitted(&self) -> bool { self.status == SubmissionStatus::Submitted }

  /// The tag list held for `category`.
  pub fn tags(&self, category: TagCategory) -> &[String] {
    match category {
      TagCategory::Interests => &self.interests,
      TagCategory::Expertise => &self.expertise,
      TagCategory::TechStack => &self.tech_stack,
    }
  }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Everything the submission form sends on save, minus the new files.
///
/// `screenshots` carries the previously stored references the client still
/// wants to keep; dropping one from this list removes it on save.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SubmissionForm {
  #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
  #[serde(default)]
  pub full_name:     String,
  #[validate(
    email(message = "Invalid email address"),
    length(max = 100, message = "Email must be at most 100 characters")
  )]
  #[serde(default)]
  pub email:         String,
  #[validate(
    length(max = 200, message = "GitHub URL must be at most 200 characters"),
    custom(function = "crate::validate::github_url")
  )]
  #[serde(default)]
  pub github_url:    String,
  #[validate(length(
    min = 10,
    max = 2000,
    message = "Description must be between 10 and 2000 characters"
  ))]
  #[serde(default)]
  pub app_purpose:   String,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub linkedin_url:  Option<String>,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub twitter_url:   Option<String>,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub facebook_url:  Option<String>,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub instagram_url: Option<String>,
  #[validate(url(message = "Invalid URL"), length(max = 200))]
  pub website_url:   Option<String>,
  #[validate(
    length(min = 1, max = 10, message = "Select between 1 and 10 interests"),
    custom(function = "crate::validate::tag_list")
  )]
  #[serde(default)]
  pub interests:     Vec<String>,
  #[validate(
    length(min = 1, max = 10, message = "Select between 1 and 10 areas of expertise"),
    custom(function = "crate::validate::tag_list")
  )]
  #[serde(default)]
  pub expertise:     Vec<String>,
  #[validate(
    length(min = 1, max = 10, message = "Select between 1 and 10 technologies"),
    custom(function = "crate::validate::tag_list")
  )]
  #[serde(default)]
  pub tech_stack:    Vec<String>,
  #[serde(default)]
  pub screenshots:   Vec<BlobRef>,
}

impl SubmissionForm {
  /// Trim every field, collapse whitespace in the name, drop blank optional
  /// links and normalise the tag lists.
  pub fn sanitized(self) -> Self {
    let mut screenshots: Vec<BlobRef> = Vec::with_capacity(self.screenshots.len());
    for shot in self.screenshots {
      if !screenshots.contains(&shot) {
        screenshots.push(shot);
      }
    }
    Self {
      full_name: collapse_whitespace(&self.full_name),
      email: self.email.trim().to_owned(),
      github_url: self.github_url.trim().to_owned(),
      app_purpose: self.app_purpose.trim().to_owned(),
      linkedin_url: optional(self.linkedin_url),
      twitter_url: optional(self.twitter_url),
      facebook_url: optional(self.facebook_url),
      instagram_url: optional(self.instagram_url),
      website_url: optional(self.website_url),
      interests: tag_set(self.interests),
      expertise: tag_set(self.expertise),
      tech_stack: tag_set(self.tech_stack),
      screenshots,
    }
  }
}

// ─── Listing helpers ─────────────────────────────────────────────────────────

/// Optional filter for [`crate::store::PortalStore::list_submissions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionQuery {
  pub status: Option<SubmissionStatus>,
}

impl SubmissionQuery {
  pub fn submitted() -> Self { Self { status: Some(SubmissionStatus::Submitted) } }
}

/// Sort newest first; ties broken by id so the order is stable.
pub fn newest_first(submissions: &mut [Submission]) {
  submissions.sort_by(|a, b| {
    b.created_at
      .cmp(&a.created_at)
      .then_with(|| a.submission_id.cmp(&b.submission_id))
  });
}

/// The holder of one placement, as shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Winner {
  pub submission_id: Uuid,
  pub full_name:     String,
}

/// Counts and current winners across every submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
  pub total:     usize,
  pub submitted: usize,
  pub drafts:    usize,
  pub placed:    usize,
  pub first:     Option<Winner>,
  pub second:    Option<Winner>,
  pub third:     Option<Winner>,
}

impl ReviewSummary {
  /// Summarise `submissions`, which must already be sorted newest first.
  /// When several submissions share a placement the newest one is reported.
  pub fn from_sorted(submissions: &[Submission]) -> Self {
    let winner = |place: Placement| {
      submissions
        .iter()
        .find(|s| s.placement == Some(place))
        .map(|s| Winner {
          submission_id: s.submission_id,
          full_name:     s.full_name.clone(),
        })
    };
    Self {
      total:     submissions.len(),
      submitted: submissions.iter().filter(|s| s.is_submitted()).count(),
      drafts:    submissions.iter().filter(|s| !s.is_submitted()).count(),
      placed:    submissions.iter().filter(|s| s.placement.is_some()).count(),
      first:     winner(Placement::First),
      second:    winner(Placement::Second),
      third:     winner(Placement::Third),
    }
  }
}
