//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed nanosecond
//! precision, so lexical order matches chronological order. Lists and the
//! application form are stored as compact JSON. Enums use their lowercase
//! string forms.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use showcase_core::{
  application::{Application, ApplicationForm},
  blob::BlobRef,
  profile::{Credential, UserProfile},
  session::SessionRecord,
  submission::Submission,
  tag::Tag,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Nanos, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_strings(items: &[String]) -> Result<String> { Ok(serde_json::to_string(items)?) }

pub fn decode_strings(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

pub fn encode_blob_refs(refs: &[BlobRef]) -> Result<String> { Ok(serde_json::to_string(refs)?) }

pub fn decode_blob_refs(s: &str) -> Result<Vec<BlobRef>> { Ok(serde_json::from_str(s)?) }

pub fn encode_details(form: &ApplicationForm) -> Result<String> {
  Ok(serde_json::to_string(form)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str = "user_id, email, display_name, role, created_at, updated_at";

/// Raw strings read directly from a `user_profiles` row.
pub struct RawProfile {
  pub user_id:      String,
  pub email:        String,
  pub display_name: String,
  pub role:         String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      email:        row.get(1)?,
      display_name: row.get(2)?,
      role:         row.get(3)?,
      created_at:   row.get(4)?,
      updated_at:   row.get(5)?,
    })
  }

  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(UserProfile {
      user_id:      decode_uuid(&self.user_id)?,
      email:        self.email,
      display_name: self.display_name,
      role:         decode_enum("role", &self.role)?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `credentials` row.
pub struct RawCredential {
  pub user_id:       String,
  pub email:         String,
  pub password_hash: String,
}

impl RawCredential {
  pub fn into_credential(self) -> Result<Credential> {
    Ok(Credential {
      user_id:       decode_uuid(&self.user_id)?,
      email:         self.email,
      password_hash: self.password_hash,
    })
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub token_hash: String,
  pub user_id:    String,
  pub created_at: String,
  pub expires_at: String,
}

impl RawSession {
  pub fn into_record(self) -> Result<SessionRecord> {
    Ok(SessionRecord {
      token_hash: self.token_hash,
      user_id:    decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}

pub const SUBMISSION_COLUMNS: &str = "submission_id, owner_id, owner_email, full_name, email,
  github_url, app_purpose, linkedin_url, twitter_url, facebook_url, instagram_url,
  website_url, screenshots, interests, expertise, tech_stack, status, placement,
  created_at, updated_at";

/// Raw strings read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id: String,
  pub owner_id:      String,
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
  pub screenshots:   String,
  pub interests:     String,
  pub expertise:     String,
  pub tech_stack:    String,
  pub status:        String,
  pub placement:     Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawSubmission {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id: row.get(0)?,
      owner_id:      row.get(1)?,
      owner_email:   row.get(2)?,
      full_name:     row.get(3)?,
      email:         row.get(4)?,
      github_url:    row.get(5)?,
      app_purpose:   row.get(6)?,
      linkedin_url:  row.get(7)?,
      twitter_url:   row.get(8)?,
      facebook_url:  row.get(9)?,
      instagram_url: row.get(10)?,
      website_url:   row.get(11)?,
      screenshots:   row.get(12)?,
      interests:     row.get(13)?,
      expertise:     row.get(14)?,
      tech_stack:    row.get(15)?,
      status:        row.get(16)?,
      placement:     row.get(17)?,
      created_at:    row.get(18)?,
      updated_at:    row.get(19)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      submission_id: decode_uuid(&self.submission_id)?,
      owner_id:      decode_uuid(&self.owner_id)?,
      owner_email:   self.owner_email,
      full_name:     self.full_name,
      email:         self.email,
      github_url:    self.github_url,
      app_purpose:   self.app_purpose,
      linkedin_url:  self.linkedin_url,
      twitter_url:   self.twitter_url,
      facebook_url:  self.facebook_url,
      instagram_url: self.instagram_url,
      website_url:   self.website_url,
      screenshots:   decode_blob_refs(&self.screenshots)?,
      interests:     decode_strings(&self.interests)?,
      expertise:     decode_strings(&self.expertise)?,
      tech_stack:    decode_strings(&self.tech_stack)?,
      status:        decode_enum("status", &self.status)?,
      placement:     self
        .placement
        .as_deref()
        .map(|p| decode_enum("placement", p))
        .transpose()?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub const TAG_COLUMNS: &str = "tag_id, category, name, usage_count, created_at";

/// Raw values read directly from a `tags` row.
pub struct RawTag {
  pub tag_id:      String,
  pub category:    String,
  pub name:        String,
  pub usage_count: i64,
  pub created_at:  String,
}

impl RawTag {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      tag_id:      row.get(0)?,
      category:    row.get(1)?,
      name:        row.get(2)?,
      usage_count: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag {
      tag_id:      decode_uuid(&self.tag_id)?,
      category:    decode_enum("category", &self.category)?,
      name:        self.name,
      usage_count: u64::try_from(self.usage_count).unwrap_or_default(),
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const APPLICATION_COLUMNS: &str =
  "application_id, kind, owner_id, owner_email, details, resume, status, created_at, updated_at";

/// Raw strings read directly from an `applications` row.
pub struct RawApplication {
  pub application_id: String,
  pub kind:           String,
  pub owner_id:       String,
  pub owner_email:    String,
  pub details:        String,
  pub resume:         Option<String>,
  pub status:         String,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawApplication {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      application_id: row.get(0)?,
      kind:           row.get(1)?,
      owner_id:       row.get(2)?,
      owner_email:    row.get(3)?,
      details:        row.get(4)?,
      resume:         row.get(5)?,
      status:         row.get(6)?,
      created_at:     row.get(7)?,
      updated_at:     row.get(8)?,
    })
  }

  pub fn into_application(self) -> Result<Application> {
    Ok(Application {
      application_id: decode_uuid(&self.application_id)?,
      kind:           decode_enum("kind", &self.kind)?,
      owner_id:       decode_uuid(&self.owner_id)?,
      owner_email:    self.owner_email,
      details:        serde_json::from_str(&self.details)?,
      resume:         self.resume.map(BlobRef),
      status:         decode_enum("status", &self.status)?,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}
