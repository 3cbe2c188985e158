//! Tags: the shared vocabulary offered on the submission and application
//! forms, kept as three independent flat lists.
//!
//! Names are unique per category when compared case-insensitively. The usage
//! counter is maintained loosely; nothing recounts it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;

use crate::{
  Error, Result,
  store::PortalStore,
  validate::{MAX_TAG_LEN, collapse_whitespace},
};

/// The three fixed tag categories.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TagCategory {
  Interests,
  Expertise,
  TechStack,
}

impl TagCategory {
  pub fn all() -> impl Iterator<Item = TagCategory> { Self::iter() }

  /// Built-in vocabulary used for seeding and as the picker's fallback.
  pub fn defaults(self) -> &'static [&'static str] {
    match self {
      Self::Interests => &[
        "Machine Learning",
        "Web Development",
        "Mobile Apps",
        "AI Ethics",
        "Data Science",
        "Cloud Computing",
        "IoT",
        "Blockchain",
      ],
      Self::Expertise => &[
        "Python",
        "JavaScript",
        "TensorFlow",
        "React",
        "Node.js",
        "Docker",
        "AWS",
        "Git",
      ],
      Self::TechStack => &[
        "React",
        "Next.js",
        "Python",
        "TensorFlow",
        "PyTorch",
        "Node.js",
        "MongoDB",
        "PostgreSQL",
        "Docker",
        "Kubernetes",
      ],
    }
  }
}

/// A persisted tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub tag_id:      Uuid,
  pub category:    TagCategory,
  pub name:        String,
  pub usage_count: u64,
  pub created_at:  DateTime<Utc>,
}

impl Tag {
  pub fn new(category: TagCategory, name: String) -> Self {
    Self {
      tag_id: Uuid::new_v4(),
      category,
      name,
      usage_count: 0,
      created_at: Utc::now(),
    }
  }
}

/// Result of seeding one category with its defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
  pub added:   usize,
  pub skipped: usize,
  pub failed:  usize,
}

/// Case-insensitive comparison key for a tag name.
pub fn name_key(name: &str) -> String { name.to_lowercase() }

/// Clean up a user-entered tag name, rejecting blank or overlong names.
pub fn normalize_name(raw: &str) -> Result<String> {
  let name = collapse_whitespace(raw);
  if name.is_empty() {
    return Err(Error::invalid("name", "Tag name cannot be empty"));
  }
  if name.chars().count() > MAX_TAG_LEN {
    return Err(Error::invalid("name", "Tags must be at most 50 characters"));
  }
  Ok(name)
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// All tags in `category`, ordered by name.
pub async fn list_tags<S: PortalStore>(store: &S, category: TagCategory) -> Result<Vec<Tag>> {
  let mut tags = store.list_tags(category).await.map_err(Error::store)?;
  tags.sort_by_key(|t| name_key(&t.name));
  Ok(tags)
}

/// Create a tag, refusing names that already exist in the category.
pub async fn create_tag<S: PortalStore>(
  store: &S,
  category: TagCategory,
  raw_name: &str,
) -> Result<Tag> {
  let name = normalize_name(raw_name)?;
  if store
    .find_tag(category, name.clone())
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(Error::DuplicateTag { category, name });
  }
  let tag = Tag::new(category, name);
  store.insert_tag(tag.clone()).await.map_err(Error::store)?;
  tracing::info!(%category, name = %tag.name, "tag created");
  Ok(tag)
}

/// Rename a tag; the new name may differ from the old only in case.
pub async fn rename_tag<S: PortalStore>(
  store: &S,
  category: TagCategory,
  tag_id: Uuid,
  raw_name: &str,
) -> Result<Tag> {
  let name = normalize_name(raw_name)?;
  if let Some(other) = store
    .find_tag(category, name.clone())
    .await
    .map_err(Error::store)?
    && other.tag_id != tag_id
  {
    return Err(Error::DuplicateTag { category, name });
  }
  store
    .rename_tag(category, tag_id, name)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("tag {tag_id}")))
}

pub async fn delete_tag<S: PortalStore>(
  store: &S,
  category: TagCategory,
  tag_id: Uuid,
) -> Result<()> {
  if store.delete_tag(category, tag_id).await.map_err(Error::store)? {
    tracing::info!(%category, %tag_id, "tag deleted");
    Ok(())
  } else {
    Err(Error::NotFound(format!("tag {tag_id}")))
  }
}

/// Insert every default tag of `category` whose name is not already present.
///
/// Individual insert failures are logged and counted; they do not stop the
/// remaining defaults from being written.
pub async fn seed_defaults<S: PortalStore>(
  store: &S,
  category: TagCategory,
) -> Result<SeedReport> {
  let mut existing: Vec<String> = store
    .list_tags(category)
    .await
    .map_err(Error::store)?
    .iter()
    .map(|t| name_key(&t.name))
    .collect();

  let mut report = SeedReport::default();
  for name in category.defaults() {
    let key = name_key(name);
    if existing.contains(&key) {
      report.skipped += 1;
      continue;
    }
    match store.insert_tag(Tag::new(category, (*name).to_owned())).await {
      Ok(()) => {
        existing.push(key);
        report.added += 1;
      }
      Err(e) => {
        tracing::warn!(%category, %name, error = %e, "failed to seed tag");
        report.failed += 1;
      }
    }
  }
  tracing::info!(
    %category,
    added = report.added,
    skipped = report.skipped,
    failed = report.failed,
    "seeded default tags"
  );
  Ok(report)
}

/// Bump the usage counter of every tag on a submission, ignoring failures.
pub async fn record_usage<S: PortalStore>(store: &S, category: TagCategory, names: &[String]) {
  for name in names {
    if let Err(e) = store.bump_tag_usage(category, name.clone()).await {
      tracing::warn!(%category, %name, error = %e, "failed to bump tag usage");
    }
  }
}
