//! [`SqliteStore`]: the SQLite implementation of [`PortalStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use showcase_core::{
  application::{Application, ApplicationKind},
  profile::{Credential, Role, UserProfile},
  session::SessionRecord,
  store::PortalStore,
  submission::{Placement, Submission, SubmissionQuery},
  tag::{Tag, TagCategory, name_key},
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    APPLICATION_COLUMNS, PROFILE_COLUMNS, RawApplication, RawCredential, RawProfile, RawSession,
    RawSubmission, RawTag, SUBMISSION_COLUMNS, TAG_COLUMNS, encode_blob_refs, encode_details,
    encode_dt, encode_strings, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Showcase document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(user_id);
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn query_submission(&self, column: &'static str, id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE {column} = ?1"),
              rusqlite::params![id_str],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn query_tag(&self, category: TagCategory, tag_id: Uuid) -> Result<Option<Tag>> {
    let cat_str = category.as_ref().to_owned();
    let id_str = encode_uuid(tag_id);
    let raw: Option<RawTag> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TAG_COLUMNS} FROM tags WHERE category = ?1 AND tag_id = ?2"),
              rusqlite::params![cat_str, id_str],
              RawTag::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawTag::into_tag).transpose()
  }
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  // ── Profiles and credentials ──────────────────────────────────────────────

  async fn create_account(&self, profile: UserProfile, credential: Credential) -> Result<()> {
    let id_str = encode_uuid(profile.user_id);
    let email = credential.email.clone();
    let profile_email = profile.email.clone();
    let display_name = profile.display_name.clone();
    let role_str = profile.role.as_ref().to_owned();
    let created_str = encode_dt(profile.created_at);
    let updated_str = encode_dt(profile.updated_at);
    let hash = credential.password_hash;

    let created: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM credentials WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO user_profiles (user_id, email, display_name, role, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, profile_email, display_name, role_str, created_str, updated_str],
        )?;
        tx.execute(
          "INSERT INTO credentials (user_id, email, password_hash) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, email, hash],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if created { Ok(()) } else { Err(Error::EmailTaken(credential.email)) }
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    self.query_profile(user_id).await
  }

  async fn find_credential(&self, email: String) -> Result<Option<Credential>> {
    let email = email.to_lowercase();
    let raw: Option<RawCredential> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, password_hash FROM credentials WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawCredential {
                  user_id:       row.get(0)?,
                  email:         row.get(1)?,
                  password_hash: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawCredential::into_credential).transpose()
  }

  async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PROFILE_COLUMNS} FROM user_profiles ORDER BY email"))?;
        let rows = stmt
          .query_map([], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn set_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(user_id);
    let role_str = role.as_ref().to_owned();
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE user_profiles SET role = ?2, updated_at = ?3 WHERE user_id = ?1",
          rusqlite::params![id_str, role_str, now_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.query_profile(user_id).await
  }

  async fn touch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(user_id);
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE user_profiles SET updated_at = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, now_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.query_profile(user_id).await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn insert_session(&self, session: SessionRecord) -> Result<()> {
    let user_str = encode_uuid(session.user_id);
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(session.expires_at);
    let hash = session.token_hash;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![hash, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_session(&self, token_hash: String) -> Result<Option<SessionRecord>> {
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT token_hash, user_id, created_at, expires_at
               FROM sessions WHERE token_hash = ?1",
              rusqlite::params![token_hash],
              |row| {
                Ok(RawSession {
                  token_hash: row.get(0)?,
                  user_id:    row.get(1)?,
                  created_at: row.get(2)?,
                  expires_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawSession::into_record).transpose()
  }

  async fn delete_session(&self, token_hash: String) -> Result<bool> {
    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn get_submission(&self, submission_id: Uuid) -> Result<Option<Submission>> {
    self.query_submission("submission_id", submission_id).await
  }

  async fn find_submission_by_owner(&self, owner_id: Uuid) -> Result<Option<Submission>> {
    self.query_submission("owner_id", owner_id).await
  }

  async fn upsert_submission(&self, s: Submission) -> Result<()> {
    let id_str = encode_uuid(s.submission_id);
    let owner_str = encode_uuid(s.owner_id);
    let screenshots = encode_blob_refs(&s.screenshots)?;
    let interests = encode_strings(&s.interests)?;
    let expertise = encode_strings(&s.expertise)?;
    let tech_stack = encode_strings(&s.tech_stack)?;
    let status_str = s.status.as_ref().to_owned();
    let placement_str = s.placement.map(|p| p.as_ref().to_owned());
    let created_str = encode_dt(s.created_at);
    let updated_str = encode_dt(s.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT OR REPLACE INTO submissions ({SUBMISSION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
          ),
          rusqlite::params![
            id_str,
            owner_str,
            s.owner_email,
            s.full_name,
            s.email,
            s.github_url,
            s.app_purpose,
            s.linkedin_url,
            s.twitter_url,
            s.facebook_url,
            s.instagram_url,
            s.website_url,
            screenshots,
            interests,
            expertise,
            tech_stack,
            status_str,
            placement_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_submissions(&self, query: SubmissionQuery) -> Result<Vec<Submission>> {
    let status_str = query.status.map(|s| s.as_ref().to_owned());

    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SUBMISSION_COLUMNS} FROM submissions
           WHERE ?1 IS NULL OR status = ?1
           ORDER BY created_at DESC, submission_id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![status_str], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn set_placement(
    &self,
    submission_id: Uuid,
    placement: Option<Placement>,
  ) -> Result<Option<Submission>> {
    let id_str = encode_uuid(submission_id);
    let placement_str = placement.map(|p| p.as_ref().to_owned());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE submissions SET placement = ?2 WHERE submission_id = ?1",
          rusqlite::params![id_str, placement_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_submission(submission_id).await
  }

  async fn delete_submission(&self, submission_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(submission_id);
    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM submissions WHERE submission_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn list_tags(&self, category: TagCategory) -> Result<Vec<Tag>> {
    let cat_str = category.as_ref().to_owned();
    let raws: Vec<RawTag> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TAG_COLUMNS} FROM tags WHERE category = ?1 ORDER BY name_key"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![cat_str], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn find_tag(&self, category: TagCategory, name: String) -> Result<Option<Tag>> {
    let cat_str = category.as_ref().to_owned();
    let key = name_key(&name);
    let raw: Option<RawTag> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TAG_COLUMNS} FROM tags WHERE category = ?1 AND name_key = ?2"),
              rusqlite::params![cat_str, key],
              RawTag::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawTag::into_tag).transpose()
  }

  async fn insert_tag(&self, tag: Tag) -> Result<()> {
    let id_str = encode_uuid(tag.tag_id);
    let cat_str = tag.category.as_ref().to_owned();
    let name = tag.name.clone();
    let key = name_key(&tag.name);
    let usage = i64::try_from(tag.usage_count).unwrap_or(i64::MAX);
    let created_str = encode_dt(tag.created_at);

    let inserted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO tags (tag_id, category, name, name_key, usage_count, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, cat_str, name, key, usage, created_str],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::DuplicateTag { category: tag.category, name: tag.name });
    }
    Ok(())
  }

  async fn rename_tag(
    &self,
    category: TagCategory,
    tag_id: Uuid,
    name: String,
  ) -> Result<Option<Tag>> {
    let cat_str = category.as_ref().to_owned();
    let id_str = encode_uuid(tag_id);
    let key = name_key(&name);
    let new_name = name.clone();

    // 0 rows: missing tag; None: another tag already holds the name.
    let outcome: Option<usize> = self
      .conn
      .call(move |conn| {
        let clash = conn
          .query_row(
            "SELECT 1 FROM tags WHERE category = ?1 AND name_key = ?2 AND tag_id != ?3",
            rusqlite::params![cat_str, key, id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if clash {
          return Ok(None);
        }
        Ok(Some(conn.execute(
          "UPDATE tags SET name = ?3, name_key = ?4 WHERE category = ?1 AND tag_id = ?2",
          rusqlite::params![cat_str, id_str, new_name, key],
        )?))
      })
      .await?;

    match outcome {
      None => Err(Error::DuplicateTag { category, name }),
      Some(0) => Ok(None),
      Some(_) => self.query_tag(category, tag_id).await,
    }
  }

  async fn delete_tag(&self, category: TagCategory, tag_id: Uuid) -> Result<bool> {
    let cat_str = category.as_ref().to_owned();
    let id_str = encode_uuid(tag_id);
    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM tags WHERE category = ?1 AND tag_id = ?2",
          rusqlite::params![cat_str, id_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn bump_tag_usage(&self, category: TagCategory, name: String) -> Result<()> {
    let cat_str = category.as_ref().to_owned();
    let key = name_key(&name);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE tags SET usage_count = usage_count + 1 WHERE category = ?1 AND name_key = ?2",
          rusqlite::params![cat_str, key],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn find_application(
    &self,
    kind: ApplicationKind,
    owner_id: Uuid,
  ) -> Result<Option<Application>> {
    let kind_str = kind.as_ref().to_owned();
    let owner_str = encode_uuid(owner_id);
    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications WHERE kind = ?1 AND owner_id = ?2"
              ),
              rusqlite::params![kind_str, owner_str],
              RawApplication::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawApplication::into_application).transpose()
  }

  async fn insert_application(&self, a: Application) -> Result<()> {
    let id_str = encode_uuid(a.application_id);
    let kind_str = a.kind.as_ref().to_owned();
    let owner_str = encode_uuid(a.owner_id);
    let details = encode_details(&a.details)?;
    let resume = a.resume.map(|r| r.0);
    let status_str = a.status.as_ref().to_owned();
    let created_str = encode_dt(a.created_at);
    let updated_str = encode_dt(a.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO applications ({APPLICATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
          ),
          rusqlite::params![
            id_str,
            kind_str,
            owner_str,
            a.owner_email,
            details,
            resume,
            status_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_applications(&self, kind: Option<ApplicationKind>) -> Result<Vec<Application>> {
    let kind_str = kind.map(|k| k.as_ref().to_owned());
    let raws: Vec<RawApplication> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {APPLICATION_COLUMNS} FROM applications
           WHERE ?1 IS NULL OR kind = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![kind_str], RawApplication::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawApplication::into_application).collect()
  }
}
