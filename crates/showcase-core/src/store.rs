//! The `PortalStore` trait: the document-store half of the backend.
//!
//! The trait is implemented by storage backends (e.g. `showcase-store-sqlite`).
//! Every collection is an independent flat set of records; the store enforces
//! no relationships between them. Uniqueness rules the portal cares about
//! (one submission per owner, one application per kind, case-insensitive tag
//! names) are checked by the operations in this crate before writing.

use std::future::Future;

use uuid::Uuid;

use crate::{
  application::{Application, ApplicationKind},
  profile::{Credential, Role, UserProfile},
  session::SessionRecord,
  submission::{Placement, Submission, SubmissionQuery},
  tag::{Tag, TagCategory},
};

/// Abstraction over the portal's document store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`). Writes are last-write-wins; there
/// is no optimistic concurrency.
pub trait PortalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles and credentials ──────────────────────────────────────────

  /// Persist a new profile together with its login credential.
  fn create_account(
    &self,
    profile: UserProfile,
    credential: Credential,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// Look up a credential by (lowercased) email.
  fn find_credential(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + '_;

  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<UserProfile>, Self::Error>> + Send + '_;

  /// Overwrite a profile's role. Returns the updated profile, or `None` if
  /// no such profile exists.
  fn set_role(
    &self,
    user_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// Refresh `updated_at` on sign-in.
  fn touch_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn insert_session(
    &self,
    session: SessionRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_session(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<Option<SessionRecord>, Self::Error>> + Send + '_;

  /// Returns `true` if a session was removed.
  fn delete_session(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Submissions ───────────────────────────────────────────────────────

  fn get_submission(
    &self,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  fn find_submission_by_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Insert the submission, or replace the stored record with the same id.
  fn upsert_submission(
    &self,
    submission: Submission,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List submissions, newest first.
  fn list_submissions(
    &self,
    query: SubmissionQuery,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Write only the placement field. Returns `None` if the record is missing.
  fn set_placement(
    &self,
    submission_id: Uuid,
    placement: Option<Placement>,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Returns `true` if a record was removed.
  fn delete_submission(
    &self,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Tags ──────────────────────────────────────────────────────────────

  fn list_tags(
    &self,
    category: TagCategory,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by name within a category.
  fn find_tag(
    &self,
    category: TagCategory,
    name: String,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + '_;

  fn insert_tag(&self, tag: Tag) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn rename_tag(
    &self,
    category: TagCategory,
    tag_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + '_;

  fn delete_tag(
    &self,
    category: TagCategory,
    tag_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Increment the usage counter of the tag named `name` (case-insensitive).
  /// A missing tag is not an error.
  fn bump_tag_usage(
    &self,
    category: TagCategory,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  fn find_application(
    &self,
    kind: ApplicationKind,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  fn insert_application(
    &self,
    application: Application,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List applications, newest first, optionally of a single kind.
  fn list_applications(
    &self,
    kind: Option<ApplicationKind>,
  ) -> impl Future<Output = Result<Vec<Application>, Self::Error>> + Send + '_;
}
