//! Operation tests against in-memory fakes of both backend seams.

use std::{
  collections::BTreeMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use bytes::Bytes;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
  Error,
  accounts::{self, AccountPolicy, RegisterForm},
  application::{Application, ApplicationForm, ApplicationKind, file_application, list_applications},
  blob::{BlobRef, BlobStore},
  lifecycle::{
    delete_submission, get_own_submission, list_all_submissions, list_gallery, review_summary,
    save_submission, set_placement,
  },
  picker::TagPicker,
  profile::{Credential, Role, UserProfile},
  session::{Access, SessionRecord, authorize},
  store::PortalStore,
  submission::{Placement, Submission, SubmissionForm, SubmissionQuery, SubmissionStatus},
  tag::{self, Tag, TagCategory, name_key},
  upload::Upload,
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("injected failure")]
struct Injected;

#[derive(Default)]
struct State {
  profiles:     Vec<UserProfile>,
  credentials:  Vec<Credential>,
  sessions:     Vec<SessionRecord>,
  submissions:  Vec<Submission>,
  tags:         Vec<Tag>,
  applications: Vec<Application>,
}

#[derive(Default)]
struct MemoryStore {
  state:           Mutex<State>,
  fail_tag_reads:  AtomicBool,
  fail_tag_writes: AtomicBool,
  fail_upserts:    AtomicBool,
}

impl MemoryStore {
  fn submissions(&self) -> Vec<Submission> { self.state.lock().unwrap().submissions.clone() }

  fn tag_names(&self, category: TagCategory) -> Vec<String> {
    let state = self.state.lock().unwrap();
    state
      .tags
      .iter()
      .filter(|t| t.category == category)
      .map(|t| t.name.clone())
      .collect()
  }

  fn usage(&self, category: TagCategory, name: &str) -> u64 {
    let state = self.state.lock().unwrap();
    state
      .tags
      .iter()
      .find(|t| t.category == category && t.name == name)
      .map_or(0, |t| t.usage_count)
  }

  fn expire_sessions(&self) {
    let past = Utc::now() - Duration::minutes(1);
    for s in &mut self.state.lock().unwrap().sessions {
      s.expires_at = past;
    }
  }

  fn session_count(&self) -> usize { self.state.lock().unwrap().sessions.len() }
}

impl PortalStore for MemoryStore {
  type Error = Injected;

  async fn create_account(
    &self,
    profile: UserProfile,
    credential: Credential,
  ) -> Result<(), Injected> {
    let mut state = self.state.lock().unwrap();
    state.profiles.push(profile);
    state.credentials.push(credential);
    Ok(())
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, Injected> {
    let state = self.state.lock().unwrap();
    Ok(state.profiles.iter().find(|p| p.user_id == user_id).cloned())
  }

  async fn find_credential(&self, email: String) -> Result<Option<Credential>, Injected> {
    let state = self.state.lock().unwrap();
    Ok(state.credentials.iter().find(|c| c.email == email).cloned())
  }

  async fn list_profiles(&self) -> Result<Vec<UserProfile>, Injected> {
    Ok(self.state.lock().unwrap().profiles.clone())
  }

  async fn set_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserProfile>, Injected> {
    let mut state = self.state.lock().unwrap();
    Ok(state.profiles.iter_mut().find(|p| p.user_id == user_id).map(|p| {
      p.role = role;
      p.clone()
    }))
  }

  async fn touch_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, Injected> {
    let mut state = self.state.lock().unwrap();
    Ok(state.profiles.iter_mut().find(|p| p.user_id == user_id).map(|p| {
      p.updated_at = Utc::now();
      p.clone()
    }))
  }

  async fn insert_session(&self, session: SessionRecord) -> Result<(), Injected> {
    self.state.lock().unwrap().sessions.push(session);
    Ok(())
  }

  async fn get_session(&self, token_hash: String) -> Result<Option<SessionRecord>, Injected> {
    let state = self.state.lock().unwrap();
    Ok(state.sessions.iter().find(|s| s.token_hash == token_hash).cloned())
  }

  async fn delete_session(&self, token_hash: String) -> Result<bool, Injected> {
    let mut state = self.state.lock().unwrap();
    let before = state.sessions.len();
    state.sessions.retain(|s| s.token_hash != token_hash);
    Ok(state.sessions.len() != before)
  }

  async fn get_submission(&self, submission_id: Uuid) -> Result<Option<Submission>, Injected> {
    let state = self.state.lock().unwrap();
    Ok(state.submissions.iter().find(|s| s.submission_id == submission_id).cloned())
  }

  async fn find_submission_by_owner(&self, owner_id: Uuid) -> Result<Option<Submission>, Injected> {
    let state = self.state.lock().unwrap();
    Ok(state.submissions.iter().find(|s| s.owner_id == owner_id).cloned())
  }

  async fn upsert_submission(&self, submission: Submission) -> Result<(), Injected> {
    if self.fail_upserts.load(Ordering::SeqCst) {
      return Err(Injected);
    }
    let mut state = self.state.lock().unwrap();
    state.submissions.retain(|s| s.submission_id != submission.submission_id);
    state.submissions.push(submission);
    Ok(())
  }

  async fn list_submissions(&self, query: SubmissionQuery) -> Result<Vec<Submission>, Injected> {
    let state = self.state.lock().unwrap();
    // Insertion order on purpose: callers sort.
    Ok(
      state
        .submissions
        .iter()
        .filter(|s| query.status.is_none_or(|st| s.status == st))
        .cloned()
        .collect(),
    )
  }

  async fn set_placement(
    &self,
    submission_id: Uuid,
    placement: Option<Placement>,
  ) -> Result<Option<Submission>, Injected> {
    let mut state = self.state.lock().unwrap();
    Ok(
      state
        .submissions
        .iter_mut()
        .find(|s| s.submission_id == submission_id)
        .map(|s| {
          s.placement = placement;
          s.clone()
        }),
    )
  }

  async fn delete_submission(&self, submission_id: Uuid) -> Result<bool, Injected> {
    let mut state = self.state.lock().unwrap();
    let before = state.submissions.len();
    state.submissions.retain(|s| s.submission_id != submission_id);
    Ok(state.submissions.len() != before)
  }

  async fn list_tags(&self, category: TagCategory) -> Result<Vec<Tag>, Injected> {
    if self.fail_tag_reads.load(Ordering::SeqCst) {
      return Err(Injected);
    }
    let state = self.state.lock().unwrap();
    Ok(state.tags.iter().filter(|t| t.category == category).cloned().collect())
  }

  async fn find_tag(&self, category: TagCategory, name: String) -> Result<Option<Tag>, Injected> {
    let state = self.state.lock().unwrap();
    let key = name_key(&name);
    Ok(
      state
        .tags
        .iter()
        .find(|t| t.category == category && name_key(&t.name) == key)
        .cloned(),
    )
  }

  async fn insert_tag(&self, tag: Tag) -> Result<(), Injected> {
    if self.fail_tag_writes.load(Ordering::SeqCst) {
      return Err(Injected);
    }
    self.state.lock().unwrap().tags.push(tag);
    Ok(())
  }

  async fn rename_tag(
    &self,
    category: TagCategory,
    tag_id: Uuid,
    name: String,
  ) -> Result<Option<Tag>, Injected> {
    let mut state = self.state.lock().unwrap();
    Ok(
      state
        .tags
        .iter_mut()
        .find(|t| t.category == category && t.tag_id == tag_id)
        .map(|t| {
          t.name = name;
          t.clone()
        }),
    )
  }

  async fn delete_tag(&self, category: TagCategory, tag_id: Uuid) -> Result<bool, Injected> {
    let mut state = self.state.lock().unwrap();
    let before = state.tags.len();
    state.tags.retain(|t| !(t.category == category && t.tag_id == tag_id));
    Ok(state.tags.len() != before)
  }

  async fn bump_tag_usage(&self, category: TagCategory, name: String) -> Result<(), Injected> {
    let mut state = self.state.lock().unwrap();
    let key = name_key(&name);
    if let Some(t) = state
      .tags
      .iter_mut()
      .find(|t| t.category == category && name_key(&t.name) == key)
    {
      t.usage_count += 1;
    }
    Ok(())
  }

  async fn find_application(
    &self,
    kind: ApplicationKind,
    owner_id: Uuid,
  ) -> Result<Option<Application>, Injected> {
    let state = self.state.lock().unwrap();
    Ok(
      state
        .applications
        .iter()
        .find(|a| a.kind == kind && a.owner_id == owner_id)
        .cloned(),
    )
  }

  async fn insert_application(&self, application: Application) -> Result<(), Injected> {
    self.state.lock().unwrap().applications.push(application);
    Ok(())
  }

  async fn list_applications(
    &self,
    kind: Option<ApplicationKind>,
  ) -> Result<Vec<Application>, Injected> {
    let state = self.state.lock().unwrap();
    Ok(
      state
        .applications
        .iter()
        .filter(|a| kind.is_none_or(|k| a.kind == k))
        .cloned()
        .collect(),
    )
  }
}

#[derive(Default)]
struct MemoryBlobs {
  objects:         Mutex<BTreeMap<String, Bytes>>,
  puts:            AtomicUsize,
  deletes:         AtomicUsize,
  /// Fail every put after this many have succeeded.
  fail_puts_after: Mutex<Option<usize>>,
  /// Keys whose deletion fails.
  fail_deletes:    Mutex<Vec<String>>,
}

impl MemoryBlobs {
  fn keys(&self) -> Vec<String> { self.objects.lock().unwrap().keys().cloned().collect() }
}

impl BlobStore for MemoryBlobs {
  type Error = Injected;

  async fn put(&self, key: String, data: Bytes) -> Result<BlobRef, Injected> {
    let done = self.puts.fetch_add(1, Ordering::SeqCst);
    if self.fail_puts_after.lock().unwrap().is_some_and(|n| done >= n) {
      return Err(Injected);
    }
    self.objects.lock().unwrap().insert(key.clone(), data);
    Ok(BlobRef(key))
  }

  async fn get(&self, key: String) -> Result<Option<Bytes>, Injected> {
    Ok(self.objects.lock().unwrap().get(&key).cloned())
  }

  async fn delete(&self, key: String) -> Result<(), Injected> {
    self.deletes.fetch_add(1, Ordering::SeqCst);
    if self.fail_deletes.lock().unwrap().contains(&key) {
      return Err(Injected);
    }
    self.objects.lock().unwrap().remove(&key).map(|_| ()).ok_or(Injected)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn user(email: &str) -> UserProfile {
  let now = Utc::now();
  UserProfile {
    user_id:      Uuid::new_v4(),
    email:        email.to_owned(),
    display_name: "Ada".to_owned(),
    role:         Role::User,
    created_at:   now,
    updated_at:   now,
  }
}

fn png(name: &str) -> Upload { Upload::new(name, "image/png", vec![0x89u8, b'P', b'N', b'G']) }

fn complete_form() -> SubmissionForm {
  SubmissionForm {
    full_name: "Ada  Lovelace ".into(),
    email: "ada@example.com".into(),
    github_url: "https://github.com/ada/engine".into(),
    app_purpose: "Computes Bernoulli numbers on demand.".into(),
    website_url: Some("   ".into()),
    interests: vec!["Machine Learning".into()],
    expertise: vec!["Python".into()],
    tech_stack: vec!["React".into(), "react".into()],
    ..Default::default()
  }
}

fn application_form() -> ApplicationForm {
  ApplicationForm {
    name: "Grace Hopper".into(),
    email: "grace@example.com".into(),
    interests: vec!["IoT".into()],
    expertise: vec!["Git".into()],
    tech_stack: vec!["Docker".into()],
    ..Default::default()
  }
}

fn validation_fields(err: Error) -> Vec<String> {
  match err {
    Error::Validation(errors) => errors.fields().map(str::to_owned).collect(),
    other => panic!("expected validation error, got {other:?}"),
  }
}

// ─── Submission lifecycle ────────────────────────────────────────────────────

#[tokio::test]
async fn draft_save_skips_required_fields() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let saved = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Draft,
    SubmissionForm::default(),
    vec![],
  )
  .await
  .unwrap();

  assert_eq!(saved.status, SubmissionStatus::Draft);
  assert_eq!(saved.owner_id, owner.user_id);
  assert!(saved.full_name.is_empty());
  assert_eq!(store.submissions().len(), 1);
}

#[tokio::test]
async fn submit_requires_every_field_before_any_upload() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let form = SubmissionForm { github_url: "https://gitlab.com/ada".into(), ..Default::default() };
  let err = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Submitted,
    form,
    vec![png("a.png")],
  )
  .await
  .unwrap_err();

  let fields = validation_fields(err);
  for field in [
    "full_name",
    "email",
    "github_url",
    "app_purpose",
    "interests",
    "expertise",
    "tech_stack",
  ] {
    assert!(fields.iter().any(|f| f == field), "missing {field} in {fields:?}");
  }
  assert_eq!(blobs.puts.load(Ordering::SeqCst), 0);
  assert!(store.submissions().is_empty());
}

#[tokio::test]
async fn submit_requires_a_screenshot() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let err = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Submitted,
    complete_form(),
    vec![],
  )
  .await
  .unwrap_err();
  assert_eq!(validation_fields(err), vec!["screenshots".to_string()]);
}

#[tokio::test]
async fn submit_sanitises_uploads_and_counts_tag_usage() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");
  for category in TagCategory::all() {
    tag::seed_defaults(&store, category).await.unwrap();
  }

  let saved = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Submitted,
    complete_form(),
    vec![png("one.png"), png("two.png")],
  )
  .await
  .unwrap();

  assert!(saved.is_submitted());
  assert_eq!(saved.full_name, "Ada Lovelace");
  assert_eq!(saved.website_url, None);
  assert_eq!(saved.tech_stack, vec!["React".to_string()]);
  assert_eq!(saved.screenshots.len(), 2);
  assert!(saved.screenshots.iter().all(|s| s.key().starts_with("screenshots/")));
  assert_eq!(blobs.keys().len(), 2);

  assert_eq!(store.usage(TagCategory::Interests, "Machine Learning"), 1);
  assert_eq!(store.usage(TagCategory::TechStack, "React"), 1);

  // Re-submitting is not a new transition.
  let form = SubmissionForm { screenshots: saved.screenshots.clone(), ..complete_form() };
  save_submission(&store, &blobs, &owner, SubmissionStatus::Submitted, form, vec![])
    .await
    .unwrap();
  assert_eq!(store.usage(TagCategory::TechStack, "React"), 1);
}

#[tokio::test]
async fn identically_named_uploads_are_stored_separately() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let saved = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Submitted,
    complete_form(),
    vec![png("image.png"), png("image.png")],
  )
  .await
  .unwrap();

  assert_eq!(saved.screenshots.len(), 2);
  assert_ne!(saved.screenshots[0], saved.screenshots[1]);
  assert_eq!(blobs.keys().len(), 2);
  assert_eq!(blobs.puts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn resave_updates_the_same_record() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let first = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Draft,
    complete_form(),
    vec![png("one.png"), png("two.png")],
  )
  .await
  .unwrap();

  // Keep the second screenshot, drop the first, add one and smuggle in a
  // reference the record never held.
  let kept = first.screenshots[1].clone();
  let form = SubmissionForm {
    screenshots: vec![kept.clone(), BlobRef("screenshots/someone_else.png".into())],
    ..complete_form()
  };
  let second = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Submitted,
    form,
    vec![png("three.png")],
  )
  .await
  .unwrap();

  assert_eq!(second.submission_id, first.submission_id);
  assert_eq!(second.created_at, first.created_at);
  assert!(second.updated_at >= first.updated_at);
  assert_eq!(second.screenshots.len(), 2);
  assert_eq!(second.screenshots[0], kept);
  assert!(second.screenshots[1].key().ends_with("three.png"));
  assert_eq!(store.submissions().len(), 1);
}

#[tokio::test]
async fn saving_resets_placement() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let saved = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Submitted,
    complete_form(),
    vec![png("one.png")],
  )
  .await
  .unwrap();
  set_placement(&store, saved.submission_id, Some(Placement::First)).await.unwrap();

  let form = SubmissionForm { screenshots: saved.screenshots.clone(), ..complete_form() };
  let resaved = save_submission(&store, &blobs, &owner, SubmissionStatus::Submitted, form, vec![])
    .await
    .unwrap();
  assert_eq!(resaved.placement, None);
}

#[tokio::test]
async fn upload_failure_aborts_the_save() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let draft = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Draft,
    SubmissionForm { full_name: "Draft Name".into(), ..Default::default() },
    vec![],
  )
  .await
  .unwrap();

  *blobs.fail_puts_after.lock().unwrap() = Some(1);
  let err = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Submitted,
    complete_form(),
    vec![png("one.png"), png("two.png"), png("three.png")],
  )
  .await
  .unwrap_err();

  assert!(matches!(err, Error::Blob(_)));
  // The second put failed; the third was never tried.
  assert_eq!(blobs.puts.load(Ordering::SeqCst), 2);
  assert_eq!(store.submissions(), vec![draft]);
}

#[tokio::test]
async fn store_failure_surfaces_as_store_error() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  store.fail_upserts.store(true, Ordering::SeqCst);

  let err = save_submission(
    &store,
    &blobs,
    &user("ada@example.com"),
    SubmissionStatus::Draft,
    SubmissionForm::default(),
    vec![],
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::Store(_)));
}

#[tokio::test]
async fn file_rules_apply_to_drafts() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let six: Vec<Upload> = (0..6).map(|i| png(&format!("{i}.png"))).collect();
  let err = save_submission(&store, &blobs, &owner, SubmissionStatus::Draft, Default::default(), six)
    .await
    .unwrap_err();
  assert_eq!(validation_fields(err), vec!["screenshots".to_string()]);

  let text = Upload::new("notes.txt", "text/plain", vec![1u8]);
  let err = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Draft,
    Default::default(),
    vec![text],
  )
  .await
  .unwrap_err();
  assert!(err.is_validation());
  assert_eq!(blobs.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn own_submission_lookup() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  assert!(get_own_submission(&store, &owner).await.unwrap().is_none());
  save_submission(&store, &blobs, &owner, SubmissionStatus::Draft, Default::default(), vec![])
    .await
    .unwrap();
  assert!(get_own_submission(&store, &owner).await.unwrap().is_some());
  assert!(get_own_submission(&store, &user("bob@example.com")).await.unwrap().is_none());
}

// ─── Gallery and review ──────────────────────────────────────────────────────

fn stored(status: SubmissionStatus, age_minutes: i64) -> Submission {
  let at = Utc::now() - Duration::minutes(age_minutes);
  Submission {
    submission_id: Uuid::new_v4(),
    owner_id: Uuid::new_v4(),
    owner_email: "x@example.com".into(),
    full_name: format!("entry {age_minutes}"),
    email: "x@example.com".into(),
    github_url: "https://github.com/x/y".into(),
    app_purpose: "Something worth building.".into(),
    linkedin_url: None,
    twitter_url: None,
    facebook_url: None,
    instagram_url: None,
    website_url: None,
    screenshots: vec![],
    interests: vec![],
    expertise: vec![],
    tech_stack: vec![],
    status,
    placement: None,
    created_at: at,
    updated_at: at,
  }
}

#[tokio::test]
async fn gallery_lists_submitted_newest_first() {
  let store = MemoryStore::default();
  for s in [
    stored(SubmissionStatus::Submitted, 30),
    stored(SubmissionStatus::Draft, 5),
    stored(SubmissionStatus::Submitted, 1),
    stored(SubmissionStatus::Submitted, 60),
  ] {
    store.upsert_submission(s).await.unwrap();
  }

  let gallery = list_gallery(&store).await.unwrap();
  let names: Vec<_> = gallery.iter().map(|s| s.full_name.as_str()).collect();
  assert_eq!(names, vec!["entry 1", "entry 30", "entry 60"]);

  let all = list_all_submissions(&store).await.unwrap();
  assert_eq!(all.len(), 4);
  assert_eq!(all[1].full_name, "entry 5");
}

#[tokio::test]
async fn placements_are_independent() {
  let store = MemoryStore::default();
  let a = stored(SubmissionStatus::Submitted, 10);
  let b = stored(SubmissionStatus::Submitted, 20);
  store.upsert_submission(a.clone()).await.unwrap();
  store.upsert_submission(b.clone()).await.unwrap();

  set_placement(&store, a.submission_id, Some(Placement::First)).await.unwrap();
  set_placement(&store, b.submission_id, Some(Placement::First)).await.unwrap();

  let summary = review_summary(&store).await.unwrap();
  assert_eq!(summary.total, 2);
  assert_eq!(summary.placed, 2);
  assert_eq!(summary.first.as_ref().map(|w| w.submission_id), Some(a.submission_id));
  assert_eq!(summary.second, None);

  let cleared = set_placement(&store, a.submission_id, None).await.unwrap();
  assert_eq!(cleared.placement, None);
  let summary = review_summary(&store).await.unwrap();
  assert_eq!(summary.first.map(|w| w.submission_id), Some(b.submission_id));

  let missing = set_placement(&store, Uuid::new_v4(), Some(Placement::Third)).await;
  assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn delete_attempts_every_image_then_the_record() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("ada@example.com");

  let saved = save_submission(
    &store,
    &blobs,
    &owner,
    SubmissionStatus::Submitted,
    complete_form(),
    vec![png("one.png"), png("two.png"), png("three.png")],
  )
  .await
  .unwrap();
  blobs
    .fail_deletes
    .lock()
    .unwrap()
    .push(saved.screenshots[0].key().to_owned());

  let report = delete_submission(&store, &blobs, saved.submission_id).await.unwrap();

  assert_eq!(blobs.deletes.load(Ordering::SeqCst), 3);
  assert_eq!(report.images_deleted, 2);
  assert_eq!(report.images_failed, 1);
  assert!(store.submissions().is_empty());
  assert_eq!(blobs.keys(), vec![saved.screenshots[0].key().to_owned()]);
}

#[tokio::test]
async fn delete_survives_every_image_failing() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let mut entry = stored(SubmissionStatus::Submitted, 1);
  entry.screenshots = vec![
    BlobRef("screenshots/gone_a.png".into()),
    BlobRef("screenshots/gone_b.png".into()),
  ];
  store.upsert_submission(entry.clone()).await.unwrap();

  let report = delete_submission(&store, &blobs, entry.submission_id).await.unwrap();
  assert_eq!(report.images_failed, 2);
  assert!(store.submissions().is_empty());

  let again = delete_submission(&store, &blobs, entry.submission_id).await;
  assert!(matches!(again, Err(Error::NotFound(_))));
}

// ─── Tags ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tag_names_are_unique_case_insensitively() {
  let store = MemoryStore::default();
  let created = tag::create_tag(&store, TagCategory::Interests, "  Rust  Lang ").await.unwrap();
  assert_eq!(created.name, "Rust Lang");

  let dup = tag::create_tag(&store, TagCategory::Interests, "rust lang").await;
  assert!(matches!(dup, Err(Error::DuplicateTag { .. })));

  // Other categories are separate lists.
  tag::create_tag(&store, TagCategory::Expertise, "RUST LANG").await.unwrap();

  assert!(tag::create_tag(&store, TagCategory::Interests, "   ").await.unwrap_err().is_validation());
  assert!(
    tag::create_tag(&store, TagCategory::Interests, &"x".repeat(51))
      .await
      .unwrap_err()
      .is_validation()
  );
}

#[tokio::test]
async fn rename_and_delete_tags() {
  let store = MemoryStore::default();
  let a = tag::create_tag(&store, TagCategory::TechStack, "postgres").await.unwrap();
  let b = tag::create_tag(&store, TagCategory::TechStack, "Redis").await.unwrap();

  let renamed = tag::rename_tag(&store, TagCategory::TechStack, a.tag_id, "Postgres").await.unwrap();
  assert_eq!(renamed.name, "Postgres");

  let clash = tag::rename_tag(&store, TagCategory::TechStack, a.tag_id, "redis").await;
  assert!(matches!(clash, Err(Error::DuplicateTag { .. })));

  tag::delete_tag(&store, TagCategory::TechStack, b.tag_id).await.unwrap();
  let missing = tag::delete_tag(&store, TagCategory::TechStack, b.tag_id).await;
  assert!(matches!(missing, Err(Error::NotFound(_))));

  let listed = tag::list_tags(&store, TagCategory::TechStack).await.unwrap();
  assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn seeding_skips_existing_names() {
  let store = MemoryStore::default();
  tag::create_tag(&store, TagCategory::Expertise, "python").await.unwrap();

  let report = tag::seed_defaults(&store, TagCategory::Expertise).await.unwrap();
  let defaults = TagCategory::Expertise.defaults().len();
  assert_eq!(report.added, defaults - 1);
  assert_eq!(report.skipped, 1);

  let again = tag::seed_defaults(&store, TagCategory::Expertise).await.unwrap();
  assert_eq!(again.added, 0);
  assert_eq!(again.skipped, defaults);

  let listed = tag::list_tags(&store, TagCategory::Expertise).await.unwrap();
  let keys: Vec<_> = listed.iter().map(|t| name_key(&t.name)).collect();
  let mut sorted = keys.clone();
  sorted.sort();
  assert_eq!(keys, sorted);
}

#[tokio::test]
async fn picker_rejects_duplicates_of_loaded_and_selected() {
  let store = MemoryStore::default();
  tag::create_tag(&store, TagCategory::Interests, "IoT").await.unwrap();

  let mut picker = TagPicker::new(TagCategory::Interests, vec!["Quantum".into()]);
  picker.load(&store).await;
  assert_eq!(picker.available(), ["IoT".to_string()]);

  assert!(matches!(picker.create(&store, "iot").await, Err(Error::DuplicateTag { .. })));
  assert!(matches!(picker.create(&store, "QUANTUM").await, Err(Error::DuplicateTag { .. })));
  assert_eq!(picker.selected(), ["Quantum".to_string()]);

  let added = picker.create(&store, " Edge AI ").await.unwrap();
  assert_eq!(added.name, "Edge AI");
  assert!(added.persisted);
  assert!(picker.is_selected("Edge AI"));
  assert!(store.tag_names(TagCategory::Interests).contains(&"Edge AI".to_string()));

  picker.toggle("Edge AI");
  assert!(!picker.is_selected("Edge AI"));
  picker.toggle("IoT");
  assert_eq!(picker.into_selected(), vec!["Quantum".to_string(), "IoT".to_string()]);
}

#[tokio::test]
async fn picker_keeps_tag_locally_when_store_write_fails() {
  let store = MemoryStore::default();
  store.fail_tag_writes.store(true, Ordering::SeqCst);

  let mut picker = TagPicker::new(TagCategory::Expertise, vec![]);
  picker.load(&store).await;
  let added = picker.create(&store, "Zig").await.unwrap();

  assert!(!added.persisted);
  assert!(picker.is_selected("Zig"));
  assert!(picker.available().contains(&"Zig".to_string()));
  assert!(store.tag_names(TagCategory::Expertise).is_empty());
}

#[tokio::test]
async fn picker_falls_back_to_defaults() {
  let store = MemoryStore::default();
  store.fail_tag_reads.store(true, Ordering::SeqCst);

  let mut picker = TagPicker::new(TagCategory::TechStack, vec![]);
  picker.load(&store).await;
  assert_eq!(picker.available().len(), TagCategory::TechStack.defaults().len());
  assert_eq!(picker.category(), TagCategory::TechStack);
}

// ─── Applications ────────────────────────────────────────────────────────────

fn resume() -> Upload { Upload::new("My CV.pdf", "application/pdf", vec![b'%', b'P', b'D', b'F']) }

#[tokio::test]
async fn mentor_application_requires_resume() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("grace@example.com");

  let err = file_application(&store, &blobs, &owner, ApplicationKind::Mentor, application_form(), None)
    .await
    .unwrap_err();
  assert_eq!(validation_fields(err), vec!["resume".to_string()]);

  let filed = file_application(
    &store,
    &blobs,
    &owner,
    ApplicationKind::Mentor,
    application_form(),
    Some(resume()),
  )
  .await
  .unwrap();
  let key = filed.resume.as_ref().unwrap().key().to_owned();
  assert!(key.starts_with(&format!("mentors/{}/resume_", owner.user_id)));
  assert!(key.ends_with(".pdf"));
  assert_eq!(blobs.keys(), vec![key]);
}

#[tokio::test]
async fn one_application_per_kind() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("grace@example.com");

  file_application(&store, &blobs, &owner, ApplicationKind::Mentee, application_form(), None)
    .await
    .unwrap();
  let again =
    file_application(&store, &blobs, &owner, ApplicationKind::Mentee, application_form(), None).await;
  assert!(matches!(again, Err(Error::AlreadyApplied(ApplicationKind::Mentee))));

  // A mentor application is still allowed, but a second one is refused
  // before its resume is uploaded.
  file_application(
    &store,
    &blobs,
    &owner,
    ApplicationKind::Mentor,
    application_form(),
    Some(resume()),
  )
  .await
  .unwrap();
  let puts = blobs.puts.load(Ordering::SeqCst);
  let again = file_application(
    &store,
    &blobs,
    &owner,
    ApplicationKind::Mentor,
    application_form(),
    Some(resume()),
  )
  .await;
  assert!(matches!(again, Err(Error::AlreadyApplied(ApplicationKind::Mentor))));
  assert_eq!(blobs.puts.load(Ordering::SeqCst), puts);

  let all = list_applications(&store, None).await.unwrap();
  assert_eq!(all.len(), 2);
  let mentees = list_applications(&store, Some(ApplicationKind::Mentee)).await.unwrap();
  assert_eq!(mentees.len(), 1);
}

#[tokio::test]
async fn application_validation() {
  let store = MemoryStore::default();
  let blobs = MemoryBlobs::default();
  let owner = user("grace@example.com");

  let form = ApplicationForm { tech_stack: vec![], ..application_form() };
  let err = file_application(&store, &blobs, &owner, ApplicationKind::Mentee, form, None)
    .await
    .unwrap_err();
  assert_eq!(validation_fields(err), vec!["tech_stack".to_string()]);

  let err = file_application(
    &store,
    &blobs,
    &owner,
    ApplicationKind::Mentee,
    application_form(),
    Some(resume()),
  )
  .await
  .unwrap_err();
  assert_eq!(validation_fields(err), vec!["resume".to_string()]);

  let doc = Upload::new("cv.png", "image/png", vec![1u8]);
  let err =
    file_application(&store, &blobs, &owner, ApplicationKind::Mentor, application_form(), Some(doc))
      .await
      .unwrap_err();
  assert!(err.is_validation());
  assert_eq!(blobs.puts.load(Ordering::SeqCst), 0);
}

// ─── Accounts and sessions ───────────────────────────────────────────────────

fn register_form(email: &str) -> RegisterForm {
  RegisterForm {
    email:        email.to_owned(),
    password:     "correct horse".to_owned(),
    display_name: " Ada   L ".to_owned(),
  }
}

#[tokio::test]
async fn register_sign_in_and_out() {
  let store = MemoryStore::default();
  let policy = AccountPolicy::default();

  let issued = accounts::register(&store, &policy, register_form("Ada@Example.com")).await.unwrap();
  assert_eq!(issued.profile.email, "ada@example.com");
  assert_eq!(issued.profile.display_name, "Ada L");
  assert_eq!(issued.profile.role, Role::User);
  assert_eq!(issued.token.len(), 64);

  let session = accounts::resolve_session(&store, &issued.token).await.unwrap().unwrap();
  assert_eq!(session.user_id(), issued.profile.user_id);
  assert!(authorize(Some(&session), Access::Authenticated).is_ok());
  assert!(authorize(Some(&session), Access::Admin).is_err());

  let again = accounts::sign_in(&store, &policy, "ADA@example.com", "correct horse").await.unwrap();
  assert_ne!(again.token, issued.token);

  let wrong = accounts::sign_in(&store, &policy, "ada@example.com", "battery staple").await;
  assert!(matches!(wrong, Err(Error::InvalidCredentials)));
  let unknown = accounts::sign_in(&store, &policy, "nobody@example.com", "correct horse").await;
  assert!(matches!(unknown, Err(Error::InvalidCredentials)));

  accounts::sign_out(&store, &session).await.unwrap();
  assert!(accounts::resolve_session(&store, &issued.token).await.unwrap().is_none());
  assert!(accounts::resolve_session(&store, &again.token).await.unwrap().is_some());
}

#[tokio::test]
async fn registration_rules() {
  let store = MemoryStore::default();
  let policy = AccountPolicy::default();

  accounts::register(&store, &policy, register_form("ada@example.com")).await.unwrap();
  let taken = accounts::register(&store, &policy, register_form("ADA@example.com")).await;
  assert!(matches!(taken, Err(Error::EmailTaken(_))));

  let short = RegisterForm { password: "short".into(), ..register_form("bob@example.com") };
  let err = accounts::register(&store, &policy, short).await.unwrap_err();
  assert_eq!(validation_fields(err), vec!["password".to_string()]);
}

#[tokio::test]
async fn admin_bootstrap_and_role_changes() {
  let store = MemoryStore::default();
  let policy = AccountPolicy {
    admin_emails: vec!["Root@Example.com".into()],
    ..Default::default()
  };

  let admin = accounts::register(&store, &policy, register_form("root@example.com")).await.unwrap();
  assert_eq!(admin.profile.role, Role::Admin);

  let user = accounts::register(&store, &policy, register_form("bob@example.com")).await.unwrap();
  let before = accounts::resolve_session(&store, &user.token).await.unwrap().unwrap();
  assert!(!before.is_admin());

  accounts::set_role(&store, user.profile.user_id, Role::Admin).await.unwrap();
  let after = accounts::resolve_session(&store, &user.token).await.unwrap().unwrap();
  assert!(after.is_admin());

  let demoted = accounts::set_role_by_email(&store, "BOB@example.com", Role::Moderator)
    .await
    .unwrap();
  assert_eq!(demoted.role, Role::Moderator);
  let missing = accounts::set_role(&store, Uuid::new_v4(), Role::User).await;
  assert!(matches!(missing, Err(Error::NotFound(_))));

  let found = accounts::list_users(&store, Some("BOB")).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(accounts::list_users(&store, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn expired_sessions_are_removed() {
  let store = MemoryStore::default();
  let issued = accounts::register(&store, &AccountPolicy::default(), register_form("ada@example.com"))
    .await
    .unwrap();
  store.expire_sessions();

  assert!(accounts::resolve_session(&store, &issued.token).await.unwrap().is_none());
  assert_eq!(store.session_count(), 0);
  assert!(accounts::resolve_session(&store, "not-a-token").await.unwrap().is_none());
}

#[test]
fn password_hashes_verify() {
  let hash = accounts::hash_password("hunter22").unwrap();
  assert!(hash.starts_with("$argon2"));
  assert!(accounts::verify_password(&hash, "hunter22"));
  assert!(!accounts::verify_password(&hash, "hunter23"));
  assert!(!accounts::verify_password("not a phc string", "hunter22"));
}
