//! Accounts: registration, sign-in, sessions and role management.
//!
//! Identity is backend-native: an email plus an argon2-hashed password.
//! Signing in issues a random bearer token; the store keeps only its SHA-256.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use crate::{
  Error, Result,
  profile::{Credential, Role, UserProfile},
  session::{Session, SessionRecord},
  store::PortalStore,
  validate::collapse_whitespace,
};

/// Account-level settings supplied by the server configuration.
#[derive(Debug, Clone)]
pub struct AccountPolicy {
  pub session_ttl:  Duration,
  /// Emails that become admins when their profile is first created.
  pub admin_emails: Vec<String>,
}

impl Default for AccountPolicy {
  fn default() -> Self {
    Self { session_ttl: Duration::hours(24), admin_emails: Vec::new() }
  }
}

impl AccountPolicy {
  fn initial_role(&self, email: &str) -> Role {
    if self.admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email)) {
      Role::Admin
    } else {
      Role::User
    }
  }
}

// ─── Passwords and tokens ────────────────────────────────────────────────────

pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

pub fn verify_password(password_hash: &str, password: &str) -> bool {
  PasswordHash::new(password_hash)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

/// SHA-256 hex digest of a bearer token.
pub fn token_hash(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

// ─── Forms ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForm {
  #[validate(email(message = "Invalid email address"), length(max = 100))]
  pub email:        String,
  #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
  pub password:     String,
  #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
  pub display_name: String,
}

/// A freshly issued session; the only time the raw token is visible.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub profile:    UserProfile,
}

// ─── Operations ──────────────────────────────────────────────────────────────

async fn open_session<S: PortalStore>(
  store: &S,
  policy: &AccountPolicy,
  profile: UserProfile,
) -> Result<IssuedSession> {
  let token = new_token();
  let now = Utc::now();
  let record = SessionRecord {
    token_hash: token_hash(&token),
    user_id:    profile.user_id,
    created_at: now,
    expires_at: now + policy.session_ttl,
  };
  let expires_at = record.expires_at;
  store.insert_session(record).await.map_err(Error::store)?;
  Ok(IssuedSession { token, expires_at, profile })
}

/// Create an account and sign it in.
pub async fn register<S: PortalStore>(
  store: &S,
  policy: &AccountPolicy,
  form: RegisterForm,
) -> Result<IssuedSession> {
  let form = RegisterForm {
    email:        form.email.trim().to_lowercase(),
    display_name: collapse_whitespace(&form.display_name),
    password:     form.password,
  };
  form.validate()?;

  if store
    .find_credential(form.email.clone())
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(Error::EmailTaken(form.email));
  }

  let now = Utc::now();
  let profile = UserProfile {
    user_id:      Uuid::new_v4(),
    email:        form.email.clone(),
    display_name: form.display_name,
    role:         policy.initial_role(&form.email),
    created_at:   now,
    updated_at:   now,
  };
  let credential = Credential {
    user_id:       profile.user_id,
    email:         form.email,
    password_hash: hash_password(&form.password)?,
  };
  store
    .create_account(profile.clone(), credential)
    .await
    .map_err(Error::store)?;

  tracing::info!(user_id = %profile.user_id, role = %profile.role, "account registered");
  open_session(store, policy, profile).await
}

/// Verify credentials, refresh the profile and issue a session.
pub async fn sign_in<S: PortalStore>(
  store: &S,
  policy: &AccountPolicy,
  email: &str,
  password: &str,
) -> Result<IssuedSession> {
  let credential = store
    .find_credential(email.trim().to_lowercase())
    .await
    .map_err(Error::store)?
    .ok_or(Error::InvalidCredentials)?;

  if !verify_password(&credential.password_hash, password) {
    return Err(Error::InvalidCredentials);
  }

  let profile = store
    .touch_profile(credential.user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::InvalidCredentials)?;

  tracing::info!(user_id = %profile.user_id, "signed in");
  open_session(store, policy, profile).await
}

/// Build the [`Session`] for a presented bearer token.
///
/// Unknown and expired tokens yield `None`; expired records are removed.
pub async fn resolve_session<S: PortalStore>(store: &S, token: &str) -> Result<Option<Session>> {
  let hash = token_hash(token);
  let Some(record) = store.get_session(hash.clone()).await.map_err(Error::store)? else {
    return Ok(None);
  };

  if record.is_expired(Utc::now()) {
    if let Err(e) = store.delete_session(hash).await {
      tracing::warn!(error = %e, "failed to remove expired session");
    }
    return Ok(None);
  }

  let profile = store
    .get_profile(record.user_id)
    .await
    .map_err(Error::store)?;

  Ok(profile.map(|profile| Session {
    profile,
    expires_at: record.expires_at,
    token_hash: record.token_hash,
  }))
}

pub async fn sign_out<S: PortalStore>(store: &S, session: &Session) -> Result<()> {
  store
    .delete_session(session.token_hash.clone())
    .await
    .map_err(Error::store)?;
  tracing::info!(user_id = %session.user_id(), "signed out");
  Ok(())
}

/// Overwrite a user's role. No audit trail is kept.
pub async fn set_role<S: PortalStore>(store: &S, user_id: Uuid, role: Role) -> Result<UserProfile> {
  let profile = store
    .set_role(user_id, role)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
  tracing::info!(%user_id, %role, "role updated");
  Ok(profile)
}

/// Set the role of the account registered under `email`.
pub async fn set_role_by_email<S: PortalStore>(
  store: &S,
  email: &str,
  role: Role,
) -> Result<UserProfile> {
  let credential = store
    .find_credential(email.trim().to_lowercase())
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("user {email}")))?;
  set_role(store, credential.user_id, role).await
}

/// All profiles matching `query` on email or display name, sorted by email.
pub async fn list_users<S: PortalStore>(store: &S, query: Option<&str>) -> Result<Vec<UserProfile>> {
  let mut users = store.list_profiles().await.map_err(Error::store)?;
  if let Some(q) = query {
    users.retain(|u| u.matches(q));
  }
  users.sort_by(|a, b| a.email.cmp(&b.email));
  Ok(users)
}
