//! Sessions and the role guard.
//!
//! A [`Session`] is built fresh for every request from the presented bearer
//! token: the profile (and therefore the role) is re-read each time, so a role
//! change applies on the caller's next request. Signing out deletes the stored
//! [`SessionRecord`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::profile::UserProfile;

/// Stored form of a session. Only the SHA-256 of the token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
  pub token_hash: String,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }
}

/// The signed-in caller of the current request.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
  pub profile:    UserProfile,
  pub expires_at: DateTime<Utc>,
  #[serde(skip)]
  pub token_hash: String,
}

impl Session {
  pub fn user_id(&self) -> Uuid { self.profile.user_id }

  pub fn is_admin(&self) -> bool { self.profile.role.is_admin() }
}

/// What a view or mutation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  /// Anyone, signed in or not.
  Public,
  /// Any signed-in user.
  Authenticated,
  /// A signed-in user whose role is admin.
  Admin,
}

/// Why the guard turned a caller away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
  Unauthenticated,
  NotAdmin,
}

/// Check `session` against `access`.
///
/// Runs before a handler produces anything, so a denied caller never sees
/// protected content.
pub fn authorize(session: Option<&Session>, access: Access) -> Result<(), Denied> {
  match (access, session) {
    (Access::Public, _) => Ok(()),
    (_, None) => Err(Denied::Unauthenticated),
    (Access::Authenticated, Some(_)) => Ok(()),
    (Access::Admin, Some(s)) if s.is_admin() => Ok(()),
    (Access::Admin, Some(_)) => Err(Denied::NotAdmin),
  }
}
