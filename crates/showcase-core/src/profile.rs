//! User profiles and the role attached to each one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Access level attached to a profile.
///
/// The three roles form a flat set: only [`Role::Admin`] unlocks anything
/// beyond what a signed-in user can do.
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
pub enum Role {
  Admin,
  Moderator,
  #[default]
  User,
}

impl Role {
  pub fn is_admin(self) -> bool { self == Self::Admin }
}

/// The public identity record of a signed-up user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:      Uuid,
  pub email:        String,
  pub display_name: String,
  pub role:         Role,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl UserProfile {
  /// Case-insensitive substring match over email and display name.
  pub fn matches(&self, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty()
      || self.email.to_lowercase().contains(&query)
      || self.display_name.to_lowercase().contains(&query)
  }
}

/// Stored login secret for a profile. Never serialised to clients.
#[derive(Debug, Clone)]
pub struct Credential {
  pub user_id:       Uuid,
  /// Lowercased email; unique across credentials.
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}
