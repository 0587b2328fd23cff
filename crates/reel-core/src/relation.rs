//! Relation state — likes and subscriptions.
//!
//! A relation row encodes an on/off social state between an actor and a
//! target: existence means "on", absence means "off". Rows are created on
//! toggle-on and deleted on toggle-off; no update ever touches one. At most
//! one row exists per tuple, enforced by a uniqueness constraint in the
//! store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Like targets ────────────────────────────────────────────────────────────

/// The kind of entity a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeTarget {
  Video,
  Comment,
  Tweet,
}

impl LikeTarget {
  /// The discriminant string stored in the `target_kind` column.
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Video => "video",
      Self::Comment => "comment",
      Self::Tweet => "tweet",
    }
  }
}

// ─── Subscription listings ───────────────────────────────────────────────────

/// One row of a subscriber or subscribed-channel listing: the counterpart
/// profile plus when the subscription was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEntry {
  #[serde(flatten)]
  pub profile:       crate::user::OwnerProfile,
  pub subscribed_at: DateTime<Utc>,
}

// ─── Toggle ──────────────────────────────────────────────────────────────────

/// The state a toggle operation left the relation in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
  On,
  Off,
}

impl ToggleState {
  pub fn is_on(self) -> bool { matches!(self, Self::On) }
}
