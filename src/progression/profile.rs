//! Pirate Profile
//!
//! Counters and point balance for one user. The profile is owned by the
//! entity store; the ledger only ever transforms snapshots of it.
//! Rank is derived from `total_points` on every read and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity-store collection holding profiles
pub const PROFILE_COLLECTION: &str = "PirateProfile";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PirateProfile {
    /// Entity-store record id (empty until first persisted)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub user_email: String,

    /// Pirate Points balance
    pub total_points: i64,

    #[serde(default)]
    pub ads_reported: u32,
    #[serde(default)]
    pub ads_killed: u32,
    #[serde(default)]
    pub alternatives_found: u32,
    #[serde(default)]
    pub content_created: u32,
    #[serde(default)]
    pub content_shared: u32,
    #[serde(default)]
    pub events_joined: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PirateProfile {
    pub fn new(user_email: impl Into<String>, starting_points: i64) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_email: user_email.into(),
            total_points: starting_points,
            ads_reported: 0,
            ads_killed: 0,
            alternatives_found: 0,
            content_created: 0,
            content_shared: 0,
            events_joined: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Profile with the given counters, for fixtures and data corrections
    pub fn with_counters(
        mut self,
        ads_reported: u32,
        ads_killed: u32,
        alternatives_found: u32,
    ) -> Self {
        self.ads_reported = ads_reported;
        self.ads_killed = ads_killed;
        self.alternatives_found = alternatives_found;
        self
    }
}
