//! Achievements
//!
//! Badges are predicates over profile counters, re-evaluated on every read.
//! Nothing records that a badge was granted, so lowering a counter revokes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::progression::profile::PirateProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementId {
    FirstBlood,
    SilentKiller,
    BargainHunter,
    DsaGuardian,
}

impl AchievementId {
    pub const ALL: [AchievementId; 4] = [
        AchievementId::FirstBlood,
        AchievementId::SilentKiller,
        AchievementId::BargainHunter,
        AchievementId::DsaGuardian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstBlood => "first-blood",
            AchievementId::SilentKiller => "silent-killer",
            AchievementId::BargainHunter => "bargain-hunter",
            AchievementId::DsaGuardian => "dsa-guardian",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AchievementId::FirstBlood => "First Blood",
            AchievementId::SilentKiller => "Silent Killer",
            AchievementId::BargainHunter => "Bargain Hunter",
            AchievementId::DsaGuardian => "DSA Guardian",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::FirstBlood => "Report your first misleading ad",
            AchievementId::SilentKiller => "Get 10 reported ads taken down",
            AchievementId::BargainHunter => "Find 5 honest alternatives",
            AchievementId::DsaGuardian => "Report 25 misleading ads",
        }
    }

    pub fn is_earned(&self, profile: &PirateProfile) -> bool {
        match self {
            AchievementId::FirstBlood => profile.ads_reported >= 1,
            AchievementId::SilentKiller => profile.ads_killed >= 10,
            AchievementId::BargainHunter => profile.alternatives_found >= 5,
            AchievementId::DsaGuardian => profile.ads_reported >= 25,
        }
    }
}

pub fn achievements_earned(profile: &PirateProfile) -> BTreeSet<AchievementId> {
    AchievementId::ALL
        .into_iter()
        .filter(|id| id.is_earned(profile))
        .collect()
}
