//! Progression Ledger
//!
//! Bundles the rank table, fee rate and award schedule behind one value so
//! callers (service, HTTP layer, tests) share a single configuration.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::LedgerResult;
use crate::progression::achievements::{achievements_earned, AchievementId};
use crate::progression::conversion::{self, ConversionReceipt, FeeRate, CONVERSION_FEE};
use crate::progression::events::{self, AwardSchedule, EarningEvent};
use crate::progression::profile::PirateProfile;
use crate::progression::rank::{self, Progress, RankTier, RANK_TIERS};

/// Everything derived from a profile for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub rank_name: &'static str,
    pub progress: Progress,
    pub achievements: BTreeSet<AchievementId>,
}

#[derive(Debug, Clone)]
pub struct ProgressionLedger {
    tiers: &'static [RankTier],
    fee_rate: FeeRate,
    awards: AwardSchedule,
}

impl ProgressionLedger {
    /// Ledger over a custom tier table; the table must be a valid partition
    pub fn with_tiers(tiers: &'static [RankTier]) -> LedgerResult<Self> {
        rank::validate_tiers(tiers)?;
        Ok(Self {
            tiers,
            ..Self::default()
        })
    }

    pub fn with_fee_rate(mut self, fee_rate: FeeRate) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    pub fn with_awards(mut self, awards: AwardSchedule) -> Self {
        self.awards = awards;
        self
    }

    pub fn tiers(&self) -> &'static [RankTier] {
        self.tiers
    }

    pub fn fee_rate(&self) -> FeeRate {
        self.fee_rate
    }

    pub fn awards(&self) -> &AwardSchedule {
        &self.awards
    }

    pub fn rank_for(&self, points: i64) -> LedgerResult<RankTier> {
        rank::rank_for(self.tiers, points)
    }

    pub fn progress_to_next(&self, points: i64) -> LedgerResult<Progress> {
        rank::progress_to_next(self.tiers, points)
    }

    pub fn apply_event(
        &self,
        profile: &PirateProfile,
        event: EarningEvent,
    ) -> LedgerResult<PirateProfile> {
        events::apply_event(profile, event)
    }

    pub fn record_takedown(&self, profile: &PirateProfile) -> LedgerResult<PirateProfile> {
        events::record_takedown(profile)
    }

    /// Conversion at this ledger's fee rate
    pub fn convert(&self, points: i64, points_to_convert: i64) -> LedgerResult<ConversionReceipt> {
        conversion::convert(points, points_to_convert, self.fee_rate)
    }

    pub fn achievements_earned(&self, profile: &PirateProfile) -> BTreeSet<AchievementId> {
        achievements_earned(profile)
    }

    pub fn summarize(&self, profile: &PirateProfile) -> LedgerResult<ProfileSummary> {
        let progress = self.progress_to_next(profile.total_points)?;
        Ok(ProfileSummary {
            rank_name: progress.current_tier.name,
            progress,
            achievements: self.achievements_earned(profile),
        })
    }
}

impl Default for ProgressionLedger {
    fn default() -> Self {
        Self {
            tiers: RANK_TIERS,
            fee_rate: CONVERSION_FEE,
            awards: AwardSchedule::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;

    static SHORT_TABLE: &[RankTier] = &[
        RankTier::new("Landlubber", 0, Some(9)),
        RankTier::new("Buccaneer", 10, None),
    ];

    static BROKEN_TABLE: &[RankTier] = &[
        RankTier::new("Landlubber", 0, Some(9)),
        RankTier::new("Buccaneer", 12, None),
    ];

    #[test]
    fn test_report_then_rank_up() {
        let ledger = ProgressionLedger::default();
        let profile = PirateProfile::new("anne@bonny.example", 90).with_counters(2, 0, 0);

        let updated = ledger
            .apply_event(&profile, EarningEvent::ReportViolation { points_delta: 25 })
            .unwrap();

        assert_eq!(updated.total_points, 115);
        assert_eq!(updated.ads_reported, 3);
        assert_eq!(ledger.rank_for(updated.total_points).unwrap().name, "Crew Mate");
    }

    #[test]
    fn test_summary() {
        let ledger = ProgressionLedger::default();
        let profile = PirateProfile::new("anne@bonny.example", 0).with_counters(1, 0, 0);

        let summary = ledger.summarize(&profile).unwrap();
        assert_eq!(summary.rank_name, "Deck Swabber");
        assert_eq!(summary.progress.points_remaining, Some(100));
        assert!(summary.achievements.contains(&AchievementId::FirstBlood));
    }

    #[test]
    fn test_custom_tables() {
        let ledger = ProgressionLedger::with_tiers(SHORT_TABLE).unwrap();
        assert_eq!(ledger.rank_for(10).unwrap().name, "Buccaneer");
        assert!(ledger.progress_to_next(10).unwrap().next_tier.is_none());

        assert!(matches!(
            ProgressionLedger::with_tiers(BROKEN_TABLE),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_custom_fee_rate() {
        let rate = FeeRate::from_basis_points(1_000).unwrap();
        let ledger = ProgressionLedger::default().with_fee_rate(rate);
        let receipt = ledger.convert(100, 15).unwrap();
        assert_eq!(receipt.fee, 2);
        assert_eq!(receipt.doubloons_received, 13);
    }
}
