//! Profile Service - Main Orchestrator
//!
//! Fetches a fresh profile snapshot, runs it through the ledger and writes
//! the result back. Every mutation starts from a re-fetched snapshot; the
//! store's update semantics decide concurrent writes.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::progression::{
    ConversionReceipt, EarningEvent, PirateProfile, ProfileSummary, ProgressionLedger,
    PROFILE_COLLECTION,
};
use crate::service::optimistic::{Optimistic, Settled};
use crate::store::{EntityStore, Filter, KeyValueStore, Record, SortKey, Wallet, WalletBalance};

/// Profile plus everything derived from it
#[derive(Debug, Clone, Serialize)]
pub struct ProfileOverview {
    pub profile: PirateProfile,
    pub summary: ProfileSummary,
    pub doubloons: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapOutcome {
    pub profile: PirateProfile,
    pub receipt: ConversionReceipt,
    pub balance: WalletBalance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub user_email: String,
    pub total_points: i64,
    pub rank_name: &'static str,
}

pub struct ProfileService<S, K> {
    store: S,
    wallet: Wallet<K>,
    ledger: ProgressionLedger,
    starting_points: i64,
}

fn profile_from_record(record: Record) -> Result<PirateProfile> {
    let mut profile: PirateProfile = serde_json::from_value(record.data)
        .with_context(|| format!("Malformed profile record {}", record.id))?;
    profile.id = record.id;
    Ok(profile)
}

/// Record body for a profile (the id lives on the record, not in the body)
fn profile_body(profile: &PirateProfile) -> Result<Value> {
    let mut body = serde_json::to_value(profile).context("Failed to serialize profile")?;
    if let Value::Object(fields) = &mut body {
        fields.remove("id");
    }
    Ok(body)
}

impl<S: EntityStore, K: KeyValueStore> ProfileService<S, K> {
    pub fn new(store: S, kv: K, ledger: ProgressionLedger, starting_points: i64) -> Self {
        Self {
            store,
            wallet: Wallet::new(kv),
            ledger,
            starting_points,
        }
    }

    pub fn ledger(&self) -> &ProgressionLedger {
        &self.ledger
    }

    pub fn wallet(&self) -> &Wallet<K> {
        &self.wallet
    }

    /// Existing profile for `user_email`, created with the starting balance on first visit
    pub async fn get_or_create_profile(&self, user_email: &str) -> Result<PirateProfile> {
        if let Some(profile) = self.find_profile(user_email).await? {
            return Ok(profile);
        }

        let profile = PirateProfile::new(user_email, self.starting_points);
        let record = self
            .store
            .create(PROFILE_COLLECTION, profile_body(&profile)?)
            .await
            .context("Failed to create profile")?;

        info!(
            user = %user_email,
            starting_points = self.starting_points,
            "Created pirate profile"
        );

        profile_from_record(record)
    }

    pub async fn find_profile(&self, user_email: &str) -> Result<Option<PirateProfile>> {
        let mut records = self
            .store
            .filter(PROFILE_COLLECTION, &Filter::new().eq("user_email", user_email))
            .await
            .context("Failed to look up profile")?;

        if records.len() > 1 {
            warn!(
                user = %user_email,
                count = records.len(),
                "Duplicate profiles found, using the oldest"
            );
        }

        if records.is_empty() {
            return Ok(None);
        }
        profile_from_record(records.swap_remove(0)).map(Some)
    }

    /// Apply an earning event to a fresh snapshot and persist it
    pub async fn record_event(&self, user_email: &str, event: EarningEvent) -> Result<PirateProfile> {
        let confirmed = self.get_or_create_profile(user_email).await?;
        let mut predicted = self.ledger.apply_event(&confirmed, event)?;
        predicted.updated_at = Utc::now();

        let profile = self.commit(Optimistic::begin(confirmed, predicted)).await?;

        debug!(
            user = %user_email,
            kind = event.kind(),
            delta = event.points_delta(),
            total_points = profile.total_points,
            "Recorded earning event"
        );

        Ok(profile)
    }

    /// Count a confirmed takedown of one of the user's reported ads
    pub async fn record_takedown(&self, user_email: &str) -> Result<PirateProfile> {
        let confirmed = self.get_or_create_profile(user_email).await?;
        let mut predicted = self.ledger.record_takedown(&confirmed)?;
        predicted.updated_at = Utc::now();

        let profile = self.commit(Optimistic::begin(confirmed, predicted)).await?;
        debug!(user = %user_email, ads_killed = profile.ads_killed, "Recorded takedown");
        Ok(profile)
    }

    /// Convert points to doubloons; the fee goes to the treasury
    pub async fn swap_points(&self, user_email: &str, points_to_convert: i64) -> Result<SwapOutcome> {
        let confirmed = self.get_or_create_profile(user_email).await?;
        let receipt = self.ledger.convert(confirmed.total_points, points_to_convert)?;

        let mut predicted = self
            .ledger
            .apply_event(&confirmed, EarningEvent::swap(receipt.points_spent))?;
        predicted.updated_at = Utc::now();

        let profile = self.commit(Optimistic::begin(confirmed, predicted)).await?;

        let balance = self
            .wallet
            .deposit(user_email, &receipt)
            .await
            .map_err(|e| {
                error!(
                    user = %user_email,
                    points_spent = receipt.points_spent,
                    doubloons = receipt.doubloons_received,
                    "Points deducted but wallet deposit failed: {}", e
                );
                e
            })
            .context("Failed to credit doubloons")?;

        info!(
            user = %user_email,
            points_spent = receipt.points_spent,
            doubloons = receipt.doubloons_received,
            fee = receipt.fee,
            "Swapped points for doubloons"
        );

        Ok(SwapOutcome {
            profile,
            receipt,
            balance,
        })
    }

    pub async fn overview(&self, user_email: &str) -> Result<ProfileOverview> {
        let profile = self.get_or_create_profile(user_email).await?;
        let summary = self.ledger.summarize(&profile)?;
        let doubloons = self.wallet.doubloons(user_email).await?;

        Ok(ProfileOverview {
            profile,
            summary,
            doubloons,
        })
    }

    /// Top profiles by points
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let records = self
            .store
            .list(PROFILE_COLLECTION, &SortKey::descending("total_points"), limit)
            .await
            .context("Failed to list profiles")?;

        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let profile = profile_from_record(record)?;
            let rank = self.ledger.rank_for(profile.total_points)?;
            entries.push(LeaderboardEntry {
                position: index + 1,
                user_email: profile.user_email,
                total_points: profile.total_points,
                rank_name: rank.name,
            });
        }

        Ok(entries)
    }

    async fn commit(&self, pending: Optimistic<PirateProfile>) -> Result<PirateProfile> {
        let predicted = pending.predicted();
        if predicted.id.is_empty() {
            return Err(anyhow!("Cannot persist a profile without a record id"));
        }

        let result = match profile_body(predicted) {
            Ok(body) => self
                .store
                .update(PROFILE_COLLECTION, &predicted.id, body)
                .await
                .and_then(profile_from_record),
            Err(e) => Err(e),
        };

        match pending.settle(result) {
            Settled::Confirmed(profile) => Ok(profile),
            Settled::RolledBack { snapshot, error } => {
                warn!(
                    user = %snapshot.user_email,
                    total_points = snapshot.total_points,
                    "Profile update failed, rolled back to confirmed snapshot: {}", error
                );
                Err(error.context("Failed to persist profile update"))
            }
        }
    }
}
