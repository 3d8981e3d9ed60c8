//! Earning Events
//!
//! Every balance change is one of a closed set of events. Award kinds add
//! points and bump a counter; `swap-points` removes points and bumps nothing.
//! Events are never persisted themselves, only their effect on the profile.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::progression::profile::PirateProfile;

/// A discrete change to a profile's points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EarningEvent {
    ReportViolation { points_delta: i64 },
    FindAlternative { points_delta: i64 },
    CreateContent { points_delta: i64 },
    ShareContent { points_delta: i64 },
    JoinEvent { points_delta: i64 },
    /// Conversion to doubloons, always negative
    SwapPoints { points_delta: i64 },
}

impl EarningEvent {
    /// Stable kind name, as used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            EarningEvent::ReportViolation { .. } => "report-violation",
            EarningEvent::FindAlternative { .. } => "find-alternative",
            EarningEvent::CreateContent { .. } => "create-content",
            EarningEvent::ShareContent { .. } => "share-content",
            EarningEvent::JoinEvent { .. } => "join-event",
            EarningEvent::SwapPoints { .. } => "swap-points",
        }
    }

    pub fn points_delta(&self) -> i64 {
        match *self {
            EarningEvent::ReportViolation { points_delta }
            | EarningEvent::FindAlternative { points_delta }
            | EarningEvent::CreateContent { points_delta }
            | EarningEvent::ShareContent { points_delta }
            | EarningEvent::JoinEvent { points_delta }
            | EarningEvent::SwapPoints { points_delta } => points_delta,
        }
    }

    pub fn is_award(&self) -> bool {
        !matches!(self, EarningEvent::SwapPoints { .. })
    }

    /// Swap event spending `points` (given as a positive amount)
    pub fn swap(points: i64) -> Self {
        EarningEvent::SwapPoints {
            points_delta: points.saturating_neg(),
        }
    }

    fn validate(&self) -> LedgerResult<()> {
        let delta = self.points_delta();
        if self.is_award() && delta <= 0 {
            return Err(LedgerError::invalid_input(format!(
                "{} must award a positive amount, got {}",
                self.kind(),
                delta
            )));
        }
        if !self.is_award() && delta >= 0 {
            return Err(LedgerError::invalid_input(format!(
                "swap-points must carry a negative delta, got {}",
                delta
            )));
        }
        Ok(())
    }
}

/// Loosely-shaped event as it arrives from callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: String,
    pub points_delta: i64,
}

impl TryFrom<RawEvent> for EarningEvent {
    type Error = LedgerError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let points_delta = raw.points_delta;
        match raw.kind.as_str() {
            "report-violation" => Ok(EarningEvent::ReportViolation { points_delta }),
            "find-alternative" => Ok(EarningEvent::FindAlternative { points_delta }),
            "create-content" => Ok(EarningEvent::CreateContent { points_delta }),
            "share-content" => Ok(EarningEvent::ShareContent { points_delta }),
            "join-event" => Ok(EarningEvent::JoinEvent { points_delta }),
            "swap-points" => Ok(EarningEvent::SwapPoints { points_delta }),
            other => Err(LedgerError::InvalidEvent(format!(
                "unknown event kind '{}'",
                other
            ))),
        }
    }
}

/// Default points per award kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardSchedule {
    pub report_violation: i64,
    pub find_alternative: i64,
    pub create_content: i64,
    pub share_content: i64,
    pub join_event: i64,
}

impl Default for AwardSchedule {
    fn default() -> Self {
        Self {
            report_violation: 25,
            find_alternative: 15,
            create_content: 10,
            share_content: 5,
            join_event: 20,
        }
    }
}

impl AwardSchedule {
    pub fn report_violation(&self) -> EarningEvent {
        EarningEvent::ReportViolation {
            points_delta: self.report_violation,
        }
    }

    pub fn find_alternative(&self) -> EarningEvent {
        EarningEvent::FindAlternative {
            points_delta: self.find_alternative,
        }
    }

    pub fn create_content(&self) -> EarningEvent {
        EarningEvent::CreateContent {
            points_delta: self.create_content,
        }
    }

    pub fn share_content(&self) -> EarningEvent {
        EarningEvent::ShareContent {
            points_delta: self.share_content,
        }
    }

    pub fn join_event(&self) -> EarningEvent {
        EarningEvent::JoinEvent {
            points_delta: self.join_event,
        }
    }
}

/// Apply an event to a profile snapshot, returning the updated snapshot
pub fn apply_event(profile: &PirateProfile, event: EarningEvent) -> LedgerResult<PirateProfile> {
    if profile.total_points < 0 {
        return Err(LedgerError::invalid_input(format!(
            "profile has negative balance {}",
            profile.total_points
        )));
    }
    event.validate()?;

    let delta = event.points_delta();
    let total_points = profile.total_points.checked_add(delta).ok_or_else(|| {
        LedgerError::invalid_input(format!("balance overflow applying {}", event.kind()))
    })?;

    if total_points < 0 {
        return Err(LedgerError::InsufficientBalance {
            requested: delta.saturating_neg(),
            available: profile.total_points,
        });
    }

    let mut updated = profile.clone();
    updated.total_points = total_points;

    let counter = match event {
        EarningEvent::ReportViolation { .. } => Some(&mut updated.ads_reported),
        EarningEvent::FindAlternative { .. } => Some(&mut updated.alternatives_found),
        EarningEvent::CreateContent { .. } => Some(&mut updated.content_created),
        EarningEvent::ShareContent { .. } => Some(&mut updated.content_shared),
        EarningEvent::JoinEvent { .. } => Some(&mut updated.events_joined),
        EarningEvent::SwapPoints { .. } => None,
    };
    if let Some(counter) = counter {
        bump(counter, event.kind())?;
    }

    Ok(updated)
}

/// Count a confirmed takedown of a reported ad (no points attached)
pub fn record_takedown(profile: &PirateProfile) -> LedgerResult<PirateProfile> {
    let mut updated = profile.clone();
    bump(&mut updated.ads_killed, "takedown")?;
    Ok(updated)
}

fn bump(counter: &mut u32, what: &str) -> LedgerResult<()> {
    *counter = counter.checked_add(1).ok_or_else(|| {
        LedgerError::invalid_input(format!("counter overflow recording {}", what))
    })?;
    Ok(())
}
