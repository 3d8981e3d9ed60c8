//! Rank Tiers and Progress
//!
//! Ranks are named bands of point totals. The table is a versioned constant
//! and must partition the non-negative integers: the first tier starts at 0,
//! each tier ends one point before the next begins, and only the last tier
//! is unbounded.

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};

/// A named band of point totals (both bounds inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankTier {
    pub name: &'static str,
    pub min: i64,
    /// `None` for the terminal tier
    pub max: Option<i64>,
}

impl RankTier {
    pub const fn new(name: &'static str, min: i64, max: Option<i64>) -> Self {
        Self { name, min, max }
    }

    pub fn contains(&self, points: i64) -> bool {
        points >= self.min && self.max.map_or(true, |max| points <= max)
    }

    pub fn is_terminal(&self) -> bool {
        self.max.is_none()
    }
}

/// Rank table, version 1
pub static RANK_TIERS: &[RankTier] = &[
    RankTier::new("Deck Swabber", 0, Some(99)),
    RankTier::new("Crew Mate", 100, Some(499)),
    RankTier::new("Boatswain", 500, Some(1_499)),
    RankTier::new("Quartermaster", 1_500, Some(4_999)),
    RankTier::new("First Mate", 5_000, Some(9_999)),
    RankTier::new("Captain", 10_000, Some(24_999)),
    RankTier::new("Pirate Lord", 25_000, None),
];

/// Where a point total sits relative to the next rank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub current_tier: RankTier,
    pub next_tier: Option<RankTier>,
    /// 0.0 - 100.0
    pub percent: f64,
    pub points_remaining: Option<i64>,
}

/// Check that a tier table is an exhaustive, gap-free partition of `0..`
pub fn validate_tiers(tiers: &[RankTier]) -> LedgerResult<()> {
    let first = tiers
        .first()
        .ok_or_else(|| LedgerError::invalid_input("rank table is empty"))?;

    if first.min != 0 {
        return Err(LedgerError::invalid_input(format!(
            "first tier '{}' must start at 0, starts at {}",
            first.name, first.min
        )));
    }

    for pair in tiers.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let max = current.max.ok_or_else(|| {
            LedgerError::invalid_input(format!(
                "tier '{}' is unbounded but is not the last tier",
                current.name
            ))
        })?;

        if max < current.min {
            return Err(LedgerError::invalid_input(format!(
                "tier '{}' ends before it starts",
                current.name
            )));
        }

        if max.checked_add(1) != Some(next.min) {
            return Err(LedgerError::invalid_input(format!(
                "tiers '{}' and '{}' are not adjacent ({} -> {})",
                current.name, next.name, max, next.min
            )));
        }
    }

    match tiers.last() {
        Some(last) if !last.is_terminal() => Err(LedgerError::invalid_input(format!(
            "last tier '{}' must be unbounded",
            last.name
        ))),
        _ => Ok(()),
    }
}

/// Find the tier containing `points`
pub fn rank_for(tiers: &[RankTier], points: i64) -> LedgerResult<RankTier> {
    if points < 0 {
        return Err(LedgerError::invalid_input(format!(
            "points must be non-negative, got {}",
            points
        )));
    }

    tiers
        .iter()
        .find(|tier| tier.contains(points))
        .copied()
        .ok_or_else(|| LedgerError::invalid_input(format!("no tier covers {} points", points)))
}

/// Compute progress from the current tier towards the next one
pub fn progress_to_next(tiers: &[RankTier], points: i64) -> LedgerResult<Progress> {
    let current_tier = rank_for(tiers, points)?;

    let next_tier = tiers.iter().find(|tier| tier.min > current_tier.min).copied();

    let Some(next) = next_tier.filter(|_| !current_tier.is_terminal()) else {
        return Ok(Progress {
            current_tier,
            next_tier: None,
            percent: 100.0,
            points_remaining: None,
        });
    };

    let span = (next.min - current_tier.min) as f64;
    let percent = ((points - current_tier.min) as f64 / span * 100.0).clamp(0.0, 100.0);

    Ok(Progress {
        current_tier,
        next_tier: Some(next),
        percent,
        points_remaining: Some(next.min - points),
    })
}
