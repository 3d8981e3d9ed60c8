//! Progression System
//!
//! Pure rank, points and badge rules over externally stored profiles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌───────────────────┐     ┌─────────────────┐
//! │ PirateProfile   │────►│ ProgressionLedger │◄────│ EarningEvent    │
//! │ (snapshot)      │     │ (pure functions)  │     │ (closed set)    │
//! └─────────────────┘     └───────────────────┘     └─────────────────┘
//!                           │        │        │
//!                           ▼        ▼        ▼
//!                      RankTier  Conversion  Achievements
//! ```
//!
//! ## Points Model
//!
//! - Profiles start with a seeded balance and gain points per award event
//! - Swapping converts points to doubloons at a 2% fee (rounded up)
//! - Rank and badges are recomputed from the snapshot on every read

mod achievements;
mod conversion;
mod events;
mod ledger;
mod profile;
mod rank;

pub use achievements::{achievements_earned, AchievementId};
pub use conversion::{convert, ConversionReceipt, FeeRate, CONVERSION_FEE};
pub use events::{apply_event, record_takedown, AwardSchedule, EarningEvent, RawEvent};
pub use ledger::{ProfileSummary, ProgressionLedger};
pub use profile::{PirateProfile, PROFILE_COLLECTION};
pub use rank::{progress_to_next, rank_for, validate_tiers, Progress, RankTier, RANK_TIERS};
