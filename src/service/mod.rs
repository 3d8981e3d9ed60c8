//! Caller-side orchestration around the pure ledger
//!
//! Snapshot in, ledger transform, persist, roll back on failure.

mod optimistic;
mod profiles;

pub use optimistic::{Optimistic, Settled};
pub use profiles::{LeaderboardEntry, ProfileOverview, ProfileService, SwapOutcome};
