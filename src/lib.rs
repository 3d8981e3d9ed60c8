//! Pirate Ledger
//!
//! Rank, points and doubloon rules for the ad-pirate consumer advocacy app:
//! users report misleading ads, earn Pirate Points, climb ranks and swap
//! points for Doubloons.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Configuration management
//! ├── error.rs       - Ledger error taxonomy
//! ├── progression/   - Pure ledger rules
//! │   ├── rank.rs        - Rank table & progress
//! │   ├── events.rs      - Earning events & application
//! │   ├── conversion.rs  - Points to doubloons swap
//! │   ├── achievements.rs - Counter-based badges
//! │   ├── profile.rs     - Pirate profile snapshot
//! │   └── ledger.rs      - ProgressionLedger facade
//! ├── store/         - Entity store & key-value collaborators
//! │   ├── entity.rs   - Store contract, filters, sort keys
//! │   ├── memory.rs   - In-memory store
//! │   ├── postgres.rs - PostgreSQL store
//! │   └── kv.rs       - Balance port & wallet
//! ├── service/       - Snapshot / transform / persist orchestration
//! │   ├── optimistic.rs - Optimistic update with rollback
//! │   └── profiles.rs   - ProfileService
//! └── api/           - HTTP API endpoints
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod progression;
pub mod service;
pub mod store;

// Re-export main types for convenience
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};

pub use progression::{
    achievements_earned, apply_event, convert, progress_to_next, rank_for, record_takedown,
    validate_tiers, AchievementId, AwardSchedule, ConversionReceipt, EarningEvent, FeeRate,
    PirateProfile, ProfileSummary, Progress, ProgressionLedger, RankTier, RawEvent,
    CONVERSION_FEE, PROFILE_COLLECTION, RANK_TIERS,
};

pub use service::{
    LeaderboardEntry, Optimistic, ProfileOverview, ProfileService, Settled, SwapOutcome,
};

pub use store::{
    EntityStore, Filter, KeyValueStore, MemoryEntityStore, MemoryKeyValueStore, PgEntityStore,
    Record, SortKey, Wallet, WalletBalance,
};
