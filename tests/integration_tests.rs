//! Integration tests for the Pirate Ledger
//!
//! These tests drive the ledger end to end: pure rank and conversion rules,
//! profile lifecycle through the service, optimistic rollback against a
//! failing store, and the wallet/treasury split.

use anyhow::{anyhow, Result};
use pirate_ledger::{
    AchievementId, EarningEvent, EntityStore, Filter, LedgerError, MemoryEntityStore,
    MemoryKeyValueStore, PirateProfile, ProfileService, ProgressionLedger, Record, SortKey,
    PROFILE_COLLECTION,
};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

type MemoryService = ProfileService<MemoryEntityStore, MemoryKeyValueStore>;

fn create_test_service(starting_points: i64) -> MemoryService {
    ProfileService::new(
        MemoryEntityStore::new(),
        MemoryKeyValueStore::new(),
        ProgressionLedger::default(),
        starting_points,
    )
}

/// Memory store whose updates can be switched off to simulate an outage
#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryEntityStore,
    fail_updates: Arc<AtomicBool>,
}

impl FlakyStore {
    fn set_failing(&self, failing: bool) {
        self.fail_updates.store(failing, Ordering::SeqCst);
    }
}

impl EntityStore for FlakyStore {
    async fn create(&self, collection: &str, data: Value) -> Result<Record> {
        self.inner.create(collection, data).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        self.inner.get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Record> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(anyhow!("entity store unavailable"));
        }
        self.inner.update(collection, id, patch).await
    }

    async fn filter(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>> {
        self.inner.filter(collection, filter).await
    }

    async fn list(&self, collection: &str, sort: &SortKey, limit: usize) -> Result<Vec<Record>> {
        self.inner.list(collection, sort, limit).await
    }
}

// ============================================================================
// Ledger Scenarios
// ============================================================================

mod ledger_scenarios {
    use super::*;

    #[test]
    fn test_new_pirate_starts_as_deck_swabber() {
        let ledger = ProgressionLedger::default();

        assert_eq!(ledger.rank_for(0).unwrap().name, "Deck Swabber");

        let progress = ledger.progress_to_next(0).unwrap();
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.points_remaining, Some(100));
    }

    #[test]
    fn test_report_promotes_to_crew_mate() {
        let ledger = ProgressionLedger::default();
        let profile = PirateProfile::new("anne@bonny.example", 90).with_counters(2, 0, 0);

        let updated = ledger
            .apply_event(&profile, EarningEvent::ReportViolation { points_delta: 25 })
            .unwrap();

        assert_eq!(updated.total_points, 115);
        assert_eq!(updated.ads_reported, 3);
        assert_eq!(ledger.rank_for(115).unwrap().name, "Crew Mate");
    }

    #[test]
    fn test_conversion_examples() {
        let ledger = ProgressionLedger::default();

        let receipt = ledger.convert(500, 200).unwrap();
        assert_eq!((receipt.fee, receipt.doubloons_received), (4, 196));

        let receipt = ledger.convert(1000, 101).unwrap();
        assert_eq!((receipt.fee, receipt.doubloons_received), (3, 98));

        assert!(matches!(
            ledger.convert(50, 100),
            Err(LedgerError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_achievement_scenario() {
        let ledger = ProgressionLedger::default();
        let profile = PirateProfile::new("anne@bonny.example", 0).with_counters(25, 3, 1);

        let earned = ledger.achievements_earned(&profile);
        assert_eq!(
            earned,
            BTreeSet::from([AchievementId::FirstBlood, AchievementId::DsaGuardian])
        );
        assert_eq!(earned, ledger.achievements_earned(&profile));
    }

    #[test]
    fn test_boundary_tie_break() {
        let ledger = ProgressionLedger::default();
        assert_eq!(ledger.rank_for(99).unwrap().name, "Deck Swabber");
        assert_eq!(ledger.rank_for(100).unwrap().name, "Crew Mate");
    }
}

// ============================================================================
// Profile Lifecycle Tests
// ============================================================================

mod profile_lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_first_visit_seeds_balance() {
        let service = create_test_service(50);

        let overview = service.overview("anne@bonny.example").await.unwrap();
        assert_eq!(overview.profile.total_points, 50);
        assert_eq!(overview.summary.rank_name, "Deck Swabber");
        assert_eq!(overview.doubloons, 0);
    }

    #[tokio::test]
    async fn test_full_voyage() {
        let service = create_test_service(0);
        let awards = service.ledger().awards().clone();
        let email = "mary@read.example";

        for _ in 0..4 {
            service
                .record_event(email, awards.report_violation())
                .await
                .unwrap();
        }
        service
            .record_event(email, awards.find_alternative())
            .await
            .unwrap();
        service
            .record_event(email, awards.share_content())
            .await
            .unwrap();

        let overview = service.overview(email).await.unwrap();
        assert_eq!(overview.profile.total_points, 4 * 25 + 15 + 5);
        assert_eq!(overview.profile.ads_reported, 4);
        assert_eq!(overview.profile.alternatives_found, 1);
        assert_eq!(overview.profile.content_shared, 1);
        assert_eq!(overview.summary.rank_name, "Crew Mate");
        assert!(overview
            .summary
            .achievements
            .contains(&AchievementId::FirstBlood));
    }

    #[tokio::test]
    async fn test_takedowns_unlock_silent_killer() {
        let service = create_test_service(0);
        let email = "jack@rackham.example";

        for _ in 0..10 {
            service.record_takedown(email).await.unwrap();
        }

        let overview = service.overview(email).await.unwrap();
        assert_eq!(overview.profile.ads_killed, 10);
        assert_eq!(overview.profile.total_points, 0);
        assert!(overview
            .summary
            .achievements
            .contains(&AchievementId::SilentKiller));
    }

    #[tokio::test]
    async fn test_invalid_event_leaves_profile_untouched() {
        let service = create_test_service(50);
        let email = "anne@bonny.example";

        let err = service
            .record_event(email, EarningEvent::JoinEvent { points_delta: -20 })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::InvalidInput(_))
        ));

        let profile = service.find_profile(email).await.unwrap().unwrap();
        assert_eq!(profile.total_points, 50);
        assert_eq!(profile.events_joined, 0);
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_points() {
        let service = create_test_service(0);
        let awards = service.ledger().awards().clone();

        service
            .record_event("low@x", awards.share_content())
            .await
            .unwrap();
        for _ in 0..5 {
            service
                .record_event("high@x", awards.report_violation())
                .await
                .unwrap();
        }
        service
            .record_event("mid@x", awards.join_event())
            .await
            .unwrap();

        let board = service.leaderboard(10).await.unwrap();
        let emails: Vec<_> = board.iter().map(|e| e.user_email.as_str()).collect();
        assert_eq!(emails, vec!["high@x", "mid@x", "low@x"]);
        assert_eq!(board[0].rank_name, "Crew Mate");
        assert_eq!(board[0].position, 1);

        assert_eq!(service.leaderboard(2).await.unwrap().len(), 2);
    }
}

// ============================================================================
// Swap & Treasury Tests
// ============================================================================

mod swap_flow {
    use super::*;

    #[tokio::test]
    async fn test_swap_moves_fee_to_treasury() {
        let service = create_test_service(500);
        let email = "anne@bonny.example";

        let outcome = service.swap_points(email, 200).await.unwrap();

        assert_eq!(outcome.receipt.fee, 4);
        assert_eq!(outcome.receipt.doubloons_received, 196);
        assert_eq!(outcome.profile.total_points, 300);
        assert_eq!(outcome.balance.doubloons, 196);
        assert_eq!(outcome.balance.treasury, 4);

        let overview = service.overview(email).await.unwrap();
        assert_eq!(overview.profile.total_points, 300);
        assert_eq!(overview.doubloons, 196);
    }

    #[tokio::test]
    async fn test_value_is_conserved_across_users() {
        let service = create_test_service(1000);

        service.swap_points("a@x", 101).await.unwrap();
        service.swap_points("b@x", 1000).await.unwrap();

        let wallet = service.wallet();
        let doubloons = wallet.doubloons("a@x").await.unwrap() + wallet.doubloons("b@x").await.unwrap();
        let treasury = wallet.treasury().await.unwrap();

        assert_eq!(doubloons + treasury, 101 + 1000);
        assert_eq!(treasury, 3 + 20);
    }

    #[tokio::test]
    async fn test_overdraw_rejected() {
        let service = create_test_service(50);

        let err = service.swap_points("anne@bonny.example", 100).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::InsufficientBalance {
                requested: 100,
                available: 50
            })
        ));
        assert_eq!(service.wallet().treasury().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_swap_rejected() {
        let service = create_test_service(50);

        let err = service.swap_points("anne@bonny.example", 0).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::InvalidInput(_))
        ));
    }
}

// ============================================================================
// Optimistic Rollback Tests
// ============================================================================

mod rollback {
    use super::*;

    fn flaky_service(store: FlakyStore) -> ProfileService<FlakyStore, MemoryKeyValueStore> {
        ProfileService::new(
            store,
            MemoryKeyValueStore::new(),
            ProgressionLedger::default(),
            90,
        )
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_confirmed_snapshot() {
        let store = FlakyStore::default();
        let service = flaky_service(store.clone());
        let email = "anne@bonny.example";

        service.get_or_create_profile(email).await.unwrap();
        store.set_failing(true);

        let awards = service.ledger().awards().clone();
        let err = service
            .record_event(email, awards.report_violation())
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<LedgerError>().is_none());

        let profile = service.find_profile(email).await.unwrap().unwrap();
        assert_eq!(profile.total_points, 90);
        assert_eq!(profile.ads_reported, 0);

        store.set_failing(false);
        let profile = service
            .record_event(email, awards.report_violation())
            .await
            .unwrap();
        assert_eq!(profile.total_points, 115);
    }

    #[tokio::test]
    async fn test_failed_swap_does_not_credit_wallet() {
        let store = FlakyStore::default();
        let service = flaky_service(store.clone());
        let email = "anne@bonny.example";

        service.get_or_create_profile(email).await.unwrap();
        store.set_failing(true);

        assert!(service.swap_points(email, 50).await.is_err());
        assert_eq!(service.wallet().doubloons(email).await.unwrap(), 0);
        assert_eq!(service.wallet().treasury().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_each_mutation_refetches_snapshot() {
        let store = FlakyStore::default();
        let service = flaky_service(store.clone());
        let email = "anne@bonny.example";

        let profile = service.get_or_create_profile(email).await.unwrap();

        // Another surface writes directly to the store
        store
            .update(
                PROFILE_COLLECTION,
                &profile.id,
                serde_json::json!({ "total_points": 490 }),
            )
            .await
            .unwrap();

        let awards = service.ledger().awards().clone();
        let updated = service
            .record_event(email, awards.join_event())
            .await
            .unwrap();

        assert_eq!(updated.total_points, 510);
        assert_eq!(service.overview(email).await.unwrap().summary.rank_name, "Boatswain");
    }
}
