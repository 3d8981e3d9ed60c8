use pirate_ledger::{
    achievements_earned, apply_event, convert, rank_for, EarningEvent, PirateProfile,
    CONVERSION_FEE, RANK_TIERS,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn award_event() -> impl Strategy<Value = EarningEvent> {
    (0_u8..5, 1_i64..10_000).prop_map(|(kind, points_delta)| match kind {
        0 => EarningEvent::ReportViolation { points_delta },
        1 => EarningEvent::FindAlternative { points_delta },
        2 => EarningEvent::CreateContent { points_delta },
        3 => EarningEvent::ShareContent { points_delta },
        _ => EarningEvent::JoinEvent { points_delta },
    })
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn every_point_total_has_exactly_one_tier(points in 0_i64..1_000_000_000) {
        let matching = RANK_TIERS.iter().filter(|tier| tier.contains(points)).count();
        prop_assert_eq!(matching, 1);
        prop_assert!(rank_for(RANK_TIERS, points).is_ok());
    }

    #[test]
    fn conversion_conserves_value(
        balance in 1_i64..10_000_000,
        fraction in 0.0_f64..=1.0,
    ) {
        let amount = ((balance as f64 * fraction) as i64).max(1);
        let receipt = convert(balance, amount, CONVERSION_FEE).unwrap();

        prop_assert_eq!(receipt.doubloons_received + receipt.fee, amount);
        prop_assert_eq!(receipt.fee, (amount * 2 + 99) / 100);
        prop_assert!(receipt.doubloons_received >= 0);
    }

    #[test]
    fn awards_never_decrease_points(
        start in 0_i64..1_000_000,
        event in award_event(),
    ) {
        let profile = PirateProfile::new("prop@x", start);
        let updated = apply_event(&profile, event).unwrap();
        prop_assert!(updated.total_points >= profile.total_points);
    }

    #[test]
    fn achievement_evaluation_is_idempotent(
        reported in 0_u32..100,
        killed in 0_u32..100,
        alternatives in 0_u32..100,
    ) {
        let profile = PirateProfile::new("prop@x", 0).with_counters(reported, killed, alternatives);
        prop_assert_eq!(achievements_earned(&profile), achievements_earned(&profile));
    }
}
