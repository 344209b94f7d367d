//! Property-based tests for the siege rules

use proptest::prelude::*;

use citadel_siege::core::types::{PlayerId, MAX_ENERGY};
use citadel_siege::core::SiegeConfig;
use citadel_siege::roster::Unit;
use citadel_siege::siege::energy::{deduct_for_initiation, deduct_for_round, restore};
use citadel_siege::siege::scouting::success_chance;
use citadel_siege::siege::{compute_odds, BattleSession, RoundInput, SeededDraws, Strategy as Stance};
use citadel_siege::territory::{Territory, TerritoryTier};

fn any_stance() -> impl Strategy<Value = Stance> {
    prop_oneof![
        Just(Stance::Aggressive),
        Just(Stance::Balanced),
        Just(Stance::Defensive),
    ]
}

fn any_tier() -> impl Strategy<Value = TerritoryTier> {
    prop_oneof![
        Just(TerritoryTier::Common),
        Just(TerritoryTier::Rare),
        Just(TerritoryTier::Epic),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Energy never leaves [0, 100] whatever is spent.
    #[test]
    fn prop_energy_stays_bounded(start in 0u8..=100, stances in prop::collection::vec(any_stance(), 0..12)) {
        let config = SiegeConfig::default();
        let mut energy = deduct_for_initiation(start, &config);
        prop_assert!(energy <= MAX_ENERGY);

        for stance in stances {
            let next = deduct_for_round(energy, stance, &config);
            prop_assert!(next <= energy);
            energy = next;
        }
    }

    /// Restoration always lands at full and charges for the exact deficit.
    #[test]
    fn prop_restore_fills_to_max(energy in 0u8..=100) {
        let config = SiegeConfig::default();
        let mut unit = Unit::new(PlayerId::new(), "Prop", 100).with_energy(energy);
        let receipt = restore(&mut unit, u64::MAX, &config).unwrap();

        prop_assert_eq!(unit.energy, MAX_ENERGY);
        prop_assert_eq!(receipt.cost, (MAX_ENERGY - energy) as u64 * config.restore_cost_per_point);
    }

    /// Round odds stay inside the clamp for any power, stance and bonus mix.
    #[test]
    fn prop_probability_clamped(
        attacker_power in 0u64..20_000_000_000,
        defender_power in 0u64..20_000_000_000,
        attacker_strategy in any_stance(),
        defender_strategy in any_stance(),
        scout_bonus_pct in 0u8..=25,
        defense_bonus_pct in 0u8..=100,
    ) {
        let odds = compute_odds(&RoundInput {
            attacker_power,
            defender_power,
            attacker_strategy,
            defender_strategy,
            scout_bonus_pct,
            defense_bonus_pct,
        });

        prop_assert!(odds.success_probability >= 0.05);
        prop_assert!(odds.success_probability <= 0.95);
    }

    /// Scout chance grows with scout power and never reaches certainty.
    #[test]
    fn prop_scout_chance_monotonic(power in 0u32..100_000, step in 1u32..1_000, defenders in 1.0f64..10_000.0) {
        let weaker = success_chance(power, defenders);
        let stronger = success_chance(power + step, defenders);

        prop_assert!(stronger > weaker);
        prop_assert!(weaker >= 0.05);
        prop_assert!(stronger < 1.0);
    }

    /// Whatever the draws, a battle ends within its tier's round limit.
    #[test]
    fn prop_battle_respects_round_limit(
        tier in any_tier(),
        powers in prop::collection::vec(1u32..500, 1..5),
        energies in prop::collection::vec(20u8..=100, 5),
        stances in prop::collection::vec(any_stance(), 5),
        seed in any::<u64>(),
    ) {
        let config = SiegeConfig::default();
        let attacker = PlayerId::new();
        let territory = Territory::new("Prop Hold", tier);
        let squad: Vec<Unit> = powers
            .iter()
            .zip(&energies)
            .map(|(power, energy)| Unit::new(attacker, "Prop", *power).with_energy(*energy))
            .collect();

        let mut draws = SeededDraws::new(seed);
        let mut session = BattleSession::open(attacker, &territory, &squad, vec![], 0, &config).unwrap();
        session.skip_scouting().unwrap();

        for stance in stances {
            let result = session.execute_round(Some(stance), 0, &config, &mut draws).unwrap();
            prop_assert!(result.round <= session.max_rounds);
            prop_assert!(session.current_round <= session.max_rounds);
            if session.is_terminal() {
                break;
            }
            session.continue_battle().unwrap();
        }

        prop_assert!(session.rounds.len() as u32 <= tier.max_rounds());
        prop_assert!(session.attackers.iter().all(|u| u.energy <= MAX_ENERGY));
        if session.rounds.len() as u32 == tier.max_rounds() {
            prop_assert!(session.is_terminal());
        }
    }
}
