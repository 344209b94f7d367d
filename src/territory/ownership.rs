//! Applying terminal battle outcomes to territories and units
//!
//! Victory transfers the territory and grants conquest protection, a defeat
//! deters the same attacker for a short while, and a retreat puts the whole
//! territory on a short cooldown. Every outcome hands the squad back.

use serde::{Deserialize, Serialize};

use super::state::Territory;
use crate::core::config::SiegeConfig;
use crate::core::types::{PlayerId, Timestamp, UnitId};
use crate::roster::{Assignment, Unit};
use crate::siege::{BattleOutcome, BattleSession};

/// What changed on the territory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipChange {
    pub outcome: BattleOutcome,
    pub previous_owner: Option<PlayerId>,
    pub new_owner: Option<PlayerId>,
    pub cooldown_until: Option<Timestamp>,
    /// Garrison units sent home because the territory changed hands
    pub released_defenders: Vec<UnitId>,
}

/// Commit a finished session to its territory. Returns `None` while the
/// session is still open.
pub fn apply_outcome(
    territory: &mut Territory,
    session: &BattleSession,
    now: Timestamp,
    config: &SiegeConfig,
) -> Option<OwnershipChange> {
    let outcome = session.outcome?;
    let previous_owner = territory.owner;
    let mut released_defenders = Vec::new();

    match outcome {
        BattleOutcome::Victory => {
            territory.owner = Some(session.attacker);
            released_defenders = std::mem::take(&mut territory.defending_squad);
            territory.cooldown_until = Some(now + config.conquest_cooldown_secs);
            territory.attacker_cooldowns.clear();
        }
        BattleOutcome::Defeat => {
            if config.defeat_attacker_cooldown_secs > 0 {
                territory.deter_attacker(
                    session.attacker,
                    now + config.defeat_attacker_cooldown_secs,
                    now,
                );
            }
        }
        BattleOutcome::Retreated => {
            let until = now + config.retreat_cooldown_secs;
            // Never shorten an existing cooldown
            territory.cooldown_until = Some(territory.cooldown_until.map_or(until, |c| c.max(until)));
        }
    }

    tracing::info!(
        territory = %territory.name,
        ?outcome,
        new_owner = ?territory.owner,
        cooldown_until = ?territory.cooldown_until,
        "Territory updated after siege"
    );

    Some(OwnershipChange {
        outcome,
        previous_owner,
        new_owner: territory.owner,
        cooldown_until: territory.cooldown_until,
        released_defenders,
    })
}

/// Copy battle energy onto the attacking units and, once the battle is over,
/// hand them back as available
pub fn settle_attackers(units: &mut [Unit], session: &BattleSession) {
    for unit in units.iter_mut() {
        if let Some(snapshot) = session.attackers.iter().find(|s| s.id == unit.id) {
            unit.energy = snapshot.energy;
        }
        if session.is_terminal() && unit.assignment == Assignment::Deployed(session.id) {
            unit.assignment = Assignment::None;
        }
    }
}

/// Copy battle energy onto player-owned defenders and release any garrison
/// that lost its territory
pub fn settle_defenders(units: &mut [Unit], session: &BattleSession, change: Option<&OwnershipChange>) {
    for unit in units.iter_mut() {
        if let Some(snapshot) = session.defenders.iter().find(|s| s.id == unit.id) {
            unit.energy = snapshot.energy;
        }
        let released = change.is_some_and(|c| c.released_defenders.contains(&unit.id));
        if released {
            unit.assignment = Assignment::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::siege::draws::FixedDraws;
    use crate::siege::Strategy;
    use crate::territory::TerritoryTier;

    fn finished(draw: f64) -> (Territory, BattleSession, Vec<Unit>) {
        let config = SiegeConfig::default();
        let attacker = PlayerId::new();
        let territory = Territory::new("Greywater", TerritoryTier::Common);
        let mut squad = vec![Unit::new(attacker, "Rook", 150), Unit::new(attacker, "Pike", 150)];
        let mut session =
            BattleSession::open(attacker, &territory, &squad, vec![], 0, &config).unwrap();
        for unit in &mut squad {
            unit.assignment = Assignment::Deployed(session.id);
        }

        let mut draws = FixedDraws::constant(draw);
        session.skip_scouting().unwrap();
        while !session.is_terminal() {
            session
                .execute_round(Some(Strategy::Balanced), 0, &config, &mut draws)
                .unwrap();
            if !session.is_terminal() {
                session.continue_battle().unwrap();
            }
        }
        (territory, session, squad)
    }

    #[test]
    fn test_victory_transfers_ownership() {
        let config = SiegeConfig::default();
        let (mut territory, session, _) = finished(0.0);
        let former = PlayerId::new();
        territory.owner = Some(former);
        territory.defending_squad = vec![UnitId::new()];

        let change = apply_outcome(&mut territory, &session, 1_000, &config).unwrap();

        assert_eq!(change.outcome, BattleOutcome::Victory);
        assert_eq!(territory.owner, Some(session.attacker));
        assert!(territory.defending_squad.is_empty());
        assert_eq!(change.released_defenders.len(), 1);
        assert_eq!(change.previous_owner, Some(former));
        assert_eq!(territory.cooldown_until, Some(1_000 + 3 * 60 * 60));
    }

    #[test]
    fn test_defeat_deters_attacker_only() {
        let config = SiegeConfig::default();
        let (mut territory, session, _) = finished(0.99);

        let change = apply_outcome(&mut territory, &session, 1_000, &config).unwrap();

        assert_eq!(change.outcome, BattleOutcome::Defeat);
        assert_eq!(territory.owner, None);
        assert_eq!(territory.cooldown_until, None);
        assert_eq!(territory.blocking_cooldown(session.attacker, 1_000), Some(1_300));
        assert_eq!(territory.blocking_cooldown(PlayerId::new(), 1_000), None);
    }

    #[test]
    fn test_retreat_sets_short_cooldown() {
        let config = SiegeConfig::default();
        let attacker = PlayerId::new();
        let mut territory = Territory::new("Greywater", TerritoryTier::Rare);
        let squad = vec![Unit::new(attacker, "Rook", 150)];
        let mut session = BattleSession::open(attacker, &territory, &squad, vec![], 0, &config).unwrap();
        session.retreat().unwrap();

        let change = apply_outcome(&mut territory, &session, 500, &config).unwrap();

        assert_eq!(change.outcome, BattleOutcome::Retreated);
        assert_eq!(territory.owner, None);
        assert_eq!(territory.cooldown_until, Some(500 + 15 * 60));
    }

    #[test]
    fn test_open_session_changes_nothing() {
        let config = SiegeConfig::default();
        let attacker = PlayerId::new();
        let mut territory = Territory::new("Greywater", TerritoryTier::Common);
        let squad = vec![Unit::new(attacker, "Rook", 150)];
        let session = BattleSession::open(attacker, &territory, &squad, vec![], 0, &config).unwrap();
        let before = territory.clone();

        assert!(apply_outcome(&mut territory, &session, 0, &config).is_none());
        assert_eq!(territory, before);
    }

    #[test]
    fn test_settle_releases_attackers_with_battle_energy() {
        let (_, session, mut squad) = finished(0.0);

        settle_attackers(&mut squad, &session);

        for unit in &squad {
            assert_eq!(unit.assignment, Assignment::None);
            assert_eq!(unit.energy, 60);
        }
    }

    #[test]
    fn test_settle_defenders_releases_lost_garrison() {
        let (_, session, _) = finished(0.0);
        let mut defender = Unit::new(PlayerId::new(), "Warden", 100);
        defender.assignment = Assignment::Defending(session.territory);
        let change = OwnershipChange {
            outcome: BattleOutcome::Victory,
            previous_owner: Some(defender.owner),
            new_owner: Some(session.attacker),
            cooldown_until: None,
            released_defenders: vec![defender.id],
        };

        let mut units = vec![defender];
        settle_defenders(&mut units, &session, Some(&change));

        assert_eq!(units[0].assignment, Assignment::None);
    }
}
