//! Battle-result notifications
//!
//! Delivery is best-effort: the coordinator logs a failed notification and
//! keeps the battle outcome.

use serde::{Deserialize, Serialize};

use crate::core::types::{BattleId, PlayerId, TerritoryId};
use crate::siege::{BattleOutcome, BattleSession};
use crate::territory::{Territory, TerritoryTier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub battle_id: BattleId,
    pub attacker: PlayerId,
    pub outcome: BattleOutcome,
    pub territory_id: TerritoryId,
    pub territory_name: String,
    pub territory_tier: TerritoryTier,
    /// Strongest unit in the attacking squad
    pub lead_attacker: String,
    pub squad_size: usize,
    pub lead_defender: Option<String>,
    pub previous_owner: Option<PlayerId>,
    pub rounds_played: usize,
}

impl BattleReport {
    /// Build from a finished session and the territory as it was before the
    /// outcome was applied
    pub fn new(session: &BattleSession, territory_before: &Territory) -> Option<Self> {
        let outcome = session.outcome?;
        let lead_attacker = session
            .attackers
            .iter()
            .max_by_key(|u| u.power)
            .map(|u| u.name.clone())
            .unwrap_or_default();
        let lead_defender = if session.ai_defended {
            None
        } else {
            session.defenders.first().map(|d| d.name.clone())
        };

        Some(Self {
            battle_id: session.id,
            attacker: session.attacker,
            outcome,
            territory_id: territory_before.id,
            territory_name: territory_before.name.clone(),
            territory_tier: territory_before.tier,
            lead_attacker,
            squad_size: session.attackers.len(),
            lead_defender,
            previous_owner: territory_before.owner,
            rounds_played: session.rounds.len(),
        })
    }
}

pub trait BattleNotifier: Send + Sync {
    fn battle_concluded(&self, report: &BattleReport) -> Result<(), String>;
}

/// Writes battle results to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl BattleNotifier for TracingNotifier {
    fn battle_concluded(&self, report: &BattleReport) -> Result<(), String> {
        tracing::info!(
            battle = %report.battle_id,
            territory = %report.territory_name,
            tier = report.territory_tier.name(),
            outcome = ?report.outcome,
            lead = %report.lead_attacker,
            squad = report.squad_size,
            rounds = report.rounds_played,
            "Battle concluded"
        );
        Ok(())
    }
}
