//! Battle session state machine
//!
//! ```text
//! Init -> Scouting -> StrategySelection -> RoundExecuting -> RoundResults
//!                          ^                                     |
//!                          +------------- continue --------------+
//!                                                                |
//!                                              decisive round -> Complete
//! Scouting | StrategySelection | RoundResults -- retreat -----> Retreated
//! ```
//!
//! Every operation validates first and mutates second, so a rejected call
//! leaves the session exactly as it was.

use serde::{Deserialize, Serialize};

use super::draws::DrawSource;
use super::energy;
use super::resolution::{resolve_round, EnergyChange, RoundInput, RoundResult};
use super::scouting::{self, ScoutIntel};
use super::strategy::{ai_defender_strategy, Strategy};
use crate::core::config::{SiegeConfig, StrategyLock};
use crate::core::error::{Result, SiegeError};
use crate::core::types::{BattleId, Energy, PlayerId, TerritoryId, Timestamp, UnitId, MAX_ENERGY};
use crate::roster::Unit;
use crate::territory::{Territory, TerritoryTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Init,
    Scouting,
    StrategySelection,
    RoundExecuting,
    RoundResults,
    Complete,
    Retreated,
}

impl BattlePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BattlePhase::Complete | BattlePhase::Retreated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Retreated,
}

/// A combatant as it stands inside one battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub name: String,
    pub power: u32,
    pub energy: Energy,
}

impl From<&Unit> for UnitSnapshot {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            name: unit.name.clone(),
            power: unit.power,
            energy: unit.energy,
        }
    }
}

fn total_power(units: &[UnitSnapshot]) -> u64 {
    units.iter().map(|u| u.power as u64).sum()
}

/// Garrison synthesized for a territory nobody defends
pub fn ai_garrison(territory: &Territory, config: &SiegeConfig) -> Vec<UnitSnapshot> {
    let count = config.ai_defender_count.max(1);
    let total = config.ai_defense_power as f64 * territory.tier.ai_defense_multiplier();
    let each = (total / count as f64).round() as u32;

    (1..=count)
        .map(|i| UnitSnapshot {
            id: UnitId::new(),
            name: format!("{} Sentinel {}", territory.name, i),
            power: each,
            energy: MAX_ENERGY,
        })
        .collect()
}

/// One siege attempt from initiation to its terminal phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSession {
    pub id: BattleId,
    pub attacker: PlayerId,
    pub territory: TerritoryId,
    pub tier: TerritoryTier,
    pub defense_bonus_pct: u8,
    /// Garrison was synthesized because nobody defends the territory
    pub ai_defended: bool,
    pub attackers: Vec<UnitSnapshot>,
    pub defenders: Vec<UnitSnapshot>,
    pub current_round: u32,
    pub max_rounds: u32,
    pub phase: BattlePhase,
    pub strategy_lock: StrategyLock,
    pub scout_attempted: bool,
    pub scout_intel: Option<ScoutIntel>,
    /// Defender stance for the round about to be fought
    pub planned_defender_strategy: Strategy,
    pub locked_strategy: Option<Strategy>,
    pub attacker_score: f64,
    pub defender_score: f64,
    pub rounds: Vec<RoundResult>,
    pub outcome: Option<BattleOutcome>,
    pub opened_at: Timestamp,
    /// Bumped on every accepted transition
    pub version: u64,
}

impl BattleSession {
    /// Initiation checks that depend only on the target
    pub fn check_target(attacker: PlayerId, territory: &Territory, now: Timestamp) -> Result<()> {
        if territory.owner == Some(attacker) {
            return Err(SiegeError::OwnTerritory(territory.id));
        }

        if let Some(until) = territory.blocking_cooldown(attacker, now) {
            return Err(SiegeError::OnCooldown {
                territory: territory.id,
                until,
            });
        }

        Ok(())
    }

    /// Create a session in `Init`, charge the initiation cost and move to
    /// `Scouting`. Squad eligibility is the caller's job.
    pub fn open(
        attacker: PlayerId,
        territory: &Territory,
        squad: &[Unit],
        defenders: Vec<UnitSnapshot>,
        now: Timestamp,
        config: &SiegeConfig,
    ) -> Result<Self> {
        if squad.is_empty() {
            return Err(SiegeError::InvalidSquad("deploy at least one unit".into()));
        }

        for (i, unit) in squad.iter().enumerate() {
            if squad[..i].iter().any(|other| other.id == unit.id) {
                return Err(SiegeError::InvalidSquad(format!(
                    "unit {} appears more than once",
                    unit.id
                )));
            }
        }

        Self::check_target(attacker, territory, now)?;

        let ai_defended = defenders.is_empty();
        let defenders = if ai_defended {
            ai_garrison(territory, config)
        } else {
            defenders
        };

        let mut session = Self {
            id: BattleId::new(),
            attacker,
            territory: territory.id,
            tier: territory.tier,
            defense_bonus_pct: territory.defense_bonus_pct,
            ai_defended,
            attackers: squad.iter().map(UnitSnapshot::from).collect(),
            planned_defender_strategy: ai_defender_strategy(&defenders),
            defenders,
            current_round: 1,
            max_rounds: territory.tier.max_rounds(),
            phase: BattlePhase::Init,
            strategy_lock: config.strategy_lock,
            scout_attempted: false,
            scout_intel: None,
            locked_strategy: None,
            attacker_score: 0.0,
            defender_score: 0.0,
            rounds: Vec::new(),
            outcome: None,
            opened_at: now,
            version: 0,
        };

        for unit in &mut session.attackers {
            unit.energy = energy::deduct_for_initiation(unit.energy, config);
        }

        session.transition(BattlePhase::Scouting);
        Ok(session)
    }

    fn transition(&mut self, to: BattlePhase) {
        tracing::debug!(battle = %self.id, from = ?self.phase, ?to, "Battle phase change");
        self.phase = to;
        self.version += 1;
    }

    fn require(&self, operation: &'static str, allowed: &[BattlePhase]) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SiegeError::invalid_phase(operation, self.phase))
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// `Some(true)` on victory, `Some(false)` on defeat or retreat
    pub fn victory(&self) -> Option<bool> {
        self.outcome.map(|o| o == BattleOutcome::Victory)
    }

    pub fn attacker_power(&self) -> u64 {
        total_power(&self.attackers)
    }

    pub fn defender_power(&self) -> u64 {
        total_power(&self.defenders)
    }

    /// Send one squad member to scout the garrison
    pub fn scout(
        &mut self,
        scout_unit: UnitId,
        config: &SiegeConfig,
        draws: &mut dyn DrawSource,
    ) -> Result<ScoutIntel> {
        // Scouting is left after the first attempt, so this also rejects a second scout
        self.require("scout", &[BattlePhase::Scouting])?;

        let scout = self
            .attackers
            .iter()
            .find(|u| u.id == scout_unit)
            .ok_or(SiegeError::UnknownScout(scout_unit))?;

        let intel = scouting::attempt(
            scout,
            &self.defenders,
            self.planned_defender_strategy,
            config.max_scout_bonus_pct,
            draws,
        );

        self.scout_attempted = true;
        self.scout_intel = Some(intel);
        self.transition(BattlePhase::StrategySelection);
        Ok(intel)
    }

    pub fn skip_scouting(&mut self) -> Result<()> {
        self.require("skip", &[BattlePhase::Scouting])?;
        self.scout_intel = None;
        self.transition(BattlePhase::StrategySelection);
        Ok(())
    }

    fn pick_strategy(&self, requested: Option<Strategy>) -> Result<Strategy> {
        match (self.strategy_lock, self.locked_strategy, requested) {
            (StrategyLock::LockedAfterFirst, Some(locked), None) => Ok(locked),
            (StrategyLock::LockedAfterFirst, Some(locked), Some(chosen)) if chosen != locked => {
                Err(SiegeError::StrategyLocked { locked })
            }
            (_, _, Some(chosen)) => Ok(chosen),
            (_, _, None) => Err(SiegeError::StrategyRequired),
        }
    }

    /// Scout bonus only counts in round 1 and never beyond what was earned
    fn effective_scout_bonus(&self, requested_pct: u8) -> u8 {
        if self.current_round != 1 {
            return 0;
        }
        let granted = self.scout_intel.map_or(0, |intel| intel.attack_bonus_pct);
        requested_pct.min(granted)
    }

    /// Fight the current round. Ends in `RoundResults`, or `Complete` when
    /// the round was decisive.
    pub fn execute_round(
        &mut self,
        requested_strategy: Option<Strategy>,
        requested_bonus_pct: u8,
        config: &SiegeConfig,
        draws: &mut dyn DrawSource,
    ) -> Result<RoundResult> {
        self.require("execute_round", &[BattlePhase::StrategySelection])?;
        let attacker_strategy = self.pick_strategy(requested_strategy)?;

        self.transition(BattlePhase::RoundExecuting);

        let defender_strategy = self.planned_defender_strategy;
        let scout_bonus_pct = self.effective_scout_bonus(requested_bonus_pct);
        let input = RoundInput {
            attacker_power: self.attacker_power(),
            defender_power: self.defender_power(),
            attacker_strategy,
            defender_strategy,
            scout_bonus_pct,
            defense_bonus_pct: self.defense_bonus_pct,
        };
        let outcome = resolve_round(&input, draws);

        let attacker_energy = spend_round(&mut self.attackers, attacker_strategy, config);
        let defender_energy = spend_round(&mut self.defenders, defender_strategy, config);

        self.attacker_score += outcome.attacker_score;
        self.defender_score += outcome.defender_score;

        let knockout = energy::aggregate_energy(&self.attackers) == 0
            || energy::aggregate_energy(&self.defenders) == 0;
        let decisive = self.current_round >= self.max_rounds || knockout;

        let result = RoundResult {
            round: self.current_round,
            attacker_strategy,
            defender_strategy,
            scout_bonus_pct,
            odds: outcome.odds,
            draw: outcome.draw,
            attacker_won: outcome.attacker_won,
            attacker_energy,
            defender_energy,
            decisive,
        };
        self.rounds.push(result.clone());

        if self.strategy_lock == StrategyLock::LockedAfterFirst && self.locked_strategy.is_none() {
            self.locked_strategy = Some(attacker_strategy);
        }

        tracing::info!(
            battle = %self.id,
            round = self.current_round,
            attacker = attacker_strategy.name(),
            defender = defender_strategy.name(),
            probability = outcome.odds.success_probability,
            attacker_won = outcome.attacker_won,
            decisive,
            "Round resolved"
        );

        if decisive {
            // Ties go to the defender
            let outcome = if self.attacker_score > self.defender_score {
                BattleOutcome::Victory
            } else {
                BattleOutcome::Defeat
            };
            self.outcome = Some(outcome);
            self.transition(BattlePhase::Complete);
        } else {
            self.transition(BattlePhase::RoundResults);
        }

        Ok(result)
    }

    /// Move on to the next round with a freshly planned defender stance
    pub fn continue_battle(&mut self) -> Result<()> {
        self.require("continue", &[BattlePhase::RoundResults])?;

        self.current_round += 1;
        self.planned_defender_strategy = ai_defender_strategy(&self.defenders);
        self.transition(BattlePhase::StrategySelection);
        Ok(())
    }

    /// Abandon the siege. Energy already spent stays spent.
    pub fn retreat(&mut self) -> Result<()> {
        self.require(
            "retreat",
            &[
                BattlePhase::Scouting,
                BattlePhase::StrategySelection,
                BattlePhase::RoundResults,
            ],
        )?;

        self.outcome = Some(BattleOutcome::Retreated);
        self.transition(BattlePhase::Retreated);
        Ok(())
    }
}

fn spend_round(units: &mut [UnitSnapshot], strategy: Strategy, config: &SiegeConfig) -> Vec<EnergyChange> {
    units
        .iter_mut()
        .map(|unit| {
            let before = unit.energy;
            unit.energy = energy::deduct_for_round(before, strategy, config);
            EnergyChange {
                unit: unit.id,
                before,
                after: unit.energy,
            }
        })
        .collect()
}
