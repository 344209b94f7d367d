//! Siege configuration with documented constants
//!
//! Every tunable number in the energy economy, scouting and cooldown rules
//! lives here. Values can be overridden from a TOML file; any key left out
//! keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::error::{Result, SiegeError};
use super::types::{Credits, Energy, MAX_ENERGY};

/// Whether the attacker may pick a new strategy every round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyLock {
    /// A strategy is chosen for each round
    #[default]
    PerRound,
    /// The round-1 strategy is reused for every later round
    LockedAfterFirst,
}

/// Configuration for the siege systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiegeConfig {
    // === DEPLOYMENT ===
    /// Minimum energy a unit needs to join a new squad
    ///
    /// Checked only when the squad is assembled. A unit that drops below
    /// this mid-battle still finishes the battle it is in.
    pub min_deploy_energy: Energy,

    /// Energy taken from every attacker when a battle is initiated
    pub initiation_energy_cost: Energy,

    // === ROUND COSTS ===
    /// Energy spent per round by a unit fighting aggressively
    pub aggressive_round_cost: Energy,

    /// Energy spent per round by a unit fighting balanced
    pub balanced_round_cost: Energy,

    /// Energy spent per round by a unit fighting defensively
    pub defensive_round_cost: Energy,

    // === RESTORATION ===
    /// Credits charged per missing energy point when restoring to full
    pub restore_cost_per_point: Credits,

    // === SCOUTING ===
    /// Largest round-1 attack bonus a successful scout can earn (percent)
    pub max_scout_bonus_pct: u8,

    // === COOLDOWNS (seconds) ===
    /// Conquest protection given to a new owner
    ///
    /// At 3 hours the new owner gets time to garrison before a counter-siege.
    pub conquest_cooldown_secs: u64,

    /// Territory cooldown after an attacker retreats
    pub retreat_cooldown_secs: u64,

    /// Per-attacker cooldown after a defeat (0 disables it)
    pub defeat_attacker_cooldown_secs: u64,

    // === ROUNDS ===
    /// Whether the attacker can change strategy after round 1
    pub strategy_lock: StrategyLock,

    // === AI DEFENDERS ===
    /// Number of defenders synthesized for an ungarrisoned territory
    pub ai_defender_count: usize,

    /// Total power of the synthesized defenders before the tier multiplier
    pub ai_defense_power: u32,
}

impl Default for SiegeConfig {
    fn default() -> Self {
        Self {
            min_deploy_energy: 20,
            initiation_energy_cost: 10,

            // Aggressive > balanced > defensive
            aggressive_round_cost: 15,
            balanced_round_cost: 10,
            defensive_round_cost: 5,

            restore_cost_per_point: 2,

            max_scout_bonus_pct: 25,

            conquest_cooldown_secs: 3 * 60 * 60,
            retreat_cooldown_secs: 15 * 60,
            defeat_attacker_cooldown_secs: 5 * 60,

            strategy_lock: StrategyLock::PerRound,

            ai_defender_count: 3,
            ai_defense_power: 300,
        }
    }
}

impl SiegeConfig {
    /// Parse a config from TOML text, filling gaps with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SiegeConfig = toml::from_str(content)?;
        config.validate().map_err(SiegeError::Config)?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.min_deploy_energy > MAX_ENERGY {
            return Err(format!(
                "min_deploy_energy ({}) exceeds max energy ({})",
                self.min_deploy_energy, MAX_ENERGY
            ));
        }

        // Stances must keep their cost ordering
        if !(self.aggressive_round_cost >= self.balanced_round_cost
            && self.balanced_round_cost >= self.defensive_round_cost)
        {
            return Err(format!(
                "round costs must be ordered aggressive ({}) >= balanced ({}) >= defensive ({})",
                self.aggressive_round_cost, self.balanced_round_cost, self.defensive_round_cost
            ));
        }

        if self.max_scout_bonus_pct > 100 {
            return Err(format!(
                "max_scout_bonus_pct ({}) must be at most 100",
                self.max_scout_bonus_pct
            ));
        }

        if self.retreat_cooldown_secs > self.conquest_cooldown_secs {
            return Err(format!(
                "retreat_cooldown_secs ({}) should be shorter than conquest_cooldown_secs ({})",
                self.retreat_cooldown_secs, self.conquest_cooldown_secs
            ));
        }

        if self.ai_defender_count == 0 {
            return Err("ai_defender_count must be at least 1".into());
        }

        Ok(())
    }
}
