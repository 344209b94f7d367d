//! Contested territories and their tiers

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, TerritoryId, Timestamp, UnitId};

/// Territory rarity. Each step raises rounds, AI defense and rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerritoryTier {
    #[default]
    Common,
    Rare,
    Epic,
}

impl TerritoryTier {
    /// Rounds a siege on this tier lasts at most
    pub fn max_rounds(&self) -> u32 {
        match self {
            TerritoryTier::Common => 3,
            TerritoryTier::Rare => 4,
            TerritoryTier::Epic => 5,
        }
    }

    /// Multiplier on synthesized AI defender power
    pub fn ai_defense_multiplier(&self) -> f64 {
        match self {
            TerritoryTier::Common => 1.0,
            TerritoryTier::Rare => 1.5,
            TerritoryTier::Epic => 2.0,
        }
    }

    pub fn reward_multiplier(&self) -> f64 {
        match self {
            TerritoryTier::Common => 1.0,
            TerritoryTier::Rare => 2.0,
            TerritoryTier::Epic => 4.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TerritoryTier::Common => "common",
            TerritoryTier::Rare => "rare",
            TerritoryTier::Epic => "epic",
        }
    }
}

impl std::str::FromStr for TerritoryTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Ok(TerritoryTier::Common),
            "rare" => Ok(TerritoryTier::Rare),
            "epic" => Ok(TerritoryTier::Epic),
            other => Err(format!("unknown tier '{}'", other)),
        }
    }
}

/// Cooldown that only deters one attacker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerCooldown {
    pub attacker: PlayerId,
    pub until: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub tier: TerritoryTier,
    pub owner: Option<PlayerId>,
    /// Garrison in deployment order. Empty means AI defenders are synthesized.
    pub defending_squad: Vec<UnitId>,
    pub base_reward_per_hour: u32,
    /// Bonus applied to defender power every round (percent)
    pub defense_bonus_pct: u8,
    /// Conquest protection or retreat penalty; nobody may attack before this
    pub cooldown_until: Option<Timestamp>,
    #[serde(default)]
    pub attacker_cooldowns: Vec<AttackerCooldown>,
}

impl Territory {
    pub fn new(name: impl Into<String>, tier: TerritoryTier) -> Self {
        Self {
            id: TerritoryId::new(),
            name: name.into(),
            tier,
            owner: None,
            defending_squad: Vec::new(),
            base_reward_per_hour: 10,
            defense_bonus_pct: 0,
            cooldown_until: None,
            attacker_cooldowns: Vec::new(),
        }
    }

    pub fn is_ai_held(&self) -> bool {
        self.defending_squad.is_empty()
    }

    pub fn is_on_cooldown(&self, now: Timestamp) -> bool {
        self.cooldown_until.is_some_and(|until| until > now)
    }

    /// Latest active cooldown that blocks `attacker`, if any
    pub fn blocking_cooldown(&self, attacker: PlayerId, now: Timestamp) -> Option<Timestamp> {
        let personal = self
            .attacker_cooldowns
            .iter()
            .filter(|c| c.attacker == attacker && c.until > now)
            .map(|c| c.until)
            .max();

        let global = self.cooldown_until.filter(|until| *until > now);

        global.into_iter().chain(personal).max()
    }

    /// Set or extend the cooldown for one attacker, dropping expired entries
    pub fn deter_attacker(&mut self, attacker: PlayerId, until: Timestamp, now: Timestamp) {
        self.attacker_cooldowns.retain(|c| c.until > now && c.attacker != attacker);
        self.attacker_cooldowns.push(AttackerCooldown { attacker, until });
    }

    pub fn reward_per_hour(&self) -> f64 {
        self.base_reward_per_hour as f64 * self.tier.reward_multiplier()
    }

    pub fn is_defended_by(&self, unit: UnitId) -> bool {
        self.defending_squad.contains(&unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_scaling_is_monotonic() {
        let tiers = [TerritoryTier::Common, TerritoryTier::Rare, TerritoryTier::Epic];
        for pair in tiers.windows(2) {
            assert!(pair[1].max_rounds() > pair[0].max_rounds());
            assert!(pair[1].ai_defense_multiplier() > pair[0].ai_defense_multiplier());
            assert!(pair[1].reward_multiplier() > pair[0].reward_multiplier());
        }
        assert_eq!(TerritoryTier::Common.max_rounds(), 3);
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("Epic".parse::<TerritoryTier>(), Ok(TerritoryTier::Epic));
        assert!("legendary".parse::<TerritoryTier>().is_err());
    }

    #[test]
    fn test_cooldown_expires() {
        let mut territory = Territory::new("Ashfall", TerritoryTier::Common);
        territory.cooldown_until = Some(500);

        assert!(territory.is_on_cooldown(499));
        assert!(!territory.is_on_cooldown(500));
    }

    #[test]
    fn test_attacker_cooldown_only_blocks_that_attacker() {
        let mut territory = Territory::new("Ashfall", TerritoryTier::Common);
        let loser = PlayerId::new();
        let other = PlayerId::new();

        territory.deter_attacker(loser, 300, 0);

        assert_eq!(territory.blocking_cooldown(loser, 100), Some(300));
        assert_eq!(territory.blocking_cooldown(other, 100), None);
        assert_eq!(territory.blocking_cooldown(loser, 300), None);
    }

    #[test]
    fn test_deter_attacker_replaces_previous_entry() {
        let mut territory = Territory::new("Ashfall", TerritoryTier::Common);
        let attacker = PlayerId::new();

        territory.deter_attacker(attacker, 300, 0);
        territory.deter_attacker(attacker, 900, 100);

        assert_eq!(territory.attacker_cooldowns.len(), 1);
        assert_eq!(territory.blocking_cooldown(attacker, 400), Some(900));
    }

    #[test]
    fn test_global_and_personal_cooldowns_take_latest() {
        let mut territory = Territory::new("Ashfall", TerritoryTier::Rare);
        let attacker = PlayerId::new();
        territory.cooldown_until = Some(200);
        territory.deter_attacker(attacker, 600, 0);

        assert_eq!(territory.blocking_cooldown(attacker, 100), Some(600));
    }

    #[test]
    fn test_reward_scales_with_tier() {
        let mut territory = Territory::new("Ashfall", TerritoryTier::Epic);
        territory.base_reward_per_hour = 25;
        assert_eq!(territory.reward_per_hour(), 100.0);
    }
}
