//! Combat stances and the matchup table
//!
//! | attacker \ defender | Aggressive | Balanced | Defensive |
//! |---------------------|------------|----------|-----------|
//! | Aggressive          | 1.0 / 1.0  | 0.8 / 1.25 | 1.25 / 0.8 |
//! | Balanced            | 1.25 / 0.8 | 1.0 / 1.0  | 0.8 / 1.25 |
//! | Defensive           | 0.8 / 1.25 | 1.25 / 0.8 | 1.0 / 1.0  |
//!
//! Aggressive beats Defensive, Defensive beats Balanced, Balanced beats
//! Aggressive. A mirror match gives no bonus to either side.

use serde::{Deserialize, Serialize};

use super::constants::*;
use super::session::UnitSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Aggressive,
    Balanced,
    Defensive,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Aggressive, Strategy::Balanced, Strategy::Defensive];

    /// The stance this one wins against
    pub fn beats(&self) -> Strategy {
        match self {
            Strategy::Aggressive => Strategy::Defensive,
            Strategy::Defensive => Strategy::Balanced,
            Strategy::Balanced => Strategy::Aggressive,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Aggressive => "aggressive",
            Strategy::Balanced => "balanced",
            Strategy::Defensive => "defensive",
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aggressive" => Ok(Strategy::Aggressive),
            "balanced" => Ok(Strategy::Balanced),
            "defensive" => Ok(Strategy::Defensive),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// (attacker multiplier, defender multiplier) for a pairing
pub fn matchup_multipliers(attacker: Strategy, defender: Strategy) -> (f64, f64) {
    if attacker == defender {
        (MATCHUP_EVEN, MATCHUP_EVEN)
    } else if attacker.beats() == defender {
        (MATCHUP_ADVANTAGE, MATCHUP_DISADVANTAGE)
    } else {
        (MATCHUP_DISADVANTAGE, MATCHUP_ADVANTAGE)
    }
}

/// Defender AI stance, driven by how much energy the garrison has left
pub fn ai_defender_strategy(defenders: &[UnitSnapshot]) -> Strategy {
    if defenders.is_empty() {
        return Strategy::Defensive;
    }

    let total: u32 = defenders.iter().map(|d| d.energy as u32).sum();
    let average = total / defenders.len() as u32;

    if average >= AI_AGGRESSIVE_ENERGY {
        Strategy::Aggressive
    } else if average >= AI_BALANCED_ENERGY {
        Strategy::Balanced
    } else {
        Strategy::Defensive
    }
}
