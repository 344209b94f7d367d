//! Pre-battle scouting
//!
//! One squad member probes the garrison before round 1. Stronger scouts
//! relative to the defenders succeed more often and earn a larger bonus.
//! A successful scout reveals the defender's round-1 stance.

use serde::{Deserialize, Serialize};

use super::constants::{SCOUT_CHANCE_SPAN, SCOUT_MIN_CHANCE};
use super::draws::DrawSource;
use super::session::UnitSnapshot;
use super::strategy::Strategy;

/// What the scout brought back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutIntel {
    pub scouting_successful: bool,
    pub revealed_strategy: Option<Strategy>,
    /// Bonus to attacker power in round 1 (percent)
    pub attack_bonus_pct: u8,
}

impl ScoutIntel {
    pub fn failed() -> Self {
        Self {
            scouting_successful: false,
            revealed_strategy: None,
            attack_bonus_pct: 0,
        }
    }
}

/// Share of the contest the scout holds, s / (s + d)
fn relative_power(scout_power: u32, defender_power: f64) -> f64 {
    let s = scout_power as f64;
    let d = defender_power.max(1.0);
    s / (s + d)
}

/// Average power of a garrison
pub fn average_power(defenders: &[UnitSnapshot]) -> f64 {
    if defenders.is_empty() {
        return 0.0;
    }
    defenders.iter().map(|d| d.power as f64).sum::<f64>() / defenders.len() as f64
}

/// Chance a scout succeeds. Strictly increasing in scout power, never 0 or 1.
pub fn success_chance(scout_power: u32, defender_power: f64) -> f64 {
    SCOUT_MIN_CHANCE + SCOUT_CHANCE_SPAN * relative_power(scout_power, defender_power)
}

/// Bonus a successful scout earns, between 1 and `max_bonus_pct`
pub fn success_bonus_pct(scout_power: u32, defender_power: f64, max_bonus_pct: u8) -> u8 {
    if max_bonus_pct == 0 {
        return 0;
    }
    let raw = (max_bonus_pct as f64 * relative_power(scout_power, defender_power)).round() as u8;
    raw.clamp(1, max_bonus_pct)
}

/// Roll a scouting attempt against the garrison
pub fn attempt(
    scout: &UnitSnapshot,
    defenders: &[UnitSnapshot],
    planned_defender: Strategy,
    max_bonus_pct: u8,
    draws: &mut dyn DrawSource,
) -> ScoutIntel {
    let defender_power = average_power(defenders);
    let chance = success_chance(scout.power, defender_power);
    let draw = draws.next_draw();

    tracing::debug!(
        scout = %scout.name,
        chance,
        draw,
        "Scouting attempt"
    );

    if draw < chance {
        ScoutIntel {
            scouting_successful: true,
            revealed_strategy: Some(planned_defender),
            attack_bonus_pct: success_bonus_pct(scout.power, defender_power, max_bonus_pct),
        }
    } else {
        ScoutIntel::failed()
    }
}
