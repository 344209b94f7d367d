//! Round resolution
//!
//! Effective power on each side is base power scaled by the stance matchup
//! and by the side's bonus (scouting for the attacker, fortifications for the
//! defender). The attacker's round win chance is its share of the combined
//! effective power, clamped so no round is ever certain.

use serde::{Deserialize, Serialize};

use super::constants::*;
use super::draws::DrawSource;
use super::strategy::{matchup_multipliers, Strategy};
use crate::core::types::{Energy, UnitId};

/// Everything a single round depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundInput {
    pub attacker_power: u64,
    pub defender_power: u64,
    pub attacker_strategy: Strategy,
    pub defender_strategy: Strategy,
    pub scout_bonus_pct: u8,
    pub defense_bonus_pct: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundOdds {
    pub effective_attacker: f64,
    pub effective_defender: f64,
    pub success_probability: f64,
}

/// The roll of one round, before energy and decisiveness are applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub odds: RoundOdds,
    pub draw: f64,
    pub attacker_won: bool,
    /// Score banked by the attacker this round
    pub attacker_score: f64,
    /// Score banked by the defender this round
    pub defender_score: f64,
}

/// Energy of one unit across a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyChange {
    pub unit: UnitId,
    pub before: Energy,
    pub after: Energy,
}

/// Immutable record of one resolved round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub attacker_strategy: Strategy,
    pub defender_strategy: Strategy,
    pub scout_bonus_pct: u8,
    pub odds: RoundOdds,
    pub draw: f64,
    pub attacker_won: bool,
    pub attacker_energy: Vec<EnergyChange>,
    pub defender_energy: Vec<EnergyChange>,
    pub decisive: bool,
}

impl RoundResult {
    pub fn success_probability(&self) -> f64 {
        self.odds.success_probability
    }
}

fn pct(value: u8) -> f64 {
    value as f64 / 100.0
}

pub fn compute_odds(input: &RoundInput) -> RoundOdds {
    let (attacker_mult, defender_mult) =
        matchup_multipliers(input.attacker_strategy, input.defender_strategy);

    let effective_attacker =
        input.attacker_power as f64 * (1.0 + pct(input.scout_bonus_pct)) * attacker_mult;
    let effective_defender =
        input.defender_power as f64 * (1.0 + pct(input.defense_bonus_pct)) * defender_mult;

    let total = effective_attacker + effective_defender;
    let raw = if total > 0.0 {
        effective_attacker / total
    } else {
        0.5
    };

    RoundOdds {
        effective_attacker,
        effective_defender,
        success_probability: raw.clamp(MIN_SUCCESS_PROBABILITY, MAX_SUCCESS_PROBABILITY),
    }
}

/// Resolve one round. The winner banks its own win chance as score, so an
/// upset earns less than a win that was expected.
pub fn resolve_round(input: &RoundInput, draws: &mut dyn DrawSource) -> RoundOutcome {
    let odds = compute_odds(input);
    let draw = draws.next_draw();
    let attacker_won = draw < odds.success_probability;

    let (attacker_score, defender_score) = if attacker_won {
        (odds.success_probability, 0.0)
    } else {
        (0.0, 1.0 - odds.success_probability)
    };

    RoundOutcome {
        odds,
        draw,
        attacker_won,
        attacker_score,
        defender_score,
    }
}

/// Rough win chance shown before a siege starts (percent)
pub fn estimate_success_pct(attack_power: u64, defender_power: u64) -> u8 {
    if defender_power == 0 {
        return MAX_ESTIMATE_PCT;
    }
    let ratio = (attack_power as f64 / defender_power as f64 * 100.0).round();
    ratio.clamp(MIN_ESTIMATE_PCT as f64, MAX_ESTIMATE_PCT as f64) as u8
}
