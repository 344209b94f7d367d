//! Energy economy
//!
//! Units spend energy to start a battle and to fight each round. Energy is
//! restored to full by paying credits in proportion to the deficit.

use serde::{Deserialize, Serialize};

use super::session::UnitSnapshot;
use super::strategy::Strategy;
use crate::core::config::SiegeConfig;
use crate::core::error::{Result, SiegeError};
use crate::core::types::{Credits, Energy, MAX_ENERGY};
use crate::roster::Unit;

/// Outcome of a paid restoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReceipt {
    pub new_energy: Energy,
    pub cost: Credits,
}

/// Energy spent by one unit for one round in the given stance
pub fn round_cost(strategy: Strategy, config: &SiegeConfig) -> Energy {
    match strategy {
        Strategy::Aggressive => config.aggressive_round_cost,
        Strategy::Balanced => config.balanced_round_cost,
        Strategy::Defensive => config.defensive_round_cost,
    }
}

fn spend(current: Energy, cost: Energy) -> Energy {
    current.min(MAX_ENERGY).saturating_sub(cost)
}

pub fn deduct_for_round(current: Energy, strategy: Strategy, config: &SiegeConfig) -> Energy {
    spend(current, round_cost(strategy, config))
}

pub fn deduct_for_initiation(current: Energy, config: &SiegeConfig) -> Energy {
    spend(current, config.initiation_energy_cost)
}

/// Credits needed to bring `current` back to full
pub fn restore_cost(current: Energy, config: &SiegeConfig) -> Credits {
    let deficit = MAX_ENERGY.saturating_sub(current) as Credits;
    deficit * config.restore_cost_per_point
}

/// Refill a unit to full energy, all or nothing
pub fn restore(unit: &mut Unit, balance: Credits, config: &SiegeConfig) -> Result<RestoreReceipt> {
    let cost = restore_cost(unit.energy, config);
    if balance < cost {
        return Err(SiegeError::InsufficientFunds {
            needed: cost,
            available: balance,
        });
    }

    unit.energy = MAX_ENERGY;
    Ok(RestoreReceipt {
        new_energy: MAX_ENERGY,
        cost,
    })
}

/// Combined energy of one side, used for knockout checks
pub fn aggregate_energy(units: &[UnitSnapshot]) -> u32 {
    units.iter().map(|u| u.energy as u32).sum()
}
