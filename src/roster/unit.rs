//! Owned combat units
//!
//! A unit is one NFT soldier. Its energy is owned by this record but only the
//! energy economy changes it.

use serde::{Deserialize, Serialize};

use crate::core::types::{BattleId, Energy, PlayerId, TerritoryId, Timestamp, UnitId, MAX_ENERGY};

/// What a unit is currently committed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Assignment {
    #[default]
    None,
    /// Part of an attacking squad in an open battle
    Deployed(BattleId),
    /// Garrisoned in a territory
    Defending(TerritoryId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub name: String,
    pub power: u32,
    pub energy: Energy,
    pub is_training: bool,
    pub training_completes_at: Option<Timestamp>,
    pub assignment: Assignment,
}

impl Unit {
    pub fn new(owner: PlayerId, name: impl Into<String>, power: u32) -> Self {
        Self {
            id: UnitId::new(),
            owner,
            name: name.into(),
            power,
            energy: MAX_ENERGY,
            is_training: false,
            training_completes_at: None,
            assignment: Assignment::None,
        }
    }

    pub fn with_energy(mut self, energy: Energy) -> Self {
        self.energy = energy.min(MAX_ENERGY);
        self
    }

    /// Training counts until its completion time has passed
    pub fn is_training_at(&self, now: Timestamp) -> bool {
        self.is_training && self.training_completes_at.map_or(true, |done| done > now)
    }

    pub fn is_deployed(&self) -> bool {
        matches!(self.assignment, Assignment::Deployed(_))
    }
}
