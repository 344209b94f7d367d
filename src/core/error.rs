use thiserror::Error;

use crate::core::types::{BattleId, Credits, TerritoryId, Timestamp, UnitId};
use crate::roster::UnitStatus;
use crate::siege::{BattlePhase, Strategy};

/// Every failure the siege core reports. All of them are recoverable and
/// none of them leave partial state behind.
#[derive(Error, Debug)]
pub enum SiegeError {
    #[error("{operation} is not allowed while the battle is in phase {phase:?}")]
    InvalidPhase {
        operation: &'static str,
        phase: BattlePhase,
    },

    #[error("Invalid squad: {0}")]
    InvalidSquad(String),

    #[error("Unit {unit} is not available for deployment ({status:?})")]
    UnitUnavailable { unit: UnitId, status: UnitStatus },

    #[error("Unit not found: {0}")]
    UnknownUnit(UnitId),

    #[error("Territory not found: {0}")]
    UnknownTerritory(TerritoryId),

    #[error("Cannot attack your own territory {0}")]
    OwnTerritory(TerritoryId),

    #[error("Territory {territory} is on cooldown until {until}")]
    OnCooldown {
        territory: TerritoryId,
        until: Timestamp,
    },

    #[error("Territory {territory} already has an open battle {battle}")]
    SessionConflict {
        territory: TerritoryId,
        battle: BattleId,
    },

    #[error("Insufficient funds: restoration costs {needed}, balance is {available}")]
    InsufficientFunds { needed: Credits, available: Credits },

    #[error("Battle not found: {0}")]
    UnknownBattle(BattleId),

    #[error("Scout {0} is not part of the attacking squad")]
    UnknownScout(UnitId),

    #[error("An attacker strategy is required for this round")]
    StrategyRequired,

    #[error("Strategy is locked to {locked:?} after the first round")]
    StrategyLocked { locked: Strategy },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SiegeError {
    pub(crate) fn invalid_phase(operation: &'static str, phase: BattlePhase) -> Self {
        Self::InvalidPhase { operation, phase }
    }
}

pub type Result<T> = std::result::Result<T, SiegeError>;
