//! Siege battles
//!
//! A siege is a short sequence of rounds between an attacking squad and a
//! territory's garrison. The session state machine lives in `session`, the
//! pure rules around it (odds, scouting, energy, stances) in their own
//! modules, and `coordinator` is the entry point that persists every step.

pub mod constants;
pub mod coordinator;
pub mod draws;
pub mod energy;
pub mod resolution;
pub mod scouting;
pub mod session;
pub mod strategy;

pub use coordinator::{BattleStart, RoundReport, SiegeCoordinator};
pub use draws::{DrawSource, FixedDraws, SeededDraws};
pub use energy::RestoreReceipt;
pub use resolution::{compute_odds, estimate_success_pct, EnergyChange, RoundInput, RoundOdds, RoundResult};
pub use scouting::ScoutIntel;
pub use session::{ai_garrison, BattleOutcome, BattlePhase, BattleSession, UnitSnapshot};
pub use strategy::Strategy;
