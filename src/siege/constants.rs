//! Siege resolution constants - the fixed tables behind every round
//!
//! Tunable costs and cooldowns live in `SiegeConfig`; these values define the
//! shape of the game and are not meant to be configured per deployment.

// Strategy matchups (multipliers on effective power)
pub const MATCHUP_ADVANTAGE: f64 = 1.25;
pub const MATCHUP_DISADVANTAGE: f64 = 0.80;
pub const MATCHUP_EVEN: f64 = 1.0;

// Round success probability never reaches certainty
pub const MIN_SUCCESS_PROBABILITY: f64 = 0.05;
pub const MAX_SUCCESS_PROBABILITY: f64 = 0.95;

// Scouting success chance spans [SCOUT_MIN_CHANCE, SCOUT_MIN_CHANCE + SCOUT_CHANCE_SPAN)
pub const SCOUT_MIN_CHANCE: f64 = 0.05;
pub const SCOUT_CHANCE_SPAN: f64 = 0.90;

// Defender AI: average squad energy needed for each stance
pub const AI_AGGRESSIVE_ENERGY: u32 = 70;
pub const AI_BALANCED_ENERGY: u32 = 40;

// Pre-battle estimate shown to the attacker (percent)
pub const MIN_ESTIMATE_PCT: u8 = 5;
pub const MAX_ESTIMATE_PCT: u8 = 95;
