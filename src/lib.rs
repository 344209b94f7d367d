//! Citadel Siege - territory siege battles
//!
//! Players send squads of units against territories held by other players
//! or by AI garrisons. Battles run for a few rounds of stance-versus-stance
//! combat; winning takes the territory.

pub mod core;
pub mod roster;
pub mod siege;
pub mod store;
pub mod territory;
