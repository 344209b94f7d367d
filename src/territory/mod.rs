//! Territories, ownership transfer and siege cooldowns

pub mod ownership;
pub mod state;

pub use ownership::{apply_outcome, settle_attackers, settle_defenders, OwnershipChange};
pub use state::{AttackerCooldown, Territory, TerritoryTier};
