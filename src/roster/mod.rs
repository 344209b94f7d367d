//! Player rosters: owned units and whether they can be deployed

pub mod availability;
pub mod unit;

pub use availability::{classify, classify_roster, is_eligible_for_deployment, UnitStatus};
pub use unit::{Assignment, Unit};
