//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for units (one per owned NFT)
    UnitId
);

uuid_id!(
    /// Unique identifier for territories
    TerritoryId
);

uuid_id!(
    /// Unique identifier for a single siege attempt
    BattleId
);

uuid_id!(
    /// Unique identifier for players (wallet owners)
    PlayerId
);

/// Wall-clock time in whole seconds since the Unix epoch
pub type Timestamp = u64;

/// Unit energy, always within `0..=MAX_ENERGY`
pub type Energy = u8;

/// In-game currency used to pay for energy restoration
pub type Credits = u64;

/// Energy ceiling shared by every unit
pub const MAX_ENERGY: Energy = 100;
