//! Collaborators the siege core calls outward: persistence and notifications
//!
//! The core reads units, territories and balances through `SiegeStore` and
//! writes back through a single `commit` per commit point. A failed commit
//! means the action did not happen.

pub mod memory;
pub mod notify;

pub use memory::{MemoryStore, WorldSnapshot};
pub use notify::{BattleNotifier, BattleReport, TracingNotifier};

use crate::core::error::Result;
use crate::core::types::{BattleId, Credits, PlayerId, TerritoryId, UnitId};
use crate::roster::Unit;
use crate::siege::BattleSession;
use crate::territory::Territory;

/// Everything written at one commit point, applied atomically
#[derive(Debug, Clone, Default)]
pub struct CommitBatch {
    pub units: Vec<Unit>,
    pub territory: Option<Territory>,
    pub session: Option<BattleSession>,
    pub balance: Option<(PlayerId, Credits)>,
}

pub trait SiegeStore: Send + Sync {
    fn unit(&self, id: UnitId) -> Result<Option<Unit>>;

    fn roster(&self, owner: PlayerId) -> Result<Vec<Unit>>;

    fn territory(&self, id: TerritoryId) -> Result<Option<Territory>>;

    fn territories(&self) -> Result<Vec<Territory>>;

    fn balance(&self, player: PlayerId) -> Result<Credits>;

    /// Stored record of a battle, open or finished
    fn session(&self, id: BattleId) -> Result<Option<BattleSession>>;

    /// Sessions not yet in a terminal phase, for crash recovery
    fn open_sessions(&self) -> Result<Vec<BattleSession>>;

    fn commit(&self, batch: CommitBatch) -> Result<()>;
}
