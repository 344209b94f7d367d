//! In-process store backed by hash maps
//!
//! Used by the runner binary and the test suite. The whole world can be
//! dumped to and loaded from JSON.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{CommitBatch, SiegeStore};
use crate::core::error::{Result, SiegeError};
use crate::core::types::{BattleId, Credits, PlayerId, TerritoryId, UnitId};
use crate::roster::Unit;
use crate::siege::BattleSession;
use crate::territory::Territory;

#[derive(Debug, Default)]
struct MemoryState {
    units: AHashMap<UnitId, Unit>,
    territories: AHashMap<TerritoryId, Territory>,
    balances: AHashMap<PlayerId, Credits>,
    sessions: AHashMap<BattleId, BattleSession>,
    commits: u64,
}

/// Serializable dump of a `MemoryStore`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub units: Vec<Unit>,
    pub territories: Vec<Territory>,
    pub balances: Vec<(PlayerId, Credits)>,
    #[serde(default)]
    pub sessions: Vec<BattleSession>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_next_commit: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_unit(&self, unit: Unit) {
        self.state().units.insert(unit.id, unit);
    }

    pub fn insert_territory(&self, territory: Territory) {
        self.state().territories.insert(territory.id, territory);
    }

    pub fn set_balance(&self, player: PlayerId, credits: Credits) {
        self.state().balances.insert(player, credits);
    }

    /// Number of successful commits so far
    pub fn commit_count(&self) -> u64 {
        self.state().commits
    }

    /// Make the next `commit` fail without writing anything
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let state = self.state();
        WorldSnapshot {
            units: state.units.values().cloned().collect(),
            territories: state.territories.values().cloned().collect(),
            balances: state.balances.iter().map(|(p, c)| (*p, *c)).collect(),
            sessions: state.sessions.values().cloned().collect(),
        }
    }

    pub fn from_snapshot(snapshot: WorldSnapshot) -> Self {
        let store = Self::new();
        {
            let mut state = store.state();
            state.units = snapshot.units.into_iter().map(|u| (u.id, u)).collect();
            state.territories = snapshot.territories.into_iter().map(|t| (t.id, t)).collect();
            state.balances = snapshot.balances.into_iter().collect();
            state.sessions = snapshot.sessions.into_iter().map(|s| (s.id, s)).collect();
        }
        store
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: WorldSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }
}

impl SiegeStore for MemoryStore {
    fn unit(&self, id: UnitId) -> Result<Option<Unit>> {
        Ok(self.state().units.get(&id).cloned())
    }

    fn roster(&self, owner: PlayerId) -> Result<Vec<Unit>> {
        let mut roster: Vec<Unit> = self
            .state()
            .units
            .values()
            .filter(|u| u.owner == owner)
            .cloned()
            .collect();
        roster.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roster)
    }

    fn territory(&self, id: TerritoryId) -> Result<Option<Territory>> {
        Ok(self.state().territories.get(&id).cloned())
    }

    fn territories(&self) -> Result<Vec<Territory>> {
        Ok(self.state().territories.values().cloned().collect())
    }

    fn balance(&self, player: PlayerId) -> Result<Credits> {
        Ok(self.state().balances.get(&player).copied().unwrap_or(0))
    }

    fn open_sessions(&self) -> Result<Vec<BattleSession>> {
        Ok(self
            .state()
            .sessions
            .values()
            .filter(|s| !s.is_terminal())
            .cloned()
            .collect())
    }

    fn session(&self, id: BattleId) -> Result<Option<BattleSession>> {
        Ok(self.state().sessions.get(&id).cloned())
    }

    fn commit(&self, batch: CommitBatch) -> Result<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(SiegeError::Storage("injected commit failure".into()));
        }

        let mut state = self.state();
        for unit in batch.units {
            state.units.insert(unit.id, unit);
        }
        if let Some(territory) = batch.territory {
            state.territories.insert(territory.id, territory);
        }
        if let Some(session) = batch.session {
            state.sessions.insert(session.id, session);
        }
        if let Some((player, credits)) = batch.balance {
            state.balances.insert(player, credits);
        }
        state.commits += 1;
        Ok(())
    }
}
