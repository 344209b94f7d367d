//! Siege coordinator - the boundary every client request goes through
//!
//! Owns the registry of open sessions and serializes access to them:
//! - initiation runs under the registry lock, so a territory gets one open
//!   session and a unit joins one squad
//! - every session sits behind its own mutex; operations run on a clone that
//!   replaces the original only after the store accepted the commit
//!
//! Lock order is always session before registry.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use super::draws::{DrawSource, SeededDraws};
use super::energy::{self, RestoreReceipt};
use super::resolution::RoundResult;
use super::scouting::ScoutIntel;
use super::session::{BattleSession, UnitSnapshot};
use super::strategy::Strategy;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::SiegeConfig;
use crate::core::error::{Result, SiegeError};
use crate::core::types::{BattleId, PlayerId, TerritoryId, UnitId};
use crate::roster::{classify, classify_roster, Assignment, Unit, UnitStatus};
use crate::store::{BattleNotifier, BattleReport, CommitBatch, SiegeStore, TracingNotifier};
use crate::territory::{apply_outcome, settle_attackers, settle_defenders, Territory};

/// Reply to a successful initiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleStart {
    pub battle_id: BattleId,
    pub max_rounds: u32,
    pub attackers: Vec<UnitSnapshot>,
    pub defenders: Vec<UnitSnapshot>,
}

/// Reply to a round execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: RoundResult,
    pub battle_complete: bool,
    /// Set once the battle is complete
    pub victory: Option<bool>,
}

#[derive(Default)]
struct Registry {
    sessions: AHashMap<BattleId, Arc<Mutex<BattleSession>>>,
    open_by_territory: AHashMap<TerritoryId, BattleId>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct SiegeCoordinator {
    config: SiegeConfig,
    store: Arc<dyn SiegeStore>,
    notifier: Arc<dyn BattleNotifier>,
    clock: Arc<dyn Clock>,
    draws: Mutex<Box<dyn DrawSource>>,
    registry: Mutex<Registry>,
}

impl SiegeCoordinator {
    pub fn new(config: SiegeConfig, store: Arc<dyn SiegeStore>) -> Self {
        Self {
            config,
            store,
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(SystemClock),
            draws: Mutex::new(Box::new(SeededDraws::from_entropy())),
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn BattleNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_draws(mut self, draws: impl DrawSource + 'static) -> Self {
        self.draws = Mutex::new(Box::new(draws));
        self
    }

    /// Sessions held in memory, which is every battle not yet finished
    pub fn open_battle_count(&self) -> usize {
        lock(&self.registry).sessions.len()
    }

    /// Reload non-terminal sessions after a restart
    pub fn resume_open_sessions(&self) -> Result<usize> {
        let sessions = self.store.open_sessions()?;
        let mut registry = lock(&self.registry);
        let mut resumed = 0;

        for session in sessions {
            if registry.sessions.contains_key(&session.id) {
                continue;
            }
            registry.open_by_territory.insert(session.territory, session.id);
            registry
                .sessions
                .insert(session.id, Arc::new(Mutex::new(session)));
            resumed += 1;
        }

        if resumed > 0 {
            tracing::info!(resumed, "Resumed open battles from storage");
        }
        Ok(resumed)
    }

    /// Read-only copy of a session
    pub fn session(&self, battle_id: BattleId) -> Result<BattleSession> {
        let handle = self.handle(battle_id)?;
        let session = lock(&handle).clone();
        Ok(session)
    }

    /// Deployment status of every unit a player owns
    pub fn roster_status(&self, player: PlayerId) -> Result<Vec<(UnitId, UnitStatus)>> {
        let roster = self.store.roster(player)?;
        let territories = self.store.territories()?;
        Ok(classify_roster(&roster, &territories, self.clock.now(), &self.config))
    }

    /// Start a siege against a territory with the given squad
    pub fn init_battle(
        &self,
        attacker: PlayerId,
        territory_id: TerritoryId,
        unit_ids: &[UnitId],
    ) -> Result<BattleStart> {
        if unit_ids.is_empty() {
            return Err(SiegeError::InvalidSquad("deploy at least one unit".into()));
        }

        let now = self.clock.now();
        let mut registry = lock(&self.registry);

        let territory = self
            .store
            .territory(territory_id)?
            .ok_or(SiegeError::UnknownTerritory(territory_id))?;
        BattleSession::check_target(attacker, &territory, now)?;

        if let Some(battle) = registry.open_by_territory.get(&territory_id) {
            return Err(SiegeError::SessionConflict {
                territory: territory_id,
                battle: *battle,
            });
        }

        let territories = self.store.territories()?;
        let mut squad = Vec::with_capacity(unit_ids.len());
        for id in unit_ids {
            let unit = self
                .store
                .unit(*id)?
                .filter(|u| u.owner == attacker)
                .ok_or(SiegeError::UnknownUnit(*id))?;

            let status = classify(&unit, &territories, now, &self.config);
            if status != UnitStatus::Available {
                return Err(SiegeError::UnitUnavailable { unit: unit.id, status });
            }
            squad.push(unit);
        }

        let defenders = self.garrison_of(&territory)?;
        let session = BattleSession::open(attacker, &territory, &squad, defenders, now, &self.config)?;

        for unit in &mut squad {
            unit.assignment = Assignment::Deployed(session.id);
        }
        settle_attackers(&mut squad, &session);

        self.store.commit(CommitBatch {
            units: squad,
            session: Some(session.clone()),
            ..CommitBatch::default()
        })?;

        tracing::info!(
            battle = %session.id,
            territory = %territory.name,
            squad = session.attackers.len(),
            attack_power = session.attacker_power(),
            defense_power = session.defender_power(),
            "Battle initiated"
        );

        let start = BattleStart {
            battle_id: session.id,
            max_rounds: session.max_rounds,
            attackers: session.attackers.clone(),
            defenders: session.defenders.clone(),
        };
        registry.open_by_territory.insert(territory_id, session.id);
        registry
            .sessions
            .insert(session.id, Arc::new(Mutex::new(session)));

        Ok(start)
    }

    pub fn scout(&self, battle_id: BattleId, scout_unit: UnitId) -> Result<ScoutIntel> {
        self.advance(battle_id, |session| {
            let mut draws = lock(&self.draws);
            session.scout(scout_unit, &self.config, &mut **draws)
        })
    }

    pub fn skip_scouting(&self, battle_id: BattleId) -> Result<()> {
        self.advance(battle_id, |session| session.skip_scouting())
    }

    /// Fight the current round. `scout_bonus_pct` is the client's copy of the
    /// bonus; the session never applies more than it granted.
    pub fn execute_round(
        &self,
        battle_id: BattleId,
        strategy: Option<Strategy>,
        scout_bonus_pct: u8,
    ) -> Result<RoundReport> {
        self.advance(battle_id, |session| {
            let mut draws = lock(&self.draws);
            let round = session.execute_round(strategy, scout_bonus_pct, &self.config, &mut **draws)?;
            Ok(RoundReport {
                round,
                battle_complete: session.is_terminal(),
                victory: session.victory(),
            })
        })
    }

    pub fn continue_battle(&self, battle_id: BattleId) -> Result<()> {
        self.advance(battle_id, |session| session.continue_battle())
    }

    pub fn retreat(&self, battle_id: BattleId) -> Result<()> {
        self.advance(battle_id, |session| session.retreat())
    }

    /// Pay to refill a unit's energy
    pub fn restore_energy(&self, player: PlayerId, unit_id: UnitId) -> Result<RestoreReceipt> {
        // Serialized with initiation so a unit is never restored while being deployed
        let _registry = lock(&self.registry);

        let mut unit = self
            .store
            .unit(unit_id)?
            .filter(|u| u.owner == player)
            .ok_or(SiegeError::UnknownUnit(unit_id))?;

        let territories = self.store.territories()?;
        let status = classify(&unit, &territories, self.clock.now(), &self.config);
        if matches!(status, UnitStatus::Deployed | UnitStatus::Defending) {
            return Err(SiegeError::UnitUnavailable { unit: unit_id, status });
        }

        let balance = self.store.balance(player)?;
        let receipt = energy::restore(&mut unit, balance, &self.config)?;
        if receipt.cost == 0 {
            return Ok(receipt);
        }

        self.store.commit(CommitBatch {
            units: vec![unit],
            balance: Some((player, balance - receipt.cost)),
            ..CommitBatch::default()
        })?;

        tracing::info!(unit = %unit_id, cost = receipt.cost, "Energy restored");
        Ok(receipt)
    }

    /// Live session from the registry, or the archived record of a
    /// finished one. Open sessions missing from the registry must be
    /// resumed first.
    fn handle(&self, battle_id: BattleId) -> Result<Arc<Mutex<BattleSession>>> {
        if let Some(handle) = lock(&self.registry).sessions.get(&battle_id) {
            return Ok(handle.clone());
        }

        match self.store.session(battle_id)? {
            Some(session) if session.is_terminal() => Ok(Arc::new(Mutex::new(session))),
            _ => Err(SiegeError::UnknownBattle(battle_id)),
        }
    }

    fn garrison_of(&self, territory: &Territory) -> Result<Vec<UnitSnapshot>> {
        if territory.is_ai_held() {
            return Ok(Vec::new());
        }

        let mut defenders = Vec::with_capacity(territory.defending_squad.len());
        for id in &territory.defending_squad {
            match self.store.unit(*id)? {
                Some(unit) => defenders.push(UnitSnapshot::from(&unit)),
                None => tracing::warn!(unit = %id, territory = %territory.name, "Garrison unit missing"),
            }
        }
        Ok(defenders)
    }

    /// Run one transition on a working copy, persist it, then publish it
    fn advance<T>(
        &self,
        battle_id: BattleId,
        op: impl FnOnce(&mut BattleSession) -> Result<T>,
    ) -> Result<T> {
        let handle = self.handle(battle_id)?;
        let mut guard = lock(&handle);

        let mut working = guard.clone();
        let reply = op(&mut working)?;

        let finished = working.is_terminal();
        let (batch, report) = self.commit_batch(&working)?;
        self.store.commit(batch)?;
        *guard = working;

        if finished {
            // The store holds the archived record from here on
            let mut registry = lock(&self.registry);
            registry.open_by_territory.remove(&guard.territory);
            registry.sessions.remove(&battle_id);
            drop(registry);

            if let Some(report) = report {
                if let Err(e) = self.notifier.battle_concluded(&report) {
                    tracing::warn!(battle = %battle_id, error = %e, "Battle notification failed");
                }
            }
        }

        Ok(reply)
    }

    /// Units, territory and session records to write for the current state
    fn commit_batch(&self, session: &BattleSession) -> Result<(CommitBatch, Option<BattleReport>)> {
        let mut attackers = self.load_units(session.attackers.iter().map(|u| u.id))?;
        settle_attackers(&mut attackers, session);

        let mut defenders = if session.ai_defended {
            Vec::new()
        } else {
            self.load_units(session.defenders.iter().map(|u| u.id))?
        };

        let mut territory_update = None;
        let mut report = None;
        let mut change = None;

        if session.is_terminal() {
            let mut territory = self
                .store
                .territory(session.territory)?
                .ok_or(SiegeError::UnknownTerritory(session.territory))?;
            report = BattleReport::new(session, &territory);
            change = apply_outcome(&mut territory, session, self.clock.now(), &self.config);
            territory_update = Some(territory);
        }
        settle_defenders(&mut defenders, session, change.as_ref());

        attackers.extend(defenders);
        Ok((
            CommitBatch {
                units: attackers,
                territory: territory_update,
                session: Some(session.clone()),
                balance: None,
            },
            report,
        ))
    }

    fn load_units(&self, ids: impl Iterator<Item = UnitId>) -> Result<Vec<Unit>> {
        let mut units = Vec::new();
        for id in ids {
            match self.store.unit(id)? {
                Some(unit) => units.push(unit),
                None => tracing::warn!(unit = %id, "Unit vanished during battle"),
            }
        }
        Ok(units)
    }
}
