//! Unit availability for squad assembly
//!
//! Classification precedence: Deployed > Defending > Training > LowEnergy >
//! Available. Current assignment always wins over energy, so a deployed
//! unit with no energy left still reports `Deployed`.

use serde::{Deserialize, Serialize};

use super::unit::{Assignment, Unit};
use crate::core::config::SiegeConfig;
use crate::core::types::{Timestamp, UnitId};
use crate::territory::Territory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    Available,
    Deployed,
    Defending,
    Training,
    LowEnergy,
}

/// Classify one unit against the current territory garrisons
pub fn classify(
    unit: &Unit,
    territories: &[Territory],
    now: Timestamp,
    config: &SiegeConfig,
) -> UnitStatus {
    if unit.is_deployed() {
        return UnitStatus::Deployed;
    }

    let garrisoned = matches!(unit.assignment, Assignment::Defending(_))
        || territories.iter().any(|t| t.is_defended_by(unit.id));
    if garrisoned {
        return UnitStatus::Defending;
    }

    if unit.is_training_at(now) {
        return UnitStatus::Training;
    }

    if unit.energy < config.min_deploy_energy {
        return UnitStatus::LowEnergy;
    }

    UnitStatus::Available
}

pub fn is_eligible_for_deployment(
    unit: &Unit,
    territories: &[Territory],
    now: Timestamp,
    config: &SiegeConfig,
) -> bool {
    classify(unit, territories, now, config) == UnitStatus::Available
}

/// Classify a whole roster, keeping roster order
pub fn classify_roster(
    roster: &[Unit],
    territories: &[Territory],
    now: Timestamp,
    config: &SiegeConfig,
) -> Vec<(UnitId, UnitStatus)> {
    roster
        .iter()
        .map(|unit| (unit.id, classify(unit, territories, now, config)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BattleId, PlayerId, TerritoryId};
    use crate::territory::TerritoryTier;

    fn unit() -> Unit {
        Unit::new(PlayerId::new(), "Kestrel", 100)
    }

    #[test]
    fn test_fresh_unit_is_available() {
        let config = SiegeConfig::default();
        let u = unit();
        assert_eq!(classify(&u, &[], 0, &config), UnitStatus::Available);
        assert!(is_eligible_for_deployment(&u, &[], 0, &config));
    }

    #[test]
    fn test_deployed_beats_low_energy() {
        let config = SiegeConfig::default();
        let mut u = unit().with_energy(0);
        u.assignment = Assignment::Deployed(BattleId::new());

        assert_eq!(classify(&u, &[], 0, &config), UnitStatus::Deployed);
    }

    #[test]
    fn test_defending_detected_from_garrison_list() {
        let config = SiegeConfig::default();
        let u = unit();
        let mut territory = Territory::new("Hollowmere", TerritoryTier::Common);
        territory.defending_squad.push(u.id);

        assert_eq!(classify(&u, &[territory], 0, &config), UnitStatus::Defending);
    }

    #[test]
    fn test_defending_detected_from_assignment() {
        let config = SiegeConfig::default();
        let mut u = unit();
        u.assignment = Assignment::Defending(TerritoryId::new());

        assert_eq!(classify(&u, &[], 0, &config), UnitStatus::Defending);
    }

    #[test]
    fn test_training_beats_low_energy() {
        let config = SiegeConfig::default();
        let mut u = unit().with_energy(5);
        u.is_training = true;
        u.training_completes_at = Some(100);

        assert_eq!(classify(&u, &[], 50, &config), UnitStatus::Training);
        // Once training is done the energy problem shows through
        assert_eq!(classify(&u, &[], 150, &config), UnitStatus::LowEnergy);
    }

    #[test]
    fn test_energy_threshold_is_inclusive() {
        let config = SiegeConfig::default();
        assert_eq!(classify(&unit().with_energy(19), &[], 0, &config), UnitStatus::LowEnergy);
        assert_eq!(classify(&unit().with_energy(20), &[], 0, &config), UnitStatus::Available);
    }

    #[test]
    fn test_classify_roster_keeps_order() {
        let config = SiegeConfig::default();
        let roster = vec![unit(), unit().with_energy(3), unit()];
        let statuses = classify_roster(&roster, &[], 0, &config);

        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0].0, roster[0].id);
        assert_eq!(statuses[1].1, UnitStatus::LowEnergy);
        assert_eq!(statuses[2].1, UnitStatus::Available);
    }
}
