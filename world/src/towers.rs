//! Authoritative tower state management utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use tower_defence_core::{
    CellCoord, Countdown, MonsterId, OrientationRule, ProjectileTemplate, TargetingStrategy,
    TowerId, TowerKindId, TowerSnapshot, TowerStats, TowerType, Upgrade,
};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Catalog type the tower was built from.
    pub(crate) kind: TowerKindId,
    /// Number of upgrades applied, starting at one.
    pub(crate) level: u32,
    pub(crate) targeting: TargetingStrategy,
    pub(crate) sticky: bool,
    pub(crate) orientation: OrientationRule,
    /// Monster selected during the last tower phase.
    pub(crate) target: Option<MonsterId>,
    /// Heading toward the last target, in radians.
    pub(crate) angle: f32,
    pub(crate) cooldown: Countdown,
    /// Private copy of the type's stats; upgrades never leak into the catalog.
    pub(crate) stats: TowerStats,
    pub(crate) projectile: ProjectileTemplate,
}

impl TowerState {
    /// Instantiates a level one tower from its catalog entry.
    pub(crate) fn from_type(id: TowerId, kind: TowerKindId, tower_type: &TowerType) -> Self {
        Self {
            id,
            kind,
            level: 1,
            targeting: tower_type.targeting,
            sticky: false,
            orientation: tower_type.orientation,
            target: None,
            angle: 0.0,
            cooldown: Countdown::new(),
            stats: tower_type.stats.clone(),
            projectile: tower_type.projectile.clone(),
        }
    }

    /// Targeting range at the current level.
    pub(crate) fn range(&self) -> f32 {
        self.projectile.range.value()
    }

    /// Price of the next upgrade, or `None` once both queues are drained.
    pub(crate) fn upgrade_cost(&self) -> Option<u32> {
        (self.stats.is_upgradable() || self.projectile.is_upgradable())
            .then(|| self.stats.upgrade_cost.value())
    }

    /// Advances the stat bundle and the projectile template by one step each.
    pub(crate) fn upgrade(&mut self) {
        self.stats.upgrade();
        self.projectile.upgrade();
        self.level += 1;
    }

    /// Delay between two shots at the current fire rate.
    pub(crate) fn shot_period(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.stats.shots_per_second.value())
            .unwrap_or(Duration::MAX)
    }

    pub(crate) fn snapshot(&self, cell: CellCoord) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell,
            level: self.level,
            range: self.range(),
            upgrade_cost: self.upgrade_cost(),
            targeting: self.targeting,
            sticky: self.sticky,
            angle: self.angle,
            target: self.target,
        }
    }
}

/// Registry that stores towers by cell and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<CellCoord, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.entries.contains_key(&cell)
    }

    /// Builds a tower on a free cell and returns the identifier it received.
    pub(crate) fn insert(
        &mut self,
        cell: CellCoord,
        kind: TowerKindId,
        tower_type: &TowerType,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self
            .entries
            .insert(cell, TowerState::from_type(id, kind, tower_type));
        id
    }

    pub(crate) fn remove(&mut self, cell: CellCoord) -> Option<TowerState> {
        self.entries.remove(&cell)
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&TowerState> {
        self.entries.get(&cell)
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Option<&mut TowerState> {
        self.entries.get_mut(&cell)
    }

    /// Towers in ascending cell order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellCoord, &TowerState)> {
        self.entries.iter().map(|(cell, tower)| (*cell, tower))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (CellCoord, &mut TowerState)> {
        self.entries.iter_mut().map(|(cell, tower)| (*cell, tower))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
