#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that drivers and
//! systems react to. Read-only snapshot views expose entity state between
//! ticks without granting mutable access.

mod catalog;
mod countdown;
mod effect;
mod error;
mod path;
mod upgrade;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use catalog::{
    Catalog, ChildSpawn, HitStrategy, MonsterKindId, MonsterType, MovementStrategy,
    OrientationRule, ProjectileStats, ProjectileTemplate, TargetingStrategy, TowerKindId,
    TowerStats, TowerType,
};
pub use countdown::Countdown;
pub use effect::{Effect, EffectSpec, EffectTarget};
pub use error::{BuildError, ConfigError, TowerActionError, UpgradeError};
pub use path::{extract_path, CellKind, Grid, Path};
pub use upgrade::{Upgradable, Upgrade};

/// Extra reach granted when testing whether a monster is within a tower's range.
///
/// Half a grid unit lets a monster count as in range as soon as its sprite,
/// not just its centre point, touches the range circle.
pub const RANGE_PADDING: f32 = 0.5;

slotmap::new_key_type! {
    /// Generation-checked handle of a live monster.
    pub struct MonsterId;

    /// Generation-checked handle of a live projectile.
    pub struct ProjectileId;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a monster of the given type enters at the path spawn.
    SpawnMonster {
        /// Catalog type of the monster.
        kind: MonsterKindId,
    },
    /// Requests construction of a tower on the provided cell.
    BuildTower {
        /// Catalog type of the tower.
        kind: TowerKindId,
        /// Cell the tower should occupy.
        cell: CellCoord,
    },
    /// Requests the next upgrade step of the tower on the cell.
    UpgradeTower {
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// Requests removal of the tower on the cell.
    SellTower {
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// Switches the targeting strategy of the tower on the cell.
    SetTargetingStrategy {
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Strategy to apply.
        strategy: TargetingStrategy,
    },
    /// Flips the sticky-target flag of the tower on the cell.
    ToggleSticky {
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a monster entered the world.
    MonsterSpawned {
        /// Handle assigned to the monster.
        monster: MonsterId,
        /// Catalog type of the monster.
        kind: MonsterKindId,
        /// Distance along the path where the monster appeared.
        distance: f32,
    },
    /// Reports a monster whose health ran out.
    MonsterKilled {
        /// Handle of the removed monster.
        monster: MonsterId,
        /// Currency credited to the player.
        reward: u32,
    },
    /// Reports a monster that reached the end of the path.
    MonsterArrived {
        /// Handle of the removed monster.
        monster: MonsterId,
        /// Player health removed.
        damage: u32,
    },
    /// Reports a tower shot.
    ProjectileFired {
        /// Cell of the firing tower.
        tower: CellCoord,
        /// Handle of the new projectile.
        projectile: ProjectileId,
    },
    /// Reports a projectile striking a monster.
    ProjectileHit {
        /// Handle of the consumed projectile.
        projectile: ProjectileId,
        /// Monster that received the projectile's effects.
        monster: MonsterId,
    },
    /// Reports a projectile removed without striking anything.
    ProjectileExpired {
        /// Handle of the removed projectile.
        projectile: ProjectileId,
    },
    /// Confirms that a tower was built.
    TowerBuilt {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Catalog type of the tower.
        kind: TowerKindId,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Currency paid.
        cost: u32,
    },
    /// Reports that a build request was rejected.
    TowerBuildRejected {
        /// Catalog type requested.
        kind: TowerKindId,
        /// Cell requested.
        cell: CellCoord,
        /// Specific reason the build failed.
        reason: BuildError,
    },
    /// Confirms that a tower advanced one level.
    TowerUpgraded {
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Level reached.
        level: u32,
        /// Currency paid.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Cell requested.
        cell: CellCoord,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was sold and removed.
    TowerSold {
        /// Identifier of the removed tower.
        tower: TowerId,
        /// Cell the tower occupied.
        cell: CellCoord,
    },
    /// Reports that a sell, targeting or sticky request was rejected.
    TowerActionRejected {
        /// Cell requested.
        cell: CellCoord,
        /// Specific reason the action failed.
        reason: TowerActionError,
    },
    /// Confirms a targeting strategy change.
    TargetingChanged {
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Strategy now active.
        strategy: TargetingStrategy,
    },
    /// Confirms a sticky-flag change.
    StickyToggled {
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Flag value now active.
        sticky: bool,
    },
    /// Announces that player health reached zero.
    PlayerDefeated,
}

/// Cardinal movement directions along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit vector of the direction in continuous world space.
    #[must_use]
    pub const fn unit(self) -> Vec2 {
        match self {
            Self::North => Vec2::new(0.0, -1.0),
            Self::East => Vec2::new(1.0, 0.0),
            Self::South => Vec2::new(0.0, 1.0),
            Self::West => Vec2::new(-1.0, 0.0),
        }
    }

    /// Adjacent cell in this direction, if it has non-negative coordinates.
    #[must_use]
    pub fn neighbor(self, cell: CellCoord) -> Option<CellCoord> {
        match self {
            Self::North => Some(CellCoord::new(cell.column(), cell.row().checked_sub(1)?)),
            Self::East => Some(CellCoord::new(cell.column().checked_add(1)?, cell.row())),
            Self::South => Some(CellCoord::new(cell.column(), cell.row().checked_add(1)?)),
            Self::West => Some(CellCoord::new(cell.column().checked_sub(1)?, cell.row())),
        }
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Continuous position of the cell; one grid unit maps to one distance unit.
    #[must_use]
    pub fn to_point(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }
}

/// Immutable representation of a single monster's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Handle of the monster.
    pub id: MonsterId,
    /// Catalog type, used to look up the display model.
    pub kind: MonsterKindId,
    /// Current position in world space.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Health the monster spawned with.
    pub max_health: f32,
    /// Distance travelled along the path.
    pub distance: f32,
    /// Current, possibly slowed, speed.
    pub speed: f32,
}

/// Read-only snapshot describing all live monsters.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured monster snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the provided monster, if it is live.
    #[must_use]
    pub fn get(&self, id: MonsterId) -> Option<&MonsterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured monsters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Catalog type, used to look up the display model.
    pub kind: TowerKindId,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Number of upgrades applied, starting at one.
    pub level: u32,
    /// Targeting range at the current level.
    pub range: f32,
    /// Price of the next upgrade, if any remains.
    pub upgrade_cost: Option<u32>,
    /// Active targeting strategy.
    pub targeting: TargetingStrategy,
    /// Whether the tower keeps its target while it stays valid.
    pub sticky: bool,
    /// Heading of the tower in radians.
    pub angle: f32,
    /// Monster currently targeted.
    pub target: Option<MonsterId>,
}

/// Read-only snapshot describing all towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Handle of the projectile.
    pub id: ProjectileId,
    /// Tower type whose template produced the projectile.
    pub source: TowerKindId,
    /// Current position in world space.
    pub position: Vec2,
    /// Heading in radians.
    pub angle: f32,
    /// Distance travelled since the projectile was fired.
    pub travelled: f32,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildError, CellCoord, Direction, TowerActionError, TowerId, UpgradeError};
    use glam::Vec2;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&BuildError::InsufficientFunds);
        assert_round_trip(&UpgradeError::FullyUpgraded);
        assert_round_trip(&TowerActionError::MissingTower);
    }

    #[test]
    fn neighbors_stop_at_the_grid_origin() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(Direction::North.neighbor(origin), None);
        assert_eq!(Direction::West.neighbor(origin), None);
        assert_eq!(
            Direction::East.neighbor(origin),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(
            Direction::South.neighbor(origin),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn units_point_along_grid_axes() {
        let cell = CellCoord::new(3, 3);
        for direction in [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ] {
            let neighbor = direction.neighbor(cell).expect("interior cell");
            assert_eq!(cell.to_point() + direction.unit(), neighbor.to_point());
        }
        assert_eq!(CellCoord::new(2, 5).to_point(), Vec2::new(2.0, 5.0));
    }
}
