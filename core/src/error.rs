//! Error and rejection types shared across the engine.

use serde::{Deserialize, Serialize};

use crate::catalog::{MonsterKindId, TowerKindId};

/// Fatal configuration problems detected before the simulation starts.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Neither the first row nor the first column holds a walkable cell.
    #[error("no walkable spawn cell in the first row or first column")]
    SpawnNotFound,

    /// The grid contains no cells.
    #[error("grid has no cells")]
    EmptyGrid,

    /// A grid row differs in length from the first row.
    #[error("grid row {row} has {found} cells, expected {expected}")]
    NonRectangularGrid {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// A monster type identifier does not resolve in the monster catalog.
    #[error("unknown monster kind {kind:?} referenced by {context}")]
    UnknownMonsterKind {
        /// Identifier that failed to resolve.
        kind: MonsterKindId,
        /// Where the identifier was referenced.
        context: String,
    },

    /// A wave declares no monsters.
    #[error("wave {wave} contains no monsters")]
    EmptyWave {
        /// Index of the empty wave.
        wave: usize,
    },

    /// A projectile template pairs a movement strategy with a hit strategy it cannot serve.
    #[error("tower type {tower:?} pairs incompatible projectile movement and hit strategies")]
    IncompatibleStrategies {
        /// Tower type owning the projectile template.
        tower: TowerKindId,
    },

    /// A numeric stat is outside its permitted domain.
    #[error("{owner}: stat `{stat}` must be {requirement}")]
    InvalidStat {
        /// Name of the catalog entry declaring the stat.
        owner: String,
        /// Name of the stat.
        stat: &'static str,
        /// Human readable constraint that was violated.
        requirement: &'static str,
    },
}

/// Reasons a tower build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// The requested tower type does not exist in the catalog.
    UnknownKind,
    /// The cell lies outside the grid.
    OutOfBounds,
    /// The cell does not permit construction.
    NotConstructible,
    /// Another tower already occupies the cell.
    Occupied,
    /// The player cannot afford the tower.
    InsufficientFunds,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower occupies the cell.
    MissingTower,
    /// The tower has no pending upgrade.
    FullyUpgraded,
    /// The player cannot afford the next upgrade.
    InsufficientFunds,
}

/// Reasons a sell, targeting or sticky request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerActionError {
    /// No tower occupies the cell.
    MissingTower,
}
