#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scenario loading that prepares a world and its wave generator.
//!
//! A scenario is a TOML document holding the grid, the player's starting
//! resources, the monster and tower catalogs and the wave list. Every cross
//! reference is checked once, while loading, so a scenario that parses also
//! boots.

use std::time::Duration;

use serde::Deserialize;
use tower_defence_core::{Catalog, ConfigError, Grid, MonsterKindId, MonsterType, TowerType};
use tower_defence_system_wave_generation::{Wave, WaveGenerator};
use tower_defence_world::{Player, World};
use tracing::info;

/// Errors raised while loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The document is not valid scenario TOML.
    #[error("failed to parse scenario")]
    Parse(#[from] toml::de::Error),
    /// The document parsed but describes an unusable scenario.
    #[error("invalid scenario")]
    Config(#[from] ConfigError),
}

/// Player resources at the start of the scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    /// Starting currency.
    pub money: u32,
    /// Starting health.
    pub health: u32,
}

/// One wave of monsters.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveConfig {
    /// Delay between two releases, in milliseconds.
    pub interval_ms: u64,
    /// Monster types in release order.
    pub monsters: Vec<MonsterKindId>,
}

/// Complete scenario description.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Seed for every random draw of the simulation.
    #[serde(default)]
    pub seed: u64,
    /// Starting player resources.
    pub player: PlayerConfig,
    /// Grid rows: `.` constructible, `#` walkable, anything else blocked.
    pub grid: Vec<String>,
    /// Waves in play order.
    #[serde(default)]
    pub waves: Vec<WaveConfig>,
    /// Monster catalog, indexed by position.
    #[serde(default)]
    pub monsters: Vec<MonsterType>,
    /// Tower catalog, indexed by position.
    #[serde(default)]
    pub towers: Vec<TowerType>,
}

/// World and wave generator booted from a scenario.
#[derive(Debug)]
pub struct Session {
    /// Authoritative simulation state.
    pub world: World,
    /// Wave state machine feeding the world.
    pub waves: WaveGenerator,
}

impl Scenario {
    /// Parses and validates a scenario document.
    pub fn from_toml_str(contents: &str) -> Result<Self, BootstrapError> {
        let scenario: Self = toml::from_str(contents)?;
        scenario.validate()?;
        info!(
            seed = scenario.seed,
            waves = scenario.waves.len(),
            monster_types = scenario.monsters.len(),
            tower_types = scenario.towers.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    /// Checks the grid, the catalogs and every wave reference.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.grid()?;
        let _ = tower_defence_core::extract_path(&grid)?;

        let catalog = self.catalog();
        catalog.validate()?;

        for (index, wave) in self.waves.iter().enumerate() {
            if wave.monsters.is_empty() {
                return Err(ConfigError::EmptyWave { wave: index });
            }
            for kind in &wave.monsters {
                let _ = catalog.require_monster(*kind, || format!("wave {index}"))?;
            }
        }
        Ok(())
    }

    /// Parses the grid rows.
    pub fn grid(&self) -> Result<Grid, ConfigError> {
        Grid::parse(self.grid.as_slice())
    }

    /// Assembles the type catalog.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        Catalog {
            monsters: self.monsters.clone(),
            towers: self.towers.clone(),
        }
    }

    /// Converts the wave list into generator waves.
    #[must_use]
    pub fn waves(&self) -> Vec<Wave> {
        self.waves
            .iter()
            .map(|wave| {
                Wave::new(
                    Duration::from_millis(wave.interval_ms),
                    wave.monsters.clone(),
                )
            })
            .collect()
    }

    /// Boots the world and the wave generator.
    pub fn into_session(self) -> Result<Session, ConfigError> {
        let player = Player {
            money: self.player.money,
            health: self.player.health,
        };
        let world = World::new(self.grid()?, self.catalog(), player, self.seed)?;
        let waves = WaveGenerator::new(self.waves())?;
        Ok(Session { world, waves })
    }
}
