#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system placing child monsters around a dead parent.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_defence_core::{ChildSpawn, MonsterKindId};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Child monster the world should insert along the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildPlacement {
    /// Catalog type of the child.
    pub kind: MonsterKindId,
    /// Distance along the path where the child appears.
    pub distance: f32,
}

/// Pure system that resolves death spawns using a seeded random source.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits every child declared by `rules` for a parent that died at `parent_distance`.
    ///
    /// Each child lands at `parent_distance + spread * (1 - 2r)` for a fresh
    /// draw `r` in `[0, 1)`, clamped so it never sits before the spawn.
    pub fn handle(
        &mut self,
        parent_distance: f32,
        rules: &[ChildSpawn],
        out: &mut Vec<ChildPlacement>,
    ) {
        for rule in rules {
            for _ in 0..rule.count {
                let offset = rule.spread * (1.0 - 2.0 * self.rng.gen::<f32>());
                out.push(ChildPlacement {
                    kind: rule.kind,
                    distance: (parent_distance + offset).max(0.0),
                });
            }
        }
    }
}
