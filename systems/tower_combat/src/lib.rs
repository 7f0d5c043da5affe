#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns ready, targeting towers into projectile volleys.

use std::f32::consts::TAU;

use glam::Vec2;
use tower_defence_core::{CellCoord, MonsterId, MonsterView, OrientationRule};

/// Per-tick firing state of one tower, as seen by the combat system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmedTower {
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Whether the shot cooldown has ended.
    pub ready: bool,
    /// Monster selected by targeting this tick.
    pub target: Option<MonsterId>,
    /// Heading rule for the volley.
    pub orientation: OrientationRule,
    /// Projectiles emitted per shot.
    pub projectile_count: u32,
}

/// A single projectile the world should create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Cell of the firing tower.
    pub tower: CellCoord,
    /// Monster the projectile is locked onto.
    pub target: MonsterId,
    /// Initial heading in radians.
    pub angle: f32,
}

/// Tower combat system that emits volleys for ready towers with a live target.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Shot>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one [`Shot`] per projectile of every tower able to fire.
    ///
    /// Towers that are cooling down, have no target, or target a monster
    /// missing from `monsters` stay silent.
    pub fn handle(&mut self, towers: &[ArmedTower], monsters: &MonsterView, out: &mut Vec<Shot>) {
        self.scratch.clear();

        for tower in towers {
            if !tower.ready {
                continue;
            }
            let Some(target) = tower.target else {
                continue;
            };
            let Some(snapshot) = monsters.get(target) else {
                continue;
            };

            let origin = tower.cell.to_point();
            for index in 0..tower.projectile_count {
                self.scratch.push(Shot {
                    tower: tower.cell,
                    target,
                    angle: volley_angle(
                        tower.orientation,
                        index,
                        tower.projectile_count,
                        origin,
                        snapshot.position,
                    ),
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

/// Heading of projectile `index` out of `count` in a volley.
#[must_use]
pub fn volley_angle(
    rule: OrientationRule,
    index: u32,
    count: u32,
    tower: Vec2,
    target: Vec2,
) -> f32 {
    match rule {
        OrientationRule::TargetFacing => {
            let offset = target - tower;
            offset.y.atan2(offset.x)
        }
        OrientationRule::Radial => {
            if count == 0 {
                0.0
            } else {
                index as f32 * TAU / count as f32
            }
        }
        OrientationRule::None => 0.0,
    }
}
