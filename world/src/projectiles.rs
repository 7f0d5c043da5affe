//! Projectiles in flight.

use glam::Vec2;
use tower_defence_core::{
    MonsterId, ProjectileId, ProjectileSnapshot, ProjectileStats, TowerKindId,
};

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    /// Tower type whose template produced the projectile.
    pub(crate) source: TowerKindId,
    pub(crate) position: Vec2,
    pub(crate) angle: f32,
    pub(crate) travelled: f32,
    /// Stats frozen at the moment of firing.
    pub(crate) stats: ProjectileStats,
    /// Locked target; only tracking projectiles carry one.
    pub(crate) target: Option<MonsterId>,
}

impl Projectile {
    pub(crate) fn exceeded_range(&self) -> bool {
        self.stats.range_sensitive && self.travelled > self.stats.range
    }

    pub(crate) fn snapshot(&self, id: ProjectileId) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id,
            source: self.source,
            position: self.position,
            angle: self.angle,
            travelled: self.travelled,
        }
    }
}
