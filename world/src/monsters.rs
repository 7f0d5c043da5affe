//! Live monster state.

use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{
    Countdown, EffectTarget, MonsterId, MonsterKindId, MonsterSnapshot, MonsterType, Path,
};

#[derive(Clone, Debug)]
pub(crate) struct Monster {
    pub(crate) kind: MonsterKindId,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) base_speed: f32,
    /// Base speed divided by the active slow factor, if any.
    pub(crate) speed: f32,
    pub(crate) distance: f32,
    /// Cached `path.position_at(distance)`.
    pub(crate) position: Vec2,
    pub(crate) slow: Countdown,
    pub(crate) reward: u32,
    pub(crate) damage: u32,
}

impl Monster {
    pub(crate) fn spawn(
        kind: MonsterKindId,
        monster_type: &MonsterType,
        distance: f32,
        path: &Path,
    ) -> Self {
        let distance = distance.max(0.0);
        Self {
            kind,
            health: monster_type.health,
            max_health: monster_type.health,
            base_speed: monster_type.speed,
            speed: monster_type.speed,
            distance,
            position: path.position_at(distance),
            slow: Countdown::new(),
            reward: monster_type.reward,
            damage: monster_type.damage,
        }
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Moves along the path, then lets an active slow run down.
    pub(crate) fn advance(&mut self, dt: Duration, path: &Path) {
        self.distance += self.speed * dt.as_secs_f32();
        self.position = path.position_at(self.distance);

        if !self.slow.ended() {
            self.slow.update(dt);
            if self.slow.ended() {
                self.speed = self.base_speed;
            }
        }
    }

    pub(crate) fn snapshot(&self, id: MonsterId) -> MonsterSnapshot {
        MonsterSnapshot {
            id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            distance: self.distance,
            speed: self.speed,
        }
    }
}

impl EffectTarget for Monster {
    fn take_damage(&mut self, amount: f32) {
        self.health -= amount;
    }

    fn slow_down(&mut self, factor: f32, duration: Duration) {
        self.speed = self.base_speed / factor;
        self.slow.start(duration);
    }
}
