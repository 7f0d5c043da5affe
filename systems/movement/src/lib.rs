#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure projectile movement and hit-detection strategies.
//!
//! Every projectile type shares the same two small algorithms: a movement
//! strategy that advances its position once per tick, and a hit strategy that
//! decides which monster, if any, it struck afterwards.

use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{HitStrategy, MonsterId, MovementStrategy};

/// Position and heading of a projectile after one movement step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// New position in world space.
    pub position: Vec2,
    /// New heading in radians.
    pub angle: f32,
    /// Distance covered during the step.
    pub travelled: f32,
}

/// Advances a projectile by one tick.
///
/// Tracking projectiles head for `target` and never overshoot it; when they
/// already sit on the target, or have no target, they stay put. Constant-angle
/// projectiles ignore the target and keep flying along `angle`.
#[must_use]
pub fn advance(
    movement: MovementStrategy,
    position: Vec2,
    angle: f32,
    speed: f32,
    target: Option<Vec2>,
    dt: Duration,
) -> Motion {
    let budget = speed * dt.as_secs_f32();
    match movement {
        MovementStrategy::Tracking => {
            let Some(target) = target else {
                return stationary(position, angle);
            };
            let offset = target - position;
            let distance = offset.length();
            if distance <= 0.0 {
                return stationary(position, angle);
            }
            let step = budget.min(distance);
            Motion {
                position: position + offset / distance * step,
                angle: offset.y.atan2(offset.x),
                travelled: step,
            }
        }
        MovementStrategy::ConstantAngle => Motion {
            position: position + Vec2::from_angle(angle) * budget,
            angle,
            travelled: budget,
        },
    }
}

fn stationary(position: Vec2, angle: f32) -> Motion {
    Motion {
        position,
        angle,
        travelled: 0.0,
    }
}

/// Decides which monster a projectile struck after moving.
///
/// `candidates` lists every live monster with its position. Tracking hits only
/// consider the locked `target`; proximity hits pick the nearest candidate
/// inside the hitbox, breaking ties by handle order.
pub fn detect_hit<I>(
    hit: HitStrategy,
    position: Vec2,
    hitbox: f32,
    target: Option<MonsterId>,
    candidates: I,
) -> Option<MonsterId>
where
    I: IntoIterator<Item = (MonsterId, Vec2)>,
{
    let radius_sq = hitbox * hitbox;
    match hit {
        HitStrategy::Tracking => {
            let target = target?;
            candidates
                .into_iter()
                .find(|(id, _)| *id == target)
                .filter(|(_, monster)| position.distance_squared(*monster) <= radius_sq)
                .map(|(id, _)| id)
        }
        HitStrategy::Proximity => candidates
            .into_iter()
            .map(|(id, monster)| (id, position.distance_squared(monster)))
            .filter(|(_, distance_sq)| *distance_sq <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
            .map(|(id, _)| id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::f32::consts::FRAC_PI_2;

    const HALF_SECOND: Duration = Duration::from_millis(500);

    #[test]
    fn tracking_moves_toward_target_at_speed() {
        let motion = advance(
            MovementStrategy::Tracking,
            Vec2::ZERO,
            0.0,
            4.0,
            Some(Vec2::new(0.0, 10.0)),
            HALF_SECOND,
        );
        assert_eq!(motion.position, Vec2::new(0.0, 2.0));
        assert!((motion.angle - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(motion.travelled, 2.0);
    }

    #[test]
    fn tracking_does_not_overshoot() {
        let target = Vec2::new(1.0, 0.0);
        let motion = advance(
            MovementStrategy::Tracking,
            Vec2::ZERO,
            0.0,
            100.0,
            Some(target),
            HALF_SECOND,
        );
        assert_eq!(motion.position, target);
        assert_eq!(motion.travelled, 1.0);
    }

    #[test]
    fn tracking_on_top_of_target_stays_put() {
        let position = Vec2::new(3.0, 3.0);
        let motion = advance(
            MovementStrategy::Tracking,
            position,
            1.0,
            5.0,
            Some(position),
            HALF_SECOND,
        );
        assert_eq!(motion.position, position);
        assert_eq!(motion.angle, 1.0);
        assert_eq!(motion.travelled, 0.0);
    }

    #[test]
    fn constant_angle_ignores_target() {
        let motion = advance(
            MovementStrategy::ConstantAngle,
            Vec2::ZERO,
            0.0,
            6.0,
            Some(Vec2::new(0.0, -50.0)),
            HALF_SECOND,
        );
        assert!((motion.position - Vec2::new(3.0, 0.0)).length() < 1e-6);
        assert_eq!(motion.angle, 0.0);
        assert_eq!(motion.travelled, 3.0);
    }

    #[test]
    fn tracking_hit_only_counts_the_locked_target() {
        let mut ids = SlotMap::<MonsterId, ()>::with_key();
        let bystander = ids.insert(());
        let locked = ids.insert(());
        let candidates = [
            (bystander, Vec2::new(0.1, 0.0)),
            (locked, Vec2::new(2.0, 0.0)),
        ];

        assert_eq!(
            detect_hit(
                HitStrategy::Tracking,
                Vec2::ZERO,
                0.5,
                Some(locked),
                candidates
            ),
            None
        );
        assert_eq!(
            detect_hit(
                HitStrategy::Tracking,
                Vec2::new(1.75, 0.0),
                0.5,
                Some(locked),
                candidates
            ),
            Some(locked)
        );
        assert_eq!(
            detect_hit(HitStrategy::Tracking, Vec2::ZERO, 0.5, None, candidates),
            None
        );
    }

    #[test]
    fn proximity_hit_prefers_the_nearest_monster() {
        let mut ids = SlotMap::<MonsterId, ()>::with_key();
        let outer = ids.insert(());
        let inner = ids.insert(());
        let candidates = [
            (outer, Vec2::new(0.4, 0.0)),
            (inner, Vec2::new(0.0, 0.2)),
        ];

        assert_eq!(
            detect_hit(HitStrategy::Proximity, Vec2::ZERO, 0.5, None, candidates),
            Some(inner)
        );
        assert_eq!(
            detect_hit(HitStrategy::Proximity, Vec2::ZERO, 0.1, None, candidates),
            None
        );
    }

    #[test]
    fn proximity_ties_break_by_handle_order() {
        let mut ids = SlotMap::<MonsterId, ()>::with_key();
        let first = ids.insert(());
        let second = ids.insert(());
        let candidates = [
            (second, Vec2::new(0.0, 0.3)),
            (first, Vec2::new(0.3, 0.0)),
        ];
        assert_eq!(
            detect_hit(HitStrategy::Proximity, Vec2::ZERO, 0.5, None, candidates),
            Some(first)
        );
    }
}
