#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that orders live monsters and picks tower targets from them.

use std::cmp::Ordering;

use glam::Vec2;
use tower_defence_core::{MonsterId, MonsterSnapshot, MonsterView, TargetingStrategy, RANGE_PADDING};

/// Tower targeting system that reuses a scratch buffer to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    ordered: Vec<MonsterSnapshot>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the first monster, in `strategy` order, within reach of the tower.
    ///
    /// Reach is the tower's range plus [`RANGE_PADDING`].
    pub fn select(
        &mut self,
        strategy: TargetingStrategy,
        tower: Vec2,
        range: f32,
        monsters: &MonsterView,
    ) -> Option<MonsterId> {
        self.ordered.clear();
        self.ordered
            .extend(monsters.iter().filter(|monster| monster.health > 0.0).copied());
        self.ordered.sort_by(|a, b| compare(strategy, a, b));

        self.ordered
            .iter()
            .find(|monster| in_range(tower, range, monster.position))
            .map(|monster| monster.id)
    }

    /// Resolves the target a tower should hold this tick.
    ///
    /// A sticky tower keeps `current` while it is still live and within reach;
    /// every other case re-selects from scratch.
    pub fn retarget(
        &mut self,
        strategy: TargetingStrategy,
        sticky: bool,
        current: Option<MonsterId>,
        tower: Vec2,
        range: f32,
        monsters: &MonsterView,
    ) -> Option<MonsterId> {
        if sticky && current.is_some_and(|id| is_valid_target(id, tower, range, monsters)) {
            return current;
        }
        self.select(strategy, tower, range, monsters)
    }
}

/// Total order a strategy imposes on monsters; ties fall back to handle order.
#[must_use]
pub fn compare(strategy: TargetingStrategy, a: &MonsterSnapshot, b: &MonsterSnapshot) -> Ordering {
    let primary = match strategy {
        TargetingStrategy::HealthAscending => a.health.total_cmp(&b.health),
        TargetingStrategy::HealthDescending => b.health.total_cmp(&a.health),
        TargetingStrategy::DistanceAscending => a.distance.total_cmp(&b.distance),
        TargetingStrategy::DistanceDescending => b.distance.total_cmp(&a.distance),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Reports whether `position` lies within `range` plus [`RANGE_PADDING`] of `tower`.
#[must_use]
pub fn in_range(tower: Vec2, range: f32, position: Vec2) -> bool {
    let reach = range + RANGE_PADDING;
    tower.distance_squared(position) <= reach * reach
}

/// Reports whether `id` is live and within reach of the tower.
#[must_use]
pub fn is_valid_target(id: MonsterId, tower: Vec2, range: f32, monsters: &MonsterView) -> bool {
    monsters
        .get(id)
        .is_some_and(|monster| monster.health > 0.0 && in_range(tower, range, monster.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    struct Fixture {
        ids: SlotMap<MonsterId, ()>,
        snapshots: Vec<MonsterSnapshot>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ids: SlotMap::with_key(),
                snapshots: Vec::new(),
            }
        }

        fn monster(&mut self, position: (f32, f32), health: f32, distance: f32) -> MonsterId {
            let id = self.ids.insert(());
            self.snapshots.push(MonsterSnapshot {
                id,
                kind: tower_defence_core::MonsterKindId::new(0),
                position: Vec2::new(position.0, position.1),
                health,
                max_health: health.max(1.0),
                distance,
                speed: 1.0,
            });
            id
        }

        fn view(&self) -> MonsterView {
            MonsterView::from_snapshots(self.snapshots.clone())
        }
    }

    #[test]
    fn descending_distance_prefers_the_farthest_travelled() {
        let mut fixture = Fixture::new();
        let near = fixture.monster((3.0, 0.0), 5.0, 5.0);
        let far = fixture.monster((0.0, 8.0), 5.0, 20.0);
        let view = fixture.view();
        let mut targeting = TowerTargeting::new();

        let tower = Vec2::ZERO;
        assert_eq!(
            targeting.select(TargetingStrategy::DistanceDescending, tower, 10.0, &view),
            Some(far)
        );
        assert_eq!(
            targeting.select(TargetingStrategy::DistanceAscending, tower, 10.0, &view),
            Some(near)
        );
    }

    #[test]
    fn only_monster_in_range_wins_regardless_of_strategy() {
        let mut fixture = Fixture::new();
        let near = fixture.monster((3.0, 0.0), 5.0, 5.0);
        let _far = fixture.monster((30.0, 0.0), 9.0, 20.0);
        let view = fixture.view();
        let mut targeting = TowerTargeting::new();

        for strategy in TargetingStrategy::ALL {
            assert_eq!(
                targeting.select(strategy, Vec2::ZERO, 10.0, &view),
                Some(near),
                "{strategy:?} should fall back to the reachable monster"
            );
        }
    }

    #[test]
    fn health_strategies_order_by_remaining_health() {
        let mut fixture = Fixture::new();
        let weak = fixture.monster((1.0, 0.0), 1.0, 0.0);
        let strong = fixture.monster((0.0, 1.0), 9.0, 0.0);
        let view = fixture.view();
        let mut targeting = TowerTargeting::new();

        assert_eq!(
            targeting.select(TargetingStrategy::HealthAscending, Vec2::ZERO, 2.0, &view),
            Some(weak)
        );
        assert_eq!(
            targeting.select(TargetingStrategy::HealthDescending, Vec2::ZERO, 2.0, &view),
            Some(strong)
        );
    }

    #[test]
    fn padding_extends_reach_by_half_a_unit() {
        let tower = Vec2::ZERO;
        assert!(in_range(tower, 2.0, Vec2::new(2.5, 0.0)));
        assert!(!in_range(tower, 2.0, Vec2::new(2.51, 0.0)));
    }

    #[test]
    fn ties_break_by_handle_order() {
        let mut fixture = Fixture::new();
        let first = fixture.monster((1.0, 0.0), 4.0, 3.0);
        let _second = fixture.monster((0.0, 1.0), 4.0, 3.0);
        let view = fixture.view();

        let mut targeting = TowerTargeting::new();
        for strategy in TargetingStrategy::ALL {
            assert_eq!(targeting.select(strategy, Vec2::ZERO, 5.0, &view), Some(first));
        }
    }

    #[test]
    fn sticky_target_is_kept_while_valid() {
        let mut fixture = Fixture::new();
        let held = fixture.monster((1.0, 0.0), 4.0, 1.0);
        let leader = fixture.monster((0.0, 1.0), 4.0, 9.0);
        let view = fixture.view();
        let mut targeting = TowerTargeting::new();

        let strategy = TargetingStrategy::DistanceDescending;
        assert_eq!(
            targeting.retarget(strategy, true, Some(held), Vec2::ZERO, 3.0, &view),
            Some(held)
        );
        assert_eq!(
            targeting.retarget(strategy, false, Some(held), Vec2::ZERO, 3.0, &view),
            Some(leader)
        );
    }

    #[test]
    fn sticky_target_is_dropped_once_out_of_range_or_gone() {
        let mut fixture = Fixture::new();
        let wanderer = fixture.monster((9.0, 0.0), 4.0, 1.0);
        let nearby = fixture.monster((1.0, 0.0), 4.0, 0.5);
        let view = fixture.view();
        let mut targeting = TowerTargeting::new();

        let strategy = TargetingStrategy::DistanceDescending;
        assert_eq!(
            targeting.retarget(strategy, true, Some(wanderer), Vec2::ZERO, 3.0, &view),
            Some(nearby)
        );

        let stale = fixture.ids.insert(());
        let _ = fixture.ids.remove(stale);
        assert!(!is_valid_target(stale, Vec2::ZERO, 3.0, &view));
        assert_eq!(
            targeting.retarget(strategy, true, Some(stale), Vec2::ZERO, 3.0, &view),
            Some(nearby)
        );
    }

    #[test]
    fn empty_view_produces_no_target() {
        let mut targeting = TowerTargeting::new();
        let view = MonsterView::default();
        assert_eq!(
            targeting.select(TargetingStrategy::HealthAscending, Vec2::ZERO, 10.0, &view),
            None
        );
    }
}
