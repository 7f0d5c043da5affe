//! Injected type catalogs describing every monster, tower and projectile kind.
//!
//! The engine embeds no concrete unit types. Adapters load catalogs from
//! configuration and hand them to the world, which instantiates entities from
//! the entries referenced by [`MonsterKindId`] and [`TowerKindId`].

use serde::{Deserialize, Serialize};

use crate::effect::{Effect, EffectSpec};
use crate::upgrade::{Upgradable, Upgrade};
use crate::ConfigError;

/// Index of a monster type inside the [`Catalog`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MonsterKindId(u32);

impl MonsterKindId {
    /// Creates a new monster kind identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a tower type inside the [`Catalog`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TowerKindId(u32);

impl TowerKindId {
    /// Creates a new tower kind identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Ordering a tower applies to live monsters before picking a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingStrategy {
    /// Weakest monster first.
    HealthAscending,
    /// Healthiest monster first.
    HealthDescending,
    /// Monster that travelled the least first.
    DistanceAscending,
    /// Monster closest to arrival first.
    #[default]
    DistanceDescending,
}

impl TargetingStrategy {
    /// Every strategy, in selector order.
    pub const ALL: [Self; 4] = [
        Self::HealthAscending,
        Self::HealthDescending,
        Self::DistanceAscending,
        Self::DistanceDescending,
    ];
}

/// How a projectile travels once fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStrategy {
    /// Homes in on the locked target every tick.
    Tracking,
    /// Flies along the heading it was fired with.
    ConstantAngle,
}

/// How a projectile decides it struck a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitStrategy {
    /// Hits the locked target once inside the hitbox radius.
    Tracking,
    /// Hits the nearest live monster inside the hitbox radius.
    Proximity,
}

/// Heading rule applied to the projectiles of a single volley.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationRule {
    /// Every projectile faces the target.
    #[default]
    TargetFacing,
    /// Projectiles are spread evenly around the full circle.
    Radial,
    /// Projectiles carry no heading.
    None,
}

/// Rule spawning child monsters when a monster dies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildSpawn {
    /// Type of the spawned children.
    pub kind: MonsterKindId,
    /// Number of children spawned.
    #[serde(default = "default_child_count")]
    pub count: u32,
    /// Maximum distance, along the path, between parent and child.
    #[serde(default)]
    pub spread: f32,
}

const fn default_child_count() -> u32 {
    1
}

/// Catalog entry describing one monster type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterType {
    /// Human readable name.
    pub name: String,
    /// Display model identifier handed to renderers.
    #[serde(default)]
    pub model: String,
    /// Starting and maximum health.
    pub health: f32,
    /// Base speed in grid units per second.
    pub speed: f32,
    /// Currency credited when the monster dies.
    #[serde(default)]
    pub reward: u32,
    /// Player health removed when the monster arrives.
    #[serde(default = "default_arrival_damage")]
    pub damage: u32,
    /// Monsters spawned when this one dies.
    #[serde(default)]
    pub children: Vec<ChildSpawn>,
}

const fn default_arrival_damage() -> u32 {
    1
}

/// Upgradable stats of a projectile type, owned by a tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTemplate {
    /// Display model identifier handed to renderers.
    #[serde(default)]
    pub model: String,
    /// Travel speed in grid units per second.
    pub speed: Upgradable<f32>,
    /// Targeting range of the tower and maximum travel of range-sensitive projectiles.
    pub range: Upgradable<f32>,
    /// Radius within which a projectile strikes a monster.
    pub hitbox: Upgradable<f32>,
    /// Whether the projectile expires once it travelled further than its range.
    #[serde(default)]
    pub range_sensitive: bool,
    /// Movement strategy selector.
    pub movement: MovementStrategy,
    /// Hit strategy selector.
    pub hit: HitStrategy,
    /// Effects applied to the struck monster.
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

impl ProjectileTemplate {
    /// Captures the stats active at the current level.
    #[must_use]
    pub fn snapshot(&self) -> ProjectileStats {
        ProjectileStats {
            speed: self.speed.value(),
            range: self.range.value(),
            hitbox: self.hitbox.value(),
            range_sensitive: self.range_sensitive,
            movement: self.movement,
            hit: self.hit,
            effects: self.effects.iter().map(EffectSpec::resolve).collect(),
        }
    }

    /// Reports whether the movement and hit strategies can work together.
    ///
    /// Only tracking movement keeps a locked target, so tracking hit detection
    /// requires it and proximity detection excludes it.
    #[must_use]
    pub const fn strategies_compatible(&self) -> bool {
        matches!(
            (self.movement, self.hit),
            (MovementStrategy::Tracking, HitStrategy::Tracking)
                | (MovementStrategy::ConstantAngle, HitStrategy::Proximity)
        )
    }
}

impl Upgrade for ProjectileTemplate {
    fn is_upgradable(&self) -> bool {
        self.speed.is_upgradable()
            || self.range.is_upgradable()
            || self.hitbox.is_upgradable()
            || self.effects.is_upgradable()
    }

    fn upgrade(&mut self) {
        self.speed.upgrade();
        self.range.upgrade();
        self.hitbox.upgrade();
        self.effects.upgrade();
    }
}

/// Fixed stats a projectile carries from the moment it is fired.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileStats {
    /// Travel speed in grid units per second.
    pub speed: f32,
    /// Maximum travel distance for range-sensitive projectiles.
    pub range: f32,
    /// Strike radius.
    pub hitbox: f32,
    /// Whether the projectile expires past its range.
    pub range_sensitive: bool,
    /// Movement strategy selector.
    pub movement: MovementStrategy,
    /// Hit strategy selector.
    pub hit: HitStrategy,
    /// Effects applied on impact.
    pub effects: Vec<Effect>,
}

/// Upgradable tower-level stat bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Shots per second; the cooldown after a shot is its reciprocal.
    pub shots_per_second: Upgradable<f32>,
    /// Projectiles emitted per shot.
    #[serde(default = "default_projectile_count")]
    pub projectile_count: Upgradable<u32>,
    /// Price of the next upgrade step.
    #[serde(default = "default_upgrade_cost")]
    pub upgrade_cost: Upgradable<u32>,
}

fn default_projectile_count() -> Upgradable<u32> {
    Upgradable::fixed(1)
}

fn default_upgrade_cost() -> Upgradable<u32> {
    Upgradable::fixed(0)
}

impl Upgrade for TowerStats {
    fn is_upgradable(&self) -> bool {
        self.shots_per_second.is_upgradable()
            || self.projectile_count.is_upgradable()
            || self.upgrade_cost.is_upgradable()
    }

    fn upgrade(&mut self) {
        self.shots_per_second.upgrade();
        self.projectile_count.upgrade();
        self.upgrade_cost.upgrade();
    }
}

/// Catalog entry describing one tower type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerType {
    /// Human readable name.
    pub name: String,
    /// Display model identifier handed to renderers.
    #[serde(default)]
    pub model: String,
    /// Build price.
    pub cost: u32,
    /// Targeting strategy a freshly built tower starts with.
    #[serde(default)]
    pub targeting: TargetingStrategy,
    /// Heading rule for emitted projectiles.
    #[serde(default)]
    pub orientation: OrientationRule,
    /// Tower-level stat bundle.
    pub stats: TowerStats,
    /// Projectile factory.
    pub projectile: ProjectileTemplate,
}

/// All monster and tower types known to a scenario.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Monster types indexed by [`MonsterKindId`].
    #[serde(default)]
    pub monsters: Vec<MonsterType>,
    /// Tower types indexed by [`TowerKindId`].
    #[serde(default)]
    pub towers: Vec<TowerType>,
}

impl Catalog {
    /// Looks up a monster type.
    #[must_use]
    pub fn monster(&self, kind: MonsterKindId) -> Option<&MonsterType> {
        usize::try_from(kind.get())
            .ok()
            .and_then(|index| self.monsters.get(index))
    }

    /// Looks up a tower type.
    #[must_use]
    pub fn tower(&self, kind: TowerKindId) -> Option<&TowerType> {
        usize::try_from(kind.get())
            .ok()
            .and_then(|index| self.towers.get(index))
    }

    /// Checks that every cross reference resolves and every stat is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for monster in &self.monsters {
            require(monster.health > 0.0, &monster.name, "health", "positive")?;
            require(monster.speed >= 0.0, &monster.name, "speed", "non-negative")?;
            for child in &monster.children {
                let _ =
                    self.require_monster(child.kind, || format!("children of `{}`", monster.name))?;
                require(child.spread >= 0.0, &monster.name, "spread", "non-negative")?;
            }
        }

        for (index, tower) in self.towers.iter().enumerate() {
            let projectile = &tower.projectile;
            if !projectile.strategies_compatible() {
                return Err(ConfigError::IncompatibleStrategies {
                    tower: TowerKindId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                });
            }
            require(
                all_levels(&tower.stats.shots_per_second, |value| value > 0.0),
                &tower.name,
                "shots_per_second",
                "positive at every level",
            )?;
            require(
                all_levels(&projectile.range, |value| value >= 0.0),
                &tower.name,
                "range",
                "non-negative at every level",
            )?;
            require(
                all_levels(&projectile.hitbox, |value| value >= 0.0),
                &tower.name,
                "hitbox",
                "non-negative at every level",
            )?;
            require(
                all_levels(&projectile.speed, |value| value >= 0.0),
                &tower.name,
                "speed",
                "non-negative at every level",
            )?;
            for effect in &projectile.effects {
                validate_effect(effect, &tower.name)?;
            }
        }

        Ok(())
    }

    /// Fails unless `kind` names a monster type.
    pub fn require_monster(
        &self,
        kind: MonsterKindId,
        context: impl FnOnce() -> String,
    ) -> Result<&MonsterType, ConfigError> {
        self.monster(kind)
            .ok_or_else(|| ConfigError::UnknownMonsterKind {
                kind,
                context: context(),
            })
    }
}

fn require(
    condition: bool,
    owner: &str,
    stat: &'static str,
    requirement: &'static str,
) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::InvalidStat {
            owner: owner.to_owned(),
            stat,
            requirement,
        })
    }
}

fn validate_effect(effect: &EffectSpec, owner: &str) -> Result<(), ConfigError> {
    match effect {
        EffectSpec::Damage { amount } => require(
            all_levels(amount, |value| value >= 0.0),
            owner,
            "amount",
            "non-negative at every level",
        ),
        EffectSpec::Slow { factor, .. } => require(
            all_levels(factor, |value| value > 0.0),
            owner,
            "factor",
            "positive at every level",
        ),
        EffectSpec::Stun { .. } => Ok(()),
    }
}

fn all_levels(value: &Upgradable<f32>, check: impl Fn(f32) -> bool) -> bool {
    let mut levels = value.clone();
    loop {
        if !check(levels.value()) {
            return false;
        }
        if !levels.is_upgradable() {
            return true;
        }
        levels.upgrade();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dart_tower() -> TowerType {
        TowerType {
            name: "dart".to_owned(),
            model: "dart".to_owned(),
            cost: 100,
            targeting: TargetingStrategy::DistanceDescending,
            orientation: OrientationRule::TargetFacing,
            stats: TowerStats {
                shots_per_second: Upgradable::with_upgrades(1.0, [2.0]),
                projectile_count: Upgradable::fixed(1),
                upgrade_cost: Upgradable::with_upgrades(50, [0]),
            },
            projectile: ProjectileTemplate {
                model: "dart".to_owned(),
                speed: Upgradable::fixed(8.0),
                range: Upgradable::fixed(3.0),
                hitbox: Upgradable::fixed(0.25),
                range_sensitive: false,
                movement: MovementStrategy::Tracking,
                hit: HitStrategy::Tracking,
                effects: vec![EffectSpec::Damage {
                    amount: Upgradable::fixed(1.0),
                }],
            },
        }
    }

    fn grunt(children: Vec<ChildSpawn>) -> MonsterType {
        MonsterType {
            name: "grunt".to_owned(),
            model: String::new(),
            health: 3.0,
            speed: 1.0,
            reward: 5,
            damage: 1,
            children,
        }
    }

    #[test]
    fn validate_accepts_consistent_catalog() {
        let catalog = Catalog {
            monsters: vec![grunt(vec![ChildSpawn {
                kind: MonsterKindId::new(0),
                count: 2,
                spread: 0.5,
            }])],
            towers: vec![dart_tower()],
        };
        assert_eq!(catalog.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_dangling_child_kind() {
        let catalog = Catalog {
            monsters: vec![grunt(vec![ChildSpawn {
                kind: MonsterKindId::new(4),
                count: 1,
                spread: 0.0,
            }])],
            towers: Vec::new(),
        };
        assert!(matches!(
            catalog.validate(),
            Err(ConfigError::UnknownMonsterKind { kind, .. }) if kind == MonsterKindId::new(4)
        ));
    }

    #[test]
    fn validate_rejects_tracking_hit_without_tracking_movement() {
        let mut tower = dart_tower();
        tower.projectile.movement = MovementStrategy::ConstantAngle;
        let catalog = Catalog {
            monsters: Vec::new(),
            towers: vec![tower],
        };
        assert_eq!(
            catalog.validate(),
            Err(ConfigError::IncompatibleStrategies {
                tower: TowerKindId::new(0),
            })
        );
    }

    #[test]
    fn validate_checks_every_fire_rate_level() {
        let mut tower = dart_tower();
        tower.stats.shots_per_second = Upgradable::with_upgrades(1.0, [0.0]);
        let catalog = Catalog {
            monsters: Vec::new(),
            towers: vec![tower],
        };
        assert!(matches!(
            catalog.validate(),
            Err(ConfigError::InvalidStat {
                stat: "shots_per_second",
                ..
            })
        ));
    }

    fn rejected_stat(tower: TowerType) -> Option<&'static str> {
        let catalog = Catalog {
            monsters: Vec::new(),
            towers: vec![tower],
        };
        match catalog.validate() {
            Err(ConfigError::InvalidStat { stat, .. }) => Some(stat),
            _ => None,
        }
    }

    #[test]
    fn validate_rejects_healing_damage_at_any_level() {
        let mut tower = dart_tower();
        tower.projectile.effects = vec![EffectSpec::Damage {
            amount: Upgradable::with_upgrades(1.0, [-3.0]),
        }];
        assert_eq!(rejected_stat(tower), Some("amount"));
    }

    #[test]
    fn validate_rejects_non_positive_slow_factor() {
        for factor in [0.0, -1.0, f32::NAN] {
            let mut tower = dart_tower();
            tower.projectile.effects = vec![EffectSpec::Slow {
                factor: Upgradable::fixed(factor),
                duration_ms: Upgradable::fixed(500),
            }];
            assert_eq!(rejected_stat(tower), Some("factor"), "factor {factor}");
        }
    }

    #[test]
    fn validate_rejects_negative_projectile_speed() {
        let mut tower = dart_tower();
        tower.projectile.speed = Upgradable::with_upgrades(8.0, [-1.0]);
        assert_eq!(rejected_stat(tower), Some("speed"));
    }

    #[test]
    fn validate_accepts_stuns_and_zero_damage() {
        let mut tower = dart_tower();
        tower.projectile.effects = vec![
            EffectSpec::Damage {
                amount: Upgradable::fixed(0.0),
            },
            EffectSpec::Stun {
                duration_ms: Upgradable::fixed(250),
            },
        ];
        assert_eq!(rejected_stat(tower), None);
    }

    #[test]
    fn template_upgrade_is_independent_of_tower_stats() {
        let mut tower = dart_tower();
        assert!(tower.stats.is_upgradable());
        assert!(!tower.projectile.is_upgradable());

        tower.projectile.upgrade();
        assert_eq!(tower.projectile.snapshot().speed, 8.0);
    }

    #[test]
    fn snapshot_resolves_current_effects() {
        let mut template = dart_tower().projectile;
        template.effects = vec![EffectSpec::Damage {
            amount: Upgradable::with_upgrades(1.0, [3.0]),
        }];
        template.upgrade();
        assert_eq!(
            template.snapshot().effects,
            vec![Effect::Damage { amount: 3.0 }]
        );
    }
}
