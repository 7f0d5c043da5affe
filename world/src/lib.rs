#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the tower defence simulation.
//!
//! The [`World`] owns every live monster, tower and projectile together with
//! the player's money and health. Drivers advance it with [`World::tick`] or by
//! submitting [`Command`] values to [`apply`], and read it back through the
//! [`query`] module. Each tick resolves projectiles first, then monsters, then
//! towers; entities created or destroyed during a phase are merged only after
//! that phase has visited the whole live set.

mod monsters;
mod projectiles;
mod towers;

use std::time::Duration;

use glam::Vec2;
use slotmap::SlotMap;
use tower_defence_core::{
    extract_path, BuildError, Catalog, CellCoord, Command, ConfigError, Event, Grid, HitStrategy,
    MonsterId, MonsterKindId, Path, ProjectileId, TargetingStrategy, TowerActionError,
    TowerKindId, TowerType, UpgradeError,
};
use tower_defence_system_movement::{advance, detect_hit};
use tower_defence_system_spawning::{ChildPlacement, Config as SpawningConfig, Spawning};
use tower_defence_system_tower_combat::{ArmedTower, Shot, TowerCombat};
use tower_defence_system_tower_targeting::TowerTargeting;
use tracing::{debug, trace};

use crate::monsters::Monster;
use crate::projectiles::Projectile;
use crate::towers::TowerRegistry;

/// Distance beyond the grid edge at which a projectile is discarded.
const PROJECTILE_BOUNDS_MARGIN: f32 = 1.0;

/// Player resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    /// Currency available for building and upgrading towers.
    pub money: u32,
    /// Health removed by monsters reaching the end of the path.
    pub health: u32,
}

/// Represents the authoritative tower defence world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    path: Path,
    catalog: Catalog,
    player: Player,
    defeated: bool,
    tick_index: u64,
    monsters: SlotMap<MonsterId, Monster>,
    projectiles: SlotMap<ProjectileId, Projectile>,
    towers: TowerRegistry,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    scratch: Scratch,
}

/// Buffers reused across ticks for deferred removals and insertions.
#[derive(Debug, Default)]
struct Scratch {
    spent_projectiles: Vec<ProjectileId>,
    departed_monsters: Vec<MonsterId>,
    children: Vec<ChildPlacement>,
    armed: Vec<ArmedTower>,
    shots: Vec<Shot>,
}

impl World {
    /// Creates a world over `grid` populated from `catalog`.
    ///
    /// The catalog is validated and the path extracted once, here; any
    /// problem is reported before the first tick can run. `seed` drives the
    /// placement of monsters spawned by dying parents.
    pub fn new(
        grid: Grid,
        catalog: Catalog,
        player: Player,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        catalog.validate()?;
        let path = extract_path(&grid)?;
        debug!(
            columns = grid.columns(),
            rows = grid.rows(),
            path_length = path.length(),
            "world created"
        );

        Ok(Self {
            grid,
            path,
            catalog,
            player,
            defeated: false,
            tick_index: 0,
            monsters: SlotMap::with_key(),
            projectiles: SlotMap::with_key(),
            towers: TowerRegistry::new(),
            spawning: Spawning::new(SpawningConfig::new(seed)),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            scratch: Scratch::default(),
        })
    }

    /// Advances the simulation by `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.tick_index = self.tick_index.wrapping_add(1);
        out.push(Event::TimeAdvanced { dt });

        self.update_projectiles(dt, out);
        self.update_monsters(dt, out);
        self.update_towers(dt, out);

        trace!(
            tick = self.tick_index,
            monsters = self.monsters.len(),
            projectiles = self.projectiles.len(),
            towers = self.towers.len(),
            "tick resolved"
        );
    }

    /// Inserts a monster of type `kind` at the path spawn.
    ///
    /// Returns `None` when the catalog has no such type.
    pub fn spawn_monster(
        &mut self,
        kind: MonsterKindId,
        out: &mut Vec<Event>,
    ) -> Option<MonsterId> {
        self.insert_monster(kind, 0.0, out)
    }

    /// Builds a tower of type `kind` on `cell`, paying its cost.
    ///
    /// On failure nothing changes, a [`Event::TowerBuildRejected`] is emitted
    /// and `false` is returned.
    pub fn try_build_tower(
        &mut self,
        kind: TowerKindId,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) -> bool {
        let verdict = build_verdict(
            &self.grid,
            &self.catalog,
            &self.towers,
            self.player.money,
            kind,
            cell,
        );
        match verdict {
            Ok(tower_type) => {
                let cost = tower_type.cost;
                self.player.money -= cost;
                let tower = self.towers.insert(cell, kind, tower_type);
                debug!(?cell, ?kind, cost, money = self.player.money, "tower built");
                out.push(Event::TowerBuilt {
                    tower,
                    kind,
                    cell,
                    cost,
                });
                true
            }
            Err(reason) => {
                debug!(?cell, ?kind, ?reason, "tower build rejected");
                out.push(Event::TowerBuildRejected { kind, cell, reason });
                false
            }
        }
    }

    /// Applies the next upgrade step of the tower on `cell`, paying its cost.
    ///
    /// Upgrading a fully upgraded tower, or one the player cannot afford,
    /// leaves the world untouched.
    pub fn upgrade_tower(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> bool {
        let money = &mut self.player.money;
        let outcome = match self.towers.get_mut(cell) {
            None => Err(UpgradeError::MissingTower),
            Some(tower) => match tower.upgrade_cost() {
                None => Err(UpgradeError::FullyUpgraded),
                Some(cost) if cost > *money => Err(UpgradeError::InsufficientFunds),
                Some(cost) => {
                    *money -= cost;
                    tower.upgrade();
                    Ok((tower.level, cost))
                }
            },
        };

        match outcome {
            Ok((level, cost)) => {
                debug!(?cell, level, cost, money = self.player.money, "tower upgraded");
                out.push(Event::TowerUpgraded { cell, level, cost });
                true
            }
            Err(reason) => {
                debug!(?cell, ?reason, "tower upgrade rejected");
                out.push(Event::TowerUpgradeRejected { cell, reason });
                false
            }
        }
    }

    /// Removes the tower on `cell`. Selling refunds nothing.
    pub fn sell_tower(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> bool {
        let Some(tower) = self.towers.remove(cell) else {
            return reject_tower_action(cell, out);
        };
        debug!(?cell, tower = tower.id.get(), "tower sold");
        out.push(Event::TowerSold {
            tower: tower.id,
            cell,
        });
        true
    }

    /// Switches the targeting strategy of the tower on `cell`.
    pub fn set_targeting_strategy(
        &mut self,
        cell: CellCoord,
        strategy: TargetingStrategy,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(tower) = self.towers.get_mut(cell) else {
            return reject_tower_action(cell, out);
        };
        tower.targeting = strategy;
        out.push(Event::TargetingChanged { cell, strategy });
        true
    }

    /// Flips the sticky-target flag of the tower on `cell`.
    pub fn toggle_sticky(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> bool {
        let Some(tower) = self.towers.get_mut(cell) else {
            return reject_tower_action(cell, out);
        };
        tower.sticky = !tower.sticky;
        out.push(Event::StickyToggled {
            cell,
            sticky: tower.sticky,
        });
        true
    }

    fn insert_monster(
        &mut self,
        kind: MonsterKindId,
        distance: f32,
        out: &mut Vec<Event>,
    ) -> Option<MonsterId> {
        let Some(monster_type) = self.catalog.monster(kind) else {
            debug!(?kind, "unknown monster kind ignored");
            return None;
        };
        let monster = Monster::spawn(kind, monster_type, distance, &self.path);
        let distance = monster.distance;
        let id = self.monsters.insert(monster);
        out.push(Event::MonsterSpawned {
            monster: id,
            kind,
            distance,
        });
        Some(id)
    }

    fn update_projectiles(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.scratch.spent_projectiles.clear();
        let lower = Vec2::splat(-PROJECTILE_BOUNDS_MARGIN);
        let upper = Vec2::new(
            self.grid.columns() as f32 - 1.0 + PROJECTILE_BOUNDS_MARGIN,
            self.grid.rows() as f32 - 1.0 + PROJECTILE_BOUNDS_MARGIN,
        );

        for (id, projectile) in &mut self.projectiles {
            let target_position = match projectile.target {
                Some(target) => match self.monsters.get(target).filter(|m| !m.is_dead()) {
                    Some(monster) => Some(monster.position),
                    None => {
                        out.push(Event::ProjectileExpired { projectile: id });
                        self.scratch.spent_projectiles.push(id);
                        continue;
                    }
                },
                None => None,
            };

            let motion = advance(
                projectile.stats.movement,
                projectile.position,
                projectile.angle,
                projectile.stats.speed,
                target_position,
                dt,
            );
            projectile.position = motion.position;
            projectile.angle = motion.angle;
            projectile.travelled += motion.travelled;

            let candidates = self
                .monsters
                .iter()
                .filter(|(_, monster)| !monster.is_dead())
                .map(|(monster_id, monster)| (monster_id, monster.position));
            let struck = detect_hit(
                projectile.stats.hit,
                projectile.position,
                projectile.stats.hitbox,
                projectile.target,
                candidates,
            );

            if let Some(struck) = struck {
                if let Some(monster) = self.monsters.get_mut(struck) {
                    for effect in &projectile.stats.effects {
                        effect.apply_to(monster);
                    }
                }
                out.push(Event::ProjectileHit {
                    projectile: id,
                    monster: struck,
                });
                self.scratch.spent_projectiles.push(id);
                continue;
            }

            let escaped = projectile.position.cmplt(lower).any()
                || projectile.position.cmpgt(upper).any();
            if projectile.exceeded_range() || escaped {
                out.push(Event::ProjectileExpired { projectile: id });
                self.scratch.spent_projectiles.push(id);
            }
        }

        for id in self.scratch.spent_projectiles.drain(..) {
            let _ = self.projectiles.remove(id);
        }
    }

    fn update_monsters(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.scratch.departed_monsters.clear();
        self.scratch.children.clear();

        for (id, monster) in &mut self.monsters {
            if monster.is_dead() {
                self.player.money = self.player.money.saturating_add(monster.reward);
                if let Some(monster_type) = self.catalog.monster(monster.kind) {
                    self.spawning.handle(
                        monster.distance,
                        &monster_type.children,
                        &mut self.scratch.children,
                    );
                }
                debug!(
                    ?id,
                    reward = monster.reward,
                    money = self.player.money,
                    "monster killed"
                );
                out.push(Event::MonsterKilled {
                    monster: id,
                    reward: monster.reward,
                });
                self.scratch.departed_monsters.push(id);
                continue;
            }

            monster.advance(dt, &self.path);
            if !self.path.has_arrived(monster.distance) {
                continue;
            }

            self.player.health = self.player.health.saturating_sub(monster.damage);
            debug!(
                ?id,
                damage = monster.damage,
                health = self.player.health,
                "monster arrived"
            );
            out.push(Event::MonsterArrived {
                monster: id,
                damage: monster.damage,
            });
            self.scratch.departed_monsters.push(id);

            if self.player.health == 0 && !self.defeated {
                self.defeated = true;
                debug!("player defeated");
                out.push(Event::PlayerDefeated);
            }
        }

        for id in self.scratch.departed_monsters.drain(..) {
            let _ = self.monsters.remove(id);
        }

        let children = std::mem::take(&mut self.scratch.children);
        for child in &children {
            let _ = self.insert_monster(child.kind, child.distance, out);
        }
        self.scratch.children = children;
    }

    fn update_towers(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let monsters = query::monster_view(self);
        self.scratch.armed.clear();

        for (cell, tower) in self.towers.iter_mut() {
            tower.cooldown.update(dt);
            let origin = cell.to_point();
            tower.target = self.targeting.retarget(
                tower.targeting,
                tower.sticky,
                tower.target,
                origin,
                tower.range(),
                &monsters,
            );

            if let Some(target) = tower.target.and_then(|id| monsters.get(id)) {
                let offset = target.position - origin;
                tower.angle = offset.y.atan2(offset.x);
            }

            let ready = tower.cooldown.ended();
            if ready && tower.target.is_some() {
                let period = tower.shot_period();
                tower.cooldown.start(period);
            }

            self.scratch.armed.push(ArmedTower {
                cell,
                ready,
                target: tower.target,
                orientation: tower.orientation,
                projectile_count: tower.stats.projectile_count.value(),
            });
        }

        self.scratch.shots.clear();
        self.combat
            .handle(&self.scratch.armed, &monsters, &mut self.scratch.shots);

        for shot in self.scratch.shots.drain(..) {
            let Some(tower) = self.towers.get(shot.tower) else {
                continue;
            };
            let stats = tower.projectile.snapshot();
            let target = (stats.hit == HitStrategy::Tracking).then_some(shot.target);
            let projectile = self.projectiles.insert(Projectile {
                source: tower.kind,
                position: shot.tower.to_point(),
                angle: shot.angle,
                travelled: 0.0,
                stats,
                target,
            });
            out.push(Event::ProjectileFired {
                tower: shot.tower,
                projectile,
            });
        }
    }
}

fn build_verdict<'a>(
    grid: &Grid,
    catalog: &'a Catalog,
    towers: &TowerRegistry,
    money: u32,
    kind: TowerKindId,
    cell: CellCoord,
) -> Result<&'a TowerType, BuildError> {
    let tower_type = catalog.tower(kind).ok_or(BuildError::UnknownKind)?;
    if !grid.contains(cell) {
        return Err(BuildError::OutOfBounds);
    }
    if !grid.is_constructible(cell) {
        return Err(BuildError::NotConstructible);
    }
    if towers.is_occupied(cell) {
        return Err(BuildError::Occupied);
    }
    if tower_type.cost > money {
        return Err(BuildError::InsufficientFunds);
    }
    Ok(tower_type)
}

fn reject_tower_action(cell: CellCoord, out: &mut Vec<Event>) -> bool {
    debug!(?cell, "tower action rejected: no tower on cell");
    out.push(Event::TowerActionRejected {
        cell,
        reason: TowerActionError::MissingTower,
    });
    false
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnMonster { kind } => {
            let _ = world.spawn_monster(kind, out_events);
        }
        Command::BuildTower { kind, cell } => {
            let _ = world.try_build_tower(kind, cell, out_events);
        }
        Command::UpgradeTower { cell } => {
            let _ = world.upgrade_tower(cell, out_events);
        }
        Command::SellTower { cell } => {
            let _ = world.sell_tower(cell, out_events);
        }
        Command::SetTargetingStrategy { cell, strategy } => {
            let _ = world.set_targeting_strategy(cell, strategy, out_events);
        }
        Command::ToggleSticky { cell } => {
            let _ = world.toggle_sticky(cell, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Player, World};
    use tower_defence_core::{
        Catalog, CellCoord, Grid, MonsterSnapshot, MonsterView, Path, ProjectileSnapshot,
        ProjectileView, TowerSnapshot, TowerView,
    };

    /// Current player money and health.
    #[must_use]
    pub fn player(world: &World) -> Player {
        world.player
    }

    /// Currency available to the player.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.player.money
    }

    /// Remaining player health.
    #[must_use]
    pub fn health(world: &World) -> u32 {
        world.player.health
    }

    /// Reports whether player health has reached zero.
    #[must_use]
    pub fn is_defeated(world: &World) -> bool {
        world.defeated
    }

    /// Number of ticks resolved so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Provides read-only access to the route monsters follow.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Provides read-only access to the type catalog, including display models.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Captures a read-only view of the live monsters.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        MonsterView::from_snapshots(
            world
                .monsters
                .iter()
                .map(|(id, monster)| monster.snapshot(id))
                .collect::<Vec<MonsterSnapshot>>(),
        )
    }

    /// Captures a read-only view of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|(cell, tower)| tower.snapshot(cell))
                .collect(),
        )
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|(id, projectile)| projectile.snapshot(id))
                .collect::<Vec<ProjectileSnapshot>>(),
        )
    }

    /// Snapshot of the tower occupying `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerSnapshot> {
        world.towers.get(cell).map(|tower| tower.snapshot(cell))
    }

    /// Price of the next upgrade of the tower on `cell`, if it exists and can
    /// still be upgraded.
    #[must_use]
    pub fn upgrade_cost(world: &World, cell: CellCoord) -> Option<u32> {
        world.towers.get(cell).and_then(|tower| tower.upgrade_cost())
    }
}
