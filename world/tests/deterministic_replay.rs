use std::time::Duration;

use tower_defence_core::{
    Catalog, CellCoord, ChildSpawn, Command, EffectSpec, Event, Grid, HitStrategy,
    MonsterKindId, MonsterSnapshot, MonsterType, MovementStrategy, OrientationRule,
    ProjectileTemplate, TargetingStrategy, TowerKindId, TowerStats, TowerType, Upgradable,
};
use tower_defence_system_wave_generation::{Wave, WaveGenerator};
use tower_defence_world::{self as world, query, Player, World};

fn catalog() -> Catalog {
    Catalog {
        monsters: vec![
            MonsterType {
                name: "swarmling".to_owned(),
                model: String::new(),
                health: 1.0,
                speed: 1.5,
                reward: 1,
                damage: 1,
                children: Vec::new(),
            },
            MonsterType {
                name: "hive".to_owned(),
                model: String::new(),
                health: 2.0,
                speed: 0.8,
                reward: 6,
                damage: 2,
                children: vec![ChildSpawn {
                    kind: MonsterKindId::new(0),
                    count: 3,
                    spread: 1.5,
                }],
            },
        ],
        towers: vec![TowerType {
            name: "burst".to_owned(),
            model: String::new(),
            cost: 40,
            targeting: TargetingStrategy::HealthDescending,
            orientation: OrientationRule::Radial,
            stats: TowerStats {
                shots_per_second: Upgradable::fixed(1.5),
                projectile_count: Upgradable::fixed(6),
                upgrade_cost: Upgradable::fixed(0),
            },
            projectile: ProjectileTemplate {
                model: String::new(),
                speed: Upgradable::fixed(4.0),
                range: Upgradable::fixed(2.5),
                hitbox: Upgradable::fixed(0.5),
                range_sensitive: true,
                movement: MovementStrategy::ConstantAngle,
                hit: HitStrategy::Proximity,
                effects: vec![EffectSpec::Damage {
                    amount: Upgradable::fixed(1.0),
                }],
            },
        }],
    }
}

#[derive(Debug, PartialEq)]
struct Outcome {
    events: Vec<Event>,
    monsters: Vec<MonsterSnapshot>,
    money: u32,
    health: u32,
}

fn replay() -> Outcome {
    let grid = Grid::parse(&["########", ".......#", "########"]).expect("grid");
    let player = Player {
        money: 100,
        health: 30,
    };
    let mut world = World::new(grid, catalog(), player, 42).expect("world");
    let mut waves = WaveGenerator::new(vec![
        Wave::new(Duration::from_millis(400), vec![MonsterKindId::new(1); 4]),
        Wave::new(
            Duration::from_millis(250),
            vec![MonsterKindId::new(0), MonsterKindId::new(1)],
        ),
    ])
    .expect("waves");

    let mut log = Vec::new();
    let mut events = Vec::new();
    for cell in [CellCoord::new(3, 1), CellCoord::new(5, 1)] {
        world::apply(
            &mut world,
            Command::BuildTower {
                kind: TowerKindId::new(0),
                cell,
            },
            &mut events,
        );
    }

    for _ in 0..400 {
        let _ = waves.start_spawning();
        let mut commands = Vec::new();
        waves.handle(&events, &mut commands);
        log.append(&mut events);

        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        );
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }
    log.append(&mut events);

    Outcome {
        events: log,
        monsters: query::monster_view(&world).into_vec(),
        money: query::money(&world),
        health: query::health(&world),
    }
}

#[test]
fn identical_inputs_replay_identically() {
    let first = replay();
    let second = replay();

    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::MonsterKilled { .. })));
    assert_eq!(first, second);
}
