#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a tower defence scenario headlessly.

mod digest;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use tower_defence_core::{CellCoord, Command, Event, TowerKindId};
use tower_defence_system_bootstrap::{Scenario, Session};
use tower_defence_world::{self as world, query};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SCENARIO: &str = include_str!("../scenarios/default.toml");

/// Runs a tower defence scenario without rendering and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "tower-defence", version)]
struct Args {
    /// Scenario file to load; the bundled scenario is used when omitted.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 1_200)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Tower to build before the first tick; may be repeated.
    #[arg(long = "build", value_name = "KIND@COL,ROW")]
    builds: Vec<BuildOrder>,
    /// Start the next wave as soon as the previous one has been released.
    #[arg(long)]
    auto_waves: bool,
}

/// Tower placement requested on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BuildOrder {
    kind: TowerKindId,
    cell: CellCoord,
}

impl FromStr for BuildOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || format!("expected KIND@COL,ROW, got `{value}`");
        let (kind, cell) = value.split_once('@').ok_or_else(malformed)?;
        let (column, row) = cell.split_once(',').ok_or_else(malformed)?;
        let parse = |field: &str| field.trim().parse::<u32>().map_err(|_| malformed());

        Ok(Self {
            kind: TowerKindId::new(parse(kind)?),
            cell: CellCoord::new(parse(column)?, parse(row)?),
        })
    }
}

/// Counters accumulated from the event stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tally {
    spawned: u32,
    killed: u32,
    earned: u32,
    arrived: u32,
    fired: u32,
    hits: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::MonsterSpawned { .. } => self.spawned += 1,
                Event::MonsterKilled { reward, .. } => {
                    self.killed += 1;
                    self.earned += reward;
                }
                Event::MonsterArrived { .. } => self.arrived += 1,
                Event::ProjectileFired { .. } => self.fired += 1,
                Event::ProjectileHit { .. } => self.hits += 1,
                Event::TowerBuildRejected { kind, cell, reason } => {
                    warn!(kind = kind.get(), ?cell, ?reason, "build order rejected");
                }
                Event::PlayerDefeated => info!("player defeated"),
                _ => {}
            }
        }
    }
}

/// Final state reported once the run ends.
#[derive(Debug)]
struct Summary {
    ticks: u32,
    simulated: Duration,
    waves_released: usize,
    wave_count: usize,
    money: u32,
    health: u32,
    defeated: bool,
    live_monsters: usize,
    towers: usize,
    projectiles: usize,
    tally: Tally,
    digest: String,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ticks: {} ({:.1} s simulated)",
            self.ticks,
            self.simulated.as_secs_f64()
        )?;
        writeln!(f, "waves: {}/{}", self.waves_released, self.wave_count)?;
        writeln!(f, "money: {} ({} earned)", self.money, self.tally.earned)?;
        writeln!(
            f,
            "health: {}{}",
            self.health,
            if self.defeated { " (defeated)" } else { "" }
        )?;
        writeln!(
            f,
            "monsters: {} live, {} spawned, {} killed, {} arrived",
            self.live_monsters, self.tally.spawned, self.tally.killed, self.tally.arrived
        )?;
        writeln!(f, "towers: {}", self.towers)?;
        writeln!(
            f,
            "projectiles: {} in flight, {} fired, {} hits",
            self.projectiles, self.tally.fired, self.tally.hits
        )?;
        write!(f, "digest: {}", self.digest)
    }
}

/// Entry point for the tower defence command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let summary = run(&args)?;
    println!("{summary}");
    Ok(())
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let contents = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?,
        None => DEFAULT_SCENARIO.to_owned(),
    };
    Scenario::from_toml_str(&contents).context("failed to load scenario")
}

fn run(args: &Args) -> Result<Summary> {
    let scenario = load_scenario(args.scenario.as_deref())?;
    let Session {
        mut world,
        mut waves,
    } = scenario
        .into_session()
        .context("failed to boot scenario")?;

    let dt = Duration::from_millis(args.tick_ms);
    let mut tally = Tally::default();
    let mut events = Vec::new();
    let mut commands = Vec::new();

    for order in &args.builds {
        world::apply(
            &mut world,
            Command::BuildTower {
                kind: order.kind,
                cell: order.cell,
            },
            &mut events,
        );
    }

    for _ in 0..args.ticks {
        if args.auto_waves && waves.can_start_spawning() {
            let _ = waves.start_spawning();
        }

        waves.handle(&events, &mut commands);
        tally.record(&events);
        events.clear();

        world::apply(&mut world, Command::Tick { dt }, &mut events);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
    }
    tally.record(&events);

    let released = waves.current_wave() + usize::from(waves.is_spawning());
    Ok(Summary {
        ticks: args.ticks,
        simulated: dt.saturating_mul(args.ticks),
        waves_released: released,
        wave_count: waves.wave_count(),
        money: query::money(&world),
        health: query::health(&world),
        defeated: query::is_defeated(&world),
        live_monsters: query::monster_view(&world).len(),
        towers: query::tower_view(&world).iter().count(),
        projectiles: query::projectile_view(&world).iter().count(),
        tally,
        digest: digest::replay_digest(&world),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_orders_parse_kind_and_cell() {
        assert_eq!(
            "2@7, 1".parse::<BuildOrder>(),
            Ok(BuildOrder {
                kind: TowerKindId::new(2),
                cell: CellCoord::new(7, 1),
            })
        );
        assert!("2@7".parse::<BuildOrder>().is_err());
        assert!("dart@1,1".parse::<BuildOrder>().is_err());
        assert!("1,1".parse::<BuildOrder>().is_err());
    }

    #[test]
    fn bundled_scenario_boots() {
        let scenario = load_scenario(None).expect("bundled scenario");
        let session = scenario.into_session().expect("session");
        assert_eq!(session.waves.wave_count(), 4);
        assert_eq!(query::path(&session.world).length(), 21.0);
    }

    #[test]
    fn towers_defend_the_bundled_scenario() {
        let args = Args {
            scenario: None,
            ticks: 600,
            tick_ms: 50,
            builds: vec![
                BuildOrder {
                    kind: TowerKindId::new(0),
                    cell: CellCoord::new(7, 1),
                },
                BuildOrder {
                    kind: TowerKindId::new(2),
                    cell: CellCoord::new(3, 3),
                },
            ],
            auto_waves: true,
        };

        let summary = run(&args).expect("run");
        assert_eq!(summary.towers, 2);
        assert!(summary.tally.spawned > 0);
        assert!(summary.tally.killed > 0);
        assert_eq!(summary.money, 250 - 40 - 90 + summary.tally.earned);
    }
}
