#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave generator releasing timed sequences of monster types.
//!
//! The generator alternates between two states. While idle it waits for the
//! driver to call [`WaveGenerator::start_spawning`]; while spawning it releases
//! the monsters of the current wave one at a time, spaced by the wave's
//! interval, and falls back to idle once the wave is exhausted. Waves are never
//! replayed: the wave index only moves forward.

use std::time::Duration;

use tower_defence_core::{Command, ConfigError, Countdown, Event, MonsterKindId};
use tracing::info;

/// Ordered list of monster types released at a fixed interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wave {
    interval: Duration,
    monsters: Vec<MonsterKindId>,
}

impl Wave {
    /// Creates a wave releasing `monsters` in order, `interval` apart.
    #[must_use]
    pub fn new(interval: Duration, monsters: Vec<MonsterKindId>) -> Self {
        Self { interval, monsters }
    }

    /// Delay between two consecutive releases.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Monster types in release order.
    #[must_use]
    pub fn monsters(&self) -> &[MonsterKindId] {
        &self.monsters
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Spawning { next_monster: usize },
}

/// State machine releasing the monsters of each wave on request.
#[derive(Clone, Debug)]
pub struct WaveGenerator {
    waves: Vec<Wave>,
    current_wave: usize,
    state: State,
    countdown: Countdown,
}

impl WaveGenerator {
    /// Creates a generator over `waves`, rejecting waves without monsters.
    pub fn new(waves: Vec<Wave>) -> Result<Self, ConfigError> {
        if let Some(wave) = waves.iter().position(|wave| wave.monsters.is_empty()) {
            return Err(ConfigError::EmptyWave { wave });
        }

        Ok(Self {
            waves,
            current_wave: 0,
            state: State::Idle,
            countdown: Countdown::new(),
        })
    }

    /// Reports whether a new wave may start now.
    #[must_use]
    pub fn can_start_spawning(&self) -> bool {
        self.state == State::Idle && !self.is_exhausted()
    }

    /// Starts the current wave; the first monster is released on the next update.
    ///
    /// Returns `false` and changes nothing while a wave is running or once
    /// every wave has been released.
    pub fn start_spawning(&mut self) -> bool {
        if !self.can_start_spawning() {
            return false;
        }

        info!(
            wave = self.current_wave,
            monsters = self.waves[self.current_wave].monsters.len(),
            "wave started"
        );
        self.state = State::Spawning { next_monster: 0 };
        self.countdown.start(Duration::ZERO);
        true
    }

    /// Advances the spawn countdown and releases at most one monster.
    pub fn update(&mut self, dt: Duration) -> Option<MonsterKindId> {
        let State::Spawning { next_monster } = self.state else {
            return None;
        };

        self.countdown.update(dt);
        if !self.countdown.ended() {
            return None;
        }

        let wave = self.waves.get(self.current_wave)?;
        let kind = *wave.monsters.get(next_monster)?;
        let released = next_monster + 1;

        if released >= wave.monsters.len() {
            info!(wave = self.current_wave, "wave finished");
            self.state = State::Idle;
            self.current_wave += 1;
        } else {
            self.state = State::Spawning {
                next_monster: released,
            };
            self.countdown.start(wave.interval);
        }

        Some(kind)
    }

    /// Folds `TimeAdvanced` events and emits `Command::SpawnMonster` for each release.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                if let Some(kind) = self.update(*dt) {
                    out.push(Command::SpawnMonster { kind });
                }
            }
        }
    }

    /// Zero-based index of the wave that will run next, or is running.
    #[must_use]
    pub const fn current_wave(&self) -> usize {
        self.current_wave
    }

    /// Total number of configured waves.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether a wave is currently releasing monsters.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        matches!(self.state, State::Spawning { .. })
    }

    /// Reports whether every wave has been released.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current_wave >= self.waves.len()
    }
}
