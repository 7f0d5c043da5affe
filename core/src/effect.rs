//! Battlefield effects carried by projectiles and applied to monsters on impact.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::upgrade::{Upgradable, Upgrade};

/// Mutation contract an effect relies on when it lands.
pub trait EffectTarget {
    /// Subtracts `amount` from the target's health.
    fn take_damage(&mut self, amount: f32);

    /// Divides the target's speed by `factor` until `duration` elapses.
    fn slow_down(&mut self, factor: f32, duration: Duration);
}

/// Resolved effect snapshotted into a projectile when it is fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Removes health from the monster.
    Damage {
        /// Health removed per impact.
        amount: f32,
    },
    /// Temporarily divides the monster's speed.
    Slow {
        /// Divisor applied to the base speed.
        factor: f32,
        /// How long the reduced speed lasts.
        duration: Duration,
    },
    /// Halts the monster entirely for a while.
    Stun {
        /// How long the monster stays halted.
        duration: Duration,
    },
}

impl Effect {
    /// Applies the effect to the provided target.
    pub fn apply_to<T: EffectTarget + ?Sized>(&self, target: &mut T) {
        match *self {
            Self::Damage { amount } => target.take_damage(amount),
            Self::Slow { factor, duration } => target.slow_down(factor, duration),
            // A stun is a slow whose divisor is infinite.
            Self::Stun { duration } => target.slow_down(f32::INFINITY, duration),
        }
    }
}

/// Data-declared, upgradable description of an effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSpec {
    /// Declares a [`Effect::Damage`].
    Damage {
        /// Health removed per impact.
        amount: Upgradable<f32>,
    },
    /// Declares a [`Effect::Slow`].
    Slow {
        /// Divisor applied to the base speed.
        factor: Upgradable<f32>,
        /// Duration of the slow in milliseconds.
        duration_ms: Upgradable<u64>,
    },
    /// Declares a [`Effect::Stun`].
    Stun {
        /// Duration of the stun in milliseconds.
        duration_ms: Upgradable<u64>,
    },
}

impl EffectSpec {
    /// Resolves the effect at its current level.
    #[must_use]
    pub fn resolve(&self) -> Effect {
        match self {
            Self::Damage { amount } => Effect::Damage {
                amount: amount.value(),
            },
            Self::Slow {
                factor,
                duration_ms,
            } => Effect::Slow {
                factor: factor.value(),
                duration: Duration::from_millis(duration_ms.value()),
            },
            Self::Stun { duration_ms } => Effect::Stun {
                duration: Duration::from_millis(duration_ms.value()),
            },
        }
    }
}

impl Upgrade for EffectSpec {
    fn is_upgradable(&self) -> bool {
        match self {
            Self::Damage { amount } => amount.is_upgradable(),
            Self::Slow {
                factor,
                duration_ms,
            } => factor.is_upgradable() || duration_ms.is_upgradable(),
            Self::Stun { duration_ms } => duration_ms.is_upgradable(),
        }
    }

    fn upgrade(&mut self) {
        match self {
            Self::Damage { amount } => amount.upgrade(),
            Self::Slow {
                factor,
                duration_ms,
            } => {
                factor.upgrade();
                duration_ms.upgrade();
            }
            Self::Stun { duration_ms } => duration_ms.upgrade(),
        }
    }
}
