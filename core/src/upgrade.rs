//! Leveled values that advance through a queue of future values.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Anything that can be advanced by one upgrade step.
///
/// Composite containers forward to every upgradable child they own and report
/// themselves upgradable when any child still has a pending step.
pub trait Upgrade {
    /// Reports whether at least one further upgrade step is queued.
    fn is_upgradable(&self) -> bool;

    /// Advances by one step. Does nothing when no step is pending.
    fn upgrade(&mut self);
}

/// A current value plus a FIFO queue of values unlocked by future upgrades.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "UpgradableRepr<T>", into = "UpgradableRepr<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de>"
))]
pub struct Upgradable<T> {
    current: T,
    pending: VecDeque<T>,
}

impl<T> Upgradable<T> {
    /// Creates a value that never changes.
    #[must_use]
    pub fn fixed(value: T) -> Self {
        Self {
            current: value,
            pending: VecDeque::new(),
        }
    }

    /// Creates a value that advances through `upgrades` in order.
    #[must_use]
    pub fn with_upgrades(base: T, upgrades: impl IntoIterator<Item = T>) -> Self {
        Self {
            current: base,
            pending: upgrades.into_iter().collect(),
        }
    }

    /// Value active at the current level.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.current
    }

    /// Value the next upgrade would activate, if any.
    #[must_use]
    pub fn next(&self) -> Option<&T> {
        self.pending.front()
    }

    /// Number of upgrade steps still queued.
    #[must_use]
    pub fn remaining_upgrades(&self) -> usize {
        self.pending.len()
    }
}

impl<T: Copy> Upgradable<T> {
    /// Copies the value active at the current level.
    #[must_use]
    pub fn value(&self) -> T {
        self.current
    }
}

impl<T> Upgrade for Upgradable<T> {
    fn is_upgradable(&self) -> bool {
        !self.pending.is_empty()
    }

    fn upgrade(&mut self) {
        if let Some(next) = self.pending.pop_front() {
            self.current = next;
        }
    }
}

impl<U: Upgrade> Upgrade for [U] {
    fn is_upgradable(&self) -> bool {
        self.iter().any(Upgrade::is_upgradable)
    }

    fn upgrade(&mut self) {
        for element in self.iter_mut() {
            element.upgrade();
        }
    }
}

impl<U: Upgrade> Upgrade for Vec<U> {
    fn is_upgradable(&self) -> bool {
        self.as_slice().is_upgradable()
    }

    fn upgrade(&mut self) {
        self.as_mut_slice().upgrade();
    }
}

impl<T> From<T> for Upgradable<T> {
    fn from(value: T) -> Self {
        Self::fixed(value)
    }
}

/// Accepts either a bare value or `{ base = .., upgrades = [..] }`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum UpgradableRepr<T> {
    Leveled {
        base: T,
        #[serde(default = "Vec::new")]
        upgrades: Vec<T>,
    },
    Fixed(T),
}

impl<T> From<UpgradableRepr<T>> for Upgradable<T> {
    fn from(repr: UpgradableRepr<T>) -> Self {
        match repr {
            UpgradableRepr::Leveled { base, upgrades } => Self::with_upgrades(base, upgrades),
            UpgradableRepr::Fixed(value) => Self::fixed(value),
        }
    }
}

impl<T> From<Upgradable<T>> for UpgradableRepr<T> {
    fn from(value: Upgradable<T>) -> Self {
        if value.pending.is_empty() {
            UpgradableRepr::Fixed(value.current)
        } else {
            UpgradableRepr::Leveled {
                base: value.current,
                upgrades: value.pending.into_iter().collect(),
            }
        }
    }
}
