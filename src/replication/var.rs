//! Host-owned replicated variable with a per-participant last-value cache

use std::fmt;

use crate::error::CombatError;

/// An observed value transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<T> {
    pub old: T,
    pub new: T,
}

type Subscriber<T> = Box<dyn FnMut(&T, &T) + Send>;

/// A single-writer state cell.
///
/// The host holds the authoritative copy and is the only side allowed to call
/// [`Replicated::set`]. Every other participant holds a mirror that only moves
/// forward through [`Replicated::receive`], in host sequence order.
pub struct Replicated<T> {
    value: T,
    seq: u64,
    authoritative: bool,
    subscribers: Vec<Subscriber<T>>,
}

impl<T: Clone + PartialEq> Replicated<T> {
    /// Authoritative copy, as held by the host
    pub fn authoritative(initial: T) -> Self {
        Self {
            value: initial,
            seq: 0,
            authoritative: true,
            subscribers: Vec::new(),
        }
    }

    /// Read-only mirror seeded from a snapshot taken at `seq`
    pub fn mirror(initial: T, seq: u64) -> Self {
        Self {
            value: initial,
            seq,
            authoritative: false,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Sequence number of the last applied transition
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    /// Register a change callback, invoked with `(old, new)` after the new value is stored
    pub fn subscribe(&mut self, f: impl FnMut(&T, &T) + Send + 'static) {
        self.subscribers.push(Box::new(f));
    }

    /// Write a new value. Host only.
    ///
    /// Writing the current value is not a transition and returns `Ok(None)`.
    pub fn set(&mut self, value: T) -> Result<Option<Change<T>>, CombatError> {
        if !self.authoritative {
            return Err(CombatError::not_authorized("set on a replicated mirror"));
        }
        if value == self.value {
            return Ok(None);
        }
        self.seq += 1;
        Ok(Some(self.store(value)))
    }

    /// Apply a transition received from the host.
    ///
    /// Updates at or below the last applied sequence are stale and ignored.
    pub fn receive(&mut self, seq: u64, value: T) -> Option<Change<T>> {
        if self.authoritative || seq <= self.seq {
            return None;
        }
        self.seq = seq;
        if value == self.value {
            return None;
        }
        Some(self.store(value))
    }

    fn store(&mut self, value: T) -> Change<T> {
        let old = std::mem::replace(&mut self.value, value);
        for subscriber in &mut self.subscribers {
            subscriber(&old, &self.value);
        }
        Change {
            old,
            new: self.value.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Replicated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replicated")
            .field("value", &self.value)
            .field("seq", &self.seq)
            .field("authoritative", &self.authoritative)
            .finish()
    }
}
