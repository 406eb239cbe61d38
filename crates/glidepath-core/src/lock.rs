//! Session-wide slide lock.
//!
//! At most one drag task runs at a time. The lock carries a time-to-live on
//! the monotonic clock: a holder that stops renewing is considered runaway
//! once the TTL passes, and the next tick that looks at the lock runs the
//! fail-safe. Expiry is checked passively; no timer fires on its own.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::task::TaskId;

#[derive(Debug, Clone, Copy)]
struct LockState {
    owner: TaskId,
    held_since: Instant,
}

/// What a task sees when it checks the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Free,
    /// Held by the asking task and within its TTL.
    Held,
    /// Held past its TTL, by anyone.
    Expired,
    /// Held by another task.
    Foreign(TaskId),
}

/// Mutual exclusion token with a TTL.
#[derive(Debug)]
pub struct SlideLock {
    ttl: Duration,
    state: Mutex<Option<LockState>>,
}

impl SlideLock {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Take the lock if it is free or expired; otherwise report the holder.
    pub fn try_acquire(&self, owner: TaskId) -> Result<(), TaskId> {
        let mut state = self.state.lock();
        let now = Instant::now();
        if let Some(current) = *state {
            if current.owner != owner && !self.expired(&current, now) {
                return Err(current.owner);
            }
        }
        *state = Some(LockState {
            owner,
            held_since: now,
        });
        debug!(%owner, "slide lock acquired");
        Ok(())
    }

    /// Push `held_since` forward. Only an unexpired holder may renew.
    pub fn renew(&self, owner: TaskId) -> bool {
        let mut state = self.state.lock();
        let now = Instant::now();
        match state.as_mut() {
            Some(current) if current.owner == owner && !self.expired(current, now) => {
                current.held_since = now;
                true
            }
            _ => false,
        }
    }

    /// Clear the lock if `owner` holds it.
    pub fn release(&self, owner: TaskId) -> bool {
        let mut state = self.state.lock();
        match *state {
            Some(current) if current.owner == owner => {
                *state = None;
                debug!(%owner, "slide lock released");
                true
            }
            _ => false,
        }
    }

    /// Passive expiry check from `owner`'s point of view.
    pub fn status(&self, owner: TaskId) -> LockStatus {
        let state = self.state.lock();
        match *state {
            None => LockStatus::Free,
            Some(current) if self.expired(&current, Instant::now()) => LockStatus::Expired,
            Some(current) if current.owner == owner => LockStatus::Held,
            Some(current) => LockStatus::Foreign(current.owner),
        }
    }

    /// Current unexpired holder, if any.
    pub fn holder(&self) -> Option<TaskId> {
        let state = self.state.lock();
        (*state)
            .filter(|current| !self.expired(current, Instant::now()))
            .map(|current| current.owner)
    }

    pub fn is_held(&self) -> bool {
        self.holder().is_some()
    }

    fn expired(&self, state: &LockState, now: Instant) -> bool {
        now.saturating_duration_since(state.held_since) > self.ttl
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
