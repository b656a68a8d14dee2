//! Keyed timers.
//!
//! The scheduler never sleeps. Callers schedule deadlines, then on every tick
//! call [`Scheduler::expire`] with the current time and act on the keys it
//! returns. A driver can use [`Scheduler::next_deadline`] to decide how long
//! to wait.
//!
//! Each key has at most one pending timer. Scheduling a key again supersedes
//! the earlier timer, so a stale expiry can never fire after a newer one was
//! set.

use crate::Moment;

#[derive(Debug, Clone)]
struct Pending<I, K> {
    /// Scheduling order, breaks ties between equal deadlines.
    seq: u64,
    key: K,
    deadline: I,
}

/// Set of pending timers keyed by `K`.
#[derive(Debug, Clone)]
pub struct Scheduler<I, K> {
    next_seq: u64,
    pending: Vec<Pending<I, K>>,
}

impl<I: Moment, K: Clone + PartialEq> Default for Scheduler<I, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Moment, K: Clone + PartialEq> Scheduler<I, K> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self { next_seq: 0, pending: Vec::new() }
    }

    /// Schedule `key` to expire at `deadline`, superseding any pending timer
    /// for the same key.
    pub fn schedule(&mut self, key: K, deadline: I) {
        self.pending.retain(|p| p.key != key);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { seq, key, deadline });
    }

    /// Cancel whatever timer is pending for `key`.
    pub fn cancel_key(&mut self, key: &K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| &p.key != key);
        self.pending.len() != before
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<I> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn expire(&mut self, now: I) -> Vec<K> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.deadline <= now);
        self.pending = rest;

        due.sort_by_key(|p| (p.deadline, p.seq));
        due.into_iter().map(|p| p.key).collect()
    }
}
