//! Timer queue on simulated session time.
//!
//! Replaces callback timers with explicit entries that the session fires in
//! `(due, insertion)` order, so two timers due at the same instant run in
//! the order they were scheduled.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::physics::BodyId;
use crate::registry::FruitId;

/// Deferred work scheduled by a drop gesture or a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Hand a dropped fruit over to gravity.
    ReleaseFruit { body: BodyId, fruit: FruitId },
    /// Arm the next pointer fruit.
    ArmPointer,
}

/// Single-consumer timer queue.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    entries: BTreeMap<(Duration, u64), TimerTask>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to run at session time `due`.
    pub fn schedule(&mut self, due: Duration, task: TimerTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((due, seq), task);
    }

    /// Time of the earliest pending entry.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Removes and returns the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerTask)> {
        let entry = self.entries.first_entry()?;
        if entry.key().0 > now {
            return None;
        }
        let ((due, _), task) = entry.remove_entry();
        Some((due, task))
    }

    /// Pending entries in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (Duration, TimerTask)> + '_ {
        self.entries.iter().map(|((due, _), task)| (*due, *task))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every pending entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
