use std::collections::{BTreeMap, HashMap};

use crate::foundation::core::Millis;

/// Named timer slots. Scheduling into a slot cancels whatever was pending there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum TimerName {
    BeforeAnimate,
    AfterAnimate,
    Playback,
    Reveal,
    FadeOut,
    Resize,
    Measure,
    VisibleTick,
}

impl TimerName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeAnimate => "beforeAnimate",
            Self::AfterAnimate => "afterAnimate",
            Self::Playback => "playback",
            Self::Reveal => "reveal",
            Self::FadeOut => "fadeOut",
            Self::Resize => "resize",
            Self::Measure => "measure",
            Self::VisibleTick => "visibleTick",
        }
    }
}

impl std::fmt::Display for TimerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timer whose deadline has been reached.
#[derive(Clone, Debug, PartialEq)]
pub struct Fired<T> {
    pub at: Millis,
    pub name: TimerName,
    pub task: T,
}

#[derive(Clone, Debug)]
struct Pending<T> {
    name: TimerName,
    task: T,
}

/// Deadline-ordered timer queue driven by an explicit virtual clock.
///
/// Ties fire in scheduling order. Within one named slot only the most recently scheduled task can
/// ever fire.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    now: Millis,
    seq: u64,
    pending: BTreeMap<(Millis, u64), Pending<T>>,
    named: HashMap<TimerName, (Millis, u64)>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Millis::ZERO,
            seq: 0,
            pending: BTreeMap::new(),
            named: HashMap::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule `task` into slot `name`, cancelling the slot's pending task.
    pub fn schedule(&mut self, name: TimerName, delay: Millis, task: T) {
        self.cancel(name);
        let key = (self.now.saturating_add(delay), self.seq);
        self.seq += 1;
        self.pending.insert(key, Pending { name, task });
        self.named.insert(name, key);
    }

    /// Discard the pending task of `name`. Returns whether one existed.
    pub fn cancel(&mut self, name: TimerName) -> bool {
        match self.named.remove(&name) {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.named.clear();
    }

    pub fn is_pending(&self, name: TimerName) -> bool {
        self.named.contains_key(&name)
    }

    pub fn deadline(&self, name: TimerName) -> Option<Millis> {
        self.named.get(&name).map(|(at, _)| *at)
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.keys().next().map(|(at, _)| *at)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop the earliest task due at or before `until`, moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<T>> {
        let (&key, _) = self.pending.iter().next().filter(|((at, _), _)| *at <= until)?;
        let pending = self.pending.remove(&key)?;
        if self.named.get(&pending.name) == Some(&key) {
            self.named.remove(&pending.name);
        }
        self.now = self.now.max(key.0);
        Some(Fired {
            at: key.0,
            name: pending.name,
            task: pending.task,
        })
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock(&mut self, to: Millis) {
        self.now = self.now.max(to);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/timers.rs"]
mod tests;
