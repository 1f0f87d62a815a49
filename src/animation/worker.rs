use std::ops::Range;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum RevealMode {
    /// One element per cadence tick.
    #[default]
    Staggered,
    /// Every element at once (reduced motion).
    Simultaneous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum WorkerState {
    #[default]
    Stopped,
    Running {
        cursor: usize,
    },
}

/// What one tick revealed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealStep {
    /// Element `index` appeared; `more` tells whether another tick is needed.
    One { index: usize, more: bool },
    /// Every element in the range appeared at once.
    All(Range<usize>),
    Idle,
}

/// Reveal sequencer. Holds no timer: the driver calls [`RevealWorker::tick`] on its cadence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealWorker {
    len: usize,
    mode: RevealMode,
    state: WorkerState,
}

impl RevealWorker {
    pub fn new(mode: RevealMode) -> Self {
        Self {
            len: 0,
            mode,
            state: WorkerState::Stopped,
        }
    }

    pub fn set_mode(&mut self, mode: RevealMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, WorkerState::Running { .. })
    }

    /// Elements revealed so far in the current run.
    pub fn cursor(&self) -> usize {
        match self.state {
            WorkerState::Running { cursor } => cursor,
            WorkerState::Stopped => 0,
        }
    }

    /// Drop any run in progress and start over with `len` elements.
    pub fn restart(&mut self, len: usize) {
        self.len = len;
        self.state = if len == 0 {
            WorkerState::Stopped
        } else {
            WorkerState::Running { cursor: 0 }
        };
    }

    /// Halt mid-sequence; the cursor resets.
    pub fn stop(&mut self) {
        self.state = WorkerState::Stopped;
    }

    pub fn tick(&mut self) -> RevealStep {
        let WorkerState::Running { cursor } = self.state else {
            return RevealStep::Idle;
        };
        match self.mode {
            RevealMode::Simultaneous => {
                self.state = WorkerState::Stopped;
                RevealStep::All(cursor..self.len)
            }
            RevealMode::Staggered => {
                let next = cursor + 1;
                let more = next < self.len;
                self.state = if more {
                    WorkerState::Running { cursor: next }
                } else {
                    WorkerState::Stopped
                };
                RevealStep::One {
                    index: cursor,
                    more,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/worker.rs"]
mod tests;
