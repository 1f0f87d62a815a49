use std::collections::VecDeque;

/// Minimal sequential task queue: exactly one task in flight, the next one starts only when the
/// in-flight task reports completion.
#[derive(Clone, Debug)]
pub struct SequentialQueue<T> {
    in_flight: Option<T>,
    waiting: VecDeque<T>,
    started: u64,
    completed: u64,
}

impl<T> Default for SequentialQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SequentialQueue<T> {
    pub fn new() -> Self {
        Self {
            in_flight: None,
            waiting: VecDeque::new(),
            started: 0,
            completed: 0,
        }
    }

    /// Enqueue a task. Returns `true` when it started immediately.
    pub fn submit(&mut self, task: T) -> bool {
        if self.in_flight.is_none() {
            self.in_flight = Some(task);
            self.started += 1;
            true
        } else {
            self.waiting.push_back(task);
            false
        }
    }

    /// Mark the in-flight task done and start the next one. Returns the finished task.
    pub fn complete(&mut self) -> Option<T> {
        let done = self.in_flight.take()?;
        self.completed += 1;
        if let Some(next) = self.waiting.pop_front() {
            self.in_flight = Some(next);
            self.started += 1;
        }
        Some(done)
    }

    pub fn in_flight(&self) -> Option<&T> {
        self.in_flight.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }

    /// In-flight plus waiting tasks.
    pub fn len(&self) -> usize {
        self.waiting.len() + usize::from(self.in_flight.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn started(&self) -> u64 {
        self.started
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Drop every task, including the in-flight one.
    pub fn clear(&mut self) {
        self.in_flight = None;
        self.waiting.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/queue.rs"]
mod tests;
