use crate::foundation::core::Size;

/// Environment the player runs in: container measurement and embedding capabilities.
pub trait Host {
    /// Current size of the container the viewport is fitted into. Zero while not laid out.
    fn container_size(&mut self) -> Size;

    fn prefers_reduced_motion(&self) -> bool {
        false
    }

    /// Trusted embedding contexts skip the unsafe-content gate.
    fn is_trusted_embedding(&self) -> bool {
        false
    }

    /// Fast-forward contexts (e.g. thumbnail capture) shorten every slide.
    fn is_fast_forward(&self) -> bool {
        false
    }

    /// Ask the device to lock its orientation. Returns whether the lock was applied.
    fn lock_orientation(&mut self) -> bool {
        false
    }
}

/// In-memory host for tests and the CLI.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessHost {
    pub container: Size,
    pub reduced_motion: bool,
    pub trusted_embedding: bool,
    pub fast_forward: bool,
    /// Polls that report an unmeasurable (zero) container before `container` shows up.
    pub unmeasured_polls: u32,
    pub orientation_locks: u32,
    pub polls: u32,
}

impl HeadlessHost {
    pub fn new(container: Size) -> Self {
        Self {
            container,
            reduced_motion: false,
            trusted_embedding: false,
            fast_forward: false,
            unmeasured_polls: 0,
            orientation_locks: 0,
            polls: 0,
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(Size::new(1020.0, 620.0))
    }
}

impl Host for HeadlessHost {
    fn container_size(&mut self) -> Size {
        self.polls += 1;
        if self.polls <= self.unmeasured_polls {
            return Size::ZERO;
        }
        self.container
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn is_trusted_embedding(&self) -> bool {
        self.trusted_embedding
    }

    fn is_fast_forward(&self) -> bool {
        self.fast_forward
    }

    fn lock_orientation(&mut self) -> bool {
        self.orientation_locks += 1;
        true
    }
}
