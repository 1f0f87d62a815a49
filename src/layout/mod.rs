pub(crate) mod dom;
pub(crate) mod drag;
pub(crate) mod engine;
pub(crate) mod geometry;
pub(crate) mod stacks;
pub(crate) mod viewport;
