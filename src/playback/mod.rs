pub(crate) mod controller;
pub(crate) mod events;
pub(crate) mod gates;
pub(crate) mod host;
pub(crate) mod queue;
pub(crate) mod timers;
