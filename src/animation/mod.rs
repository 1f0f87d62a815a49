//! Reveal animation: spatial clustering, timing model, the stagger worker and the DOM pass.

pub(crate) mod apply;
pub(crate) mod cluster;
pub(crate) mod timing;
pub(crate) mod worker;
