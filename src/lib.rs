//! Slideflow composes declarative slide documents into a live, animated composition and drives
//! timed playback across slides.
//!
//! # Overview
//!
//! 1. **Model**: a [`Presentation`] is plain data loaded from JSON. Each [`Element`] declares a
//!    [`Position`] and an open-ended property bag, decoded into typed [`ElementProps`].
//! 2. **Layout**: the [`LayoutEngine`] materializes elements into an arena [`Document`]: shared
//!    stacks for left/center/right, per-element wrappers for top/bottom, ratio-scaled free
//!    placement. A geometry pass measures every node against the fitted viewport.
//! 3. **Reveal**: [`plan_reveal`] clusters measured boxes into computed stacks and derives the
//!    reveal order and durations. [`RevealWorker`] sequences the reveal.
//! 4. **Playback**: the [`Player`] runs the password and unsafe-content gates, selects slides,
//!    animates them and auto-advances, all on named timers over a virtual clock.
//!
//! Everything runs on one cooperative thread. Time only moves when the driver calls
//! [`Player::advance`], which makes every timer-driven behavior deterministic.
#![forbid(unsafe_code)]

mod animation;
mod config;
mod foundation;
mod layout;
mod model;
mod playback;
mod render;

pub use animation::apply::{
    CLASS_ANIMATE_AFTER_PREFIX, CLASS_ANIMATE_APPEAR, CLASS_CSTACK_PREFIX, apply_plan,
    mark_appeared, reset_animation,
};
pub use animation::cluster::{
    AnimationObject, ClusterParams, ComputedStack, Flow, ObjectGeometry, ObjectRole, Quadrant,
    RevealPlan, cell_candidates, cluster, plan_reveal,
};
pub use animation::timing::{RevealTiming, TimedContent, reveal_timing};
pub use animation::worker::{RevealMode, RevealStep, RevealWorker, WorkerState};
pub use config::{PlayerConfig, TimingConfig};
pub use foundation::core::{ElementKey, Millis, Point, Rect, Size, Vec2, Viewport};
pub use foundation::error::{SlideError, SlideResult};
pub use layout::dom::{
    ATTR_ELEMENT_ID, ATTR_ORDER, ATTR_SLIDE_ID, CLASS_DRAGGED, CLASS_ELEVATION_PREFIX,
    CLASS_HAS_ELEVATION, CLASS_REMOVING, CLASS_STACK_ITEM, CLASS_STACK_META, CLASS_VISIBLE,
    Document, Node, NodeId, NodeKind, NodeSnapshot, Placement, Selector,
};
pub use layout::drag::{MoveTarget, MoveTargetGroup};
pub use layout::engine::{ElementBox, EnsureOptions, FadeProgress, Initializer, LayoutEngine};
pub use layout::stacks::{MoveOutcome, OrderChange};
pub use layout::viewport::{ViewportParams, fit_viewport};
pub use model::presentation::{
    DESCRIPTION_ELEMENT_ID, Element, ElementKind, Offset, PlaybackSettings, Position,
    Presentation, Property, Slide, TITLE_ELEMENT_ID,
};
pub use model::props::{
    CalloutProps, ChartProps, DataGrid, ElementProps, ImageProps, MapProps, MetaProps,
    ProgressProps, PropertyBag, TableProps, TextProps, TimelineProps, WidgetProps,
};
pub use playback::controller::{Key, PlaybackState, Player};
pub use playback::events::{Event, EventBus, EventKind, SubscriptionId};
pub use playback::gates::{
    FixedPasswordValidator, GateCache, GateKind, GateOutcome, PasswordAttempt,
    PasswordValidator, RejectAllValidator, UnsafeChoice,
};
pub use playback::host::{HeadlessHost, Host};
pub use playback::queue::SequentialQueue;
pub use playback::timers::{Fired, TimerName, TimerQueue};
pub use render::element::{ElementRenderer, PlaceholderRenderer, RenderOutput};
