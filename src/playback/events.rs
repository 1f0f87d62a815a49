//! Typed publish/subscribe keyed by a closed set of event kinds.

use crate::{
    foundation::core::{ElementKey, Millis},
    playback::controller::PlaybackState,
    playback::gates::{GateKind, GateOutcome},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum EventKind {
    LayoutChanged,
    SlideChanged,
    StateChanged,
    AnimationStep,
    PasswordRequired,
    PasswordRejected,
    UnsafeContentWarning,
    GateResolved,
    Finished,
    ProgressVisibility,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// The composed tree of a slide changed structurally (or the whole composition when `None`).
    LayoutChanged { slide_id: Option<i64> },
    SlideChanged {
        index: usize,
        slide_id: i64,
        at: Millis,
    },
    StateChanged {
        from: PlaybackState,
        to: PlaybackState,
        at: Millis,
    },
    /// One element of the reveal sequence appeared.
    AnimationStep {
        key: ElementKey,
        step: usize,
        at: Millis,
    },
    PasswordRequired { attempt: u32 },
    PasswordRejected { attempt: u32 },
    UnsafeContentWarning { slide_ids: Vec<i64> },
    GateResolved { gate: GateKind, outcome: GateOutcome },
    Finished { presentation_id: i64, at: Millis },
    ProgressVisibility { visible: bool },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::LayoutChanged { .. } => EventKind::LayoutChanged,
            Self::SlideChanged { .. } => EventKind::SlideChanged,
            Self::StateChanged { .. } => EventKind::StateChanged,
            Self::AnimationStep { .. } => EventKind::AnimationStep,
            Self::PasswordRequired { .. } => EventKind::PasswordRequired,
            Self::PasswordRejected { .. } => EventKind::PasswordRejected,
            Self::UnsafeContentWarning { .. } => EventKind::UnsafeContentWarning,
            Self::GateResolved { .. } => EventKind::GateResolved,
            Self::Finished { .. } => EventKind::Finished,
            Self::ProgressVisibility { .. } => EventKind::ProgressVisibility,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Event)>;

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: Handler,
}

/// Synchronous event bus. Handlers run in subscription order during [`EventBus::publish`].
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
    published: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .field("published", &self.published)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event of `kind`.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + 'static,
    ) -> SubscriptionId {
        self.add(Some(kind), Box::new(handler))
    }

    /// Receive every event regardless of kind.
    pub fn subscribe_all(&mut self, handler: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.add(None, Box::new(handler))
    }

    fn add(&mut self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, handler });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn publish(&mut self, event: Event) {
        let kind = event.kind();
        tracing::trace!(?kind, "publish");
        self.published += 1;
        for sub in &mut self.subscriptions {
            if sub.kind.is_none_or(|k| k == kind) {
                (sub.handler)(&event);
            }
        }
    }

    pub fn published(&self) -> u64 {
        self.published
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/events.rs"]
mod tests;
