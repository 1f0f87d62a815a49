//! The playback controller: gates, slide selection, reveal animation and auto-advance, all driven
//! by named timers on a virtual clock.

use crate::{
    animation::apply::{apply_plan, mark_appeared, reset_animation},
    animation::cluster::{ObjectGeometry, RevealPlan, plan_reveal},
    animation::worker::{RevealMode, RevealStep, RevealWorker},
    config::PlayerConfig,
    foundation::core::{Millis, Size},
    foundation::error::{SlideError, SlideResult},
    layout::dom::Selector,
    layout::engine::{EnsureOptions, FadeProgress, LayoutEngine},
    layout::viewport::{ViewportParams, fit_viewport},
    model::presentation::{Position, Presentation},
    playback::events::{Event, EventBus, EventKind, SubscriptionId},
    playback::gates::{
        GateCache, GateKind, GateOutcome, PasswordAttempt, PasswordValidator, RejectAllValidator,
        UnsafeChoice,
    },
    playback::host::{HeadlessHost, Host},
    playback::timers::{TimerName, TimerQueue},
    render::element::{ElementRenderer, PlaceholderRenderer},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PlaybackState {
    Idle,
    Gating,
    Ready,
    Playing,
    Paused,
    Finished,
}

/// Keyboard shortcuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Key {
    Left,
    Right,
    Space,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    Measure { attempt: u32 },
    VisibleTick,
    FadeStep,
    BeforeAnimate,
    RevealTick,
    AfterAnimate,
    Advance,
    Resize,
}

/// Explicit player context: one per composition, no shared globals.
pub struct Player<H: Host = HeadlessHost> {
    config: PlayerConfig,
    host: H,
    validator: Box<dyn PasswordValidator>,
    engine: LayoutEngine,
    timers: TimerQueue<Task>,
    bus: EventBus,
    gates: GateCache,
    /// Id the gate responses are cached under; an unlocked payload keeps the locked id.
    gate_id: i64,
    presentation: Option<Presentation>,
    state: PlaybackState,
    pending_gate: Option<GateKind>,
    viewport_params: ViewportParams,
    current: Option<usize>,
    shown_slide: Option<i64>,
    pending_slide: Option<usize>,
    fade_step: Millis,
    plan: Option<RevealPlan>,
    last_hide: Millis,
    worker: RevealWorker,
    animation_done: bool,
    closing_view: bool,
    progress_visible: bool,
    pending_resize: Option<Size>,
}

impl<H: Host> std::fmt::Debug for Player<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.state)
            .field("current", &self.current)
            .field("now", &self.timers.now())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Player<H> {
    pub fn new(config: PlayerConfig, host: H) -> Self {
        let engine = LayoutEngine::new(&config, Box::new(PlaceholderRenderer));
        Self {
            config,
            host,
            validator: Box::new(RejectAllValidator),
            engine,
            timers: TimerQueue::new(),
            bus: EventBus::new(),
            gates: GateCache::default(),
            gate_id: 0,
            presentation: None,
            state: PlaybackState::Idle,
            pending_gate: None,
            viewport_params: ViewportParams::default(),
            current: None,
            shown_slide: None,
            pending_slide: None,
            fade_step: Millis::ZERO,
            plan: None,
            last_hide: Millis::ZERO,
            worker: RevealWorker::default(),
            animation_done: false,
            closing_view: false,
            progress_visible: false,
            pending_resize: None,
        }
    }

    pub fn with_validator(mut self, validator: Box<dyn PasswordValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ElementRenderer>) -> Self {
        self.engine = LayoutEngine::new(&self.config, renderer);
        self
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(kind, handler)
    }

    pub fn subscribe_all(&mut self, handler: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.bus.subscribe_all(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_slide(&self) -> Option<usize> {
        self.current
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut LayoutEngine {
        &mut self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn gates(&self) -> &GateCache {
        &self.gates
    }

    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_ref()
    }

    /// Reveal plan of the slide on screen, once computed.
    pub fn plan(&self) -> Option<&RevealPlan> {
        self.plan.as_ref()
    }

    pub fn viewport_params(&self) -> ViewportParams {
        self.viewport_params
    }

    pub fn closing_view(&self) -> bool {
        self.closing_view
    }

    pub fn progress_visible(&self) -> bool {
        self.progress_visible
    }

    pub fn pending_gate(&self) -> Option<GateKind> {
        self.pending_gate
    }

    /// Load a presentation and start the gating pipeline once the viewport is measurable.
    #[tracing::instrument(skip(self, presentation), fields(id = presentation.id))]
    pub fn select_infographic(&mut self, presentation: Presentation) -> SlideResult<()> {
        presentation.validate()?;
        self.reset()?;
        if self.host.lock_orientation() {
            tracing::debug!("orientation locked");
        }
        self.gate_id = presentation.id;
        self.presentation = Some(presentation);
        self.set_state(PlaybackState::Gating);
        self.measure_viewport(0)?;
        self.flush_engine_events();
        Ok(())
    }

    fn reset(&mut self) -> SlideResult<()> {
        self.timers.cancel_all();
        self.worker.stop();
        self.engine.clear_all()?;
        self.engine.drain_events();
        self.presentation = None;
        self.pending_gate = None;
        self.current = None;
        self.shown_slide = None;
        self.pending_slide = None;
        self.plan = None;
        self.last_hide = Millis::ZERO;
        self.animation_done = false;
        self.closing_view = false;
        self.set_state(PlaybackState::Idle);
        Ok(())
    }

    fn measure_viewport(&mut self, attempt: u32) -> SlideResult<()> {
        let size = self.host.container_size();
        let params = fit_viewport(size, self.config.aspect_ratio, self.config.viewport_gap_px);
        if !params.viewport().is_measurable() && attempt < self.config.measure_retries {
            self.timers.schedule(
                TimerName::Measure,
                self.config.measure_retry_interval,
                Task::Measure {
                    attempt: attempt + 1,
                },
            );
            return Ok(());
        }
        if !params.viewport().is_measurable() {
            tracing::warn!(attempt, "container never became measurable; proceeding");
        }
        self.apply_viewport(params);
        self.run_gates()
    }

    fn apply_viewport(&mut self, params: ViewportParams) {
        self.viewport_params = params;
        self.engine.set_viewport(params.viewport());
    }

    fn presentation_ref(&self) -> SlideResult<&Presentation> {
        self.presentation
            .as_ref()
            .ok_or_else(|| SlideError::playback("no presentation selected"))
    }

    #[tracing::instrument(skip(self))]
    fn run_gates(&mut self) -> SlideResult<()> {
        let p = self.presentation_ref()?;
        let password_protected = p.playback.password_protected;
        let unsigned: Vec<i64> = p
            .slides
            .iter()
            .filter(|s| s.has_unsigned_widgets())
            .map(|s| s.id)
            .collect();
        let autoplay = p.playback.autoplay;

        if password_protected {
            if !self.gates.password_passed(self.gate_id) {
                self.pending_gate = Some(GateKind::Password);
                self.bus.publish(Event::PasswordRequired {
                    attempt: self.gates.password_attempts(self.gate_id) + 1,
                });
                return Ok(());
            }
            self.publish_gate(GateKind::Password, GateOutcome::Passed);
        }

        if !unsigned.is_empty() {
            if self.host.is_trusted_embedding() {
                self.publish_gate(GateKind::UnsafeContent, GateOutcome::Bypassed);
            } else {
                match self.gates.unsafe_choice(self.gate_id) {
                    None => {
                        self.pending_gate = Some(GateKind::UnsafeContent);
                        self.bus
                            .publish(Event::UnsafeContentWarning { slide_ids: unsigned });
                        return Ok(());
                    }
                    Some(UnsafeChoice::Abort) => {
                        self.pending_gate = None;
                        self.publish_gate(GateKind::UnsafeContent, GateOutcome::Abort);
                        self.set_state(PlaybackState::Idle);
                        return Ok(());
                    }
                    Some(UnsafeChoice::Proceed) => {
                        self.publish_gate(GateKind::UnsafeContent, GateOutcome::Proceed);
                    }
                }
            }
        }

        self.pending_gate = None;
        self.set_state(PlaybackState::Ready);
        if autoplay {
            self.play()
        } else if self.slide_count() > 0 {
            self.select_slide(0)
        } else {
            Ok(())
        }
    }

    fn publish_gate(&mut self, gate: GateKind, outcome: GateOutcome) {
        tracing::debug!(?gate, ?outcome, "gate resolved");
        self.bus.publish(Event::GateResolved { gate, outcome });
    }

    /// Answer the open password prompt.
    pub fn submit_password(&mut self, password: &str) -> SlideResult<PasswordAttempt> {
        if self.pending_gate != Some(GateKind::Password) {
            return Err(SlideError::gate("no password prompt is open"));
        }
        let id = self.gate_id;
        let attempt = self
            .gates
            .submit_password(self.validator.as_mut(), id, password);
        match &attempt {
            PasswordAttempt::Accepted(payload) => {
                if let Some(unlocked) = payload {
                    unlocked.validate()?;
                    self.presentation = Some(Presentation::clone(unlocked));
                }
                self.run_gates()?;
            }
            PasswordAttempt::Cached => self.run_gates()?,
            PasswordAttempt::Rejected { attempt } => {
                self.bus.publish(Event::PasswordRejected { attempt: *attempt });
            }
        }
        self.flush_engine_events();
        Ok(attempt)
    }

    /// Answer the open unsafe-content warning.
    pub fn resolve_unsafe(&mut self, choice: UnsafeChoice) -> SlideResult<()> {
        if self.pending_gate != Some(GateKind::UnsafeContent) {
            return Err(SlideError::gate("no unsafe-content warning is open"));
        }
        self.gates.choose_unsafe(self.gate_id, choice);
        self.run_gates()?;
        self.flush_engine_events();
        Ok(())
    }

    fn set_state(&mut self, to: PlaybackState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(?from, ?to, "playback state");
        self.bus.publish(Event::StateChanged {
            from,
            to,
            at: self.timers.now(),
        });
        let visible = to == PlaybackState::Playing;
        if visible != self.progress_visible {
            self.progress_visible = visible;
            self.bus.publish(Event::ProgressVisibility { visible });
        }
    }

    fn slide_count(&self) -> usize {
        self.presentation.as_ref().map_or(0, |p| p.slides.len())
    }

    fn loop_playback(&self) -> bool {
        self.presentation
            .as_ref()
            .is_some_and(|p| p.playback.loop_playback)
    }

    fn ensure_navigable(&self) -> SlideResult<()> {
        match self.state {
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused => Ok(()),
            state => Err(SlideError::playback(format!(
                "navigation unavailable while {state:?}"
            ))),
        }
    }

    pub fn play(&mut self) -> SlideResult<()> {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Ready | PlaybackState::Paused => {
                self.set_state(PlaybackState::Playing);
                match self.current {
                    None if self.slide_count() == 0 => self.finish(),
                    None => self.select_slide(0)?,
                    Some(_) if self.animation_done => self.schedule_advance()?,
                    Some(_) => {}
                }
            }
            PlaybackState::Finished => self.restart()?,
            state => {
                return Err(SlideError::playback(format!("cannot play while {state:?}")));
            }
        }
        self.flush_engine_events();
        Ok(())
    }

    /// Stop auto-advance; the current slide stays on screen.
    pub fn pause(&mut self) -> SlideResult<()> {
        if self.state == PlaybackState::Playing {
            self.timers.cancel(TimerName::Playback);
            self.set_state(PlaybackState::Paused);
        }
        Ok(())
    }

    pub fn toggle(&mut self) -> SlideResult<()> {
        match self.state {
            PlaybackState::Playing => self.pause(),
            _ => self.play(),
        }
    }

    pub fn forward(&mut self) -> SlideResult<()> {
        self.ensure_navigable()?;
        self.next_or_finish()?;
        self.flush_engine_events();
        Ok(())
    }

    pub fn backward(&mut self) -> SlideResult<()> {
        self.ensure_navigable()?;
        let prev = self.current.map_or(0, |i| i.saturating_sub(1));
        self.select_slide(prev)?;
        self.flush_engine_events();
        Ok(())
    }

    pub fn jump_to(&mut self, index: usize) -> SlideResult<()> {
        self.ensure_navigable()?;
        self.select_slide(index)?;
        self.flush_engine_events();
        Ok(())
    }

    /// Leave the closing view and play again from the first slide.
    pub fn restart(&mut self) -> SlideResult<()> {
        if self.state != PlaybackState::Finished {
            return Err(SlideError::playback("restart is only available once finished"));
        }
        self.closing_view = false;
        self.clear_composition()?;
        self.set_state(PlaybackState::Ready);
        self.play()
    }

    /// Keyboard shortcut. Returns whether the key was handled.
    pub fn key(&mut self, key: Key) -> SlideResult<bool> {
        if self.closing_view || self.ensure_navigable().is_err() {
            return Ok(false);
        }
        match key {
            Key::Left => self.backward()?,
            Key::Right => self.forward()?,
            Key::Space => self.toggle()?,
        }
        Ok(true)
    }

    /// Container resized; applied after the debounce interval.
    pub fn notify_resize(&mut self, container: Size) {
        self.pending_resize = Some(container);
        self.timers
            .schedule(TimerName::Resize, self.config.resize_debounce, Task::Resize);
    }

    fn next_or_finish(&mut self) -> SlideResult<()> {
        let next = self.current.map_or(0, |i| i + 1);
        if next < self.slide_count() {
            self.select_slide(next)
        } else if self.loop_playback() {
            self.loop_restart()
        } else {
            self.finish();
            Ok(())
        }
    }

    fn loop_restart(&mut self) -> SlideResult<()> {
        let before = self.state;
        self.set_state(PlaybackState::Finished);
        self.clear_composition()?;
        self.set_state(PlaybackState::Ready);
        match before {
            PlaybackState::Playing => self.play(),
            PlaybackState::Paused => {
                self.select_slide(0)?;
                self.set_state(PlaybackState::Paused);
                Ok(())
            }
            _ => self.select_slide(0),
        }
    }

    fn clear_composition(&mut self) -> SlideResult<()> {
        self.cancel_slide_timers();
        self.timers.cancel(TimerName::FadeOut);
        self.engine.clear_all()?;
        self.current = None;
        self.shown_slide = None;
        self.pending_slide = None;
        self.plan = None;
        self.last_hide = Millis::ZERO;
        Ok(())
    }

    fn finish(&mut self) {
        self.cancel_slide_timers();
        self.pending_slide = None;
        self.closing_view = true;
        self.set_state(PlaybackState::Finished);
        let presentation_id = self.presentation.as_ref().map_or(0, |p| p.id);
        self.bus.publish(Event::Finished {
            presentation_id,
            at: self.timers.now(),
        });
    }

    fn cancel_slide_timers(&mut self) {
        for name in [
            TimerName::BeforeAnimate,
            TimerName::AfterAnimate,
            TimerName::Playback,
            TimerName::Reveal,
        ] {
            self.timers.cancel(name);
        }
        self.worker.stop();
        self.animation_done = false;
    }

    /// Show slide `index`: fade out the previous slide (unless replaying it), compose the new one
    /// and start its reveal.
    #[tracing::instrument(skip(self))]
    pub fn select_slide(&mut self, index: usize) -> SlideResult<()> {
        if index >= self.slide_count() {
            return Err(SlideError::validation(format!(
                "slide index {index} out of range ({} slides)",
                self.slide_count()
            )));
        }
        self.cancel_slide_timers();
        if self.pending_slide.is_some() {
            // The previous slide is still fading out; compose the latest request afterwards.
            self.pending_slide = Some(index);
            self.current = Some(index);
            return Ok(());
        }

        let replay = self.current == Some(index);
        self.current = Some(index);
        match self.shown_slide {
            Some(old) if !replay && self.last_hide > Millis::ZERO => {
                let fading = self.engine.remove_elements(&Selector::Slide(old), true)?;
                self.pending_slide = Some(index);
                if fading == 0 {
                    return self.finish_clear();
                }
                self.fade_step = Millis((self.last_hide.0 / fading as u64).max(1));
                self.timers
                    .schedule(TimerName::FadeOut, self.fade_step, Task::FadeStep);
                Ok(())
            }
            Some(old) => {
                self.engine.clear_slide(old)?;
                self.shown_slide = None;
                self.materialize(index)
            }
            None => self.materialize(index),
        }
    }

    fn finish_clear(&mut self) -> SlideResult<()> {
        if let Some(old) = self.shown_slide.take() {
            self.engine.clear_slide(old)?;
        }
        match self.pending_slide.take() {
            Some(index) => self.materialize(index),
            None => Ok(()),
        }
    }

    fn materialize(&mut self, index: usize) -> SlideResult<()> {
        let slide = self
            .presentation_ref()?
            .slides
            .get(index)
            .cloned()
            .ok_or_else(|| SlideError::validation(format!("slide index {index} out of range")))?;

        self.engine.ensure_slide(slide.id)?;
        for meta in slide.meta_elements() {
            self.engine.ensure_element(
                &meta,
                None,
                None,
                EnsureOptions {
                    draggable: false,
                    always_on_top: true,
                },
            )?;
        }
        for element in &slide.elements {
            self.engine.ensure_element(
                element,
                None,
                None,
                EnsureOptions {
                    draggable: element.position == Position::Free,
                    always_on_top: false,
                },
            )?;
        }
        self.engine.measure(slide.id)?;
        self.shown_slide = Some(slide.id);
        if self.engine.has_pending_visible() {
            self.timers
                .schedule(TimerName::VisibleTick, self.config.reveal_tick, Task::VisibleTick);
        }
        self.bus.publish(Event::SlideChanged {
            index,
            slide_id: slide.id,
            at: self.timers.now(),
        });
        self.animate()
    }

    fn animation_disabled(&self) -> bool {
        self.host.prefers_reduced_motion() || self.host.is_fast_forward()
    }

    fn animate(&mut self) -> SlideResult<()> {
        let Some(slide_id) = self.shown_slide else {
            return Ok(());
        };
        let Some(slide) = self.engine.slide_node(slide_id) else {
            return Ok(());
        };
        reset_animation(self.engine.document_mut(), slide)?;
        self.worker.stop();
        self.timers.cancel(TimerName::Reveal);
        self.plan = None;

        if self.animation_disabled() {
            let duration = self.config.disabled_animation_duration;
            self.start_reveal(RevealMode::Simultaneous, Some(duration))?;
            self.reveal_tick()?;
        } else {
            self.timers.schedule(
                TimerName::BeforeAnimate,
                self.config.before_animate,
                Task::BeforeAnimate,
            );
        }
        Ok(())
    }

    fn start_reveal(&mut self, mode: RevealMode, fixed: Option<Millis>) -> SlideResult<()> {
        let Some(slide_id) = self.shown_slide else {
            return Ok(());
        };
        let objects: Vec<ObjectGeometry> = self
            .engine
            .element_boxes(slide_id)
            .iter()
            .map(ObjectGeometry::from_box)
            .collect();
        let mut plan = plan_reveal(&objects, self.engine.viewport(), &self.config);
        if let Some(duration) = fixed {
            plan = plan.with_fixed_duration(duration);
        }
        apply_plan(self.engine.document_mut(), &plan)?;

        self.worker.set_mode(mode);
        self.worker.restart(plan.len());
        self.last_hide = plan.hide;
        self.timers
            .schedule(TimerName::AfterAnimate, plan.appear, Task::AfterAnimate);
        self.plan = Some(plan);
        Ok(())
    }

    fn reveal_tick(&mut self) -> SlideResult<()> {
        match self.worker.tick() {
            RevealStep::One { index, more } => {
                self.reveal(index)?;
                if more {
                    self.timers.schedule(
                        TimerName::Reveal,
                        self.config.reveal_cadence,
                        Task::RevealTick,
                    );
                }
            }
            RevealStep::All(range) => {
                for index in range {
                    self.reveal(index)?;
                }
            }
            RevealStep::Idle => {}
        }
        Ok(())
    }

    fn reveal(&mut self, index: usize) -> SlideResult<()> {
        let Some(object) = self.plan.as_ref().and_then(|p| p.objects.get(index)) else {
            return Ok(());
        };
        let (node, key) = (object.node, object.key);
        mark_appeared(self.engine.document_mut(), node)?;
        self.bus.publish(Event::AnimationStep {
            key,
            step: index,
            at: self.timers.now(),
        });
        Ok(())
    }

    fn schedule_advance(&mut self) -> SlideResult<()> {
        let index = self
            .current
            .ok_or_else(|| SlideError::playback("no slide to advance from"))?;
        let duration = if self.host.is_fast_forward() {
            self.config.fast_forward_duration
        } else {
            self.presentation_ref()?
                .slides
                .get(index)
                .map_or(self.config.default_slide_duration, |s| {
                    s.playback_duration(self.config.default_slide_duration)
                })
        };
        self.timers
            .schedule(TimerName::Playback, duration, Task::Advance);
        Ok(())
    }

    fn dispatch(&mut self, task: Task) -> SlideResult<()> {
        match task {
            Task::Measure { attempt } => self.measure_viewport(attempt),
            Task::VisibleTick => self.engine.flush_visible().map(|_| ()),
            Task::FadeStep => match self.engine.complete_fade()? {
                FadeProgress::Next(_) => {
                    self.timers
                        .schedule(TimerName::FadeOut, self.fade_step, Task::FadeStep);
                    Ok(())
                }
                FadeProgress::Done | FadeProgress::Idle => self.finish_clear(),
            },
            Task::BeforeAnimate => {
                self.start_reveal(RevealMode::Staggered, None)?;
                if self.worker.is_running() {
                    self.timers
                        .schedule(TimerName::Reveal, Millis::ZERO, Task::RevealTick);
                }
                Ok(())
            }
            Task::RevealTick => self.reveal_tick(),
            Task::AfterAnimate => {
                self.animation_done = true;
                if self.state == PlaybackState::Playing {
                    self.schedule_advance()?;
                }
                Ok(())
            }
            Task::Advance => self.next_or_finish(),
            Task::Resize => {
                let Some(container) = self.pending_resize.take() else {
                    return Ok(());
                };
                let params =
                    fit_viewport(container, self.config.aspect_ratio, self.config.viewport_gap_px);
                self.apply_viewport(params);
                self.engine.refresh_all()?;
                if let Some(slide_id) = self.shown_slide {
                    self.engine.measure(slide_id)?;
                }
                Ok(())
            }
        }
    }

    /// Run every timer due within `by` from now.
    pub fn advance(&mut self, by: Millis) -> SlideResult<()> {
        self.advance_to(self.timers.now().saturating_add(by))
    }

    /// Run every timer due at or before `until`, in deadline order, then move the clock there.
    pub fn advance_to(&mut self, until: Millis) -> SlideResult<()> {
        while let Some(fired) = self.timers.pop_due(until) {
            tracing::trace!(at = %fired.at, name = ?fired.name, "timer");
            self.dispatch(fired.task)?;
            self.flush_engine_events();
        }
        self.timers.advance_clock(until);
        Ok(())
    }

    fn flush_engine_events(&mut self) {
        for event in self.engine.drain_events() {
            self.bus.publish(event);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
