//! The layout engine: owns the composed tree and every structural operation on it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::{
    config::PlayerConfig,
    foundation::core::{ElementKey, Point, Rect, Size, Viewport},
    foundation::error::{SlideError, SlideResult},
    layout::dom::{
        ATTR_ELEMENT_ID, ATTR_SLIDE_ID, CLASS_DRAGGED, CLASS_REMOVING, CLASS_VISIBLE, Document,
        NodeId, NodeKind, NodeSnapshot, Placement, Selector,
    },
    layout::drag::{MoveTarget, MoveTargetGroup},
    layout::geometry::measure_slide,
    layout::stacks::{self, MoveOutcome},
    model::presentation::{Element, Offset, Position},
    playback::events::Event,
    playback::queue::SequentialQueue,
    render::element::ElementRenderer,
};

/// Box used for an element whose renderer failed.
const ERROR_BOX: Size = Size::new(240.0, 40.0);

/// Options of [`LayoutEngine::ensure_element`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnsureOptions {
    /// Attach the drag subsystem when the node is created.
    pub draggable: bool,
    /// Place ahead of ordered top/bottom wrappers (title and description).
    pub always_on_top: bool,
}

/// Hook run once on a freshly created node, before positioning.
pub type Initializer<'a> = &'a dyn Fn(&mut Document, NodeId) -> SlideResult<()>;

/// Arguments a node was last materialized with.
#[derive(Clone, Debug, PartialEq)]
struct RememberedState {
    element: Element,
    options: EnsureOptions,
}

/// Progress of the sequential fade-out queue after one fade completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeProgress {
    /// Nothing was fading.
    Idle,
    /// The next queued node started fading.
    Next(NodeId),
    /// The queue drained; stacks were cleaned and one layout notification was emitted.
    Done,
}

/// A measured element, as consumed by the reveal clusterer.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementBox {
    pub node: NodeId,
    pub element: Element,
    pub rect: Rect,
}

pub struct LayoutEngine {
    doc: Document,
    slides: BTreeMap<i64, NodeId>,
    viewport: Viewport,
    stack_gap: f64,
    drag_threshold: f64,
    renderer: Box<dyn ElementRenderer>,
    remembered: HashMap<NodeId, RememberedState>,
    draggable: HashSet<NodeId>,
    pending_visible: Vec<NodeId>,
    removals: SequentialQueue<NodeId>,
    removal_slides: BTreeSet<i64>,
    fades_completed: u64,
    drag: Option<MoveTargetGroup>,
    events: Vec<Event>,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("slides", &self.slides)
            .field("viewport", &self.viewport)
            .field("remembered", &self.remembered.len())
            .field("removals", &self.removals.len())
            .finish_non_exhaustive()
    }
}

impl LayoutEngine {
    pub fn new(config: &PlayerConfig, renderer: Box<dyn ElementRenderer>) -> Self {
        Self {
            doc: Document::new(),
            slides: BTreeMap::new(),
            viewport: Viewport::default(),
            stack_gap: config.stack_gap_px,
            drag_threshold: config.drag_threshold_px,
            renderer,
            remembered: HashMap::new(),
            draggable: HashSet::new(),
            pending_visible: Vec::new(),
            removals: SequentialQueue::new(),
            removal_slides: BTreeSet::new(),
            fades_completed: 0,
            drag: None,
            events: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Direct tree access for collaborators that decorate nodes (animation classes).
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the viewport. Callers refresh placements with [`LayoutEngine::refresh_all`].
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn slide_node(&self, slide_id: i64) -> Option<NodeId> {
        self.slides
            .get(&slide_id)
            .copied()
            .filter(|n| self.doc.is_alive(*n))
    }

    pub fn ensure_slide(&mut self, slide_id: i64) -> SlideResult<NodeId> {
        if let Some(node) = self.slide_node(slide_id) {
            return Ok(node);
        }
        let node = self.doc.create(NodeKind::Slide);
        self.doc.set_attr(node, ATTR_SLIDE_ID, slide_id.to_string())?;
        let root = self.doc.root();
        self.doc.append(root, node)?;
        self.slides.insert(slide_id, node);
        Ok(node)
    }

    /// Idempotent upsert of an element node: stamp identity, position, render, remember.
    #[tracing::instrument(skip(self, element, initializer), fields(key = ?element.key()))]
    pub fn ensure_element(
        &mut self,
        element: &Element,
        existing: Option<NodeId>,
        initializer: Option<Initializer<'_>>,
        options: EnsureOptions,
    ) -> SlideResult<NodeId> {
        let slide = self.ensure_slide(element.slide_id)?;
        let found = existing
            .filter(|n| self.doc.is_alive(*n))
            .or_else(|| self.doc.find_element(slide, element.key()));
        let (node, created) = match found {
            Some(node) => (node, false),
            None => (self.doc.create(NodeKind::Element), true),
        };

        self.doc
            .set_attr(node, ATTR_ELEMENT_ID, element.id.to_string())?;
        self.doc
            .set_attr(node, ATTR_SLIDE_ID, element.slide_id.to_string())?;
        if created {
            self.doc
                .add_class(node, format!("element-{}", element.kind.as_str()))?;
            if let Some(init) = initializer {
                init(&mut self.doc, node)?;
            }
        }

        stacks::update_element_position(
            &mut self.doc,
            slide,
            node,
            element,
            options.always_on_top,
            self.viewport,
        )?;
        self.render_into(node, element)?;

        if created && options.draggable {
            self.draggable.insert(node);
        }
        self.remembered.insert(
            node,
            RememberedState {
                element: element.clone(),
                options,
            },
        );
        if !self.doc.has_class(node, CLASS_VISIBLE) && !self.pending_visible.contains(&node) {
            self.pending_visible.push(node);
        }
        Ok(node)
    }

    fn render_into(&mut self, node: NodeId, element: &Element) -> SlideResult<()> {
        let props = element.props();
        let rendered = self.renderer.render(element, &props, self.viewport);
        let n = self.doc.node_mut(node)?;
        match rendered {
            Ok(out) => {
                n.intrinsic = out.size;
                n.content = Some(out.content);
                n.error = None;
            }
            Err(err) => {
                tracing::warn!(key = ?element.key(), error = %err, "element render failed");
                n.intrinsic = ERROR_BOX;
                n.content = Some(format!("Error: {err}"));
                n.error = Some(err.to_string());
            }
        }
        Ok(())
    }

    pub fn has_pending_visible(&self) -> bool {
        !self.pending_visible.is_empty()
    }

    /// Deferred tick: mark every freshly positioned node visible. Returns how many were marked.
    pub fn flush_visible(&mut self) -> SlideResult<usize> {
        let mut marked = 0;
        for node in std::mem::take(&mut self.pending_visible) {
            if self.doc.is_alive(node) {
                self.doc.add_class(node, CLASS_VISIBLE)?;
                marked += 1;
            }
        }
        Ok(marked)
    }

    /// Re-materialize `node` from its remembered arguments.
    pub fn refresh_element(&mut self, node: NodeId) -> SlideResult<()> {
        let Some(state) = self.remembered.get(&node).cloned() else {
            return Err(SlideError::layout(format!("no remembered state for {node:?}")));
        };
        if !self.is_attached(node) {
            self.forget(node);
            return Err(SlideError::layout(format!("stale node {node:?}")));
        }
        self.ensure_element(&state.element, Some(node), None, state.options)?;
        Ok(())
    }

    /// Re-run placement for every remembered node (e.g. after a viewport change).
    pub fn refresh_all(&mut self) -> SlideResult<usize> {
        self.prune_remembered();
        let mut nodes: Vec<NodeId> = self.remembered.keys().copied().collect();
        nodes.sort();
        for node in &nodes {
            self.refresh_element(*node)?;
        }
        Ok(nodes.len())
    }

    /// Drop remembered entries whose node is gone or no longer attached.
    pub fn prune_remembered(&mut self) -> usize {
        let stale: Vec<NodeId> = self
            .remembered
            .keys()
            .copied()
            .filter(|n| !self.is_attached(*n))
            .collect();
        for node in &stale {
            self.forget(*node);
        }
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "pruned stale remembered state");
        }
        stale.len()
    }

    pub fn remembered_len(&self) -> usize {
        self.remembered.len()
    }

    pub fn remembered_element(&self, node: NodeId) -> Option<&Element> {
        self.remembered.get(&node).map(|s| &s.element)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let mut cur = node;
        loop {
            if !self.doc.is_alive(cur) {
                return false;
            }
            if cur == self.doc.root() {
                return true;
            }
            match self.doc.parent(cur) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    fn forget(&mut self, node: NodeId) {
        self.remembered.remove(&node);
        self.draggable.remove(&node);
        self.pending_visible.retain(|n| *n != node);
    }

    /// Swap `node`'s order with its neighbor in the direction of `delta`.
    pub fn move_element(&mut self, node: NodeId, delta: i32) -> SlideResult<Option<MoveOutcome>> {
        let slide_id = self
            .remembered_element(node)
            .map(|e| e.slide_id)
            .ok_or_else(|| SlideError::layout(format!("unknown element node {node:?}")))?;
        let slide = self
            .slide_node(slide_id)
            .ok_or_else(|| SlideError::layout(format!("slide {slide_id} is not composed")))?;
        let Some(outcome) = stacks::move_element(&mut self.doc, slide, node, delta)? else {
            return Ok(None);
        };
        for change in [outcome.moved, outcome.neighbor] {
            if let Some(n) = self.doc.find_element(slide, change.key)
                && let Some(state) = self.remembered.get_mut(&n)
            {
                state.element.order = change.new_order;
            }
        }
        self.events.push(Event::LayoutChanged {
            slide_id: Some(slide_id),
        });
        Ok(Some(outcome))
    }

    /// Remove every element matching `selector`.
    ///
    /// With `indicate`, nodes fade out one at a time: the first starts now and each
    /// [`LayoutEngine::complete_fade`] removes the in-flight node and starts the next.
    #[tracing::instrument(skip(self))]
    pub fn remove_elements(&mut self, selector: &Selector, indicate: bool) -> SlideResult<usize> {
        let nodes = self.doc.select(self.doc.root(), selector);
        if nodes.is_empty() {
            return Ok(0);
        }
        if indicate {
            for node in &nodes {
                if let Some(slide_id) = self.slide_of(*node) {
                    self.removal_slides.insert(slide_id);
                }
                if self.removals.submit(*node) {
                    self.doc.add_class(*node, CLASS_REMOVING)?;
                }
            }
            return Ok(nodes.len());
        }

        let mut touched = BTreeSet::new();
        for node in &nodes {
            if let Some(slide_id) = self.slide_of(*node) {
                touched.insert(slide_id);
            }
            self.remove_node(*node)?;
        }
        self.finish_removal(touched)?;
        Ok(nodes.len())
    }

    pub fn fading(&self) -> Option<NodeId> {
        self.removals.in_flight().copied()
    }

    pub fn fades_completed(&self) -> u64 {
        self.fades_completed
    }

    /// Completion callback of the in-flight fade.
    pub fn complete_fade(&mut self) -> SlideResult<FadeProgress> {
        let Some(done) = self.removals.complete() else {
            return Ok(FadeProgress::Idle);
        };
        self.fades_completed += 1;
        if self.doc.is_alive(done) {
            self.remove_node(done)?;
        }
        // Nodes removed by other means while queued are skipped.
        while let Some(&next) = self.removals.in_flight() {
            if self.doc.is_alive(next) {
                self.doc.add_class(next, CLASS_REMOVING)?;
                return Ok(FadeProgress::Next(next));
            }
            self.removals.complete();
        }
        let touched = std::mem::take(&mut self.removal_slides);
        self.finish_removal(touched)?;
        Ok(FadeProgress::Done)
    }

    fn finish_removal(&mut self, touched: BTreeSet<i64>) -> SlideResult<()> {
        for slide_id in &touched {
            if let Some(slide) = self.slide_node(*slide_id) {
                stacks::clean_stacks(&mut self.doc, slide)?;
            }
        }
        let slide_id = match touched.len() {
            1 => touched.first().copied(),
            _ => None,
        };
        self.events.push(Event::LayoutChanged { slide_id });
        Ok(())
    }

    fn slide_of(&self, node: NodeId) -> Option<i64> {
        self.remembered
            .get(&node)
            .map(|s| s.element.slide_id)
            .or_else(|| {
                self.doc
                    .attr(node, ATTR_SLIDE_ID)
                    .and_then(|v| v.parse().ok())
            })
    }

    fn remove_node(&mut self, node: NodeId) -> SlideResult<()> {
        for freed in self.doc.remove(node)? {
            self.forget(freed);
        }
        Ok(())
    }

    /// Tear down a whole slide, forgetting every node in it.
    pub fn clear_slide(&mut self, slide_id: i64) -> SlideResult<bool> {
        let Some(slide) = self.slides.remove(&slide_id) else {
            return Ok(false);
        };
        if !self.doc.is_alive(slide) {
            return Ok(false);
        }
        self.remove_node(slide)?;
        self.removal_slides.remove(&slide_id);
        tracing::debug!(
            slide_id,
            live = self.doc.len(),
            slots = self.doc.slot_count(),
            "slide cleared"
        );
        self.events.push(Event::LayoutChanged {
            slide_id: Some(slide_id),
        });
        Ok(true)
    }

    /// Tear down every slide and cancel pending fades.
    pub fn clear_all(&mut self) -> SlideResult<()> {
        self.removals.clear();
        self.removal_slides.clear();
        self.drag = None;
        let ids: Vec<i64> = self.slides.keys().copied().collect();
        for id in ids {
            self.clear_slide(id)?;
        }
        Ok(())
    }

    /// Geometry pass for one slide.
    pub fn measure(&mut self, slide_id: i64) -> SlideResult<()> {
        let slide = self
            .slide_node(slide_id)
            .ok_or_else(|| SlideError::layout(format!("slide {slide_id} is not composed")))?;
        measure_slide(&mut self.doc, slide, self.viewport, self.stack_gap)
    }

    /// Measured boxes of a slide's elements, in tree order.
    pub fn element_boxes(&self, slide_id: i64) -> Vec<ElementBox> {
        let Some(slide) = self.slide_node(slide_id) else {
            return Vec::new();
        };
        self.doc
            .select(slide, &Selector::AllElements)
            .into_iter()
            .filter_map(|node| {
                let state = self.remembered.get(&node)?;
                let rect = self.doc.get(node)?.rect;
                Some(ElementBox {
                    node,
                    element: state.element.clone(),
                    rect,
                })
            })
            .collect()
    }

    pub fn snapshot(&self, slide_id: i64) -> Option<NodeSnapshot> {
        self.slide_node(slide_id).and_then(|n| self.doc.snapshot(n))
    }

    /// Start dragging a free, draggable node; `shadows` follow its deltas.
    pub fn begin_drag(&mut self, node: NodeId, pointer: Point, shadows: &[NodeId]) -> SlideResult<()> {
        let origin = self.free_origin(node)?;
        let mut followers = Vec::with_capacity(shadows.len());
        for shadow in shadows.iter().filter(|s| **s != node) {
            followers.push((*shadow, self.free_origin(*shadow)?));
        }
        let anchor = MoveTarget::begin_move(node, origin, pointer, self.drag_threshold);
        self.drag = Some(MoveTargetGroup::new(anchor, followers));
        Ok(())
    }

    fn free_origin(&self, node: NodeId) -> SlideResult<Point> {
        if !self.draggable.contains(&node) {
            return Err(SlideError::layout(format!("{node:?} is not draggable")));
        }
        match self.remembered_element(node) {
            Some(e) if e.position == Position::Free => Ok(self.doc.node(node)?.rect.origin()),
            _ => Err(SlideError::layout(format!(
                "{node:?} is not a free element"
            ))),
        }
    }

    /// Pointer moved. Returns whether the drag is engaged (past the threshold).
    pub fn drag_to(&mut self, pointer: Point) -> SlideResult<bool> {
        let Some(group) = self.drag.as_mut() else {
            return Ok(false);
        };
        let Some(positions) = group.move_to(pointer) else {
            return Ok(false);
        };
        for (node, p) in positions {
            self.doc.add_class(node, CLASS_DRAGGED)?;
            let n = self.doc.node_mut(node)?;
            n.placement = Some(Placement::Px {
                left: p.x,
                top: p.y,
            });
            n.rect = Rect::from_origin_size(p, n.rect.size());
        }
        Ok(true)
    }

    /// Finish the drag. Returns the new offsets (with the current viewport snapshot) of every moved
    /// node; empty when the pointer never crossed the threshold.
    pub fn end_drag(&mut self) -> SlideResult<Vec<(ElementKey, Offset)>> {
        let Some(group) = self.drag.take() else {
            return Ok(Vec::new());
        };
        let nodes = group.nodes();
        let Some(positions) = group.end_move() else {
            return Ok(Vec::new());
        };
        for node in nodes {
            self.doc.remove_class(node, CLASS_DRAGGED)?;
        }
        let mut moved = Vec::with_capacity(positions.len());
        let mut slide_id = None;
        for (node, p) in positions {
            let offset = Offset {
                left: p.x,
                top: p.y,
                viewport: Some(self.viewport),
            };
            if let Some(state) = self.remembered.get_mut(&node) {
                state.element.offset = Some(offset);
                slide_id = Some(state.element.slide_id);
                moved.push((state.element.key(), offset));
            }
        }
        self.events.push(Event::LayoutChanged { slide_id });
        Ok(moved)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|g| g.anchor().is_dragging())
    }

    /// Take the notifications accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
