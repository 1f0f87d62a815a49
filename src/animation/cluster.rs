//! Spatial clustering of a slide's elements into computed stacks for the reveal order.
//!
//! Everything here is a pure function over [`ObjectGeometry`] records; no tree access.

use std::collections::HashMap;

use smallvec::{SmallVec, smallvec};

use crate::{
    animation::timing::{RevealTiming, TimedContent, reveal_timing},
    config::PlayerConfig,
    foundation::core::{ElementKey, Millis, Point, Rect, Viewport},
    layout::dom::NodeId,
    layout::engine::ElementBox,
    model::presentation::{DESCRIPTION_ELEMENT_ID, ElementKind, TITLE_ELEMENT_ID},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Quadrant {
    TopLeft,
    Center,
    BottomRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Flow {
    Vertical,
    Horizontal,
}

/// Animation-only grouping: a quadrant bias plus a flow axis. Vertical stacks are the viewport
/// columns, horizontal stacks its rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct ComputedStack {
    pub quadrant: Quadrant,
    pub flow: Flow,
}

impl ComputedStack {
    pub const TOP_LEFT_VERTICAL: Self = Self::new(Quadrant::TopLeft, Flow::Vertical);
    pub const TOP_LEFT_HORIZONTAL: Self = Self::new(Quadrant::TopLeft, Flow::Horizontal);
    pub const CENTER_VERTICAL: Self = Self::new(Quadrant::Center, Flow::Vertical);
    pub const CENTER_HORIZONTAL: Self = Self::new(Quadrant::Center, Flow::Horizontal);
    pub const BOTTOM_RIGHT_VERTICAL: Self = Self::new(Quadrant::BottomRight, Flow::Vertical);
    pub const BOTTOM_RIGHT_HORIZONTAL: Self = Self::new(Quadrant::BottomRight, Flow::Horizontal);

    pub const fn new(quadrant: Quadrant, flow: Flow) -> Self {
        Self { quadrant, flow }
    }

    pub fn name(self) -> &'static str {
        match (self.quadrant, self.flow) {
            (Quadrant::TopLeft, Flow::Vertical) => "topleft-vertical",
            (Quadrant::TopLeft, Flow::Horizontal) => "topleft-horizontal",
            (Quadrant::Center, Flow::Vertical) => "center-vertical",
            (Quadrant::Center, Flow::Horizontal) => "center-horizontal",
            (Quadrant::BottomRight, Flow::Vertical) => "bottomright-vertical",
            (Quadrant::BottomRight, Flow::Horizontal) => "bottomright-horizontal",
        }
    }

    /// `cstack-<quadrant>-<flow>`
    pub fn class_name(self) -> String {
        format!("cstack-{}", self.name())
    }
}

/// Semantic role that overrides geometric ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ObjectRole {
    Title,
    Description,
    Content,
}

/// Rendered box of one element, relative to the viewport.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ObjectGeometry {
    pub node: NodeId,
    pub key: ElementKey,
    pub role: ObjectRole,
    pub rect: Rect,
    pub content: TimedContent,
}

impl ObjectGeometry {
    pub fn from_box(b: &ElementBox) -> Self {
        let role = match (b.element.id, &b.element.kind) {
            (TITLE_ELEMENT_ID, _) | (_, ElementKind::Title) => ObjectRole::Title,
            (DESCRIPTION_ELEMENT_ID, _) | (_, ElementKind::Description) => ObjectRole::Description,
            _ => ObjectRole::Content,
        };
        Self {
            node: b.node,
            key: b.element.key(),
            role,
            rect: b.rect,
            content: TimedContent::from_props(&b.element.props()),
        }
    }

    fn center(&self) -> Point {
        self.rect.center()
    }
}

/// One element classified into computed stacks.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AnimationObject {
    pub node: NodeId,
    pub key: ElementKey,
    pub role: ObjectRole,
    pub rect: Rect,
    /// Grid cell `(column, row)` of the box center.
    pub cell: (usize, usize),
    pub candidates: SmallVec<[ComputedStack; 2]>,
    /// Resolved stack; always one of `candidates`.
    pub stack: ComputedStack,
}

/// Thresholds of the clustering heuristics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterParams {
    pub center_proximity: f64,
    pub mid_proximity: f64,
}

impl From<&PlayerConfig> for ClusterParams {
    fn from(cfg: &PlayerConfig) -> Self {
        Self {
            center_proximity: cfg.center_proximity_px,
            mid_proximity: cfg.mid_proximity_px,
        }
    }
}

/// Ordered reveal of one slide plus its durations.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RevealPlan {
    pub objects: Vec<AnimationObject>,
    pub appear: Millis,
    pub hide: Millis,
}

impl RevealPlan {
    pub fn keys(&self) -> Vec<ElementKey> {
        self.objects.iter().map(|o| o.key).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Stacks in first-appearance order with their members.
    pub fn stacks(&self) -> Vec<(ComputedStack, Vec<ElementKey>)> {
        let mut out: Vec<(ComputedStack, Vec<ElementKey>)> = Vec::new();
        for o in &self.objects {
            match out.iter_mut().find(|(s, _)| *s == o.stack) {
                Some((_, members)) => members.push(o.key),
                None => out.push((o.stack, vec![o.key])),
            }
        }
        out
    }

    /// Flat disabled-animation plan: same order, fixed durations.
    pub fn with_fixed_duration(mut self, duration: Millis) -> Self {
        self.appear = duration;
        self.hide = duration;
        self
    }
}

/// Candidate stacks of a grid cell, primary first.
pub fn cell_candidates(column: usize, row: usize) -> SmallVec<[ComputedStack; 2]> {
    use ComputedStack as S;
    let vertical = match column {
        0 => S::TOP_LEFT_VERTICAL,
        1 => S::CENTER_VERTICAL,
        _ => S::BOTTOM_RIGHT_VERTICAL,
    };
    let horizontal = match row {
        0 => S::TOP_LEFT_HORIZONTAL,
        1 => S::CENTER_HORIZONTAL,
        _ => S::BOTTOM_RIGHT_HORIZONTAL,
    };
    match (column, row) {
        (1, 1) => smallvec![S::CENTER_HORIZONTAL],
        _ => smallvec![vertical, horizontal],
    }
}

fn grid_cell(p: Point, viewport: Viewport) -> (usize, usize) {
    let third = |v: f64, extent: f64| -> usize {
        if extent <= 0.0 {
            return 1;
        }
        ((v / (extent / 3.0)).floor().max(0.0) as usize).min(2)
    };
    (third(p.x, viewport.width), third(p.y, viewport.height))
}

/// Classify, rank and order `objects` for the reveal.
#[tracing::instrument(skip(objects, cfg), fields(objects = objects.len()))]
pub fn plan_reveal(objects: &[ObjectGeometry], viewport: Viewport, cfg: &PlayerConfig) -> RevealPlan {
    let params = ClusterParams::from(cfg);
    let classified = cluster(objects, viewport, params);
    let contents: Vec<TimedContent> = objects.iter().map(|o| o.content).collect();
    let RevealTiming { appear, hide } = reveal_timing(&contents, &cfg.timing);
    RevealPlan {
        objects: classified,
        appear,
        hide,
    }
}

/// Pure clustering pass; returns objects in reveal order.
pub fn cluster(
    objects: &[ObjectGeometry],
    viewport: Viewport,
    params: ClusterParams,
) -> Vec<AnimationObject> {
    let mut objs: Vec<AnimationObject> = initial_order(objects)
        .into_iter()
        .map(|o| {
            let cell = grid_cell(o.center(), viewport);
            let candidates = cell_candidates(cell.0, cell.1);
            AnimationObject {
                node: o.node,
                key: o.key,
                role: o.role,
                rect: o.rect,
                cell,
                stack: candidates[0],
                candidates,
            }
        })
        .collect();

    resolve_priorities(&mut objs);
    consolidate_center(&mut objs, viewport, params);
    group_by_stack(objs)
}

/// Distance from the top-left corner, then title and description pinned to the front.
fn initial_order(objects: &[ObjectGeometry]) -> Vec<&ObjectGeometry> {
    let mut sorted: Vec<&ObjectGeometry> = objects.iter().collect();
    sorted.sort_by(|a, b| {
        let da = a.rect.origin().to_vec2().hypot();
        let db = b.rect.origin().to_vec2().hypot();
        da.total_cmp(&db)
    });
    for role in [ObjectRole::Description, ObjectRole::Title] {
        if let Some(i) = sorted.iter().position(|o| o.role == role) {
            let o = sorted.remove(i);
            sorted.insert(0, o);
        }
    }
    sorted
}

fn member_counts(objs: &[AnimationObject]) -> HashMap<ComputedStack, usize> {
    let mut counts = HashMap::new();
    for o in objs {
        for s in &o.candidates {
            *counts.entry(*s).or_insert(0) += 1;
        }
    }
    counts
}

fn resolve_priorities(objs: &mut [AnimationObject]) {
    let counts = member_counts(objs);
    let count = |s: &ComputedStack| counts.get(s).copied().unwrap_or(0);
    for o in objs.iter_mut() {
        // Stable: ties keep the lookup-table order.
        o.candidates.sort_by_key(|s| std::cmp::Reverse(count(s)));

        let vertical_with_members = o
            .candidates
            .iter()
            .copied()
            .find(|s| s.flow == Flow::Vertical && count(s) >= 2);
        if o.candidates.contains(&ComputedStack::CENTER_HORIZONTAL)
            && let Some(v) = vertical_with_members
        {
            promote(o, v);
        }

        // Opposite corner: a left-column element never leads with a bottom-right bias while a
        // top-left one is available, and vice versa.
        let (column, _) = o.cell;
        let (wrong, right) = match column {
            0 => (Quadrant::BottomRight, Quadrant::TopLeft),
            2 => (Quadrant::TopLeft, Quadrant::BottomRight),
            _ => {
                o.stack = o.candidates[0];
                continue;
            }
        };
        if o.candidates[0].quadrant == wrong
            && let Some(better) = o.candidates.iter().copied().find(|s| s.quadrant == right)
        {
            promote(o, better);
        }
        o.stack = o.candidates[0];
    }
}

fn promote(o: &mut AnimationObject, stack: ComputedStack) {
    if let Some(i) = o.candidates.iter().position(|s| *s == stack) {
        let s = o.candidates.remove(i);
        o.candidates.insert(0, s);
    }
}

fn consolidate_center(objs: &mut [AnimationObject], viewport: Viewport, params: ClusterParams) {
    let in_center: Vec<usize> = objs
        .iter()
        .enumerate()
        .filter(|(_, o)| o.candidates.contains(&ComputedStack::CENTER_HORIZONTAL))
        .map(|(i, _)| i)
        .collect();
    if in_center.is_empty() {
        return;
    }
    let ys: Vec<f64> = in_center.iter().map(|i| objs[*i].rect.center().y).collect();
    let min = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mid = (min + max) * 0.5;

    let qualifying: Vec<usize> = in_center
        .into_iter()
        .filter(|i| (objs[*i].rect.center().y - mid).abs() <= params.center_proximity)
        .collect();

    match qualifying.as_slice() {
        [only] => {
            let o = &mut objs[*only];
            let dx = o.rect.center().x - viewport.width * 0.5;
            if dx.abs() > params.mid_proximity {
                let lean = if dx < 0.0 {
                    Quadrant::TopLeft
                } else {
                    Quadrant::BottomRight
                };
                if let Some(side) = o.candidates.iter().copied().find(|s| s.quadrant == lean) {
                    promote(o, side);
                    o.stack = side;
                }
            }
        }
        many if many.len() > 2 => {
            let off_center = many
                .iter()
                .filter(|i| objs[**i].stack != ComputedStack::CENTER_HORIZONTAL)
                .count();
            if off_center >= 2 {
                for i in many {
                    promote(&mut objs[*i], ComputedStack::CENTER_HORIZONTAL);
                    objs[*i].stack = ComputedStack::CENTER_HORIZONTAL;
                }
            }
        }
        _ => {}
    }
}

/// Keep pinned roles in front, then stable-group the rest by stack in first-appearance order.
fn group_by_stack(objs: Vec<AnimationObject>) -> Vec<AnimationObject> {
    let (pinned, rest): (Vec<_>, Vec<_>) = objs
        .into_iter()
        .partition(|o| o.role != ObjectRole::Content);
    let mut stacks: Vec<ComputedStack> = Vec::new();
    for o in &rest {
        if !stacks.contains(&o.stack) {
            stacks.push(o.stack);
        }
    }
    let mut out = pinned;
    for stack in stacks {
        out.extend(rest.iter().filter(|o| o.stack == stack).cloned());
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/animation/cluster.rs"]
mod tests;
