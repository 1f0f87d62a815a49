//! Pointer drag tracking for free-positioned nodes.

use crate::{
    foundation::core::{Point, Vec2},
    layout::dom::NodeId,
};

/// An in-progress drag of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveTarget {
    node: NodeId,
    origin: Point,
    /// Pointer position minus node origin at grab time.
    grab: Vec2,
    pointer_start: Point,
    position: Point,
    dragging: bool,
    threshold: f64,
}

impl MoveTarget {
    pub fn begin_move(node: NodeId, node_origin: Point, pointer: Point, threshold: f64) -> Self {
        Self {
            node,
            origin: node_origin,
            grab: pointer - node_origin,
            pointer_start: pointer,
            position: node_origin,
            dragging: false,
            threshold,
        }
    }

    /// New absolute node position, or `None` while the pointer is still within the threshold.
    pub fn move_to(&mut self, pointer: Point) -> Option<Point> {
        if !self.dragging && (pointer - self.pointer_start).hypot() < self.threshold {
            return None;
        }
        self.dragging = true;
        self.position = pointer - self.grab;
        Some(self.position)
    }

    /// Finish the drag; `true` when the node actually moved.
    pub fn end_move(self) -> bool {
        self.dragging
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Displacement from the origin at grab time.
    pub fn delta(&self) -> Vec2 {
        self.position - self.origin
    }
}

/// A primary drag plus secondary nodes that shadow its displacement.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveTargetGroup {
    anchor: MoveTarget,
    shadows: Vec<(NodeId, Point)>,
}

impl MoveTargetGroup {
    pub fn new(anchor: MoveTarget, shadows: Vec<(NodeId, Point)>) -> Self {
        Self { anchor, shadows }
    }

    /// Positions for the anchor and every shadow, once the anchor is dragging.
    pub fn move_to(&mut self, pointer: Point) -> Option<Vec<(NodeId, Point)>> {
        let anchor_pos = self.anchor.move_to(pointer)?;
        let delta = self.anchor.delta();
        let mut out = Vec::with_capacity(self.shadows.len() + 1);
        out.push((self.anchor.node(), anchor_pos));
        out.extend(self.shadows.iter().map(|(n, origin)| (*n, *origin + delta)));
        Some(out)
    }

    pub fn anchor(&self) -> &MoveTarget {
        &self.anchor
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        std::iter::once(self.anchor.node())
            .chain(self.shadows.iter().map(|(n, _)| *n))
            .collect()
    }

    /// Final positions when a real move happened.
    pub fn end_move(self) -> Option<Vec<(NodeId, Point)>> {
        let delta = self.anchor.delta();
        let anchor_node = self.anchor.node();
        let anchor_pos = self.anchor.position();
        if !self.anchor.end_move() {
            return None;
        }
        let mut out = vec![(anchor_node, anchor_pos)];
        out.extend(self.shadows.into_iter().map(|(n, origin)| (n, origin + delta)));
        Some(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/drag.rs"]
mod tests;
