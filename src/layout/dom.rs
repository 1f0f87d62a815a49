//! Arena-backed element tree the layout engine mutates.
//!
//! The tree mirrors the placement contract styling collaborators consume: identity attributes
//! (`data-elementid`, `data-slideid`, `data-order`) and structural/animation classes. Removed nodes
//! return their arena slot to a free list; slots carry a generation, so a stale [`NodeId`] never
//! aliases the node that reuses its slot and stays detectable via [`Document::is_alive`].

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    foundation::core::{ElementKey, Point, Rect, Size, Viewport},
    foundation::error::{SlideError, SlideResult},
    model::presentation::Position,
};

pub const ATTR_ELEMENT_ID: &str = "data-elementid";
pub const ATTR_SLIDE_ID: &str = "data-slideid";
pub const ATTR_ORDER: &str = "data-order";

pub const CLASS_STACK_ITEM: &str = "stack-item";
pub const CLASS_STACK_META: &str = "stack-meta";
pub const CLASS_DRAGGED: &str = "element-dragged";
pub const CLASS_HAS_ELEVATION: &str = "element-has-elevation";
pub const CLASS_ELEVATION_PREFIX: &str = "element-elevation-";
pub const CLASS_VISIBLE: &str = "element-visible";
pub const CLASS_REMOVING: &str = "element-removing";

/// Stable handle of a node in a [`Document`]: slot index plus the slot's generation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum NodeKind {
    /// Document root; holds slides.
    Root,
    /// One composed slide.
    Slide,
    /// Stack container (shared for left/right/center, per element for top/bottom).
    Stack(Position),
    /// Materialized element.
    Element,
    /// Line-break separator forcing wrap inside left/right stacks.
    Separator,
}

/// Absolute placement of a free element inside the slide.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum Placement {
    /// Pixel coordinates relative to the viewport origin.
    Px { left: f64, top: f64 },
    /// Percent of the viewport width/height.
    ViewportPercent { left: f64, top: f64 },
}

impl Placement {
    pub fn resolve(self, viewport: Viewport) -> Point {
        match self {
            Self::Px { left, top } => Point::new(left, top),
            Self::ViewportPercent { left, top } => Point::new(
                viewport.width * left / 100.0,
                viewport.height * top / 100.0,
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    /// Free placement; `None` for anchored nodes.
    pub placement: Option<Placement>,
    /// Content size reported by the element renderer.
    pub intrinsic: Size,
    /// Box computed by the last geometry pass, relative to the viewport.
    pub rect: Rect,
    /// Rendered content summary.
    pub content: Option<String>,
    /// Inline error shown instead of content when rendering failed.
    pub error: Option<String>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attrs: BTreeMap::new(),
            classes: BTreeSet::new(),
            placement: None,
            intrinsic: Size::ZERO,
            rect: Rect::ZERO,
            content: None,
            error: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn order(&self) -> Option<i32> {
        self.attr(ATTR_ORDER).and_then(|v| v.parse().ok())
    }

    pub fn element_key(&self) -> Option<ElementKey> {
        let slide_id = self.attr(ATTR_SLIDE_ID)?.parse().ok()?;
        let element_id = self.attr(ATTR_ELEMENT_ID)?.parse().ok()?;
        Some(ElementKey::new(slide_id, element_id))
    }

    pub fn is_separator(&self) -> bool {
        self.kind == NodeKind::Separator
    }
}

/// Node matcher used by removal and queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Every element node.
    AllElements,
    /// Element nodes of one slide.
    Slide(i64),
    /// A single element.
    Element(ElementKey),
    /// Element nodes carrying a class.
    Class(String),
}

impl Selector {
    fn matches(&self, node: &Node) -> bool {
        if node.kind != NodeKind::Element {
            return false;
        }
        match self {
            Self::AllElements => true,
            Self::Slide(id) => node.element_key().is_some_and(|k| k.slide_id == *id),
            Self::Element(key) => node.element_key() == Some(*key),
            Self::Class(class) => node.has_class(class),
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Clone, Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(NodeKind::Root)),
            }],
            free: Vec::new(),
            live: 1,
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node, reusing a freed slot when one is available.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index as usize)
        {
            slot.node = Some(Node::new(kind));
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(kind)),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Arena slots allocated so far, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    pub fn node(&self, id: NodeId) -> SlideResult<&Node> {
        self.get(id)
            .ok_or_else(|| SlideError::layout(format!("node {id} does not exist")))
    }

    pub fn node_mut(&mut self, id: NodeId) -> SlideResult<&mut Node> {
        self.get_mut(id)
            .ok_or_else(|| SlideError::layout(format!("node {id} does not exist")))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Insert `child` into `parent` at `index`, detaching it from any previous parent first.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> SlideResult<()> {
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SlideError::layout("cannot insert a node into itself"));
        }
        self.node(parent)?;
        self.detach(child)?;
        let p = self.node_mut(parent)?;
        let index = index.min(p.children.len());
        p.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) -> SlideResult<()> {
        self.insert_at(parent, usize::MAX, child)
    }

    pub fn prepend(&mut self, parent: NodeId, child: NodeId) -> SlideResult<()> {
        self.insert_at(parent, 0, child)
    }

    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> SlideResult<()> {
        let parent = self
            .parent(reference)
            .ok_or_else(|| SlideError::layout("insert_after reference is detached"))?;
        self.detach(child)?;
        let index = self
            .index_in_parent(reference)
            .ok_or_else(|| SlideError::layout("insert_after reference is detached"))?;
        self.insert_at(parent, index + 1, child)
    }

    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> SlideResult<()> {
        let parent = self
            .parent(reference)
            .ok_or_else(|| SlideError::layout("insert_before reference is detached"))?;
        self.detach(child)?;
        let index = self
            .index_in_parent(reference)
            .ok_or_else(|| SlideError::layout("insert_before reference is detached"))?;
        self.insert_at(parent, index, child)
    }

    /// Exchange the positions of two children of the same parent.
    pub fn swap_siblings(&mut self, a: NodeId, b: NodeId) -> SlideResult<()> {
        let parent = self.parent(a);
        if parent.is_none() || parent != self.parent(b) {
            return Err(SlideError::layout("swap_siblings needs two children of one parent"));
        }
        let (Some(ia), Some(ib)) = (self.index_in_parent(a), self.index_in_parent(b)) else {
            return Err(SlideError::layout("swap_siblings needs two children of one parent"));
        };
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.swap(ia, ib);
        }
        Ok(())
    }

    /// Unlink a node from its parent; the node (and its subtree) stays alive.
    pub fn detach(&mut self, id: NodeId) -> SlideResult<()> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Detach and free a node with its whole subtree. Returns the freed ids.
    pub fn remove(&mut self, id: NodeId) -> SlideResult<Vec<NodeId>> {
        if id == self.root {
            return Err(SlideError::layout("cannot remove the document root"));
        }
        self.detach(id)?;
        let freed = self.descendants(id);
        for n in &freed {
            if let Some(slot) = self.slots.get_mut(n.index as usize)
                && slot.generation == n.generation
                && slot.node.take().is_some()
            {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(n.index);
                self.live -= 1;
            }
        }
        Ok(freed)
    }

    /// Pre-order walk including `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let Some(node) = self.get(n) else {
                continue;
            };
            out.push(n);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(p) = self.parent(id) {
            if p == ancestor {
                return true;
            }
            id = p;
        }
        false
    }

    pub fn add_class(&mut self, id: NodeId, class: impl Into<String>) -> SlideResult<()> {
        self.node_mut(id)?.classes.insert(class.into());
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> SlideResult<()> {
        self.node_mut(id)?.classes.remove(class);
        Ok(())
    }

    pub fn remove_classes_with_prefix(&mut self, id: NodeId, prefix: &str) -> SlideResult<()> {
        self.node_mut(id)?.classes.retain(|c| !c.starts_with(prefix));
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).is_some_and(|n| n.has_class(class))
    }

    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> SlideResult<()> {
        self.node_mut(id)?.attrs.insert(name.into(), value.into());
        Ok(())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|n| n.attr(name))
    }

    /// Element nodes under `scope` matching `selector`, in tree order.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.get(*n).is_some_and(|node| selector.matches(node)))
            .collect()
    }

    pub fn find_element(&self, scope: NodeId, key: ElementKey) -> Option<NodeId> {
        self.select(scope, &Selector::Element(key)).into_iter().next()
    }

    /// Serializable view of a subtree.
    pub fn snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        let node = self.get(id)?;
        Some(NodeSnapshot {
            kind: node.kind,
            attrs: node.attrs.clone(),
            classes: node.classes.iter().cloned().collect(),
            placement: node.placement,
            rect: [node.rect.x0, node.rect.y0, node.rect.x1, node.rect.y1],
            content: node.content.clone(),
            error: node.error.clone(),
            children: node
                .children
                .iter()
                .filter_map(|c| self.snapshot(*c))
                .collect(),
        })
    }
}

/// Owned, serializable copy of a subtree used for inspection and tests.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeSnapshot {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    pub rect: [f64; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

#[cfg(test)]
#[path = "../../tests/unit/layout/dom.rs"]
mod tests;
