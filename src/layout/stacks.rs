//! Stack positioning: places element nodes into per-position stacks on a slide.
//!
//! Slide children are kept in region order: top wrappers, the left column, the center flow, the
//! right column, bottom wrappers, then free elements. Left/right/center own a single shared
//! container; top/bottom get one wrapper per element.

use crate::{
    foundation::core::{ElementKey, Viewport},
    foundation::error::{SlideError, SlideResult},
    layout::dom::{
        ATTR_ORDER, CLASS_ELEVATION_PREFIX, CLASS_HAS_ELEVATION, CLASS_STACK_ITEM,
        CLASS_STACK_META, Document, NodeId, NodeKind, Placement,
    },
    model::presentation::{Element, Position},
};

/// Order change of one participant of a [`move_element`] swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OrderChange {
    pub key: ElementKey,
    pub old_order: i32,
    pub new_order: i32,
}

/// Both sides of an order swap, so callers can persist it atomically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MoveOutcome {
    pub moved: OrderChange,
    pub neighbor: OrderChange,
}

/// Place `node` for `element` on `slide`, then tidy every stack.
pub(crate) fn update_element_position(
    doc: &mut Document,
    slide: NodeId,
    node: NodeId,
    element: &Element,
    always_on_top: bool,
    viewport: Viewport,
) -> SlideResult<()> {
    doc.set_attr(node, ATTR_ORDER, element.order.to_string())?;
    doc.remove_classes_with_prefix(node, CLASS_ELEVATION_PREFIX)?;
    doc.remove_class(node, CLASS_HAS_ELEVATION)?;
    doc.node_mut(node)?.placement = None;

    match element.position {
        Position::Free => position_free(doc, slide, node, element, viewport)?,
        Position::Left | Position::Right | Position::Center => {
            doc.detach(node)?;
            clean_stacks(doc, slide)?;
            position_shared(doc, slide, node, element)?;
        }
        Position::Top | Position::Bottom => {
            doc.detach(node)?;
            clean_stacks(doc, slide)?;
            position_wrapped(doc, slide, node, element, always_on_top)?;
        }
    }
    clean_stacks(doc, slide)
}

fn position_free(
    doc: &mut Document,
    slide: NodeId,
    node: NodeId,
    element: &Element,
    viewport: Viewport,
) -> SlideResult<()> {
    if doc.parent(node) != Some(slide) {
        doc.append(slide, node)?;
    }
    doc.remove_class(node, CLASS_STACK_ITEM)?;
    if let Some(elevation) = element.elevation {
        doc.add_class(node, format!("{CLASS_ELEVATION_PREFIX}{elevation}"))?;
        doc.add_class(node, CLASS_HAS_ELEVATION)?;
    }
    doc.node_mut(node)?.placement = Some(free_placement(element, viewport));
    Ok(())
}

/// Ratio-scaled pixel placement when a snapshot exists, viewport units otherwise.
pub(crate) fn free_placement(element: &Element, viewport: Viewport) -> Placement {
    let Some(offset) = element.offset else {
        return Placement::Px {
            left: 0.0,
            top: 0.0,
        };
    };
    match offset.viewport {
        Some(recorded) if recorded.is_measurable() => match viewport.scale_from(recorded) {
            Some(s) if viewport.is_measurable() => Placement::Px {
                left: offset.left * s.x,
                top: offset.top * s.y,
            },
            _ => Placement::Px {
                left: offset.left,
                top: offset.top,
            },
        },
        _ => Placement::ViewportPercent {
            left: offset.left,
            top: offset.top,
        },
    }
}

fn position_shared(
    doc: &mut Document,
    slide: NodeId,
    node: NodeId,
    element: &Element,
) -> SlideResult<()> {
    let position = element.position;
    doc.add_class(node, CLASS_STACK_ITEM)?;

    let Some(container) = find_stack(doc, slide, position) else {
        let container = new_stack(doc, position)?;
        doc.append(container, node)?;
        insert_in_region(doc, slide, container, position, RegionEdge::End)?;
        return Ok(());
    };

    let items = element_children(doc, container);
    let keys: Vec<(i32, i64)> = items.iter().map(|n| sort_key(doc, *n)).collect();
    let key = (element.order, element.id);
    // Rendered order is sorted; find the nearest smaller neighbor.
    let idx = keys.partition_point(|k| *k < key);

    if idx == 0 {
        doc.prepend(container, node)?;
        if position.uses_separators() && !items.is_empty() {
            let sep = doc.create(NodeKind::Separator);
            doc.insert_after(node, sep)?;
        }
    } else {
        doc.insert_after(items[idx - 1], node)?;
        if position.uses_separators() {
            let sep = doc.create(NodeKind::Separator);
            doc.insert_before(node, sep)?;
        }
    }
    Ok(())
}

fn position_wrapped(
    doc: &mut Document,
    slide: NodeId,
    node: NodeId,
    element: &Element,
    always_on_top: bool,
) -> SlideResult<()> {
    let position = element.position;
    doc.add_class(node, CLASS_STACK_ITEM)?;

    let siblings = wrappers(doc, slide, position);
    let wrapper = new_stack(doc, position)?;
    doc.set_attr(wrapper, ATTR_ORDER, element.order.to_string())?;
    let is_meta = always_on_top || element.is_meta();
    if is_meta {
        doc.add_class(wrapper, CLASS_STACK_META)?;
    }
    doc.append(wrapper, node)?;

    let key = (element.order, element.id);
    let (meta, plain): (Vec<NodeId>, Vec<NodeId>) = siblings
        .into_iter()
        .partition(|w| doc.has_class(*w, CLASS_STACK_META));

    let reference = if is_meta {
        meta.iter()
            .rev()
            .find(|w| wrapper_key(doc, **w) < key)
            .copied()
    } else {
        plain
            .iter()
            .rev()
            .find(|w| wrapper_key(doc, **w) < key)
            .or_else(|| meta.last())
            .copied()
    };

    match reference {
        Some(r) => doc.insert_after(r, wrapper),
        None => insert_in_region(doc, slide, wrapper, position, RegionEdge::Start),
    }
}

/// Remove redundant separators and empty containers. Idempotent.
pub(crate) fn clean_stacks(doc: &mut Document, slide: NodeId) -> SlideResult<()> {
    let containers: Vec<NodeId> = doc
        .children(slide)
        .iter()
        .copied()
        .filter(|c| matches!(doc.get(*c).map(|n| n.kind), Some(NodeKind::Stack(_))))
        .collect();

    for container in containers {
        let Some(NodeKind::Stack(position)) = doc.get(container).map(|n| n.kind) else {
            continue;
        };
        let mut redundant = Vec::new();
        let mut previous_was_separator = true;
        let children = doc.children(container).to_vec();
        for child in &children {
            let is_sep = doc.get(*child).is_some_and(|n| n.is_separator());
            if is_sep && (previous_was_separator || !position.uses_separators()) {
                redundant.push(*child);
                continue;
            }
            previous_was_separator = is_sep;
        }
        // Trailing separator survives the forward pass; drop it too.
        if let Some(last) = children
            .iter()
            .rev()
            .find(|c| !redundant.contains(c))
            .copied()
            && doc.get(last).is_some_and(|n| n.is_separator())
        {
            redundant.push(last);
        }
        for sep in redundant {
            doc.remove(sep)?;
        }
        if element_children(doc, container).is_empty() {
            doc.remove(container)?;
        }
    }
    Ok(())
}

/// Swap `node`'s order with its neighbor in the direction of `delta` (negative = towards the start).
pub(crate) fn move_element(
    doc: &mut Document,
    slide: NodeId,
    node: NodeId,
    delta: i32,
) -> SlideResult<Option<MoveOutcome>> {
    if delta == 0 {
        return Ok(None);
    }
    let parent = doc
        .parent(node)
        .ok_or_else(|| SlideError::layout("cannot move a detached element"))?;
    let Some(NodeKind::Stack(position)) = doc.get(parent).map(|n| n.kind) else {
        return Ok(None);
    };

    // The unit that changes place: the node itself in shared stacks, its wrapper otherwise.
    let (unit, siblings) = if position.is_shared() {
        (node, element_children(doc, parent))
    } else {
        (parent, wrappers(doc, slide, position))
    };
    let Some(i) = siblings.iter().position(|s| *s == unit) else {
        return Ok(None);
    };
    let j = if delta < 0 {
        match i.checked_sub(1) {
            Some(j) => j,
            None => return Ok(None),
        }
    } else {
        i + 1
    };
    let Some(&other_unit) = siblings.get(j) else {
        return Ok(None);
    };
    if !position.is_shared()
        && (doc.has_class(unit, CLASS_STACK_META) || doc.has_class(other_unit, CLASS_STACK_META))
    {
        return Ok(None);
    }

    let other = if position.is_shared() {
        other_unit
    } else {
        element_children(doc, other_unit)
            .first()
            .copied()
            .ok_or_else(|| SlideError::layout("empty stack wrapper"))?
    };

    let (a_key, a_order) = identity(doc, node)?;
    let (b_key, b_order) = identity(doc, other)?;
    doc.set_attr(node, ATTR_ORDER, b_order.to_string())?;
    doc.set_attr(other, ATTR_ORDER, a_order.to_string())?;
    if !position.is_shared() {
        doc.set_attr(unit, ATTR_ORDER, b_order.to_string())?;
        doc.set_attr(other_unit, ATTR_ORDER, a_order.to_string())?;
    }
    doc.swap_siblings(unit, other_unit)?;

    Ok(Some(MoveOutcome {
        moved: OrderChange {
            key: a_key,
            old_order: a_order,
            new_order: b_order,
        },
        neighbor: OrderChange {
            key: b_key,
            old_order: b_order,
            new_order: a_order,
        },
    }))
}

fn identity(doc: &Document, node: NodeId) -> SlideResult<(ElementKey, i32)> {
    let n = doc.node(node)?;
    let key = n
        .element_key()
        .ok_or_else(|| SlideError::layout("element node lacks identity attributes"))?;
    Ok((key, n.order().unwrap_or(0)))
}

fn sort_key(doc: &Document, node: NodeId) -> (i32, i64) {
    let n = doc.get(node);
    let order = n.and_then(|n| n.order()).unwrap_or(0);
    let id = n
        .and_then(|n| n.element_key())
        .map(|k| k.element_id)
        .unwrap_or(0);
    (order, id)
}

fn wrapper_key(doc: &Document, wrapper: NodeId) -> (i32, i64) {
    element_children(doc, wrapper)
        .first()
        .map(|n| sort_key(doc, *n))
        .unwrap_or((doc.get(wrapper).and_then(|n| n.order()).unwrap_or(0), 0))
}

/// Element children of a container, skipping separators.
pub(crate) fn element_children(doc: &Document, container: NodeId) -> Vec<NodeId> {
    doc.children(container)
        .iter()
        .copied()
        .filter(|c| doc.get(*c).is_some_and(|n| n.kind == NodeKind::Element))
        .collect()
}

pub(crate) fn find_stack(doc: &Document, slide: NodeId, position: Position) -> Option<NodeId> {
    doc.children(slide)
        .iter()
        .copied()
        .find(|c| doc.get(*c).is_some_and(|n| n.kind == NodeKind::Stack(position)))
}

/// Per-element wrappers of a top/bottom position, in slide order.
pub(crate) fn wrappers(doc: &Document, slide: NodeId, position: Position) -> Vec<NodeId> {
    doc.children(slide)
        .iter()
        .copied()
        .filter(|c| doc.get(*c).is_some_and(|n| n.kind == NodeKind::Stack(position)))
        .collect()
}

fn new_stack(doc: &mut Document, position: Position) -> SlideResult<NodeId> {
    let container = doc.create(NodeKind::Stack(position));
    doc.add_class(container, position.stack_class())?;
    Ok(container)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RegionEdge {
    Start,
    End,
}

fn region_rank(doc: &Document, node: NodeId) -> u8 {
    match doc.get(node).map(|n| n.kind) {
        Some(NodeKind::Stack(p)) => p.region_rank(),
        _ => Position::Free.region_rank(),
    }
}

fn insert_in_region(
    doc: &mut Document,
    slide: NodeId,
    node: NodeId,
    position: Position,
    edge: RegionEdge,
) -> SlideResult<()> {
    let rank = position.region_rank();
    let index = doc.children(slide).iter().position(|c| {
        let r = region_rank(doc, *c);
        match edge {
            RegionEdge::Start => r >= rank,
            RegionEdge::End => r > rank,
        }
    });
    match index {
        Some(i) => doc.insert_at(slide, i, node),
        None => doc.append(slide, node),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/stacks.rs"]
mod tests;
