//! Geometry pass: turns the stack structure into concrete boxes relative to the viewport.
//!
//! Top wrappers stack downwards from the top edge, bottom wrappers upwards from the bottom edge;
//! the band between them hosts the left column, the centered flow and the right column. Inside
//! shared stacks, separators break items into lines. Free elements sit at their placement.

use crate::{
    foundation::core::{Point, Rect, Size, Viewport},
    foundation::error::SlideResult,
    layout::dom::{Document, NodeId, NodeKind},
    layout::stacks::{element_children, find_stack, wrappers},
    model::presentation::Position,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Start,
    Center,
    End,
}

fn align_offset(container: f64, content: f64, align: Align) -> f64 {
    let rem = (container - content).max(0.0);
    match align {
        Align::Start => 0.0,
        Align::Center => rem * 0.5,
        Align::End => rem,
    }
}

/// Measure every node of `slide` against `viewport`.
pub(crate) fn measure_slide(
    doc: &mut Document,
    slide: NodeId,
    viewport: Viewport,
    gap: f64,
) -> SlideResult<()> {
    let mut y_top = gap;
    for wrapper in wrappers(doc, slide, Position::Top) {
        let size = wrapper_size(doc, wrapper);
        let x = align_offset(viewport.width, size.width, Align::Center);
        place_wrapper(doc, wrapper, Point::new(x, y_top), size)?;
        y_top += size.height + gap;
    }

    let bottoms = wrappers(doc, slide, Position::Bottom);
    let bottoms_h: f64 = bottoms
        .iter()
        .map(|w| wrapper_size(doc, *w).height + gap)
        .sum();
    let y_bottom = (viewport.height - bottoms_h).max(y_top);
    let mut y = y_bottom;
    for wrapper in bottoms {
        let size = wrapper_size(doc, wrapper);
        let x = align_offset(viewport.width, size.width, Align::Center);
        place_wrapper(doc, wrapper, Point::new(x, y), size)?;
        y += size.height + gap;
    }

    let band = Rect::new(gap, y_top, viewport.width - gap, y_bottom - gap);
    for (position, align) in [
        (Position::Left, Align::Start),
        (Position::Center, Align::Center),
        (Position::Right, Align::End),
    ] {
        if let Some(container) = find_stack(doc, slide, position) {
            place_lines(doc, container, band, align, gap)?;
        }
    }

    let free: Vec<NodeId> = doc
        .children(slide)
        .iter()
        .copied()
        .filter(|c| doc.get(*c).is_some_and(|n| n.kind == NodeKind::Element))
        .collect();
    for node in free {
        let n = doc.node_mut(node)?;
        let origin = n
            .placement
            .map(|p| p.resolve(viewport))
            .unwrap_or(Point::ORIGIN);
        n.rect = Rect::from_origin_size(origin, n.intrinsic);
    }
    Ok(())
}

fn wrapper_size(doc: &Document, wrapper: NodeId) -> Size {
    element_children(doc, wrapper)
        .first()
        .and_then(|n| doc.get(*n))
        .map(|n| n.intrinsic)
        .unwrap_or(Size::ZERO)
}

fn place_wrapper(doc: &mut Document, wrapper: NodeId, origin: Point, size: Size) -> SlideResult<()> {
    let rect = Rect::from_origin_size(origin, size);
    doc.node_mut(wrapper)?.rect = rect;
    for child in element_children(doc, wrapper) {
        doc.node_mut(child)?.rect = rect;
    }
    Ok(())
}

/// Items of a shared stack split into lines at separators.
fn lines(doc: &Document, container: NodeId) -> Vec<Vec<NodeId>> {
    let mut out = vec![Vec::new()];
    for child in doc.children(container) {
        match doc.get(*child).map(|n| n.kind) {
            Some(NodeKind::Separator) => out.push(Vec::new()),
            Some(NodeKind::Element) => {
                if let Some(line) = out.last_mut() {
                    line.push(*child);
                }
            }
            _ => {}
        }
    }
    out.retain(|l| !l.is_empty());
    out
}

fn place_lines(
    doc: &mut Document,
    container: NodeId,
    band: Rect,
    align: Align,
    gap: f64,
) -> SlideResult<()> {
    let lines = lines(doc, container);
    let sizes: Vec<Vec<Size>> = lines
        .iter()
        .map(|l| {
            l.iter()
                .map(|n| doc.get(*n).map(|n| n.intrinsic).unwrap_or(Size::ZERO))
                .collect()
        })
        .collect();
    let line_boxes: Vec<Size> = sizes
        .iter()
        .map(|l| {
            let w = l.iter().map(|s| s.width).sum::<f64>()
                + (l.len().saturating_sub(1) as f64) * gap;
            let h = l.iter().map(|s| s.height).fold(0.0, f64::max);
            Size::new(w, h)
        })
        .collect();
    let total_h = line_boxes.iter().map(|s| s.height).sum::<f64>()
        + (line_boxes.len().saturating_sub(1) as f64) * gap;

    let mut y = band.y0 + align_offset(band.height(), total_h, Align::Center);
    let mut bounds: Option<Rect> = None;
    for ((line, item_sizes), line_box) in lines.iter().zip(&sizes).zip(&line_boxes) {
        let mut x = band.x0 + align_offset(band.width(), line_box.width, align);
        for (node, size) in line.iter().zip(item_sizes) {
            let dy = align_offset(line_box.height, size.height, Align::Center);
            let rect = Rect::from_origin_size(Point::new(x, y + dy), *size);
            doc.node_mut(*node)?.rect = rect;
            bounds = Some(bounds.map_or(rect, |b| b.union(rect)));
            x += size.width + gap;
        }
        y += line_box.height + gap;
    }
    doc.node_mut(container)?.rect = bounds.unwrap_or(Rect::ZERO);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
