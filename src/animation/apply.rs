//! DOM pass for a reveal plan: stack and sequence classes on element nodes.

use crate::{
    animation::cluster::RevealPlan,
    foundation::error::SlideResult,
    layout::dom::{Document, NodeId, Selector},
};

pub const CLASS_ANIMATE_APPEAR: &str = "element-animate-appear";
pub const CLASS_ANIMATE_AFTER_PREFIX: &str = "element-animate-after-";
pub const CLASS_CSTACK_PREFIX: &str = "cstack-";

/// Strip every animation class from the elements under `slide`.
pub fn reset_animation(doc: &mut Document, slide: NodeId) -> SlideResult<()> {
    for node in doc.select(slide, &Selector::AllElements) {
        doc.remove_class(node, CLASS_ANIMATE_APPEAR)?;
        doc.remove_classes_with_prefix(node, CLASS_ANIMATE_AFTER_PREFIX)?;
        doc.remove_classes_with_prefix(node, CLASS_CSTACK_PREFIX)?;
    }
    Ok(())
}

/// Tag each planned node with its computed stack and its position in the sequence.
pub fn apply_plan(doc: &mut Document, plan: &RevealPlan) -> SlideResult<()> {
    for (i, o) in plan.objects.iter().enumerate() {
        if !doc.is_alive(o.node) {
            continue;
        }
        doc.add_class(o.node, o.stack.class_name())?;
        doc.add_class(o.node, format!("{CLASS_ANIMATE_AFTER_PREFIX}{i}"))?;
    }
    Ok(())
}

pub fn mark_appeared(doc: &mut Document, node: NodeId) -> SlideResult<()> {
    if doc.is_alive(node) {
        doc.add_class(node, CLASS_ANIMATE_APPEAR)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/apply.rs"]
mod tests;
