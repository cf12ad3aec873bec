//! Placement math for bulk selection edits.
//!
//! Every edit here is "change the placement, then translate so one reference point of the
//! item's own box lands where it was before". The reference point is expressed as fractions of
//! the cropped box, so it follows rotation and flips.

use crate::foundation::core::{Rect, Size, Vec2, normalize_rotation};
use crate::scene::node::ItemPlacement;

const CENTER: Vec2 = Vec2::new(0.5, 0.5);

/// Translate `after` so the point at `fractions` coincides with the same point of `before`.
pub(crate) fn pin(
    before: &ItemPlacement,
    mut after: ItemPlacement,
    source: Size,
    fractions: Vec2,
) -> ItemPlacement {
    let fixed = before.point_at(source, fractions);
    let moved = after.point_at(source, fractions);
    after.position += fixed - moved;
    after
}

/// Multiply the scale by `factor`, keeping the point at `anchor` fixed.
pub(crate) fn scaled(p: &ItemPlacement, source: Size, factor: Vec2, anchor: Vec2) -> ItemPlacement {
    let mut next = *p;
    next.scale = Vec2::new(p.scale.x * factor.x, p.scale.y * factor.y);
    pin(p, next, source, anchor)
}

/// Add `degrees` of rotation around the box center.
pub(crate) fn rotated(p: &ItemPlacement, source: Size, degrees: f64) -> ItemPlacement {
    let mut next = *p;
    next.rotation = normalize_rotation(p.rotation + degrees);
    pin(p, next, source, CENTER)
}

/// Mirror horizontally and/or vertically around the box center.
pub(crate) fn flipped(p: &ItemPlacement, source: Size, x: bool, y: bool) -> ItemPlacement {
    let mut next = *p;
    if x {
        next.scale.x = -next.scale.x;
    }
    if y {
        next.scale.y = -next.scale.y;
    }
    pin(p, next, source, CENTER)
}

/// Identity transform: origin, unit scale, no rotation, no crop. Visibility and lock survive.
pub(crate) fn reset(p: &ItemPlacement) -> ItemPlacement {
    ItemPlacement {
        visible: p.visible,
        locked: p.locked,
        ..ItemPlacement::default()
    }
}

/// Translate so the box's axis-aligned bounds are centered in `area`.
pub(crate) fn centered(p: &ItemPlacement, source: Size, area: Rect) -> ItemPlacement {
    let mut next = *p;
    next.position += area.center() - p.bounds(source).center();
    next
}

/// Scale uniformly so the bounds fit inside `area`, then center. Flips are kept.
///
/// Returns `None` for zero-sized content.
pub(crate) fn fitted(p: &ItemPlacement, source: Size, area: Rect) -> Option<ItemPlacement> {
    let mut unit = *p;
    unit.scale = Vec2::new(p.scale.x.signum(), p.scale.y.signum());
    let b = unit.bounds(source);
    if b.width() <= f64::EPSILON || b.height() <= f64::EPSILON {
        return None;
    }
    let factor = (area.width() / b.width()).min(area.height() / b.height());
    unit.scale = Vec2::new(unit.scale.x * factor, unit.scale.y * factor);
    Some(centered(&unit, source, area))
}

#[cfg(test)]
#[path = "../../tests/unit/selection/transform.rs"]
mod tests;
