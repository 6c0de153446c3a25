//! Absolute positions and port anchors
//!
//! Element bounds are stored relative to their owner. These helpers walk the
//! owner chain to obtain diagram-absolute coordinates.

use indexmap::IndexMap;
use log::warn;

use crate::geometry::{Bounds, Point};
use crate::model::{Element, ElementId, Location};

/// Diagram-absolute top-left corner of `id`.
///
/// Sums the owner-relative offsets of the element and each ancestor. Returns
/// `None` if `id` is unknown. The walk stops after as many steps as there are
/// elements, so an ownership cycle yields a finite (if meaningless) result.
pub fn absolute_position(elements: &IndexMap<ElementId, Element>, id: &str) -> Option<Point> {
    let mut element = elements.get(id)?;
    let mut position = element.bounds.position();
    let mut steps = 0;
    while let Some(owner) = &element.owner {
        steps += 1;
        if steps > elements.len() {
            warn!(id; "ownership cycle detected while resolving position");
            break;
        }
        let Some(parent) = elements.get(owner) else {
            break;
        };
        position = position + parent.bounds.position();
        element = parent;
    }
    Some(position)
}

/// Bounds of `id` moved to its diagram-absolute position
pub fn absolute_bounds(elements: &IndexMap<ElementId, Element>, id: &str) -> Option<Bounds> {
    let element = elements.get(id)?;
    let position = absolute_position(elements, id)?;
    Some(element.bounds.with_position(position))
}

/// Point on the boundary of `bounds` named by a compass location
pub fn anchor_point(bounds: &Bounds, location: Location) -> Point {
    match location {
        Location::North => Point::new(bounds.x + bounds.width / 2.0, bounds.y),
        Location::East => Point::new(bounds.right(), bounds.y + bounds.height / 2.0),
        Location::South => Point::new(bounds.x + bounds.width / 2.0, bounds.bottom()),
        Location::West => Point::new(bounds.x, bounds.y + bounds.height / 2.0),
    }
}
