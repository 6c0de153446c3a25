//! Minimal layout patches between two versions of a relationship

use crate::geometry::{Bounds, Point};
use crate::model::Element;

/// Layout fields that changed; `None` means unchanged
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationshipPatch {
    pub path: Option<Vec<Point>>,
    pub bounds: Option<Bounds>,
}

impl RelationshipPatch {
    pub fn is_empty(&self) -> bool {
        self.path.is_none() && self.bounds.is_none()
    }
}

/// Compare the layout of `previous` against `recomputed`.
///
/// Paths are compared point by point and bounds field by field, both with
/// exact equality. Returns `None` when nothing differs so callers can skip
/// committing.
pub fn diff(previous: &Element, recomputed: &Element) -> Option<RelationshipPatch> {
    let old_path = previous.as_relationship().map(|r| r.path.as_slice());
    let new_path = recomputed.as_relationship().map(|r| r.path.as_slice());

    let patch = RelationshipPatch {
        path: match new_path {
            Some(path) if old_path != Some(path) => Some(path.to_vec()),
            _ => None,
        },
        bounds: (previous.bounds != recomputed.bounds).then_some(recomputed.bounds),
    };

    (!patch.is_empty()).then_some(patch)
}
