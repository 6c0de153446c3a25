//! Containment: owner checks and classifier member stacking

use indexmap::IndexMap;

use crate::geometry::Bounds;
use crate::layout::LayoutConfig;

use super::element::{Element, ElementId, ElementKind};
use super::error::ModelError;

/// Check that `owner` exists and may contain a child of `child_kind`
pub fn check_containment(
    elements: &IndexMap<ElementId, Element>,
    owner: &str,
    child: &str,
    child_kind: ElementKind,
) -> Result<(), ModelError> {
    let parent = elements.get(owner).ok_or_else(|| ModelError::not_found(owner))?;
    let Some(owner_kind) = parent.kind() else {
        return Err(ModelError::not_found(owner));
    };
    if owner_kind.accepts(child_kind) {
        Ok(())
    } else {
        Err(ModelError::InvalidContainment {
            owner: owner.to_string(),
            owner_kind,
            child: child.to_string(),
            child_kind,
        })
    }
}

/// Add `member` to the classifier `owner` and re-stack its members
pub fn append_member(
    elements: &mut IndexMap<ElementId, Element>,
    owner: &str,
    mut member: Element,
    config: &LayoutConfig,
) -> Result<(), ModelError> {
    let Some(member_kind) = member.kind() else {
        return Err(ModelError::invalid_endpoint(
            member.id.clone(),
            owner,
            "relationships cannot be members",
        ));
    };
    check_containment(elements, owner, &member.id, member_kind)?;
    if elements.contains_key(&member.id) {
        return Err(ModelError::DuplicateId { id: member.id });
    }

    let id = member.id.clone();
    member.owner = Some(owner.to_string());
    elements.insert(id.clone(), member);
    if let Some(shape) = elements.get_mut(owner).and_then(Element::as_shape_mut) {
        shape.owned_elements.push(id);
    }
    layout_members(elements, owner, config);
    Ok(())
}

/// Stack a classifier's members below its header: attributes first, then methods.
///
/// Every member spans the classifier's width and the classifier grows to fit.
/// Does nothing for non-classifiers or classifiers without members.
pub fn layout_members(
    elements: &mut IndexMap<ElementId, Element>,
    owner: &str,
    config: &LayoutConfig,
) {
    let Some(parent) = elements.get(owner) else {
        return;
    };
    let Some(kind) = parent.kind().filter(|k| k.is_classifier()) else {
        return;
    };
    let width = parent.bounds.width;

    let member_kind = |id: &ElementId| elements.get(id).and_then(Element::kind);
    let attributes: Vec<ElementId> = parent
        .owned_elements()
        .iter()
        .filter(|id| member_kind(id).is_some_and(ElementKind::is_attribute))
        .cloned()
        .collect();
    let methods: Vec<ElementId> = parent
        .owned_elements()
        .iter()
        .filter(|id| member_kind(id).is_some_and(ElementKind::is_method))
        .cloned()
        .collect();
    if attributes.is_empty() && methods.is_empty() {
        return;
    }

    let mut y = config.header_height(kind);
    for id in attributes.iter().chain(methods.iter()) {
        if let Some(member) = elements.get_mut(id) {
            member.bounds = Bounds::new(0.0, y, width, config.member_height);
            y += config.member_height;
        }
    }
    if let Some(parent) = elements.get_mut(owner) {
        parent.bounds.height = y;
    }
}
