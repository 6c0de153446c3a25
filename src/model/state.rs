//! The element mapping and the reducer that applies actions to it

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::geometry::{Bounds, Point};
use crate::layout::port::absolute_position;
use crate::layout::LayoutConfig;

use super::action::{Action, ElementPatch, Reconnection, SizeDelta};
use super::container::{check_containment, layout_members};
use super::element::{Element, ElementData, ElementId, Relationship};
use super::error::ModelError;

/// Which family of UML diagram is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagramType {
    #[default]
    ClassDiagram,
    ObjectDiagram,
    ActivityDiagram,
    UseCaseDiagram,
    CommunicationDiagram,
    DeploymentDiagram,
}

/// Root container of the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub kind: DiagramType,
    /// Canvas extent
    pub bounds: Bounds,
    pub grid_size: f64,
    /// Root shape ids
    pub owned_elements: Vec<ElementId>,
    pub owned_relationships: Vec<ElementId>,
}

impl Diagram {
    pub fn new(kind: DiagramType) -> Self {
        Self {
            kind,
            bounds: Bounds::new(0.0, 0.0, 1600.0, 1600.0),
            grid_size: 10.0,
            owned_elements: Vec::new(),
            owned_relationships: Vec::new(),
        }
    }
}

/// Every element of one diagram, keyed by id in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct ModelState {
    pub elements: IndexMap<ElementId, Element>,
    pub diagram: Diagram,
}

impl ModelState {
    pub fn new(kind: DiagramType) -> Self {
        Self {
            elements: IndexMap::new(),
            diagram: Diagram::new(kind),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// All relationship elements in insertion order
    pub fn relationships(&self) -> impl Iterator<Item = (&Element, &Relationship)> {
        self.elements
            .values()
            .filter_map(|e| e.as_relationship().map(|rel| (e, rel)))
    }

    /// Every element transitively owned by `id`, depth first, excluding `id`
    pub fn descendants(&self, id: &str) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack: Vec<&ElementId> = self
            .get(id)
            .map(|e| e.owned_elements().iter().rev().collect())
            .unwrap_or_default();
        let limit = self.elements.len();
        while let Some(child) = stack.pop() {
            if result.len() >= limit {
                break;
            }
            result.push(child.clone());
            if let Some(element) = self.get(child) {
                stack.extend(element.owned_elements().iter().rev());
            }
        }
        result
    }

    /// `ids` followed by all their descendants, without duplicates
    pub fn expand_with_descendants(&self, ids: &[ElementId]) -> Vec<ElementId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for id in ids {
            for candidate in std::iter::once(id.clone()).chain(self.descendants(id)) {
                if seen.insert(candidate.clone()) {
                    result.push(candidate);
                }
            }
        }
        result
    }

    /// Apply one action in place.
    ///
    /// Validation happens while applying, so callers that need all-or-nothing
    /// semantics apply to a clone and swap it in on success.
    pub fn apply(&mut self, action: &Action, config: &LayoutConfig) -> Result<(), ModelError> {
        match action {
            Action::Create { values } => {
                for value in values {
                    self.create(value.clone(), config)?;
                }
            }
            Action::Update { values } => {
                for patch in values {
                    self.update(patch, config)?;
                }
            }
            Action::Delete { ids } => self.delete(ids, config),
            Action::Move { ids, delta } => self.translate(ids, *delta),
            Action::Resize { ids, delta } => self.resize(ids, *delta, config),
            Action::Reconnect { connections } => {
                for connection in connections {
                    self.reconnect(connection)?;
                }
            }
            Action::Reparent { ids, owner } => {
                for id in ids {
                    self.reparent(id, owner.as_deref(), config)?;
                }
            }
            Action::Remove { ids } => {
                for id in ids {
                    self.detach(id);
                }
            }
            Action::Layout { id, path, bounds } => {
                if let Some(element) = self.elements.get_mut(id) {
                    if let Some(rel) = element.as_relationship_mut() {
                        rel.path = path.clone();
                        element.bounds = *bounds;
                    }
                }
            }
        }
        Ok(())
    }

    fn create(&mut self, mut element: Element, config: &LayoutConfig) -> Result<(), ModelError> {
        if self.elements.contains_key(&element.id) {
            return Err(ModelError::DuplicateId { id: element.id });
        }
        if let Some(rel) = element.as_relationship() {
            for port in [&rel.source, &rel.target] {
                self.check_endpoint(&element.id, &port.element)?;
            }
            element.owner = None;
            self.diagram.owned_relationships.push(element.id.clone());
            self.elements.insert(element.id.clone(), element);
            return Ok(());
        }

        let id = element.id.clone();
        match element.owner.clone() {
            Some(owner) => {
                if let Some(kind) = element.kind() {
                    check_containment(&self.elements, &owner, &id, kind)?;
                }
                self.elements.insert(id.clone(), element);
                if let Some(shape) = self.elements.get_mut(&owner).and_then(Element::as_shape_mut) {
                    shape.owned_elements.push(id);
                }
                layout_members(&mut self.elements, &owner, config);
            }
            None => {
                self.diagram.owned_elements.push(id.clone());
                self.elements.insert(id, element);
            }
        }
        Ok(())
    }

    fn check_endpoint(&self, relationship: &str, element: &str) -> Result<(), ModelError> {
        match self.get(element) {
            None => Err(ModelError::invalid_endpoint(relationship, element, "element not found")),
            Some(e) if e.is_relationship() => Err(ModelError::invalid_endpoint(
                relationship,
                element,
                "endpoint is a relationship",
            )),
            Some(_) => Ok(()),
        }
    }

    fn update(&mut self, patch: &ElementPatch, config: &LayoutConfig) -> Result<(), ModelError> {
        if let (Some(new), Some(current)) = (
            &patch.relationship,
            self.get(&patch.id).and_then(Element::as_relationship),
        ) {
            for (port, old) in [(&new.source, &current.source), (&new.target, &current.target)] {
                if port.element != old.element {
                    self.check_endpoint(&patch.id, &port.element)?;
                }
            }
        }
        let Some(element) = self.elements.get_mut(&patch.id) else {
            return Ok(());
        };
        if let Some(name) = &patch.name {
            element.name = name.clone();
        }
        if let Some(bounds) = patch.bounds {
            element.bounds = bounds;
        }
        if let Some(style) = &patch.style {
            element.style = style.clone();
        }
        if let Some(interactive) = patch.interactive {
            element.interactive = interactive;
        }
        if let (Some(new), ElementData::Relationship(rel)) = (&patch.relationship, &mut element.data)
        {
            *rel = new.clone();
        }
        if patch.bounds.is_some() {
            layout_members(&mut self.elements, &patch.id, config);
        }
        Ok(())
    }

    fn delete(&mut self, ids: &[ElementId], config: &LayoutConfig) {
        let doomed = self.expand_with_descendants(ids);
        let doomed_set: HashSet<&ElementId> = doomed.iter().collect();
        let mut touched_owners = Vec::new();
        for id in &doomed {
            if let Some(owner) = self.get(id).and_then(|e| e.owner.clone()) {
                if !doomed_set.contains(&owner) {
                    touched_owners.push(owner);
                }
            }
            self.detach(id);
        }
        for id in &doomed {
            self.elements.shift_remove(id);
        }
        for owner in touched_owners {
            layout_members(&mut self.elements, &owner, config);
        }
    }

    /// Remove `id` from its owner's child list and from the diagram lists
    fn detach(&mut self, id: &str) {
        let owner = self.get(id).and_then(|e| e.owner.clone());
        if let Some(shape) = owner
            .as_deref()
            .and_then(|o| self.elements.get_mut(o))
            .and_then(Element::as_shape_mut)
        {
            shape.owned_elements.retain(|child| child != id);
        }
        self.diagram.owned_elements.retain(|child| child != id);
        self.diagram.owned_relationships.retain(|child| child != id);
    }

    fn translate(&mut self, ids: &[ElementId], delta: Point) {
        for id in ids {
            if let Some(element) = self.elements.get_mut(id) {
                if !element.is_relationship() {
                    element.bounds = element.bounds.translate(delta.x, delta.y);
                }
            }
        }
    }

    fn resize(&mut self, ids: &[ElementId], delta: SizeDelta, config: &LayoutConfig) {
        for id in ids {
            let Some(element) = self.elements.get_mut(id) else {
                continue;
            };
            if element.is_relationship() {
                continue;
            }
            element.bounds.width = (element.bounds.width + delta.width).max(0.0);
            element.bounds.height = (element.bounds.height + delta.height).max(0.0);
            layout_members(&mut self.elements, id, config);
        }
    }

    fn reconnect(&mut self, connection: &Reconnection) -> Result<(), ModelError> {
        for port in [&connection.source, &connection.target] {
            self.check_endpoint(&connection.id, &port.element)?;
        }
        let rel = self
            .elements
            .get_mut(&connection.id)
            .and_then(Element::as_relationship_mut)
            .ok_or_else(|| ModelError::not_found(connection.id.clone()))?;
        rel.source = connection.source.clone();
        rel.target = connection.target.clone();
        Ok(())
    }

    fn reparent(
        &mut self,
        id: &str,
        owner: Option<&str>,
        config: &LayoutConfig,
    ) -> Result<(), ModelError> {
        let element = self.get(id).ok_or_else(|| ModelError::not_found(id))?;
        let Some(kind) = element.kind() else {
            return Err(ModelError::not_found(id));
        };
        let old_owner = element.owner.clone();
        if old_owner.as_deref() == owner {
            return Ok(());
        }

        let origin = match owner {
            Some(owner) => {
                check_containment(&self.elements, owner, id, kind)?;
                if owner == id || self.descendants(id).iter().any(|d| d == owner) {
                    return Err(ModelError::CyclicOwnership {
                        element: id.to_string(),
                        owner: owner.to_string(),
                    });
                }
                absolute_position(&self.elements, owner).unwrap_or_default()
            }
            None => Point::default(),
        };
        let absolute = absolute_position(&self.elements, id).unwrap_or_default();

        self.detach(id);
        match owner {
            Some(owner) => {
                if let Some(shape) = self.elements.get_mut(owner).and_then(Element::as_shape_mut) {
                    shape.owned_elements.push(id.to_string());
                }
            }
            None => self.diagram.owned_elements.push(id.to_string()),
        }
        if let Some(element) = self.elements.get_mut(id) {
            element.owner = owner.map(str::to_string);
            element.bounds = element.bounds.with_position(absolute - origin);
        }

        for container in old_owner.iter().map(String::as_str).chain(owner) {
            layout_members(&mut self.elements, container, config);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, Location, Port, RelationshipKind};
    use pretty_assertions::assert_eq;

    fn config() -> LayoutConfig {
        LayoutConfig::default()
    }

    fn package_with_class() -> ModelState {
        let mut state = ModelState::new(DiagramType::ClassDiagram);
        let package = Element::shape(ElementKind::Package, "pkg")
            .with_id("pkg")
            .with_bounds(Bounds::new(100.0, 100.0, 400.0, 300.0));
        let class = Element::shape(ElementKind::Class, "A")
            .with_id("a")
            .with_owner("pkg")
            .with_bounds(Bounds::new(20.0, 30.0, 100.0, 60.0));
        state
            .apply(&Action::create(vec![package, class]), &config())
            .unwrap();
        state
    }

    #[test]
    fn test_create_attaches_to_owner_and_diagram() {
        let state = package_with_class();
        assert_eq!(state.diagram.owned_elements, vec!["pkg".to_string()]);
        assert_eq!(state.get("pkg").unwrap().owned_elements(), ["a"]);
    }

    #[test]
    fn test_create_rejects_invalid_owner() {
        let mut state = package_with_class();
        let attr = Element::shape(ElementKind::ClassAttribute, "x")
            .with_id("x")
            .with_owner("pkg");
        let err = state.apply(&Action::create(vec![attr]), &config()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidContainment { .. }));
    }

    #[test]
    fn test_create_rejects_dangling_relationship() {
        let mut state = package_with_class();
        let rel = Element::relationship(
            RelationshipKind::ClassBidirectional,
            Port::new("a", Location::East),
            Port::new("ghost", Location::West),
        );
        let err = state.apply(&Action::create(vec![rel]), &config()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_update_rejects_dangling_endpoint() {
        let mut state = package_with_class();
        let b = Element::shape(ElementKind::Class, "B").with_id("b");
        let rel = Element::relationship(
            RelationshipKind::ClassBidirectional,
            Port::new("a", Location::East),
            Port::new("b", Location::West),
        )
        .with_id("r");
        state.apply(&Action::create(vec![b, rel]), &config()).unwrap();

        let mut payload = state.get("r").unwrap().as_relationship().unwrap().clone();
        payload.target = Port::new("ghost", Location::West);
        let update = Action::Update {
            values: vec![ElementPatch {
                relationship: Some(payload.clone()),
                ..ElementPatch::new("r")
            }],
        };
        let err = state.apply(&update, &config()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidEndpoint { .. }));

        payload.target = Port::new("r", Location::West);
        let update = Action::Update {
            values: vec![ElementPatch {
                relationship: Some(payload),
                ..ElementPatch::new("r")
            }],
        };
        let err = state.apply(&update, &config()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidEndpoint { .. }));
        let stored = state.get("r").unwrap().as_relationship().unwrap();
        assert_eq!(stored.target.element, "b");
    }

    #[test]
    fn test_delete_removes_descendants() {
        let mut state = package_with_class();
        state.apply(&Action::delete(["pkg"]), &config()).unwrap();
        assert!(state.elements.is_empty());
        assert!(state.diagram.owned_elements.is_empty());
    }

    #[test]
    fn test_delete_member_restacks_classifier() {
        let mut state = ModelState::new(DiagramType::ClassDiagram);
        let class = Element::shape(ElementKind::Class, "A").with_id("c");
        let a1 = Element::shape(ElementKind::ClassAttribute, "a1").with_id("a1").with_owner("c");
        let a2 = Element::shape(ElementKind::ClassAttribute, "a2").with_id("a2").with_owner("c");
        state.apply(&Action::create(vec![class, a1, a2]), &config()).unwrap();
        assert_eq!(state.get("c").unwrap().bounds.height, 100.0);

        state.apply(&Action::delete(["a1"]), &config()).unwrap();
        assert_eq!(state.get("a2").unwrap().bounds.y, 40.0);
        assert_eq!(state.get("c").unwrap().bounds.height, 70.0);
    }

    #[test]
    fn test_reparent_keeps_absolute_position() {
        let mut state = package_with_class();
        state
            .apply(
                &Action::Reparent {
                    ids: vec!["a".to_string()],
                    owner: None,
                },
                &config(),
            )
            .unwrap();
        let a = state.get("a").unwrap();
        assert_eq!(a.owner, None);
        assert_eq!(a.bounds.position(), Point::new(120.0, 130.0));
        assert!(state.get("pkg").unwrap().owned_elements().is_empty());
        assert_eq!(state.diagram.owned_elements, vec!["pkg".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let mut state = package_with_class();
        let inner = Element::shape(ElementKind::Package, "inner")
            .with_id("inner")
            .with_owner("pkg");
        state.apply(&Action::create(vec![inner]), &config()).unwrap();
        let err = state
            .apply(
                &Action::Reparent {
                    ids: vec!["pkg".to_string()],
                    owner: Some("inner".to_string()),
                },
                &config(),
            )
            .unwrap_err();
        assert!(matches!(err, ModelError::CyclicOwnership { .. }));
    }

    #[test]
    fn test_resize_clamps_at_zero() {
        let mut state = package_with_class();
        state.apply(&Action::resize_by(["a"], -500.0, 10.0), &config()).unwrap();
        let a = state.get("a").unwrap();
        assert_eq!(a.bounds.width, 0.0);
        assert_eq!(a.bounds.height, 70.0);
    }

    #[test]
    fn test_descendants_depth_first() {
        let mut state = package_with_class();
        let inner = Element::shape(ElementKind::Package, "inner")
            .with_id("inner")
            .with_owner("pkg");
        let deep = Element::shape(ElementKind::Class, "deep")
            .with_id("deep")
            .with_owner("inner");
        state.apply(&Action::create(vec![inner, deep]), &config()).unwrap();
        assert_eq!(state.descendants("pkg"), vec!["a", "inner", "deep"]);
    }
}
