//! Interchange document to internal model

use std::collections::HashSet;

use log::{debug, warn};

use crate::geometry::{Bounds, Point};
use crate::layout::{absolute_bounds, anchor_point, LayoutConfig};
use crate::model::container::append_member;
use crate::model::{DiagramType, Element, ElementKind, ModelError, ModelState, Port, RelationshipKind};

use super::schema::{
    Entity, EntityKind, ExternalRelationship, ExternalState, RelationshipEnd, SCHEMA_VERSION,
};

/// Element kind of an interchange kind; `None` for unknown kinds
pub fn element_kind(kind: &EntityKind) -> Option<ElementKind> {
    match kind {
        EntityKind::Class => Some(ElementKind::Class),
        EntityKind::AbstractClass => Some(ElementKind::AbstractClass),
        EntityKind::Enumeration => Some(ElementKind::Enumeration),
        EntityKind::Interface => Some(ElementKind::Interface),
        EntityKind::ActivityControlInitialNode => Some(ElementKind::ActivityInitialNode),
        EntityKind::ActivityControlFinalNode => Some(ElementKind::ActivityFinalNode),
        EntityKind::ActivityActionNode => Some(ElementKind::ActivityActionNode),
        EntityKind::ActivityObject => Some(ElementKind::ActivityObjectNode),
        EntityKind::ActivityMergeNode => Some(ElementKind::ActivityMergeNode),
        EntityKind::ActivityForkNode => Some(ElementKind::ActivityForkNode),
        EntityKind::Other(_) => None,
    }
}

/// Parameters of an import that the document itself does not carry
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    pub diagram_type: DiagramType,
    /// Lower bound for each canvas dimension
    pub min_canvas_size: f64,
    /// Grid size used when the document has none
    pub default_grid_size: f64,
    pub layout: LayoutConfig,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            diagram_type: DiagramType::default(),
            min_canvas_size: 1600.0,
            default_grid_size: 10.0,
            layout: LayoutConfig::default(),
        }
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagram_type(mut self, diagram_type: DiagramType) -> Self {
        self.diagram_type = diagram_type;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_min_canvas_size(mut self, size: f64) -> Self {
        self.min_canvas_size = size;
        self
    }
}

/// Rebuild a model from an interchange document.
///
/// Every entity becomes a root element; members are appended to their
/// classifier so they are stacked again. Entities of unknown kind are
/// dropped, as are relationships pointing at them. Relationships get a
/// straight seed path between their anchors which the router replaces on
/// the first recompute.
pub fn import(external: &ExternalState, options: &ImportOptions) -> Result<ModelState, ModelError> {
    if external.version != SCHEMA_VERSION {
        warn!(version = external.version.as_str(); "unsupported interchange version, importing anyway");
    }

    let mut state = ModelState::new(options.diagram_type);
    let canvas = external.editor.canvas_size;
    let half = Point::new(canvas.width / 2.0, canvas.height / 2.0);
    let interactive: HashSet<&str> = external
        .interactive_elements
        .all_ids
        .iter()
        .map(String::as_str)
        .collect();

    for entity in external.entities.iter() {
        import_entity(&mut state, entity, half, options)?;
    }
    for rel in external.relationships.iter() {
        import_relationship(&mut state, rel)?;
    }
    for (id, element) in state.elements.iter_mut() {
        element.interactive = interactive.contains(id.as_str());
    }

    state.diagram.bounds = Bounds::new(
        0.0,
        0.0,
        canvas.width.max(options.min_canvas_size),
        canvas.height.max(options.min_canvas_size),
    );
    state.diagram.grid_size = external
        .editor
        .grid_size
        .unwrap_or(options.default_grid_size);

    debug!(
        elements = state.elements.len(),
        relationships = state.diagram.owned_relationships.len();
        "imported diagram"
    );
    Ok(state)
}

fn import_entity(
    state: &mut ModelState,
    entity: &Entity,
    half: Point,
    options: &ImportOptions,
) -> Result<(), ModelError> {
    let Some(kind) = element_kind(&entity.kind) else {
        warn!(id = entity.id.as_str(), kind = entity.kind.as_str(); "unknown entity kind, dropping");
        return Ok(());
    };
    if state.elements.contains_key(&entity.id) {
        return Err(ModelError::DuplicateId {
            id: entity.id.clone(),
        });
    }

    let element = Element::shape(kind, entity.name.clone())
        .with_id(entity.id.clone())
        .with_bounds(Bounds::new(
            entity.position.x - half.x,
            entity.position.y - half.y,
            entity.size.width,
            entity.size.height,
        ));
    state.diagram.owned_elements.push(entity.id.clone());
    state.elements.insert(entity.id.clone(), element);

    if !kind.is_classifier() {
        if !entity.attributes.is_empty() || !entity.methods.is_empty() {
            warn!(id = entity.id.as_str(), kind:% = kind; "entity cannot hold members, ignoring them");
        }
        return Ok(());
    }
    let attributes = entity
        .attributes
        .iter()
        .map(|member| (ElementKind::ClassAttribute, member));
    let methods = entity
        .methods
        .iter()
        .map(|member| (ElementKind::ClassMethod, member));
    for (member_kind, member) in attributes.chain(methods) {
        let member = Element::shape(member_kind, member.name.clone()).with_id(member.id.clone());
        append_member(&mut state.elements, &entity.id, member, &options.layout)?;
    }
    Ok(())
}

fn import_relationship(state: &mut ModelState, rel: &ExternalRelationship) -> Result<(), ModelError> {
    if state.elements.contains_key(&rel.id) {
        return Err(ModelError::DuplicateId { id: rel.id.clone() });
    }
    let (Some(source_bounds), Some(target_bounds)) = (
        absolute_bounds(&state.elements, &rel.source.entity_id),
        absolute_bounds(&state.elements, &rel.target.entity_id),
    ) else {
        warn!(
            id = rel.id.as_str(),
            source = rel.source.entity_id.as_str(),
            target = rel.target.entity_id.as_str();
            "relationship endpoint missing, skipping"
        );
        return Ok(());
    };

    let source = port(&rel.source);
    let target = port(&rel.target);
    let path = vec![
        anchor_point(&source_bounds, source.location),
        anchor_point(&target_bounds, target.location),
    ];

    let mut element = Element::relationship(RelationshipKind::ClassUnidirectional, source, target)
        .with_id(rel.id.clone());
    element.bounds = Bounds::from_points(&path);
    if let Some(relationship) = element.as_relationship_mut() {
        relationship.path = path;
    }
    state.diagram.owned_relationships.push(rel.id.clone());
    state.elements.insert(rel.id.clone(), element);
    Ok(())
}

fn port(end: &RelationshipEnd) -> Port {
    Port {
        element: end.entity_id.clone(),
        location: end.edge.into(),
        multiplicity: end.multiplicity.clone(),
        role: end.role.clone(),
    }
}
