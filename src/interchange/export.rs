//! Internal model to interchange document

use log::{debug, warn};

use crate::geometry::Point;
use crate::layout::absolute_position;
use crate::model::{Element, ElementData, ElementKind, ModelState, Port, Relationship, Shape};

use super::schema::{
    Collection, EditorSettings, Entity, EntityKind, EntityMember, ExternalRelationship,
    ExternalRelationshipKind, ExternalState, InteractiveElements, Position, RelationshipEnd,
    RenderMode, Size, SCHEMA_VERSION,
};

/// Interchange kind of an element kind; `None` for kinds the format lacks
pub fn entity_kind(kind: ElementKind) -> Option<EntityKind> {
    use ElementKind as K;
    match kind {
        K::Class => Some(EntityKind::Class),
        K::AbstractClass => Some(EntityKind::AbstractClass),
        K::Interface => Some(EntityKind::Interface),
        K::Enumeration => Some(EntityKind::Enumeration),
        K::ActivityInitialNode => Some(EntityKind::ActivityControlInitialNode),
        K::ActivityFinalNode => Some(EntityKind::ActivityControlFinalNode),
        K::ActivityActionNode => Some(EntityKind::ActivityActionNode),
        K::ActivityObjectNode => Some(EntityKind::ActivityObject),
        K::ActivityMergeNode => Some(EntityKind::ActivityMergeNode),
        K::ActivityForkNode => Some(EntityKind::ActivityForkNode),
        K::Package
        | K::ClassAttribute
        | K::ClassMethod
        | K::Activity
        | K::UseCase
        | K::UseCaseActor
        | K::UseCaseSystem
        | K::DeploymentNode
        | K::DeploymentComponent
        | K::DeploymentArtifact
        | K::ObjectName
        | K::ObjectAttribute => None,
    }
}

/// Build an interchange document from the model.
///
/// Members are nested under their classifier instead of appearing as
/// entities. Shapes whose kind has no interchange equivalent are dropped.
pub fn export(state: &ModelState) -> ExternalState {
    let half = Point::new(
        state.diagram.bounds.width / 2.0,
        state.diagram.bounds.height / 2.0,
    );

    let mut entities = Collection::default();
    let mut relationships = Collection::default();
    for element in state.elements.values() {
        match &element.data {
            ElementData::Shape(shape) if shape.kind.is_member() => {}
            ElementData::Shape(shape) => {
                if let Some(entity) = export_entity(state, element, shape, half) {
                    entities.insert(element.id.clone(), entity);
                }
            }
            ElementData::Relationship(rel) => {
                relationships.insert(element.id.clone(), export_relationship(element, rel));
            }
        }
    }
    debug!(entities = entities.len(), relationships = relationships.len(); "exported diagram");

    ExternalState {
        version: SCHEMA_VERSION.to_string(),
        entities,
        relationships,
        interactive_elements: InteractiveElements {
            all_ids: state
                .elements
                .values()
                .filter(|e| e.interactive)
                .map(|e| e.id.clone())
                .collect(),
        },
        editor: EditorSettings {
            canvas_size: Size {
                width: state.diagram.bounds.width,
                height: state.diagram.bounds.height,
            },
            grid_size: Some(state.diagram.grid_size),
        },
    }
}

fn export_entity(state: &ModelState, element: &Element, shape: &Shape, half: Point) -> Option<Entity> {
    let Some(kind) = entity_kind(shape.kind) else {
        warn!(id = element.id.as_str(), kind:% = shape.kind; "element kind has no interchange equivalent, dropping");
        return None;
    };

    let absolute = absolute_position(&state.elements, &element.id).unwrap_or(element.bounds.position());
    let members = |keep: fn(ElementKind) -> bool| -> Vec<EntityMember> {
        shape
            .owned_elements
            .iter()
            .filter_map(|id| state.get(id))
            .filter(|member| member.kind().is_some_and(keep))
            .map(|member| EntityMember {
                id: member.id.clone(),
                name: member.name.clone(),
            })
            .collect()
    };

    Some(Entity {
        id: element.id.clone(),
        kind,
        name: element.name.clone(),
        position: Position {
            x: absolute.x + half.x,
            y: absolute.y + half.y,
        },
        size: Size {
            width: element.bounds.width,
            height: element.bounds.height,
        },
        attributes: members(ElementKind::is_attribute),
        methods: members(ElementKind::is_method),
        render_mode: RenderMode::default(),
    })
}

fn export_relationship(element: &Element, rel: &Relationship) -> ExternalRelationship {
    let end = |port: &Port| RelationshipEnd {
        entity_id: port.element.clone(),
        multiplicity: port.multiplicity.clone(),
        role: port.role.clone(),
        edge: port.location.into(),
        edge_offset: 0.5,
    };
    ExternalRelationship {
        id: element.id.clone(),
        kind: ExternalRelationshipKind::AssociationUnidirectional,
        source: end(&rel.source),
        target: end(&rel.target),
        straight_line: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::layout::LayoutConfig;
    use crate::interchange::schema::Edge;
    use crate::model::{Action, DiagramType, Location, RelationshipKind};
    use pretty_assertions::assert_eq;

    fn apply(state: &mut ModelState, elements: Vec<Element>) {
        state
            .apply(&Action::create(elements), &LayoutConfig::default())
            .unwrap();
    }

    #[test]
    fn test_position_is_shifted_by_half_canvas() {
        let mut state = ModelState::new(DiagramType::ClassDiagram);
        state.diagram.bounds = Bounds::new(0.0, 0.0, 1000.0, 800.0);
        apply(
            &mut state,
            vec![Element::shape(ElementKind::Class, "A")
                .with_id("a")
                .with_bounds(Bounds::new(-100.0, -50.0, 200.0, 100.0))],
        );

        let external = export(&state);
        let entity = external.entities.get("a").unwrap();
        assert_eq!(entity.position, Position { x: 400.0, y: 350.0 });
        assert_eq!(entity.kind, EntityKind::Class);
        assert_eq!(external.editor.canvas_size, Size { width: 1000.0, height: 800.0 });
    }

    #[test]
    fn test_members_are_nested_not_entities() {
        let mut state = ModelState::new(DiagramType::ClassDiagram);
        apply(
            &mut state,
            vec![
                Element::shape(ElementKind::Class, "A").with_id("a"),
                Element::shape(ElementKind::ClassMethod, "run()").with_id("m").with_owner("a"),
                Element::shape(ElementKind::ClassAttribute, "x").with_id("x").with_owner("a"),
            ],
        );

        let external = export(&state);
        assert_eq!(external.entities.all_ids, vec!["a"]);
        let entity = external.entities.get("a").unwrap();
        assert_eq!(
            entity.attributes,
            vec![EntityMember { id: "x".to_string(), name: "x".to_string() }]
        );
        assert_eq!(
            entity.methods,
            vec![EntityMember { id: "m".to_string(), name: "run()".to_string() }]
        );
    }

    #[test]
    fn test_nested_shape_exports_absolute_position() {
        let mut state = ModelState::new(DiagramType::ClassDiagram);
        apply(
            &mut state,
            vec![
                Element::shape(ElementKind::Package, "pkg")
                    .with_id("pkg")
                    .with_bounds(Bounds::new(100.0, 100.0, 400.0, 300.0)),
                Element::shape(ElementKind::Class, "A")
                    .with_id("a")
                    .with_owner("pkg")
                    .with_bounds(Bounds::new(10.0, 20.0, 100.0, 60.0)),
            ],
        );

        let external = export(&state);
        // Packages have no interchange kind; the nested class survives on its own
        assert_eq!(external.entities.all_ids, vec!["a"]);
        assert_eq!(
            external.entities.get("a").unwrap().position,
            Position { x: 910.0, y: 920.0 }
        );
    }

    #[test]
    fn test_unmapped_kinds_are_dropped() {
        let mut state = ModelState::new(DiagramType::UseCaseDiagram);
        apply(
            &mut state,
            vec![
                Element::shape(ElementKind::UseCase, "login").with_id("u"),
                Element::shape(ElementKind::UseCaseActor, "user").with_id("actor"),
            ],
        );
        assert!(export(&state).entities.is_empty());
    }

    #[test]
    fn test_relationship_ports_become_edges() {
        let mut state = ModelState::new(DiagramType::ClassDiagram);
        apply(
            &mut state,
            vec![
                Element::shape(ElementKind::Class, "A").with_id("a"),
                Element::shape(ElementKind::Class, "B").with_id("b"),
                Element::relationship(
                    RelationshipKind::ClassAggregation,
                    Port::new("a", Location::South).with_multiplicity("1"),
                    Port::new("b", Location::North).with_role("parts"),
                )
                .with_id("r"),
            ],
        );

        let rel = export(&state).relationships.get("r").cloned().unwrap();
        assert_eq!(rel.kind, ExternalRelationshipKind::AssociationUnidirectional);
        assert_eq!(rel.source.edge, Edge::Bottom);
        assert_eq!(rel.source.multiplicity.as_deref(), Some("1"));
        assert_eq!(rel.target.edge, Edge::Top);
        assert_eq!(rel.target.role.as_deref(), Some("parts"));
        assert_eq!(rel.target.edge_offset, 0.5);
        assert!(!rel.straight_line);
    }

    #[test]
    fn test_relationship_json_fragment() {
        let mut state = ModelState::new(DiagramType::ClassDiagram);
        apply(
            &mut state,
            vec![
                Element::shape(ElementKind::Class, "A").with_id("a"),
                Element::shape(ElementKind::Class, "B").with_id("b"),
                Element::relationship(
                    RelationshipKind::ClassUnidirectional,
                    Port::new("a", Location::East),
                    Port::new("b", Location::West),
                )
                .with_id("r"),
            ],
        );

        let rel = export(&state).relationships.get("r").cloned().unwrap();
        insta::assert_json_snapshot!(rel, @r###"
        {
          "id": "r",
          "kind": "ASSOCIATION_UNIDIRECTIONAL",
          "source": {
            "entityId": "a",
            "multiplicity": null,
            "role": null,
            "edge": "RIGHT",
            "edgeOffset": 0.5
          },
          "target": {
            "entityId": "b",
            "multiplicity": null,
            "role": null,
            "edge": "LEFT",
            "edgeOffset": 0.5
          },
          "straightLine": false
        }
        "###);
    }
}
