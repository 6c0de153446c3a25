//! Keeps relationship geometry in sync with element lifecycle actions
//!
//! [`RelationshipSync::react`] looks at one applied action and the model
//! snapshots before and after it, selects the relationships that need a new
//! route and returns the follow-up actions to commit:
//!
//! | Action | Relationships recomputed |
//! |---|---|
//! | Create | the created elements that are relationships |
//! | Reconnect | the reconnected relationships |
//! | Update | updated ids that denote relationships |
//! | Move / Resize / Reparent | those attached to a changed element or any of its descendants |
//! | Delete | none; relationships attached to deleted elements are removed instead |
//!
//! Adding, removing or moving a classifier member re-stacks its owner, and an
//! Update carrying bounds moves the patched shape. Relationships attached to
//! those shapes are recomputed as well.
//!
//! A relationship whose endpoint cannot be found is skipped without error so
//! the rest of the selection is still processed.

use std::collections::HashSet;

use indexmap::IndexSet;
use log::{debug, trace};

use crate::model::{Action, Element, ElementId, ElementPatch, ModelState, RelationshipKind};

use super::config::LayoutConfig;
use super::diff::diff;
use super::port::absolute_bounds;
use super::routing::{message_anchor, route};

/// Reacts to lifecycle actions with relationship layout and cleanup actions
#[derive(Debug, Clone, Copy)]
pub struct RelationshipSync<'a> {
    config: &'a LayoutConfig,
}

impl<'a> RelationshipSync<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Follow-up actions for `action`, which turned `before` into `state`
    pub fn react(&self, before: &ModelState, state: &ModelState, action: &Action) -> Vec<Action> {
        let reshaped = reshaped_by(before, state, action);
        let mut actions = self.select(state, action);
        if !reshaped.is_empty() {
            let removed: HashSet<&str> = actions
                .iter()
                .filter_map(|a| match a {
                    Action::Delete { ids } => Some(ids.iter().map(String::as_str)),
                    _ => None,
                })
                .flatten()
                .collect();
            let affected: Vec<ElementId> = affected_by_layout(state, &reshaped)
                .into_iter()
                .filter(|id| !removed.contains(id.as_str()))
                .collect();
            debug!(action = action.tag(), count = affected.len(); "relationships affected by re-stacked owners");
            let routed: HashSet<String> = actions
                .iter()
                .filter_map(|a| match a {
                    Action::Layout { id, .. } => Some(id.clone()),
                    _ => None,
                })
                .collect();
            actions.extend(self.recalc_each(
                state,
                affected
                    .iter()
                    .map(String::as_str)
                    .filter(|id| !routed.contains(*id)),
            ));
        }
        actions
    }

    fn select(&self, state: &ModelState, action: &Action) -> Vec<Action> {
        match action {
            Action::Create { values } => {
                self.recalc_each(state, values.iter().map(|v| v.id.as_str()))
            }
            Action::Reconnect { connections } => {
                self.recalc_each(state, connections.iter().map(|c| c.id.as_str()))
            }
            Action::Update { values } => self.recalc_each(
                state,
                values
                    .iter()
                    .map(|v| v.id.as_str())
                    .filter(|id| state.get(id).is_some_and(Element::is_relationship)),
            ),
            Action::Move { ids, .. } | Action::Resize { ids, .. } | Action::Reparent { ids, .. } => {
                let affected = affected_by_layout(state, ids);
                debug!(action = action.tag(), count = affected.len(); "relationships affected by layout change");
                self.recalc_each(state, affected.iter().map(String::as_str))
            }
            Action::Delete { ids } => cascade_delete(state, ids),
            Action::Remove { .. } | Action::Layout { .. } => Vec::new(),
        }
    }

    /// Recompute every relationship in the model
    pub fn recalc_all(&self, state: &ModelState) -> Vec<Action> {
        let ids: Vec<&str> = state.relationships().map(|(e, _)| e.id.as_str()).collect();
        self.recalc_each(state, ids)
    }

    fn recalc_each<'s>(
        &self,
        state: &ModelState,
        ids: impl IntoIterator<Item = &'s str>,
    ) -> Vec<Action> {
        let unique: IndexSet<&str> = ids.into_iter().collect();
        unique
            .into_iter()
            .flat_map(|id| self.recalc(state, id))
            .collect()
    }

    /// Route one relationship and return the commits needed to store the result.
    ///
    /// Returns nothing when `id` is not a relationship, when an endpoint is
    /// missing, or when the new route equals the stored one. Communication
    /// links whose layout changed also get a full element update so their
    /// message placement is stored.
    pub fn recalc(&self, state: &ModelState, id: &str) -> Vec<Action> {
        let Some(original) = state.get(id) else {
            return Vec::new();
        };
        let Some(rel) = original.as_relationship() else {
            return Vec::new();
        };
        let (Some(source), Some(target)) = (
            absolute_bounds(&state.elements, &rel.source.element),
            absolute_bounds(&state.elements, &rel.target.element),
        ) else {
            trace!(id; "relationship endpoint missing, skipping");
            return Vec::new();
        };

        let mode = self.config.routing_mode(rel.kind);
        let routed = route(&source, &target, &rel.source, &rel.target, mode, self.config);

        let mut updated = original.clone();
        updated.bounds = routed.bounds;
        if let Some(updated_rel) = updated.as_relationship_mut() {
            updated_rel.path = routed.path;
            if updated_rel.kind == RelationshipKind::CommunicationLink {
                updated_rel.message_anchor =
                    message_anchor(&updated_rel.path, self.config.message_offset);
            }
        }

        let mut actions = Vec::new();
        if let Some(patch) = diff(original, &updated) {
            trace!(id, points = updated.as_relationship().map_or(0, |r| r.path.len()); "relationship rerouted");
            let path = match patch.path {
                Some(path) => path,
                None => updated
                    .as_relationship()
                    .map(|r| r.path.clone())
                    .unwrap_or_default(),
            };
            actions.push(Action::Layout {
                id: id.to_string(),
                path,
                bounds: patch.bounds.unwrap_or(original.bounds),
            });
        }
        if rel.kind == RelationshipKind::CommunicationLink && updated != *original {
            actions.push(Action::Update {
                values: vec![ElementPatch::full(&updated)],
            });
        }
        actions
    }
}

/// Shapes whose bounds changed as a side effect of `action`: owners whose
/// members were re-stacked, plus shapes patched with new bounds
fn reshaped_by(before: &ModelState, after: &ModelState, action: &Action) -> Vec<ElementId> {
    let owner_in = |state: &ModelState, id: &str| state.get(id).and_then(|e| e.owner.clone());
    let candidates: Vec<ElementId> = match action {
        Action::Create { values } => values.iter().filter_map(|v| v.owner.clone()).collect(),
        Action::Delete { ids } => ids.iter().filter_map(|id| owner_in(before, id)).collect(),
        Action::Update { values } => values
            .iter()
            .filter(|v| v.bounds.is_some())
            .map(|v| v.id.clone())
            .collect(),
        Action::Reparent { ids, .. } => ids
            .iter()
            .flat_map(|id| [owner_in(before, id), owner_in(after, id)])
            .flatten()
            .collect(),
        _ => Vec::new(),
    };
    let unique: IndexSet<ElementId> = candidates
        .into_iter()
        .filter(|id| after.get(id).is_some_and(|e| !e.is_relationship()))
        .collect();
    unique.into_iter().collect()
}

/// Relationships whose source or target is one of `ids` or owned (at any depth) by one of them
pub fn affected_by_layout(state: &ModelState, ids: &[ElementId]) -> IndexSet<ElementId> {
    let changed: HashSet<&str> = ids.iter().map(String::as_str).collect();
    state
        .relationships()
        .filter(|(_, rel)| {
            owner_chain_contains(state, &rel.source.element, &changed)
                || owner_chain_contains(state, &rel.target.element, &changed)
        })
        .map(|(element, _)| element.id.clone())
        .collect()
}

/// Walk from `start` up its owners looking for a member of `ids`
fn owner_chain_contains<'s>(state: &'s ModelState, start: &'s str, ids: &HashSet<&str>) -> bool {
    let limit = state.elements.len();
    let mut current = Some(start);
    let mut steps = 0;
    while let Some(id) = current {
        if ids.contains(id) {
            return true;
        }
        steps += 1;
        if steps > limit {
            break;
        }
        current = state.get(id).and_then(|e| e.owner.as_deref());
    }
    false
}

/// Remove and delete every relationship attached to one of the deleted `ids`
pub fn cascade_delete(state: &ModelState, ids: &[ElementId]) -> Vec<Action> {
    let deleted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let orphaned: Vec<ElementId> = state
        .relationships()
        .filter(|(element, rel)| {
            !deleted.contains(element.id.as_str())
                && (deleted.contains(rel.source.element.as_str())
                    || deleted.contains(rel.target.element.as_str()))
        })
        .map(|(element, _)| element.id.clone())
        .collect();

    if orphaned.is_empty() {
        return Vec::new();
    }
    debug!(count = orphaned.len(); "removing relationships attached to deleted elements");
    vec![
        Action::Remove {
            ids: orphaned.clone(),
        },
        Action::Delete { ids: orphaned },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bounds, Point};
    use crate::model::{DiagramType, ElementKind, Location, Message, MessageDirection, Port};

    fn shape(id: &str, kind: ElementKind, bounds: Bounds) -> Element {
        Element::shape(kind, id).with_id(id).with_bounds(bounds)
    }

    fn link(id: &str, kind: RelationshipKind, from: &str, to: &str) -> Element {
        Element::relationship(
            kind,
            Port::new(from, Location::East),
            Port::new(to, Location::West),
        )
        .with_id(id)
    }

    fn insert(state: &mut ModelState, element: Element) {
        state.elements.insert(element.id.clone(), element);
    }

    fn two_classes() -> ModelState {
        let mut state = ModelState::new(DiagramType::ClassDiagram);
        insert(&mut state, shape("a", ElementKind::Class, Bounds::new(0.0, 0.0, 100.0, 60.0)));
        insert(&mut state, shape("b", ElementKind::Class, Bounds::new(200.0, 0.0, 100.0, 60.0)));
        insert(&mut state, link("r", RelationshipKind::ClassUnidirectional, "a", "b"));
        state
    }

    #[test]
    fn test_recalc_initial_route() {
        let config = LayoutConfig::default();
        let state = two_classes();
        let actions = RelationshipSync::new(&config).recalc(&state, "r");
        assert_eq!(
            actions,
            vec![Action::Layout {
                id: "r".to_string(),
                path: vec![Point::new(100.0, 30.0), Point::new(200.0, 30.0)],
                bounds: Bounds::new(100.0, 30.0, 100.0, 0.0),
            }]
        );
    }

    #[test]
    fn test_recalc_unchanged_route_emits_nothing() {
        let config = LayoutConfig::default();
        let mut state = two_classes();
        let sync = RelationshipSync::new(&config);
        for action in sync.recalc(&state, "r") {
            state.apply(&action, &config).unwrap();
        }
        assert!(sync.recalc(&state, "r").is_empty());
    }

    #[test]
    fn test_recalc_missing_endpoint_is_skipped() {
        let config = LayoutConfig::default();
        let mut state = two_classes();
        state.elements.shift_remove("b");
        assert!(RelationshipSync::new(&config).recalc(&state, "r").is_empty());
    }

    #[test]
    fn test_recalc_ignores_shapes_and_unknown_ids() {
        let config = LayoutConfig::default();
        let state = two_classes();
        let sync = RelationshipSync::new(&config);
        assert!(sync.recalc(&state, "a").is_empty());
        assert!(sync.recalc(&state, "zzz").is_empty());
    }

    #[test]
    fn test_affected_by_ancestor_move() {
        let mut state = two_classes();
        insert(&mut state, shape("pkg", ElementKind::Package, Bounds::new(0.0, 200.0, 400.0, 300.0)));
        insert(
            &mut state,
            shape("c", ElementKind::Class, Bounds::new(10.0, 10.0, 100.0, 60.0)).with_owner("pkg"),
        );
        insert(&mut state, link("r2", RelationshipKind::ClassUnidirectional, "b", "c"));

        let affected = affected_by_layout(&state, &["pkg".to_string()]);
        assert_eq!(affected.into_iter().collect::<Vec<_>>(), vec!["r2".to_string()]);

        let affected = affected_by_layout(&state, &["b".to_string(), "pkg".to_string()]);
        assert_eq!(affected.len(), 2);
    }

    #[test]
    fn test_cascade_delete_targets_attached_relationships() {
        let state = two_classes();
        let actions = cascade_delete(&state, &["a".to_string()]);
        assert_eq!(
            actions,
            vec![
                Action::Remove {
                    ids: vec!["r".to_string()]
                },
                Action::Delete {
                    ids: vec!["r".to_string()]
                },
            ]
        );
        assert!(cascade_delete(&state, &["unrelated".to_string()]).is_empty());
    }

    #[test]
    fn test_update_only_recalcs_relationships() {
        let config = LayoutConfig::default();
        let state = two_classes();
        let sync = RelationshipSync::new(&config);
        let update_shape = Action::Update {
            values: vec![ElementPatch::new("a").with_name("A2")],
        };
        assert!(sync.react(&state, &state, &update_shape).is_empty());

        let update_rel = Action::Update {
            values: vec![ElementPatch::new("r").with_name("uses")],
        };
        assert_eq!(sync.react(&state, &state, &update_rel).len(), 1);
    }

    #[test]
    fn test_member_create_reroutes_owner_relationships() {
        let config = LayoutConfig::default();
        let mut state = two_classes();
        for action in RelationshipSync::new(&config).recalc_all(&state) {
            state.apply(&action, &config).unwrap();
        }
        let before_member = state.clone();
        let create = Action::create(vec![Element::shape(ElementKind::ClassAttribute, "x")
            .with_id("x")
            .with_owner("a")]);
        state.apply(&create, &config).unwrap();

        let actions = RelationshipSync::new(&config).react(&before_member, &state, &create);
        let Some(Action::Layout { id, path, .. }) = actions.first() else {
            panic!("expected a layout, got {:?}", actions);
        };
        assert_eq!(id, "r");
        assert_eq!(path.first(), Some(&Point::new(100.0, 35.0)));
    }

    #[test]
    fn test_bounds_update_reroutes_attached_relationships() {
        let config = LayoutConfig::default();
        let mut state = two_classes();
        let sync = RelationshipSync::new(&config);
        for action in sync.recalc_all(&state) {
            state.apply(&action, &config).unwrap();
        }
        let before = state.clone();
        let update = Action::Update {
            values: vec![ElementPatch {
                bounds: Some(Bounds::new(0.0, 100.0, 100.0, 60.0)),
                ..ElementPatch::new("a")
            }],
        };
        state.apply(&update, &config).unwrap();
        let actions = sync.react(&before, &state, &update);
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::Layout { id, .. } if id == "r"));
    }

    #[test]
    fn test_communication_link_gets_full_update() {
        let config = LayoutConfig::default();
        let mut state = ModelState::new(DiagramType::CommunicationDiagram);
        insert(&mut state, shape("o1", ElementKind::ObjectName, Bounds::new(0.0, 0.0, 100.0, 60.0)));
        insert(&mut state, shape("o2", ElementKind::ObjectName, Bounds::new(300.0, 0.0, 100.0, 60.0)));
        insert(
            &mut state,
            link("l", RelationshipKind::CommunicationLink, "o1", "o2").with_messages(vec![Message {
                name: "ping()".to_string(),
                direction: MessageDirection::SourceToTarget,
            }]),
        );

        let actions = RelationshipSync::new(&config).recalc(&state, "l");
        assert_eq!(actions.len(), 2);
        let Action::Update { values } = &actions[1] else {
            panic!("expected an update, got {:?}", actions[1]);
        };
        let rel = values[0].relationship.as_ref().unwrap();
        assert_eq!(rel.message_anchor, Some(Point::new(200.0, 20.0)));
        assert_eq!(rel.messages.len(), 1);
    }
}
