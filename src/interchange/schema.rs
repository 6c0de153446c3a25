//! Serde types of the versioned interchange document
//!
//! Positions are diagram-absolute with the origin at the canvas center.
//! Collections are stored as an ordered id list plus a lookup table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::Location;

/// Version written by the exporter
pub const SCHEMA_VERSION: &str = "1.0";

/// Root of an interchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalState {
    pub version: String,
    pub entities: Collection<Entity>,
    pub relationships: Collection<ExternalRelationship>,
    #[serde(default)]
    pub interactive_elements: InteractiveElements,
    pub editor: EditorSettings,
}

/// Ordered id list plus lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection<T> {
    pub all_ids: Vec<String>,
    pub by_id: IndexMap<String, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            all_ids: Vec::new(),
            by_id: IndexMap::new(),
        }
    }
}

impl<T> Collection<T> {
    pub fn insert(&mut self, id: impl Into<String>, item: T) {
        let id = id.into();
        if self.by_id.insert(id.clone(), item).is_none() {
            self.all_ids.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    /// Items in `allIds` order; ids without an entry are skipped
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.all_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// One shape of the exported diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    pub position: Position,
    pub size: Size,
    #[serde(default)]
    pub attributes: Vec<EntityMember>,
    #[serde(default)]
    pub methods: Vec<EntityMember>,
    #[serde(default)]
    pub render_mode: RenderMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMember {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMode {
    pub show_attributes: bool,
    pub show_methods: bool,
}

impl Default for RenderMode {
    fn default() -> Self {
        Self {
            show_attributes: true,
            show_methods: true,
        }
    }
}

/// Entity kinds of the interchange format.
///
/// Unknown strings are kept in [`EntityKind::Other`] so a document with a
/// newer kind still parses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Class,
    AbstractClass,
    Enumeration,
    Interface,
    ActivityControlInitialNode,
    ActivityControlFinalNode,
    ActivityActionNode,
    ActivityObject,
    ActivityMergeNode,
    ActivityForkNode,
    Other(String),
}

impl EntityKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Class => "CLASS",
            Self::AbstractClass => "ABSTRACT_CLASS",
            Self::Enumeration => "ENUMERATION",
            Self::Interface => "INTERFACE",
            Self::ActivityControlInitialNode => "ACTIVITY_CONTROL_INITIAL_NODE",
            Self::ActivityControlFinalNode => "ACTIVITY_CONTROL_FINAL_NODE",
            Self::ActivityActionNode => "ACTIVITY_ACTION_NODE",
            Self::ActivityObject => "ACTIVITY_OBJECT",
            Self::ActivityMergeNode => "ACTIVITY_MERGE_NODE",
            Self::ActivityForkNode => "ACTIVITY_FORK_NODE",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for EntityKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "CLASS" => Self::Class,
            "ABSTRACT_CLASS" => Self::AbstractClass,
            "ENUMERATION" => Self::Enumeration,
            "INTERFACE" => Self::Interface,
            "ACTIVITY_CONTROL_INITIAL_NODE" => Self::ActivityControlInitialNode,
            "ACTIVITY_CONTROL_FINAL_NODE" => Self::ActivityControlFinalNode,
            "ACTIVITY_ACTION_NODE" => Self::ActivityActionNode,
            "ACTIVITY_OBJECT" => Self::ActivityObject,
            "ACTIVITY_MERGE_NODE" => Self::ActivityMergeNode,
            "ACTIVITY_FORK_NODE" => Self::ActivityForkNode,
            _ => Self::Other(kind),
        }
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

/// Relationship kinds of the interchange format
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExternalRelationshipKind {
    AssociationUnidirectional,
    Other(String),
}

impl From<String> for ExternalRelationshipKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "ASSOCIATION_UNIDIRECTIONAL" => Self::AssociationUnidirectional,
            _ => Self::Other(kind),
        }
    }
}

impl From<ExternalRelationshipKind> for String {
    fn from(kind: ExternalRelationshipKind) -> Self {
        match kind {
            ExternalRelationshipKind::AssociationUnidirectional => {
                "ASSOCIATION_UNIDIRECTIONAL".to_string()
            }
            ExternalRelationshipKind::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRelationship {
    pub id: String,
    pub kind: ExternalRelationshipKind,
    pub source: RelationshipEnd,
    pub target: RelationshipEnd,
    #[serde(default)]
    pub straight_line: bool,
}

/// Named side of an entity's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl From<Location> for Edge {
    fn from(location: Location) -> Self {
        match location {
            Location::North => Self::Top,
            Location::East => Self::Right,
            Location::South => Self::Bottom,
            Location::West => Self::Left,
        }
    }
}

impl From<Edge> for Location {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Top => Self::North,
            Edge::Right => Self::East,
            Edge::Bottom => Self::South,
            Edge::Left => Self::West,
        }
    }
}

fn default_edge_offset() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEnd {
    pub entity_id: String,
    #[serde(default)]
    pub multiplicity: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub edge: Edge,
    /// Fraction along the edge; only the midpoint is produced
    #[serde(default = "default_edge_offset")]
    pub edge_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElements {
    pub all_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub canvas_size: Size,
    #[serde(default)]
    pub grid_size: Option<f64>,
}
