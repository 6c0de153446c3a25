//! Diagram elements: shapes, class members and relationships

use std::fmt;

use uuid::Uuid;

use crate::geometry::{Bounds, Point};

/// Unique identifier of an element within a diagram
pub type ElementId = String;

/// Generate a fresh element identifier
pub fn new_id() -> ElementId {
    Uuid::new_v4().to_string()
}

/// The closed set of shape kinds an editor can place on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Package,
    Class,
    AbstractClass,
    Interface,
    Enumeration,
    ClassAttribute,
    ClassMethod,
    Activity,
    ActivityInitialNode,
    ActivityFinalNode,
    ActivityActionNode,
    ActivityObjectNode,
    ActivityMergeNode,
    ActivityForkNode,
    UseCase,
    UseCaseActor,
    UseCaseSystem,
    DeploymentNode,
    DeploymentComponent,
    DeploymentArtifact,
    ObjectName,
    ObjectAttribute,
}

impl ElementKind {
    /// Attributes and methods that live inside a classifier
    pub fn is_member(self) -> bool {
        matches!(
            self,
            Self::ClassAttribute | Self::ClassMethod | Self::ObjectAttribute
        )
    }

    pub fn is_attribute(self) -> bool {
        matches!(self, Self::ClassAttribute | Self::ObjectAttribute)
    }

    pub fn is_method(self) -> bool {
        matches!(self, Self::ClassMethod)
    }

    /// Shapes whose children are stacked members rather than free shapes
    pub fn is_classifier(self) -> bool {
        matches!(
            self,
            Self::Class | Self::AbstractClass | Self::Interface | Self::Enumeration | Self::ObjectName
        )
    }

    /// Classifiers rendered with a stereotype line above the name
    pub fn has_stereotype(self) -> bool {
        matches!(self, Self::AbstractClass | Self::Interface | Self::Enumeration)
    }

    /// Whether an element of this kind may own an element of kind `child`
    pub fn accepts(self, child: ElementKind) -> bool {
        if self.is_classifier() {
            return child.is_member();
        }
        match self {
            Self::Package | Self::Activity | Self::UseCaseSystem | Self::DeploymentNode => {
                !child.is_member()
            }
            _ => false,
        }
    }

    /// Size a freshly created element of this kind starts with
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::ClassAttribute | Self::ClassMethod | Self::ObjectAttribute => (200.0, 30.0),
            Self::ActivityInitialNode | Self::ActivityFinalNode => (45.0, 45.0),
            Self::ActivityMergeNode => (100.0, 60.0),
            Self::ActivityForkNode => (20.0, 60.0),
            Self::UseCase => (160.0, 60.0),
            Self::UseCaseActor => (90.0, 140.0),
            Self::DeploymentArtifact | Self::DeploymentComponent => (200.0, 100.0),
            _ => (200.0, 100.0),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The closed set of relationship kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    ClassBidirectional,
    ClassUnidirectional,
    ClassInheritance,
    ClassRealization,
    ClassDependency,
    ClassAggregation,
    ClassComposition,
    ActivityControlFlow,
    UseCaseAssociation,
    UseCaseInclude,
    UseCaseExtend,
    UseCaseGeneralization,
    DeploymentAssociation,
    DeploymentDependency,
    CommunicationLink,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Compass anchor of a port on its element's bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    North,
    East,
    South,
    West,
}

impl Location {
    /// True for anchors on the left or right edge
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::North => "N",
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
        };
        f.write_str(letter)
    }
}

/// One end of a relationship
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    /// Element the relationship attaches to
    pub element: ElementId,
    pub location: Location,
    pub multiplicity: Option<String>,
    pub role: Option<String>,
}

impl Port {
    pub fn new(element: impl Into<ElementId>, location: Location) -> Self {
        Self {
            element: element.into(),
            location,
            multiplicity: None,
            role: None,
        }
    }

    pub fn with_multiplicity(mut self, multiplicity: impl Into<String>) -> Self {
        self.multiplicity = Some(multiplicity.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Which way a communication message travels along its link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    SourceToTarget,
    TargetToSource,
}

/// A message shown along a communication link
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub direction: MessageDirection,
}

/// Optional colors carried by every element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub text_color: Option<String>,
}

/// Payload of a shape element
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ElementKind,
    /// Children in containment order
    pub owned_elements: Vec<ElementId>,
}

/// Payload of a relationship element
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub source: Port,
    pub target: Port,
    /// Diagram-absolute points from the source anchor to the target anchor
    pub path: Vec<Point>,
    /// Only used by communication links
    pub messages: Vec<Message>,
    /// Where the message labels are drawn, set while routing communication links
    pub message_anchor: Option<Point>,
}

/// Type-specific part of an element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementData {
    Shape(Shape),
    Relationship(Relationship),
}

/// Any node of the diagram: a shape, a class member or a relationship
///
/// Shape bounds are owner-relative, or diagram-absolute for root elements.
/// Relationship bounds are the bounding box of their path.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub owner: Option<ElementId>,
    pub bounds: Bounds,
    pub style: Style,
    pub interactive: bool,
    pub data: ElementData,
}

impl Element {
    /// Create a shape with a fresh id and the kind's default size
    pub fn shape(kind: ElementKind, name: impl Into<String>) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: new_id(),
            name: name.into(),
            owner: None,
            bounds: Bounds::new(0.0, 0.0, width, height),
            style: Style::default(),
            interactive: false,
            data: ElementData::Shape(Shape {
                kind,
                owned_elements: Vec::new(),
            }),
        }
    }

    /// Create an unrouted relationship with a fresh id
    pub fn relationship(kind: RelationshipKind, source: Port, target: Port) -> Self {
        Self {
            id: new_id(),
            name: String::new(),
            owner: None,
            bounds: Bounds::zero(),
            style: Style::default(),
            interactive: false,
            data: ElementData::Relationship(Relationship {
                kind,
                source,
                target,
                path: Vec::new(),
                messages: Vec::new(),
                message_anchor: None,
            }),
        }
    }

    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<ElementId>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        if let ElementData::Relationship(rel) = &mut self.data {
            rel.messages = messages;
        }
        self
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match &self.data {
            ElementData::Shape(shape) => Some(shape),
            ElementData::Relationship(_) => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut Shape> {
        match &mut self.data {
            ElementData::Shape(shape) => Some(shape),
            ElementData::Relationship(_) => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match &self.data {
            ElementData::Relationship(rel) => Some(rel),
            ElementData::Shape(_) => None,
        }
    }

    pub fn as_relationship_mut(&mut self) -> Option<&mut Relationship> {
        match &mut self.data {
            ElementData::Relationship(rel) => Some(rel),
            ElementData::Shape(_) => None,
        }
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self.data, ElementData::Relationship(_))
    }

    /// Shape kind, `None` for relationships
    pub fn kind(&self) -> Option<ElementKind> {
        self.as_shape().map(|s| s.kind)
    }

    /// Children of a shape; empty for relationships and leaf shapes
    pub fn owned_elements(&self) -> &[ElementId] {
        self.as_shape()
            .map(|s| s.owned_elements.as_slice())
            .unwrap_or(&[])
    }
}
