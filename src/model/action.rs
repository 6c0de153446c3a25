//! Element lifecycle actions dispatched against the model

use crate::geometry::{Bounds, Point};

use super::element::{Element, ElementId, Port, Relationship, Style};

/// Change in width and height applied by a resize
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeDelta {
    pub width: f64,
    pub height: f64,
}

impl SizeDelta {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// New endpoints for an existing relationship
#[derive(Debug, Clone, PartialEq)]
pub struct Reconnection {
    pub id: ElementId,
    pub source: Port,
    pub target: Port,
}

/// Partial update of one element; `None` fields are left untouched
#[derive(Debug, Clone, PartialEq)]
pub struct ElementPatch {
    pub id: ElementId,
    pub name: Option<String>,
    pub bounds: Option<Bounds>,
    pub style: Option<Style>,
    pub interactive: Option<bool>,
    /// Replaces the relationship payload; ignored for shapes
    pub relationship: Option<Relationship>,
}

impl ElementPatch {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            bounds: None,
            style: None,
            interactive: None,
            relationship: None,
        }
    }

    /// A patch carrying every mutable field of `element`
    pub fn full(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            name: Some(element.name.clone()),
            bounds: Some(element.bounds),
            style: Some(element.style.clone()),
            interactive: Some(element.interactive),
            relationship: element.as_relationship().cloned(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }
}

/// An action tagged by lifecycle event type
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Insert new elements; owners must already exist or precede their children
    Create { values: Vec<Element> },
    Update { values: Vec<ElementPatch> },
    /// Remove elements and everything they own from the model
    Delete { ids: Vec<ElementId> },
    /// Translate owner-relative positions
    Move { ids: Vec<ElementId>, delta: Point },
    Resize { ids: Vec<ElementId>, delta: SizeDelta },
    Reconnect { connections: Vec<Reconnection> },
    /// Change owner while keeping the diagram-absolute position
    Reparent {
        ids: Vec<ElementId>,
        owner: Option<ElementId>,
    },
    /// Detach elements from their owner's child list and the diagram's lists
    Remove { ids: Vec<ElementId> },
    /// Commit a recomputed relationship path
    Layout {
        id: ElementId,
        path: Vec<Point>,
        bounds: Bounds,
    },
}

impl Action {
    /// Event tag used in logs and the commit journal
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Create { .. } => "CREATE",
            Self::Update { .. } => "UPDATE",
            Self::Delete { .. } => "DELETE",
            Self::Move { .. } => "MOVE",
            Self::Resize { .. } => "RESIZE",
            Self::Reconnect { .. } => "RECONNECT",
            Self::Reparent { .. } => "REPARENT",
            Self::Remove { .. } => "REMOVE",
            Self::Layout { .. } => "LAYOUT",
        }
    }

    pub fn create(values: Vec<Element>) -> Self {
        Self::Create { values }
    }

    pub fn delete<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        Self::Delete {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn move_by<I, S>(ids: I, dx: f64, dy: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        Self::Move {
            ids: ids.into_iter().map(Into::into).collect(),
            delta: Point::new(dx, dy),
        }
    }

    pub fn resize_by<I, S>(ids: I, dw: f64, dh: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        Self::Resize {
            ids: ids.into_iter().map(Into::into).collect(),
            delta: SizeDelta::new(dw, dh),
        }
    }
}
