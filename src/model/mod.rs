//! Diagram element model
//!
//! Elements are kept in a flat mapping keyed by id. Shapes form a containment
//! tree through their `owner` link; relationships are separate elements that
//! reference two ports.

pub mod action;
pub mod container;
pub mod element;
pub mod error;
pub mod state;

pub use action::{Action, ElementPatch, Reconnection, SizeDelta};
pub use element::{
    new_id, Element, ElementData, ElementId, ElementKind, Location, Message, MessageDirection,
    Port, Relationship, RelationshipKind, Shape, Style,
};
pub use error::ModelError;
pub use state::{Diagram, DiagramType, ModelState};
