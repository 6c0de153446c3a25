//! Error types for model mutations

use thiserror::Error;

use super::element::{ElementId, ElementKind};

/// Errors raised when an action would break a model invariant
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// Reference to an element that does not exist
    #[error("element '{id}' not found")]
    NotFound { id: ElementId },

    /// An element with this id already exists
    #[error("duplicate element id '{id}'")]
    DuplicateId { id: ElementId },

    /// Owner kind does not accept the child kind
    #[error("'{owner}' ({owner_kind}) cannot contain '{child}' ({child_kind})")]
    InvalidContainment {
        owner: ElementId,
        owner_kind: ElementKind,
        child: ElementId,
        child_kind: ElementKind,
    },

    /// Relationship endpoint is missing or is itself a relationship
    #[error("relationship '{relationship}' cannot attach to '{element}': {reason}")]
    InvalidEndpoint {
        relationship: ElementId,
        element: ElementId,
        reason: String,
    },

    /// Reparenting would make an element its own ancestor
    #[error("moving '{element}' into '{owner}' would create an ownership cycle")]
    CyclicOwnership { element: ElementId, owner: ElementId },
}

impl ModelError {
    pub fn not_found(id: impl Into<ElementId>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn invalid_endpoint(
        relationship: impl Into<ElementId>,
        element: impl Into<ElementId>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEndpoint {
            relationship: relationship.into(),
            element: element.into(),
            reason: reason.into(),
        }
    }
}
