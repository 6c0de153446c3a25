//! Translation between the model and the external interchange document
//!
//! The interchange format is flat: entities carry diagram-absolute positions
//! measured from the canvas center, members are nested by id and name under
//! their entity, and relationship ends name an edge instead of a compass
//! anchor.

pub mod export;
pub mod import;
pub mod schema;

pub use export::{entity_kind, export};
pub use import::{element_kind, import, ImportOptions};
pub use schema::{
    Collection, Edge, EditorSettings, Entity, EntityKind, EntityMember, ExternalRelationship,
    ExternalRelationshipKind, ExternalState, RelationshipEnd, SCHEMA_VERSION,
};

use crate::error::InterchangeError;

/// Parse an interchange document
pub fn from_json(source: &str) -> Result<ExternalState, InterchangeError> {
    serde_json::from_str(source).map_err(InterchangeError::from)
}

/// Serialize an interchange document, pretty-printed unless `compact`
pub fn to_json(state: &ExternalState, compact: bool) -> Result<String, InterchangeError> {
    let result = if compact {
        serde_json::to_string(state)
    } else {
        serde_json::to_string_pretty(state)
    };
    result.map_err(|err| InterchangeError::Serialize(err.to_string()))
}
