//! UML Canvas - the model and layout core of a UML diagram editor
//!
//! This library keeps relationship geometry consistent with the shapes it
//! connects while elements are created, moved, resized, reparented and
//! deleted, and translates diagrams to and from a flat JSON interchange
//! format.
//!
//! # Example
//!
//! ```rust
//! use uml_canvas::{load, save, Action, ImportOptions};
//!
//! let document = r#"{
//!     "version": "1.0",
//!     "entities": {
//!         "allIds": ["a", "b"],
//!         "byId": {
//!             "a": {"id": "a", "kind": "CLASS", "name": "A",
//!                   "position": {"x": 800, "y": 800}, "size": {"width": 100, "height": 60}},
//!             "b": {"id": "b", "kind": "CLASS", "name": "B",
//!                   "position": {"x": 1000, "y": 800}, "size": {"width": 100, "height": 60}}
//!         }
//!     },
//!     "relationships": {
//!         "allIds": ["r"],
//!         "byId": {
//!             "r": {"id": "r", "kind": "ASSOCIATION_UNIDIRECTIONAL",
//!                   "source": {"entityId": "a", "edge": "RIGHT"},
//!                   "target": {"entityId": "b", "edge": "LEFT"}}
//!         }
//!     },
//!     "editor": {"canvasSize": {"width": 1600, "height": 1600}, "gridSize": 10}
//! }"#;
//!
//! let mut editor = load(document, &ImportOptions::default()).unwrap();
//! editor.dispatch(Action::move_by(["a"], 0.0, 100.0)).unwrap();
//!
//! let json = save(editor.state(), false).unwrap();
//! assert!(json.contains("\"allIds\""));
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod interchange;
pub mod layout;
pub mod model;

pub use config::{ConfigError, EditorConfig, InterchangeConfig};
pub use editor::{Commit, Editor};
pub use error::InterchangeError;
pub use geometry::{Bounds, Point};
pub use interchange::{export, import, ExternalState, ImportOptions};
pub use layout::{LayoutConfig, RelationshipSync, RoutingMode};
pub use model::{
    Action, DiagramType, Element, ElementId, ElementKind, Location, ModelError, ModelState, Port,
    RelationshipKind,
};

use log::info;
use thiserror::Error;

/// Errors that can occur while loading, editing or saving a diagram
#[derive(Debug, Error)]
pub enum Error {
    #[error("interchange error: {0}")]
    Interchange(#[from] InterchangeError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Parse and import an interchange document, then route every relationship
///
/// The returned editor uses the layout settings of `options`.
pub fn load(source: &str, options: &ImportOptions) -> Result<Editor, Error> {
    let external = interchange::from_json(source)?;
    let state = import(&external, options)?;
    info!(elements = state.elements.len(); "Loaded diagram");

    let mut editor = Editor::new(state, options.layout.clone());
    editor.relayout();
    Ok(editor)
}

/// Export a model and serialize it, pretty-printed unless `compact`
pub fn save(state: &ModelState, compact: bool) -> Result<String, Error> {
    Ok(interchange::to_json(&export(state), compact)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: &str = r#"{
        "version": "1.0",
        "entities": {"allIds": [], "byId": {}},
        "relationships": {"allIds": [], "byId": {}},
        "interactiveElements": {"allIds": []},
        "editor": {"canvasSize": {"width": 1600, "height": 1600}, "gridSize": 10}
    }"#;

    #[test]
    fn test_load_empty_document() {
        let editor = load(EMPTY, &ImportOptions::default()).unwrap();
        assert!(editor.state().elements.is_empty());
        assert!(editor.journal().is_empty());
    }

    #[test]
    fn test_load_reports_syntax_errors() {
        let err = load("{ not json", &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Interchange(InterchangeError::Syntax { .. })));
    }

    #[test]
    fn test_save_compact_is_single_line() {
        let editor = load(EMPTY, &ImportOptions::default()).unwrap();
        let json = save(editor.state(), true).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with(r#"{"version":"1.0""#));
    }
}
