//! Relationship layout engine
//!
//! Resolves port anchors against owner-relative bounds, routes relationship
//! paths, diffs them against the stored geometry and decides which
//! relationships must be recomputed or removed after each lifecycle action.

pub mod config;
pub mod diff;
pub mod orchestrator;
pub mod port;
pub mod routing;

pub use config::LayoutConfig;
pub use diff::{diff, RelationshipPatch};
pub use orchestrator::RelationshipSync;
pub use port::{absolute_bounds, absolute_position, anchor_point};
pub use routing::{route, RoutedPath, RoutingMode};
