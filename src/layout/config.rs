//! Configuration for member stacking and relationship routing

use serde::Deserialize;

use crate::model::{ElementKind, RelationshipKind};

use super::routing::{default_mode, RoutingMode};

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of a classifier's name compartment
    pub header_height: f64,

    /// Header height for classifiers showing a stereotype
    pub stereotype_header_height: f64,

    /// Height of one attribute or method row
    pub member_height: f64,

    /// Offsets below this are drawn as a straight segment instead of a bend
    pub bend_threshold: f64,

    /// Minimum length of the last orthogonal segment
    pub min_final_segment: f64,

    /// Distance between a communication link and its message labels
    pub message_offset: f64,

    /// Forces one routing mode for every relationship kind
    pub routing: Option<RoutingMode>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_height: 40.0,
            stereotype_header_height: 50.0,
            member_height: 30.0,
            bend_threshold: 15.0,
            min_final_segment: 15.0,
            message_offset: 10.0,
            routing: None,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the member row height
    pub fn with_member_height(mut self, height: f64) -> Self {
        self.member_height = height;
        self
    }

    /// Force a routing mode for all relationships
    pub fn with_routing(mut self, mode: RoutingMode) -> Self {
        self.routing = Some(mode);
        self
    }

    /// Header height used when stacking members of `kind`
    pub fn header_height(&self, kind: ElementKind) -> f64 {
        if kind.has_stereotype() {
            self.stereotype_header_height
        } else {
            self.header_height
        }
    }

    /// Routing mode for a relationship kind, honoring the override
    pub fn routing_mode(&self, kind: RelationshipKind) -> RoutingMode {
        self.routing.unwrap_or_else(|| default_mode(kind))
    }
}
