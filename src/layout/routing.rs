//! Relationship routing between element ports

use serde::Deserialize;

use crate::geometry::{Bounds, Point};
use crate::model::{Location, Port, RelationshipKind};

use super::config::LayoutConfig;
use super::port::anchor_point;

/// Routing mode for relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Straight line from source anchor to target anchor
    Direct,
    /// Horizontal and vertical segments only
    #[default]
    Orthogonal,
}

/// Routing mode a relationship kind uses unless overridden
pub fn default_mode(kind: RelationshipKind) -> RoutingMode {
    match kind {
        RelationshipKind::UseCaseAssociation
        | RelationshipKind::UseCaseInclude
        | RelationshipKind::UseCaseExtend
        | RelationshipKind::UseCaseGeneralization
        | RelationshipKind::CommunicationLink => RoutingMode::Direct,
        RelationshipKind::ClassBidirectional
        | RelationshipKind::ClassUnidirectional
        | RelationshipKind::ClassInheritance
        | RelationshipKind::ClassRealization
        | RelationshipKind::ClassDependency
        | RelationshipKind::ClassAggregation
        | RelationshipKind::ClassComposition
        | RelationshipKind::ActivityControlFlow
        | RelationshipKind::DeploymentAssociation
        | RelationshipKind::DeploymentDependency => RoutingMode::Orthogonal,
    }
}

/// A routed relationship: its points and their bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub path: Vec<Point>,
    pub bounds: Bounds,
}

impl RoutedPath {
    fn new(path: Vec<Point>) -> Self {
        let bounds = Bounds::from_points(&path);
        Self { path, bounds }
    }
}

/// Route a relationship between two diagram-absolute bounds.
///
/// The path always starts at the source port's anchor and ends at the target
/// port's anchor. Identical inputs always produce identical output.
pub fn route(
    source: &Bounds,
    target: &Bounds,
    source_port: &Port,
    target_port: &Port,
    mode: RoutingMode,
    config: &LayoutConfig,
) -> RoutedPath {
    let start = anchor_point(source, source_port.location);
    let end = anchor_point(target, target_port.location);

    match mode {
        RoutingMode::Direct => RoutedPath::new(vec![start, end]),
        RoutingMode::Orthogonal => RoutedPath::new(route_orthogonal(
            start,
            source_port.location,
            end,
            target_port.location,
            config,
        )),
    }
}

/// Create an orthogonal path between two anchors leaving in the given directions
pub fn route_orthogonal(
    start: Point,
    from: Location,
    end: Point,
    to: Location,
    config: &LayoutConfig,
) -> Vec<Point> {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    let threshold = config.bend_threshold;

    if from == to {
        return route_same_side(start, end, from, config.min_final_segment);
    }

    match (from.is_horizontal(), to.is_horizontal()) {
        // Side exits on both ends: vertical channel between them
        (true, true) => {
            if dy < threshold {
                return vec![start, end];
            }
            let mid_x = channel(start.x, end.x, config.min_final_segment);
            vec![
                start,
                Point::new(mid_x, start.y),
                Point::new(mid_x, end.y),
                end,
            ]
        }
        // Top/bottom exits on both ends: horizontal channel between them
        (false, false) => {
            if dx < threshold {
                return vec![start, end];
            }
            let mid_y = channel(start.y, end.y, config.min_final_segment);
            vec![
                start,
                Point::new(start.x, mid_y),
                Point::new(end.x, mid_y),
                end,
            ]
        }
        (true, false) => {
            if dx < threshold || dy < threshold {
                return vec![start, end];
            }
            vec![start, Point::new(end.x, start.y), end]
        }
        (false, true) => {
            if dx < threshold || dy < threshold {
                return vec![start, end];
            }
            vec![start, Point::new(start.x, end.y), end]
        }
    }
}

/// Both ports face `side`: the connecting segment runs `margin` beyond the outermost anchor
fn route_same_side(start: Point, end: Point, side: Location, margin: f64) -> Vec<Point> {
    match side {
        Location::North | Location::South => {
            let y = if side == Location::North {
                start.y.min(end.y) - margin
            } else {
                start.y.max(end.y) + margin
            };
            vec![start, Point::new(start.x, y), Point::new(end.x, y), end]
        }
        Location::East | Location::West => {
            let x = if side == Location::West {
                start.x.min(end.x) - margin
            } else {
                start.x.max(end.x) + margin
            };
            vec![start, Point::new(x, start.y), Point::new(x, end.y), end]
        }
    }
}

/// Coordinate of the connecting segment between `from` and `to`.
///
/// Uses the midpoint when there is room; otherwise keeps the last segment at
/// least `margin` long.
fn channel(from: f64, to: f64, margin: f64) -> f64 {
    let distance = to - from;
    if distance.abs() > margin * 2.0 || distance.abs() <= margin {
        (from + to) / 2.0
    } else {
        to - margin * distance.signum()
    }
}

/// Where a communication link draws its messages.
///
/// Placed at the middle of the path: to the right of mostly vertical paths,
/// above mostly horizontal ones.
pub fn message_anchor(path: &[Point], offset: f64) -> Option<Point> {
    match path {
        [] => None,
        [only] => Some(*only),
        _ => {
            let mid_idx = path.len() / 2;
            let p1 = path[mid_idx - 1];
            let p2 = path[mid_idx];
            let mid = Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0);

            let start = path[0];
            let end = path[path.len() - 1];
            if (end.y - start.y).abs() > (end.x - start.x).abs() {
                Some(mid.translate(offset, 0.0))
            } else {
                Some(mid.translate(0.0, -offset))
            }
        }
    }
}
