use crate::geometry::curve::{Arc, Curve, Helix, Line};
use crate::error::Result;
use crate::math::{Matrix4, Point3};

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// The geometric curve associated with an edge.
#[derive(Debug, Clone)]
pub enum EdgeCurve {
    /// A line segment.
    Line(Line),
    /// A circular arc.
    Arc(Arc),
    /// A circular helix.
    Helix(Helix),
}

impl EdgeCurve {
    /// Evaluates the underlying curve at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn evaluate(&self, t: f64) -> Result<Point3> {
        match self {
            Self::Line(c) => c.evaluate(t),
            Self::Arc(c) => c.evaluate(t),
            Self::Helix(c) => c.evaluate(t),
        }
    }

    /// Length of the curve between two parameters.
    #[must_use]
    pub fn length_between(&self, t0: f64, t1: f64) -> f64 {
        match self {
            Self::Line(c) => c.length_between(t0, t1),
            Self::Arc(c) => c.length_between(t0, t1),
            Self::Helix(c) => c.length_between(t0, t1),
        }
    }

    /// Returns the curve mapped through a rigid transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformed frame collapses.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        Ok(match self {
            Self::Line(c) => Self::Line(c.transformed(matrix)?),
            Self::Arc(c) => Self::Arc(c.transformed(matrix)?),
            Self::Helix(c) => Self::Helix(c.transformed(matrix)?),
        })
    }
}

/// Data associated with a topological edge.
///
/// An edge connects two vertices and carries a geometric curve
/// that defines the shape of the edge between them.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// The geometric curve defining this edge's shape.
    pub curve: EdgeCurve,
    /// Parameter on the curve corresponding to the start vertex.
    pub t_start: f64,
    /// Parameter on the curve corresponding to the end vertex.
    pub t_end: f64,
}

impl EdgeData {
    /// Arc length of the edge.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.curve.length_between(self.t_start, self.t_end)
    }

    /// Whether the edge is a straight segment.
    #[must_use]
    pub fn is_line(&self) -> bool {
        matches!(self.curve, EdgeCurve::Line(_))
    }
}
