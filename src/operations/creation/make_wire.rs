use crate::error::{OperationError, Result};
use crate::geometry::curve::Line;
use crate::math::Point3;
use crate::topology::{EdgeCurve, EdgeData, OrientedEdge, TopologyStore, VertexData, WireData, WireId};

/// Creates a polyline wire from a sequence of 3D points.
///
/// Each point becomes a vertex and each consecutive pair a line edge.
pub struct MakeWire {
    points: Vec<Point3>,
    close: bool,
}

impl MakeWire {
    /// Creates a new `MakeWire` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>, close: bool) -> Self {
        Self { points, close }
    }

    /// Executes the operation, creating the wire in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for fewer than 2 points
    /// (3 when closing), or an error if two consecutive points coincide.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<WireId> {
        let min_points = if self.close { 3 } else { 2 };
        if self.points.len() < min_points {
            return Err(OperationError::InvalidInput(format!(
                "wire needs at least {min_points} points, got {}",
                self.points.len()
            ))
            .into());
        }

        let vertices: Vec<_> = self
            .points
            .iter()
            .map(|p| store.add_vertex(VertexData::new(*p)))
            .collect();

        let n = vertices.len();
        let edge_count = if self.close { n } else { n - 1 };
        let mut edges = Vec::with_capacity(edge_count);
        for i in 0..edge_count {
            let j = (i + 1) % n;
            let (line, length) = Line::between(self.points[i], self.points[j])?;
            let edge = store.add_edge(EdgeData {
                start: vertices[i],
                end: vertices[j],
                curve: EdgeCurve::Line(line),
                t_start: 0.0,
                t_end: length,
            });
            edges.push(OrientedEdge::new(edge, true));
        }

        Ok(store.add_wire(WireData {
            edges,
            is_closed: self.close,
        }))
    }
}
