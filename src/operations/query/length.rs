use crate::error::Result;
use crate::topology::{EdgeId, TopologyStore};

/// Computes the length of a curve (edge).
pub struct Length {
    edge: EdgeId,
}

impl Length {
    /// Creates a new `Length` query.
    #[must_use]
    pub fn new(edge: EdgeId) -> Self {
        Self { edge }
    }

    /// Executes the query, returning the curve length between the edge's
    /// parameter bounds.
    ///
    /// Lines are parameterized by arc length, arcs give `radius * |sweep|`
    /// and helices combine the circular and axial rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not found.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        Ok(store.edge(self.edge)?.length())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Helix;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::MakeWire;
    use crate::topology::{EdgeCurve, EdgeData, VertexData};
    use std::f64::consts::TAU;

    #[test]
    fn line_length_3_4_5() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0)],
            false,
        )
        .execute(&mut store)
        .unwrap();
        let edge_id = store.wire(wire).unwrap().edges[0].edge;

        let len = Length::new(edge_id).execute(&store).unwrap();
        assert!((len - 5.0).abs() < 1e-10);
    }

    #[test]
    fn helix_turn_length() {
        let mut store = TopologyStore::new();
        let helix = Helix::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x(), 2.0, 0.0, TAU)
            .unwrap();
        let a = store.add_vertex(VertexData::new(Point3::new(1.0, 0.0, 0.0)));
        let b = store.add_vertex(VertexData::new(Point3::new(1.0, 0.0, 2.0)));
        let edge = store.add_edge(EdgeData {
            start: a,
            end: b,
            curve: EdgeCurve::Helix(helix),
            t_start: 0.0,
            t_end: TAU,
        });

        let len = Length::new(edge).execute(&store).unwrap();
        assert!((len - TAU.hypot(2.0)).abs() < 1e-10);
    }
}
