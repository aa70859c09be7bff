use std::f64::consts::TAU;

use crate::error::{OperationError, Result};
use crate::geometry::curve::Arc;
use crate::geometry::surface::Plane;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::shaping::Extrude;
use crate::topology::{
    EdgeCurve, EdgeData, OrientedEdge, SolidId, TopologyStore, VertexData, WireData,
};

use super::MakeFace;

/// Creates a cylinder solid from center, radius, axis, and height.
///
/// The base is a disc bounded by one full-circle edge; extruding it gives two
/// circular edges joined by a single seam line.
pub struct MakeCylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    height: f64,
}

impl MakeCylinder {
    /// Creates a new `MakeCylinder` operation.
    #[must_use]
    pub fn new(center: Point3, radius: f64, axis: Vector3, height: f64) -> Self {
        Self {
            center,
            radius,
            axis,
            height,
        }
    }

    /// Executes the operation, creating the cylinder in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or height is near zero, or the axis
    /// direction is degenerate.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        if self.radius < TOLERANCE {
            return Err(
                OperationError::InvalidInput("cylinder radius must be positive".into()).into(),
            );
        }
        if self.height.abs() < TOLERANCE {
            return Err(
                OperationError::InvalidInput("cylinder height must be non-zero".into()).into(),
            );
        }
        let axis_len = self.axis.norm();
        if axis_len < TOLERANCE {
            return Err(
                OperationError::InvalidInput("cylinder axis must be non-zero".into()).into(),
            );
        }
        let axis = self.axis / axis_len;

        let base_plane = Plane::from_normal(self.center, axis)?;
        let ref_dir = *base_plane.u_dir();
        let circle = Arc::new(self.center, self.radius, axis, ref_dir, 0.0, TAU)?;

        let seam = store.add_vertex(VertexData::new(self.center + ref_dir * self.radius));
        let edge = store.add_edge(EdgeData {
            start: seam,
            end: seam,
            curve: EdgeCurve::Arc(circle),
            t_start: 0.0,
            t_end: TAU,
        });
        let wire = store.add_wire(WireData {
            edges: vec![OrientedEdge::new(edge, true)],
            is_closed: true,
        });
        let disc = MakeFace::new(wire, vec![]).execute(store)?;
        Extrude::new(disc, axis * self.height).execute(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::{FaceSurface, SolidQuery};

    #[test]
    fn cylinder_faces() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(Point3::origin(), 1.0, Vector3::z(), 3.0)
            .execute(&mut store)
            .unwrap();
        let faces = store.faces(solid).unwrap();
        let cylinders = faces
            .iter()
            .filter(|&&f| matches!(store.face(f).unwrap().surface, FaceSurface::Cylinder(_)))
            .count();
        assert_eq!(faces.len(), 3);
        assert_eq!(cylinders, 1);
    }

    #[test]
    fn zero_radius_rejected() {
        let mut store = TopologyStore::new();
        let result = MakeCylinder::new(Point3::origin(), 0.0, Vector3::z(), 1.0).execute(&mut store);
        assert!(result.is_err());
    }
}
