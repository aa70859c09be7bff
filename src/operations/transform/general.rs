use std::collections::HashSet;

use crate::error::{OperationError, Result};
use crate::math::{transform_point, Matrix4, TOLERANCE};
use crate::topology::{FaceSurface, SolidId, SolidQuery, TopologyStore};

/// Applies a rigid 4x4 transformation matrix to a solid in place.
pub struct GeneralTransform {
    solid: SolidId,
    matrix: Matrix4,
}

impl GeneralTransform {
    /// Creates a new `GeneralTransform` operation.
    #[must_use]
    pub fn new(solid: SolidId, matrix: Matrix4) -> Self {
        Self { solid, matrix }
    }

    /// Executes the transformation, modifying the solid in-place.
    ///
    /// Vertices, edge curves and face surfaces are mapped directly, so curve
    /// parameters stay valid.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the matrix is not a rigid
    /// motion, or an error if any topology entity is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        if !is_rigid(&self.matrix) {
            return Err(OperationError::InvalidInput(
                "only rigid transforms keep curve parameters valid".into(),
            )
            .into());
        }

        let edge_ids = store.edges(self.solid)?;
        let mut vertex_ids = HashSet::new();
        for &edge_id in &edge_ids {
            let edge = store.edge(edge_id)?;
            vertex_ids.insert(edge.start);
            vertex_ids.insert(edge.end);
        }

        for vid in vertex_ids {
            let vertex = store.vertex_mut(vid)?;
            vertex.point = transform_point(&self.matrix, &vertex.point);
        }

        for edge_id in edge_ids {
            let curve = store.edge(edge_id)?.curve.transformed(&self.matrix)?;
            store.edge_mut(edge_id)?.curve = curve;
        }

        for face_id in store.faces(self.solid)? {
            let surface = match &store.face(face_id)?.surface {
                FaceSurface::Plane(plane) => FaceSurface::Plane(plane.transformed(&self.matrix)?),
                FaceSurface::Cylinder(cyl) => FaceSurface::Cylinder(cyl.transformed(&self.matrix)?),
                FaceSurface::Ruled => FaceSurface::Ruled,
            };
            store.face_mut(face_id)?.surface = surface;
        }

        Ok(())
    }
}

/// Whether the upper 3x3 block is a proper rotation and the last row is
/// `[0, 0, 0, 1]`.
fn is_rigid(matrix: &Matrix4) -> bool {
    let linear: nalgebra::Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let gram = linear.transpose() * linear;
    (gram - nalgebra::Matrix3::identity()).abs().max() < TOLERANCE
        && (linear.determinant() - 1.0).abs() < TOLERANCE
        && matrix[(3, 0)].abs() < TOLERANCE
        && matrix[(3, 1)].abs() < TOLERANCE
        && matrix[(3, 2)].abs() < TOLERANCE
        && (matrix[(3, 3)] - 1.0).abs() < TOLERANCE
}
