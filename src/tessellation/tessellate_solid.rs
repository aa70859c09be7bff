use crate::error::{Result, TessellationError};
use crate::topology::{SolidId, SolidQuery, TopologyStore};

use super::{TessellateFace, TessellationParams, TriangleMesh};

/// Tessellates all faces of a solid into one welded triangle mesh.
pub struct TessellateSolid {
    solid: SolidId,
    params: TessellationParams,
    triangle_limit: Option<usize>,
}

impl TessellateSolid {
    /// Creates a new `TessellateSolid` operation.
    #[must_use]
    pub fn new(solid: SolidId, params: TessellationParams) -> Self {
        Self {
            solid,
            params,
            triangle_limit: None,
        }
    }

    /// Rejects results with more than `limit` triangles.
    #[must_use]
    pub fn with_triangle_limit(mut self, limit: usize) -> Self {
        self.triangle_limit = Some(limit);
        self
    }

    /// Executes the tessellation, returning a combined triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or any of its faces cannot be tessellated,
    /// or [`TessellationError::TooManyTriangles`] when over the limit.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        let mut combined = TriangleMesh::default();
        for face_id in store.faces(self.solid)? {
            let face_mesh = TessellateFace::new(face_id, self.params).execute(store)?;
            combined.merge(&face_mesh);
            if let Some(limit) = self.triangle_limit {
                if combined.triangle_count() > limit {
                    return Err(TessellationError::TooManyTriangles {
                        count: combined.triangle_count(),
                        limit,
                    }
                    .into());
                }
            }
        }
        Ok(combined.welded())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BodyrepError;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::{MakeBox, MakeCylinder};

    #[test]
    fn box_welds_to_eight_vertices() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        let mesh = TessellateSolid::new(solid, TessellationParams::default())
            .execute(&store)
            .unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertices.len(), 8);
    }

    #[test]
    fn limit_rejects_dense_mesh() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(Point3::origin(), 10.0, Vector3::z(), 1.0)
            .execute(&mut store)
            .unwrap();
        let err = TessellateSolid::new(solid, TessellationParams::default())
            .with_triangle_limit(10)
            .execute(&store)
            .unwrap_err();
        assert!(matches!(
            err,
            BodyrepError::Tessellation(TessellationError::TooManyTriangles { limit: 10, .. })
        ));
    }
}
