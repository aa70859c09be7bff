use std::collections::HashSet;

use crate::error::Result;
use crate::operations::query::Volume;
use crate::tessellation::{TessellateSolid, TessellationParams, TriangleMesh};

use super::{EdgeId, FaceId, SolidId, TopologyStore};

/// Read-only capabilities the exporter needs from a solid.
pub trait SolidQuery {
    /// Faces of the solid, outer shell first, then void shells.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its shells is missing.
    fn faces(&self, solid: SolidId) -> Result<Vec<FaceId>>;

    /// Distinct edges of the solid in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity is missing.
    fn edges(&self, solid: SolidId) -> Result<Vec<EdgeId>>;

    /// Enclosed volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be tessellated.
    fn volume(&self, solid: SolidId) -> Result<f64>;

    /// Welded triangle mesh of the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if a face cannot be tessellated.
    fn tessellate(&self, solid: SolidId, params: TessellationParams) -> Result<TriangleMesh>;
}

impl SolidQuery for TopologyStore {
    fn faces(&self, solid: SolidId) -> Result<Vec<FaceId>> {
        let solid = self.solid(solid)?;
        let mut faces = Vec::new();
        for shell in solid.shells() {
            faces.extend_from_slice(&self.shell(shell)?.faces);
        }
        Ok(faces)
    }

    fn edges(&self, solid: SolidId) -> Result<Vec<EdgeId>> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for face_id in self.faces(solid)? {
            let face = self.face(face_id)?;
            for &wire_id in std::iter::once(&face.outer_wire).chain(&face.inner_wires) {
                for oe in &self.wire(wire_id)?.edges {
                    if seen.insert(oe.edge) {
                        edges.push(oe.edge);
                    }
                }
            }
        }
        Ok(edges)
    }

    fn volume(&self, solid: SolidId) -> Result<f64> {
        Volume::new(solid).execute(self)
    }

    fn tessellate(&self, solid: SolidId, params: TessellationParams) -> Result<TriangleMesh> {
        TessellateSolid::new(solid, params).execute(self)
    }
}
