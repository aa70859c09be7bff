use crate::error::Result;
use crate::tessellation::{TessellateSolid, TessellationParams};
use crate::topology::{SolidId, TopologyStore};

/// Computes the volume of a solid.
///
/// Uses tessellation and the signed tetrahedron method. For each triangle,
/// computes `(1/6) * v0 . (v1 x v2)` and sums over all triangles. Face
/// tessellations wind about the outward normal, so the sum is positive for
/// a well-formed solid; the absolute value is returned.
pub struct Volume {
    solid: SolidId,
    params: TessellationParams,
}

impl Volume {
    /// Creates a new `Volume` query with default tessellation parameters.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            params: TessellationParams::default(),
        }
    }

    /// Sets custom tessellation parameters for higher accuracy.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the query, returning the volume (absolute value).
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be tessellated.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        let mesh = TessellateSolid::new(self.solid, self.params).execute(store)?;

        // Tetrahedra against the first vertex keep the terms small for
        // solids far from the origin.
        let Some(apex) = mesh.vertices.first().copied() else {
            return Ok(0.0);
        };
        let signed_volume: f64 = (0..mesh.triangle_count())
            .map(|i| {
                let [v0, v1, v2] = mesh.triangle(i);
                (v0 - apex).dot(&(v1 - apex).cross(&(v2 - apex)))
            })
            .sum();

        Ok(signed_volume.abs() / 6.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::{MakeBox, MakeCylinder};
    use crate::tessellation::LevelOfDetail;
    use std::f64::consts::PI;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn box_volume() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 3.0, 4.0))
            .execute(&mut store)
            .unwrap();

        let volume = Volume::new(solid).execute(&store).unwrap();
        assert!((volume - 24.0).abs() < 1e-9, "expected 24.0, got {volume}");
    }

    #[test]
    fn offset_box_volume() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(1000.0, 2.0, 3.0), p(1002.0, 5.0, 7.0))
            .execute(&mut store)
            .unwrap();

        let volume = Volume::new(solid).execute(&store).unwrap();
        assert!((volume - 24.0).abs() < 1e-6, "expected 24.0, got {volume}");
    }

    #[test]
    fn cylinder_volume() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(p(0.0, 0.0, 0.0), 2.0, Vector3::z(), 5.0)
            .execute(&mut store)
            .unwrap();

        let volume = Volume::new(solid)
            .with_params(TessellationParams::for_level(LevelOfDetail::Fine))
            .execute(&store)
            .unwrap();
        let expected = 20.0 * PI;
        assert!(
            (volume - expected).abs() < expected * 0.01,
            "expected ~{expected:.2}, got {volume:.2}"
        );
    }
}
