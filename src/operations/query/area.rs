use crate::error::Result;
use crate::tessellation::{TessellateSolid, TessellationParams};
use crate::topology::{SolidId, TopologyStore};

/// Computes the total surface area of a solid.
///
/// Uses tessellation to approximate the area by summing the areas of all
/// triangles in the mesh. The accuracy depends on the tessellation parameters.
pub struct Area {
    solid: SolidId,
    params: TessellationParams,
}

impl Area {
    /// Creates a new `Area` query with default tessellation parameters.
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

    /// Executes the query, returning the total surface area.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be tessellated.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        let mesh = TessellateSolid::new(self.solid, self.params).execute(store)?;
        Ok((0..mesh.triangle_count())
            .map(|i| 0.5 * mesh.triangle_normal(i).norm())
            .sum())
    }
}
