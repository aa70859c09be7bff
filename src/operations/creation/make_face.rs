use crate::error::Result;
use crate::geometry::surface::Plane;
use crate::math::Point3;
use crate::topology::{
    FaceData, FaceId, FaceSurface, MaterialId, TopologyStore, WireId,
};

/// Creates a face from a wire boundary and a surface.
///
/// Without an explicit surface the face is planar, with the plane fitted to
/// the outer wire so that its normal follows the wire's winding.
pub struct MakeFace {
    outer_wire: WireId,
    inner_wires: Vec<WireId>,
    surface: Option<FaceSurface>,
    material: Option<MaterialId>,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation.
    #[must_use]
    pub fn new(outer_wire: WireId, inner_wires: Vec<WireId>) -> Self {
        Self {
            outer_wire,
            inner_wires,
            surface: None,
            material: None,
        }
    }

    /// Uses `surface` instead of fitting a plane.
    #[must_use]
    pub fn with_surface(mut self, surface: FaceSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Tags the face with a host material.
    #[must_use]
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Executes the operation, creating the face in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if a wire is missing or no plane can be fitted to
    /// the outer wire.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<FaceId> {
        for &wire in std::iter::once(&self.outer_wire).chain(&self.inner_wires) {
            store.wire(wire)?;
        }
        let surface = match &self.surface {
            Some(surface) => surface.clone(),
            None => {
                let samples = boundary_samples(store, self.outer_wire)?;
                FaceSurface::Plane(Plane::from_polygon(&samples)?)
            }
        };
        let mut face = FaceData::new(surface, self.outer_wire);
        face.inner_wires.clone_from(&self.inner_wires);
        face.material = self.material;
        Ok(store.add_face(face))
    }
}

/// Points along a wire in traversal order: every vertex plus three interior
/// points of each curved edge, enough to orient a loop of arcs.
pub(crate) fn boundary_samples(store: &TopologyStore, wire: WireId) -> Result<Vec<Point3>> {
    let mut samples = Vec::new();
    for &oe in &store.wire(wire)?.edges {
        let edge = store.edge(oe.edge)?;
        let (start, _) = store.oriented_vertices(oe)?;
        samples.push(store.vertex(start)?.point);
        if edge.is_line() {
            continue;
        }
        let (t0, t1) = if oe.forward {
            (edge.t_start, edge.t_end)
        } else {
            (edge.t_end, edge.t_start)
        };
        for k in 1..4 {
            let s = f64::from(k) / 4.0;
            samples.push(edge.curve.evaluate(t0 + (t1 - t0) * s)?);
        }
    }
    Ok(samples)
}
