use crate::geometry::surface::{Cylinder, Plane};

use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Host material identifier attached to faces and mesh triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// The geometric surface associated with a face.
#[derive(Debug, Clone)]
pub enum FaceSurface {
    /// A planar surface.
    Plane(Plane),
    /// A cylindrical surface.
    Cylinder(Cylinder),
    /// A ruled surface spanned between two opposite boundary edges of the
    /// face (swept side faces along arcs and helices).
    Ruled,
}

/// Data associated with a topological face.
///
/// A face is a bounded region on a surface, defined by an outer wire
/// and optionally inner wires (holes).
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The geometric surface on which this face lies.
    pub surface: FaceSurface,
    /// The outer boundary wire.
    pub outer_wire: WireId,
    /// Inner boundary wires (holes).
    pub inner_wires: Vec<WireId>,
    /// If `true`, the face normal agrees with the surface normal.
    pub same_sense: bool,
    /// Material tag, if the host assigned one.
    pub material: Option<MaterialId>,
}

impl FaceData {
    /// Creates an untagged face with no holes.
    #[must_use]
    pub fn new(surface: FaceSurface, outer_wire: WireId) -> Self {
        Self {
            surface,
            outer_wire,
            inner_wires: Vec::new(),
            same_sense: true,
            material: None,
        }
    }

    /// Returns the plane when the face is planar.
    #[must_use]
    pub fn plane(&self) -> Option<&Plane> {
        match &self.surface {
            FaceSurface::Plane(p) => Some(p),
            _ => None,
        }
    }
}
