mod tessellate_curve;
mod tessellate_face;
mod tessellate_solid;

pub use tessellate_curve::TessellateCurve;
pub use tessellate_face::TessellateFace;
pub use tessellate_solid::TessellateSolid;

use std::collections::HashMap;

use crate::math::{point_key, Point3, Vector3};
use crate::topology::MaterialId;

/// Coarseness presets for curved geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelOfDetail {
    /// Few segments; used for the triangle-soup fallback.
    Coarse,
    /// The export default.
    #[default]
    Default,
    /// Dense sampling.
    Fine,
}

/// Parameters controlling tessellation quality.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams {
    /// Maximum allowed deviation from the true geometry.
    pub tolerance: f64,
    /// Minimum number of segments for a full turn.
    pub min_segments: usize,
    /// Maximum number of segments for a full turn.
    pub max_segments: usize,
}

impl TessellationParams {
    /// Parameters for a level of detail.
    #[must_use]
    pub fn for_level(level: LevelOfDetail) -> Self {
        match level {
            LevelOfDetail::Coarse => Self {
                tolerance: 0.1,
                min_segments: 4,
                max_segments: 32,
            },
            LevelOfDetail::Default => Self {
                tolerance: 0.01,
                min_segments: 4,
                max_segments: 256,
            },
            LevelOfDetail::Fine => Self {
                tolerance: 0.001,
                min_segments: 8,
                max_segments: 1024,
            },
        }
    }
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self::for_level(LevelOfDetail::Default)
    }
}

/// A polyline approximation of a curve.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
}

/// A triangle mesh with an optional material per triangle.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
    /// Material of each triangle, parallel to `indices`.
    pub materials: Vec<Option<MaterialId>>,
}

impl TriangleMesh {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends a triangle given by positions.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_triangle(&mut self, corners: [Point3; 3], material: Option<MaterialId>) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices.push([base, base + 1, base + 2]);
        self.materials.push(material);
    }

    /// Corner positions of triangle `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.indices[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unnormalized normal of triangle `i` (twice its area in length).
    #[must_use]
    pub fn triangle_normal(&self, i: usize) -> Vector3 {
        let [a, b, c] = self.triangle(i);
        (b - a).cross(&(c - a))
    }

    /// Appends all triangles of `other`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
        self.materials.extend_from_slice(&other.materials);
    }

    /// Returns a copy where bit-identical positions share one vertex.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn welded(&self) -> TriangleMesh {
        let mut out = TriangleMesh::default();
        let mut index_of: HashMap<[u64; 3], u32> = HashMap::new();
        let remap: Vec<u32> = self
            .vertices
            .iter()
            .map(|p| {
                *index_of.entry(point_key(p)).or_insert_with(|| {
                    out.vertices.push(*p);
                    (out.vertices.len() - 1) as u32
                })
            })
            .collect();
        out.indices = self
            .indices
            .iter()
            .map(|t| [remap[t[0] as usize], remap[t[1] as usize], remap[t[2] as usize]])
            .collect();
        out.materials.clone_from(&self.materials);
        out
    }
}
