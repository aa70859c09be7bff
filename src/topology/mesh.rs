use crate::tessellation::TriangleMesh;

slotmap::new_key_type! {
    /// Unique identifier for a host mesh in the topology store.
    pub struct MeshId;
}

/// A host triangle mesh stored next to the B-rep entities.
#[derive(Debug, Clone)]
pub struct MeshData {
    /// Triangles with their per-triangle material tags.
    pub mesh: TriangleMesh,
}

impl MeshData {
    /// Wraps a mesh.
    #[must_use]
    pub fn new(mesh: TriangleMesh) -> Self {
        Self { mesh }
    }
}
