pub mod edge;
pub mod face;
pub mod mesh;
pub mod shell;
pub mod solid;
mod solid_query;
pub mod vertex;
pub mod wire;

pub use edge::{EdgeCurve, EdgeData, EdgeId};
pub use face::{FaceData, FaceId, FaceSurface, MaterialId};
pub use mesh::{MeshData, MeshId};
pub use shell::{ShellData, ShellId};
pub use solid::{SolidData, SolidId};
pub use solid_query::SolidQuery;
pub use vertex::{VertexData, VertexId};
pub use wire::{OrientedEdge, WireData, WireId};

use std::collections::HashSet;

use crate::error::TopologyError;
use crate::math::Point3;
use slotmap::SlotMap;

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
    solids: SlotMap<SolidId, SolidData>,
    meshes: SlotMap<MeshId, MeshData>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    // --- Edge operations ---

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Returns a mutable reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData, TopologyError> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    // --- Wire operations ---

    /// Inserts a wire and returns its ID.
    pub fn add_wire(&mut self, data: WireData) -> WireId {
        self.wires.insert(data)
    }

    /// Returns a reference to the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire(&self, id: WireId) -> Result<&WireData, TopologyError> {
        self.wires
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wire".into()))
    }

    // --- Face operations ---

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Returns a mutable reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    // --- Shell operations ---

    /// Inserts a shell and returns its ID.
    pub fn add_shell(&mut self, data: ShellData) -> ShellId {
        self.shells.insert(data)
    }

    /// Returns a reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn shell(&self, id: ShellId) -> Result<&ShellData, TopologyError> {
        self.shells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }

    // --- Solid operations ---

    /// Inserts a solid and returns its ID.
    pub fn add_solid(&mut self, data: SolidData) -> SolidId {
        self.solids.insert(data)
    }

    /// Returns a reference to the solid data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn solid(&self, id: SolidId) -> Result<&SolidData, TopologyError> {
        self.solids
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))
    }

    /// Start and end vertex of an edge in the direction a wire traverses it.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not found in the store.
    pub fn oriented_vertices(
        &self,
        oriented: OrientedEdge,
    ) -> Result<(VertexId, VertexId), TopologyError> {
        Ok(oriented.ends(self.edge(oriented.edge)?))
    }

    /// Vertex positions of a wire in traversal order, one per edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire or one of its entities is not found.
    pub fn wire_points(&self, wire: WireId) -> Result<Vec<Point3>, TopologyError> {
        let wire = self.wire(wire)?;
        let mut points = Vec::with_capacity(wire.edges.len());
        for &oe in &wire.edges {
            let (start, _) = self.oriented_vertices(oe)?;
            points.push(self.vertex(start)?.point);
        }
        Ok(points)
    }

    /// Returns `true` if the solid is still present.
    #[must_use]
    pub fn contains_solid(&self, id: SolidId) -> bool {
        self.solids.contains_key(id)
    }

    /// Number of solids in the store.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Removes a solid together with every shell, face, wire, edge and vertex
    /// it references.
    ///
    /// Sub-entities shared with another solid are removed as well; callers
    /// only remove solids built as independent copies.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its entities is missing.
    pub fn remove_solid(&mut self, id: SolidId) -> Result<(), TopologyError> {
        let solid = self
            .solids
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))?;

        let mut wires = Vec::new();
        let mut faces = Vec::new();
        for shell_id in solid.shells() {
            let shell = self
                .shells
                .remove(shell_id)
                .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))?;
            faces.extend(shell.faces);
        }
        for face_id in faces {
            if let Some(face) = self.faces.remove(face_id) {
                wires.push(face.outer_wire);
                wires.extend(face.inner_wires);
            }
        }

        let mut edges = HashSet::new();
        for wire_id in wires {
            if let Some(wire) = self.wires.remove(wire_id) {
                edges.extend(wire.edges.iter().map(|oe| oe.edge));
            }
        }
        for edge_id in edges {
            if let Some(edge) = self.edges.remove(edge_id) {
                self.vertices.remove(edge.start);
                self.vertices.remove(edge.end);
            }
        }
        Ok(())
    }

    // --- Mesh operations ---

    /// Inserts a host mesh and returns its ID.
    pub fn add_mesh(&mut self, data: MeshData) -> MeshId {
        self.meshes.insert(data)
    }

    /// Returns a reference to the mesh data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn mesh(&self, id: MeshId) -> Result<&MeshData, TopologyError> {
        self.meshes
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("mesh".into()))
    }

    /// Removes a host mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_mesh(&mut self, id: MeshId) -> Result<MeshData, TopologyError> {
        self.meshes
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("mesh".into()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeBox;
    use crate::tessellation::TriangleMesh;

    #[test]
    fn remove_solid_drops_every_entity() {
        let mut store = TopologyStore::new();
        let keep = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let gone = MakeBox::new(Point3::new(5.0, 0.0, 0.0), Point3::new(6.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let (vertices, edges, faces) = (store.vertices.len(), store.edges.len(), store.faces.len());

        store.remove_solid(gone).unwrap();

        assert!(!store.contains_solid(gone));
        assert!(store.contains_solid(keep));
        assert_eq!(store.solid_count(), 1);
        assert_eq!(store.faces.len(), faces - 6);
        assert_eq!(store.edges.len(), edges - 12);
        assert_eq!(store.vertices.len(), vertices - 8);
    }

    #[test]
    fn removing_twice_fails() {
        let mut store = TopologyStore::new();
        let id = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        store.remove_solid(id).unwrap();
        assert!(store.remove_solid(id).is_err());
    }

    #[test]
    fn mesh_round_trip() {
        let mut store = TopologyStore::new();
        let id = store.add_mesh(MeshData::new(TriangleMesh::default()));
        assert!(store.mesh(id).is_ok());
        store.remove_mesh(id).unwrap();
        assert!(store.mesh(id).is_err());
    }
}
