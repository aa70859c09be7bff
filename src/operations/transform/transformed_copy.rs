use std::collections::HashMap;

use crate::error::Result;
use crate::math::Matrix4;
use crate::topology::{
    EdgeId, FaceId, OrientedEdge, ShellData, ShellId, SolidData, SolidId, TopologyStore, VertexId,
    WireData, WireId,
};

use super::GeneralTransform;

/// Deep-copies a solid and applies a rigid transform to the copy.
///
/// The source solid is left untouched. Shared edges and vertices stay shared
/// in the copy.
pub struct TransformedCopy {
    solid: SolidId,
    matrix: Matrix4,
}

impl TransformedCopy {
    /// Creates a new `TransformedCopy` operation.
    #[must_use]
    pub fn new(solid: SolidId, matrix: Matrix4) -> Self {
        Self { solid, matrix }
    }

    /// Executes the copy, returning the new solid.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity of the source is missing or the matrix
    /// is not rigid.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let source = store.solid(self.solid)?.clone();
        let mut copier = Copier::default();
        let outer_shell = copier.shell(store, source.outer_shell)?;
        let inner_shells = source
            .inner_shells
            .iter()
            .map(|&s| copier.shell(store, s))
            .collect::<Result<Vec<_>>>()?;
        let copy = store.add_solid(SolidData {
            outer_shell,
            inner_shells,
        });
        GeneralTransform::new(copy, self.matrix).execute(store)?;
        Ok(copy)
    }
}

#[derive(Default)]
struct Copier {
    vertices: HashMap<VertexId, VertexId>,
    edges: HashMap<EdgeId, EdgeId>,
}

impl Copier {
    fn vertex(&mut self, store: &mut TopologyStore, id: VertexId) -> Result<VertexId> {
        if let Some(&copy) = self.vertices.get(&id) {
            return Ok(copy);
        }
        let data = store.vertex(id)?.clone();
        let copy = store.add_vertex(data);
        self.vertices.insert(id, copy);
        Ok(copy)
    }

    fn edge(&mut self, store: &mut TopologyStore, id: EdgeId) -> Result<EdgeId> {
        if let Some(&copy) = self.edges.get(&id) {
            return Ok(copy);
        }
        let mut data = store.edge(id)?.clone();
        data.start = self.vertex(store, data.start)?;
        data.end = self.vertex(store, data.end)?;
        let copy = store.add_edge(data);
        self.edges.insert(id, copy);
        Ok(copy)
    }

    fn wire(&mut self, store: &mut TopologyStore, id: WireId) -> Result<WireId> {
        let source = store.wire(id)?.clone();
        let edges = source
            .edges
            .iter()
            .map(|oe| Ok(OrientedEdge::new(self.edge(store, oe.edge)?, oe.forward)))
            .collect::<Result<Vec<_>>>()?;
        Ok(store.add_wire(WireData {
            edges,
            is_closed: source.is_closed,
        }))
    }

    fn face(&mut self, store: &mut TopologyStore, id: FaceId) -> Result<FaceId> {
        let mut data = store.face(id)?.clone();
        data.outer_wire = self.wire(store, data.outer_wire)?;
        data.inner_wires = data
            .inner_wires
            .iter()
            .map(|&w| self.wire(store, w))
            .collect::<Result<Vec<_>>>()?;
        Ok(store.add_face(data))
    }

    fn shell(&mut self, store: &mut TopologyStore, id: ShellId) -> Result<ShellId> {
        let source = store.shell(id)?.clone();
        let faces = source
            .faces
            .iter()
            .map(|&f| self.face(store, f))
            .collect::<Result<Vec<_>>>()?;
        Ok(store.add_shell(ShellData {
            faces,
            is_closed: source.is_closed,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::MakeBox;
    use crate::topology::SolidQuery;

    #[test]
    fn copy_leaves_source_in_place() {
        let mut store = TopologyStore::new();
        let source = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let copy = TransformedCopy::new(source, Matrix4::new_translation(&Vector3::new(0.0, 0.0, 5.0)))
            .execute(&mut store)
            .unwrap();

        assert_eq!(store.edges(copy).unwrap().len(), 12);
        let lowest = |solid| {
            store
                .edges(solid)
                .unwrap()
                .into_iter()
                .map(|e| store.vertex(store.edge(e).unwrap().start).unwrap().point.z)
                .fold(f64::INFINITY, f64::min)
        };
        assert!(lowest(source).abs() < 1e-12);
        assert!((lowest(copy) - 5.0).abs() < 1e-12);

        store.remove_solid(copy).unwrap();
        assert!(store.contains_solid(source));
        assert_eq!(store.edges(source).unwrap().len(), 12);
    }
}
