use super::edge::{EdgeData, EdgeId};
use super::vertex::VertexId;

slotmap::new_key_type! {
    pub struct WireId;
}

/// An edge as a wire traverses it.
#[derive(Debug, Clone, Copy)]
pub struct OrientedEdge {
    pub edge: EdgeId,
    /// `false` when the wire runs from the edge's end vertex to its start.
    pub forward: bool,
}

impl OrientedEdge {
    #[must_use]
    pub fn new(edge: EdgeId, forward: bool) -> Self {
        Self { edge, forward }
    }

    /// Vertices of `data` (the record of `self.edge`) in traversal order.
    #[must_use]
    pub fn ends(&self, data: &EdgeData) -> (VertexId, VertexId) {
        if self.forward {
            (data.start, data.end)
        } else {
            (data.end, data.start)
        }
    }
}

/// Oriented edges joined end to start. Face boundaries are closed wires.
#[derive(Debug, Clone)]
pub struct WireData {
    pub edges: Vec<OrientedEdge>,
    pub is_closed: bool,
}
