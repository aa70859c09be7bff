use crate::math::Point3;

slotmap::new_key_type! {
    pub struct VertexId;
}

/// A vertex position. Edges meeting at a corner share one record.
#[derive(Debug, Clone, Copy)]
pub struct VertexData {
    pub point: Point3,
}

impl VertexData {
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self { point }
    }
}
