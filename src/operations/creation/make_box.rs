use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::shaping::Extrude;
use crate::topology::{SolidId, TopologyStore};

use super::{MakeFace, MakeWire};

/// Creates an axis-aligned box solid from two corner points.
///
/// The box is the bottom rectangle extruded along +Z, so it shares the
/// topology layout of any other prism.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation, creating the box in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if any extent is not positive.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let (lo, hi) = (self.min_corner, self.max_corner);
        let extent = hi - lo;
        if extent.x < TOLERANCE || extent.y < TOLERANCE || extent.z < TOLERANCE {
            return Err(OperationError::InvalidInput(
                "box extents must be positive on every axis".into(),
            )
            .into());
        }
        let wire = MakeWire::new(
            vec![
                lo,
                Point3::new(hi.x, lo.y, lo.z),
                Point3::new(hi.x, hi.y, lo.z),
                Point3::new(lo.x, hi.y, lo.z),
            ],
            true,
        )
        .execute(store)?;
        let profile = MakeFace::new(wire, vec![]).execute(store)?;
        Extrude::new(profile, Vector3::new(0.0, 0.0, extent.z)).execute(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::SolidQuery;

    #[test]
    fn box_has_six_faces() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.faces(solid).unwrap().len(), 6);
    }

    #[test]
    fn inverted_corners_rejected() {
        let mut store = TopologyStore::new();
        let result = MakeBox::new(Point3::new(1.0, 1.0, 1.0), Point3::origin()).execute(&mut store);
        assert!(result.is_err());
    }
}
