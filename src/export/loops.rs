use crate::geometry::{CurveLoop, CurveSegment};
use crate::math::Vector3;
use crate::topology::{EdgeCurve, FaceData, TopologyStore, WireId};

use super::error::{FallbackReason, StageResult};

/// Outward normal of a planar face.
pub(super) fn planar_normal(face: &FaceData) -> Option<Vector3> {
    let plane = face.plane()?;
    Some(if face.same_sense {
        *plane.plane_normal()
    } else {
        -plane.plane_normal()
    })
}

/// Reads a wire as a loop of line and arc segments.
pub(super) fn wire_loop(store: &TopologyStore, wire: WireId) -> StageResult<CurveLoop> {
    let mut segments = Vec::new();
    for &oe in &store.wire(wire)?.edges {
        let edge = store.edge(oe.edge)?;
        let (start, end) = store.oriented_vertices(oe)?;
        let segment = match &edge.curve {
            EdgeCurve::Line(_) => CurveSegment::Line {
                start: store.vertex(start)?.point,
                end: store.vertex(end)?.point,
            },
            EdgeCurve::Arc(arc) => {
                let (t_start, t_end) = if oe.forward {
                    (edge.t_start, edge.t_end)
                } else {
                    (edge.t_end, edge.t_start)
                };
                CurveSegment::Arc {
                    arc: arc.clone(),
                    t_start,
                    t_end,
                }
            }
            EdgeCurve::Helix(_) => {
                return Err(FallbackReason::NotPrismatic(
                    "helical edge in a planar boundary".into(),
                ))
            }
        };
        segments.push(segment);
    }
    Ok(CurveLoop::new(segments)?)
}

/// Orients a loop counter-clockwise (or clockwise) about `axis`.
pub(super) fn oriented(curve_loop: CurveLoop, axis: &Vector3, counter_clockwise: bool) -> StageResult<CurveLoop> {
    if curve_loop.is_counter_clockwise(axis)? == counter_clockwise {
        Ok(curve_loop)
    } else {
        Ok(curve_loop.reversed())
    }
}
