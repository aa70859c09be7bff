use std::f64::consts::{PI, TAU};

use crate::error::Result;
use crate::topology::{EdgeCurve, EdgeId, TopologyStore};

use super::{Polyline, TessellationParams};

/// Tessellates a curve (edge) into a polyline.
///
/// The polyline runs in the edge's natural direction. Its first and last
/// points are the edge's vertex positions, so two faces sharing an edge see
/// bit-identical samples.
pub struct TessellateCurve {
    edge: EdgeId,
    params: TessellationParams,
}

impl TessellateCurve {
    /// Creates a new `TessellateCurve` operation.
    #[must_use]
    pub fn new(edge: EdgeId, params: TessellationParams) -> Self {
        Self { edge, params }
    }

    /// Executes the tessellation, returning a polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its vertices are missing, or the
    /// curve cannot be evaluated.
    pub fn execute(&self, store: &TopologyStore) -> Result<Polyline> {
        let edge = store.edge(self.edge)?;
        let start = store.vertex(edge.start)?.point;
        let end = store.vertex(edge.end)?.point;

        let n = segment_count(&edge.curve, edge.t_start, edge.t_end, &self.params);
        let mut points = Vec::with_capacity(n + 1);
        points.push(start);
        for i in 1..n {
            #[allow(clippy::cast_precision_loss)]
            let t = edge.t_start + (edge.t_end - edge.t_start) * (i as f64) / (n as f64);
            points.push(edge.curve.evaluate(t)?);
        }
        points.push(end);
        Ok(Polyline { points })
    }
}

/// Number of chords needed so each stays within the chordal tolerance.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn segment_count(curve: &EdgeCurve, t0: f64, t1: f64, params: &TessellationParams) -> usize {
    let radius = match curve {
        EdgeCurve::Line(_) => return 1,
        EdgeCurve::Arc(arc) => arc.radius(),
        EdgeCurve::Helix(helix) => helix.radius(),
    };
    let sweep = (t1 - t0).abs();
    let step = if params.tolerance < radius {
        2.0 * (1.0 - params.tolerance / radius).acos()
    } else {
        PI
    };
    let turns = (sweep / TAU).ceil().max(1.0);
    let by_tolerance = (sweep / step).ceil() as usize;
    let by_minimum = (params.min_segments as f64 * sweep / TAU).ceil() as usize;
    let ceiling = params.max_segments * turns as usize;
    by_tolerance.max(by_minimum).clamp(1, ceiling.max(1))
}
