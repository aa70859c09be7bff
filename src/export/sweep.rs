use std::collections::{HashMap, HashSet};

use crate::geometry::curve::{Arc, Curve};
use crate::geometry::{CurveLoop, CurveSegment, Plane, SegmentKind};
use crate::math::polygon_3d::{centroid, max_plane_deviation, newell_normal};
use crate::math::{is_parallel, point_key, same_length, Point3, Vector3, TOLERANCE};
use crate::topology::{EdgeCurve, EdgeId, FaceId, SolidId, SolidQuery, TopologyStore};

use super::error::{FallbackReason, StageResult};
use super::loops::{oriented, planar_normal, wire_loop};

/// A swept area solid.
#[derive(Debug, Clone)]
pub struct SweepDescriptor {
    /// Profile at the start of the rail, counter-clockwise about the start
    /// tangent.
    pub profile: CurveLoop,
    /// Plane of the profile, normal along the start tangent.
    pub profile_plane: Plane,
    /// Path of the profile centre.
    pub rail: Vec<CurveSegment>,
    /// Number of cross-section rings, caps included.
    pub cross_sections: usize,
}

impl SweepDescriptor {
    /// Length of the rail.
    #[must_use]
    pub fn rail_length(&self) -> f64 {
        self.rail.iter().map(CurveSegment::length).sum()
    }

    /// Whether any rail piece is curved.
    #[must_use]
    pub fn is_curved(&self) -> bool {
        self.rail.iter().any(|s| s.kind() == SegmentKind::Arc)
    }
}

/// Tests a solid for a sweep of one profile along a line/arc rail.
///
/// Two planar caps with congruent outer loops are paired, and the analysis
/// walks from one to the other across the solid's edge graph, one rung per
/// profile vertex and step. Parallel line rungs give a straight rail piece,
/// arc rungs about one axis give a circular piece. Helical rungs have no
/// fixed-curvature rail and are rejected.
pub struct SweepAnalysis {
    solid: SolidId,
}

impl SweepAnalysis {
    /// Creates a sweep analysis for `solid`.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Runs the analysis.
    ///
    /// # Errors
    ///
    /// Returns [`FallbackReason::SweepMismatch`] describing the last failed
    /// cap pairing, or a kernel error if the solid is malformed.
    pub fn execute(&self, store: &TopologyStore) -> StageResult<SweepDescriptor> {
        let graph = EdgeGraph::build(store, self.solid)?;
        let face_count = store.faces(self.solid)?.len();

        let mut caps = Vec::new();
        for face_id in store.faces(self.solid)? {
            let face = store.face(face_id)?;
            if face.plane().is_some() && face.inner_wires.is_empty() {
                caps.push(CapRing::read(store, &graph, face_id)?);
            }
        }
        if caps.len() < 2 {
            return Err(FallbackReason::SweepMismatch("fewer than two planar caps".into()));
        }

        let mut last = FallbackReason::SweepMismatch("no congruent cap pair".into());
        for start in &caps {
            for end in &caps {
                if start.face == end.face || !start.is_congruent(end) {
                    continue;
                }
                match walk(store, &graph, start, end, face_count) {
                    Ok(descriptor) => return Ok(descriptor),
                    Err(reason @ FallbackReason::Kernel(_)) => return Err(reason),
                    Err(reason) => last = reason,
                }
            }
        }
        Err(last)
    }
}

/// Solid edges over position-welded nodes.
struct EdgeGraph {
    points: Vec<Point3>,
    ends: Vec<(usize, usize)>,
    ids: Vec<EdgeId>,
    index: HashMap<EdgeId, usize>,
    incident: Vec<Vec<usize>>,
}

impl EdgeGraph {
    fn build(store: &TopologyStore, solid: SolidId) -> StageResult<Self> {
        let mut graph = Self {
            points: Vec::new(),
            ends: Vec::new(),
            ids: Vec::new(),
            index: HashMap::new(),
            incident: Vec::new(),
        };
        let mut node_of: HashMap<[u64; 3], usize> = HashMap::new();
        for edge_id in store.edges(solid)? {
            let edge = store.edge(edge_id)?;
            let mut ends = [0usize; 2];
            for (slot, v) in ends.iter_mut().zip([edge.start, edge.end]) {
                let point = store.vertex(v)?.point;
                *slot = *node_of.entry(point_key(&point)).or_insert_with(|| {
                    graph.points.push(point);
                    graph.incident.push(Vec::new());
                    graph.points.len() - 1
                });
            }
            let i = graph.ids.len();
            graph.ids.push(edge_id);
            graph.ends.push((ends[0], ends[1]));
            graph.index.insert(edge_id, i);
            graph.incident[ends[0]].push(i);
            if ends[1] != ends[0] {
                graph.incident[ends[1]].push(i);
            }
        }
        Ok(graph)
    }

    fn other(&self, edge: usize, node: usize) -> usize {
        let (a, b) = self.ends[edge];
        if a == node {
            b
        } else {
            a
        }
    }
}

/// Outer boundary of a planar face as graph nodes and edges.
struct CapRing {
    face: FaceId,
    nodes: Vec<usize>,
    edges: Vec<usize>,
    lengths: Vec<f64>,
}

impl CapRing {
    fn read(store: &TopologyStore, graph: &EdgeGraph, face: FaceId) -> StageResult<Self> {
        let wire = store.wire(store.face(face)?.outer_wire)?;
        let mut nodes = Vec::with_capacity(wire.edges.len());
        let mut edges = Vec::with_capacity(wire.edges.len());
        let mut lengths = Vec::with_capacity(wire.edges.len());
        for &oe in &wire.edges {
            let Some(&e) = graph.index.get(&oe.edge) else {
                return Err(FallbackReason::SweepMismatch("cap edge outside the solid".into()));
            };
            let (a, b) = graph.ends[e];
            nodes.push(if oe.forward { a } else { b });
            edges.push(e);
            lengths.push(store.edge(oe.edge)?.length());
        }
        Ok(Self {
            face,
            nodes,
            edges,
            lengths,
        })
    }

    fn is_congruent(&self, other: &Self) -> bool {
        if self.lengths.len() != other.lengths.len() {
            return false;
        }
        let mut a = self.lengths.clone();
        let mut b = other.lengths.clone();
        a.sort_by(f64::total_cmp);
        b.sort_by(f64::total_cmp);
        a.iter().zip(&b).all(|(x, y)| same_length(*x, *y))
    }
}

/// One cross-section: node `k` starts ring edge `k`.
struct Ring {
    nodes: Vec<usize>,
    edges: Vec<usize>,
}

/// Walks from `start` to `end` and builds the descriptor.
fn walk(
    store: &TopologyStore,
    graph: &EdgeGraph,
    start: &CapRing,
    end: &CapRing,
    face_count: usize,
) -> StageResult<SweepDescriptor> {
    let n = start.nodes.len();
    let target: HashSet<usize> = end.nodes.iter().copied().collect();
    let mut used: HashSet<usize> = start.edges.iter().copied().collect();
    let mut rings = vec![Ring {
        nodes: start.nodes.clone(),
        edges: start.edges.clone(),
    }];
    let mut steps: Vec<Vec<usize>> = Vec::new();

    loop {
        if steps.len() > graph.ids.len() {
            return Err(FallbackReason::SweepMismatch("cross-section walk does not end".into()));
        }
        let ring = &rings[rings.len() - 1];
        let mut rungs = Vec::with_capacity(n);
        let mut next = Vec::with_capacity(n);
        for &node in &ring.nodes {
            let free: Vec<usize> = graph.incident[node]
                .iter()
                .copied()
                .filter(|e| !used.contains(e))
                .collect();
            let &[rung] = free.as_slice() else {
                return Err(FallbackReason::SweepMismatch(
                    "profile vertex does not start exactly one rung".into(),
                ));
            };
            rungs.push(rung);
            next.push(graph.other(rung, node));
        }
        used.extend(&rungs);
        if next.iter().collect::<HashSet<_>>().len() != n {
            return Err(FallbackReason::SweepMismatch("rungs converge".into()));
        }

        let mut edges = Vec::with_capacity(n);
        for k in 0..n {
            let (a, b) = (next[k], next[(k + 1) % n]);
            let Some(&e) = graph.incident[a]
                .iter()
                .find(|&&e| !used.contains(&e) && graph.other(e, a) == b)
            else {
                return Err(FallbackReason::SweepMismatch("cross-section is not closed".into()));
            };
            used.insert(e);
            edges.push(e);
        }

        let reached = next.iter().all(|node| target.contains(node)) && target.len() == n;
        rings.push(Ring { nodes: next, edges });
        steps.push(rungs);
        if reached {
            break;
        }
    }

    if face_count != 2 + n * steps.len() {
        return Err(FallbackReason::SweepMismatch(
            "side faces do not follow the rungs".into(),
        ));
    }

    let last = &rings[rings.len() - 1];
    let end_signature = ring_signature(store, graph, last)?;
    let mut centres = Vec::with_capacity(rings.len());
    for ring in &rings {
        let points: Vec<Point3> = ring.nodes.iter().map(|&i| graph.points[i]).collect();
        let centre = centroid(&points);
        if points.len() >= 3 {
            let normal = newell_normal(&points)?;
            if max_plane_deviation(&points, &centre, &normal) > TOLERANCE {
                return Err(FallbackReason::SweepMismatch("cross-section is not planar".into()));
            }
        }
        if !signature_matches(&ring_signature(store, graph, ring)?, &end_signature) {
            return Err(FallbackReason::SweepMismatch(
                "cross-section differs from the end profile".into(),
            ));
        }
        centres.push(centre);
    }

    let mut rail = Vec::with_capacity(steps.len());
    for (i, rungs) in steps.iter().enumerate() {
        rail.push(rail_piece(store, graph, &rings[i], rungs, &centres[i], &centres[i + 1])?);
    }

    let tangent = start_tangent(&rail[0])?;
    let face = store.face(start.face)?;
    let mut normal = planar_normal(face).unwrap_or(tangent);
    if normal.dot(&tangent) < 0.0 {
        normal = -normal;
    }
    let profile = oriented(wire_loop(store, face.outer_wire)?, &normal, true)?;
    let profile_plane = Plane::from_normal(centres[0], normal)?;

    tracing::debug!(
        pieces = rail.len(),
        cross_sections = rings.len(),
        "Recognized sweep"
    );
    Ok(SweepDescriptor {
        profile,
        profile_plane,
        rail,
        cross_sections: rings.len(),
    })
}

/// Per-edge kind and length plus per-vertex distance to the ring centre.
fn ring_signature(
    store: &TopologyStore,
    graph: &EdgeGraph,
    ring: &Ring,
) -> StageResult<Vec<(SegmentKind, f64, f64)>> {
    let points: Vec<Point3> = ring.nodes.iter().map(|&i| graph.points[i]).collect();
    let centre = centroid(&points);
    let mut signature = Vec::with_capacity(ring.edges.len());
    for (k, &e) in ring.edges.iter().enumerate() {
        let edge = store.edge(graph.ids[e])?;
        let kind = match edge.curve {
            EdgeCurve::Line(_) => SegmentKind::Line,
            EdgeCurve::Arc(_) => SegmentKind::Arc,
            EdgeCurve::Helix(_) => {
                return Err(FallbackReason::SweepMismatch("helical profile edge".into()))
            }
        };
        signature.push((kind, edge.length(), (points[k] - centre).norm()));
    }
    Ok(signature)
}

fn signature_matches(a: &[(SegmentKind, f64, f64)], b: &[(SegmentKind, f64, f64)]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.0 == y.0 && same_length(x.1, y.1) && same_length(x.2, y.2))
}

/// Rail piece for one step, from the rung geometry.
fn rail_piece(
    store: &TopologyStore,
    graph: &EdgeGraph,
    from: &Ring,
    rungs: &[usize],
    centre: &Point3,
    next_centre: &Point3,
) -> StageResult<CurveSegment> {
    let mut lines = Vec::new();
    let mut arcs = Vec::new();
    for (&node, &rung) in from.nodes.iter().zip(rungs) {
        let edge = store.edge(graph.ids[rung])?;
        let forward = graph.ends[rung].0 == node;
        match &edge.curve {
            EdgeCurve::Line(_) => {
                let to = graph.points[graph.other(rung, node)];
                lines.push(to - graph.points[node]);
            }
            EdgeCurve::Arc(arc) => {
                let sweep = if forward {
                    edge.t_end - edge.t_start
                } else {
                    edge.t_start - edge.t_end
                };
                arcs.push((arc, sweep));
            }
            EdgeCurve::Helix(_) => {
                return Err(FallbackReason::SweepMismatch(
                    "helical rungs have no fixed-curvature rail".into(),
                ))
            }
        }
    }

    if arcs.is_empty() {
        let step = lines[0];
        if lines.iter().any(|l| (l - step).norm() > TOLERANCE) {
            return Err(FallbackReason::SweepMismatch("rungs are not one translation".into()));
        }
        return Ok(CurveSegment::Line {
            start: *centre,
            end: *next_centre,
        });
    }
    if !lines.is_empty() {
        return Err(FallbackReason::SweepMismatch("mixed rung kinds".into()));
    }

    let (first, first_sweep) = arcs[0];
    let axis = *first.normal();
    for &(arc, sweep) in &arcs[1..] {
        let aligned = if arc.normal().dot(&axis) < 0.0 { -sweep } else { sweep };
        let offset = arc.center() - first.center();
        if !is_parallel(arc.normal(), &axis)
            || !same_length(aligned, first_sweep)
            || offset.cross(&axis).norm() > TOLERANCE
        {
            return Err(FallbackReason::SweepMismatch("rungs do not share one rotation".into()));
        }
    }

    let foot = first.center() + axis * (centre - first.center()).dot(&axis);
    let radial = centre - foot;
    if radial.norm() < TOLERANCE {
        return Err(FallbackReason::SweepMismatch("profile centre on the rotation axis".into()));
    }
    let arc = Arc::new(foot, radial.norm(), axis, radial, 0.0, first_sweep)?;
    let end = arc.evaluate(first_sweep)?;
    if (end - next_centre).norm() > TOLERANCE * (1.0 + end.coords.norm()) {
        return Err(FallbackReason::SweepMismatch("rail does not reach the next section".into()));
    }
    Ok(CurveSegment::Arc {
        arc,
        t_start: 0.0,
        t_end: first_sweep,
    })
}

fn start_tangent(segment: &CurveSegment) -> StageResult<Vector3> {
    match segment {
        CurveSegment::Line { start, end } => {
            let d = end - start;
            Ok(d / d.norm())
        }
        CurveSegment::Arc { arc, t_start, t_end } => {
            let t = arc.tangent(*t_start)?;
            Ok(if t_end < t_start { -t } else { t })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::operations::creation::MakeBox;
    use crate::operations::shaping::{PathSegment, Sweep};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(-0.5, -0.5),
            Point2::new(0.5, -0.5),
            Point2::new(0.5, 0.5),
            Point2::new(-0.5, 0.5),
        ]
    }

    fn bent_path() -> Vec<PathSegment> {
        vec![
            PathSegment::Line { end: p(5.0, 0.0, 0.0) },
            PathSegment::Arc {
                center: p(5.0, 5.0, 0.0),
                axis: Vector3::z(),
                angle: FRAC_PI_2,
            },
            PathSegment::Line { end: p(10.0, 10.0, 0.0) },
        ]
    }

    // ── Accepted ───────────────────────────────────────────────

    #[test]
    fn bent_sweep_gives_line_arc_line_rail() {
        let mut store = TopologyStore::new();
        let solid = Sweep::new(square(), Point3::origin(), bent_path())
            .execute(&mut store)
            .unwrap();
        let d = SweepAnalysis::new(solid).execute(&store).unwrap();
        let kinds: Vec<SegmentKind> = d.rail.iter().map(CurveSegment::kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Line, SegmentKind::Arc, SegmentKind::Line]);
        assert_eq!(d.cross_sections, 4);
        assert!(d.is_curved());
        assert!((d.rail_length() - (10.0 + 5.0 * PI / 2.0)).abs() < 1e-9);
        assert_eq!(d.profile.len(), 4);
        assert!((d.profile.signed_area(&d.profile_plane).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn straight_sweep_is_a_one_piece_rail() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 4.0))
            .execute(&mut store)
            .unwrap();
        let d = SweepAnalysis::new(solid).execute(&store).unwrap();
        assert_eq!(d.rail.len(), 1);
        assert!(!d.is_curved());
    }

    // ── Rejected ───────────────────────────────────────────────

    #[test]
    fn helical_rungs_rejected() {
        let mut store = TopologyStore::new();
        let path = vec![PathSegment::Helix {
            center: p(0.0, 0.0, 0.0),
            axis: Vector3::z(),
            angle: PI,
            rise: 3.0,
        }];
        let solid = Sweep::new(square(), p(4.0, 0.0, 0.0), path)
            .execute(&mut store)
            .unwrap();
        let r = SweepAnalysis::new(solid).execute(&store);
        assert!(matches!(r, Err(FallbackReason::SweepMismatch(_))));
    }
}
