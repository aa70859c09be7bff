//! Rings of shared vertices and edges used to build prisms and sweeps.

use crate::error::Result;
use crate::math::polygon_3d::newell_normal;
use crate::math::{transform_point, Matrix4, Point3, Vector3};
use crate::operations::creation::MakeFace;
use crate::topology::{
    EdgeCurve, EdgeData, EdgeId, FaceId, FaceSurface, MaterialId, OrientedEdge, TopologyStore,
    VertexData, VertexId, WireData, WireId,
};

/// One edge of a profile loop, in loop direction.
#[derive(Debug, Clone)]
pub(super) struct LoopEdge {
    pub curve: EdgeCurve,
    pub t0: f64,
    pub t1: f64,
    pub start: Point3,
    pub end: Point3,
}

/// Reads a wire as a list of loop edges.
pub(super) fn read_loop(store: &TopologyStore, wire: WireId) -> Result<Vec<LoopEdge>> {
    let mut edges = Vec::new();
    for &oe in &store.wire(wire)?.edges {
        let edge = store.edge(oe.edge)?;
        let (start, end) = store.oriented_vertices(oe)?;
        let (t0, t1) = if oe.forward {
            (edge.t_start, edge.t_end)
        } else {
            (edge.t_end, edge.t_start)
        };
        edges.push(LoopEdge {
            curve: edge.curve.clone(),
            t0,
            t1,
            start: store.vertex(start)?.point,
            end: store.vertex(end)?.point,
        });
    }
    Ok(edges)
}

/// The loop traversed backwards.
pub(super) fn reverse_loop(edges: &[LoopEdge]) -> Vec<LoopEdge> {
    edges
        .iter()
        .rev()
        .map(|e| LoopEdge {
            curve: e.curve.clone(),
            t0: e.t1,
            t1: e.t0,
            start: e.end,
            end: e.start,
        })
        .collect()
}

/// Winding normal of a loop, sampling curved edges so a single circle works.
pub(super) fn loop_normal(edges: &[LoopEdge]) -> Result<Vector3> {
    let mut samples = Vec::new();
    for e in edges {
        samples.push(e.start);
        if !matches!(e.curve, EdgeCurve::Line(_)) {
            for k in 1..4 {
                let s = f64::from(k) / 4.0;
                samples.push(e.curve.evaluate(e.t0 + (e.t1 - e.t0) * s)?);
            }
        }
    }
    newell_normal(&samples)
}

/// A transformed copy of a profile loop: vertex `k` starts edge `k`.
#[derive(Debug, Clone)]
pub(super) struct Ring {
    pub vertices: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
}

/// Adds the profile loop mapped through `matrix` as new vertices and edges.
pub(super) fn add_ring(
    store: &mut TopologyStore,
    edges: &[LoopEdge],
    matrix: &Matrix4,
) -> Result<Ring> {
    let vertices: Vec<VertexId> = edges
        .iter()
        .map(|e| store.add_vertex(VertexData::new(transform_point(matrix, &e.start))))
        .collect();
    let n = vertices.len();
    let mut ring_edges = Vec::with_capacity(n);
    for (k, e) in edges.iter().enumerate() {
        let edge = store.add_edge(EdgeData {
            start: vertices[k],
            end: vertices[(k + 1) % n],
            curve: e.curve.transformed(matrix)?,
            t_start: e.t0,
            t_end: e.t1,
        });
        ring_edges.push(edge);
    }
    Ok(Ring {
        vertices,
        edges: ring_edges,
    })
}

/// A closed wire over a ring, forward or reversed.
pub(super) fn ring_wire(store: &mut TopologyStore, ring: &Ring, reversed: bool) -> WireId {
    let edges = if reversed {
        ring.edges
            .iter()
            .rev()
            .map(|&e| OrientedEdge::new(e, false))
            .collect()
    } else {
        ring.edges.iter().map(|&e| OrientedEdge::new(e, true)).collect()
    };
    store.add_wire(WireData {
        edges,
        is_closed: true,
    })
}

/// Adds the side face between two rings for profile edge `k`.
///
/// `rungs[k]` joins vertex `k` of `from` to vertex `k` of `to`. A `None`
/// surface lets `MakeFace` fit a plane.
pub(super) fn add_side_face(
    store: &mut TopologyStore,
    from: &Ring,
    to: &Ring,
    rungs: &[EdgeId],
    k: usize,
    surface: Option<FaceSurface>,
    material: Option<MaterialId>,
) -> Result<FaceId> {
    let next = (k + 1) % rungs.len();
    let wire = store.add_wire(WireData {
        edges: vec![
            OrientedEdge::new(from.edges[k], true),
            OrientedEdge::new(rungs[next], true),
            OrientedEdge::new(to.edges[k], false),
            OrientedEdge::new(rungs[k], false),
        ],
        is_closed: true,
    });
    let mut make = MakeFace::new(wire, vec![]);
    if let Some(surface) = surface {
        make = make.with_surface(surface);
    }
    if let Some(material) = material {
        make = make.with_material(material);
    }
    make.execute(store)
}
