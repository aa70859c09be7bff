use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::FixedFaceHandle;
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TessellationError};
use crate::geometry::surface::Plane;
use crate::math::{Point3, TOLERANCE};
use crate::topology::{FaceId, FaceSurface, MaterialId, OrientedEdge, TopologyStore, WireId};

use super::{TessellateCurve, TessellationParams, TriangleMesh};

/// Tessellates a face into a triangle mesh.
///
/// Triangles wind counter-clockwise about the outward face normal and carry
/// the face material.
pub struct TessellateFace {
    face: FaceId,
    params: TessellationParams,
}

impl TessellateFace {
    /// Creates a new `TessellateFace` operation.
    #[must_use]
    pub fn new(face: FaceId, params: TessellationParams) -> Self {
        Self { face, params }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the face cannot be tessellated.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        let face = store.face(self.face)?;
        match &face.surface {
            FaceSurface::Plane(plane) => tessellate_plane(
                store,
                plane,
                face.same_sense,
                face.outer_wire,
                &face.inner_wires,
                face.material,
                &self.params,
            ),
            FaceSurface::Cylinder(_) | FaceSurface::Ruled => {
                if !face.inner_wires.is_empty() {
                    return Err(TessellationError::Failed(
                        "curved faces with holes are not supported".into(),
                    )
                    .into());
                }
                tessellate_ruled(store, face.outer_wire, face.material, &self.params)
            }
        }
    }
}

/// Samples an oriented edge in traversal direction.
fn oriented_samples(
    store: &TopologyStore,
    oriented: OrientedEdge,
    params: &TessellationParams,
) -> Result<Vec<Point3>> {
    let mut points = TessellateCurve::new(oriented.edge, *params)
        .execute(store)?
        .points;
    if !oriented.forward {
        points.reverse();
    }
    Ok(points)
}

/// Samples a closed wire into a polygon (no repeated closing point).
fn wire_polygon(
    store: &TopologyStore,
    wire: WireId,
    params: &TessellationParams,
) -> Result<Vec<Point3>> {
    let mut polygon = Vec::new();
    for &oe in &store.wire(wire)?.edges {
        let samples = oriented_samples(store, oe, params)?;
        polygon.extend_from_slice(&samples[..samples.len() - 1]);
    }
    Ok(polygon)
}

/// Tessellates a planar face using CDT.
fn tessellate_plane(
    store: &TopologyStore,
    plane: &Plane,
    same_sense: bool,
    outer_wire: WireId,
    inner_wires: &[WireId],
    material: Option<MaterialId>,
    params: &TessellationParams,
) -> Result<TriangleMesh> {
    let mut loops = vec![wire_polygon(store, outer_wire, params)?];
    for &wire in inner_wires {
        loops.push(wire_polygon(store, wire, params)?);
    }

    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
    let mut positions: HashMap<usize, Point3> = HashMap::new();
    for polygon in &loops {
        insert_constraint_loop(&mut cdt, plane, polygon, &mut positions)?;
    }

    let interior_faces = classify_interior_faces(&cdt);

    let mut mesh = TriangleMesh::default();
    for face_handle in cdt.inner_faces() {
        if !interior_faces.contains(&face_handle.fix().index()) {
            continue;
        }
        let mut corners = [Point3::origin(); 3];
        for (corner, vh) in corners.iter_mut().zip(face_handle.vertices()) {
            *corner = *positions.get(&vh.fix().index()).ok_or_else(|| {
                TessellationError::Failed("CDT created an unexpected vertex".into())
            })?;
        }
        if !same_sense {
            corners.swap(1, 2);
        }
        mesh.push_triangle(corners, material);
    }

    Ok(mesh)
}

/// Inserts a closed polygon as constraint edges, remembering the 3D point
/// behind each CDT vertex.
fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
    plane: &Plane,
    points: &[Point3],
    positions: &mut HashMap<usize, Point3>,
) -> Result<()> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for p in points {
        let uv = plane.project(p);
        let h = cdt
            .insert(SpadePoint2::new(uv.x, uv.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        positions.entry(h.index()).or_insert(*p);
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    Ok(())
}

/// Classifies which inner faces of the CDT are inside the polygon using flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0. Each time
/// a constraint edge is crossed, depth increments. Odd depth = interior.
fn classify_interior_faces(
    cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let new_depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}

/// Tessellates a four-sided curved face by zipping its two curved rails.
///
/// The other two boundary edges must be straight rulings.
fn tessellate_ruled(
    store: &TopologyStore,
    wire: WireId,
    material: Option<MaterialId>,
    params: &TessellationParams,
) -> Result<TriangleMesh> {
    let edges = &store.wire(wire)?.edges;
    if edges.len() != 4 {
        return Err(TessellationError::Failed(format!(
            "curved face needs 4 boundary edges, found {}",
            edges.len()
        ))
        .into());
    }
    let is_line = |i: usize| -> Result<bool> { Ok(store.edge(edges[i].edge)?.is_line()) };
    let first_rail = if is_line(1)? && is_line(3)? {
        0
    } else if is_line(0)? && is_line(2)? {
        1
    } else {
        return Err(TessellationError::Failed("curved face has no straight rulings".into()).into());
    };

    let rail_a = oriented_samples(store, edges[first_rail], params)?;
    let mut rail_b = oriented_samples(store, edges[first_rail + 2], params)?;
    rail_b.reverse();

    let mut mesh = TriangleMesh::default();
    let (mut i, mut j) = (0, 0);
    while i + 1 < rail_a.len() || j + 1 < rail_b.len() {
        let advance_a = if i + 1 == rail_a.len() {
            false
        } else if j + 1 == rail_b.len() {
            true
        } else {
            (rail_a[i + 1] - rail_b[j]).norm() <= (rail_a[i] - rail_b[j + 1]).norm()
        };
        let corners = if advance_a {
            i += 1;
            [rail_a[i - 1], rail_a[i], rail_b[j]]
        } else {
            j += 1;
            [rail_a[i], rail_b[j], rail_b[j - 1]]
        };
        if (corners[1] - corners[0]).cross(&(corners[2] - corners[0])).norm() > TOLERANCE {
            mesh.push_triangle(corners, material);
        }
    }
    Ok(mesh)
}
