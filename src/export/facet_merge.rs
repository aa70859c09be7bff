use std::collections::{HashMap, HashSet, VecDeque};

use crate::math::polygon_3d::signed_area_3d;
use crate::math::{is_parallel, same_length, Point3, Vector3, TOLERANCE};
use crate::tessellation::TriangleMesh;
use crate::topology::MaterialId;

/// Planes with more triangles than this are left unmerged.
pub const MAX_TRIANGLES_PER_PLANE: usize = 150;

/// A polygon with holes over mesh vertex indices: outer loop first.
#[derive(Debug, Clone)]
pub struct MergedFacet {
    pub bounds: Vec<Vec<u32>>,
    pub material: Option<MaterialId>,
}

struct PlaneGroup {
    normal: Vector3,
    offset: f64,
    material: Option<MaterialId>,
    triangles: Vec<usize>,
}

/// Merges edge-connected coplanar triangles of the same material.
///
/// `mesh` must be welded. A group is emitted triangle by triangle when it is
/// larger than [`MAX_TRIANGLES_PER_PLANE`] or its boundary pinches at a
/// vertex. Facets keep every boundary vertex, so neighbouring facets still
/// share their edges exactly.
#[must_use]
pub fn merge_coplanar(mesh: &TriangleMesh) -> Vec<MergedFacet> {
    let mut groups: Vec<PlaneGroup> = Vec::new();
    let mut buckets: HashMap<(Option<MaterialId>, [i64; 3]), Vec<usize>> = HashMap::new();
    let mut facets = Vec::new();

    for t in 0..mesh.triangle_count() {
        let material = mesh.materials.get(t).copied().flatten();
        let raw = mesh.triangle_normal(t);
        let len = raw.norm();
        if len < TOLERANCE {
            facets.push(single(mesh, t));
            continue;
        }
        let normal = raw / len;
        let offset = mesh.triangle(t)[0].coords.dot(&normal);
        let key = (material, quantize(&normal));
        let bucket = buckets.entry(key).or_default();
        let found = bucket.iter().copied().find(|&g| {
            let group = &groups[g];
            is_parallel(&group.normal, &normal)
                && group.normal.dot(&normal) > 0.0
                && same_length(group.offset, offset)
        });
        if let Some(g) = found {
            groups[g].triangles.push(t);
        } else {
            bucket.push(groups.len());
            groups.push(PlaneGroup {
                normal,
                offset,
                material,
                triangles: vec![t],
            });
        }
    }

    for group in &groups {
        if group.triangles.len() == 1 || group.triangles.len() > MAX_TRIANGLES_PER_PLANE {
            facets.extend(group.triangles.iter().map(|&t| single(mesh, t)));
            continue;
        }
        for component in components(mesh, &group.triangles) {
            match trace_boundary(mesh, &component, &group.normal) {
                Some(bounds) => facets.push(MergedFacet {
                    bounds,
                    material: group.material,
                }),
                None => facets.extend(component.iter().map(|&t| single(mesh, t))),
            }
        }
    }
    facets
}

fn single(mesh: &TriangleMesh, t: usize) -> MergedFacet {
    MergedFacet {
        bounds: vec![mesh.indices[t].to_vec()],
        material: mesh.materials.get(t).copied().flatten(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn quantize(normal: &Vector3) -> [i64; 3] {
    let q = |x: f64| (x * 1e6).round() as i64;
    [q(normal.x), q(normal.y), q(normal.z)]
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

/// Edge-connected components of a triangle set.
fn components(mesh: &TriangleMesh, triangles: &[usize]) -> Vec<Vec<usize>> {
    let mut by_edge: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for &t in triangles {
        let [a, b, c] = mesh.indices[t];
        for (u, v) in [(a, b), (b, c), (c, a)] {
            by_edge.entry(edge_key(u, v)).or_default().push(t);
        }
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for &seed in triangles {
        if !seen.insert(seed) {
            continue;
        }
        let mut component = vec![seed];
        let mut queue = VecDeque::from([seed]);
        while let Some(t) = queue.pop_front() {
            let [a, b, c] = mesh.indices[t];
            for (u, v) in [(a, b), (b, c), (c, a)] {
                for &n in &by_edge[&edge_key(u, v)] {
                    if seen.insert(n) {
                        component.push(n);
                        queue.push_back(n);
                    }
                }
            }
        }
        out.push(component);
    }
    out
}

/// Boundary loops of a component, outer first. `None` if the boundary
/// pinches or does not give exactly one outer loop.
fn trace_boundary(mesh: &TriangleMesh, component: &[usize], normal: &Vector3) -> Option<Vec<Vec<u32>>> {
    let mut directed = HashSet::new();
    for &t in component {
        let [a, b, c] = mesh.indices[t];
        directed.extend([(a, b), (b, c), (c, a)]);
    }
    let mut next: HashMap<u32, u32> = HashMap::new();
    for &(a, b) in &directed {
        if !directed.contains(&(b, a)) && next.insert(a, b).is_some() {
            return None;
        }
    }

    let mut outer = None;
    let mut holes = Vec::new();
    let mut visited = HashSet::new();
    let mut starts: Vec<u32> = next.keys().copied().collect();
    starts.sort_unstable();
    for start in starts {
        if visited.contains(&start) {
            continue;
        }
        let mut ring = vec![start];
        visited.insert(start);
        let mut at = *next.get(&start)?;
        while at != start {
            if !visited.insert(at) {
                return None;
            }
            ring.push(at);
            at = *next.get(&at)?;
        }
        let points: Vec<Point3> = ring.iter().map(|&i| mesh.vertices[i as usize]).collect();
        if signed_area_3d(&points, normal) > 0.0 {
            if outer.replace(ring).is_some() {
                return None;
            }
        } else {
            holes.push(ring);
        }
    }
    let mut bounds = vec![outer?];
    bounds.extend(holes);
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn cells(list: &[(usize, usize)]) -> TriangleMesh {
        let mut mesh = TriangleMesh::default();
        for &(i, j) in list {
            #[allow(clippy::cast_precision_loss)]
            let (x, y) = (i as f64, j as f64);
            mesh.push_triangle([p(x, y, 0.0), p(x + 1.0, y, 0.0), p(x + 1.0, y + 1.0, 0.0)], None);
            mesh.push_triangle([p(x, y, 0.0), p(x + 1.0, y + 1.0, 0.0), p(x, y + 1.0, 0.0)], None);
        }
        mesh.welded()
    }

    fn grid(n: usize) -> TriangleMesh {
        let list: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..n).map(move |j| (i, j))).collect();
        cells(&list)
    }

    #[test]
    fn square_of_two_triangles_merges() {
        let facets = merge_coplanar(&grid(1));
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].bounds.len(), 1);
        assert_eq!(facets[0].bounds[0].len(), 4);
    }

    #[test]
    fn grid_keeps_boundary_vertices() {
        let facets = merge_coplanar(&grid(3));
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].bounds[0].len(), 12);
    }

    #[test]
    fn large_plane_is_left_alone() {
        // 9 x 9 cells = 162 triangles.
        let facets = merge_coplanar(&grid(9));
        assert_eq!(facets.len(), 162);
    }

    #[test]
    fn materials_split_groups() {
        let mut mesh = TriangleMesh::default();
        mesh.push_triangle([p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)], Some(MaterialId(1)));
        mesh.push_triangle([p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)], Some(MaterialId(2)));
        let facets = merge_coplanar(&mesh.welded());
        assert_eq!(facets.len(), 2);
    }

    #[test]
    fn squares_touching_at_a_corner_stay_apart() {
        let facets = merge_coplanar(&cells(&[(0, 0), (1, 1)]));
        assert_eq!(facets.len(), 2);
        assert!(facets.iter().all(|f| f.bounds[0].len() == 4));
    }

    #[test]
    fn pinched_boundary_stays_triangulated() {
        // One edge-connected strip whose ends meet diagonally at (2, 2).
        let strip = [(1, 1), (1, 0), (2, 0), (3, 0), (3, 1), (3, 2), (2, 2)];
        let facets = merge_coplanar(&cells(&strip));
        assert_eq!(facets.len(), 14);
    }

    #[test]
    fn frame_gets_a_hole() {
        let ring = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)];
        let facets = merge_coplanar(&cells(&ring));
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].bounds.len(), 2);
        assert_eq!(facets[0].bounds[1].len(), 4);
    }
}
