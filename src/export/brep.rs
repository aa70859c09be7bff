use std::collections::HashMap;

use crate::error::{BodyrepError, TessellationError};
use crate::math::{point_key, Point3};
use crate::tessellation::{TessellateSolid, TessellationParams, TriangleMesh};
use crate::topology::{EdgeCurve, FaceId, MaterialId, SolidId, SolidQuery, TopologyStore};

use super::error::{FallbackReason, StageResult};
use super::facet_merge::merge_coplanar;
use super::options::ExportOptions;

/// A planar polygon with optional holes. Indices refer to
/// [`FacetedBody::points`]; the first bound is the outer one.
#[derive(Debug, Clone)]
pub struct FacetFace {
    pub bounds: Vec<Vec<u32>>,
    pub material: Option<MaterialId>,
}

/// A connected set of facets.
#[derive(Debug, Clone)]
pub struct FacetShell {
    pub faces: Vec<FacetFace>,
    /// Every directed edge is matched by exactly one reversed edge.
    pub closed: bool,
}

/// Shared point list plus shells of polygonal facets.
#[derive(Debug, Clone, Default)]
pub struct FacetedBody {
    pub points: Vec<Point3>,
    pub shells: Vec<FacetShell>,
}

impl FacetedBody {
    /// Total number of facets.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.shells.iter().map(|s| s.faces.len()).sum()
    }

    /// Whether every shell is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.shells.is_empty() && self.shells.iter().all(|s| s.closed)
    }
}

/// Accumulates facets over welded points.
#[derive(Debug, Default)]
struct FacetedBodyBuilder {
    body: FacetedBody,
    index: HashMap<[u64; 3], u32>,
    current: Vec<FacetFace>,
}

impl FacetedBodyBuilder {
    #[allow(clippy::cast_possible_truncation)]
    fn point(&mut self, p: &Point3) -> u32 {
        let points = &mut self.body.points;
        *self.index.entry(point_key(p)).or_insert_with(|| {
            points.push(*p);
            (points.len() - 1) as u32
        })
    }

    /// Adds a facet. Returns `false` if the outer bound has fewer than three
    /// distinct points.
    fn add_face(&mut self, bounds: &[Vec<Point3>], material: Option<MaterialId>) -> bool {
        let mut handles = Vec::with_capacity(bounds.len());
        for (i, bound) in bounds.iter().enumerate() {
            let mut ring: Vec<u32> = Vec::with_capacity(bound.len());
            for p in bound {
                let h = self.point(p);
                if ring.last() != Some(&h) {
                    ring.push(h);
                }
            }
            while ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }
            if ring.len() < 3 {
                if i == 0 {
                    return false;
                }
                continue;
            }
            handles.push(ring);
        }
        self.current.push(FacetFace {
            bounds: handles,
            material,
        });
        true
    }

    fn finish_shell(&mut self) -> bool {
        let faces = std::mem::take(&mut self.current);
        let closed = check_closed_shell(&faces).is_ok();
        self.body.shells.push(FacetShell { faces, closed });
        closed
    }

    fn finish(self) -> FacetedBody {
        self.body
    }
}

/// Checks that every directed boundary edge occurs once and is matched by
/// its reverse in another bound.
///
/// # Errors
///
/// Returns [`FallbackReason::NonManifold`] naming the first offending edge.
pub fn check_closed_shell(faces: &[FacetFace]) -> StageResult<()> {
    if faces.is_empty() {
        return Err(FallbackReason::NonManifold("empty shell".into()));
    }
    let mut counts: HashMap<(u32, u32), usize> = HashMap::new();
    for face in faces {
        for bound in &face.bounds {
            for (i, &a) in bound.iter().enumerate() {
                let b = bound[(i + 1) % bound.len()];
                *counts.entry((a, b)).or_default() += 1;
            }
        }
    }
    for (&(a, b), &count) in &counts {
        if count > 1 {
            return Err(FallbackReason::NonManifold(format!("edge {a}-{b} used {count} times")));
        }
        if !counts.contains_key(&(b, a)) {
            return Err(FallbackReason::NonManifold(format!("edge {a}-{b} has no twin")));
        }
    }
    Ok(())
}

/// Converts a triangle mesh into a single-shell faceted body, merging
/// coplanar triangles when asked. The shell may be open.
#[must_use]
pub fn faceted_from_mesh(mesh: &TriangleMesh, merge_facets: bool) -> FacetedBody {
    let mesh = mesh.welded();
    let mut builder = FacetedBodyBuilder::default();
    if merge_facets {
        for facet in merge_coplanar(&mesh) {
            let bounds: Vec<Vec<Point3>> = facet
                .bounds
                .iter()
                .map(|b| b.iter().map(|&i| mesh.vertices[i as usize]).collect())
                .collect();
            builder.add_face(&bounds, facet.material);
        }
    } else {
        for t in 0..mesh.triangle_count() {
            let material = mesh.materials.get(t).copied().flatten();
            builder.add_face(&[mesh.triangle(t).to_vec()], material);
        }
    }
    builder.finish_shell();
    builder.finish()
}

/// Converts a closed mesh into a faceted BRep.
///
/// # Errors
///
/// Returns [`FallbackReason::NonManifold`] if the mesh does not close.
pub fn brep_from_mesh(mesh: &TriangleMesh, merge_facets: bool) -> StageResult<FacetedBody> {
    let body = faceted_from_mesh(mesh, merge_facets);
    if body.is_closed() {
        Ok(body)
    } else {
        Err(FallbackReason::NonManifold("mesh is open".into()))
    }
}

/// Decomposes a solid into a faceted BRep.
///
/// Solids made only of planar faces with straight edges are copied face by
/// face. Anything else is tessellated at the configured level of detail,
/// subject to the triangle ceiling, and then optionally facet-merged.
pub struct BrepConversion {
    solid: SolidId,
    params: TessellationParams,
    triangle_limit: usize,
    merge_facets: bool,
}

impl BrepConversion {
    /// Creates a conversion with the default export options.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        let defaults = ExportOptions::default();
        Self {
            solid,
            params: TessellationParams::for_level(defaults.level_of_detail),
            triangle_limit: defaults.triangle_limit,
            merge_facets: defaults.merge_facets,
        }
    }

    /// Takes the level of detail, triangle ceiling and facet merging from
    /// `options`.
    #[must_use]
    pub fn with_options(mut self, options: &ExportOptions) -> Self {
        self.params = TessellationParams::for_level(options.level_of_detail);
        self.triangle_limit = options.triangle_limit;
        self.merge_facets = options.merge_facets;
        self
    }

    /// Runs the conversion.
    ///
    /// # Errors
    ///
    /// Returns [`FallbackReason::TriangleLimit`] when the tessellation exceeds
    /// the ceiling and [`FallbackReason::NonManifold`] when a shell does not
    /// close.
    pub fn execute(&self, store: &TopologyStore) -> StageResult<FacetedBody> {
        if is_polyhedral(store, self.solid)? {
            return self.exact(store);
        }
        let mesh = match TessellateSolid::new(self.solid, self.params)
            .with_triangle_limit(self.triangle_limit)
            .execute(store)
        {
            Ok(mesh) => mesh,
            Err(BodyrepError::Tessellation(TessellationError::TooManyTriangles { count, limit })) => {
                return Err(FallbackReason::TriangleLimit { count, limit })
            }
            Err(err) => return Err(err.into()),
        };
        brep_from_mesh(&mesh, self.merge_facets)
    }

    fn exact(&self, store: &TopologyStore) -> StageResult<FacetedBody> {
        let solid = store.solid(self.solid)?;
        let mut builder = FacetedBodyBuilder::default();
        for shell_id in solid.shells() {
            for &face_id in &store.shell(shell_id)?.faces {
                let face = store.face(face_id)?;
                let mut bounds = vec![store.wire_points(face.outer_wire)?];
                for &wire in &face.inner_wires {
                    bounds.push(store.wire_points(wire)?);
                }
                if !builder.add_face(&bounds, face.material) {
                    tracing::debug!(?face_id, "Dropping degenerate face");
                }
            }
            if !builder.finish_shell() {
                return Err(FallbackReason::NonManifold("shell has unmatched edges".into()));
            }
        }
        Ok(builder.finish())
    }
}

fn is_polyhedral(store: &TopologyStore, solid: SolidId) -> StageResult<bool> {
    let faces: Vec<FaceId> = store.faces(solid)?;
    for face_id in faces {
        if store.face(face_id)?.plane().is_none() {
            return Ok(false);
        }
    }
    for edge_id in store.edges(solid)? {
        if !matches!(store.edge(edge_id)?.curve, EdgeCurve::Line(_)) {
            return Ok(false);
        }
    }
    Ok(true)
}
