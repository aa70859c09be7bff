use std::f64::consts::TAU;

use nalgebra::{Rotation3, Unit};

use crate::error::{OperationError, Result};
use crate::geometry::curve::{Arc, Helix, Line};
use crate::geometry::surface::Plane;
use crate::math::{
    is_parallel, is_perpendicular, transform_direction, transform_point, Matrix4, Point2, Point3,
    Vector3, TOLERANCE,
};
use crate::operations::creation::{MakeFace, MakeSolid};
use crate::topology::{
    EdgeCurve, EdgeData, EdgeId, FaceId, FaceSurface, MaterialId, ShellData, SolidId,
    TopologyStore,
};

use super::profile::{add_ring, add_side_face, ring_wire, LoopEdge, Ring};

/// One piece of a sweep path, continuing from where the previous piece ended.
#[derive(Debug, Clone)]
pub enum PathSegment {
    /// Straight run to `end`.
    Line { end: Point3 },
    /// Rotation by `angle` about the axis through `center`, counter-clockwise
    /// about `axis`.
    Arc {
        center: Point3,
        axis: Vector3,
        angle: f64,
    },
    /// Screw motion: rotation as for [`PathSegment::Arc`] plus `rise` along
    /// the axis.
    Helix {
        center: Point3,
        axis: Vector3,
        angle: f64,
        rise: f64,
    },
}

impl PathSegment {
    /// Rigid motion carrying the segment's start frame to its end frame.
    fn motion(&self, from: &Point3) -> Result<Matrix4> {
        match self {
            Self::Line { end } => {
                if (end - from).norm() < TOLERANCE {
                    return Err(OperationError::InvalidInput("zero-length path line".into()).into());
                }
                Ok(Matrix4::new_translation(&(end - from)))
            }
            Self::Arc {
                center,
                axis,
                angle,
            } => screw(center, axis, *angle, 0.0),
            Self::Helix {
                center,
                axis,
                angle,
                rise,
            } => screw(center, axis, *angle, *rise),
        }
    }

    /// Unit tangent at the segment start.
    fn start_tangent(&self, from: &Point3) -> Result<Vector3> {
        let d = match self {
            Self::Line { end } => end - from,
            Self::Arc {
                center,
                axis,
                angle,
            } => axis.normalize().cross(&(from - center)) * *angle,
            Self::Helix {
                center,
                axis,
                angle,
                rise,
            } => {
                let axis = axis.normalize();
                axis.cross(&(from - center)) * *angle + axis * *rise
            }
        };
        let len = d.norm();
        if len < TOLERANCE {
            return Err(OperationError::InvalidInput("path segment has no tangent".into()).into());
        }
        Ok(d / len)
    }

    /// Edge carrying a profile vertex from `a` to `b` along this segment.
    fn rung(&self, a: &Point3, b: &Point3) -> Result<(EdgeCurve, f64)> {
        match self {
            Self::Line { .. } => {
                let (line, length) = Line::between(*a, *b)?;
                Ok((EdgeCurve::Line(line), length))
            }
            Self::Arc {
                center,
                axis,
                angle,
            } => {
                let (foot, radius, ref_dir) = radial_frame(center, axis, a)?;
                let arc = Arc::new(foot, radius, *axis, ref_dir, 0.0, *angle)?;
                Ok((EdgeCurve::Arc(arc), *angle))
            }
            Self::Helix {
                center,
                axis,
                angle,
                rise,
            } => {
                let (foot, radius, ref_dir) = radial_frame(center, axis, a)?;
                let pitch = rise * TAU / angle;
                let helix = Helix::new(foot, radius, *axis, ref_dir, pitch, 0.0, *angle)?;
                Ok((EdgeCurve::Helix(helix), *angle))
            }
        }
    }
}

fn screw(center: &Point3, axis: &Vector3, angle: f64, rise: f64) -> Result<Matrix4> {
    if angle.abs() < TOLERANCE || axis.norm() < TOLERANCE {
        return Err(OperationError::InvalidInput("degenerate path arc".into()).into());
    }
    let axis = Unit::new_normalize(*axis);
    let rotation = Rotation3::from_axis_angle(&axis, angle).to_homogeneous();
    Ok(Matrix4::new_translation(&(center.coords + axis.into_inner() * rise))
        * rotation
        * Matrix4::new_translation(&-center.coords))
}

/// Foot on the axis, distance from it and unit radial direction of `p`.
fn radial_frame(center: &Point3, axis: &Vector3, p: &Point3) -> Result<(Point3, f64, Vector3)> {
    let axis = axis.normalize();
    let foot = center + axis * (p - center).dot(&axis);
    let radial = p - foot;
    let radius = radial.norm();
    if radius < TOLERANCE {
        return Err(
            OperationError::InvalidInput("profile vertex lies on the sweep axis".into()).into(),
        );
    }
    Ok((foot, radius, radial / radius))
}

/// Sweeps a planar polygon profile along a tangent-continuous path.
///
/// The profile is given in 2D coordinates of the plane perpendicular to the
/// path's start tangent. Each path segment adds one ring of profile edges and
/// one side face per profile edge: planar for line segments, ruled for arcs
/// and helices.
pub struct Sweep {
    profile: Vec<Point2>,
    start: Point3,
    path: Vec<PathSegment>,
    profile_x: Option<Vector3>,
    material: Option<MaterialId>,
}

impl Sweep {
    /// Creates a new `Sweep` operation.
    #[must_use]
    pub fn new(profile: Vec<Point2>, start: Point3, path: Vec<PathSegment>) -> Self {
        Self {
            profile,
            start,
            path,
            profile_x: None,
            material: None,
        }
    }

    /// Direction of the profile's X axis at the path start (perpendicular to
    /// the start tangent).
    #[must_use]
    pub fn with_profile_x(mut self, direction: Vector3) -> Self {
        self.profile_x = Some(direction);
        self
    }

    /// Tags every face with a host material.
    #[must_use]
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Executes the sweep, creating the solid in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for an empty path, a profile
    /// with fewer than 3 points, a tangent discontinuity, or a profile
    /// vertex on an arc axis.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let Some(first) = self.path.first() else {
            return Err(OperationError::InvalidInput("sweep path is empty".into()).into());
        };
        if self.profile.len() < 3 {
            return Err(
                OperationError::InvalidInput("sweep profile needs at least 3 points".into()).into(),
            );
        }

        let tangent = first.start_tangent(&self.start)?;
        let profile = self.profile_loop(&tangent)?;

        let mut rings = vec![add_ring(store, &profile, &Matrix4::identity())?];
        let mut faces = Vec::new();
        let mut placement = Matrix4::identity();
        let mut position = self.start;
        let mut end_tangent = tangent;
        for (i, segment) in self.path.iter().enumerate() {
            let seg_tangent = segment.start_tangent(&position)?;
            if i > 0 && !(is_parallel(&seg_tangent, &end_tangent) && seg_tangent.dot(&end_tangent) > 0.0)
            {
                return Err(OperationError::InvalidInput(format!(
                    "sweep path is not tangent-continuous at segment {i}"
                ))
                .into());
            }
            let motion = segment.motion(&position)?;
            placement = motion * placement;
            let ring = add_ring(store, &profile, &placement)?;
            faces.extend(self.segment_faces(store, segment, &rings[i], &ring)?);
            rings.push(ring);
            position = transform_point(&motion, &position);
            end_tangent = transform_direction(&motion, &seg_tangent);
        }

        let start_cap = self.cap(store, &rings[0], true)?;
        let end_cap = self.cap(store, &rings[rings.len() - 1], false)?;
        faces.insert(0, end_cap);
        faces.insert(0, start_cap);

        let shell = store.add_shell(ShellData {
            faces,
            is_closed: true,
        });
        MakeSolid::new(shell, vec![]).execute(store)
    }

    /// Places the 2D profile at the path start, counter-clockwise about the
    /// start tangent.
    fn profile_loop(&self, tangent: &Vector3) -> Result<Vec<LoopEdge>> {
        let x_axis = match self.profile_x {
            Some(x) if x.norm() > TOLERANCE && is_perpendicular(&x.normalize(), tangent) => {
                x.normalize()
            }
            Some(_) => {
                return Err(OperationError::InvalidInput(
                    "profile X axis must be perpendicular to the path".into(),
                )
                .into())
            }
            None => *Plane::from_normal(self.start, *tangent)?.u_dir(),
        };
        let frame = Plane::with_u_dir(self.start, *tangent, x_axis)?;

        let mut points: Vec<Point3> = self.profile.iter().map(|q| frame.point_at(q.x, q.y)).collect();
        let twice_area: f64 = (0..self.profile.len())
            .map(|i| {
                let a = self.profile[i];
                let b = self.profile[(i + 1) % self.profile.len()];
                a.x * b.y - b.x * a.y
            })
            .sum();
        if twice_area.abs() < TOLERANCE {
            return Err(OperationError::InvalidInput("sweep profile has no area".into()).into());
        }
        if twice_area < 0.0 {
            points.reverse();
        }

        let n = points.len();
        (0..n)
            .map(|i| {
                let (start, end) = (points[i], points[(i + 1) % n]);
                let (line, length) = Line::between(start, end)?;
                Ok(LoopEdge {
                    curve: EdgeCurve::Line(line),
                    t0: 0.0,
                    t1: length,
                    start,
                    end,
                })
            })
            .collect()
    }

    fn segment_faces(
        &self,
        store: &mut TopologyStore,
        segment: &PathSegment,
        from: &Ring,
        to: &Ring,
    ) -> Result<Vec<FaceId>> {
        let mut rungs: Vec<EdgeId> = Vec::with_capacity(from.vertices.len());
        for (&a, &b) in from.vertices.iter().zip(&to.vertices) {
            let pa = store.vertex(a)?.point;
            let pb = store.vertex(b)?.point;
            let (curve, t_end) = segment.rung(&pa, &pb)?;
            rungs.push(store.add_edge(EdgeData {
                start: a,
                end: b,
                curve,
                t_start: 0.0,
                t_end,
            }));
        }
        let surface = match segment {
            PathSegment::Line { .. } => None,
            PathSegment::Arc { .. } | PathSegment::Helix { .. } => Some(FaceSurface::Ruled),
        };
        (0..rungs.len())
            .map(|k| add_side_face(store, from, to, &rungs, k, surface.clone(), self.material))
            .collect()
    }

    fn cap(&self, store: &mut TopologyStore, ring: &Ring, reversed: bool) -> Result<FaceId> {
        let wire = ring_wire(store, ring, reversed);
        let mut make = MakeFace::new(wire, vec![]);
        if let Some(material) = self.material {
            make = make.with_material(material);
        }
        make.execute(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::Volume;
    use crate::tessellation::{LevelOfDetail, TessellationParams};
    use crate::topology::SolidQuery;
    use std::f64::consts::FRAC_PI_2;

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

    // ── Straight sweeps ────────────────────────────────────────

    #[test]
    fn straight_sweep_is_a_prism() {
        let mut store = TopologyStore::new();
        let solid = Sweep::new(square(), Point3::origin(), vec![PathSegment::Line { end: p(0.0, 0.0, 4.0) }])
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.faces(solid).unwrap().len(), 6);
        assert_eq!(store.edges(solid).unwrap().len(), 12);
        let volume = Volume::new(solid).execute(&store).unwrap();
        assert!((volume - 4.0).abs() < 1e-9, "got {volume}");
    }

    // ── Bent sweeps ────────────────────────────────────────────

    #[test]
    fn bent_sweep_faces_and_volume() {
        let mut store = TopologyStore::new();
        let solid = Sweep::new(square(), Point3::origin(), bent_path())
            .with_profile_x(Vector3::y())
            .execute(&mut store)
            .unwrap();
        let faces = store.faces(solid).unwrap();
        assert_eq!(faces.len(), 2 + 4 * 3);
        let ruled = faces
            .iter()
            .filter(|&&f| matches!(store.face(f).unwrap().surface, FaceSurface::Ruled))
            .count();
        assert_eq!(ruled, 4);

        let volume = Volume::new(solid)
            .with_params(TessellationParams::for_level(LevelOfDetail::Fine))
            .execute(&store)
            .unwrap();
        let expected = 10.0 + 5.0 * FRAC_PI_2;
        assert!((volume - expected).abs() < expected * 0.01, "got {volume}");
    }

    #[test]
    fn helix_sweep_builds_helical_edges() {
        let mut store = TopologyStore::new();
        let path = vec![PathSegment::Helix {
            center: Point3::origin(),
            axis: Vector3::z(),
            angle: TAU,
            rise: 3.0,
        }];
        let solid = Sweep::new(square(), p(4.0, 0.0, 0.0), path)
            .execute(&mut store)
            .unwrap();
        let helices = store
            .edges(solid)
            .unwrap()
            .into_iter()
            .filter(|&e| matches!(store.edge(e).unwrap().curve, EdgeCurve::Helix(_)))
            .count();
        assert_eq!(helices, 4);
    }

    // ── Error cases ────────────────────────────────────────────

    #[test]
    fn kinked_path_rejected() {
        let mut store = TopologyStore::new();
        let path = vec![
            PathSegment::Line { end: p(5.0, 0.0, 0.0) },
            PathSegment::Line { end: p(5.0, 5.0, 0.0) },
        ];
        assert!(Sweep::new(square(), Point3::origin(), path).execute(&mut store).is_err());
    }

    #[test]
    fn empty_path_rejected() {
        let mut store = TopologyStore::new();
        assert!(Sweep::new(square(), Point3::origin(), vec![]).execute(&mut store).is_err());
    }
}
