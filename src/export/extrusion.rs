use crate::error::Result;
use crate::geometry::{CoordinateSystem, CurveLoop, Plane};
use crate::math::{is_parallel, is_perpendicular, same_length, Point3, Vector3, TOLERANCE};
use crate::topology::{FaceId, FaceSurface, SolidId, SolidQuery, TopologyStore};

use super::error::{FallbackReason, StageResult};
use super::loops::{oriented, planar_normal, wire_loop};
use super::options::ExportOptions;

/// A rectangular through-hole carried as a separate subtraction.
#[derive(Debug, Clone)]
pub struct OpeningData {
    /// Hole boundary in the base plane, counter-clockwise about `direction`.
    pub profile: CurveLoop,
    /// Unit direction of the cut.
    pub direction: Vector3,
    /// Depth of the cut.
    pub depth: f64,
}

/// An extruded area solid.
#[derive(Debug, Clone)]
pub struct ExtrusionDescriptor {
    /// Outer profile loops, counter-clockwise about `direction`.
    pub outer_loops: Vec<CurveLoop>,
    /// Profile holes, clockwise about `direction`.
    pub inner_loops: Vec<CurveLoop>,
    /// Plane of the base cap, normal along `direction`.
    pub base_plane: Plane,
    /// Unit extrusion direction.
    pub direction: Vector3,
    /// Distance between the caps.
    pub length: f64,
    /// `length` in output units.
    pub scaled_length: f64,
    /// Angle between the direction and the basis Z axis, in radians.
    pub slope: f64,
    /// Profile extent along the second edge, for rectangular profiles.
    pub height: Option<f64>,
    /// Profile extent along the first edge, for rectangular profiles.
    pub width: Option<f64>,
    /// Summed length of all profile loops.
    pub perimeter: f64,
    /// Holes exported as openings.
    pub openings: Vec<OpeningData>,
    /// Placement the profile coordinates are relative to.
    pub placement: Option<CoordinateSystem>,
}

impl ExtrusionDescriptor {
    /// Outer loops first, then holes.
    pub fn profile_loops(&self) -> impl Iterator<Item = &CurveLoop> {
        self.outer_loops.iter().chain(&self.inner_loops)
    }

    /// Number of profile loops.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.outer_loops.len() + self.inner_loops.len()
    }

    /// Net profile area, outer loops minus holes.
    ///
    /// # Errors
    ///
    /// Returns an error if an arc cannot be evaluated.
    pub fn profile_area(&self) -> Result<f64> {
        let mut area = 0.0;
        for l in self.profile_loops() {
            area += l.signed_area(&self.base_plane)?;
        }
        Ok(area)
    }

    /// Volume of the body once openings are cut.
    ///
    /// # Errors
    ///
    /// Returns an error if an arc cannot be evaluated.
    pub fn volume(&self) -> Result<f64> {
        let mut area = self.profile_area()?;
        for opening in &self.openings {
            area -= opening.profile.signed_area(&self.base_plane)?.abs();
        }
        Ok(area * self.length)
    }
}

struct Cap {
    face: FaceId,
    offset: f64,
}

/// Tests a solid against one candidate extrusion axis.
///
/// Every face must either run along the axis (planes whose normal is
/// perpendicular to it, cylinders whose rulings follow it) or be a cap
/// perpendicular to it. The solid is rejected unless all caps facing against
/// the axis share one plane, all caps facing along it share another, every
/// vertex lies on one of those planes and each top outer loop is a
/// translated base outer loop.
pub struct ExtrusionAnalysis<'a> {
    solid: SolidId,
    axis: Vector3,
    placement: Option<&'a CoordinateSystem>,
    extract_openings: bool,
    length_scale: f64,
}

impl<'a> ExtrusionAnalysis<'a> {
    /// Creates an analysis along `axis`.
    #[must_use]
    pub fn new(solid: SolidId, axis: Vector3) -> Self {
        Self {
            solid,
            axis,
            placement: None,
            extract_openings: true,
            length_scale: 1.0,
        }
    }

    /// Takes opening extraction and the length scale from `options`.
    #[must_use]
    pub fn with_options(mut self, options: &ExportOptions) -> Self {
        self.extract_openings = options.extract_openings;
        self.length_scale = options.length_scale;
        self
    }

    /// Records the placement the solid's coordinates are relative to.
    #[must_use]
    pub fn with_placement(mut self, placement: &'a CoordinateSystem) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Runs the analysis.
    ///
    /// # Errors
    ///
    /// Returns the [`FallbackReason`] that disqualifies the solid for this
    /// axis.
    pub fn execute(&self, store: &TopologyStore) -> StageResult<ExtrusionDescriptor> {
        let axis_len = self.axis.norm();
        if axis_len < TOLERANCE {
            return Err(FallbackReason::DegenerateSolid("zero extrusion axis".into()));
        }
        let direction = self.axis / axis_len;

        let (bases, tops) = split_faces(store, self.solid, &direction)?;
        let (Some(base), Some(top)) = (bases.first(), tops.first()) else {
            return Err(FallbackReason::NotPrismatic("caps missing on one side".into()));
        };
        if !bases.iter().all(|c| same_length(c.offset, base.offset))
            || !tops.iter().all(|c| same_length(c.offset, top.offset))
        {
            return Err(FallbackReason::NotPrismatic("caps are not coplanar".into()));
        }
        let length = top.offset - base.offset;
        if length < TOLERANCE {
            return Err(FallbackReason::DegenerateSolid("caps coincide".into()));
        }

        for edge_id in store.edges(self.solid)? {
            let edge = store.edge(edge_id)?;
            for v in [edge.start, edge.end] {
                let offset = store.vertex(v)?.point.coords.dot(&direction);
                if !same_length(offset, base.offset) && !same_length(offset, top.offset) {
                    return Err(FallbackReason::NotPrismatic("vertex between the caps".into()));
                }
            }
        }

        let shift = direction * length;
        for cap in &tops {
            let top_points = store.wire_points(store.face(cap.face)?.outer_wire)?;
            let mut matched = false;
            for base_cap in &bases {
                let base_points = store.wire_points(store.face(base_cap.face)?.outer_wire)?;
                if is_translation(&base_points, &top_points, &shift) {
                    matched = true;
                    break;
                }
            }
            if !matched {
                return Err(FallbackReason::NotPrismatic(
                    "top cap is not a translated base cap".into(),
                ));
            }
        }

        let mut outer_loops = Vec::new();
        let mut inner_loops = Vec::new();
        let mut openings = Vec::new();
        for cap in &bases {
            let face = store.face(cap.face)?;
            outer_loops.push(oriented(wire_loop(store, face.outer_wire)?, &direction, true)?);
            for &wire in &face.inner_wires {
                let hole = wire_loop(store, wire)?;
                if self.extract_openings && hole.rectangle_fit(&direction).is_some() {
                    openings.push(OpeningData {
                        profile: oriented(hole, &direction, true)?,
                        direction,
                        depth: length,
                    });
                } else {
                    inner_loops.push(oriented(hole, &direction, false)?);
                }
            }
        }

        let origin: Point3 = outer_loops[0].segments()[0].start()?;
        let base_plane = Plane::from_normal(origin, direction)?;
        let mut outer_area = 0.0;
        for l in &outer_loops {
            outer_area += l.signed_area(&base_plane)?;
        }
        if outer_area < TOLERANCE {
            return Err(FallbackReason::DegenerateSolid("profile has no area".into()));
        }

        // Solid coordinates are already local when a placement is given.
        let slope = direction.cross(&Vector3::z()).norm().clamp(0.0, 1.0).asin();
        let fit = match outer_loops.as_slice() {
            [only] => only.rectangle_fit(&direction),
            _ => None,
        };
        let perimeter = outer_loops.iter().chain(&inner_loops).map(CurveLoop::length).sum();

        Ok(ExtrusionDescriptor {
            outer_loops,
            inner_loops,
            base_plane,
            direction,
            length,
            scaled_length: length * self.length_scale,
            slope,
            height: fit.as_ref().map(|f| f.height),
            width: fit.as_ref().map(|f| f.width),
            perimeter,
            openings,
            placement: self.placement.cloned(),
        })
    }
}

/// Sorts the faces of a solid into base caps and top caps, rejecting any
/// face that is neither a side nor a cap.
fn split_faces(
    store: &TopologyStore,
    solid: SolidId,
    direction: &Vector3,
) -> StageResult<(Vec<Cap>, Vec<Cap>)> {
    let mut bases = Vec::new();
    let mut tops = Vec::new();
    for face_id in store.faces(solid)? {
        let face = store.face(face_id)?;
        match &face.surface {
            FaceSurface::Plane(plane) => {
                let normal = planar_normal(face).unwrap_or(*plane.plane_normal());
                if is_perpendicular(&normal, direction) {
                    continue;
                }
                if !is_parallel(&normal, direction) {
                    return Err(FallbackReason::FaceNotAligned);
                }
                let cap = Cap {
                    face: face_id,
                    offset: plane.origin().coords.dot(direction),
                };
                if normal.dot(direction) < 0.0 {
                    bases.push(cap);
                } else {
                    tops.push(cap);
                }
            }
            FaceSurface::Cylinder(cylinder) if cylinder.is_ruled_along(direction) => {}
            FaceSurface::Cylinder(_) | FaceSurface::Ruled => {
                return Err(FallbackReason::FaceNotAligned)
            }
        }
    }
    Ok((bases, tops))
}

/// Whether `top` is `base` moved by `shift`, as point sets.
fn is_translation(base: &[Point3], top: &[Point3], shift: &Vector3) -> bool {
    base.len() == top.len()
        && top
            .iter()
            .all(|t| base.iter().any(|b| (b + shift - t).norm() < TOLERANCE))
}
