use crate::error::{GeometryError, Result, TopologyError};
use crate::math::{is_parallel, is_perpendicular, same_length, Matrix4, Point3, Vector3, TOLERANCE};

use super::curve::{Arc, Curve};
use super::surface::Plane;

/// Kind of a curve segment, used for profile similarity tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Line,
    Arc,
}

/// One segment of a profile loop or a sweep rail.
#[derive(Debug, Clone)]
pub enum CurveSegment {
    /// Straight segment.
    Line { start: Point3, end: Point3 },
    /// Circular arc traversed from `t_start` to `t_end`.
    Arc { arc: Arc, t_start: f64, t_end: f64 },
}

impl CurveSegment {
    /// Returns the segment kind.
    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Line { .. } => SegmentKind::Line,
            Self::Arc { .. } => SegmentKind::Arc,
        }
    }

    /// Start point.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc cannot be evaluated.
    pub fn start(&self) -> Result<Point3> {
        match self {
            Self::Line { start, .. } => Ok(*start),
            Self::Arc { arc, t_start, .. } => arc.evaluate(*t_start),
        }
    }

    /// End point.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc cannot be evaluated.
    pub fn end(&self) -> Result<Point3> {
        match self {
            Self::Line { end, .. } => Ok(*end),
            Self::Arc { arc, t_end, .. } => arc.evaluate(*t_end),
        }
    }

    /// Arc length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::Line { start, end } => (end - start).norm(),
            Self::Arc { arc, t_start, t_end } => arc.length_between(*t_start, *t_end),
        }
    }

    /// The same segment traversed the other way.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Line { start, end } => Self::Line {
                start: *end,
                end: *start,
            },
            Self::Arc { arc, t_start, t_end } => Self::Arc {
                arc: arc.clone(),
                t_start: *t_end,
                t_end: *t_start,
            },
        }
    }

    /// Returns the segment mapped through a rigid transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc frame collapses.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        Ok(match self {
            Self::Line { start, end } => Self::Line {
                start: crate::math::transform_point(matrix, start),
                end: crate::math::transform_point(matrix, end),
            },
            Self::Arc { arc, t_start, t_end } => Self::Arc {
                arc: arc.transformed(matrix)?,
                t_start: *t_start,
                t_end: *t_end,
            },
        })
    }

    /// Twice the signed area swept by the segment about the plane origin
    /// (`integral of x dy - y dx` in plane coordinates).
    fn green_integral(&self, plane: &Plane) -> Result<f64> {
        match self {
            Self::Line { start, end } => {
                let a = plane.project(start);
                let b = plane.project(end);
                Ok(a.x * b.y - b.x * a.y)
            }
            Self::Arc { arc, t_start, t_end } => {
                let r = arc.radius();
                let c = plane.project(arc.center());
                let ref_dir = arc.ref_dir();
                let binormal = arc.binormal();
                let (ax, ay) = (ref_dir.dot(plane.u_dir()), ref_dir.dot(plane.v_dir()));
                let (bx, by) = (binormal.dot(plane.u_dir()), binormal.dot(plane.v_dir()));
                let dcos = t_end.cos() - t_start.cos();
                let dsin = t_end.sin() - t_start.sin();
                let det = ax * by - ay * bx;
                Ok(r * r * det * (t_end - t_start)
                    + c.x * r * (ay * dcos + by * dsin)
                    - c.y * r * (ax * dcos + bx * dsin))
            }
        }
    }
}

/// Result of fitting a rectangle to a loop.
#[derive(Debug, Clone)]
pub struct RectangleFit {
    /// Plane whose U axis follows the loop's first edge.
    pub plane: Plane,
    /// Length of the first edge.
    pub width: f64,
    /// Length of the second edge.
    pub height: f64,
}

/// An ordered, closed sequence of curve segments.
#[derive(Debug, Clone)]
pub struct CurveLoop {
    segments: Vec<CurveSegment>,
}

impl CurveLoop {
    /// Creates a loop, checking that consecutive segments join and the loop closes.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for an empty loop and
    /// [`TopologyError::WireNotClosed`] if consecutive segments do not meet.
    pub fn new(segments: Vec<CurveSegment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(GeometryError::Degenerate("empty curve loop".into()).into());
        }
        let n = segments.len();
        for i in 0..n {
            let end = segments[i].end()?;
            let next_start = segments[(i + 1) % n].start()?;
            if (end - next_start).norm() > TOLERANCE * (1.0 + end.coords.norm()) {
                return Err(TopologyError::WireNotClosed.into());
            }
        }
        Ok(Self { segments })
    }

    /// Builds a closed polygonal loop through `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 3 points are given.
    pub fn polygon(points: &[Point3]) -> Result<Self> {
        if points.len() < 3 {
            return Err(
                GeometryError::Degenerate("polygon loop needs at least 3 points".into()).into(),
            );
        }
        let n = points.len();
        let segments = (0..n)
            .map(|i| CurveSegment::Line {
                start: points[i],
                end: points[(i + 1) % n],
            })
            .collect();
        Ok(Self { segments })
    }

    /// Returns the segments in traversal order.
    #[must_use]
    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the loop has no segments (never true for a constructed loop).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.segments.iter().map(CurveSegment::length).sum()
    }

    /// Segment start points in order.
    ///
    /// # Errors
    ///
    /// Returns an error if an arc cannot be evaluated.
    pub fn vertices(&self) -> Result<Vec<Point3>> {
        self.segments.iter().map(CurveSegment::start).collect()
    }

    /// Signed enclosed area in `plane`, positive when counter-clockwise
    /// about the plane normal. Exact for lines and arcs.
    ///
    /// # Errors
    ///
    /// Returns an error if an arc cannot be evaluated.
    pub fn signed_area(&self, plane: &Plane) -> Result<f64> {
        let mut twice = 0.0;
        for segment in &self.segments {
            twice += segment.green_integral(plane)?;
        }
        Ok(0.5 * twice)
    }

    /// Whether the loop winds counter-clockwise about `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is degenerate.
    pub fn is_counter_clockwise(&self, normal: &Vector3) -> Result<bool> {
        let origin = self.segments[0].start()?;
        let plane = Plane::from_normal(origin, *normal)?;
        Ok(self.signed_area(&plane)? > 0.0)
    }

    /// The loop traversed in the opposite sense.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().map(CurveSegment::reversed).collect(),
        }
    }

    /// Returns the loop mapped through a rigid transform.
    ///
    /// # Errors
    ///
    /// Returns an error if an arc frame collapses.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let segments = self
            .segments
            .iter()
            .map(|s| s.transformed(matrix))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// Fits a rectangle: four line segments alternating between the first
    /// edge direction and its in-plane perpendicular, opposite sides equal.
    #[must_use]
    pub fn rectangle_fit(&self, normal: &Vector3) -> Option<RectangleFit> {
        if self.segments.len() != 4 {
            return None;
        }
        let mut dirs = Vec::with_capacity(4);
        let mut lengths = Vec::with_capacity(4);
        for segment in &self.segments {
            let CurveSegment::Line { start, end } = segment else {
                return None;
            };
            let d = end - start;
            let len = d.norm();
            if len < TOLERANCE {
                return None;
            }
            dirs.push(d / len);
            lengths.push(len);
        }
        let CurveSegment::Line { start, .. } = &self.segments[0] else {
            return None;
        };
        let plane = Plane::with_u_dir(*start, *normal, dirs[0]).ok()?;
        for (i, dir) in dirs.iter().enumerate() {
            let axis = if i % 2 == 0 { plane.u_dir() } else { plane.v_dir() };
            if !is_parallel(dir, axis) || !is_perpendicular(dir, plane.plane_normal()) {
                return None;
            }
        }
        if !same_length(lengths[0], lengths[2]) || !same_length(lengths[1], lengths[3]) {
            return None;
        }
        Some(RectangleFit {
            plane,
            width: lengths[0],
            height: lengths[1],
        })
    }
}
