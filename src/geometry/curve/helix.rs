use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{transform_direction, transform_point, Matrix4, Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A circular helix around an axis.
///
/// `P(t) = center + r cos(t) ref_dir + r sin(t) (axis x ref_dir) + axis * pitch * t / 2pi`
///
/// `pitch` is the rise per full turn; the parameter is the turning angle.
#[derive(Debug, Clone)]
pub struct Helix {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
    pitch: f64,
    start_angle: f64,
    end_angle: f64,
}

impl Helix {
    /// Creates a new helix.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, a direction is
    /// zero-length, or `ref_dir` is not perpendicular to `axis`.
    pub fn new(
        center: Point3,
        radius: f64,
        axis: Vector3,
        ref_dir: Vector3,
        pitch: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("helix radius must be positive".into()).into());
        }
        let axis_len = axis.norm();
        let ref_len = ref_dir.norm();
        if axis_len < TOLERANCE || ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / axis_len;
        let ref_dir = ref_dir / ref_len;
        if axis.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to axis".into(),
            )
            .into());
        }
        Ok(Self {
            center,
            radius,
            axis,
            ref_dir,
            pitch,
            start_angle,
            end_angle,
        })
    }

    /// Returns the point on the axis at parameter zero.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the unit axis.
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the rise per full turn.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    fn rise_rate(&self) -> f64 {
        self.pitch / TAU
    }

    /// Returns the helix mapped through a rigid transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses the helix frame.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        Self::new(
            transform_point(matrix, &self.center),
            self.radius,
            transform_direction(matrix, &self.axis),
            transform_direction(matrix, &self.ref_dir),
            self.pitch,
            self.start_angle,
            self.end_angle,
        )
    }
}

impl Curve for Helix {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let binormal = self.binormal();
        Ok(self.center
            + self.ref_dir * (self.radius * t.cos())
            + binormal * (self.radius * t.sin())
            + self.axis * (self.rise_rate() * t))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let binormal = self.binormal();
        let d = self.ref_dir * (-self.radius * t.sin())
            + binormal * (self.radius * t.cos())
            + self.axis * self.rise_rate();
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.start_angle, self.end_angle)
    }

    fn length_between(&self, t0: f64, t1: f64) -> f64 {
        (t1 - t0).abs() * self.radius.hypot(self.rise_rate())
    }
}
