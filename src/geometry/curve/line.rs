use crate::error::Result;
use crate::math::{transform_direction, transform_point, Matrix4, Point3, Vector3};

use super::{Curve, CurveDomain};

/// An infinite line defined by an origin point and a direction vector.
///
/// The parametric form is: `P(t) = origin + t * direction`, with a unit
/// direction so that `t` measures arc length.
#[derive(Debug, Clone)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
}

impl Line {
    /// Creates a new line from an origin and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < crate::math::TOLERANCE {
            return Err(crate::error::GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            direction: direction / len,
        })
    }

    /// Creates the line through `start` and `end`, returning it together with
    /// the parameter of `end` (the segment length).
    ///
    /// # Errors
    ///
    /// Returns an error if the two points coincide.
    pub fn between(start: Point3, end: Point3) -> Result<(Self, f64)> {
        let d = end - start;
        let line = Self::new(start, d)?;
        Ok((line, d.norm()))
    }

    /// Returns the origin point of the line.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit direction vector of the line.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// Returns the line mapped through a rigid transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses the direction.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        Self::new(
            transform_point(matrix, &self.origin),
            transform_direction(matrix, &self.direction),
        )
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.origin + self.direction * t)
    }

    fn tangent(&self, _t: f64) -> Result<Vector3> {
        Ok(self.direction)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    fn length_between(&self, t0: f64, t1: f64) -> f64 {
        (t1 - t0).abs()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    #[test]
    fn between_measures_segment() {
        let (line, t_end) =
            Line::between(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0)).unwrap();
        assert!((t_end - 5.0).abs() < TOLERANCE);
        let end = line.evaluate(t_end).unwrap();
        assert!((end - Point3::new(3.0, 4.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn coincident_points_rejected() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(Line::between(p, p).is_err());
    }
}
