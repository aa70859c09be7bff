use crate::error::{GeometryError, Result};
use crate::math::{
    is_parallel, transform_direction, transform_point, Matrix4, Point3, Vector3, TOLERANCE,
};

/// A cylindrical surface in 3D space.
///
/// Defined by a center point on the axis, radius, axis direction, and
/// a reference direction for the zero angle.
///
/// `P(u, v) = center + radius * cos(u) * ref_dir + radius * sin(u) * binormal + v * axis`
/// where `binormal = axis x ref_dir`.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Cylinder {
    /// Creates a new cylinder.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, axis is zero-length,
    /// or the reference direction is not perpendicular to the axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
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
        })
    }

    /// Returns the center point on the axis.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Whether the cylinder's rulings run along `direction`.
    #[must_use]
    pub fn is_ruled_along(&self, direction: &Vector3) -> bool {
        is_parallel(&self.axis, direction)
    }

    /// Returns the cylinder mapped through a rigid transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses the axis frame.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        Self::new(
            transform_point(matrix, &self.center),
            self.radius,
            transform_direction(matrix, &self.axis),
            transform_direction(matrix, &self.ref_dir),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rulings_follow_axis() {
        let c = Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        assert!(c.is_ruled_along(&-Vector3::z()));
        assert!(!c.is_ruled_along(&Vector3::x()));
    }

    #[test]
    fn invalid_radius() {
        let r = Cylinder::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x());
        assert!(r.is_err());
    }

    #[test]
    fn rotation_turns_axis() {
        let rot = nalgebra::Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::FRAC_PI_2);
        let m = rot.to_homogeneous();
        let c = Cylinder::new(Point3::origin(), 2.0, Vector3::z(), Vector3::x())
            .unwrap()
            .transformed(&m)
            .unwrap();
        assert!(c.is_ruled_along(&Vector3::y()));
        assert!((c.radius() - 2.0).abs() < TOLERANCE);
    }
}
