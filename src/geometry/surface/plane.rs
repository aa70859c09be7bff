use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::{centroid, newell_normal};
use crate::math::{
    transform_direction, transform_point, Matrix4, Point2, Point3, Vector3, TOLERANCE,
};

/// An infinite plane in 3D space.
///
/// Defined by an origin point, and two orthogonal direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir x v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from an origin, a normal and an in-plane U direction.
    ///
    /// `u_dir` is projected into the plane before normalizing.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length or `u_dir` is parallel
    /// to it.
    pub fn with_u_dir(origin: Point3, normal: Vector3, u_dir: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        let u_dir = u_dir - normal * u_dir.dot(&normal);
        let u_len = u_dir.norm();
        if u_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("plane U direction is parallel to normal".into()).into(),
            );
        }
        let u_dir = u_dir / u_len;
        let v_dir = normal.cross(&u_dir);
        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Fits a plane through a closed polygon using Newell's method.
    ///
    /// The origin is the polygon centroid and the normal follows the winding.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon is degenerate.
    pub fn from_polygon(points: &[Point3]) -> Result<Self> {
        let normal = newell_normal(points)?;
        Self::from_normal(centroid(points), normal)
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance of `point` from the plane along the normal.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Projects a point onto the plane's UV coordinates.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u_dir), d.dot(&self.v_dir))
    }

    /// Maps UV coordinates back to 3D.
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin + self.u_dir * u + self.v_dir * v
    }

    /// Returns the same plane with the normal (and V axis) reversed.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            u_dir: self.u_dir,
            v_dir: -self.v_dir,
            normal: -self.normal,
        }
    }

    /// Returns the plane mapped through a rigid transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform collapses the plane frame.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        Self::with_u_dir(
            transform_point(matrix, &self.origin),
            transform_direction(matrix, &self.normal),
            transform_direction(matrix, &self.u_dir),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn from_polygon_follows_winding() {
        let pts = vec![p(0.0, 0.0, 2.0), p(0.0, 1.0, 2.0), p(1.0, 1.0, 2.0), p(1.0, 0.0, 2.0)];
        let plane = Plane::from_polygon(&pts).unwrap();
        assert!((plane.plane_normal() + Vector3::z()).norm() < TOLERANCE);
        assert!((plane.origin().z - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn project_and_back() {
        let plane = Plane::from_normal(p(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 0.0)).unwrap();
        let q = plane.point_at(0.5, -2.0);
        let uv = plane.project(&q);
        assert!((uv.x - 0.5).abs() < TOLERANCE);
        assert!((uv.y + 2.0).abs() < TOLERANCE);
        assert!(plane.signed_distance(&q).abs() < TOLERANCE);
    }

    #[test]
    fn with_u_dir_keeps_right_handed_frame() {
        let plane = Plane::with_u_dir(Point3::origin(), Vector3::z(), Vector3::x()).unwrap();
        assert!((plane.v_dir() - Vector3::y()).norm() < TOLERANCE);
        assert!(Plane::with_u_dir(Point3::origin(), Vector3::z(), Vector3::z()).is_err());
    }

    #[test]
    fn flipped_reverses_normal() {
        let plane = Plane::from_normal(Point3::origin(), Vector3::z()).unwrap();
        let f = plane.flipped();
        assert!((f.plane_normal() + Vector3::z()).norm() < TOLERANCE);
        assert!((f.u_dir().cross(f.v_dir()) - f.plane_normal()).norm() < TOLERANCE);
    }
}
