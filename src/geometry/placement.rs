use crate::error::{GeometryError, Result};
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

/// A right-handed orthonormal coordinate system (an IFC axis placement).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    z_axis: Vector3,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::world()
    }
}

impl CoordinateSystem {
    /// The world coordinate system.
    #[must_use]
    pub fn world() -> Self {
        Self {
            origin: Point3::origin(),
            x_axis: Vector3::x(),
            y_axis: Vector3::y(),
            z_axis: Vector3::z(),
        }
    }

    /// Creates a coordinate system from an origin, a Z axis and a reference
    /// X direction. The X axis is the reference projected perpendicular to Z.
    ///
    /// # Errors
    ///
    /// Returns an error if either direction is zero-length or they are parallel.
    pub fn new(origin: Point3, z_axis: Vector3, x_ref: Vector3) -> Result<Self> {
        let z_len = z_axis.norm();
        if z_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let z_axis = z_axis / z_len;
        let x_axis = x_ref - z_axis * x_ref.dot(&z_axis);
        let x_len = x_axis.norm();
        if x_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("reference X is parallel to Z axis".into()).into(),
            );
        }
        let x_axis = x_axis / x_len;
        let y_axis = z_axis.cross(&x_axis);
        Ok(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Returns the origin.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the local X axis in world coordinates.
    #[must_use]
    pub fn x_axis(&self) -> &Vector3 {
        &self.x_axis
    }

    /// Returns the local Y axis in world coordinates.
    #[must_use]
    pub fn y_axis(&self) -> &Vector3 {
        &self.y_axis
    }

    /// Returns the local Z axis in world coordinates.
    #[must_use]
    pub fn z_axis(&self) -> &Vector3 {
        &self.z_axis
    }

    /// Matrix mapping local coordinates to world coordinates.
    #[must_use]
    pub fn to_world(&self) -> Matrix4 {
        let mut m = Matrix4::identity();
        for row in 0..3 {
            m[(row, 0)] = self.x_axis[row];
            m[(row, 1)] = self.y_axis[row];
            m[(row, 2)] = self.z_axis[row];
            m[(row, 3)] = self.origin[row];
        }
        m
    }

    /// Matrix mapping world coordinates to local coordinates.
    #[must_use]
    pub fn to_local(&self) -> Matrix4 {
        let mut m = Matrix4::identity();
        let axes = [self.x_axis, self.y_axis, self.z_axis];
        for (row, axis) in axes.iter().enumerate() {
            for col in 0..3 {
                m[(row, col)] = axis[col];
            }
            m[(row, 3)] = -axis.dot(&self.origin.coords);
        }
        m
    }
}
