pub mod polygon_3d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance, in model units.
///
/// Every parallel, perpendicular, coplanar and equal-length test in the crate
/// compares against this one value. Classification of borderline geometry
/// depends on it, so it must not be replaced by local epsilons.
pub const TOLERANCE: f64 = 1e-9;

/// Returns `true` if two unit vectors point along the same line (either sense).
#[must_use]
pub fn is_parallel(a: &Vector3, b: &Vector3) -> bool {
    a.cross(b).norm() < TOLERANCE
}

/// Returns `true` if two unit vectors are perpendicular.
#[must_use]
pub fn is_perpendicular(a: &Vector3, b: &Vector3) -> bool {
    a.dot(b).abs() < TOLERANCE
}

/// Returns `true` if two lengths are equal within [`TOLERANCE`].
#[must_use]
pub fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() < TOLERANCE
}

/// Hashable key for exact point identity.
///
/// Positive and negative zero map to the same key.
#[must_use]
pub fn point_key(p: &Point3) -> [u64; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

/// Transforms a direction vector by a 4x4 matrix (ignoring translation).
#[must_use]
pub fn transform_direction(matrix: &Matrix4, dir: &Vector3) -> Vector3 {
    let v = matrix * nalgebra::Vector4::new(dir.x, dir.y, dir.z, 0.0);
    Vector3::new(v.x, v.y, v.z)
}
