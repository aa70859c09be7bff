use crate::error::{OperationError, Result};

use super::{Point3, Vector3, TOLERANCE};

/// Computes the unit normal of a polygon using Newell's method.
///
/// # Errors
///
/// Returns [`OperationError::Failed`] if the polygon is degenerate
/// (fewer than 3 points or zero area).
pub fn newell_normal(points: &[Point3]) -> Result<Vector3> {
    let n = points.len();
    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    if n < 3 || len < TOLERANCE {
        return Err(
            OperationError::Failed("degenerate polygon: cannot compute normal".into()).into(),
        );
    }
    Ok(normal / len)
}

/// Signed area of a 3D polygon measured against `normal`.
///
/// Positive when the polygon winds counter-clockwise about `normal`.
#[must_use]
pub fn signed_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut cross_sum = Vector3::new(0.0, 0.0, 0.0);
    let o = &points[0];
    for i in 1..n {
        let a = points[i] - o;
        let b = points[(i + 1) % n] - o;
        cross_sum += a.cross(&b);
    }
    0.5 * cross_sum.dot(normal)
}

/// Compute the area of a 3D polygon (coplanar points).
///
/// Uses the cross-product summation method projected along the polygon normal.
#[must_use]
pub fn polygon_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    signed_area_3d(points, normal).abs()
}

/// Arithmetic mean of a set of points.
#[must_use]
pub fn centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum * inv_n)
}

/// Largest distance of any point from the plane through `origin` with `normal`.
#[must_use]
pub fn max_plane_deviation(points: &[Point3], origin: &Point3, normal: &Vector3) -> f64 {
    points
        .iter()
        .map(|p| (p - origin).dot(normal).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn newell_normal_of_ccw_square_is_plus_z() {
        let n = newell_normal(&unit_square()).unwrap();
        assert!((n - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn newell_normal_rejects_collinear_points() {
        let line = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(newell_normal(&line).is_err());
    }

    #[test]
    fn signed_area_flips_with_winding() {
        let sq = unit_square();
        let rev: Vec<Point3> = sq.iter().rev().copied().collect();
        assert!((signed_area_3d(&sq, &Vector3::z()) - 1.0).abs() < TOLERANCE);
        assert!((signed_area_3d(&rev, &Vector3::z()) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn triangle_area() {
        let tri = vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(0.0, 3.0, 0.0)];
        let area = polygon_area_3d(&tri, &Vector3::z());
        assert!((area - 6.0).abs() < TOLERANCE);
    }

    #[test]
    fn centroid_of_square() {
        let c = centroid(&unit_square());
        assert!((c - p(0.5, 0.5, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn deviation_detects_lifted_point() {
        let mut pts = unit_square();
        pts[2].z = 0.25;
        let d = max_plane_deviation(&pts, &p(0.0, 0.0, 0.0), &Vector3::z());
        assert!((d - 0.25).abs() < TOLERANCE);
    }
}
