//! Geometry primitives.
//!
//! Small pure helpers on top of nalgebra used by the orientation selector and
//! the per-island transforms.

use nalgebra::{Matrix3, Point2, Vector2, Vector3};

/// Vectors shorter than this are treated as zero-length.
pub const EPSILON: f64 = 1e-12;

/// `1` for non-negative input, `-1` otherwise.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Component of `point` along `axis`.
///
/// Returns the zero vector when `axis` has zero length.
pub fn project(point: &Vector3<f64>, axis: &Vector3<f64>) -> Vector3<f64> {
    let len2 = axis.norm_squared();
    if len2 < EPSILON * EPSILON {
        return Vector3::zeros();
    }
    axis * (point.dot(axis) / len2)
}

/// Angle between two vectors in `[0, π]`.
///
/// Returns `None` if either vector has zero length.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> Option<f64> {
    let la = a.norm();
    let lb = b.norm();
    if la < EPSILON || lb < EPSILON {
        return None;
    }
    let cos = (a.dot(b) / (la * lb)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Round `x` to the nearest multiple of `1 / resolution`.
#[inline]
pub fn snap_to_grid(x: f64, resolution: f64) -> f64 {
    (x * resolution).round() / resolution
}

/// Mean of a set of points, `None` for an empty set.
pub fn centroid<It>(points: It) -> Option<Point2<f64>>
where
    It: IntoIterator<Item = Point2<f64>>,
{
    let mut sum = Vector2::zeros();
    let mut n = 0usize;
    for p in points {
        sum += p.coords;
        n += 1;
    }
    (n > 0).then(|| Point2::from(sum / n as f64))
}

/// An axis-aligned bounding box in UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    /// Lower-left corner.
    pub min: Point2<f64>,
    /// Upper-right corner.
    pub max: Point2<f64>,
}

impl Bounds2 {
    /// Bounds of a set of points, `None` for an empty set.
    pub fn from_points<It>(points: It) -> Option<Self>
    where
        It: IntoIterator<Item = Point2<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds2 {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    /// Extent along each axis.
    #[inline]
    pub fn size(&self) -> Vector2<f64> {
        self.max - self.min
    }

    /// Extent along U.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }
}

/// Affine map `p ↦ target + scale ⊙ (p − anchor)` as a homogeneous matrix.
pub fn anchored_scale(
    anchor: &Point2<f64>,
    scale: &Vector2<f64>,
    target: &Point2<f64>,
) -> Matrix3<f64> {
    Matrix3::new_translation(&target.coords)
        * Matrix3::new_nonuniform_scaling(scale)
        * Matrix3::new_translation(&-anchor.coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sign() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(2.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
    }

    #[test]
    fn test_project() {
        let p = Vector3::new(3.0, 4.0, 5.0);
        let proj = project(&p, &Vector3::new(0.0, 2.0, 0.0));
        assert!((proj - Vector3::new(0.0, 4.0, 0.0)).norm() < 1e-10);
        assert_eq!(project(&p, &Vector3::zeros()), Vector3::zeros());
    }

    #[test]
    fn test_angle_between() {
        let x = Vector3::x();
        let y = Vector3::y();
        assert!((angle_between(&x, &y).unwrap() - PI / 2.0).abs() < 1e-10);
        assert!((angle_between(&x, &-x).unwrap() - PI).abs() < 1e-10);
        assert!(angle_between(&x, &x).unwrap().abs() < 1e-7);
        assert!(angle_between(&x, &Vector3::zeros()).is_none());
    }

    #[test]
    fn test_snap_to_grid() {
        assert!((snap_to_grid(0.124, 8.0) - 0.125).abs() < 1e-12);
        assert!((snap_to_grid(-0.2, 4.0) - -0.25).abs() < 1e-12);
    }

    #[test]
    fn test_bounds() {
        let b = Bounds2::from_points([Point2::new(1.0, -1.0), Point2::new(-2.0, 3.0)]).unwrap();
        assert_eq!(b.min, Point2::new(-2.0, -1.0));
        assert_eq!(b.max, Point2::new(1.0, 3.0));
        assert_eq!(b.size(), Vector2::new(3.0, 4.0));
        assert_eq!(b.width(), 3.0);
        assert!(Bounds2::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_centroid() {
        let c = centroid([Point2::new(0.0, 0.0), Point2::new(2.0, 4.0)]).unwrap();
        assert_eq!(c, Point2::new(1.0, 2.0));
        assert!(centroid(std::iter::empty()).is_none());
    }

    #[test]
    fn test_anchored_scale() {
        let m = anchored_scale(
            &Point2::new(1.0, 1.0),
            &Vector2::new(2.0, 0.5),
            &Point2::new(0.0, 0.0),
        );
        let p = m.transform_point(&Point2::new(3.0, 3.0));
        assert!((p - Point2::new(4.0, 1.0)).norm() < 1e-12);
    }
}
