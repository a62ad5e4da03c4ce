//! Pixel-grid transforms over UV loop sets.
//!
//! Everything here works on an explicit list of loops. Partitioning into
//! islands happens one level up; these helpers treat whatever they are given
//! as a single region.
//!
//! A resolution `R` means the unit UV square is `R` pixels wide, so one pixel
//! is `1 / R` in UV units.

use nalgebra::{Point2, Vector2};

use crate::geometry::{anchored_scale, snap_to_grid, Bounds2};
use crate::mesh::{EditMesh, HalfEdgeId, MeshIndex};

/// Where a [`BoundsSnap`] rescale is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Centroid of the affected UVs. The anchor stays in place.
    Centroid,
    /// Minimum corner of the bounds, moved to the nearest pixel corner.
    PixelCorner,
}

/// Bounding-box rescale onto whole pixels.
///
/// Each axis of the region's bounds is resized to `round(size · R) / R` plus
/// `delta` pixels. An axis of zero size keeps scale 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsSnap {
    /// Pixels per UV unit.
    pub resolution: f64,
    /// Extra pixels added to the target size on each axis.
    pub delta: Vector2<f64>,
    /// Transform anchor.
    pub anchor: Anchor,
}

impl BoundsSnap {
    /// Snap bounds to whole pixels, anchored on a pixel corner.
    pub fn island(resolution: f64) -> Self {
        Self {
            resolution,
            delta: Vector2::zeros(),
            anchor: Anchor::PixelCorner,
        }
    }

    /// Resize by `(dx, dy)` pixels about the centroid.
    pub fn grow(resolution: f64, dx: f64, dy: f64) -> Self {
        Self {
            resolution,
            delta: Vector2::new(dx, dy),
            anchor: Anchor::Centroid,
        }
    }

    /// Per-axis scale that brings `bounds` to its target size.
    pub fn scale_for(&self, bounds: &Bounds2) -> Vector2<f64> {
        let size = bounds.size();
        let axis = |extent: f64, delta: f64| {
            if extent == 0.0 {
                return 1.0;
            }
            let target = snap_to_grid(extent, self.resolution) + delta / self.resolution;
            target / extent
        };
        Vector2::new(axis(size.x, self.delta.x), axis(size.y, self.delta.y))
    }

    /// Apply the rescale to `loops`.
    ///
    /// Returns the per-axis scale used, or `None` when `loops` is empty.
    pub fn apply<I: MeshIndex>(
        &self,
        mesh: &mut EditMesh<I>,
        loops: &[HalfEdgeId<I>],
    ) -> Option<Vector2<f64>> {
        let bounds = mesh.uv_layer().bounds(loops)?;
        let scale = self.scale_for(&bounds);

        let (anchor, target) = match self.anchor {
            Anchor::Centroid => {
                let c = mesh.uv_layer().centroid(loops)?;
                (c, c)
            }
            Anchor::PixelCorner => {
                let corner = Point2::new(
                    snap_to_grid(bounds.min.x, self.resolution),
                    snap_to_grid(bounds.min.y, self.resolution),
                );
                (bounds.min, corner)
            }
        };

        let transform = anchored_scale(&anchor, &scale, &target);
        mesh.uvs.map(loops, |uv| transform.transform_point(&uv));
        Some(scale)
    }
}

/// Translate every loop by `(dx, dy)` pixels.
pub fn move_loops<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    loops: &[HalfEdgeId<I>],
    resolution: f64,
    dx: f64,
    dy: f64,
) {
    let offset = Vector2::new(dx, dy) / resolution;
    mesh.uvs.map(loops, |uv| uv + offset);
}

/// Round every loop's UV to the nearest pixel corner.
pub fn snap_loops<I: MeshIndex>(mesh: &mut EditMesh<I>, loops: &[HalfEdgeId<I>], resolution: f64) {
    mesh.uvs.map(loops, |uv| {
        Point2::new(snap_to_grid(uv.x, resolution), snap_to_grid(uv.y, resolution))
    });
}
