//! Sequential shelf layout.
//!
//! Islands are placed left to right along U, each one shifted by the running
//! offset and followed by a fixed margin. There is no vertical placement and
//! no attempt at packing: island `i` starts at `Σ_{j<i} (w_j + margin)`, so
//! islands never overlap along U. V coordinates are left alone.

use nalgebra::Vector2;

use crate::mesh::{EditMesh, HalfEdgeId, MeshIndex};

/// Default gap between islands, in UV units.
pub const DEFAULT_MARGIN: f64 = 1.0 / 64.0;

/// Running state of a left-to-right island layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShelfLayout {
    offset: f64,
    margin: f64,
}

impl Default for ShelfLayout {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl ShelfLayout {
    /// Start a layout at U = 0 with the given margin.
    pub fn new(margin: f64) -> Self {
        Self {
            offset: 0.0,
            margin,
        }
    }

    /// Where the next island will be shifted to.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Gap between islands.
    #[inline]
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Move `loops` along U so they start at the current offset, then
    /// advance past them.
    ///
    /// Returns the width of the placed island. An empty loop set does not
    /// move the offset.
    pub fn place<I: MeshIndex>(&mut self, mesh: &mut EditMesh<I>, loops: &[HalfEdgeId<I>]) -> f64 {
        let Some(bounds) = mesh.uv_layer().bounds(loops) else {
            return 0.0;
        };

        let shift = Vector2::new(self.offset - bounds.min.x, 0.0);
        mesh.uvs.map(loops, |uv| uv + shift);

        let width = bounds.width();
        self.offset += width + self.margin;
        width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_with_uvs, FaceId};
    use nalgebra::{Point2, Point3};

    /// Disconnected unit squares in 3D, each with UVs `[0, w] x [0, 1]`.
    fn squares(widths: &[f64]) -> EditMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        let mut uvs = Vec::new();
        for (i, &w) in widths.iter().enumerate() {
            let x = 2.0 * i as f64;
            let base = vertices.len();
            vertices.extend([
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x + 1.0, 1.0, 0.0),
                Point3::new(x, 1.0, 0.0),
            ]);
            faces.push([base, base + 1, base + 2, base + 3]);
            uvs.push(vec![
                Point2::new(0.0, 0.0),
                Point2::new(w, 0.0),
                Point2::new(w, 1.0),
                Point2::new(0.0, 1.0),
            ]);
        }
        build_with_uvs(&vertices, &faces, &uvs).unwrap()
    }

    #[test]
    fn test_islands_start_at_cumulative_offsets() {
        let widths = [0.25, 0.5, 0.125, 0.3];
        let margin = 1.0 / 64.0;
        let mut mesh = squares(&widths);
        let mut layout = ShelfLayout::new(margin);

        for i in 0..widths.len() {
            let loops = mesh.loops_of(&[FaceId::new(i)]);
            let width = layout.place(&mut mesh, &loops);
            assert!((width - widths[i]).abs() < 1e-12);
        }

        let mut expected = 0.0;
        for (i, &w) in widths.iter().enumerate() {
            let loops = mesh.loops_of(&[FaceId::new(i)]);
            let bounds = mesh.uv_layer().bounds(&loops).unwrap();
            assert!((bounds.min.x - expected).abs() < 1e-12, "island {} starts at {}", i, bounds.min.x);
            assert!((bounds.min.y - 0.0).abs() < 1e-12);
            expected += w + margin;
        }
        assert!((layout.offset() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_islands_do_not_overlap() {
        let mut mesh = squares(&[0.4, 0.4, 0.4]);
        let mut layout = ShelfLayout::default();
        let mut previous_max: Option<f64> = None;

        for i in 0..3 {
            let loops = mesh.loops_of(&[FaceId::new(i)]);
            layout.place(&mut mesh, &loops);
            let bounds = mesh.uv_layer().bounds(&loops).unwrap();
            if let Some(max) = previous_max {
                assert!(bounds.min.x >= max + DEFAULT_MARGIN - 1e-12);
            }
            previous_max = Some(bounds.max.x);
        }
    }

    #[test]
    fn test_island_start_is_aligned_to_offset() {
        let mut mesh = squares(&[0.5, 0.5]);
        let first = mesh.loops_of(&[FaceId::new(0)]);
        let second = mesh.loops_of(&[FaceId::new(1)]);
        // Second island starts left of the first one
        mesh.uvs.map(&first, |uv| uv + Vector2::new(0.7, 0.2));
        mesh.uvs.map(&second, |uv| uv + Vector2::new(-0.4, 0.3));

        let mut layout = ShelfLayout::new(0.25);
        layout.place(&mut mesh, &first);
        layout.place(&mut mesh, &second);

        let a = mesh.uv_layer().bounds(&first).unwrap();
        let b = mesh.uv_layer().bounds(&second).unwrap();
        assert!(a.min.x.abs() < 1e-12);
        assert!((b.min.x - 0.75).abs() < 1e-12);
        // V is untouched
        assert!((a.min.y - 0.2).abs() < 1e-12);
        assert!((b.min.y - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_empty_island_keeps_offset() {
        let mut mesh = squares(&[0.5]);
        let mut layout = ShelfLayout::new(0.1);
        assert_eq!(layout.place(&mut mesh, &[]), 0.0);
        assert_eq!(layout.offset(), 0.0);
        assert_eq!(layout.margin(), 0.1);
        assert_eq!(ShelfLayout::default().margin(), DEFAULT_MARGIN);
    }
}
