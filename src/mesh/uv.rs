//! Per-loop UV storage.
//!
//! This module provides the [`UvLayer`] type: one UV coordinate and one UV
//! selection flag per half-edge. Several loops may share a vertex and still
//! carry different UVs, which is how seams show up in UV space.

use std::marker::PhantomData;

use nalgebra::Point2;

use crate::geometry::Bounds2;
use crate::mesh::{HalfEdgeId, MeshIndex};

/// UV coordinates and selection flags indexed by half-edge.
#[derive(Debug, Clone)]
pub struct UvLayer<I: MeshIndex = u32> {
    coords: Vec<Point2<f64>>,
    selected: Vec<bool>,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> Default for UvLayer<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> UvLayer<I> {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self {
            coords: Vec::new(),
            selected: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Grow the layer to `n` slots. New slots are zero and selected.
    pub(crate) fn resize(&mut self, n: usize) {
        self.coords.resize(n, Point2::origin());
        self.selected.resize(n, true);
    }

    /// Get the UV of a loop.
    #[inline]
    pub fn get(&self, he: HalfEdgeId<I>) -> Point2<f64> {
        self.coords[he.index()]
    }

    /// Set the UV of a loop.
    #[inline]
    pub fn set(&mut self, he: HalfEdgeId<I>, uv: Point2<f64>) {
        self.coords[he.index()] = uv;
    }

    /// Whether the UV of a loop is selected.
    #[inline]
    pub fn is_selected(&self, he: HalfEdgeId<I>) -> bool {
        self.selected[he.index()]
    }

    /// Select or deselect the UV of a loop.
    #[inline]
    pub fn set_selected(&mut self, he: HalfEdgeId<I>, selected: bool) {
        self.selected[he.index()] = selected;
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Bounding box of the UVs of the given loops.
    ///
    /// Returns `None` if `loops` is empty.
    pub fn bounds(&self, loops: &[HalfEdgeId<I>]) -> Option<Bounds2> {
        Bounds2::from_points(loops.iter().map(|&he| self.get(he)))
    }

    /// Centroid of the UVs of the given loops.
    ///
    /// Returns `None` if `loops` is empty.
    pub fn centroid(&self, loops: &[HalfEdgeId<I>]) -> Option<Point2<f64>> {
        crate::geometry::centroid(loops.iter().map(|&he| self.get(he)))
    }

    /// Apply `f` to the UV of every given loop.
    pub fn map<F>(&mut self, loops: &[HalfEdgeId<I>], mut f: F)
    where
        F: FnMut(Point2<f64>) -> Point2<f64>,
    {
        for &he in loops {
            let uv = &mut self.coords[he.index()];
            *uv = f(*uv);
        }
    }
}
