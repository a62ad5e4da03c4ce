//! Island packing hand-off.
//!
//! Packing is delegated to an [`IslandPacker`]. The pixel-margin operator
//! only converts its margin from pixels into a fraction of the UV square and
//! forwards the remaining settings untouched. [`ShelfPacker`] is the
//! in-crate packer: it lines the UV islands up along U and honours only the
//! margin.

use log::debug;
use nalgebra::Vector2;

use super::islands::{partition, Delimit};
use super::layout::ShelfLayout;
use crate::error::Result;
use crate::mesh::{EditMesh, FaceId, MeshIndex};

/// Which UDIM tile islands are packed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UdimSource {
    /// The tile closest to each island.
    #[default]
    ClosestUdim,
    /// The active tile.
    ActiveUdim,
    /// The bounding box the islands started in.
    OriginalAabb,
}

/// Which rotations a packer may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotateMethod {
    /// Minimal rectangle, horizontal or vertical.
    AxisAligned,
    /// Quarter turns only.
    #[default]
    Cardinal,
    /// Any angle.
    Any,
}

/// How pinned islands are constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinMethod {
    /// Pinned islands keep their scale.
    Scale,
    /// Pinned islands keep their rotation.
    Rotation,
    /// Pinned islands only translate.
    RotationScale,
    /// Pinned islands do not move.
    #[default]
    Locked,
}

/// Island shape approximation used while packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeMethod {
    /// Exact geometry.
    Concave,
    /// Convex hull.
    Convex,
    /// Bounding boxes.
    #[default]
    Aabb,
}

/// Settings handed to an [`IslandPacker`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackRequest {
    /// Gap around each island as a fraction of the UV square.
    pub margin: f64,
    /// Target tile.
    pub udim_source: UdimSource,
    /// Whether islands may rotate.
    pub rotate: bool,
    /// Allowed rotations.
    pub rotate_method: RotateMethod,
    /// Whether islands may scale to fill the square.
    pub scale: bool,
    /// Whether overlapping islands stick together.
    pub merge_overlap: bool,
    /// Whether pinned islands are constrained.
    pub pin: bool,
    /// Constraint applied to pinned islands.
    pub pin_method: PinMethod,
    /// Shape approximation.
    pub shape_method: ShapeMethod,
}

impl Default for PackRequest {
    fn default() -> Self {
        Self {
            margin: 0.0,
            udim_source: UdimSource::default(),
            rotate: true,
            rotate_method: RotateMethod::default(),
            scale: true,
            merge_overlap: false,
            pin: false,
            pin_method: PinMethod::default(),
            shape_method: ShapeMethod::default(),
        }
    }
}

/// Packs the UV islands of a face set.
pub trait IslandPacker {
    /// Pack the UV islands formed by `faces`.
    fn pack<I: MeshIndex>(
        &mut self,
        mesh: &mut EditMesh<I>,
        faces: &[FaceId<I>],
        request: &PackRequest,
    ) -> Result<()>;
}

/// Places each UV island on a single row along U, bottoms on V = 0.
///
/// Rotation, scaling, pinning and UDIM settings are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfPacker;

impl IslandPacker for ShelfPacker {
    fn pack<I: MeshIndex>(
        &mut self,
        mesh: &mut EditMesh<I>,
        faces: &[FaceId<I>],
        request: &PackRequest,
    ) -> Result<()> {
        let islands = partition(mesh, faces, Delimit::Uv);
        let mut layout = ShelfLayout::new(request.margin);

        for i in 0..islands.len() {
            let loops = islands.loops(mesh, i);
            let Some(bounds) = mesh.uv_layer().bounds(&loops) else {
                continue;
            };
            let to_origin: Vector2<f64> = -bounds.min.coords;
            mesh.uvs.map(&loops, |uv| uv + to_origin);
            layout.place(mesh, &loops);
        }

        debug!(
            "shelf packed {} islands, row width {:.4}",
            islands.len(),
            layout.offset()
        );
        Ok(())
    }
}
