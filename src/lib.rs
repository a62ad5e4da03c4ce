//! # pixel-uv
//!
//! Pixel-oriented UV editing for low-resolution textures.
//!
//! pixel-uv works on an explicit polygon edit mesh, [`EditMesh`], that carries
//! the state a modelling tool keeps while editing: face selection and hiding,
//! edge seams, and a UV layer with per-loop UV selection. On top of it sit
//! a handful of operators that keep UVs on a pixel grid.
//!
//! ## Features
//!
//! - **Pixel transforms**: move, resize and snap UVs in whole pixels
//! - **Island snapping**: snap each UV island's bounds to the pixel grid
//! - **Regular polygon projection**: project faces over the sides and caps of
//!   an `n`-sided cylinder, one island per side
//! - **Smart follow quads**: straighten each island around its most
//!   rectangular quad
//! - **Pixel-margin packing** through a pluggable packer
//! - **OBJ I/O** with per-corner UVs
//!
//! [`EditMesh`]: mesh::EditMesh
//!
//! ## Quick Start
//!
//! ```no_run
//! use pixel_uv::prelude::*;
//!
//! let mut mesh: EditMesh = pixel_uv::io::load("model.obj").unwrap();
//! let ctx = EditContext::viewport();
//!
//! regular_polygon_project(&mut mesh, &ctx, &ProjectOptions::default().with_vertices(8)).unwrap();
//! snap_uv_island_bounds_to_pixels(&mut mesh, &ctx, &SnapOptions::default()).unwrap();
//!
//! pixel_uv::io::save(&mesh, "output.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use pixel_uv::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: EditMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//!
//! regular_polygon_project(&mut mesh, &EditContext::viewport(), &ProjectOptions::default()).unwrap();
//! let uv = mesh.face_uvs(FaceId::new(0))[2];
//! assert!((uv - nalgebra::Point2::new(1.0, 1.0)).norm() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod ops;

pub use error::{Result, UvError};

/// Prelude module for convenient imports.
///
/// This module re-exports the mesh types and every operator with its options:
///
/// ```
/// use pixel_uv::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, UvError};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, build_with_uvs,
        to_face_vertex, EdgeId, EditMesh, FaceId, HalfEdgeId, MeshIndex, VertexId,
    };
    pub use crate::ops::{
        move_uvs_by_pixels, pack_islands_pixel_margin, pack_islands_pixel_margin_with,
        regular_polygon_project, scale_uvs_by_pixels, smart_follow_quads,
        smart_follow_quads_with, snap_uv_island_bounds_to_pixels, snap_uvs_to_pixels,
        EditContext, EditMode, FollowQuadsOptions, MoveOptions, PackOptions, ProjectOptions,
        ScaleOptions, SnapOptions, Surface,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
