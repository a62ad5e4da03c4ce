//! Edit-mesh data structures.
//!
//! This module provides the half-edge polygon mesh the UV operators read and
//! mutate, together with its UV layer and edit flags.
//!
//! # Overview
//!
//! [`EditMesh`] stores polygons of any degree. Each face corner is a **loop**
//! (an interior half-edge) carrying a UV coordinate and a UV selection flag.
//! Edges carry seam flags, faces carry hidden and selected flags.
//!
//! # Index Types
//!
//! - [`VertexId`], [`HalfEdgeId`], [`EdgeId`], [`FaceId`]
//!
//! All are generic over the backing integer ([`MeshIndex`]), `u32` by default.
//!
//! # Construction
//!
//! ```
//! use pixel_uv::mesh::{build_from_quads, EditMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: EditMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//! assert_eq!(mesh.num_edges(), 4);
//! ```

mod builder;
mod halfedge;
mod index;
mod uv;

pub use builder::{
    build_from_polygons, build_from_quads, build_from_triangles, build_with_uvs, to_face_vertex,
};
pub use halfedge::{Edge, EditMesh, Face, FaceLoopIter, HalfEdge, Vertex};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use uv::UvLayer;
