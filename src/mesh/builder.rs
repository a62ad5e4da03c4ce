//! Mesh construction utilities.
//!
//! This module builds [`EditMesh`] values from face-vertex lists as found in
//! mesh file formats, optionally with one UV per face corner.

use std::collections::HashMap;

use nalgebra::{Point2, Point3};

use super::halfedge::{Edge, EditMesh, Face, HalfEdge};
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{Result, UvError};

/// Build an edit mesh from vertices and polygon faces.
///
/// Every face is visible and selected, every loop is UV-selected and all UVs
/// start at the origin.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of polygons, each a counter-clockwise list of vertex indices
///
/// # Example
/// ```
/// use pixel_uv::mesh::{build_from_polygons, EditMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.5, 2.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
///
/// let mesh: EditMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<EditMesh<I>> {
    if faces.is_empty() {
        return Err(UvError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(UvError::DegenerateFace { face: fi });
        }
        for (k, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(UvError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[k + 1..].contains(&vi) {
                return Err(UvError::DegenerateFace { face: fi });
            }
        }
    }

    let mut mesh = EditMesh::new();
    mesh.vertices = vertices.iter().map(|&p| super::halfedge::Vertex::new(p)).collect();

    // Directed edge (v0, v1) -> half-edge
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::new();

    // First pass: face loops
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        let n = face.len();
        let base = mesh.halfedges.len();
        let face_id = FaceId::<I>::new(fi);

        mesh.faces.push(Face::new(HalfEdgeId::new(base)));

        for k in 0..n {
            let he_id = HalfEdgeId::<I>::new(base + k);
            let (v0, v1) = (face[k], face[(k + 1) % n]);
            if edge_map.insert((v0, v1), he_id).is_some() {
                return Err(UvError::NonManifoldEdge { v0, v1 });
            }

            let mut he = HalfEdge::new();
            he.origin = VertexId::new(v0);
            he.next = HalfEdgeId::new(base + (k + 1) % n);
            he.prev = HalfEdgeId::new(base + (k + n - 1) % n);
            he.face = face_id;
            mesh.halfedges.push(he);

            mesh.vertices[v0].halfedge = he_id;
        }
    }

    // Second pass: twins and edges, in face order so edge ids are stable
    let interior = mesh.halfedges.len();
    for i in 0..interior {
        let he = HalfEdgeId::<I>::new(i);
        if mesh.halfedge(he).twin.is_valid() {
            continue;
        }
        let v0 = mesh.origin(he).index();
        let v1 = mesh.origin(mesh.next(he)).index();

        let twin = match edge_map.get(&(v1, v0)) {
            Some(&twin) => twin,
            None => {
                let boundary = HalfEdgeId::<I>::new(mesh.halfedges.len());
                let mut bhe = HalfEdge::new();
                bhe.origin = VertexId::new(v1);
                mesh.halfedges.push(bhe);
                boundary
            }
        };

        let edge_id = EdgeId::<I>::new(mesh.edges.len());
        mesh.edges.push(Edge {
            halfedge: he,
            seam: false,
        });

        for (a, b) in [(he, twin), (twin, he)] {
            let h = mesh.halfedge_mut(a);
            h.twin = b;
            h.edge = edge_id;
        }
    }

    link_boundary_loops(&mut mesh);

    let n = mesh.halfedges.len();
    mesh.uvs.resize(n);

    Ok(mesh)
}

/// Build an edit mesh with one UV per face corner.
///
/// `uvs[f]` lists the UVs of face `f` in the same order as `faces[f]`.
pub fn build_with_uvs<I: MeshIndex, F: AsRef<[usize]>, U: AsRef<[Point2<f64>]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
    uvs: &[U],
) -> Result<EditMesh<I>> {
    let mut mesh = build_from_polygons(vertices, faces)?;
    for (fi, face_uvs) in uvs.iter().enumerate() {
        if fi >= mesh.num_faces() {
            break;
        }
        mesh.set_face_uvs(FaceId::new(fi), face_uvs.as_ref())?;
    }
    Ok(mesh)
}

/// Build an edit mesh from triangles.
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<EditMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build an edit mesh from quads.
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<EditMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Link boundary half-edges into loops.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut EditMesh<I>) {
    let boundary: Vec<HalfEdgeId<I>> = (0..mesh.halfedges.len())
        .map(HalfEdgeId::new)
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::new();
    for &he in &boundary {
        outgoing.insert(mesh.origin(he).index(), he);
    }

    for &he in &boundary {
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }
}

/// Convert an edit mesh back to positions, polygons and per-corner UVs.
pub fn to_face_vertex<I: MeshIndex>(
    mesh: &EditMesh<I>,
) -> (Vec<Point3<f64>>, Vec<Vec<usize>>, Vec<Vec<Point2<f64>>>) {
    let vertices = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();
    let uvs = mesh.face_ids().map(|f| mesh.face_uvs(f)).collect();
    (vertices, faces, uvs)
}
