//! Half-edge edit mesh.
//!
//! This module provides the half-edge representation of a polygon mesh as it
//! is seen by the UV operators: geometry and connectivity plus the edit state
//! a modelling host keeps next to it.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions.
//!   Both reference the same [`Edge`], which stores the seam flag.
//! - A half-edge with a face is that face's **loop** at its origin vertex and
//!   owns one UV coordinate and one UV selection flag in the [`UvLayer`].
//! - Faces are arbitrary polygons and store hidden and selected flags.
//!
//! # Boundary Handling
//!
//! Boundary half-edges have an invalid face ID. Their UV slot exists but is
//! never read or written by the operators.

use nalgebra::{Point2, Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::uv::UvLayer;
use crate::error::{Result, UvError};

/// A vertex in the edit mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Invalid on the boundary.
    pub face: FaceId<I>,

    /// The full edge shared with the twin.
    pub edge: EdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            edge: EdgeId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A full edge.
#[derive(Debug, Clone, Copy)]
pub struct Edge<I: MeshIndex = u32> {
    /// One of the two half-edges of this edge.
    pub halfedge: HalfEdgeId<I>,

    /// Whether the edge is marked as a UV seam.
    pub seam: bool,
}

/// A polygonal face.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// The half-edge of the face's first corner.
    pub halfedge: HalfEdgeId<I>,

    /// Hidden faces are never part of a working set.
    pub hidden: bool,

    /// Mesh (face) selection flag.
    pub selected: bool,
}

impl<I: MeshIndex> Face<I> {
    /// Create a visible, selected face starting at the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            hidden: false,
            selected: true,
        }
    }
}

/// A polygon mesh with seams, face flags and a per-loop UV layer.
#[derive(Debug, Clone)]
pub struct EditMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) edges: Vec<Edge<I>>,
    pub(crate) faces: Vec<Face<I>>,
    pub(crate) uvs: UvLayer<I>,
}

impl<I: MeshIndex> Default for EditMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> EditMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            uvs: UvLayer::new(),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges (loops and boundary half-edges).
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// The UV layer.
    #[inline]
    pub fn uv_layer(&self) -> &UvLayer<I> {
        &self.uvs
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Get the edge of a half-edge.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        self.halfedge(he).edge
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if an edge has fewer than two faces.
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        let he = self.edge(e).halfedge;
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.twin(he))
    }

    /// The face on the other side of a loop's edge, if any.
    #[inline]
    pub fn opposite_face(&self, he: HalfEdgeId<I>) -> Option<FaceId<I>> {
        let f = self.face_of(self.twin(he));
        f.is_valid().then_some(f)
    }

    /// Faces sharing an edge (0, 1 or 2).
    pub fn edge_faces(&self, e: EdgeId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        let he = self.edge(e).halfedge;
        [self.face_of(he), self.face_of(self.twin(he))]
            .into_iter()
            .filter(|f| f.is_valid())
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over the loops of a face, starting at its first corner.
    pub fn face_loops(&self, f: FaceId<I>) -> FaceLoopIter<'_, I> {
        FaceLoopIter::new(self, f)
    }

    /// Iterate over the vertices of a face.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_loops(f).map(|he| self.origin(he))
    }

    /// Number of corners of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> usize {
        self.face_loops(f).count()
    }

    /// Collect the loops of a set of faces, face by face.
    pub fn loops_of(&self, faces: &[FaceId<I>]) -> Vec<HalfEdgeId<I>> {
        faces.iter().flat_map(|&f| self.face_loops(f)).collect()
    }

    // ==================== Geometry ====================

    /// Length of the edge of a half-edge.
    pub fn edge_length(&self, he: HalfEdgeId<I>) -> f64 {
        (self.position(self.dest(he)) - self.position(self.origin(he))).norm()
    }

    /// Unit normal of a face (Newell's method). Zero for degenerate faces.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let mut n = Vector3::<f64>::zeros();
        for he in self.face_loops(f) {
            let a = self.position(self.origin(he));
            let b = self.position(self.dest(he));
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        let len = n.norm();
        if len > 1e-12 {
            n / len
        } else {
            Vector3::zeros()
        }
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    // ==================== Edit State ====================

    /// Whether a face is hidden.
    #[inline]
    pub fn is_hidden(&self, f: FaceId<I>) -> bool {
        self.face(f).hidden
    }

    /// Hide or reveal a face.
    #[inline]
    pub fn set_hidden(&mut self, f: FaceId<I>, hidden: bool) {
        self.faces[f.index()].hidden = hidden;
    }

    /// Whether a face is selected.
    #[inline]
    pub fn is_selected(&self, f: FaceId<I>) -> bool {
        self.face(f).selected
    }

    /// Select or deselect a face.
    #[inline]
    pub fn set_selected(&mut self, f: FaceId<I>, selected: bool) {
        self.faces[f.index()].selected = selected;
    }

    /// Whether an edge is a seam.
    #[inline]
    pub fn is_seam(&self, e: EdgeId<I>) -> bool {
        self.edge(e).seam
    }

    /// Mark or clear a seam.
    #[inline]
    pub fn set_seam(&mut self, e: EdgeId<I>, seam: bool) {
        self.edges[e.index()].seam = seam;
    }

    /// UV coordinate of a loop.
    #[inline]
    pub fn uv(&self, he: HalfEdgeId<I>) -> Point2<f64> {
        self.uvs.get(he)
    }

    /// Set the UV coordinate of a loop.
    #[inline]
    pub fn set_uv(&mut self, he: HalfEdgeId<I>, uv: Point2<f64>) {
        self.uvs.set(he, uv);
    }

    /// Whether a loop's UV is selected.
    #[inline]
    pub fn is_uv_selected(&self, he: HalfEdgeId<I>) -> bool {
        self.uvs.is_selected(he)
    }

    /// Select or deselect a loop's UV.
    #[inline]
    pub fn set_uv_selected(&mut self, he: HalfEdgeId<I>, selected: bool) {
        self.uvs.set_selected(he, selected);
    }

    /// UVs of a face's corners, in corner order.
    pub fn face_uvs(&self, f: FaceId<I>) -> Vec<Point2<f64>> {
        self.face_loops(f).map(|he| self.uv(he)).collect()
    }

    /// Assign the UVs of a face's corners, in corner order.
    pub fn set_face_uvs(&mut self, f: FaceId<I>, uvs: &[Point2<f64>]) -> Result<()> {
        let loops: Vec<HalfEdgeId<I>> = self.face_loops(f).collect();
        if loops.len() != uvs.len() {
            return Err(UvError::UvCountMismatch {
                face: f.index(),
                corners: loops.len(),
                uvs: uvs.len(),
            });
        }
        for (he, &uv) in loops.into_iter().zip(uvs) {
            self.set_uv(he, uv);
        }
        Ok(())
    }

    // ==================== Validation ====================

    /// Check if all connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() && self.halfedge(v.halfedge).origin.index() != i {
                return false;
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            if !he.twin.is_valid() || self.halfedge(he.twin).twin.index() != i {
                return false;
            }
            if self.halfedge(he.twin).edge != he.edge || !he.edge.is_valid() {
                return false;
            }
            if he.next.is_valid() && self.halfedge(he.next).prev.index() != i {
                return false;
            }
        }

        self.faces.iter().all(|f| f.halfedge.is_valid())
            && self.uvs.len() == self.halfedges.len()
    }
}

/// Iterator over the loops of a face.
pub struct FaceLoopIter<'a, I: MeshIndex = u32> {
    mesh: &'a EditMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceLoopIter<'a, I> {
    fn new(mesh: &'a EditMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceLoopIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;

    fn two_quads() -> EditMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]];
        build_from_polygons(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = EditMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_edge_faces() {
        let mesh = two_quads();
        let shared: Vec<_> = mesh
            .edge_ids()
            .filter(|&e| mesh.edge_faces(e).count() == 2)
            .collect();
        assert_eq!(shared.len(), 1);
        assert!(!mesh.is_boundary_edge(shared[0]));
        assert_eq!(mesh.edge_ids().filter(|&e| mesh.is_boundary_edge(e)).count(), 6);
    }

    #[test]
    fn test_face_normal_polygon() {
        let mesh = two_quads();
        let n = mesh.face_normal(FaceId::new(0));
        assert!((n.z - 1.0).abs() < 1e-10);
        assert!(n.x.abs() < 1e-10 && n.y.abs() < 1e-10);
    }

    #[test]
    fn test_face_loops_follow_corner_order() {
        let mesh = two_quads();
        let verts: Vec<usize> = mesh
            .face_vertices(FaceId::new(1))
            .map(|v| v.index())
            .collect();
        assert_eq!(verts, vec![1, 4, 5, 2]);
        assert_eq!(mesh.face_degree(FaceId::new(1)), 4);
    }

    #[test]
    fn test_opposite_face() {
        let mesh = two_quads();
        let f0 = FaceId::new(0);
        let across: Vec<_> = mesh
            .face_loops(f0)
            .filter_map(|he| mesh.opposite_face(he))
            .collect();
        assert_eq!(across, vec![FaceId::new(1)]);
    }

    #[test]
    fn test_set_face_uvs() {
        let mut mesh = two_quads();
        let f = FaceId::new(0);
        let uvs = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(0.5, 0.5),
            Point2::new(0.0, 0.5),
        ];
        mesh.set_face_uvs(f, &uvs).unwrap();
        assert_eq!(mesh.face_uvs(f), uvs);

        let err = mesh.set_face_uvs(f, &uvs[..3]).unwrap_err();
        assert!(matches!(err, UvError::UvCountMismatch { corners: 4, uvs: 3, .. }));
    }

    #[test]
    fn test_flags() {
        let mut mesh = two_quads();
        let f = FaceId::new(1);
        assert!(mesh.is_selected(f));
        assert!(!mesh.is_hidden(f));
        mesh.set_hidden(f, true);
        mesh.set_selected(f, false);
        assert!(mesh.is_hidden(f));
        assert!(!mesh.is_selected(f));

        let e = EdgeId::new(0);
        mesh.set_seam(e, true);
        assert!(mesh.is_seam(e));
    }
}
