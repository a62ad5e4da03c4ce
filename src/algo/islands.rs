//! Island partitioning.
//!
//! An island is a maximal set of working faces connected across edges that a
//! delimiter lets through. Partitioning is a flood fill over face adjacency:
//! seeds are taken in working-set order and every working face ends up in
//! exactly one island. Faces are marked by island index rather than by any
//! mesh flag, so the mesh's hidden and selected state is never touched.
//!
//! # Example
//!
//! ```
//! use pixel_uv::prelude::*;
//! use pixel_uv::algo::islands::{partition, Delimit};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(2.0, 1.0, 0.0),
//! ];
//! let mut mesh: EditMesh = build_from_quads(&vertices, &[[0, 1, 2, 3], [1, 4, 5, 2]]).unwrap();
//! let faces: Vec<FaceId> = mesh.face_ids().collect();
//!
//! assert_eq!(partition(&mesh, &faces, Delimit::Seam).len(), 1);
//!
//! // Cut the shared edge
//! let shared = mesh.edge_ids().find(|&e| !mesh.is_boundary_edge(e)).unwrap();
//! mesh.set_seam(shared, true);
//! assert_eq!(partition(&mesh, &faces, Delimit::Seam).len(), 2);
//! ```

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use log::debug;

use super::orientation::{select_best_frame, OrientationFrame};
use crate::mesh::{EditMesh, FaceId, HalfEdgeId, MeshIndex};

/// UVs closer than this on both axes count as shared.
pub const UV_CONNECT_EPSILON: f64 = 1e-6;

/// What separates two islands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimit {
    /// Faces are linked unless the shared edge is a seam.
    Seam,
    /// Faces are linked when they share UVs along the shared edge.
    Uv,
}

/// A strict partition of a working face set.
#[derive(Debug, Clone)]
pub struct Islands<I: MeshIndex = u32> {
    islands: Vec<Vec<FaceId<I>>>,
    assignment: Vec<Option<usize>>,
}

impl<I: MeshIndex> Islands<I> {
    /// Number of islands.
    #[inline]
    pub fn len(&self) -> usize {
        self.islands.len()
    }

    /// True when the working set was empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    /// Faces of island `i`, seed face first.
    #[inline]
    pub fn faces(&self, i: usize) -> &[FaceId<I>] {
        &self.islands[i]
    }

    /// Iterate over islands in seed order.
    pub fn iter(&self) -> impl Iterator<Item = &[FaceId<I>]> + '_ {
        self.islands.iter().map(Vec::as_slice)
    }

    /// Island index of a face, `None` outside the working set.
    #[inline]
    pub fn island_of(&self, f: FaceId<I>) -> Option<usize> {
        self.assignment.get(f.index()).copied().flatten()
    }

    /// All loops of island `i`.
    pub fn loops(&self, mesh: &EditMesh<I>, i: usize) -> Vec<HalfEdgeId<I>> {
        mesh.loops_of(&self.islands[i])
    }
}

/// Partition `working` into islands separated by `delimit`.
pub fn partition<I: MeshIndex>(
    mesh: &EditMesh<I>,
    working: &[FaceId<I>],
    delimit: Delimit,
) -> Islands<I> {
    match delimit {
        Delimit::Seam => partition_by(mesh, working, seam_linked),
        Delimit::Uv => partition_by(mesh, working, uv_linked),
    }
}

/// Partition `working` with a custom predicate.
///
/// `linked(mesh, he)` decides whether the face of loop `he` and the face on
/// the other side of its edge belong together. It is only called for edges
/// with a working face on both sides.
pub fn partition_by<I, F>(mesh: &EditMesh<I>, working: &[FaceId<I>], linked: F) -> Islands<I>
where
    I: MeshIndex,
    F: Fn(&EditMesh<I>, HalfEdgeId<I>) -> bool,
{
    let mut in_working = vec![false; mesh.num_faces()];
    for &f in working {
        in_working[f.index()] = true;
    }

    let mut assignment: Vec<Option<usize>> = vec![None; mesh.num_faces()];
    let mut islands: Vec<Vec<FaceId<I>>> = Vec::new();
    let mut queue = VecDeque::new();

    for &seed in working {
        if assignment[seed.index()].is_some() {
            continue;
        }

        let id = islands.len();
        let mut faces = vec![seed];
        assignment[seed.index()] = Some(id);
        queue.push_back(seed);

        while let Some(f) = queue.pop_front() {
            for he in mesh.face_loops(f) {
                let Some(g) = mesh.opposite_face(he) else {
                    continue;
                };
                if !in_working[g.index()] || assignment[g.index()].is_some() {
                    continue;
                }
                if linked(mesh, he) {
                    assignment[g.index()] = Some(id);
                    faces.push(g);
                    queue.push_back(g);
                }
            }
        }

        islands.push(faces);
    }

    debug!(
        "partitioned {} faces into {} islands",
        working.len(),
        islands.len()
    );

    Islands {
        islands,
        assignment,
    }
}

/// Linked unless the edge is a seam.
pub fn seam_linked<I: MeshIndex>(mesh: &EditMesh<I>, he: HalfEdgeId<I>) -> bool {
    !mesh.is_seam(mesh.edge_of(he))
}

/// Linked when both endpoints of the edge carry the same UV on both sides.
pub fn uv_linked<I: MeshIndex>(mesh: &EditMesh<I>, he: HalfEdgeId<I>) -> bool {
    // he runs a -> b in its face, the twin b -> a in the other one
    let twin = mesh.twin(he);
    let a_here = mesh.uv(he);
    let b_here = mesh.uv(mesh.next(he));
    let b_there = mesh.uv(twin);
    let a_there = mesh.uv(mesh.next(twin));

    let close = |p: nalgebra::Point2<f64>, q: nalgebra::Point2<f64>| {
        (p.x - q.x).abs() <= UV_CONNECT_EPSILON && (p.y - q.y).abs() <= UV_CONNECT_EPSILON
    };
    close(a_here, a_there) && close(b_here, b_there)
}

/// Scoped access to a mesh whose seam flags are restored on drop.
///
/// The guard caches every seam flag when created. Whatever happens while it
/// is alive (early returns, errors, panics) the cached flags are written back
/// when it goes out of scope.
pub struct SeamGuard<'a, I: MeshIndex = u32> {
    mesh: &'a mut EditMesh<I>,
    saved: Vec<bool>,
}

impl<'a, I: MeshIndex> SeamGuard<'a, I> {
    /// Cache the seam flags of `mesh`.
    pub fn new(mesh: &'a mut EditMesh<I>) -> Self {
        let saved = mesh.edge_ids().map(|e| mesh.is_seam(e)).collect();
        Self { mesh, saved }
    }

    /// Mark every two-face edge as a seam iff its faces pick different frames.
    ///
    /// Returns the number of seams marked.
    pub fn synthesize(&mut self, frames: &[OrientationFrame], cap_penalty_degrees: f64) -> usize {
        let mesh = &mut *self.mesh;
        let best: Vec<usize> = mesh
            .face_ids()
            .map(|f| select_best_frame(&mesh.face_normal(f), frames, cap_penalty_degrees).index())
            .collect();

        let edges: Vec<_> = mesh.edge_ids().collect();
        let mut marked = 0;
        for e in edges {
            let faces: Vec<FaceId<I>> = mesh.edge_faces(e).collect();
            if let [f0, f1] = faces[..] {
                let seam = best[f0.index()] != best[f1.index()];
                mesh.set_seam(e, seam);
                marked += seam as usize;
            }
        }

        debug!("synthesized {} seams from {} frames", marked, frames.len());
        marked
    }
}

impl<I: MeshIndex> Deref for SeamGuard<'_, I> {
    type Target = EditMesh<I>;

    fn deref(&self) -> &Self::Target {
        self.mesh
    }
}

impl<I: MeshIndex> DerefMut for SeamGuard<'_, I> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.mesh
    }
}

impl<I: MeshIndex> Drop for SeamGuard<'_, I> {
    fn drop(&mut self) {
        let edges: Vec<_> = self.mesh.edge_ids().collect();
        for (e, &seam) in edges.into_iter().zip(&self.saved) {
            self.mesh.set_seam(e, seam);
        }
        debug!("restored {} seam flags", self.saved.len());
    }
}
