//! Ideal-quad normalization and quad-grid relaxation.
//!
//! For every UV island the most rectangular quad (in 3D) is picked, its UVs
//! are rewritten into an axis-aligned rectangle, and the rest of the island
//! is re-laid from that seed by a [`QuadFollower`]. The island is then moved
//! back so its UV centroid is where it started.
//!
//! # Example
//!
//! ```
//! use pixel_uv::prelude::*;
//! use pixel_uv::algo::follow_quads::{follow_island, EdgeLengthMode, FollowActiveQuads};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: EditMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//! let faces: Vec<FaceId> = mesh.face_ids().collect();
//!
//! let followed = follow_island(&mut mesh, &faces, EdgeLengthMode::Even, &mut FollowActiveQuads).unwrap();
//! assert!(followed);
//! ```

use std::collections::VecDeque;

use log::{debug, warn};
use nalgebra::{Point2, Vector2};

use super::islands::{partition, Delimit};
use crate::error::{Result, UvError};
use crate::geometry::EPSILON;
use crate::mesh::{EdgeId, EditMesh, FaceId, HalfEdgeId, MeshIndex};

/// How far each newly laid quad reaches along the walk direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeLengthMode {
    /// Every quad gets the same depth as the one it was reached from.
    #[default]
    Even,
    /// Depth proportional to the 3D rail lengths of each quad.
    Length,
    /// Depth proportional to the average length of each edge ring.
    LengthAverage,
}

/// Grid relaxation seeded from one quad of an island.
pub trait QuadFollower {
    /// Re-lay the UVs of `island` starting from the already rectangular
    /// `seed` quad.
    fn follow<I: MeshIndex>(
        &mut self,
        mesh: &mut EditMesh<I>,
        island: &[FaceId<I>],
        seed: FaceId<I>,
        mode: EdgeLengthMode,
    ) -> Result<()>;
}

/// Rectangularity of a quad from its 3D side lengths.
///
/// Opposite sides of equal length score their full length, mismatched ones
/// are penalised by the difference. Non-quads score negative infinity.
pub fn quad_score<I: MeshIndex>(mesh: &EditMesh<I>, f: FaceId<I>) -> f64 {
    let sides: Vec<f64> = mesh.face_loops(f).map(|he| mesh.edge_length(he)).collect();
    if sides.len() != 4 {
        return f64::NEG_INFINITY;
    }
    let pair = |a: f64, b: f64| a.max(b) - (a - b).abs();
    pair(sides[0], sides[2]) + pair(sides[1], sides[3])
}

/// The highest scoring quad of `faces`, first one on ties.
pub fn best_quad<I: MeshIndex>(mesh: &EditMesh<I>, faces: &[FaceId<I>]) -> Option<FaceId<I>> {
    let mut best = None;
    let mut hiscore = f64::NEG_INFINITY;
    for &f in faces {
        let score = quad_score(mesh, f);
        if score > hiscore {
            hiscore = score;
            best = Some(f);
        }
    }
    best
}

/// Rewrite the UVs of quad `f` into an axis-aligned rectangle.
///
/// Side lengths are the averages of the opposite UV sides. Corner 0 lands on
/// the old UV of corner 3 and the rectangle extends towards +U and +V.
///
/// # Errors
///
/// Returns [`UvError::Relaxation`] if `f` is not a quad.
pub fn make_ideal_quad<I: MeshIndex>(mesh: &mut EditMesh<I>, f: FaceId<I>) -> Result<()> {
    let loops: Vec<HalfEdgeId<I>> = mesh.face_loops(f).collect();
    let [l0, l1, l2, l3] = loops[..] else {
        return Err(UvError::Relaxation(format!(
            "face {} has {} corners, expected 4",
            f.index(),
            loops.len()
        )));
    };

    let uv_side = |a: HalfEdgeId<I>, b: HalfEdgeId<I>| (mesh.uv(b) - mesh.uv(a)).norm();
    let u = [uv_side(l0, l1), uv_side(l1, l2), uv_side(l2, l3), uv_side(l3, l0)];
    let side_a = Vector2::new((u[0] + u[2]) * 0.5, 0.0);
    let side_b = Vector2::new(0.0, (u[1] + u[3]) * 0.5);

    let anchor = mesh.uv(l3);
    mesh.set_uv(l0, anchor);
    mesh.set_uv(l1, anchor + side_a);
    mesh.set_uv(l2, anchor + side_a + side_b);
    mesh.set_uv(l3, anchor + side_b);
    Ok(())
}

/// Straighten one island around its best quad.
///
/// Returns `Ok(false)` when the island has no quad and was left alone. On
/// error the island's UVs are restored to what they were on entry.
pub fn follow_island<I, F>(
    mesh: &mut EditMesh<I>,
    faces: &[FaceId<I>],
    mode: EdgeLengthMode,
    follower: &mut F,
) -> Result<bool>
where
    I: MeshIndex,
    F: QuadFollower,
{
    let Some(seed) = best_quad(mesh, faces) else {
        return Ok(false);
    };

    let loops = mesh.loops_of(faces);
    let Some(before) = mesh.uv_layer().centroid(&loops) else {
        return Ok(false);
    };

    let saved: Vec<_> = loops.iter().map(|&he| mesh.uv(he)).collect();
    let straightened =
        make_ideal_quad(mesh, seed).and_then(|()| follower.follow(mesh, faces, seed, mode));
    if let Err(e) = straightened {
        for (&he, &uv) in loops.iter().zip(&saved) {
            mesh.set_uv(he, uv);
        }
        return Err(e);
    }

    if let Some(after) = mesh.uv_layer().centroid(&loops) {
        let shift = before - after;
        mesh.uvs.map(&loops, |uv| uv + shift);
    }
    Ok(true)
}

/// Straighten every UV island of `working`.
///
/// A failing island does not stop the others. Returns the number of islands
/// that were followed, or the first failure once every island has been
/// visited.
pub fn follow_islands<I, F>(
    mesh: &mut EditMesh<I>,
    working: &[FaceId<I>],
    mode: EdgeLengthMode,
    follower: &mut F,
) -> Result<usize>
where
    I: MeshIndex,
    F: QuadFollower,
{
    let islands = partition(mesh, working, Delimit::Uv);
    let mut followed = 0;
    let mut first_error = None;

    for (i, faces) in islands.iter().enumerate() {
        match follow_island(mesh, faces, mode, follower) {
            Ok(true) => {
                debug!("island {}: followed {} faces ({:?})", i, faces.len(), mode);
                followed += 1;
            }
            Ok(false) => warn!("island {}: no quads, skipped", i),
            Err(e) => {
                warn!("island {}: {}", i, e);
                first_error.get_or_insert(UvError::island(i, e));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(followed),
    }
}

/// Breadth-first quad walk extrapolating UVs across shared edges.
///
/// Each quad reached from an already laid quad keeps the UVs of the shared
/// edge and pushes its far edge out along the neighbour's rails. Faces that
/// are not quads are left untouched and do not propagate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowActiveQuads;

impl QuadFollower for FollowActiveQuads {
    fn follow<I: MeshIndex>(
        &mut self,
        mesh: &mut EditMesh<I>,
        island: &[FaceId<I>],
        seed: FaceId<I>,
        mode: EdgeLengthMode,
    ) -> Result<()> {
        if mesh.face_degree(seed) != 4 {
            return Err(UvError::Relaxation(format!(
                "seed face {} is not a quad",
                seed.index()
            )));
        }

        let mut in_island = vec![false; mesh.num_faces()];
        for &f in island {
            in_island[f.index()] = true;
        }
        if !in_island[seed.index()] {
            return Err(UvError::Relaxation(format!(
                "seed face {} is not part of the island",
                seed.index()
            )));
        }

        let rings = match mode {
            EdgeLengthMode::LengthAverage => Some(EdgeRings::build(mesh, island)),
            _ => None,
        };

        let mut done = vec![false; mesh.num_faces()];
        done[seed.index()] = true;
        let mut queue = VecDeque::from([seed]);

        while let Some(q) = queue.pop_front() {
            let loops: Vec<HalfEdgeId<I>> = mesh.face_loops(q).collect();
            for h in loops {
                let Some(g) = mesh.opposite_face(h) else {
                    continue;
                };
                if !in_island[g.index()] || done[g.index()] || mesh.face_degree(g) != 4 {
                    continue;
                }

                let fac = match &rings {
                    Some(rings) => rings.depth_ratio(mesh, h),
                    None => depth_ratio(mesh, h, mode),
                };
                extend_across(mesh, h, fac);

                done[g.index()] = true;
                queue.push_back(g);
            }
        }

        Ok(())
    }
}

/// Lay the quad across `h` from the quad of `h`.
///
/// `h` runs a → b in its quad (corners a, b, p, r). The twin quad has corners
/// b, a, x, y and receives `x = a + (a − r) · fac`, `y = b + (b − p) · fac`.
fn extend_across<I: MeshIndex>(mesh: &mut EditMesh<I>, h: HalfEdgeId<I>, fac: f64) {
    let uv_a = mesh.uv(h);
    let uv_b = mesh.uv(mesh.next(h));
    let uv_p = mesh.uv(mesh.next(mesh.next(h)));
    let uv_r = mesh.uv(mesh.prev(h));

    let t = mesh.twin(h);
    let at_a = mesh.next(t);
    let at_x = mesh.next(at_a);
    let at_y = mesh.prev(t);

    let x: Point2<f64> = uv_a + (uv_a - uv_r) * fac;
    let y: Point2<f64> = uv_b + (uv_b - uv_p) * fac;

    mesh.set_uv(t, uv_b);
    mesh.set_uv(at_a, uv_a);
    mesh.set_uv(at_x, x);
    mesh.set_uv(at_y, y);
}

/// Ratio of the next quad's rail length to the current quad's.
fn depth_ratio<I: MeshIndex>(mesh: &EditMesh<I>, h: HalfEdgeId<I>, mode: EdgeLengthMode) -> f64 {
    if mode == EdgeLengthMode::Even {
        return 1.0;
    }

    let t = mesh.twin(h);
    let source = mesh.edge_length(mesh.prev(h)) + mesh.edge_length(mesh.next(h));
    let target = mesh.edge_length(mesh.next(t)) + mesh.edge_length(mesh.prev(t));
    if source < EPSILON {
        1.0
    } else {
        target / source
    }
}

/// Edges grouped into rings of opposite quad sides.
struct EdgeRings {
    parent: Vec<usize>,
    total: Vec<f64>,
    count: Vec<usize>,
}

impl EdgeRings {
    fn build<I: MeshIndex>(mesh: &EditMesh<I>, island: &[FaceId<I>]) -> Self {
        let n = mesh.num_edges();
        let mut rings = Self {
            parent: (0..n).collect(),
            total: vec![0.0; n],
            count: vec![0; n],
        };

        for &f in island {
            let loops: Vec<HalfEdgeId<I>> = mesh.face_loops(f).collect();
            if let [l0, l1, l2, l3] = loops[..] {
                rings.union(mesh.edge_of(l0), mesh.edge_of(l2));
                rings.union(mesh.edge_of(l1), mesh.edge_of(l3));
            }
        }

        for e in mesh.edge_ids() {
            let root = rings.find(e.index());
            rings.total[root] += mesh.edge_length(mesh.edge(e).halfedge);
            rings.count[root] += 1;
        }
        rings
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union<I: MeshIndex>(&mut self, a: EdgeId<I>, b: EdgeId<I>) {
        let ra = self.find(a.index());
        let rb = self.find(b.index());
        if ra != rb {
            self.parent[rb] = ra;
        }
    }

    fn average(&self, mut i: usize) -> f64 {
        while self.parent[i] != i {
            i = self.parent[i];
        }
        if self.count[i] == 0 {
            0.0
        } else {
            self.total[i] / self.count[i] as f64
        }
    }

    fn depth_ratio<I: MeshIndex>(&self, mesh: &EditMesh<I>, h: HalfEdgeId<I>) -> f64 {
        let t = mesh.twin(h);
        let source = self.average(mesh.edge_of(mesh.prev(h)).index());
        let target = self.average(mesh.edge_of(mesh.next(t)).index());
        if source < EPSILON {
            1.0
        } else {
            target / source
        }
    }
}
