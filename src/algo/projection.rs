//! Regular polygon projection.
//!
//! Each island of the working set is projected orthographically onto the
//! image plane of the cylinder frame that best faces its average normal, then
//! the islands are laid out side by side along U.
//!
//! Islands come from seams. Unless existing seams are requested, seams are
//! synthesized between faces that pick different frames and the original
//! flags are put back afterwards, on every exit path.

use log::debug;
use nalgebra::{Point2, Point3, Vector3};

use super::islands::{partition, Delimit, SeamGuard};
use super::layout::ShelfLayout;
use super::orientation::{select_best_frame, OrientationFrame};
use crate::geometry::{project, sign, EPSILON};
use crate::mesh::{EditMesh, FaceId, MeshIndex};

/// Signed orthographic projection of `point` onto the frame's image plane.
pub fn project_point(point: &Point3<f64>, frame: &OrientationFrame) -> Point2<f64> {
    let p = point.coords;
    let x_axis = frame.x_axis();
    let y_axis = frame.y_axis();
    Point2::new(
        sign(p.dot(&x_axis)) * project(&p, &x_axis).norm(),
        sign(p.dot(&y_axis)) * project(&p, &y_axis).norm(),
    )
}

/// Mean face normal of `faces`, or +Z when the normals cancel out.
pub fn average_normal<I: MeshIndex>(mesh: &EditMesh<I>, faces: &[FaceId<I>]) -> Vector3<f64> {
    let sum: Vector3<f64> = faces.iter().map(|&f| mesh.face_normal(f)).sum();
    if sum.norm() < EPSILON || faces.is_empty() {
        return Vector3::z();
    }
    sum / faces.len() as f64
}

/// Project one island onto its best frame. Returns the frame index used.
///
/// Existing UVs are ignored: each loop takes the projection of its vertex.
pub fn project_island<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    faces: &[FaceId<I>],
    frames: &[OrientationFrame],
    cap_penalty_degrees: f64,
) -> usize {
    let normal = average_normal(mesh, faces);
    let frame = select_best_frame(&normal, frames, cap_penalty_degrees);

    for he in mesh.loops_of(faces) {
        let uv = project_point(mesh.position(mesh.origin(he)), frame);
        mesh.set_uv(he, uv);
    }

    frame.index()
}

/// Project every island of `working` and lay them out along U.
///
/// With `use_seams` the mesh's own seams delimit the islands; otherwise
/// seams are synthesized from frame changes for the duration of the call.
/// Returns the number of islands.
pub fn project_islands<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    working: &[FaceId<I>],
    frames: &[OrientationFrame],
    cap_penalty_degrees: f64,
    use_seams: bool,
    margin: f64,
) -> usize {
    if use_seams {
        return project_partitioned(mesh, working, frames, cap_penalty_degrees, margin);
    }

    let mut guard = SeamGuard::new(mesh);
    guard.synthesize(frames, cap_penalty_degrees);
    project_partitioned(&mut *guard, working, frames, cap_penalty_degrees, margin)
}

fn project_partitioned<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    working: &[FaceId<I>],
    frames: &[OrientationFrame],
    cap_penalty_degrees: f64,
    margin: f64,
) -> usize {
    let islands = partition(mesh, working, Delimit::Seam);
    let mut layout = ShelfLayout::new(margin);

    for (i, faces) in islands.iter().enumerate() {
        let frame = project_island(mesh, faces, frames, cap_penalty_degrees);
        let loops = mesh.loops_of(faces);
        let width = layout.place(mesh, &loops);
        debug!(
            "island {}: {} faces, frame {}, width {:.4}",
            i,
            faces.len(),
            frame,
            width
        );
    }

    islands.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::layout::DEFAULT_MARGIN;
    use crate::algo::orientation::{generate_frames, FrameKind};
    use crate::mesh::{build_from_quads, EdgeId};

    fn unit_quad() -> EditMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap()
    }

    fn cube() -> EditMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
        ];
        build_from_quads(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_project_point_signed_magnitudes() {
        let frames = generate_frames(4).unwrap();
        // Frame 0: U = +X, V = +Z
        let uv = project_point(&Point3::new(-2.0, 5.0, 3.0), &frames[0]);
        assert!((uv - Point2::new(-2.0, 3.0)).norm() < 1e-10);
    }

    #[test]
    fn test_average_normal_fallback() {
        let mesh = unit_quad();
        assert_eq!(average_normal(&mesh, &[]), Vector3::z());

        // Two opposite faces cancel out
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let mesh: EditMesh = build_from_quads(&vertices, &[[0, 1, 2, 3], [4, 7, 6, 5]]).unwrap();
        let faces: Vec<FaceId> = mesh.face_ids().collect();
        assert_eq!(average_normal(&mesh, &faces), Vector3::z());
    }

    #[test]
    fn test_up_facing_quad_uses_north_pole() {
        let mut mesh = unit_quad();
        let frames = generate_frames(4).unwrap();
        let faces: Vec<FaceId> = mesh.face_ids().collect();

        let index = project_island(&mut mesh, &faces, &frames, 0.0);
        assert_eq!(index, 4);
        assert_eq!(frames[index].kind(), FrameKind::NorthPole);

        // Looking down: U = X, V = Y
        for he in mesh.face_loops(FaceId::new(0)) {
            let p = mesh.position(mesh.origin(he));
            let uv = mesh.uv(he);
            assert!((uv.x - p.x).abs() < 1e-10);
            assert!((uv.y - p.y).abs() < 1e-10);
        }
    }

    #[test]
    fn test_cube_splits_into_six_islands() {
        let mut mesh = cube();
        let frames = generate_frames(4).unwrap();
        let working: Vec<FaceId> = mesh.face_ids().collect();

        let count = project_islands(&mut mesh, &working, &frames, 0.0, false, DEFAULT_MARGIN);
        assert_eq!(count, 6);
        // Synthesized seams are gone again
        assert!(mesh.edge_ids().all(|e| !mesh.is_seam(e)));
    }

    #[test]
    fn test_existing_seams_are_restored() {
        let mut mesh = cube();
        mesh.set_seam(EdgeId::new(3), true);
        let before: Vec<bool> = mesh.edge_ids().map(|e| mesh.is_seam(e)).collect();

        let frames = generate_frames(6).unwrap();
        let working: Vec<FaceId> = mesh.face_ids().collect();
        project_islands(&mut mesh, &working, &frames, 30.0, false, DEFAULT_MARGIN);

        let after: Vec<bool> = mesh.edge_ids().map(|e| mesh.is_seam(e)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_use_seams_keeps_seamless_cube_whole() {
        let mut mesh = cube();
        let frames = generate_frames(4).unwrap();
        let working: Vec<FaceId> = mesh.face_ids().collect();
        assert_eq!(project_islands(&mut mesh, &working, &frames, 0.0, true, DEFAULT_MARGIN), 1);
    }

    #[test]
    fn test_islands_start_at_running_offset() {
        let frames = generate_frames(4).unwrap();
        let mut reference = cube();
        let mut mesh = cube();
        let working: Vec<FaceId> = mesh.face_ids().collect();
        project_islands(&mut mesh, &working, &frames, 0.0, false, DEFAULT_MARGIN);

        // Each cube face is its own island, placed in face order
        let mut expected = 0.0;
        for f in mesh.face_ids() {
            project_island(&mut reference, &[f], &frames, 0.0);
            let loops = mesh.loops_of(&[f]);
            let unshifted = reference.uv_layer().bounds(&loops).unwrap();
            let bounds = mesh.uv_layer().bounds(&loops).unwrap();

            assert!((bounds.min.x - expected).abs() < 1e-10);
            assert!((bounds.min.y - unshifted.min.y).abs() < 1e-10);
            expected += unshifted.width() + DEFAULT_MARGIN;
        }
    }
}
