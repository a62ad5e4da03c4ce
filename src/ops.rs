//! User-facing UV operators.
//!
//! Every operator takes the mesh, an [`EditContext`] describing where it was
//! invoked from, and an options struct. Options are validated and the context
//! polled before anything is written, so a rejected call leaves the mesh
//! untouched.
//!
//! # Selection surfaces
//!
//! From the 3D viewport the UV selection is ignored: every loop of a
//! selected, visible face takes part. From the UV editor only UV-selected
//! loops do, and island operators only consider faces whose loops are all
//! UV-selected.
//!
//! # Example
//!
//! ```
//! use pixel_uv::prelude::*;
//! use nalgebra::{Point2, Point3};
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let uvs = vec![vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(0.5, 0.0),
//!     Point2::new(0.5, 0.5),
//!     Point2::new(0.0, 0.5),
//! ]];
//! let mut mesh: EditMesh = build_with_uvs(&vertices, &[[0usize, 1, 2, 3]], &uvs).unwrap();
//!
//! let options = MoveOptions::default().with_delta(16, 0);
//! move_uvs_by_pixels(&mut mesh, &EditContext::viewport(), &options).unwrap();
//! assert!((mesh.face_uvs(FaceId::new(0))[0].x - 0.0625).abs() < 1e-12);
//! ```

use log::{debug, info};

use crate::algo::follow_quads::{follow_islands, EdgeLengthMode, FollowActiveQuads, QuadFollower};
use crate::algo::islands::{partition, Delimit};
use crate::algo::layout::DEFAULT_MARGIN;
use crate::algo::orientation::generate_frames;
use crate::algo::pack::{
    IslandPacker, PackRequest, PinMethod, RotateMethod, ShapeMethod, ShelfPacker, UdimSource,
};
use crate::algo::pixel::{move_loops, snap_loops, BoundsSnap};
use crate::algo::projection::project_islands;
use crate::error::{Result, UvError};
use crate::mesh::{EditMesh, FaceId, HalfEdgeId, MeshIndex};

// ==================== Context ====================

/// Whether the mesh is open for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Object mode. Operators refuse to run.
    Object,
    /// Edit mode.
    #[default]
    Edit,
}

/// Where an operator was invoked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    /// The 3D viewport: the UV selection is ignored.
    #[default]
    Viewport3d,
    /// The UV editor: the UV selection is honoured.
    UvEditor,
}

/// Invocation context of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditContext {
    /// Current mode.
    pub mode: EditMode,
    /// Invoking surface.
    pub surface: Surface,
}

impl EditContext {
    /// Edit mode, invoked from the 3D viewport.
    pub fn viewport() -> Self {
        Self {
            mode: EditMode::Edit,
            surface: Surface::Viewport3d,
        }
    }

    /// Edit mode, invoked from the UV editor.
    pub fn uv_editor() -> Self {
        Self {
            mode: EditMode::Edit,
            surface: Surface::UvEditor,
        }
    }

    /// Switch the mode.
    pub fn with_mode(mut self, mode: EditMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether operators may run.
    pub fn poll(&self) -> Result<()> {
        match self.mode {
            EditMode::Edit => Ok(()),
            EditMode::Object => Err(UvError::NotInEditMode),
        }
    }

    /// Whether the UV selection filters the working set.
    #[inline]
    pub fn uses_uv_selection(&self) -> bool {
        self.surface == Surface::UvEditor
    }
}

// ==================== Working sets ====================

fn visible_selected<I: MeshIndex>(mesh: &EditMesh<I>, f: FaceId<I>) -> bool {
    mesh.is_selected(f) && !mesh.is_hidden(f)
}

/// Loops moved, snapped or scaled by the whole-selection operators.
pub fn selected_loops<I: MeshIndex>(mesh: &EditMesh<I>, ctx: &EditContext) -> Vec<HalfEdgeId<I>> {
    mesh.face_ids()
        .filter(|&f| visible_selected(mesh, f))
        .flat_map(|f| mesh.face_loops(f))
        .filter(|&he| !ctx.uses_uv_selection() || mesh.is_uv_selected(he))
        .collect()
}

/// Faces handed to the island operators.
pub fn island_faces<I: MeshIndex>(mesh: &EditMesh<I>, ctx: &EditContext) -> Vec<FaceId<I>> {
    mesh.face_ids()
        .filter(|&f| visible_selected(mesh, f))
        .filter(|&f| {
            !ctx.uses_uv_selection() || mesh.face_loops(f).all(|he| mesh.is_uv_selected(he))
        })
        .collect()
}

/// Faces projected by [`regular_polygon_project`].
pub fn projection_faces<I: MeshIndex>(mesh: &EditMesh<I>) -> Vec<FaceId<I>> {
    mesh.face_ids().filter(|&f| visible_selected(mesh, f)).collect()
}

// ==================== Options ====================

fn check_resolution(resolution: u32) -> Result<()> {
    if resolution == 0 {
        return Err(UvError::invalid_param("resolution", resolution, "must be at least 1"));
    }
    Ok(())
}

/// Options for [`move_uvs_by_pixels`].
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOptions {
    /// Texture width and height in pixels.
    pub resolution: u32,
    /// Pixels along U.
    pub dx: i32,
    /// Pixels along V.
    pub dy: i32,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            resolution: 256,
            dx: 0,
            dy: 0,
        }
    }
}

impl MoveOptions {
    /// Set the texture resolution.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the translation in pixels.
    pub fn with_delta(mut self, dx: i32, dy: i32) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    /// Check the options.
    pub fn validate(&self) -> Result<()> {
        check_resolution(self.resolution)
    }
}

/// Options for [`scale_uvs_by_pixels`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleOptions {
    /// Texture width and height in pixels.
    pub resolution: u32,
    /// Pixels added to the width.
    pub dx: i32,
    /// Pixels added to the height.
    pub dy: i32,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            resolution: 256,
            dx: 1,
            dy: 1,
        }
    }
}

impl ScaleOptions {
    /// Set the texture resolution.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the size change in pixels.
    pub fn with_delta(mut self, dx: i32, dy: i32) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    /// Check the options.
    pub fn validate(&self) -> Result<()> {
        check_resolution(self.resolution)
    }
}

/// Options for [`snap_uvs_to_pixels`] and [`snap_uv_island_bounds_to_pixels`].
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOptions {
    /// Texture width and height in pixels.
    pub resolution: u32,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self { resolution: 256 }
    }
}

impl SnapOptions {
    /// Set the texture resolution.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Check the options.
    pub fn validate(&self) -> Result<()> {
        check_resolution(self.resolution)
    }
}

/// Options for [`pack_islands_pixel_margin`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackOptions {
    /// Texture width and height in pixels.
    pub resolution: u32,
    /// Margin around each island in pixels.
    pub margin: u32,
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

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            resolution: 256,
            margin: 2,
            udim_source: UdimSource::ClosestUdim,
            rotate: true,
            rotate_method: RotateMethod::Cardinal,
            scale: true,
            merge_overlap: false,
            pin: false,
            pin_method: PinMethod::Locked,
            shape_method: ShapeMethod::Aabb,
        }
    }
}

impl PackOptions {
    /// Set the texture resolution.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the margin in pixels.
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Allow or forbid rotation.
    pub fn with_rotate(mut self, rotate: bool) -> Self {
        self.rotate = rotate;
        self
    }

    /// Allow or forbid scaling.
    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    /// Check the options.
    pub fn validate(&self) -> Result<()> {
        check_resolution(self.resolution)
    }

    /// The packer request, with the margin as a fraction of the UV square.
    pub fn request(&self) -> PackRequest {
        PackRequest {
            margin: self.margin as f64 / self.resolution as f64,
            udim_source: self.udim_source,
            rotate: self.rotate,
            rotate_method: self.rotate_method,
            scale: self.scale,
            merge_overlap: self.merge_overlap,
            pin: self.pin,
            pin_method: self.pin_method,
            shape_method: self.shape_method,
        }
    }
}

/// Options for [`regular_polygon_project`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOptions {
    /// Sides of the projection cylinder.
    pub vertices: usize,
    /// Extra angle, in degrees, the caps must win by.
    pub cap_penalty: u32,
    /// Delimit islands by the mesh's own seams.
    pub use_seams: bool,
    /// Gap between laid out islands in UV units.
    pub margin: f64,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            vertices: 4,
            cap_penalty: 0,
            use_seams: false,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl ProjectOptions {
    /// Set the number of cylinder sides.
    pub fn with_vertices(mut self, vertices: usize) -> Self {
        self.vertices = vertices;
        self
    }

    /// Set the cap penalty in degrees.
    pub fn with_cap_penalty(mut self, cap_penalty: u32) -> Self {
        self.cap_penalty = cap_penalty;
        self
    }

    /// Use existing seams instead of synthesizing them.
    pub fn with_use_seams(mut self, use_seams: bool) -> Self {
        self.use_seams = use_seams;
        self
    }

    /// Set the island margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Check the options.
    pub fn validate(&self) -> Result<()> {
        if self.vertices < 3 {
            return Err(UvError::invalid_param("vertices", self.vertices, "must be at least 3"));
        }
        if self.cap_penalty > 90 {
            return Err(UvError::invalid_param(
                "cap_penalty",
                self.cap_penalty,
                "must be between 0 and 90",
            ));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(UvError::invalid_param(
                "margin",
                self.margin,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Options for [`smart_follow_quads`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowQuadsOptions {
    /// Edge length mode of the relaxation.
    pub mode: EdgeLengthMode,
}

impl FollowQuadsOptions {
    /// Set the edge length mode.
    pub fn with_mode(mut self, mode: EdgeLengthMode) -> Self {
        self.mode = mode;
        self
    }
}

// ==================== Operators ====================

/// Translate the selected UVs by whole pixels.
pub fn move_uvs_by_pixels<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &MoveOptions,
) -> Result<()> {
    options.validate()?;
    ctx.poll()?;

    let loops = selected_loops(mesh, ctx);
    move_loops(
        mesh,
        &loops,
        options.resolution as f64,
        options.dx as f64,
        options.dy as f64,
    );

    info!(
        "moved {} UVs by ({}, {}) px at {}",
        loops.len(),
        options.dx,
        options.dy,
        options.resolution
    );
    Ok(())
}

/// Resize the selected UVs to whole pixels plus `(dx, dy)`, about their centroid.
pub fn scale_uvs_by_pixels<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &ScaleOptions,
) -> Result<()> {
    options.validate()?;
    ctx.poll()?;

    let loops = selected_loops(mesh, ctx);
    let snap = BoundsSnap::grow(
        options.resolution as f64,
        options.dx as f64,
        options.dy as f64,
    );
    match snap.apply(mesh, &loops) {
        Some(scale) => info!(
            "scaled {} UVs by ({:.4}, {:.4})",
            loops.len(),
            scale.x,
            scale.y
        ),
        None => info!("no UVs selected, nothing to scale"),
    }
    Ok(())
}

/// Round every selected UV to the nearest pixel corner.
pub fn snap_uvs_to_pixels<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &SnapOptions,
) -> Result<()> {
    options.validate()?;
    ctx.poll()?;

    let loops = selected_loops(mesh, ctx);
    snap_loops(mesh, &loops, options.resolution as f64);

    info!("snapped {} UVs to a {} px grid", loops.len(), options.resolution);
    Ok(())
}

/// Snap each UV island's bounds to whole pixels.
///
/// The minimum corner moves to the nearest pixel corner and each side is
/// resized to a whole number of pixels.
pub fn snap_uv_island_bounds_to_pixels<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &SnapOptions,
) -> Result<()> {
    options.validate()?;
    ctx.poll()?;

    let working = island_faces(mesh, ctx);
    let islands = partition(mesh, &working, Delimit::Uv);
    let snap = BoundsSnap::island(options.resolution as f64);

    for i in 0..islands.len() {
        let loops = islands.loops(mesh, i);
        if let Some(scale) = snap.apply(mesh, &loops) {
            debug!(
                "island {}: {} faces, scale ({:.4}, {:.4})",
                i,
                islands.faces(i).len(),
                scale.x,
                scale.y
            );
        }
    }

    info!(
        "snapped {} UV islands to a {} px grid",
        islands.len(),
        options.resolution
    );
    Ok(())
}

/// Pack UV islands with a margin given in pixels, using [`ShelfPacker`].
pub fn pack_islands_pixel_margin<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &PackOptions,
) -> Result<()> {
    pack_islands_pixel_margin_with(mesh, ctx, options, &mut ShelfPacker)
}

/// Pack UV islands with a margin given in pixels, using `packer`.
///
/// From the 3D viewport every UV is selected first.
pub fn pack_islands_pixel_margin_with<I, P>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &PackOptions,
    packer: &mut P,
) -> Result<()>
where
    I: MeshIndex,
    P: IslandPacker,
{
    options.validate()?;
    ctx.poll()?;

    if !ctx.uses_uv_selection() {
        let all: Vec<HalfEdgeId<I>> = mesh.face_ids().flat_map(|f| mesh.face_loops(f)).collect();
        for he in all {
            mesh.set_uv_selected(he, true);
        }
    }

    let faces = island_faces(mesh, ctx);
    let request = options.request();
    packer.pack(mesh, &faces, &request)?;

    info!(
        "packed {} faces with a {} px margin ({:.5} of the UV square)",
        faces.len(),
        options.margin,
        request.margin
    );
    Ok(())
}

/// Project the selected faces over the sides and caps of a regular polygon
/// cylinder and lay the islands out along U.
pub fn regular_polygon_project<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &ProjectOptions,
) -> Result<()> {
    options.validate()?;
    ctx.poll()?;

    let frames = generate_frames(options.vertices)?;
    let working = projection_faces(mesh);
    let islands = project_islands(
        mesh,
        &working,
        &frames,
        options.cap_penalty as f64,
        options.use_seams,
        options.margin,
    );

    info!(
        "projected {} faces as {} islands over a {}-sided cylinder",
        working.len(),
        islands,
        options.vertices
    );
    Ok(())
}

/// Straighten each UV island around its most rectangular quad, using
/// [`FollowActiveQuads`].
pub fn smart_follow_quads<I: MeshIndex>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &FollowQuadsOptions,
) -> Result<()> {
    smart_follow_quads_with(mesh, ctx, options, &mut FollowActiveQuads)
}

/// Straighten each UV island around its most rectangular quad, using
/// `follower`.
///
/// # Errors
///
/// Returns [`UvError::IslandFailed`] for the first island the follower
/// failed on. Every other island is still processed.
pub fn smart_follow_quads_with<I, F>(
    mesh: &mut EditMesh<I>,
    ctx: &EditContext,
    options: &FollowQuadsOptions,
    follower: &mut F,
) -> Result<()>
where
    I: MeshIndex,
    F: QuadFollower,
{
    ctx.poll()?;

    let working = island_faces(mesh, ctx);
    let followed = follow_islands(mesh, &working, options.mode, follower)?;

    info!("followed {} UV islands ({:?})", followed, options.mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::orientation::FrameKind;
    use crate::mesh::{build_from_quads, build_with_uvs};
    use nalgebra::{Point2, Point3};

    fn quad(uvs: [(f64, f64); 4]) -> EditMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![uvs.iter().map(|&(u, v)| Point2::new(u, v)).collect::<Vec<_>>()];
        build_with_uvs(&vertices, &[[0usize, 1, 2, 3]], &uvs).unwrap()
    }

    /// Two disconnected unit quads with separate UV islands.
    fn two_quads() -> EditMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let uvs = vec![
            vec![
                Point2::new(0.01, 0.02),
                Point2::new(0.33, 0.02),
                Point2::new(0.33, 0.29),
                Point2::new(0.01, 0.29),
            ],
            vec![
                Point2::new(0.51, 0.52),
                Point2::new(0.77, 0.52),
                Point2::new(0.77, 0.9),
                Point2::new(0.51, 0.9),
            ],
        ];
        build_with_uvs(&vertices, &[[0usize, 1, 2, 3], [4, 5, 6, 7]], &uvs).unwrap()
    }

    fn all_uvs(mesh: &EditMesh) -> Vec<Point2<f64>> {
        mesh.face_ids().flat_map(|f| mesh.face_uvs(f)).collect()
    }

    #[test]
    fn test_poll() {
        assert!(EditContext::default().poll().is_ok());
        assert!(matches!(
            EditContext::viewport().with_mode(EditMode::Object).poll(),
            Err(UvError::NotInEditMode)
        ));
    }

    #[test]
    fn test_option_defaults() {
        assert_eq!(MoveOptions::default().resolution, 256);
        assert_eq!(ScaleOptions::default().dx, 1);
        assert_eq!(SnapOptions::default().resolution, 256);
        let pack = PackOptions::default();
        assert_eq!(pack.margin, 2);
        assert!(pack.rotate && pack.scale);
        let project = ProjectOptions::default();
        assert_eq!(project.vertices, 4);
        assert_eq!(project.cap_penalty, 0);
        assert!(!project.use_seams);
        assert_eq!(FollowQuadsOptions::default().mode, EdgeLengthMode::Even);
    }

    #[test]
    fn test_option_validation() {
        assert!(MoveOptions::default().with_resolution(0).validate().is_err());
        assert!(ProjectOptions::default().with_vertices(2).validate().is_err());
        assert!(ProjectOptions::default().with_cap_penalty(91).validate().is_err());
        assert!(ProjectOptions::default().with_margin(-1.0).validate().is_err());
        assert!(ProjectOptions::default().with_cap_penalty(90).validate().is_ok());
    }

    #[test]
    fn test_move_example() {
        let mut mesh = quad([(0.1, 0.2), (0.4, 0.2), (0.4, 0.6), (0.1, 0.6)]);
        let before = all_uvs(&mesh);
        let options = MoveOptions::default().with_delta(16, 0);
        move_uvs_by_pixels(&mut mesh, &EditContext::viewport(), &options).unwrap();

        for (a, b) in before.iter().zip(all_uvs(&mesh)) {
            assert!((b.x - a.x - 0.0625).abs() < 1e-12);
            assert_eq!(b.y, a.y);
        }
    }

    #[test]
    fn test_rejected_call_leaves_mesh_untouched() {
        let mut mesh = quad([(0.1, 0.2), (0.4, 0.2), (0.4, 0.6), (0.1, 0.6)]);
        let before = all_uvs(&mesh);
        let object = EditContext::viewport().with_mode(EditMode::Object);

        let options = MoveOptions::default().with_delta(16, 16);
        assert!(move_uvs_by_pixels(&mut mesh, &object, &options).is_err());
        let bad = MoveOptions::default().with_resolution(0).with_delta(1, 1);
        assert!(move_uvs_by_pixels(&mut mesh, &EditContext::viewport(), &bad).is_err());
        assert!(regular_polygon_project(&mut mesh, &object, &ProjectOptions::default()).is_err());

        assert_eq!(before, all_uvs(&mesh));
    }

    #[test]
    fn test_uv_editor_honours_uv_selection() {
        let mut mesh = quad([(0.0, 0.0), (0.5, 0.0), (0.5, 0.5), (0.0, 0.5)]);
        let loops: Vec<_> = mesh.face_loops(FaceId::new(0)).collect();
        mesh.set_uv_selected(loops[0], false);

        let options = MoveOptions::default().with_resolution(4).with_delta(1, 1);
        move_uvs_by_pixels(&mut mesh, &EditContext::uv_editor(), &options).unwrap();
        let uvs = mesh.face_uvs(FaceId::new(0));
        assert_eq!(uvs[0], Point2::new(0.0, 0.0));
        assert_eq!(uvs[1], Point2::new(0.75, 0.25));

        // The viewport ignores the UV selection
        move_uvs_by_pixels(&mut mesh, &EditContext::viewport(), &options).unwrap();
        assert_eq!(mesh.face_uvs(FaceId::new(0))[0], Point2::new(0.25, 0.25));
    }

    #[test]
    fn test_hidden_and_unselected_faces_are_ignored() {
        let mut mesh = two_quads();
        mesh.set_hidden(FaceId::new(0), true);
        mesh.set_selected(FaceId::new(1), false);
        let before = all_uvs(&mesh);

        snap_uvs_to_pixels(&mut mesh, &EditContext::viewport(), &SnapOptions::default()).unwrap();
        assert_eq!(before, all_uvs(&mesh));
        assert!(selected_loops(&mesh, &EditContext::viewport()).is_empty());
        assert!(island_faces(&mesh, &EditContext::viewport()).is_empty());
    }

    #[test]
    fn test_island_faces_need_all_loops_uv_selected() {
        let mut mesh = two_quads();
        let he = mesh.face_loops(FaceId::new(1)).next().unwrap();
        mesh.set_uv_selected(he, false);

        assert_eq!(island_faces(&mesh, &EditContext::viewport()).len(), 2);
        assert_eq!(island_faces(&mesh, &EditContext::uv_editor()), vec![FaceId::new(0)]);
    }

    #[test]
    fn test_snap_uvs_is_idempotent() {
        let mut mesh = two_quads();
        let options = SnapOptions::default().with_resolution(32);
        snap_uvs_to_pixels(&mut mesh, &EditContext::viewport(), &options).unwrap();
        let once = all_uvs(&mesh);
        snap_uvs_to_pixels(&mut mesh, &EditContext::viewport(), &options).unwrap();
        assert_eq!(once, all_uvs(&mesh));
    }

    #[test]
    fn test_snap_island_bounds_per_island() {
        let r = 16.0;
        let mut mesh = two_quads();
        let options = SnapOptions::default().with_resolution(16);
        snap_uv_island_bounds_to_pixels(&mut mesh, &EditContext::viewport(), &options).unwrap();

        for f in mesh.face_ids() {
            let bounds = mesh.uv_layer().bounds(&mesh.loops_of(&[f])).unwrap();
            for x in [bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y] {
                assert!(((x * r).round() - x * r).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_scale_round_trip() {
        let r = 64;
        let mut mesh = two_quads();
        let loops = selected_loops(&mesh, &EditContext::viewport());
        let original = mesh.uv_layer().bounds(&loops).unwrap().size();

        let grow = ScaleOptions::default().with_resolution(r).with_delta(3, 2);
        let shrink = ScaleOptions::default().with_resolution(r).with_delta(-3, -2);
        scale_uvs_by_pixels(&mut mesh, &EditContext::viewport(), &grow).unwrap();
        scale_uvs_by_pixels(&mut mesh, &EditContext::viewport(), &shrink).unwrap();

        let size = mesh.uv_layer().bounds(&loops).unwrap().size();
        assert!((size.x - original.x).abs() <= 1.0 / r as f64 + 1e-12);
        assert!((size.y - original.y).abs() <= 1.0 / r as f64 + 1e-12);
    }

    #[test]
    fn test_scale_in_uv_editor_only_touches_selected_uvs() {
        let mut mesh = two_quads();
        let first = mesh.loops_of(&[FaceId::new(0)]);
        let second = mesh.loops_of(&[FaceId::new(1)]);
        for &he in &second {
            mesh.set_uv_selected(he, false);
        }
        let untouched = mesh.face_uvs(FaceId::new(1));
        let original = mesh.uv_layer().bounds(&first).unwrap().size();

        let grow = ScaleOptions::default().with_resolution(64).with_delta(3, 2);
        scale_uvs_by_pixels(&mut mesh, &EditContext::uv_editor(), &grow).unwrap();

        // Face selection covers both quads, but only the UV-selected one grows
        assert_eq!(mesh.face_uvs(FaceId::new(1)), untouched);
        let size = mesh.uv_layer().bounds(&first).unwrap().size();
        assert!(size.x > original.x);
        assert!(size.y > original.y);
        assert!(second.iter().all(|&he| !mesh.is_uv_selected(he)));
    }

    #[test]
    fn test_pack_selects_all_uvs_in_viewport() {
        let mut mesh = two_quads();
        for he in mesh.loops_of(&[FaceId::new(1)]) {
            mesh.set_uv_selected(he, false);
        }
        pack_islands_pixel_margin(&mut mesh, &EditContext::viewport(), &PackOptions::default())
            .unwrap();

        assert!(mesh
            .loops_of(&[FaceId::new(1)])
            .iter()
            .all(|&he| mesh.is_uv_selected(he)));
        let second = mesh.uv_layer().bounds(&mesh.loops_of(&[FaceId::new(1)])).unwrap();
        assert!((second.min.x - (0.32 + 2.0 / 256.0)).abs() < 1e-9);
    }

    /// Records what it was asked to pack.
    #[derive(Default)]
    struct Recorder {
        faces: usize,
        margin: f64,
    }

    impl IslandPacker for Recorder {
        fn pack<I: MeshIndex>(
            &mut self,
            _mesh: &mut EditMesh<I>,
            faces: &[FaceId<I>],
            request: &PackRequest,
        ) -> Result<()> {
            self.faces = faces.len();
            self.margin = request.margin;
            Ok(())
        }
    }

    #[test]
    fn test_pack_margin_is_a_fraction() {
        let mut mesh = two_quads();
        let he = mesh.face_loops(FaceId::new(1)).next().unwrap();
        mesh.set_uv_selected(he, false);

        let options = PackOptions::default().with_resolution(512).with_margin(4);
        let mut recorder = Recorder::default();
        pack_islands_pixel_margin_with(&mut mesh, &EditContext::uv_editor(), &options, &mut recorder)
            .unwrap();

        assert_eq!(recorder.faces, 1);
        assert!((recorder.margin - 4.0 / 512.0).abs() < 1e-15);
    }

    #[test]
    fn test_project_single_quad_looks_from_north() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh: EditMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
        regular_polygon_project(&mut mesh, &EditContext::viewport(), &ProjectOptions::default())
            .unwrap();

        let frames = generate_frames(4).unwrap();
        assert_eq!(frames[4].kind(), FrameKind::NorthPole);
        let uvs = mesh.face_uvs(FaceId::new(0));
        let expected = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        for (uv, (u, v)) in uvs.into_iter().zip(expected) {
            assert!((uv.x - u).abs() < 1e-10);
            assert!((uv.y - v).abs() < 1e-10);
        }
    }

    #[test]
    fn test_project_restores_seams() {
        let mut mesh = two_quads();
        let e = mesh.edge_ids().next().unwrap();
        mesh.set_seam(e, true);
        let before: Vec<bool> = mesh.edge_ids().map(|e| mesh.is_seam(e)).collect();

        let options = ProjectOptions::default().with_vertices(8).with_cap_penalty(45);
        regular_polygon_project(&mut mesh, &EditContext::viewport(), &options).unwrap();

        let after: Vec<bool> = mesh.edge_ids().map(|e| mesh.is_seam(e)).collect();
        assert_eq!(before, after);
    }

    /// Always fails.
    struct Broken;

    impl QuadFollower for Broken {
        fn follow<I: MeshIndex>(
            &mut self,
            _mesh: &mut EditMesh<I>,
            _island: &[FaceId<I>],
            _seed: FaceId<I>,
            _mode: EdgeLengthMode,
        ) -> Result<()> {
            Err(UvError::Relaxation("unsupported topology".into()))
        }
    }

    #[test]
    fn test_follow_quads_reports_island_failure() {
        let mut mesh = two_quads();
        let result = smart_follow_quads_with(
            &mut mesh,
            &EditContext::viewport(),
            &FollowQuadsOptions::default(),
            &mut Broken,
        );
        assert!(matches!(result, Err(UvError::IslandFailed { island: 0, .. })));
    }

    #[test]
    fn test_follow_quads_keeps_island_centroids() {
        let mut mesh = two_quads();
        let centroids: Vec<_> = mesh
            .face_ids()
            .map(|f| mesh.uv_layer().centroid(&mesh.loops_of(&[f])).unwrap())
            .collect();

        let options = FollowQuadsOptions::default().with_mode(EdgeLengthMode::Length);
        smart_follow_quads(&mut mesh, &EditContext::viewport(), &options).unwrap();

        for (f, before) in mesh.face_ids().zip(centroids) {
            let after = mesh.uv_layer().centroid(&mesh.loops_of(&[f])).unwrap();
            assert!((after - before).norm() < 1e-12);
        }
    }
}
