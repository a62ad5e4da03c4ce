//! Orientation frames of a regular polygon cylinder.
//!
//! A regular polygon projection looks at the mesh from the `n` sides of a
//! regular polygon prism standing on the XY plane, plus from its two caps.
//! Each viewpoint is an [`OrientationFrame`]: a rotation whose `forward` axis
//! is the viewing direction and whose rotated X and Z axes span the image
//! plane.
//!
//! # Example
//!
//! ```
//! use pixel_uv::algo::orientation::{generate_frames, select_best_frame, FrameKind};
//! use nalgebra::Vector3;
//!
//! let frames = generate_frames(4).unwrap();
//! assert_eq!(frames.len(), 6);
//!
//! let best = select_best_frame(&Vector3::new(0.0, 0.0, 1.0), &frames, 0.0);
//! assert_eq!(best.kind(), FrameKind::NorthPole);
//! assert_eq!(best.index(), 4);
//! ```

use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::error::{Result, UvError};
use crate::geometry::{angle_between, EPSILON};

/// Which part of the polygon cylinder a frame looks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// One of the `n` sides.
    Side,
    /// The top cap. Looks down onto up-facing faces.
    NorthPole,
    /// The bottom cap. Looks up onto down-facing faces.
    SouthPole,
}

/// A projection viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationFrame {
    index: usize,
    kind: FrameKind,
    rotation: UnitQuaternion<f64>,
}

impl OrientationFrame {
    fn new(index: usize, kind: FrameKind, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            index,
            kind,
            rotation,
        }
    }

    /// Position of the frame in the generated list. Frames are compared by index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Side or cap.
    #[inline]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Whether this frame is one of the two caps.
    #[inline]
    pub fn is_pole(&self) -> bool {
        self.kind != FrameKind::Side
    }

    /// The frame's rotation.
    #[inline]
    pub fn rotation(&self) -> &UnitQuaternion<f64> {
        &self.rotation
    }

    /// Viewing direction: the rotated +Y axis.
    pub fn forward(&self) -> Vector3<f64> {
        self.rotation * Vector3::y()
    }

    /// Image-plane U axis: the rotated +X axis.
    pub fn x_axis(&self) -> Vector3<f64> {
        self.rotation * Vector3::x()
    }

    /// Image-plane V axis: the rotated +Z axis.
    pub fn y_axis(&self) -> Vector3<f64> {
        self.rotation * Vector3::z()
    }
}

/// Generate the `n + 2` frames of a regular `n`-gon cylinder.
///
/// Frames `0..n` rotate about +Z by `i · 360°/n`. Frame `n` is the north pole
/// and frame `n + 1` the south pole. The order matters: the last two frames
/// are the ones penalised by [`select_best_frame`].
///
/// # Errors
///
/// Returns [`UvError::InvalidParameter`] if `n < 3`.
pub fn generate_frames(n: usize) -> Result<Vec<OrientationFrame>> {
    if n < 3 {
        return Err(UvError::invalid_param("vertices", n, "must be at least 3"));
    }

    let step = TAU / n as f64;
    let mut frames: Vec<OrientationFrame> = (0..n)
        .map(|i| {
            let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), i as f64 * step);
            OrientationFrame::new(i, FrameKind::Side, rotation)
        })
        .collect();

    // Tilted +90° about -X: forward becomes -Z, V stays +Y.
    let side_axis = Unit::new_normalize(-Vector3::x());
    frames.push(OrientationFrame::new(
        n,
        FrameKind::NorthPole,
        UnitQuaternion::from_axis_angle(&side_axis, FRAC_PI_2),
    ));
    frames.push(OrientationFrame::new(
        n + 1,
        FrameKind::SouthPole,
        UnitQuaternion::from_axis_angle(&side_axis, -FRAC_PI_2),
    ));

    Ok(frames)
}

/// Pick the frame whose forward axis is most anti-parallel to `normal`.
///
/// Each frame scores `-angle(normal, forward)`; the two caps additionally pay
/// `cap_penalty_degrees`. The lowest score wins and the earliest frame wins a
/// tie, so sides beat caps at zero penalty. A zero-length normal always
/// selects the north pole.
///
/// # Panics
///
/// Panics if `frames` was not produced by [`generate_frames`] (fewer than
/// two frames).
pub fn select_best_frame<'a>(
    normal: &Vector3<f64>,
    frames: &'a [OrientationFrame],
    cap_penalty_degrees: f64,
) -> &'a OrientationFrame {
    let north = &frames[frames.len() - 2];
    if normal.norm() < EPSILON {
        return north;
    }

    let penalty = cap_penalty_degrees.to_radians();
    let mut best = north;
    let mut best_score = f64::INFINITY;

    for frame in frames {
        let Some(angle) = angle_between(normal, &frame.forward()) else {
            continue;
        };
        let mut score = -angle;
        if frame.is_pole() {
            score += penalty;
        }
        if score < best_score {
            best_score = score;
            best = frame;
        }
    }

    best
}
