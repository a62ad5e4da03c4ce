//! UV algorithms.
//!
//! The building blocks the operators in [`crate::ops`] are made of:
//!
//! - **Orientation**: projection frames of a regular polygon cylinder
//! - **Islands**: partitioning faces into islands, temporary seams
//! - **Pixel**: pixel-grid move, snap and bounds rescale
//! - **Projection**: orthographic projection of islands onto frames
//! - **Follow quads**: ideal quad and quad-grid relaxation
//! - **Layout**: left-to-right shelf layout
//! - **Pack**: packer hand-off

pub mod follow_quads;
pub mod islands;
pub mod layout;
pub mod orientation;
pub mod pack;
pub mod pixel;
pub mod projection;
