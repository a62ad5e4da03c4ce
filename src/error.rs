//! Error types for pixel-uv.
//!
//! This module defines all error types used throughout the library.
//! Degenerate geometry (zero-length normals, zero-size bounds, empty
//! selections) is never an error: operators fall back to a defined result.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`UvError`].
pub type Result<T> = std::result::Result<T, UvError>;

/// Errors that can occur while building meshes or running UV operators.
#[derive(Error, Debug)]
pub enum UvError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is degenerate (fewer than 3 corners or duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The same directed edge is used by two faces.
    #[error("edge ({v0}, {v1}) is used twice in the same direction")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A per-corner UV list does not match the corner count of its face.
    #[error("face {face} has {corners} corners but {uvs} UVs were given")]
    UvCountMismatch {
        /// The face index.
        face: usize,
        /// Number of corners of the face.
        corners: usize,
        /// Number of UVs supplied.
        uvs: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// The edit context does not allow UV editing.
    #[error("operator requires a mesh in edit mode")]
    NotInEditMode,

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// The grid relaxation strategy failed.
    #[error("quad relaxation failed: {0}")]
    Relaxation(String),

    /// Processing of one island failed. Remaining islands were still processed.
    #[error("island {island} failed: {source}")]
    IslandFailed {
        /// Index of the island in partition order.
        island: usize,
        /// The underlying error.
        #[source]
        source: Box<UvError>,
    },
}

impl UvError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        UvError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Wrap an error raised while processing an island.
    pub fn island(island: usize, source: UvError) -> Self {
        UvError::IslandFailed {
            island,
            source: Box::new(source),
        }
    }
}
