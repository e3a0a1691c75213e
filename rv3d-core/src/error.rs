/// Error types shared across the rv3d crates
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::scene::{ObjectId, TriangleId};

/// Failures surfaced by mesh loading and scene operations
#[derive(Error, Debug)]
pub enum Error {
    /// The mesh file is missing, unreadable or not a valid STL
    #[error("failed to load mesh {}: {source}", path.display())]
    MeshLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The handle does not name an object known to the canvas
    #[error("unknown object handle {0:?}")]
    UnknownObject(ObjectId),

    /// The handle does not name a triangle known to the canvas
    #[error("unknown triangle handle {0:?}")]
    UnknownTriangle(TriangleId),

    /// The object already belongs to a group and cannot be adopted again
    #[error("object {0:?} already belongs to a group")]
    ObjectInUse(ObjectId),

    /// The triangle already belongs to a group and cannot be adopted again
    #[error("triangle {0:?} already belongs to a group")]
    TriangleInUse(TriangleId),
}

/// Result type alias using the crate's error type
pub type Result<T> = std::result::Result<T, Error>;
