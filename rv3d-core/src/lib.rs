/// RV3D Core Library - STL import and retained scene graph
///
/// This library provides the stateless core for turning STL files into
/// grouped visual objects on a canvas, re-anchoring those objects, and
/// the camera/projection math preview backends share.

pub mod error;
pub mod geometry;
pub mod import;
pub mod projection;
pub mod scene;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use error::{Error, Result};
pub use geometry::{Aabb, Color, RenderTriangle, RenderVertex};
pub use import::{import_mesh, relocate_origin};
pub use projection::{Camera, ProjectionMode};
pub use scene::{Canvas, GroupMembers, GroupSpec, ObjectId, Scene, TriangleId, VisualObject};
pub use stl::MeshDescriptor;
pub use transform::{Pose, Turntable};
