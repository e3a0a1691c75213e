/// STL loading: mesh descriptors and the stl_io-backed face reader
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::geometry::{Color, RenderTriangle, RenderVertex, EPSILON};
use crate::transform::Pose;

/// Everything needed to materialize one mesh file on a canvas
#[derive(Debug, Clone)]
pub struct MeshDescriptor {
    pub path: PathBuf,
    /// Per-axis multipliers applied to the grouped object's extents
    pub scale: Vector3<f32>,
    /// Placement of the grouped object's anchor and frame
    pub pose: Pose,
}

impl MeshDescriptor {
    pub fn new(path: impl Into<PathBuf>, scale: Vector3<f32>, pose: Pose) -> Self {
        Self {
            path: path.into(),
            scale,
            pose,
        }
    }

    /// Descriptor with unit scale at the identity pose
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Vector3::new(1.0, 1.0, 1.0), Pose::identity())
    }
}

/// Read an STL file (binary or ASCII, auto-detected) into flat-shaded
/// white triangles, one per face in file order. Vertex winding is kept
/// as stored; all three vertices of a face share the face normal.
pub fn read_stl_triangles(path: &Path) -> Result<Vec<RenderTriangle>> {
    let file = File::open(path).map_err(|source| Error::MeshLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mesh = stl_io::read_stl(&mut reader).map_err(|source| Error::MeshLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let mut triangles = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        let corners = [
            vertex_point(&mesh, face.vertices[0]),
            vertex_point(&mesh, face.vertices[1]),
            vertex_point(&mesh, face.vertices[2]),
        ];
        let normal = face_normal(face, &corners);
        triangles.push(RenderTriangle::new(
            RenderVertex::new(corners[0], normal, Color::WHITE),
            RenderVertex::new(corners[1], normal, Color::WHITE),
            RenderVertex::new(corners[2], normal, Color::WHITE),
        ));
    }
    Ok(triangles)
}

fn vertex_point(mesh: &stl_io::IndexedMesh, index: usize) -> Point3<f32> {
    let vertex = &mesh.vertices[index];
    Point3::new(vertex[0], vertex[1], vertex[2])
}

/// Unit face normal. Exporters sometimes write null normals, in which
/// case the normal is rebuilt from the vertex winding.
fn face_normal(face: &stl_io::IndexedTriangle, corners: &[Point3<f32>; 3]) -> Vector3<f32> {
    let stored = Vector3::new(face.normal[0], face.normal[1], face.normal[2]);
    if stored.norm() > EPSILON {
        return stored.normalize();
    }

    let wound = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
    if wound.norm() > EPSILON {
        wound.normalize()
    } else {
        stored
    }
}
