/// Mesh import and origin relocation on top of any canvas
use nalgebra::Point3;

use crate::error::{Error, Result};
use crate::scene::{Canvas, GroupMembers, GroupSpec, ObjectId};
use crate::stl::{read_stl_triangles, MeshDescriptor};

/// Materialize an STL mesh as one grouped object on the canvas.
///
/// One triangle entity is created per face, in file order. The triangles
/// are grouped at the descriptor pose's position and frame, and the
/// grouped object's extents are then multiplied by the descriptor scale.
/// The raw vertex data is never touched.
pub fn import_mesh<C: Canvas>(descriptor: &MeshDescriptor, canvas: &mut C) -> Result<ObjectId> {
    let faces = read_stl_triangles(&descriptor.path)?;
    log::debug!(
        "loaded {} faces from {}",
        faces.len(),
        descriptor.path.display()
    );

    let mut members = Vec::with_capacity(faces.len());
    for face in faces {
        members.push(canvas.create_triangle(face));
    }

    let object = canvas.create_group(
        GroupMembers::Triangles(members),
        GroupSpec {
            origin: descriptor.pose.position,
            axis: descriptor.pose.x_axis,
            up: descriptor.pose.y_axis,
        },
    )?;

    let visual = canvas
        .object_mut(object)
        .ok_or(Error::UnknownObject(object))?;
    visual.size.x *= descriptor.scale.x;
    visual.size.y *= descriptor.scale.y;
    visual.size.z *= descriptor.scale.z;

    Ok(object)
}

/// Shift `object` so the point currently at `current_origin` lands at
/// `desired_origin`, hide it, and wrap it in a fresh group anchored at
/// the world origin on the canonical frame. The wrapper is returned and
/// supersedes the original object, which keeps rendering through it.
pub fn relocate_origin<C: Canvas>(
    object: ObjectId,
    current_origin: Point3<f32>,
    desired_origin: Point3<f32>,
    canvas: &mut C,
) -> Result<ObjectId> {
    let delta = desired_origin - current_origin;

    let visual = canvas
        .object_mut(object)
        .ok_or(Error::UnknownObject(object))?;
    if visual.parent().is_some() {
        return Err(Error::ObjectInUse(object));
    }
    visual.pos += delta;
    visual.visible = false;

    let wrapper = canvas.create_group(GroupMembers::Objects(vec![object]), GroupSpec::default())?;
    log::debug!("rewrapped {:?} as {:?}", object, wrapper);
    Ok(wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RenderTriangle;
    use crate::scene::{Scene, TriangleId, VisualObject};
    use crate::transform::Pose;
    use nalgebra::Vector3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn stl_vertex(x: f32, y: f32, z: f32) -> stl_io::Vertex {
        stl_io::Vertex::new([x, y, z])
    }

    fn write_fixture(triangles: &[stl_io::Triangle]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        stl_io::write_stl(&mut file, triangles.iter()).unwrap();
        file.flush().unwrap();
        file
    }

    /// Unit square in the xy plane, two counter-clockwise faces
    fn square_fixture() -> NamedTempFile {
        let normal = stl_io::Normal::new([0.0, 0.0, 1.0]);
        write_fixture(&[
            stl_io::Triangle {
                normal,
                vertices: [
                    stl_vertex(0.0, 0.0, 0.0),
                    stl_vertex(1.0, 0.0, 0.0),
                    stl_vertex(1.0, 1.0, 0.0),
                ],
            },
            stl_io::Triangle {
                normal,
                vertices: [
                    stl_vertex(0.0, 0.0, 0.0),
                    stl_vertex(1.0, 1.0, 0.0),
                    stl_vertex(0.0, 1.0, 0.0),
                ],
            },
        ])
    }

    /// Canvas fake that records every call made against it
    #[derive(Default)]
    struct RecordingCanvas {
        triangles: Vec<RenderTriangle>,
        groups: Vec<(GroupMembers, GroupSpec)>,
        objects: Vec<VisualObject>,
    }

    impl Canvas for RecordingCanvas {
        fn create_triangle(&mut self, triangle: RenderTriangle) -> TriangleId {
            let id = TriangleId(self.triangles.len());
            self.triangles.push(triangle);
            id
        }

        fn create_group(&mut self, members: GroupMembers, spec: GroupSpec) -> Result<ObjectId> {
            let id = ObjectId(self.objects.len());
            self.groups.push((members.clone(), spec));
            self.objects
                .push(VisualObject::new(members, spec, Vector3::new(1.0, 1.0, 1.0)));
            Ok(id)
        }

        fn object(&self, id: ObjectId) -> Option<&VisualObject> {
            self.objects.get(id.0)
        }

        fn object_mut(&mut self, id: ObjectId) -> Option<&mut VisualObject> {
            self.objects.get_mut(id.0)
        }
    }

    #[test]
    fn test_import_call_pattern() {
        let fixture = square_fixture();
        let descriptor = MeshDescriptor::new(
            fixture.path(),
            Vector3::new(2.0, 3.0, 4.0),
            Pose::new(
                Point3::new(1.0, 2.0, 3.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(-1.0, 0.0, 0.0),
            ),
        );

        let mut canvas = RecordingCanvas::default();
        let object = import_mesh(&descriptor, &mut canvas).unwrap();

        // One triangle per face, then one group adopting exactly those
        assert_eq!(canvas.triangles.len(), 2);
        assert_eq!(canvas.groups.len(), 1);
        let (members, spec) = &canvas.groups[0];
        match members {
            GroupMembers::Triangles(ids) => {
                assert_eq!(ids, &[TriangleId(0), TriangleId(1)]);
            }
            GroupMembers::Objects(_) => panic!("expected triangle members"),
        }
        assert!((spec.origin - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-6);
        assert!((spec.axis - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        assert!((spec.up - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-6);

        // Scale lands on the grouped object's extents
        let visual = canvas.object(object).unwrap();
        assert!((visual.size - Vector3::new(2.0, 3.0, 4.0)).norm() < 1e-6);
    }

    #[test]
    fn test_import_unit_square() {
        let fixture = square_fixture();
        let descriptor = MeshDescriptor::new(
            fixture.path(),
            Vector3::new(2.0, 1.0, 1.0),
            Pose::identity(),
        );

        let mut scene = Scene::new();
        let object = import_mesh(&descriptor, &mut scene).unwrap();

        assert_eq!(scene.triangle_count(), 2);
        assert_eq!(scene.object_count(), 1);

        let visual = scene.object(object).unwrap();
        assert!((visual.natural_size() - Vector3::new(1.0, 1.0, 0.0)).norm() < 1e-6);
        assert!((visual.length() - 2.0).abs() < 1e-6);
        assert!((visual.height() - 1.0).abs() < 1e-6);
        assert!(visual.width().abs() < 1e-6);

        // Raw member data is untouched by the extent scaling
        let stored = scene.triangle(TriangleId(0)).unwrap();
        assert!((stored.vertices[1].position - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);

        // The rendered geometry is stretched to double length
        let world = scene.visible_world_triangles();
        assert_eq!(world.len(), 2);
        assert!((world[0].vertices[1].position - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-6);
        assert!((world[0].vertices[2].position - Point3::new(2.0, 1.0, 0.0)).norm() < 1e-6);
        assert!((world[0].vertices[0].normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_import_zero_scale_collapses_axis() {
        let fixture = square_fixture();
        let descriptor = MeshDescriptor::new(
            fixture.path(),
            Vector3::new(0.0, 1.0, 1.0),
            Pose::identity(),
        );

        let mut scene = Scene::new();
        let object = import_mesh(&descriptor, &mut scene).unwrap();

        let visual = scene.object(object).unwrap();
        assert!(visual.length().abs() < 1e-6);
        assert!((visual.height() - 1.0).abs() < 1e-6);

        // The flattening matrix is singular along x, yet the geometry
        // still renders with well-formed normals
        let world = scene.visible_world_triangles();
        assert_eq!(world.len(), 2);
        for triangle in &world {
            for vertex in &triangle.vertices {
                assert!(vertex.position.x.abs() < 1e-6);
                assert!((vertex.normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-5);
            }
        }
    }

    #[test]
    fn test_import_at_pose_keeps_geometry_in_place() {
        let fixture = square_fixture();
        let descriptor = MeshDescriptor::new(
            fixture.path(),
            Vector3::new(1.0, 1.0, 1.0),
            Pose::new(
                Point3::new(1.0, 2.0, 3.0),
                Vector3::x(),
                Vector3::y(),
            ),
        );

        let mut scene = Scene::new();
        let object = import_mesh(&descriptor, &mut scene).unwrap();

        // The pose anchors the object without displacing the mesh
        let visual = scene.object(object).unwrap();
        assert!((visual.origin() - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-6);
        assert!((visual.pos - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-6);

        let world = scene.visible_world_triangles();
        assert!((world[0].vertices[0].position - Point3::origin()).norm() < 1e-6);
        assert!((world[0].vertices[1].position - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_import_empty_mesh() {
        let fixture = write_fixture(&[]);
        let descriptor = MeshDescriptor::from_path(fixture.path());

        let mut scene = Scene::new();
        let object = import_mesh(&descriptor, &mut scene).unwrap();

        assert_eq!(scene.triangle_count(), 0);
        let visual = scene.object(object).unwrap();
        assert!(visual.natural_size().norm() < 1e-6);
        assert!(scene.visible_world_triangles().is_empty());
    }

    #[test]
    fn test_import_missing_file() {
        let descriptor = MeshDescriptor::from_path("no/such/mesh.stl");
        let mut scene = Scene::new();
        let result = import_mesh(&descriptor, &mut scene);
        assert!(matches!(result, Err(Error::MeshLoad { .. })));
        // Nothing half-created
        assert_eq!(scene.triangle_count(), 0);
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_relocate_translates_and_wraps() {
        let fixture = square_fixture();
        let mut scene = Scene::new();
        let object = import_mesh(&MeshDescriptor::from_path(fixture.path()), &mut scene).unwrap();

        let wrapper = relocate_origin(
            object,
            Point3::new(1.0, 2.0, 3.0),
            Point3::origin(),
            &mut scene,
        )
        .unwrap();

        let child = scene.object(object).unwrap();
        assert!((child.pos - Point3::new(-1.0, -2.0, -3.0)).norm() < 1e-6);
        assert!(!child.visible);
        assert_eq!(child.parent(), Some(wrapper));

        let wrapped = scene.object(wrapper).unwrap();
        assert!((wrapped.origin() - Point3::origin()).norm() < 1e-6);
        assert!((wrapped.pos - Point3::origin()).norm() < 1e-6);
        assert!((wrapped.axis - Vector3::x()).norm() < 1e-6);
        assert!((wrapped.up - Vector3::y()).norm() < 1e-6);
        assert!(wrapped.visible);

        // The geometry follows the child's translation through the wrapper
        let world = scene.visible_world_triangles();
        assert_eq!(world.len(), 2);
        assert!((world[0].vertices[0].position - Point3::new(-1.0, -2.0, -3.0)).norm() < 1e-6);
        assert!((world[0].vertices[1].position - Point3::new(0.0, -2.0, -3.0)).norm() < 1e-6);
    }

    #[test]
    fn test_relocated_mesh_keeps_normals() {
        let fixture = square_fixture();
        let mut scene = Scene::new();
        let object = import_mesh(&MeshDescriptor::from_path(fixture.path()), &mut scene).unwrap();

        relocate_origin(
            object,
            Point3::origin(),
            Point3::new(0.0, 0.0, 2.0),
            &mut scene,
        )
        .unwrap();

        // Shifting the mesh must not touch its facing direction
        let world = scene.visible_world_triangles();
        assert_eq!(world.len(), 2);
        for triangle in &world {
            for vertex in &triangle.vertices {
                assert!((vertex.position.z - 2.0).abs() < 1e-6);
                assert!((vertex.normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
            }
        }
    }

    #[test]
    fn test_relocation_composes_additively() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 2.0, 0.0);
        let c = Point3::new(3.0, 3.0, -1.0);

        let fixture = square_fixture();

        let mut stepped = Scene::new();
        let object = import_mesh(&MeshDescriptor::from_path(fixture.path()), &mut stepped).unwrap();
        let middle = relocate_origin(object, a, b, &mut stepped).unwrap();
        relocate_origin(middle, b, c, &mut stepped).unwrap();

        let mut direct = Scene::new();
        let object = import_mesh(&MeshDescriptor::from_path(fixture.path()), &mut direct).unwrap();
        relocate_origin(object, a, c, &mut direct).unwrap();

        let stepped_world = stepped.visible_world_triangles();
        let direct_world = direct.visible_world_triangles();
        assert_eq!(stepped_world.len(), direct_world.len());
        for (lhs, rhs) in stepped_world.iter().zip(&direct_world) {
            for (left, right) in lhs.vertices.iter().zip(&rhs.vertices) {
                assert!((left.position - right.position).norm() < 1e-5);
            }
        }
    }

    #[test]
    fn test_relocate_rejects_bad_handles() {
        let mut scene = Scene::new();
        let missing = relocate_origin(
            ObjectId(4),
            Point3::origin(),
            Point3::origin(),
            &mut scene,
        );
        assert!(matches!(missing, Err(Error::UnknownObject(ObjectId(4)))));

        let fixture = square_fixture();
        let object = import_mesh(&MeshDescriptor::from_path(fixture.path()), &mut scene).unwrap();
        relocate_origin(object, Point3::origin(), Point3::new(1.0, 0.0, 0.0), &mut scene).unwrap();

        // The adopted child cannot be relocated again, and stays untouched
        let rewrap = relocate_origin(
            object,
            Point3::origin(),
            Point3::new(5.0, 0.0, 0.0),
            &mut scene,
        );
        assert!(matches!(rewrap, Err(Error::ObjectInUse(_))));
        let child = scene.object(object).unwrap();
        assert!((child.pos - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
