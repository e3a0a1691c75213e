/// Retained scene graph: the canvas seam, visual objects and world flattening
use std::collections::HashSet;

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::error::{Error, Result};
use crate::geometry::{Aabb, RenderTriangle, EPSILON};
use crate::transform::frame_matrix;

/// Handle to a triangle owned by a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriangleId(pub usize);

/// Handle to a grouped visual object owned by a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// Anchor and reference frame for a new group
#[derive(Debug, Clone, Copy)]
pub struct GroupSpec {
    /// Anchor point, in the coordinate space the members live in
    pub origin: Point3<f32>,
    /// Direction the group's length extent is measured along
    pub axis: Vector3<f32>,
    /// Direction the group's height extent is measured along
    pub up: Vector3<f32>,
}

impl Default for GroupSpec {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            axis: Vector3::x(),
            up: Vector3::y(),
        }
    }
}

/// Members adopted by a new group
#[derive(Debug, Clone)]
pub enum GroupMembers {
    Triangles(Vec<TriangleId>),
    Objects(Vec<ObjectId>),
}

/// A rigid grouped entity owned by a canvas.
///
/// Grouping freezes the members as captured and wraps them in a frame.
/// `pos` carries the anchor around, and rotating `axis`/`up` away from
/// the frame recorded at creation swings the members about the anchor.
/// `size` stretches the extents measured at group time, along the frame
/// directions. The anchor itself never changes after creation, so
/// re-anchoring means wrapping the object in a fresh group.
#[derive(Debug, Clone)]
pub struct VisualObject {
    origin: Point3<f32>,
    base_axis: Vector3<f32>,
    base_up: Vector3<f32>,
    natural_size: Vector3<f32>,
    /// Where the anchor currently sits in the parent frame
    pub pos: Point3<f32>,
    /// Local length direction
    pub axis: Vector3<f32>,
    /// Local height direction
    pub up: Vector3<f32>,
    /// Extents along the local frame: length, height, width
    pub size: Vector3<f32>,
    /// Hidden objects are skipped when the scene is flattened
    pub visible: bool,
    members: GroupMembers,
    parent: Option<ObjectId>,
}

impl VisualObject {
    pub(crate) fn new(members: GroupMembers, spec: GroupSpec, natural_size: Vector3<f32>) -> Self {
        Self {
            origin: spec.origin,
            base_axis: spec.axis,
            base_up: spec.up,
            natural_size,
            pos: spec.origin,
            axis: spec.axis,
            up: spec.up,
            size: natural_size,
            visible: true,
            members,
            parent: None,
        }
    }

    /// Anchor point fixed at group creation
    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    /// Extents the members spanned along the reference frame when the
    /// group was created
    pub fn natural_size(&self) -> Vector3<f32> {
        self.natural_size
    }

    /// Group this object has been adopted by, if any
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Extent along the axis direction
    pub fn length(&self) -> f32 {
        self.size.x
    }

    /// Extent along the up direction
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Extent along the remaining frame direction
    pub fn width(&self) -> f32 {
        self.size.z
    }

    /// Transform from member space into the parent frame: express members
    /// in the reference frame about the anchor, stretch to the current
    /// size, rotate into the current frame, then place at `pos`.
    ///
    /// At creation the current frame equals the reference frame and `pos`
    /// equals the anchor, so members start out exactly where they were.
    pub fn local_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.pos.coords)
            * frame_matrix(&self.axis, &self.up)
            * Matrix4::new_nonuniform_scaling(&self.stretch())
            * frame_matrix(&self.base_axis, &self.base_up).transpose()
            * Matrix4::new_translation(&-self.origin.coords)
    }

    /// Rotation-only part of the local transform, used for normals when
    /// the linear block cannot be inverted
    fn rotation_matrix(&self) -> Matrix3<f32> {
        (frame_matrix(&self.axis, &self.up)
            * frame_matrix(&self.base_axis, &self.base_up).transpose())
        .fixed_view::<3, 3>(0, 0)
        .into_owned()
    }

    /// Per-axis ratio of current size to natural size. Axes the members
    /// never spanned stay at ratio one.
    fn stretch(&self) -> Vector3<f32> {
        let ratio = |size: f32, natural: f32| {
            if natural.abs() > EPSILON {
                size / natural
            } else {
                1.0
            }
        };
        Vector3::new(
            ratio(self.size.x, self.natural_size.x),
            ratio(self.size.y, self.natural_size.y),
            ratio(self.size.z, self.natural_size.z),
        )
    }
}

/// The capability seam between scene producers and renderers. Importers
/// only ever talk to a canvas, so tests can substitute a recording fake.
pub trait Canvas {
    /// Create a standalone triangle entity
    fn create_triangle(&mut self, triangle: RenderTriangle) -> TriangleId;

    /// Group members into a new rigid object, adopting them. Adopted
    /// members stop rendering on their own and follow the group. Member
    /// handles must be distinct and not already adopted.
    fn create_group(&mut self, members: GroupMembers, spec: GroupSpec) -> Result<ObjectId>;

    fn object(&self, id: ObjectId) -> Option<&VisualObject>;

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut VisualObject>;
}

struct TriangleSlot {
    triangle: RenderTriangle,
    owner: Option<ObjectId>,
}

/// In-memory retained scene implementing `Canvas`
#[derive(Default)]
pub struct Scene {
    triangles: Vec<TriangleSlot>,
    objects: Vec<VisualObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&RenderTriangle> {
        self.triangles.get(id.0).map(|slot| &slot.triangle)
    }

    /// Flatten everything currently rendered into world-space triangles:
    /// unadopted standalone triangles plus every visible top-level object
    pub fn visible_world_triangles(&self) -> Vec<RenderTriangle> {
        let mut world = Vec::new();

        for slot in &self.triangles {
            if slot.owner.is_none() {
                world.push(slot.triangle.clone());
            }
        }

        let identity = Matrix4::identity();
        for index in 0..self.objects.len() {
            let object = &self.objects[index];
            if object.parent.is_none() && object.visible {
                self.collect_world_triangles(ObjectId(index), &identity, &mut world);
            }
        }

        world
    }

    /// Axis-aligned bounds of everything currently rendered
    pub fn world_bounds(&self) -> Aabb {
        Aabb::from_points(
            self.visible_world_triangles()
                .iter()
                .flat_map(|triangle| triangle.vertices.iter().map(|vertex| vertex.position)),
        )
    }

    fn collect_world_triangles(
        &self,
        id: ObjectId,
        parent: &Matrix4<f32>,
        world: &mut Vec<RenderTriangle>,
    ) {
        let object = &self.objects[id.0];
        let matrix = parent * object.local_matrix();
        // Normals take the inverse transpose of the linear block only, so
        // the translation row never bleeds in; a non-invertible block
        // (some extent collapsed to zero) falls back to the rotation alone
        let normal_matrix = matrix
            .fixed_view::<3, 3>(0, 0)
            .into_owned()
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(|| object.rotation_matrix());

        match &object.members {
            GroupMembers::Triangles(ids) => {
                for triangle_id in ids {
                    let mut triangle = self.triangles[triangle_id.0].triangle.clone();
                    for vertex in &mut triangle.vertices {
                        vertex.position = matrix.transform_point(&vertex.position);
                        let normal = normal_matrix * vertex.normal;
                        if normal.norm() > EPSILON {
                            vertex.normal = normal.normalize();
                        }
                    }
                    world.push(triangle);
                }
            }
            GroupMembers::Objects(ids) => {
                // Adopted members render through the group even when their
                // own visible flag is off
                for object_id in ids {
                    self.collect_world_triangles(*object_id, &matrix, world);
                }
            }
        }
    }

    /// Validate the member handles and measure the extents they span
    /// along the new group's reference frame
    fn member_bounds(&self, members: &GroupMembers, spec: &GroupSpec) -> Result<Aabb> {
        let into_frame = frame_matrix(&spec.axis, &spec.up)
            .fixed_view::<3, 3>(0, 0)
            .into_owned()
            .transpose();
        let mut bounds = Aabb::empty();

        let mut include = |position: &Point3<f32>| {
            bounds.include(&Point3::from(into_frame * (position - spec.origin)));
        };

        match members {
            GroupMembers::Triangles(ids) => {
                let mut seen = HashSet::new();
                for id in ids {
                    let slot = self
                        .triangles
                        .get(id.0)
                        .ok_or(Error::UnknownTriangle(*id))?;
                    if slot.owner.is_some() || !seen.insert(*id) {
                        return Err(Error::TriangleInUse(*id));
                    }
                    for vertex in &slot.triangle.vertices {
                        include(&vertex.position);
                    }
                }
            }
            GroupMembers::Objects(ids) => {
                let identity = Matrix4::identity();
                let mut seen = HashSet::new();
                for id in ids {
                    let object = self.objects.get(id.0).ok_or(Error::UnknownObject(*id))?;
                    if object.parent.is_some() || !seen.insert(*id) {
                        return Err(Error::ObjectInUse(*id));
                    }
                    let mut placed = Vec::new();
                    self.collect_world_triangles(*id, &identity, &mut placed);
                    for triangle in &placed {
                        for vertex in &triangle.vertices {
                            include(&vertex.position);
                        }
                    }
                }
            }
        }
        Ok(bounds)
    }
}

impl Canvas for Scene {
    fn create_triangle(&mut self, triangle: RenderTriangle) -> TriangleId {
        let id = TriangleId(self.triangles.len());
        self.triangles.push(TriangleSlot {
            triangle,
            owner: None,
        });
        id
    }

    fn create_group(&mut self, members: GroupMembers, spec: GroupSpec) -> Result<ObjectId> {
        let bounds = self.member_bounds(&members, &spec)?;
        let id = ObjectId(self.objects.len());

        match &members {
            GroupMembers::Triangles(ids) => {
                for triangle_id in ids {
                    self.triangles[triangle_id.0].owner = Some(id);
                }
            }
            GroupMembers::Objects(ids) => {
                for object_id in ids {
                    self.objects[object_id.0].parent = Some(id);
                }
            }
        }

        self.objects.push(VisualObject::new(members, spec, bounds.size()));
        Ok(id)
    }

    fn object(&self, id: ObjectId) -> Option<&VisualObject> {
        self.objects.get(id.0)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut VisualObject> {
        self.objects.get_mut(id.0)
    }
}
