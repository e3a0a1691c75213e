/// Render primitives shared by every canvas implementation
use nalgebra::{Point3, Vector3};

/// Tolerance below which a vector is treated as degenerate
pub const EPSILON: f32 = 1e-6;

/// An RGB color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A shaded vertex with position, normal and color
#[derive(Debug, Clone, Copy)]
pub struct RenderVertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub color: Color,
}

impl RenderVertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, color: Color) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct RenderTriangle {
    pub vertices: [RenderVertex; 3],
}

impl RenderTriangle {
    pub fn new(v0: RenderVertex, v1: RenderVertex, v2: RenderVertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal derived from the vertex winding (right-hand rule)
    pub fn winding_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let cross = (v1 - v0).cross(&(v2 - v0));
        if cross.norm() < EPSILON {
            return Vector3::zeros();
        }
        cross.normalize()
    }

    /// Average of the stored vertex normals, falling back to the winding
    /// normal when the stored ones cancel out
    pub fn shading_normal(&self) -> Vector3<f32> {
        let sum = self.vertices[0].normal + self.vertices[1].normal + self.vertices[2].normal;
        if sum.norm() > EPSILON {
            return sum.normalize();
        }
        self.winding_normal()
    }
}

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// An inverted box that grows to fit included points
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut bounds = Self::empty();
        for point in points {
            bounds.include(&point);
        }
        bounds
    }

    /// True while no point has been included
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn include(&mut self, point: &Point3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Extents along x, y and z; an empty box reports zero
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        if self.is_empty() {
            return Point3::origin();
        }
        self.min + (self.max - self.min) * 0.5
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        [
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.max.z),
        ]
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build the 12 white triangles of an axis-aligned cube, used by demos
/// and tests
pub fn cube_triangles(size: f32) -> Vec<RenderTriangle> {
    let half = size / 2.0;
    let mut triangles = Vec::with_capacity(12);

    let mut quad = |normal: Vector3<f32>, corners: [Point3<f32>; 4]| {
        let vertex = |p: Point3<f32>| RenderVertex::new(p, normal, Color::WHITE);
        triangles.push(RenderTriangle::new(
            vertex(corners[0]),
            vertex(corners[1]),
            vertex(corners[2]),
        ));
        triangles.push(RenderTriangle::new(
            vertex(corners[0]),
            vertex(corners[2]),
            vertex(corners[3]),
        ));
    };

    // Front face
    quad(
        Vector3::new(0.0, 0.0, 1.0),
        [
            Point3::new(-half, -half, half),
            Point3::new(half, -half, half),
            Point3::new(half, half, half),
            Point3::new(-half, half, half),
        ],
    );
    // Back face
    quad(
        Vector3::new(0.0, 0.0, -1.0),
        [
            Point3::new(half, -half, -half),
            Point3::new(-half, -half, -half),
            Point3::new(-half, half, -half),
            Point3::new(half, half, -half),
        ],
    );
    // Top face
    quad(
        Vector3::new(0.0, 1.0, 0.0),
        [
            Point3::new(-half, half, half),
            Point3::new(half, half, half),
            Point3::new(half, half, -half),
            Point3::new(-half, half, -half),
        ],
    );
    // Bottom face
    quad(
        Vector3::new(0.0, -1.0, 0.0),
        [
            Point3::new(-half, -half, -half),
            Point3::new(half, -half, -half),
            Point3::new(half, -half, half),
            Point3::new(-half, -half, half),
        ],
    );
    // Right face
    quad(
        Vector3::new(1.0, 0.0, 0.0),
        [
            Point3::new(half, -half, half),
            Point3::new(half, -half, -half),
            Point3::new(half, half, -half),
            Point3::new(half, half, half),
        ],
    );
    // Left face
    quad(
        Vector3::new(-1.0, 0.0, 0.0),
        [
            Point3::new(-half, -half, -half),
            Point3::new(-half, -half, half),
            Point3::new(-half, half, half),
            Point3::new(-half, half, -half),
        ],
    );

    triangles
}
