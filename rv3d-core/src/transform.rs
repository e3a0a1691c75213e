/// Rigid poses, frame matrices and turntable state
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use crate::geometry::EPSILON;

/// A rigid placement: a position plus an orthonormal axis frame
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    pub position: Point3<f32>,
    pub x_axis: Vector3<f32>,
    pub y_axis: Vector3<f32>,
    pub z_axis: Vector3<f32>,
}

impl Pose {
    /// Build a pose from a position and approximate x/y directions.
    /// The axes are re-orthonormalized with z = x cross y.
    pub fn new(position: Point3<f32>, x_axis: Vector3<f32>, y_axis: Vector3<f32>) -> Self {
        let (x, y, z) = orthonormal_frame(x_axis, y_axis);
        Self {
            position,
            x_axis: x,
            y_axis: y,
            z_axis: z,
        }
    }

    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            x_axis: Vector3::x(),
            y_axis: Vector3::y(),
            z_axis: Vector3::z(),
        }
    }

    /// Read a pose off a rigid homogeneous transform: basis columns plus
    /// the translation column
    pub fn from_matrix(matrix: &Matrix4<f32>) -> Self {
        Self {
            position: Point3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]),
            x_axis: Vector3::new(matrix[(0, 0)], matrix[(1, 0)], matrix[(2, 0)]),
            y_axis: Vector3::new(matrix[(0, 1)], matrix[(1, 1)], matrix[(2, 1)]),
            z_axis: Vector3::new(matrix[(0, 2)], matrix[(1, 2)], matrix[(2, 2)]),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        let mut matrix = frame_matrix(&self.x_axis, &self.y_axis);
        matrix[(0, 3)] = self.position.x;
        matrix[(1, 3)] = self.position.y;
        matrix[(2, 3)] = self.position.z;
        matrix
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Orthonormal basis from approximate x and y directions. Degenerate
/// inputs fall back to the canonical axes.
pub fn orthonormal_frame(
    x_axis: Vector3<f32>,
    y_axis: Vector3<f32>,
) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
    let x = if x_axis.norm() > EPSILON {
        x_axis.normalize()
    } else {
        Vector3::x()
    };

    let mut z = x.cross(&y_axis);
    if z.norm() < EPSILON {
        // y is parallel to x (or zero), pick any perpendicular
        let fallback = if x.y.abs() > 0.9 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        z = x.cross(&fallback);
    }
    let z = z.normalize();
    let y = z.cross(&x);

    (x, y, z)
}

/// Rotation matrix mapping local x onto `axis` and local y toward `up`
pub fn frame_matrix(axis: &Vector3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
    let (x, y, z) = orthonormal_frame(*axis, *up);
    let mut matrix = Matrix4::identity();
    matrix[(0, 0)] = x.x;
    matrix[(1, 0)] = x.y;
    matrix[(2, 0)] = x.z;
    matrix[(0, 1)] = y.x;
    matrix[(1, 1)] = y.y;
    matrix[(2, 1)] = y.z;
    matrix[(0, 2)] = z.x;
    matrix[(1, 2)] = z.y;
    matrix[(2, 2)] = z.z;
    matrix
}

/// Axis/up frame for a yaw then pitch turntable orientation
pub fn turntable_frame(yaw: f32, pitch: f32) -> (Vector3<f32>, Vector3<f32>) {
    let spin = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch);
    (spin * Vector3::x(), spin * Vector3::y())
}

/// Accumulated yaw/pitch spin for turntable-style orbiting (in radians)
#[derive(Debug, Clone, Copy, Default)]
pub struct Turntable {
    pub yaw: f32,
    pub pitch: f32,
}

impl Turntable {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Advance the spin by delta angles (in radians)
    pub fn spin(&mut self, dyaw: f32, dpitch: f32) {
        self.yaw += dyaw;
        self.pitch += dpitch;
    }

    /// Axis/up frame for the current angles
    pub fn frame(&self) -> (Vector3<f32>, Vector3<f32>) {
        turntable_frame(self.yaw, self.pitch)
    }
}
