/// Camera and projection utilities shared by preview backends
use nalgebra::{Matrix4, Point3, Vector3};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Combined view and projection, computed once per frame by renderers
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Project a world point through a view-projection matrix onto a
/// width-by-height grid. Returns (column, row, depth), or None when the
/// point falls outside the frustum or behind the eye. Depth grows with
/// distance and is comparable between points.
pub fn project_to_screen(
    view_projection: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = view_projection * point.to_homogeneous();

    // Points at or behind the eye have non-positive clip w
    if clip.w < 1e-6 {
        return None;
    }
    let ndc = clip.xyz() / clip.w;

    // Clip test
    if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 || ndc.z < -1.0 || ndc.z > 1.0 {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

    Some((screen_x, screen_y, ndc.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_project_centered_point() {
        let camera = Camera::new(80, 40);
        let vp = camera.view_projection();

        let (x, y, depth) = project_to_screen(&vp, &Point3::origin(), 80, 40).unwrap();
        assert!((x - 40.0).abs() < 1e-3);
        assert!((y - 20.0).abs() < 1e-3);
        assert!((-1.0..=1.0).contains(&depth));
    }

    #[test]
    fn test_project_depth_ordering() {
        let camera = Camera::new(80, 40);
        let vp = camera.view_projection();

        let (_, _, near) = project_to_screen(&vp, &Point3::new(0.0, 0.0, 1.0), 80, 40).unwrap();
        let (_, _, far) = project_to_screen(&vp, &Point3::new(0.0, 0.0, -1.0), 80, 40).unwrap();
        assert!(near < far);
    }

    #[test]
    fn test_project_rejects_behind_camera() {
        let camera = Camera::new(80, 40);
        let vp = camera.view_projection();
        assert!(project_to_screen(&vp, &Point3::new(0.0, 0.0, 7.0), 80, 40).is_none());
    }

    #[test]
    fn test_orthographic_projection() {
        let mut camera = Camera::new(80, 80);
        camera.mode = ProjectionMode::Orthographic;
        let vp = camera.view_projection();

        // Distance from the camera does not change the footprint
        let (x1, y1, _) = project_to_screen(&vp, &Point3::new(1.0, 0.0, 0.0), 80, 80).unwrap();
        let (x2, y2, _) = project_to_screen(&vp, &Point3::new(1.0, 0.0, 2.0), 80, 80).unwrap();
        assert!((x1 - x2).abs() < 1e-3);
        assert!((y1 - y2).abs() < 1e-3);
    }
}
