/// ASCII rasterizer that draws flattened scenes to the terminal
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use rv3d_core::projection::project_to_screen;
use rv3d_core::{Camera, RenderTriangle, Scene};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// ASCII renderer that converts scene triangles to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Flatten the scene and draw every rendered world-space triangle
    pub fn render_scene(&mut self, scene: &Scene, camera: &Camera) {
        let view_projection = camera.view_projection();
        for triangle in scene.visible_world_triangles() {
            self.render_triangle(&triangle, &view_projection);
        }
    }

    fn render_triangle(&mut self, triangle: &RenderTriangle, view_projection: &Matrix4<f32>) {
        // Project vertices to screen space
        let mut screen = [(0.0f32, 0.0f32, 0.0f32); 3];
        for (corner, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            match project_to_screen(
                view_projection,
                &vertex.position,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *corner = projected,
                None => return, // Triangle is clipped
            }
        }

        let character = shading_character(triangle);
        self.rasterize_triangle(&screen, character);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Signed double area; its sign is the screen-space winding
        let area = edge_weight((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1));
        if area.abs() < 1e-6 {
            return; // Degenerate on screen
        }

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let w0 = edge_weight((v1.0, v1.1), (v2.0, v2.1), (px, py));
                let w1 = edge_weight((v2.0, v2.1), (v0.0, v0.1), (px, py));
                let w2 = edge_weight((v0.0, v0.1), (v1.0, v1.1), (px, py));

                // Inside when all weights share a side, either winding
                let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                    || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                if !inside {
                    continue;
                }

                // Interpolate depth
                let depth = (w0 * v0.2 + w1 * v1.2 + w2 * v2.2) / area;

                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            // Raw mode does not return the carriage on newline, so place
            // the cursor explicitly per row
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let c = self.char_buffer[y * self.width + x];

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// Number of cells covered by the last frame
    pub fn coverage(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }
}

/// Map the triangle's shading normal against a fixed headlight to a
/// ramp character
fn shading_character(triangle: &RenderTriangle) -> char {
    let light_dir = Vector3::new(0.0, 0.0, 1.0);
    let brightness = triangle.shading_normal().dot(&light_dir).max(0.0);

    let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
    LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Signed double area of (a, b, p); the sign tells which side of the
/// edge ab the point p lies on
fn edge_weight(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}
