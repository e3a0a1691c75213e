/// Terminal-based ASCII preview for rv3d scenes
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::{Point3, Vector3};
use rv3d_core::{Camera, Canvas, ObjectId, Scene, Turntable};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

/// Main application struct for terminal scene preview
pub struct TerminalApp {
    scene: Scene,
    subject: ObjectId,
    spin: Turntable,
    auto_spin: bool,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Build an app that spins `subject` about its anchor, with the
    /// camera pulled back far enough to frame the whole sweep
    pub fn new(scene: Scene, subject: ObjectId) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        let mut camera = Camera::new(width as u32, height as u32);
        camera.aspect = width as f32 / (height as f32 * CELL_ASPECT);

        let anchor = scene
            .object(subject)
            .map(|object| object.pos)
            .unwrap_or_else(Point3::origin);
        let bounds = scene.world_bounds();
        if !bounds.is_empty() {
            let radius = bounds
                .corners()
                .iter()
                .map(|corner| (corner - anchor).norm())
                .fold(0.0f32, f32::max)
                .max(1e-3);
            camera.target = anchor;
            camera.position = anchor + Vector3::new(0.0, 0.0, 2.4 * radius);
            camera.far = camera.far.max(10.0 * radius);
        }

        Ok(Self {
            scene,
            subject,
            spin: Turntable::new(0.3, 0.3),
            auto_spin: true,
            camera,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            self.update();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('w') | KeyCode::Up => {
                    self.spin.spin(0.0, 0.1);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    self.spin.spin(0.0, -0.1);
                }
                KeyCode::Char('a') | KeyCode::Left => {
                    self.spin.spin(-0.1, 0.0);
                }
                KeyCode::Char('d') | KeyCode::Right => {
                    self.spin.spin(0.1, 0.0);
                }
                KeyCode::Char(' ') => {
                    self.auto_spin = !self.auto_spin;
                }
                KeyCode::Char('r') => {
                    self.spin = Turntable::new(0.3, 0.3);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn update(&mut self) {
        if self.auto_spin {
            // Continuous slow rotation for demo effect
            self.spin.spin(0.015, 0.01);
        }

        // Orbit by steering the subject's frame
        let (axis, up) = self.spin.frame();
        if let Some(object) = self.scene.object_mut(self.subject) {
            object.axis = axis;
            object.up = up;
        }
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render scene
        self.renderer.render_scene(&self.scene, &self.camera);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "RV3D Terminal Preview | FPS: {:.1} | Controls: WASD/Arrows=Spin Space=Pause R=Reset Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
