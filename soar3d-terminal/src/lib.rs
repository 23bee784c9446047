//! Terminal front end: renders the demo world through the soar3d pipeline
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    terminal::{self},
};
use soar3d_core::{
    orbit::DEAD_ZONE, Camera, CameraMan, CameraMode, Color, ConfigError, EngineConfig, Font,
    FontStyle, OrbitControl, Overlay, Scene, SceneError, SharedSubject, Surface,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod world;

pub use renderer::TerminalSurface;
pub use world::World;

const FRAMES_PER_SECOND: u64 = 25;

/// Frames an arrow key keeps the orbit drag held
const DRAG_FRAMES: u32 = 6;

/// Seconds between gaggle members asking for the group camera
const LEAD_CHANGE_SECS: f32 = 8.0;

/// Errors that end the application
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Key legend along the bottom row
struct KeyHelp;

impl Overlay for KeyHelp {
    fn name(&self) -> &str {
        "key-help"
    }

    fn render(&self, camera: &Camera, surface: &mut dyn Surface) {
        let (_, height) = camera.screen_size();
        surface.set_font(&Font::new("mono", FontStyle::Plain, 1));
        surface.set_color(Color::GRAY);
        surface.draw_string(
            "1 self  2 group  3 plan  4 tile  arrows orbit  wasd pan  ijkl look  u user  q quit",
            0,
            height as i32 - 1,
        );
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    config: EngineConfig,
    scene: Scene,
    world: World,
    camera: Camera,
    camera_man: CameraMan,
    orbit: OrbitControl,
    drag_frames: u32,
    user_mode: bool,
    lead_timer: f32,
    surface: TerminalSurface,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: EngineConfig) -> Result<Self, AppError> {
        let (columns, rows) = terminal::size()?;
        Self::with_size(config, columns as usize, rows as usize)
    }

    /// Build the app for a terminal of `columns` x `rows` cells
    pub fn with_size(config: EngineConfig, columns: usize, rows: usize) -> Result<Self, AppError> {
        config.validate()?;

        let mut scene = Scene::new();
        scene.add_overlay(Box::new(KeyHelp));
        let world = World::build(&mut scene, config.cut.tile_width)?;

        let surface = TerminalSurface::new(columns, rows, config.view.background);
        let (width, height) = surface.pixel_size();
        let mut camera = Camera::with_config(width, height, config.view.clone());

        let mut camera_man = CameraMan::new(config.cut.clone());
        let user: SharedSubject = world.user.clone();
        let leader: SharedSubject = world.leader();
        let tile: SharedSubject = world.tile.clone();
        camera_man.set_primary(user);
        camera_man.set_secondary(leader);
        camera_man.set_tile_subject(tile);
        camera_man.set_user_mode(true);
        camera_man.set_mode(&mut camera, CameraMode::SelfView);

        Ok(Self {
            config,
            scene,
            world,
            camera,
            camera_man,
            orbit: OrbitControl::new(),
            drag_frames: 0,
            user_mode: true,
            lead_timer: 0.0,
            surface,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_man(&self) -> &CameraMan {
        &self.camera_man
    }

    pub fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        let target_frame_time = Duration::from_millis(1000 / FRAMES_PER_SECOND);
        let dt = target_frame_time.as_secs_f32();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                match event::read()? {
                    Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                        self.handle_key(code)
                    }
                    Event::Resize(columns, rows) => self.resize(columns as usize, rows as usize),
                    _ => {}
                }
            }

            self.step(dt);

            let mut stdout = stdout();
            queue!(stdout, cursor::MoveTo(0, 0))?;
            self.surface.draw(&mut stdout)?;
            stdout.flush()?;

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

    pub fn handle_key(&mut self, code: KeyCode) {
        let mode = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
                None
            }
            KeyCode::Char('1') => Some(CameraMode::SelfView),
            KeyCode::Char('2') => Some(CameraMode::Group),
            KeyCode::Char('3') => Some(CameraMode::Plan),
            KeyCode::Char('4') => Some(CameraMode::Tile),
            KeyCode::Char('u') => {
                self.user_mode = !self.user_mode;
                self.camera_man.set_user_mode(self.user_mode);
                None
            }
            KeyCode::Left => self.hold_drag(-2.0 * DEAD_ZONE, 0.0),
            KeyCode::Right => self.hold_drag(2.0 * DEAD_ZONE, 0.0),
            KeyCode::Up => self.hold_drag(0.0, -2.0 * DEAD_ZONE),
            KeyCode::Down => self.hold_drag(0.0, 2.0 * DEAD_ZONE),
            KeyCode::Char('w') => self.pan(1.0, 0.0),
            KeyCode::Char('s') => self.pan(-1.0, 0.0),
            KeyCode::Char('a') => self.pan(0.0, -1.0),
            KeyCode::Char('d') => self.pan(0.0, 1.0),
            KeyCode::Char('i') => self.look(1.0, 0.0),
            KeyCode::Char('k') => self.look(-1.0, 0.0),
            KeyCode::Char('j') => self.look(0.0, -1.0),
            KeyCode::Char('l') => self.look(0.0, 1.0),
            _ => None,
        };

        if let Some(mode) = mode {
            self.camera_man.set_mode(&mut self.camera, mode);
        }
    }

    fn hold_drag(&mut self, dx: f32, dy: f32) -> Option<CameraMode> {
        self.orbit.drag(dx, dy);
        self.drag_frames = DRAG_FRAMES;
        None
    }

    fn pan(&mut self, dx: f32, dy: f32) -> Option<CameraMode> {
        self.camera.move_by(dx, dy);
        None
    }

    /// Nudge only the focus, turning the view in place
    fn look(&mut self, dx: f32, dy: f32) -> Option<CameraMode> {
        self.camera.focus_offset(dx, dy);
        None
    }

    fn resize(&mut self, columns: usize, rows: usize) {
        log::debug!("Terminal resized to {}x{}", columns, rows);
        self.surface = TerminalSurface::new(columns, rows, self.config.view.background);
        let (width, height) = self.surface.pixel_size();
        let mut camera = Camera::with_config(width, height, self.config.view.clone());
        camera.set_eye(self.camera.eye());
        camera.set_focus(self.camera.focus());
        self.camera = camera;
    }

    /// Advance the world by `dt` seconds and draw a frame into the surface
    pub fn step(&mut self, dt: f32) {
        self.world.update(&mut self.scene, dt);

        self.lead_timer += dt;
        if self.lead_timer >= LEAD_CHANGE_SECS {
            self.lead_timer = 0.0;
            let leader: SharedSubject = self.world.rotate_leader();
            self.camera_man.set_secondary(leader.clone());
            if self.camera_man.cut_to(&self.camera, &leader, false) {
                log::info!("Group camera cut to new leader");
            }
        }

        self.camera_man.tick(&mut self.camera);
        self.orbit.update(&mut self.camera, dt);
        if self.drag_frames > 0 {
            self.drag_frames -= 1;
            if self.drag_frames == 0 {
                self.orbit.release();
            }
        }

        self.surface.clear();
        {
            let tile = self.world.tile.borrow();
            self.scene
                .render(&mut self.camera, Some(&*tile), Some(&mut self.surface));
        }
        self.draw_status();
    }

    fn draw_status(&mut self) {
        let status = format!(
            "soar3d | {:?}{} | FPS {:.1}",
            self.camera_man.mode(),
            if self.camera_man.is_cutting() { " (cut)" } else { "" },
            self.fps
        );
        self.surface.set_font(&Font::new("mono", FontStyle::Bold, 1));
        let ink = if self.config.view.background.luminance() > 0.5 {
            Color::BLACK
        } else {
            Color::WHITE
        };
        self.surface.set_color(ink);
        self.surface.draw_string(&status, 0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> TerminalApp {
        TerminalApp::with_size(EngineConfig::default(), 80, 24).unwrap()
    }

    #[test]
    fn test_starts_cutting_to_user_glider() {
        let app = app();
        assert_eq!(app.camera_man().mode(), CameraMode::SelfView);
        assert!(app.camera_man().is_cutting());
        assert_eq!(app.camera().screen_size(), (80, 48));
    }

    #[test]
    fn test_mode_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.camera_man().mode(), CameraMode::Plan);
        app.handle_key(KeyCode::Char('4'));
        assert_eq!(app.camera_man().mode(), CameraMode::Tile);
        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.camera_man().mode(), CameraMode::Group);
    }

    #[test]
    fn test_look_key_moves_focus_only() {
        let mut app = app();
        let (eye, focus) = (app.camera().eye(), app.camera().focus());
        app.handle_key(KeyCode::Char('l'));
        assert_eq!(app.camera().eye(), eye);
        assert_eq!(app.camera().focus(), focus + nalgebra::Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_status_bold_help_plain() {
        let mut app = app();
        app.step(0.04);
        assert!(app.surface().is_bold_at(0, 0));
        assert!(!app.surface().is_bold_at(0, 23));
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_step_draws_scene_and_status() {
        let mut app = app();
        for _ in 0..10 {
            app.step(0.04);
        }
        let surface = app.surface();
        assert_eq!(surface.text_at(0, 0), Some('s'));
        assert_eq!(surface.text_at(0, 23), Some('1'));

        let (w, h) = surface.pixel_size();
        let painted = (0..h as usize)
            .flat_map(|y| (0..w as usize).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.pixel(x, y) != Color::WHITE)
            .count();
        assert!(painted > 0);
    }

    #[test]
    fn test_orbit_key_turns_eye() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        let before = app.camera().eye() - app.camera().focus();
        app.handle_key(KeyCode::Right);
        app.step(0.04);
        let after = app.camera().eye() - app.camera().focus();
        assert!((before.y.atan2(before.x) - after.y.atan2(after.x)).abs() > 1e-4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.view.vision_depth = 0.0;
        assert!(matches!(
            TerminalApp::with_size(config, 80, 24),
            Err(AppError::Config(_))
        ));
    }
}
