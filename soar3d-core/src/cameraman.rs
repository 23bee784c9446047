//! Cinematic camera: subject tracking and smoothed cuts between viewpoints
use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::Vector3;

use crate::config::CutConfig;
use crate::projection::Camera;

/// Anything the camera can follow
pub trait Subject {
    /// Where the camera should sit to watch this subject
    fn eye(&self) -> Vector3<f32>;
    /// Where the camera should look
    fn focus(&self) -> Vector3<f32>;
}

/// Subjects are shared with the simulation that moves them
pub type SharedSubject = Rc<RefCell<dyn Subject>>;

/// What the camera is framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Follow the primary subject (the user's actor)
    #[default]
    SelfView,
    /// Follow the secondary subject (the group)
    Group,
    /// Fixed overhead framing
    Plan,
    /// Overview of the current terrain tile
    Tile,
}

#[derive(Debug, Clone, Copy, Default)]
struct Cut {
    /// Steps left; counts down from `cut_len`
    remaining: u32,
    eye_step: Vector3<f32>,
    focus_step: Vector3<f32>,
}

/// Moves a [`Camera`] after its subject, gliding between subjects with an
/// ease-in / ease-out cut.
///
/// Subjects must be cleared before they are dropped elsewhere; the camera
/// man keeps them alive while registered.
pub struct CameraMan {
    config: CutConfig,
    mode: CameraMode,
    user_mode: bool,

    primary: Option<SharedSubject>,
    secondary: Option<SharedSubject>,
    tile: Option<SharedSubject>,
    current: Option<SharedSubject>,

    cut: Cut,
    cooldown: u32,
    // Subject position as of the last tick
    eye_goto: Vector3<f32>,
    focus_goto: Vector3<f32>,
}

impl CameraMan {
    pub fn new(config: CutConfig) -> Self {
        Self {
            config,
            mode: CameraMode::default(),
            user_mode: true,
            primary: None,
            secondary: None,
            tile: None,
            current: None,
            cut: Cut::default(),
            cooldown: 0,
            eye_goto: Vector3::zeros(),
            focus_goto: Vector3::zeros(),
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn config(&self) -> &CutConfig {
        &self.config
    }

    pub fn is_cutting(&self) -> bool {
        self.cut.remaining > 0
    }

    /// Steps left in the current cut
    pub fn cut_remaining(&self) -> u32 {
        self.cut.remaining
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn set_primary(&mut self, subject: SharedSubject) {
        self.primary = Some(subject);
    }

    pub fn set_secondary(&mut self, subject: SharedSubject) {
        self.secondary = Some(subject);
    }

    pub fn set_tile_subject(&mut self, subject: SharedSubject) {
        self.tile = Some(subject);
    }

    pub fn clear_primary(&mut self) {
        if let Some(old) = self.primary.take() {
            self.forget(&old);
        }
    }

    pub fn clear_secondary(&mut self) {
        if let Some(old) = self.secondary.take() {
            self.forget(&old);
        }
    }

    pub fn clear_tile_subject(&mut self) {
        if let Some(old) = self.tile.take() {
            self.forget(&old);
        }
    }

    fn forget(&mut self, subject: &SharedSubject) {
        if self.current.as_ref().is_some_and(|c| Rc::ptr_eq(c, subject)) {
            self.current = None;
            self.cut = Cut::default();
        }
    }

    /// Whether plan view favours the primary subject over the secondary
    pub fn set_user_mode(&mut self, user_mode: bool) {
        self.user_mode = user_mode;
    }

    /// Switch mode and cut to the matching subject
    pub fn set_mode(&mut self, camera: &mut Camera, mode: CameraMode) {
        log::debug!("Camera mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;

        match mode {
            CameraMode::SelfView => {
                if let Some(subject) = self.primary.clone() {
                    self.cut.remaining = 0;
                    self.cut_to(camera, &subject, true);
                }
            }
            CameraMode::Group => {
                if let Some(subject) = self.secondary.clone() {
                    self.cut.remaining = 0;
                    self.cooldown = 0;
                    self.cut_to(camera, &subject, false);
                }
            }
            CameraMode::Tile => {
                if let Some(subject) = self.tile.clone() {
                    self.cut.remaining = 0;
                    self.cooldown = 0;
                    self.cut_to(camera, &subject, true);
                }
            }
            CameraMode::Plan => self.frame_plan(camera),
        }
    }

    fn frame_plan(&mut self, camera: &mut Camera) {
        let favoured = match (&self.primary, &self.secondary) {
            (Some(primary), _) if self.user_mode => Some(primary.clone()),
            (_, Some(secondary)) => Some(secondary.clone()),
            _ => None,
        };

        let cfg = &self.config;
        match &favoured {
            Some(subject) => {
                // Plan view looks along the tile's centre line
                let tracked = subject.borrow().focus();
                let focus = Vector3::new(0.0, tracked.y + cfg.plan_y_offset, tracked.z);
                camera.set_focus(focus);
                camera.set_eye(Vector3::new(cfg.plan_eye_x, focus.y, cfg.plan_height));
            }
            None => {
                camera.set_focus(Vector3::new(0.0, cfg.tile_width, 0.0));
                camera.set_eye(Vector3::new(cfg.plan_eye_x, cfg.tile_width, cfg.plan_height));
            }
        }

        self.current = favoured;
        self.cut.remaining = 0;
    }

    /// Start gliding toward `subject`. `is_user` marks requests on behalf
    /// of the user's own actor; other requests only count in group mode.
    ///
    /// Returns whether a cut started.
    pub fn cut_to(&mut self, camera: &Camera, subject: &SharedSubject, is_user: bool) -> bool {
        if self.mode == CameraMode::Plan {
            return false;
        }
        if self.mode == CameraMode::Group && (self.is_cutting() || self.cooldown > 0) {
            return false;
        }
        if !is_user && self.mode != CameraMode::Group {
            return false;
        }

        let (eye, focus) = {
            let s = subject.borrow();
            (s.eye(), s.focus())
        };

        let cfg = &self.config;
        let cruise = cfg.cut_len.saturating_sub(cfg.cut_ramp).max(1) as f32;
        self.cut = Cut {
            remaining: cfg.cut_len,
            eye_step: (eye - camera.eye()) / cruise,
            focus_step: (focus - camera.focus()) / cruise,
        };
        self.cooldown = cfg.cooldown();
        self.eye_goto = eye;
        self.focus_goto = focus;
        self.current = Some(subject.clone());

        log::debug!("Cut started over {} steps toward eye {:?}", cfg.cut_len, eye);
        true
    }

    /// Advance one frame: step any cut, then ride along with the subject
    pub fn tick(&mut self, camera: &mut Camera) {
        let Some(subject) = self.current.clone() else {
            return;
        };

        if self.cooldown > 0 {
            self.cooldown -= 1;
        }

        if self.is_cutting() {
            self.cut_step(camera);
        }

        self.follow(camera, &subject);
    }

    fn cut_step(&mut self, camera: &mut Camera) {
        let len = self.config.cut_len;
        let ramp = self.config.cut_ramp as f32;
        let c = self.cut.remaining;

        let s = if c > len.saturating_sub(self.config.cut_ramp) {
            (len - c) as f32 / ramp
        } else if c < self.config.cut_ramp {
            c as f32 / ramp
        } else {
            1.0
        };

        camera.set_eye(camera.eye() + self.cut.eye_step * s);
        camera.set_focus(camera.focus() + self.cut.focus_step * s);
        self.cut.remaining -= 1;

        if self.cut.remaining == 0 {
            log::trace!("Cut finished");
        }
    }

    fn follow(&mut self, camera: &mut Camera, subject: &SharedSubject) {
        let (eye, focus) = {
            let s = subject.borrow();
            (s.eye(), s.focus())
        };

        if self.mode == CameraMode::Plan {
            // Constant viewing angle; slide along the subject's track
            camera.move_focus(Vector3::new(0.0, focus.y + self.config.plan_y_offset, focus.z));
            return;
        }

        camera.set_eye(camera.eye() + (eye - self.eye_goto));
        camera.set_focus(camera.focus() + (focus - self.focus_goto));
        self.eye_goto = eye;
        self.focus_goto = focus;
    }
}

impl Default for CameraMan {
    fn default() -> Self {
        Self::new(CutConfig::default())
    }
}
