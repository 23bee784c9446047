//! Drag-to-orbit camera control
use std::f32::consts::PI;

use crate::projection::Camera;

/// Drag distance in pixels below which a drag is ignored
pub const DEAD_ZONE: f32 = 20.0;

/// Turns a drag delta into orbit and height changes.
///
/// Horizontal drags orbit the eye about the focus at a quarter turn per
/// four seconds; vertical drags raise or lower the eye by a quarter of the
/// focus distance per second.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitControl {
    dragging: bool,
    dx: f32,
    dy: f32,
}

impl OrbitControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the drag offset from where the drag started
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.dragging = true;
        self.dx = dx;
        self.dy = dy;
    }

    pub fn release(&mut self) {
        *self = Self::default();
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Apply this frame's share of the drag; `dt` is in seconds
    pub fn update(&self, camera: &mut Camera, dt: f32) {
        if !self.dragging {
            return;
        }

        let unit_step = PI * dt / 8.0;
        // Dragging right swings the eye clockwise seen from above
        let dtheta = if self.dx > DEAD_ZONE {
            -unit_step
        } else if self.dx < -DEAD_ZONE {
            unit_step
        } else {
            0.0
        };

        let dz = if self.dy > DEAD_ZONE {
            -dt / 4.0
        } else if self.dy < -DEAD_ZONE {
            dt / 4.0
        } else {
            0.0
        };

        camera.rotate_eye_about_focus(dtheta);
        camera.translate_z(dz, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_small_drag_ignored() {
        let mut camera = Camera::new(800, 600);
        let mut orbit = OrbitControl::new();
        orbit.drag(10.0, -5.0);
        orbit.update(&mut camera, 1.0);
        assert_eq!(camera.eye(), Vector3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_quarter_turn_in_four_seconds() {
        let mut camera = Camera::new(800, 600);
        let mut orbit = OrbitControl::new();
        orbit.drag(50.0, 0.0);
        for _ in 0..40 {
            orbit.update(&mut camera, 0.1);
        }
        assert_relative_eq!(camera.eye(), Vector3::new(0.0, -3.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_drag_left_turns_counter_clockwise() {
        let mut camera = Camera::new(800, 600);
        let mut orbit = OrbitControl::new();
        orbit.drag(-50.0, 0.0);
        for _ in 0..40 {
            orbit.update(&mut camera, 0.1);
        }
        assert_relative_eq!(camera.eye(), Vector3::new(0.0, 3.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_drag_down_lowers_but_not_below_ground() {
        let mut camera = Camera::new(800, 600);
        camera.set_eye(Vector3::new(3.0, 0.0, 1.0));
        camera.rebuild_view_state();
        let mut orbit = OrbitControl::new();
        orbit.drag(0.0, 100.0);
        orbit.update(&mut camera, 0.5);
        assert!(camera.eye().z < 1.0);
        for _ in 0..20 {
            orbit.update(&mut camera, 0.5);
        }
        assert_eq!(camera.eye().z, 0.0);

        orbit.release();
        assert!(!orbit.is_dragging());
    }
}
