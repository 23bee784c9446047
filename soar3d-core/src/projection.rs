//! Camera state, view construction, screen mapping, lighting and fog
use nalgebra::{Matrix3, Point2, Rotation3, Vector3};

use crate::color::Color;
use crate::config::ViewConfig;
use crate::transform::{align_with_x_axis, fov_project};

/// Camera configuration for the software pipeline.
///
/// Camera space puts the focus at the origin and the eye on +X at
/// `distance`, so the depth of a point is its `x` coordinate: positive
/// values lie between the focus plane and the eye, negative values beyond
/// the focus. Fog and depth sort both key off this one convention.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vector3<f32>,
    focus: Vector3<f32>,
    light_dir: Vector3<f32>,
    matrix: Matrix3<f32>,
    distance: f32,
    screen_width: u32,
    screen_height: u32,
    scale: f32,
    view: ViewConfig,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, ViewConfig::default())
    }

    pub fn with_config(width: u32, height: u32, view: ViewConfig) -> Self {
        let light = Vector3::from(view.light_direction);
        let mut camera = Self {
            eye: Vector3::new(3.0, 0.0, 0.0),
            focus: Vector3::zeros(),
            light_dir: light.try_normalize(f32::EPSILON).unwrap_or(-Vector3::z()),
            matrix: Matrix3::identity(),
            distance: 0.0,
            screen_width: width,
            screen_height: height,
            // Smaller scale gives a wider lens
            scale: height as f32 * view.lens_scale,
            view,
        };
        camera.rebuild_view_state();
        camera
    }

    pub fn eye(&self) -> Vector3<f32> {
        self.eye
    }

    pub fn focus(&self) -> Vector3<f32> {
        self.focus
    }

    pub fn set_eye(&mut self, eye: Vector3<f32>) {
        self.eye = eye;
        log::trace!("Camera eye set to {:?}", eye);
    }

    pub fn set_focus(&mut self, focus: Vector3<f32>) {
        self.focus = focus;
        log::trace!("Camera focus set to {:?}", focus);
    }

    /// Translate eye and focus together
    pub fn translate(&mut self, delta: &Vector3<f32>) {
        self.eye += delta;
        self.focus += delta;
    }

    /// Pan eye and focus horizontally
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.translate(&Vector3::new(dx, dy, 0.0));
    }

    /// Shift only the focus horizontally
    pub fn focus_offset(&mut self, dx: f32, dy: f32) {
        self.focus.x += dx;
        self.focus.y += dy;
    }

    /// Move the focus to `focus`, carrying the eye along so the viewing
    /// angle is unchanged
    pub fn move_focus(&mut self, focus: Vector3<f32>) {
        let ray = self.eye - self.focus;
        self.focus = focus;
        self.eye = focus + ray;
    }

    /// Orbit the eye about the focus, counter-clockwise seen from above
    pub fn rotate_eye_about_focus(&mut self, dtheta: f32) {
        let ray = self.eye - self.focus;
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), dtheta);
        self.eye = self.focus + rotation * ray;
    }

    /// Raise or lower the eye by `dz` focus-distances
    pub fn translate_z(&mut self, dz: f32, limit_z: bool) {
        self.eye.z += self.distance * dz;
        if limit_z && self.eye.z < 0.0 {
            self.eye.z = 0.0;
        }
    }

    /// Recompute the view rotation and eye-focus distance. Call once per
    /// frame before projecting; eye and focus must differ.
    pub fn rebuild_view_state(&mut self) {
        let ray = self.eye - self.focus;
        self.matrix = align_with_x_axis(&ray);
        self.distance = ray.norm();
    }

    pub fn view_matrix(&self) -> &Matrix3<f32> {
        &self.matrix
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    pub fn view_config(&self) -> &ViewConfig {
        &self.view
    }

    /// World point to camera space (before the perspective divide)
    pub fn to_camera_space(&self, p: &Vector3<f32>) -> Vector3<f32> {
        self.matrix * (p - self.focus)
    }

    /// Full pipeline for one point: camera space, FOV test, screen mapping.
    /// Returns the depth proxy and, when inside the FOV, the pixel position.
    pub fn project_point(&self, p: &Vector3<f32>) -> (f32, Option<Point2<f32>>) {
        let camera_space = self.to_camera_space(p);
        let screen = fov_project(&camera_space, self.distance).map(|q| self.scale_to_screen(&q));
        (camera_space.x, screen)
    }

    /// Map projected lateral coordinates to pixels. Screen rows grow
    /// downward, so the vertical axis is flipped.
    pub fn scale_to_screen(&self, projected: &Vector3<f32>) -> Point2<f32> {
        let half_w = (self.screen_width / 2) as f32;
        let half_h = (self.screen_height / 2) as f32;
        Point2::new(
            projected.y * self.scale + half_w,
            -projected.z * self.scale + half_h,
        )
    }

    /// Light falling on a surface with unit `normal`, in `[ambient, 1]`
    pub fn surface_light(&self, normal: &Vector3<f32>) -> f32 {
        let mut light = (-self.light_dir.dot(normal) + 1.0) / 2.0;

        // Fill light for cloud undersides
        if normal.z < -0.99 {
            light += self.view.underside_boost;
        }

        let ambient = self.view.ambient_light;
        light.clamp(0.0, 1.0) * (1.0 - ambient) + ambient
    }

    /// Fade `color` toward the background with distance beyond the focus
    pub fn foggy_color(&self, depth: f32, color: Color) -> Color {
        if depth >= 0.0 {
            return color;
        }

        let distance = -depth;
        if distance >= self.view.vision_depth {
            return self.view.background;
        }

        color.lerp(self.view.background, distance / self.view.vision_depth)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.screen_size(), (800, 600));
        assert_relative_eq!(camera.distance(), 3.0);
    }

    #[test]
    fn test_focus_projects_to_screen_center() {
        let mut camera = Camera::new(800, 600);
        camera.set_eye(Vector3::new(3.0, 0.0, 0.0));
        camera.set_focus(Vector3::zeros());
        camera.rebuild_view_state();

        let (depth, screen) = camera.project_point(&Vector3::zeros());
        assert_eq!(depth, 0.0);
        assert_eq!(screen, Some(Point2::new(400.0, 300.0)));
    }

    #[test]
    fn test_view_matrix_aligns_ray_with_depth_axis() {
        let mut camera = Camera::new(800, 600);
        camera.set_eye(Vector3::new(0.0, -4.0, 3.0));
        camera.set_focus(Vector3::zeros());
        camera.rebuild_view_state();

        let ray = camera.eye() - camera.focus();
        assert_relative_eq!(camera.view_matrix() * ray, Vector3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(camera.view_matrix().determinant(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_focus_offset_leaves_eye() {
        let mut camera = Camera::new(800, 600);
        camera.focus_offset(0.5, -1.0);
        assert_eq!(camera.eye(), Vector3::new(3.0, 0.0, 0.0));
        assert_eq!(camera.focus(), Vector3::new(0.5, -1.0, 0.0));
    }

    #[test]
    fn test_screen_vertical_axis_flipped() {
        let camera = Camera::new(800, 600);
        let up = camera.scale_to_screen(&Vector3::new(0.0, 0.0, 0.1));
        assert!(up.y < 300.0);
    }

    #[test]
    fn test_rotate_eye_keeps_distance() {
        let mut camera = Camera::new(800, 600);
        camera.set_eye(Vector3::new(3.0, 0.0, 1.0));
        camera.rotate_eye_about_focus(std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(camera.eye(), Vector3::new(0.0, 3.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_translate_z_clamps_to_ground() {
        let mut camera = Camera::new(800, 600);
        camera.set_eye(Vector3::new(3.0, 0.0, 1.0));
        camera.rebuild_view_state();
        camera.translate_z(-10.0, true);
        assert_eq!(camera.eye().z, 0.0);

        camera.translate_z(-1.0, false);
        assert!(camera.eye().z < 0.0);
    }

    #[test]
    fn test_move_focus_keeps_ray() {
        let mut camera = Camera::new(800, 600);
        camera.set_eye(Vector3::new(3.0, 1.0, 2.0));
        camera.move_focus(Vector3::new(10.0, 10.0, 0.0));
        assert_relative_eq!(camera.eye(), Vector3::new(13.0, 11.0, 2.0));
    }

    #[test]
    fn test_surface_light_bounds() {
        let camera = Camera::new(800, 600);
        let ambient = camera.view_config().ambient_light;
        for i in 0..64 {
            let theta = i as f32 * 0.37;
            let phi = i as f32 * 0.21 - 3.0;
            let n = Vector3::new(phi.cos() * theta.cos(), phi.cos() * theta.sin(), phi.sin());
            let light = camera.surface_light(&n.normalize());
            assert!(light >= ambient - 1e-6 && light <= 1.0 + 1e-6, "light {light}");
        }
        let down = camera.surface_light(&Vector3::new(0.0, 0.0, -1.0));
        assert!(down <= 1.0 && down >= ambient);
    }

    #[test]
    fn test_fog_identity_and_background() {
        let camera = Camera::new(800, 600);
        let c = Color::new(10, 120, 40);
        let vision = camera.view_config().vision_depth;
        assert_eq!(camera.foggy_color(0.0, c), c);
        assert_eq!(camera.foggy_color(2.0, c), c);
        assert_eq!(camera.foggy_color(-vision, c), camera.view_config().background);
        assert_eq!(camera.foggy_color(-vision * 3.0, c), camera.view_config().background);

        let half = camera.foggy_color(-vision / 2.0, Color::BLACK);
        assert_eq!(half, Color::new(127, 127, 127));
    }
}
