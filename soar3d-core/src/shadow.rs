//! Flat shadows dropped onto the terrain below a caster face
use nalgebra::Vector3;

use crate::color::Color;
use crate::geometry::{Face, FaceKind, SceneError, SceneObject};

/// Shadows a single object may cast
pub const MAX_SHADOWS: usize = 2;

pub const SHADOW_COLOR: Color = Color::new(180, 180, 180);

/// Height of the ground under a point
pub trait Terrain {
    fn height(&self, x: f32, y: f32) -> f32;
}

/// Level ground at height zero
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround;

impl Terrain for FlatGround {
    fn height(&self, _x: f32, _y: f32) -> f32 {
        0.0
    }
}

/// A surface face tracking a caster face, winding reversed so it faces up
/// when the caster faces down
#[derive(Debug, Clone)]
pub struct Shadow {
    caster: usize,
    face: Face,
}

impl Shadow {
    /// Index of the casting face within the owning object
    pub fn caster(&self) -> usize {
        self.caster
    }

    pub(crate) fn set_caster(&mut self, caster: usize) {
        self.caster = caster;
    }

    pub fn face(&self) -> &Face {
        &self.face
    }

    pub(crate) fn face_mut(&mut self) -> &mut Face {
        &mut self.face
    }
}

impl SceneObject {
    /// Add a face that casts a shadow onto the terrain.
    ///
    /// The shadow gets its own points (never shared with other faces) so it
    /// can be moved every frame by [`update_shadows`](Self::update_shadows).
    pub fn add_face_with_shadow(
        &mut self,
        points: &[Vector3<f32>],
        color: Color,
        solid: bool,
        has_normal: bool,
    ) -> Result<usize, SceneError> {
        if self.shadows.len() >= MAX_SHADOWS {
            log::warn!("Shadow caster rejected: object already has {MAX_SHADOWS} shadows");
            return Err(SceneError::TooManyShadows { max: MAX_SHADOWS });
        }

        let caster = self.add_face(points, color, solid, has_normal);

        let ids = points
            .iter()
            .rev()
            .map(|p| self.push_detached_point(Vector3::new(p.x, p.y, 0.0)))
            .collect();
        let mut face = Face::new(ids, SHADOW_COLOR, FaceKind::Surface, true);
        face.refresh_normal(self.points());

        self.shadows.push(Shadow { caster, face });
        Ok(caster)
    }

    pub fn shadows(&self) -> &[Shadow] {
        &self.shadows
    }

    /// Drop every shadow point straight down onto `terrain` (flat ground
    /// at zero when absent). Call each frame after the object moves.
    pub fn update_shadows(&mut self, terrain: Option<&dyn Terrain>) {
        if self.shadows.is_empty() {
            return;
        }

        let ground = |x: f32, y: f32| terrain.map_or(0.0, |t| t.height(x, y));
        let mut moves = Vec::new();
        for shadow in &self.shadows {
            let casters = self.faces()[shadow.caster].points();
            for (&dst, &src) in shadow.face.points().iter().zip(casters.iter().rev()) {
                let p = self.point(src).position();
                moves.push((dst, Vector3::new(p.x, p.y, ground(p.x, p.y))));
            }
        }

        for (dst, p) in moves {
            self.move_point(dst, p);
        }
        self.refresh_normals();
    }
}
