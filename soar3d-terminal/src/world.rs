//! Demo world: one terrain tile, a few clouds and gliders on scripted circles
use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Rotation3, Vector3};
use soar3d_core::{
    shapes, Color, Layer, ObjectId, PointId, Scene, SceneError, SceneObject, Subject, Terrain,
};

/// Grid cells along each side of the tile
const TILE_CELLS: usize = 8;

/// A cone-shaped hill
#[derive(Debug, Clone, Copy)]
struct Hill {
    x: f32,
    y: f32,
    radius: f32,
    peak: f32,
}

impl Hill {
    fn height(&self, x: f32, y: f32) -> f32 {
        let d = ((x - self.x).powi(2) + (y - self.y).powi(2)).sqrt();
        (self.peak * (1.0 - d / self.radius)).max(0.0)
    }
}

/// Square of hilly ground centred on `(0, centre_y)`
pub struct TerrainTile {
    width: f32,
    centre_y: f32,
    hills: Vec<Hill>,
}

impl TerrainTile {
    pub fn new(width: f32) -> Self {
        let centre_y = width;
        Self {
            width,
            centre_y,
            hills: vec![
                Hill { x: -3.0, y: centre_y - 4.0, radius: 5.0, peak: 2.5 },
                Hill { x: 4.0, y: centre_y + 3.0, radius: 4.0, peak: 1.5 },
            ],
        }
    }

    pub fn centre(&self) -> Vector3<f32> {
        Vector3::new(0.0, self.centre_y, 0.0)
    }

    /// Ground mesh for the background layer, shaded green to tan by height
    pub fn build_object(&self) -> SceneObject {
        let mut ground = SceneObject::new(Layer::Background);
        let step = self.width / TILE_CELLS as f32;
        let x0 = -self.width / 2.0;
        let y0 = self.centre_y - self.width / 2.0;
        let corner = |i: usize, j: usize| {
            let (x, y) = (x0 + i as f32 * step, y0 + j as f32 * step);
            Vector3::new(x, y, self.height(x, y))
        };

        for i in 0..TILE_CELLS {
            for j in 0..TILE_CELLS {
                // Wound so every normal faces up
                let corners = [corner(i, j), corner(i, j + 1), corner(i + 1, j + 1), corner(i + 1, j)];
                let top = corners.iter().map(|c| c.z).fold(0.0, f32::max);
                let color = Color::GREEN.lerp(Color::new(200, 180, 120), (top / 2.5).min(1.0));
                ground.add_tile(&corners, color, true, false);
            }
        }
        ground
    }
}

impl Terrain for TerrainTile {
    fn height(&self, x: f32, y: f32) -> f32 {
        self.hills.iter().map(|h| h.height(x, y)).fold(0.0, f32::max)
    }
}

impl Subject for TerrainTile {
    fn eye(&self) -> Vector3<f32> {
        self.centre() + Vector3::new(self.width * 0.8, 0.0, self.width * 0.4)
    }

    fn focus(&self) -> Vector3<f32> {
        self.centre()
    }
}

/// Glider flying a level circle.
///
/// The scene object is built nose along +X at the origin; each step poses
/// its points at the current position and heading.
pub struct Glider {
    object: ObjectId,
    model: Vec<(PointId, Vector3<f32>)>,
    centre: Vector3<f32>,
    radius: f32,
    // Radians per second, positive is counter-clockwise from above
    rate: f32,
    angle: f32,
}

impl Glider {
    pub fn spawn(
        scene: &mut Scene,
        color: Color,
        centre: Vector3<f32>,
        radius: f32,
        rate: f32,
        angle: f32,
    ) -> Result<Self, SceneError> {
        let mut body = SceneObject::new(Layer::Default);
        // Downward winding, so the shadow below faces up
        body.add_face_with_shadow(
            &[
                Vector3::new(0.4, 0.0, 0.0),
                Vector3::new(-0.3, 1.6, 0.0),
                Vector3::new(-0.3, -1.6, 0.0),
            ],
            color,
            true,
            false,
        )?;
        body.add_face(
            &[Vector3::new(0.8, 0.0, 0.0), Vector3::new(-1.6, 0.0, 0.0)],
            Color::BLACK,
            false,
            false,
        );
        body.add_face(
            &[
                Vector3::new(-1.6, 0.0, 0.0),
                Vector3::new(-1.8, 0.0, 0.5),
                Vector3::new(-1.4, 0.0, 0.0),
            ],
            color,
            true,
            false,
        );

        let mut model: Vec<(PointId, Vector3<f32>)> = Vec::new();
        for face in body.faces() {
            for id in face.points() {
                if !model.iter().any(|(m, _)| m == id) {
                    model.push((*id, body.point(*id).position()));
                }
            }
        }

        let object = scene.add(body);
        let mut glider = Self {
            object,
            model,
            centre,
            radius,
            rate,
            angle,
        };
        glider.pose(scene);
        Ok(glider)
    }

    pub fn position(&self) -> Vector3<f32> {
        self.centre + Vector3::new(self.angle.cos(), self.angle.sin(), 0.0) * self.radius
    }

    /// Unit direction of travel
    pub fn heading(&self) -> Vector3<f32> {
        let tangent = Vector3::new(-self.angle.sin(), self.angle.cos(), 0.0);
        if self.rate < 0.0 {
            -tangent
        } else {
            tangent
        }
    }

    pub fn advance(&mut self, scene: &mut Scene, dt: f32) {
        self.angle = (self.angle + self.rate * dt).rem_euclid(std::f32::consts::TAU);
        self.pose(scene);
    }

    fn pose(&self, scene: &mut Scene) {
        let Some(body) = scene.get_mut(self.object) else {
            log::warn!("Glider object {:?} missing from scene", self.object);
            return;
        };
        let h = self.heading();
        let yaw = Rotation3::from_axis_angle(&Vector3::z_axis(), h.y.atan2(h.x));
        let position = self.position();
        for (id, p) in &self.model {
            body.set_point(*id, position + yaw * *p);
        }
    }
}

impl Subject for Glider {
    /// Chase view: behind and a little above
    fn eye(&self) -> Vector3<f32> {
        self.position() - self.heading() * 6.0 + Vector3::new(0.0, 0.0, 1.5)
    }

    fn focus(&self) -> Vector3<f32> {
        self.position() + self.heading() * 4.0
    }
}

/// Everything that moves or is framed in the demo
pub struct World {
    pub tile: Rc<RefCell<TerrainTile>>,
    pub user: Rc<RefCell<Glider>>,
    pub gaggle: Vec<Rc<RefCell<Glider>>>,
    leader: usize,
}

impl World {
    pub fn build(scene: &mut Scene, tile_width: f32) -> Result<Self, SceneError> {
        let tile = TerrainTile::new(tile_width);
        scene.add(tile.build_object());
        let centre = tile.centre();

        let mut cloud = shapes::unit_cube(Layer::Default, true);
        cloud.set_color(Color::LIGHT_GRAY);
        cloud.scale_by(1.5);
        for offset in [
            Vector3::new(-4.0, -6.0, 9.0),
            Vector3::new(5.0, 2.0, 10.0),
            Vector3::new(-1.0, 7.0, 8.5),
        ] {
            let mut puff = SceneObject::new(Layer::Default);
            puff.clone_from_template(&cloud);
            puff.translate(&(centre + offset));
            scene.add(puff);
        }

        let user = Glider::spawn(scene, Color::RED, centre + Vector3::new(0.0, 0.0, 4.0), 6.0, 0.4, 0.0)?;
        let gaggle = vec![
            Glider::spawn(scene, Color::YELLOW, centre + Vector3::new(2.0, -2.0, 5.0), 4.0, -0.5, 1.0)?,
            Glider::spawn(scene, Color::BLUE, centre + Vector3::new(-2.0, 3.0, 6.0), 5.0, 0.35, 2.5)?,
        ];

        log::info!("World built with {} scene objects", scene.len());
        Ok(Self {
            tile: Rc::new(RefCell::new(tile)),
            user: Rc::new(RefCell::new(user)),
            gaggle: gaggle.into_iter().map(|g| Rc::new(RefCell::new(g))).collect(),
            leader: 0,
        })
    }

    pub fn update(&self, scene: &mut Scene, dt: f32) {
        self.user.borrow_mut().advance(scene, dt);
        for glider in &self.gaggle {
            glider.borrow_mut().advance(scene, dt);
        }
    }

    /// The gaggle member the group view follows
    pub fn leader(&self) -> Rc<RefCell<Glider>> {
        self.gaggle[self.leader].clone()
    }

    /// Hand the lead to the next gaggle member
    pub fn rotate_leader(&mut self) -> Rc<RefCell<Glider>> {
        self.leader = (self.leader + 1) % self.gaggle.len();
        self.leader()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hill_peaks_and_flat_ground() {
        let tile = TerrainTile::new(20.0);
        assert_relative_eq!(tile.height(-3.0, 16.0), 2.5);
        assert_eq!(tile.height(-9.0, 29.0), 0.0);
    }

    #[test]
    fn test_tile_mesh_faces_up() {
        let tile = TerrainTile::new(20.0);
        let ground = tile.build_object();
        assert_eq!(ground.faces().len(), TILE_CELLS * TILE_CELLS * 2);
        assert!(ground.faces().iter().all(|f| f.normal().unwrap().z > 0.0));
    }

    #[test]
    fn test_glider_stays_on_circle() {
        let mut scene = Scene::new();
        let centre = Vector3::new(0.0, 20.0, 4.0);
        let mut glider = Glider::spawn(&mut scene, Color::RED, centre, 6.0, 0.4, 0.0).unwrap();
        for _ in 0..50 {
            glider.advance(&mut scene, 0.1);
        }
        assert_relative_eq!((glider.position() - centre).norm(), 6.0, epsilon = 1e-4);
        assert_relative_eq!(glider.heading().dot(&(glider.position() - centre)), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_glider_nose_follows_heading() {
        let mut scene = Scene::new();
        let glider =
            Glider::spawn(&mut scene, Color::RED, Vector3::zeros(), 5.0, -0.3, 0.0).unwrap();
        let body = scene.get(glider.object).unwrap();
        let nose = body.point(glider.model[0].0).position();
        let expected = glider.position() + glider.heading() * 0.4;
        assert_relative_eq!(nose, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_chase_view_sits_behind() {
        let mut scene = Scene::new();
        let glider =
            Glider::spawn(&mut scene, Color::RED, Vector3::zeros(), 5.0, 0.3, 0.0).unwrap();
        let back = glider.eye() - glider.position();
        assert!(back.dot(&glider.heading()) < 0.0);
        assert!(glider.eye().z > glider.position().z);
    }

    #[test]
    fn test_world_leader_rotates() {
        let mut scene = Scene::new();
        let mut world = World::build(&mut scene, 20.0).unwrap();
        // tile, three clouds, three gliders
        assert_eq!(scene.len(), 7);
        let first = world.leader();
        let second = world.rotate_leader();
        assert!(!Rc::ptr_eq(&first, &second));
        assert!(Rc::ptr_eq(&first, &world.rotate_leader()));
    }
}
