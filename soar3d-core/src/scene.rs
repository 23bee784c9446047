//! Scene arena and the per-frame render pass
use slotmap::SlotMap;

use crate::geometry::SceneObject;
use crate::layers::{LayerManager, ObjectId};
use crate::projection::Camera;
use crate::shadow::Terrain;
use crate::surface::Surface;

/// Screen-space drawing that paints after every layer, e.g. instruments
pub trait Overlay {
    fn name(&self) -> &str;

    fn render(&self, camera: &Camera, surface: &mut dyn Surface);
}

/// Owns every scene object and composes each frame
#[derive(Default)]
pub struct Scene {
    objects: SlotMap<ObjectId, SceneObject>,
    layers: LayerManager,
    overlays: Vec<Box<dyn Overlay>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the layer it was built for
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let layer = object.layer();
        let id = self.objects.insert(object);
        self.layers.insert(id, layer);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        match self.objects.remove(id) {
            Some(object) => {
                self.layers.remove(id, object.layer());
                Some(object)
            }
            None => {
                log::warn!("Attempted to remove unknown object {:?}", id);
                None
            }
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    /// Register an overlay; an overlay with the same name is rejected
    pub fn add_overlay(&mut self, overlay: Box<dyn Overlay>) -> bool {
        if self.overlays.iter().any(|o| o.name() == overlay.name()) {
            log::warn!("Overlay {} attempted to be added twice", overlay.name());
            return false;
        }
        self.overlays.push(overlay);
        true
    }

    /// Project every object and sort the layers, without drawing
    pub fn prepare(&mut self, camera: &mut Camera, terrain: Option<&dyn Terrain>) {
        camera.rebuild_view_state();
        for object in self.objects.values_mut() {
            object.update_shadows(terrain);
            object.project(camera);
        }
        self.layers.sort(&self.objects);
    }

    /// Render one frame: project, depth sort, then draw back to front.
    ///
    /// Without a surface (e.g. the first frame before a window exists) the
    /// scene is still projected but nothing is drawn.
    pub fn render(
        &mut self,
        camera: &mut Camera,
        terrain: Option<&dyn Terrain>,
        surface: Option<&mut dyn Surface>,
    ) {
        self.prepare(camera, terrain);

        let Some(surface) = surface else {
            log::trace!("No surface yet; skipping draw");
            return;
        };

        let mut drawn = 0;
        for id in self.layers.iter() {
            if let Some(object) = self.objects.get(id) {
                if object.in_view() {
                    object.render(camera, surface);
                    drawn += 1;
                }
            }
        }

        for overlay in &self.overlays {
            overlay.render(camera, surface);
        }

        log::trace!("Frame drew {} of {} objects", drawn, self.objects.len());
    }
}
