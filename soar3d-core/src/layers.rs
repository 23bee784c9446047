//! Fixed paint-order layers with a per-frame depth sort
use slotmap::{new_key_type, SlotMap};

use crate::geometry::SceneObject;

new_key_type! {
    /// Handle to an object stored in a [`Scene`](crate::Scene)
    pub struct ObjectId;
}

/// Paint-order bucket, painted back to front in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Layer {
    /// Sky, distant terrain
    Background,
    #[default]
    Default,
    Foreground,
}

impl Layer {
    pub const COUNT: usize = 3;
    pub const ALL: [Layer; Layer::COUNT] = [Layer::Background, Layer::Default, Layer::Foreground];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Ordered object handles per layer. Buckets reference objects; the scene
/// arena owns them.
#[derive(Debug, Default)]
pub struct LayerManager {
    layers: [Vec<ObjectId>; Layer::COUNT],
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ObjectId, layer: Layer) {
        self.layers[layer.index()].push(id);
    }

    /// Remove `id` from `layer`; false if it was not there
    pub fn remove(&mut self, id: ObjectId, layer: Layer) -> bool {
        let bucket = &mut self.layers[layer.index()];
        match bucket.iter().position(|&other| other == id) {
            Some(index) => {
                bucket.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn layer(&self, layer: Layer) -> &[ObjectId] {
        &self.layers[layer.index()]
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Vec::is_empty)
    }

    /// Every handle in paint order
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.layers.iter().flatten().copied()
    }

    /// Sort each layer so the furthest object paints first.
    ///
    /// An object's depth is the camera-space depth of its first point only;
    /// cheap, and good enough for scenes of small separated objects. Objects
    /// with no points keep their slot and the rest sort around them.
    pub fn sort(&mut self, objects: &SlotMap<ObjectId, SceneObject>) {
        for bucket in &mut self.layers {
            let depth = |id: &ObjectId| {
                objects
                    .get(*id)
                    .and_then(|obj| obj.points().first())
                    .map(|p| p.depth())
            };

            let slots: Vec<usize> = (0..bucket.len()).filter(|&i| depth(&bucket[i]).is_some()).collect();
            let mut keyed: Vec<(f32, ObjectId)> = slots
                .iter()
                .filter_map(|&i| depth(&bucket[i]).map(|d| (d, bucket[i])))
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

            for (slot, (_, id)) in slots.into_iter().zip(keyed) {
                bucket[slot] = id;
            }
        }
    }
}
