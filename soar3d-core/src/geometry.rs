//! Scene objects: deduplicated points, wire and surface faces
use nalgebra::{Point2, Vector3};

use crate::color::Color;
use crate::layers::Layer;
use crate::projection::Camera;
use crate::shadow::Shadow;
use crate::surface::Surface;
use crate::transform::plane_normal;

/// Errors raised while building scene objects
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("object already casts the maximum of {max} shadows")]
    TooManyShadows { max: usize },
}

/// Handle to a point within its owning [`SceneObject`].
///
/// Points are never removed, so a handle stays valid for the life of the
/// object that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(usize);

impl PointId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A model-space point together with its latest projection
#[derive(Debug, Clone)]
pub struct PointRecord {
    position: Vector3<f32>,
    depth: f32,
    screen: Point2<f32>,
    in_fov: bool,
    // Excluded from deduplication; moved independently of other faces
    detached: bool,
}

impl PointRecord {
    fn new(position: Vector3<f32>, detached: bool) -> Self {
        Self {
            position,
            depth: 0.0,
            screen: Point2::origin(),
            in_fov: false,
            detached,
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Camera-space depth from the last projection
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Pixel position from the last projection; only meaningful when
    /// [`in_fov`](Self::in_fov) is true
    pub fn screen(&self) -> Point2<f32> {
        self.screen
    }

    pub fn in_fov(&self) -> bool {
        self.in_fov
    }

    fn pixel(&self) -> (i32, i32) {
        (self.screen.x as i32, self.screen.y as i32)
    }
}

/// Open polyline or filled polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceKind {
    Wire,
    Surface,
}

/// An ordered loop of points within one object
#[derive(Debug, Clone)]
pub struct Face {
    points: Vec<PointId>,
    color: Color,
    kind: FaceKind,
    normal: Option<Vector3<f32>>,
    has_normal: bool,
}

impl Face {
    pub(crate) fn new(points: Vec<PointId>, color: Color, kind: FaceKind, has_normal: bool) -> Self {
        Self {
            points,
            color,
            kind,
            normal: None,
            has_normal,
        }
    }

    pub fn points(&self) -> &[PointId] {
        &self.points
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn kind(&self) -> FaceKind {
        self.kind
    }

    pub fn is_solid(&self) -> bool {
        self.kind == FaceKind::Surface
    }

    /// Unit plane normal; `None` for faces that are visible from both
    /// sides or have fewer than three points
    pub fn normal(&self) -> Option<Vector3<f32>> {
        self.normal
    }

    pub(crate) fn refresh_normal(&mut self, records: &[PointRecord]) {
        if !self.has_normal || self.points.len() < 3 {
            self.normal = None;
            return;
        }
        let p = |i: usize| &records[self.points[i].0].position;
        self.normal = plane_normal(p(0), p(1), p(2));
    }

    /// True when the face points away from `eye`
    pub fn is_back_face(&self, records: &[PointRecord], eye: &Vector3<f32>) -> bool {
        match self.normal {
            Some(normal) => {
                let ray = records[self.points[0].0].position - eye;
                normal.dot(&ray) >= 0.0
            }
            None => false,
        }
    }

    /// Lit and fogged colour as seen by `camera`
    pub fn apparent_color(&self, records: &[PointRecord], camera: &Camera) -> Color {
        match self.normal {
            Some(normal) => {
                let lit = self.color.mul(camera.surface_light(&normal));
                camera.foggy_color(records[self.points[0].0].depth, lit)
            }
            None => self.color,
        }
    }

    pub(crate) fn draw(&self, records: &[PointRecord], camera: &Camera, surface: &mut dyn Surface) {
        if self.points.len() <= 1 {
            return;
        }

        match self.kind {
            FaceKind::Wire => {
                let segments: Vec<_> = self
                    .points
                    .windows(2)
                    .map(|w| (&records[w[0].0], &records[w[1].0]))
                    .filter(|(a, b)| a.in_fov && b.in_fov)
                    .collect();
                if segments.is_empty() {
                    return;
                }
                surface.set_color(self.apparent_color(records, camera));
                for (a, b) in segments {
                    let (x1, y1) = a.pixel();
                    let (x2, y2) = b.pixel();
                    surface.draw_line(x1, y1, x2, y2);
                }
            }
            FaceKind::Surface => {
                if !self.points.iter().all(|id| records[id.0].in_fov) {
                    return;
                }
                let (xs, ys): (Vec<i32>, Vec<i32>) =
                    self.points.iter().map(|id| records[id.0].pixel()).unzip();
                surface.set_color(self.apparent_color(records, camera));
                surface.fill_polygon(&xs, &ys);
            }
        }
    }
}

/// A renderable object owning its points and faces.
///
/// The layer is fixed at construction. Points are deduplicated on exact
/// coordinates, so faces sharing a corner share one projected record.
#[derive(Debug, Clone)]
pub struct SceneObject {
    layer: Layer,
    points: Vec<PointRecord>,
    faces: Vec<Face>,
    pub(crate) shadows: Vec<Shadow>,
    in_view: bool,
}

impl SceneObject {
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            points: Vec::new(),
            faces: Vec::new(),
            shadows: Vec::new(),
            in_view: false,
        }
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Whether any point passed the FOV test in the last projection
    pub fn in_view(&self) -> bool {
        self.in_view
    }

    pub fn points(&self) -> &[PointRecord] {
        &self.points
    }

    pub fn point(&self, id: PointId) -> &PointRecord {
        &self.points[id.0]
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Add `p`, or return the existing handle for identical coordinates
    pub fn add_point(&mut self, p: Vector3<f32>) -> PointId {
        if let Some(index) = self
            .points
            .iter()
            .position(|q| !q.detached && q.position == p)
        {
            return PointId(index);
        }
        self.points.push(PointRecord::new(p, false));
        PointId(self.points.len() - 1)
    }

    /// Add a point that no other face will ever share
    pub(crate) fn push_detached_point(&mut self, p: Vector3<f32>) -> PointId {
        self.points.push(PointRecord::new(p, true));
        PointId(self.points.len() - 1)
    }

    /// Move a point without refreshing normals
    pub(crate) fn move_point(&mut self, id: PointId, p: Vector3<f32>) {
        self.points[id.0].position = p;
    }

    /// Add a face through the given points, returning its index.
    ///
    /// With `has_normal` the face is one-sided: it gets a plane normal from
    /// its first three points and is culled when facing away.
    pub fn add_face(
        &mut self,
        points: &[Vector3<f32>],
        color: Color,
        solid: bool,
        has_normal: bool,
    ) -> usize {
        let ids = points.iter().map(|p| self.add_point(*p)).collect();
        let kind = if solid { FaceKind::Surface } else { FaceKind::Wire };
        self.push_face(Face::new(ids, color, kind, has_normal))
    }

    pub(crate) fn push_face(&mut self, mut face: Face) -> usize {
        face.refresh_normal(&self.points);
        self.faces.push(face);
        self.faces.len() - 1
    }

    /// Split a quad into two triangles.
    ///
    /// The diagonal joins corners 0-2 or 1-3; whichever pair is chosen
    /// decides whether the tile bends up (convex) or down (concave).
    pub fn add_tile(&mut self, corners: &[Vector3<f32>; 4], color: Color, solid: bool, concave: bool) {
        let [c0, c1, c2, c3] = *corners;
        let h1 = c0.z + c2.z;
        let h2 = c1.z + c3.z;

        let (first, second) = if (h1 < h2 && concave) || (h1 > h2 && !concave) {
            ([c0, c1, c2, c0], [c2, c3, c0, c2])
        } else {
            ([c0, c1, c3, c0], [c2, c3, c1, c2])
        };

        self.add_face(&first, color, solid, true);
        self.add_face(&second, color, solid, true);
    }

    /// Copy every face of `source` onto this object with fresh points,
    /// including its shadow casters
    pub fn clone_from_template(&mut self, source: &SceneObject) {
        for (index, face) in source.faces.iter().enumerate() {
            let positions: Vec<_> = face
                .points
                .iter()
                .map(|id| source.points[id.0].position)
                .collect();

            if source.shadows.iter().any(|s| s.caster() == index) {
                if let Err(e) =
                    self.add_face_with_shadow(&positions, face.color, face.is_solid(), face.has_normal)
                {
                    log::warn!("Template shadow not cloned: {e}");
                    self.add_face(&positions, face.color, face.is_solid(), face.has_normal);
                }
            } else {
                self.add_face(&positions, face.color, face.is_solid(), face.has_normal);
            }
        }
    }

    /// Reverse the paint order of the faces
    pub fn reverse_face_order(&mut self) {
        self.faces.reverse();
        let last = self.faces.len().saturating_sub(1);
        for shadow in &mut self.shadows {
            shadow.set_caster(last - shadow.caster());
        }
    }

    /// Replace one point's model position
    pub fn set_point(&mut self, id: PointId, p: Vector3<f32>) {
        self.move_point(id, p);
        self.refresh_normals();
    }

    pub fn translate(&mut self, delta: &Vector3<f32>) {
        for record in &mut self.points {
            record.position += delta;
        }
    }

    /// Scale about the model origin
    pub fn scale_by(&mut self, s: f32) {
        for record in &mut self.points {
            record.position *= s;
        }
        self.refresh_normals();
    }

    /// Recolour every face
    pub fn set_color(&mut self, color: Color) {
        for face in &mut self.faces {
            face.color = color;
        }
    }

    pub fn refresh_normals(&mut self) {
        let Self { points, faces, shadows, .. } = self;
        for face in faces.iter_mut() {
            face.refresh_normal(points);
        }
        for shadow in shadows.iter_mut() {
            shadow.face_mut().refresh_normal(points);
        }
    }

    /// Transform every point into camera space and onto the screen
    pub fn project(&mut self, camera: &Camera) {
        let mut in_view = false;
        for record in &mut self.points {
            let (depth, screen) = camera.project_point(&record.position);
            record.depth = depth;
            record.in_fov = screen.is_some();
            if let Some(screen) = screen {
                record.screen = screen;
            }
            in_view |= record.in_fov;
        }
        self.in_view = in_view;
    }

    /// Draw shadows, then faces, culling faces turned away from the eye.
    /// Uses the most recent [`project`](Self::project).
    pub fn render(&self, camera: &Camera, surface: &mut dyn Surface) {
        if !self.in_view {
            return;
        }

        let eye = camera.eye();
        let shadows = self.shadows.iter().map(Shadow::face);
        for face in shadows.chain(self.faces.iter()) {
            if !face.is_back_face(&self.points, &eye) {
                face.draw(&self.points, camera, surface);
            }
        }
    }
}
