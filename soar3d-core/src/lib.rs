//! soar3d core library: a software 3D pipeline with a cinematic camera
//!
//! Scene objects project through a [`Camera`], sort per [`Layer`] and draw
//! onto any [`Surface`]. A [`CameraMan`] moves the camera after tracked
//! [`Subject`]s, gliding between them with eased cuts.

pub mod cameraman;
pub mod color;
pub mod config;
pub mod geometry;
pub mod layers;
pub mod orbit;
pub mod projection;
pub mod scene;
pub mod shadow;
pub mod shapes;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use cameraman::{CameraMan, CameraMode, SharedSubject, Subject};
pub use color::Color;
pub use config::{Config, ConfigError, CutConfig, EngineConfig, ViewConfig};
pub use geometry::{Face, FaceKind, PointId, PointRecord, SceneError, SceneObject};
pub use layers::{Layer, LayerManager, ObjectId};
pub use orbit::OrbitControl;
pub use projection::Camera;
pub use scene::{Overlay, Scene};
pub use shadow::{FlatGround, Shadow, Terrain};
pub use surface::{Font, FontStyle, Surface};
