//! Orbital scene core: bodies, closed-form orbits, the parent-first update
//! step, the camera, and the built-in scene presets.

mod body;
mod camera;
mod definition;
mod error;
pub mod orbit;
mod ordering;
pub mod presets;
mod scene;

pub use body::{Body, BodyId, Geometry};
pub use camera::{Camera, Projection};
pub use definition::{BodyDef, MaterialDef, SceneDef};
pub use error::{CameraError, SceneError};
pub use orbit::{OrbitParams, OrbitSample};
pub use ordering::parent_first_order;
pub use scene::{Scene, SceneGraph};
