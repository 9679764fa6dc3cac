//! Scene construction errors. Every variant is fatal: a scene that fails to
//! build never starts.

use std::path::PathBuf;

use orrery_materials::MaterialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene has no bodies")]
    Empty,

    #[error("duplicate body name: {0}")]
    DuplicateName(String),

    #[error("body {body:?} names unknown parent {parent:?}")]
    UnknownParent { body: String, parent: String },

    #[error("body {body:?} is part of a parent cycle")]
    ParentCycle { body: String },

    #[error("body {body:?} has a non-finite {field}")]
    NonFinite { body: String, field: &'static str },

    #[error("body {body:?} must have a positive size")]
    InvalidGeometry { body: String },

    #[error("body {body:?} has a parent but no orbit")]
    MissingOrbit { body: String },

    #[error("root body {body:?} cannot orbit")]
    OrbitWithoutParent { body: String },

    #[error("body {body:?} has an invalid material: {source}")]
    Material {
        body: String,
        #[source]
        source: MaterialError,
    },

    #[error("failed to read scene {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Camera settings that cannot produce a usable projection.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CameraError {
    #[error("field of view must be within (0, 180) degrees, got {0}")]
    FieldOfView(f32),

    #[error("camera distance must be finite, got {0}")]
    Distance(f32),

    #[error("clip planes need 0 < near < far, got near {near} and far {far}")]
    ClipPlanes { near: f32, far: f32 },
}
