//! Renderable bodies and their geometry.

use glam::{Quat, Vec3};
use orrery_materials::MaterialDescriptor;
use serde::{Deserialize, Serialize};

use crate::orbit::{self, OrbitParams, OrbitSample};

/// Stable identifier of a body: its index in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shape used to render a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Sphere { radius: f32 },
    Cube { size: f32 },
}

impl Geometry {
    /// Radius for spheres, edge length for cubes.
    pub fn size(&self) -> f32 {
        match *self {
            Self::Sphere { radius } => radius,
            Self::Cube { size } => size,
        }
    }
}

/// One positionable entity in the scene.
///
/// Everything except the transform is fixed at construction. The transform is
/// written only by [`Scene::tick`](crate::Scene::tick).
#[derive(Clone, Debug)]
pub struct Body {
    pub(crate) id: BodyId,
    pub(crate) name: String,
    pub(crate) parent: Option<BodyId>,
    pub(crate) geometry: Geometry,
    pub(crate) material: MaterialDescriptor,
    pub(crate) orbit: Option<OrbitParams>,
    pub(crate) spin_rate: f32,
    pub(crate) initial_position: Vec3,
    position: Vec3,
    y_rotation: f32,
}

impl Body {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: BodyId,
        name: String,
        parent: Option<BodyId>,
        geometry: Geometry,
        material: MaterialDescriptor,
        orbit: Option<OrbitParams>,
        spin_rate: f32,
        initial_position: Vec3,
    ) -> Self {
        Self {
            id,
            name,
            parent,
            geometry,
            material,
            orbit,
            spin_rate,
            initial_position,
            position: initial_position,
            y_rotation: 0.0,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<BodyId> {
        self.parent
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> &MaterialDescriptor {
        &self.material
    }

    pub fn orbit(&self) -> Option<&OrbitParams> {
        self.orbit.as_ref()
    }

    pub fn spin_rate(&self) -> f32 {
        self.spin_rate
    }

    pub fn initial_position(&self) -> Vec3 {
        self.initial_position
    }

    /// Position as of the last tick (the initial position before the first).
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Rotation about +Y as of the last tick.
    pub fn y_rotation(&self) -> f32 {
        self.y_rotation
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.y_rotation)
    }

    /// Where this body is at `t`, given its parent's position at `t`.
    pub fn sample(&self, t: f64, parent_position: Option<Vec3>) -> OrbitSample {
        orbit::sample(
            t,
            self.initial_position,
            parent_position,
            self.orbit.as_ref(),
            self.spin_rate,
        )
    }

    pub(crate) fn apply(&mut self, sample: OrbitSample) {
        self.position = sample.position;
        self.y_rotation = sample.y_rotation;
    }
}
