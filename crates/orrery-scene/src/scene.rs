//! The scene context and its per-frame update step.

use glam::{Quat, Vec3};
use orrery_materials::MaterialDescriptor;
use tracing::trace;

use crate::body::{Body, BodyId, Geometry};
use crate::camera::Camera;

/// Sink for body transforms and materials, owned by the rendering side.
pub trait SceneGraph {
    /// Replace the transform of `id`. Called once per body per tick.
    fn set_transform(&mut self, id: BodyId, position: Vec3, rotation: Quat);

    /// Register a body's geometry and material. Called once per body at setup.
    fn attach_material(&mut self, id: BodyId, geometry: &Geometry, material: &MaterialDescriptor);
}

/// All bodies plus the cached parent-first update order and the camera.
///
/// This is the only writer of body transforms.
#[derive(Debug, Clone)]
pub struct Scene {
    bodies: Vec<Body>,
    order: Vec<usize>,
    camera: Camera,
    last_tick: Option<f64>,
}

impl Scene {
    /// `order` must list every index of `bodies` with parents before children.
    pub(crate) fn new(bodies: Vec<Body>, order: Vec<usize>) -> Self {
        debug_assert_eq!(bodies.len(), order.len());
        Self {
            bodies,
            order,
            camera: Camera::default(),
            last_tick: None,
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Register every body with the scene graph, parents first.
    pub fn attach<G: SceneGraph + ?Sized>(&self, graph: &mut G) {
        for id in self.update_order() {
            let body = self.body(id);
            graph.attach_material(id, body.geometry(), body.material());
        }
    }

    /// Recompute every transform for elapsed time `t` and push it to `graph`.
    ///
    /// Bodies are visited parent-first, so a child always orbits its parent's
    /// position from this same tick.
    pub fn tick<G: SceneGraph + ?Sized>(&mut self, t: f64, graph: &mut G) {
        for &index in &self.order {
            let parent_position = self.bodies[index]
                .parent
                .map(|parent| self.bodies[parent.index()].position());
            let sample = self.bodies[index].sample(t, parent_position);

            let body = &mut self.bodies[index];
            body.apply(sample);
            trace!(
                body = %body.name,
                x = sample.position.x,
                y = sample.position.y,
                z = sample.position.z,
                y_rotation = sample.y_rotation,
                "transform"
            );
            graph.set_transform(body.id, sample.position, body.rotation());
        }
        self.last_tick = Some(t);
    }

    /// Viewport size changed; recompute the projection before the next tick.
    /// Returns whether the projection changed.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        self.camera.set_viewport(width, height)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Elapsed time of the most recent tick.
    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this scene.
    pub fn body(&self, id: BodyId) -> &Body {
        &self.bodies[id.index()]
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    pub fn body_by_name(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|body| body.name() == name)
    }

    /// Body ids in the order `tick` visits them.
    pub fn update_order(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.order.iter().map(|&index| self.bodies[index].id())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
