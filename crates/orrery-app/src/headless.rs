//! Render backend without a window: keeps the scene graph, composes materials
//! each frame, and packs them into a uniform staging buffer.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use orrery_materials::{ComposedMaterial, MaterialDescriptor, MaterialUniform};
use orrery_scene::{BodyId, Camera, Geometry, SceneGraph};
use tracing::{debug, trace};

use crate::frame_loop::{RenderError, Renderer};

/// One registered body as the backend sees it.
#[derive(Debug, Clone)]
pub struct RenderedBody {
    pub geometry: Geometry,
    pub material: MaterialDescriptor,
    pub position: Vec3,
    pub rotation: Quat,
}

impl RenderedBody {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub bodies: usize,
    /// Bodies whose center lands inside the clip volume.
    pub visible: usize,
    pub attached_channels: usize,
}

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    bodies: HashMap<BodyId, RenderedBody>,
    /// Attach order, which is also draw order.
    draw_order: Vec<BodyId>,
    unknown_body: Option<BodyId>,
    uniform_bytes: Vec<u8>,
    frames_rendered: u64,
    last_stats: FrameStats,
    log_transforms: bool,
}

impl HeadlessRenderer {
    pub fn new(log_transforms: bool) -> Self {
        Self {
            log_transforms,
            ..Default::default()
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&RenderedBody> {
        self.bodies.get(&id)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Packed [`MaterialUniform`]s from the last frame, in draw order.
    pub fn uniform_bytes(&self) -> &[u8] {
        &self.uniform_bytes
    }

    /// Compose a body's material as it would be bound right now.
    pub fn composed(&self, id: BodyId) -> Option<ComposedMaterial> {
        self.bodies.get(&id).map(|body| body.material.compose())
    }
}

impl SceneGraph for HeadlessRenderer {
    fn set_transform(&mut self, id: BodyId, position: Vec3, rotation: Quat) {
        match self.bodies.get_mut(&id) {
            Some(body) => {
                body.position = position;
                body.rotation = rotation;
                if self.log_transforms {
                    debug!(id = id.0, ?position, "set transform");
                }
            }
            None => {
                self.unknown_body.get_or_insert(id);
            }
        }
    }

    fn attach_material(&mut self, id: BodyId, geometry: &Geometry, material: &MaterialDescriptor) {
        debug!(
            id = id.0,
            channels = material.channel_textures.len(),
            "attach material"
        );
        let previous = self.bodies.insert(
            id,
            RenderedBody {
                geometry: *geometry,
                material: material.clone(),
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            },
        );
        if previous.is_none() {
            self.draw_order.push(id);
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, camera: &Camera) -> Result<(), RenderError> {
        if let Some(id) = self.unknown_body.take() {
            return Err(RenderError::UnknownBody(id.0));
        }

        let view_projection = camera.view_projection_matrix();
        let mut uniforms = Vec::with_capacity(self.draw_order.len());
        let mut stats = FrameStats {
            bodies: self.draw_order.len(),
            ..Default::default()
        };

        for id in &self.draw_order {
            let Some(body) = self.bodies.get(id) else {
                continue;
            };
            // Textures finish loading in the background, so attachment is
            // re-evaluated every frame.
            let composed = body.material.compose();
            stats.attached_channels += composed.channels.len();
            uniforms.push(MaterialUniform::from(&composed));

            let clip = view_projection * body.model_matrix().w_axis;
            if clip.w > 0.0 {
                let ndc = clip.truncate() / clip.w;
                if ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z) {
                    stats.visible += 1;
                }
            }
        }

        self.uniform_bytes.clear();
        self.uniform_bytes
            .extend_from_slice(bytemuck::cast_slice(&uniforms));
        self.frames_rendered += 1;
        self.last_stats = stats;
        trace!(frame = self.frames_rendered, ?stats, "frame rendered");
        Ok(())
    }
}
